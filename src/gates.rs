// Named single-qubit gates.
//
// Every named gate is a fixed 2x2 matrix routed through the one generic
// single-qubit update; there are no per-gate code paths.

use ndarray::{Array2, array};
use num_complex::Complex64;
use std::sync::LazyLock;

use crate::error::Result;
use crate::state::StateVector;
use crate::{IM, NEG_IM, NEG_S2, NEG1, ONE, S2, ZERO};

const T_PHASE: Complex64 = Complex64::new(
    std::f64::consts::FRAC_1_SQRT_2,
    std::f64::consts::FRAC_1_SQRT_2,
);
const TDG_PHASE: Complex64 = Complex64::new(
    std::f64::consts::FRAC_1_SQRT_2,
    -std::f64::consts::FRAC_1_SQRT_2,
);

// ---- Gate Matrices ----

pub static I_GATE: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![[ONE, ZERO], [ZERO, ONE]]
});

pub static X_GATE: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![[ZERO, ONE], [ONE, ZERO]]
});

pub static Y_GATE: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![[ZERO, NEG_IM], [IM, ZERO]]
});

pub static Z_GATE: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![[ONE, ZERO], [ZERO, NEG1]]
});

pub static H_GATE: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![[S2, S2], [S2, NEG_S2]]
});

pub static S_GATE: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![[ONE, ZERO], [ZERO, IM]]
});

pub static SDG_GATE: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![[ONE, ZERO], [ZERO, NEG_IM]]
});

pub static T_GATE: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![[ONE, ZERO], [ZERO, T_PHASE]]
});

pub static TDG_GATE: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![[ONE, ZERO], [ZERO, TDG_PHASE]]
});

/// Phase gate `diag(1, e^{iθ})`.
pub fn phase_gate(theta: f64) -> Array2<Complex64> {
    array![[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, theta)]]
}

/// The standard single-qubit gate set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    /// `diag(1, e^{iθ})`
    Phase(f64),
}

impl Gate {
    /// The 2x2 matrix of this gate.
    pub fn matrix(&self) -> Array2<Complex64> {
        match self {
            Gate::X => X_GATE.clone(),
            Gate::Y => Y_GATE.clone(),
            Gate::Z => Z_GATE.clone(),
            Gate::H => H_GATE.clone(),
            Gate::S => S_GATE.clone(),
            Gate::Sdg => SDG_GATE.clone(),
            Gate::T => T_GATE.clone(),
            Gate::Tdg => TDG_GATE.clone(),
            Gate::Phase(theta) => phase_gate(*theta),
        }
    }

    /// The inverse gate.
    pub fn dagger(&self) -> Gate {
        match self {
            Gate::S => Gate::Sdg,
            Gate::Sdg => Gate::S,
            Gate::T => Gate::Tdg,
            Gate::Tdg => Gate::T,
            Gate::Phase(theta) => Gate::Phase(-theta),
            g => *g,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Gate::X => "X".into(),
            Gate::Y => "Y".into(),
            Gate::Z => "Z".into(),
            Gate::H => "H".into(),
            Gate::S => "S".into(),
            Gate::Sdg => "Sdg".into(),
            Gate::T => "T".into(),
            Gate::Tdg => "Tdg".into(),
            Gate::Phase(theta) => format!("P({theta:.4})"),
        }
    }
}

/// Anything that can be applied to one target qubit of a state.
///
/// Implemented for [`Gate`] and for closures, so test harnesses can take
/// "any gate" without function-pointer casts.
pub trait GateApplier {
    fn apply(&self, state: &mut StateVector, target: usize) -> Result<()>;
}

impl GateApplier for Gate {
    fn apply(&self, state: &mut StateVector, target: usize) -> Result<()> {
        state.apply_gate(*self, target)?;
        Ok(())
    }
}

impl<F> GateApplier for F
where
    F: Fn(&mut StateVector, usize) -> Result<()>,
{
    fn apply(&self, state: &mut StateVector, target: usize) -> Result<()> {
        self(state, target)
    }
}

/// Apply `gate` to `target`, then return the amplitude dump of the result.
pub fn apply_and_dump(
    state: &mut StateVector,
    gate: &impl GateApplier,
    target: usize,
    show_binary: bool,
) -> Result<String> {
    gate.apply(state, target)?;
    Ok(state.dump(show_binary))
}
