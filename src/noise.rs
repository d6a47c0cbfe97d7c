// Noise channel library.
//
// Standard single-qubit channels are written as local 2x2 Kraus operators
// and lifted to the full register with `extend_local_operator`, which is
// also how the density engine embeds single-qubit gates.

use ndarray::{Array2, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::density::DensityMatrix;
use crate::error::{Result, SimError};
use crate::gates::{I_GATE, X_GATE, Y_GATE, Z_GATE};
use crate::linalg::{dagger, is_identity};
use crate::state::{as_2x2, check_qubit, register_dim};
use crate::ZERO;

/// Upper bound on the depolarizing parameter for a valid channel.
pub const MAX_DEPOLARIZING: f64 = 4.0 / 3.0;

/// Tensor-extend a local 2x2 operator on `target` to the full `2^n × 2^n` system.
///
/// Entry `(i, j)` is `local[bit_t(i)][bit_t(j)]` when `i` and `j` agree on
/// every bit except `target`, and zero otherwise.
pub fn extend_local_operator(
    num_qubits: usize,
    target: usize,
    local: &Array2<Complex64>,
) -> Result<Array2<Complex64>> {
    let dim = register_dim(num_qubits, crate::density::MAX_QUBITS)?;
    check_qubit(target, num_qubits)?;
    let m = as_2x2(local)?;
    let others = !(1usize << target);
    Ok(Array2::from_shape_fn((dim, dim), |(i, j)| {
        if (i ^ j) & others != 0 {
            ZERO
        } else {
            m[(i >> target) & 1][(j >> target) & 1]
        }
    }))
}

/// `Σ Kᵢ†Kᵢ`; the identity for a trace-preserving channel.
pub fn completeness_sum(operators: &[Array2<Complex64>]) -> Option<Array2<Complex64>> {
    let first = operators.first()?;
    let mut sum = Array2::<Complex64>::zeros(first.dim());
    for k in operators {
        if k.dim() != first.dim() {
            return None;
        }
        sum += &dagger(k).dot(k);
    }
    Some(sum)
}

/// Check the completeness relation `Σ Kᵢ†Kᵢ = I` within `tol`.
pub fn is_complete(operators: &[Array2<Complex64>], tol: f64) -> bool {
    completeness_sum(operators).is_some_and(|s| is_identity(&s, tol))
}

fn check_range(parameter: &'static str, value: f64, max: f64) -> Result<()> {
    // written so that NaN fails too
    if !(0.0..=max).contains(&value) {
        return Err(SimError::InvalidParameter {
            parameter,
            value,
            max,
        });
    }
    Ok(())
}

fn scaled(m: &Array2<Complex64>, factor: f64) -> Array2<Complex64> {
    m * Complex64::new(factor, 0.0)
}

/// Standard single-qubit noise models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NoiseChannel {
    /// Phase flip with probability `p`: K0 = √(1−p)·I, K1 = √p·Z.
    Dephasing(f64),
    /// Energy relaxation with decay probability `γ`.
    AmplitudeDamping(f64),
    /// K0 = √(1−3p/4)·I and √(p/4) times each Pauli. `p` in `[0, 4/3]`.
    Depolarizing(f64),
}

impl NoiseChannel {
    pub fn validate(&self) -> Result<()> {
        match *self {
            NoiseChannel::Dephasing(p) => check_range("dephasing probability", p, 1.0),
            NoiseChannel::AmplitudeDamping(gamma) => check_range("gamma", gamma, 1.0),
            NoiseChannel::Depolarizing(p) => {
                check_range("depolarizing probability", p, MAX_DEPOLARIZING)?;
                if p > 1.0 {
                    warn!(p, "over-depolarizing channel requested");
                }
                Ok(())
            }
        }
    }

    /// Local 2x2 Kraus operators of this channel.
    pub fn kraus_operators(&self) -> Result<Vec<Array2<Complex64>>> {
        self.validate()?;
        let ops = match *self {
            NoiseChannel::Dephasing(p) => {
                vec![scaled(&I_GATE, (1.0 - p).sqrt()), scaled(&Z_GATE, p.sqrt())]
            }
            NoiseChannel::AmplitudeDamping(gamma) => {
                let k0 = array![
                    [Complex64::new(1.0, 0.0), ZERO],
                    [ZERO, Complex64::new((1.0 - gamma).sqrt(), 0.0)]
                ];
                let k1 = array![[ZERO, Complex64::new(gamma.sqrt(), 0.0)], [ZERO, ZERO]];
                vec![k0, k1]
            }
            NoiseChannel::Depolarizing(p) => {
                let pauli = (p / 4.0).sqrt();
                vec![
                    scaled(&I_GATE, (1.0 - 3.0 * p / 4.0).max(0.0).sqrt()),
                    scaled(&X_GATE, pauli),
                    scaled(&Y_GATE, pauli),
                    scaled(&Z_GATE, pauli),
                ]
            }
        };
        Ok(ops)
    }

    /// Kraus operators lifted to act on `target` of an `n`-qubit register.
    pub fn extended_operators(
        &self,
        num_qubits: usize,
        target: usize,
    ) -> Result<Vec<Array2<Complex64>>> {
        self.kraus_operators()?
            .iter()
            .map(|k| extend_local_operator(num_qubits, target, k))
            .collect()
    }
}

impl fmt::Display for NoiseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseChannel::Dephasing(p) => write!(f, "dephasing(p={p})"),
            NoiseChannel::AmplitudeDamping(g) => write!(f, "amplitude_damping(gamma={g})"),
            NoiseChannel::Depolarizing(p) => write!(f, "depolarizing(p={p})"),
        }
    }
}

/// Dephasing with probability `p` on `target`.
pub fn dephasing(dm: &mut DensityMatrix, target: usize, p: f64) -> Result<()> {
    dm.apply_noise(&NoiseChannel::Dephasing(p), target)?;
    Ok(())
}

/// Amplitude damping with decay probability `gamma` on `target`.
pub fn amplitude_damping(dm: &mut DensityMatrix, target: usize, gamma: f64) -> Result<()> {
    dm.apply_noise(&NoiseChannel::AmplitudeDamping(gamma), target)?;
    Ok(())
}

/// Depolarizing with parameter `p` on `target`.
pub fn depolarizing(dm: &mut DensityMatrix, target: usize, p: f64) -> Result<()> {
    dm.apply_noise(&NoiseChannel::Depolarizing(p), target)?;
    Ok(())
}
