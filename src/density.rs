// Density-matrix engine.
//
// `DensityMatrix` holds a `2^N × 2^N` complex matrix ρ and evolves it by
// unitary conjugation `ρ → UρU†` and by Kraus channels `ρ → Σ KᵢρKᵢ†`.
// A matrix built from a `StateVector` is an independent copy.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use std::fmt;
use tracing::{debug, instrument};

use crate::error::{Result, SimError};
use crate::format;
use crate::gates::{Gate, X_GATE};
use crate::linalg::{dagger, trace};
use crate::noise::{NoiseChannel, extend_local_operator};
use crate::state::{StateVector, check_distinct, check_qubit, register_dim};
use crate::{ONE, ZERO};

/// Largest register a [`DensityMatrix`] will allocate.
pub const MAX_QUBITS: usize = 13;

/// Mixed (or pure) state of an N-qubit register.
#[derive(Clone, Debug)]
pub struct DensityMatrix {
    matrix: Array2<Complex64>,
    num_qubits: usize,
}

impl DensityMatrix {
    /// All-zero matrix; the caller populates it, e.g. by conversion.
    pub fn new(num_qubits: usize) -> Result<Self> {
        let dim = register_dim(num_qubits, MAX_QUBITS)?;
        Ok(DensityMatrix {
            matrix: Array2::zeros((dim, dim)),
            num_qubits,
        })
    }

    /// Outer product `ρ = |ψ⟩⟨ψ|`.
    pub fn from_state(state: &StateVector) -> Result<Self> {
        register_dim(state.num_qubits(), MAX_QUBITS)?;
        let amps = state.amplitudes();
        let dim = amps.len();
        let matrix = Array2::from_shape_fn((dim, dim), |(i, j)| amps[i] * amps[j].conj());
        Ok(DensityMatrix {
            matrix,
            num_qubits: state.num_qubits(),
        })
    }

    /// Wrap an existing matrix. It must be square with a power-of-two side.
    pub fn from_matrix(matrix: Array2<Complex64>) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols || !rows.is_power_of_two() {
            return Err(SimError::DimensionMismatch {
                expected: rows.next_power_of_two(),
                rows,
                cols,
            });
        }
        let num_qubits = rows.trailing_zeros() as usize;
        register_dim(num_qubits, MAX_QUBITS)?;
        Ok(DensityMatrix { matrix, num_qubits })
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Complex64> {
        self.matrix.get((row, col)).copied()
    }

    pub fn trace(&self) -> Complex64 {
        trace(&self.matrix)
    }

    /// `Tr(ρ²)`: 1 for pure states, `1/D` for the maximally mixed state.
    pub fn purity(&self) -> f64 {
        // Tr(ρρ) = Σ ρ_ij ρ_ji
        self.matrix
            .indexed_iter()
            .map(|((i, j), &x)| x * self.matrix[[j, i]])
            .sum::<Complex64>()
            .re
    }

    /// Diagonal of ρ: the probability of each basis state.
    pub fn probabilities(&self) -> Array1<f64> {
        self.matrix.diag().mapv(|x| x.re)
    }

    /// Probabilities `(p0, p1)` of reading 0 or 1 on `target`.
    pub fn qubit_probabilities(&self, target: usize) -> Result<(f64, f64)> {
        check_qubit(target, self.num_qubits)?;
        let (mut p0, mut p1) = (0.0, 0.0);
        for (i, p) in self.probabilities().iter().enumerate() {
            if (i >> target) & 1 == 0 {
                p0 += p;
            } else {
                p1 += p;
            }
        }
        Ok((p0, p1))
    }

    pub fn is_hermitian(&self, tol: f64) -> bool {
        self.matrix
            .indexed_iter()
            .all(|((i, j), &x)| (x - self.matrix[[j, i]].conj()).norm() < tol)
    }

    fn check_operator(&self, op: &Array2<Complex64>) -> Result<()> {
        let (rows, cols) = op.dim();
        let dim = self.dim();
        if rows != dim || cols != dim {
            return Err(SimError::DimensionMismatch {
                expected: dim,
                rows,
                cols,
            });
        }
        Ok(())
    }

    /// `ρ ← UρU†` for a full-system unitary `U`.
    pub fn apply_unitary(&mut self, u: &Array2<Complex64>) -> Result<&mut Self> {
        self.check_operator(u)?;
        let temp = u.dot(&self.matrix);
        self.matrix = temp.dot(&dagger(u));
        Ok(self)
    }

    /// Tensor a 2x2 gate onto `target` and conjugate ρ by the result.
    pub fn apply_single_qubit_gate(
        &mut self,
        target: usize,
        gate: &Array2<Complex64>,
    ) -> Result<&mut Self> {
        let u = extend_local_operator(self.num_qubits, target, gate)?;
        self.apply_unitary(&u)
    }

    pub fn apply_gate(&mut self, gate: Gate, target: usize) -> Result<&mut Self> {
        self.apply_single_qubit_gate(target, &gate.matrix())
    }

    /// CNOT as `P0(c) + P1(c)·X(t)`, each factor a tensor-extended local operator.
    pub fn apply_controlled_not(&mut self, control: usize, target: usize) -> Result<&mut Self> {
        check_distinct(&[control, target], self.num_qubits)?;
        let p0 = ndarray::array![[ONE, ZERO], [ZERO, ZERO]];
        let p1 = ndarray::array![[ZERO, ZERO], [ZERO, ONE]];
        let n = self.num_qubits;
        let u = extend_local_operator(n, control, &p0)?
            + extend_local_operator(n, control, &p1)?.dot(&extend_local_operator(n, target, &X_GATE)?);
        self.apply_unitary(&u)
    }

    /// `ρ ← Σᵢ KᵢρKᵢ†`.
    ///
    /// The sum is accumulated into a fresh matrix and only then replaces ρ.
    /// Every operator must be `D×D`.
    #[instrument(level = "debug", skip(self, operators), fields(count = operators.len()))]
    pub fn apply_kraus_channel(&mut self, operators: &[Array2<Complex64>]) -> Result<&mut Self> {
        if operators.is_empty() {
            return Err(SimError::EmptyChannel);
        }
        for k in operators {
            self.check_operator(k)?;
        }
        let dim = self.dim();
        let mut accumulated = Array2::<Complex64>::zeros((dim, dim));
        for k in operators {
            accumulated += &k.dot(&self.matrix).dot(&dagger(k));
        }
        self.matrix = accumulated;
        debug!(trace = self.trace().re, "applied Kraus channel");
        Ok(self)
    }

    /// Apply a standard single-qubit noise channel to `target`.
    pub fn apply_noise(&mut self, channel: &NoiseChannel, target: usize) -> Result<&mut Self> {
        let operators = channel.extended_operators(self.num_qubits, target)?;
        debug!(%channel, target, "applying noise");
        self.apply_kraus_channel(&operators)
    }

    /// Row-per-line rendering of ρ.
    pub fn dump(&self) -> String {
        format::dump_matrix(&self.matrix)
    }
}

impl TryFrom<&StateVector> for DensityMatrix {
    type Error = SimError;

    fn try_from(state: &StateVector) -> Result<Self> {
        DensityMatrix::from_state(state)
    }
}

impl fmt::Display for DensityMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::H_GATE;
    use approx::assert_abs_diff_eq;

    fn plus_zero() -> StateVector {
        let mut q = StateVector::new(2).unwrap();
        q.h(0).unwrap();
        q
    }

    #[test]
    fn test_new_is_zero() {
        let dm = DensityMatrix::new(2).unwrap();
        assert_eq!(dm.dim(), 4);
        assert_eq!(dm.trace(), ZERO);
        assert!(DensityMatrix::new(0).is_err());
        assert!(DensityMatrix::new(MAX_QUBITS + 1).is_err());
    }

    #[test]
    fn test_from_state_outer_product() {
        let mut q = StateVector::from_ket("+1").unwrap();
        q.t(1).unwrap();
        let dm = DensityMatrix::from_state(&q).unwrap();
        let a = q.amplitudes();
        for i in 0..4 {
            for j in 0..4 {
                let expected = a[i] * a[j].conj();
                assert!((dm.get(i, j).unwrap() - expected).norm() < 1e-12);
            }
        }
        assert_abs_diff_eq!(dm.trace().re, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dm.purity(), 1.0, epsilon = 1e-12);
        assert!(dm.is_hermitian(1e-12));
    }

    #[test]
    fn test_conversion_is_a_copy() {
        let mut q = plus_zero();
        let dm = DensityMatrix::try_from(&q).unwrap();
        q.x(1).unwrap();
        assert_abs_diff_eq!(dm.get(0, 0).unwrap().re, 0.5, epsilon = 1e-12);
        assert_eq!(dm.get(2, 2).unwrap(), ZERO);
    }

    #[test]
    fn test_single_qubit_gate_matches_pure_evolution() {
        let start = StateVector::from_ket("+0-").unwrap();
        for target in 0..3 {
            let mut dm = DensityMatrix::from_state(&start).unwrap();
            dm.apply_single_qubit_gate(target, &H_GATE).unwrap();
            let mut q = start.clone();
            q.h(target).unwrap();
            let expected = DensityMatrix::from_state(&q).unwrap();
            for (a, b) in dm.matrix().iter().zip(expected.matrix().iter()) {
                assert!((a - b).norm() < 1e-12, "target {target}");
            }
        }
    }

    #[test]
    fn test_controlled_not_matches_pure_evolution() {
        let start = plus_zero();
        let mut dm = DensityMatrix::from_state(&start).unwrap();
        dm.apply_controlled_not(0, 1).unwrap();
        // Bell pair: populations on |00> and |11>, coherence between them
        assert_abs_diff_eq!(dm.get(0, 0).unwrap().re, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(dm.get(3, 3).unwrap().re, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(dm.get(0, 3).unwrap().re, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(dm.get(1, 1).unwrap().re, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unitary_dimension_mismatch() {
        let mut dm = DensityMatrix::from_state(&plus_zero()).unwrap();
        assert!(matches!(
            dm.apply_unitary(&H_GATE),
            Err(SimError::DimensionMismatch { expected: 4, .. })
        ));
    }

    #[test]
    fn test_kraus_requires_operators() {
        let mut dm = DensityMatrix::from_state(&plus_zero()).unwrap();
        assert_eq!(dm.apply_kraus_channel(&[]).unwrap_err(), SimError::EmptyChannel);
    }

    #[test]
    fn test_kraus_identity_channel_is_noop() {
        let mut dm = DensityMatrix::from_state(&plus_zero()).unwrap();
        let before = dm.matrix().clone();
        let eye: Array2<Complex64> = Array2::eye(4);
        dm.apply_kraus_channel(&[eye]).unwrap();
        assert_eq!(dm.matrix(), &before);
    }

    #[test]
    fn test_full_dephasing_kills_coherence() {
        let mut dm = DensityMatrix::from_state(&plus_zero()).unwrap();
        dm.apply_noise(&NoiseChannel::Dephasing(0.5), 0).unwrap();
        assert!(dm.get(0, 1).unwrap().norm() < 1e-12);
        assert_abs_diff_eq!(dm.purity(), 0.5, epsilon = 1e-12);
        let (p0, p1) = dm.qubit_probabilities(0).unwrap();
        assert_abs_diff_eq!(p0, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p1, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_from_matrix_validates_shape() {
        let m: Array2<Complex64> = Array2::zeros((3, 3));
        assert!(DensityMatrix::from_matrix(m).is_err());
        let m: Array2<Complex64> = Array2::eye(4) / Complex64::new(4.0, 0.0);
        let dm = DensityMatrix::from_matrix(m).unwrap();
        assert_eq!(dm.num_qubits(), 2);
        assert_abs_diff_eq!(dm.purity(), 0.25, epsilon = 1e-12);
    }
}
