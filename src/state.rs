// Pure-state engine.
//
// `StateVector` owns the `2^N` complex amplitudes of an N-qubit register and
// mutates them in place. Qubit `k` is bit `k` of the basis index counted from
// the least-significant end, for every gate and measurement alike.

use ndarray::{Array1, Array2, Zip};
use num_complex::Complex64;
use rand::Rng;
use std::fmt;
use tracing::{debug, instrument, trace};

use crate::error::{Result, SimError};
use crate::format;
use crate::gates::{Gate, X_GATE};
use crate::kernels;
use crate::linalg::kron;
use crate::measurement::{BasisMeasurement, MeasurementResult};
use crate::{NEG_S2, NEG1, ONE, S2, ZERO};

/// Largest register a [`StateVector`] will allocate.
pub const MAX_QUBITS: usize = 26;

/// Collapsing onto an outcome less likely than this is reported as
/// [`SimError::NumericalInstability`].
pub const MIN_COLLAPSE_PROBABILITY: f64 = 1e-12;

/// Dimension of an `n`-qubit register, rejecting sizes outside `[1, max]`.
pub(crate) fn register_dim(num_qubits: usize, max: usize) -> Result<usize> {
    if num_qubits == 0 || num_qubits > max {
        return Err(SimError::InvalidQubitCount {
            requested: num_qubits,
            max,
        });
    }
    Ok(1usize << num_qubits)
}

pub(crate) fn check_qubit(index: usize, num_qubits: usize) -> Result<()> {
    if index >= num_qubits {
        return Err(SimError::QubitOutOfRange { index, num_qubits });
    }
    Ok(())
}

/// Validate a set of qubits that must be in range and pairwise distinct.
pub(crate) fn check_distinct(qubits: &[usize], num_qubits: usize) -> Result<()> {
    for (k, &q) in qubits.iter().enumerate() {
        check_qubit(q, num_qubits)?;
        if qubits[..k].contains(&q) {
            return Err(SimError::DuplicateQubit(q));
        }
    }
    Ok(())
}

/// Copy a 2x2 operator into a fixed array, rejecting any other shape.
pub(crate) fn as_2x2(m: &Array2<Complex64>) -> Result<[[Complex64; 2]; 2]> {
    let (rows, cols) = m.dim();
    if (rows, cols) != (2, 2) {
        return Err(SimError::DimensionMismatch {
            expected: 2,
            rows,
            cols,
        });
    }
    Ok([[m[[0, 0]], m[[0, 1]]], [m[[1, 0]], m[[1, 1]]]])
}

/// Pure state of an N-qubit register.
#[derive(Clone, Debug)]
pub struct StateVector {
    amplitudes: Array1<Complex64>,
    num_qubits: usize,
}

impl StateVector {
    /// Create a register with all amplitude on `|0...0>`.
    pub fn new(num_qubits: usize) -> Result<Self> {
        let dim = register_dim(num_qubits, MAX_QUBITS)?;
        let mut amplitudes = Array1::zeros(dim);
        amplitudes[0] = ONE;
        Ok(StateVector {
            amplitudes,
            num_qubits,
        })
    }

    /// Create a register in the computational basis state `index`.
    pub fn with_basis_state(num_qubits: usize, index: usize) -> Result<Self> {
        let mut state = Self::new(num_qubits)?;
        state.reset_to_basis_state(index)?;
        Ok(state)
    }

    /// Create a register from raw amplitudes. The vector is normalized.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> Result<Self> {
        let len = amplitudes.len();
        if len == 0 || !len.is_power_of_two() {
            return Err(SimError::InvalidState(format!(
                "register length must be a power of 2, got {len}"
            )));
        }
        Self::from_array(Array1::from_vec(amplitudes))
    }

    fn from_array(v: Array1<Complex64>) -> Result<Self> {
        let num_qubits = v.len().trailing_zeros() as usize;
        register_dim(num_qubits, MAX_QUBITS)?;
        let mut state = StateVector {
            amplitudes: v,
            num_qubits,
        };
        state.normalize()?;
        Ok(state)
    }

    /// Create a product state from a ket string.
    ///
    /// Characters: '0' = |0>, '1' = |1>, '+' = |+>, '-' = |->. The leftmost
    /// character is the highest-numbered qubit, so `"01"` has qubit 0 set.
    pub fn from_ket(spec: &str) -> Result<Self> {
        if spec.is_empty() {
            return Err(SimError::InvalidKet("ket string cannot be empty".into()));
        }
        register_dim(spec.chars().count(), MAX_QUBITS)?;
        let qvec = |s: char| -> Result<Array1<Complex64>> {
            match s {
                '0' => Ok(Array1::from_vec(vec![ONE, ZERO])),
                '1' => Ok(Array1::from_vec(vec![ZERO, ONE])),
                '+' => Ok(Array1::from_vec(vec![S2, S2])),
                '-' => Ok(Array1::from_vec(vec![S2, NEG_S2])),
                other => Err(SimError::InvalidKet(format!(
                    "invalid character '{other}' in '{spec}'. Valid: 0, 1, +, -"
                ))),
            }
        };

        let mut register = Array1::from_vec(vec![ONE]);
        for ch in spec.chars().rev() {
            register = kron(&qvec(ch)?, &register);
        }
        Self::from_array(register)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Hilbert-space dimension `2^N`.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    pub fn amplitude(&self, index: usize) -> Option<Complex64> {
        self.amplitudes.get(index).copied()
    }

    /// L2 norm of the amplitude vector.
    pub fn norm(&self) -> f64 {
        self.amplitudes.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt()
    }

    fn normalize(&mut self) -> Result<()> {
        let norm = self.norm();
        if !norm.is_finite() || norm < 1e-10 {
            return Err(SimError::InvalidState(format!(
                "cannot normalize vector with norm {norm}"
            )));
        }
        self.amplitudes.mapv_inplace(|x| x / norm);
        Ok(())
    }

    /// Born-rule probability of every basis state.
    pub fn probabilities(&self) -> Array1<f64> {
        self.amplitudes.mapv(|a| a.norm_sqr())
    }

    /// Probability of reading 0 on `target`.
    pub fn probability_of_zero(&self, target: usize) -> Result<f64> {
        check_qubit(target, self.num_qubits)?;
        Ok(self.prob_zero(target))
    }

    fn prob_zero(&self, target: usize) -> f64 {
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(idx, _)| (idx >> target) & 1 == 0)
            .map(|(_, amp)| amp.norm_sqr())
            .sum()
    }

    /// Zero every amplitude and put all weight on basis state `index`.
    pub fn reset_to_basis_state(&mut self, index: usize) -> Result<()> {
        let dimension = self.dim();
        if index >= dimension {
            return Err(SimError::BasisIndexOutOfRange { index, dimension });
        }
        self.amplitudes.fill(ZERO);
        self.amplitudes[index] = ONE;
        Ok(())
    }

    /// Apply a 2x2 gate matrix to the target qubit.
    pub fn apply_single_qubit_gate(
        &mut self,
        target: usize,
        gate: &Array2<Complex64>,
    ) -> Result<&mut Self> {
        check_qubit(target, self.num_qubits)?;
        let m = as_2x2(gate)?;
        kernels::apply_controlled_2x2(&mut self.amplitudes, 0, target, m);
        trace!(target, "applied single-qubit gate");
        Ok(self)
    }

    /// Apply a 2x2 gate to `target` on the subspace where every control qubit is 1.
    pub fn apply_controlled_gate(
        &mut self,
        controls: &[usize],
        target: usize,
        gate: &Array2<Complex64>,
    ) -> Result<&mut Self> {
        let mut qubits = controls.to_vec();
        qubits.push(target);
        check_distinct(&qubits, self.num_qubits)?;
        let m = as_2x2(gate)?;
        let mask = controls.iter().fold(0usize, |acc, &c| acc | (1 << c));
        kernels::apply_controlled_2x2(&mut self.amplitudes, mask, target, m);
        trace!(?controls, target, "applied controlled gate");
        Ok(self)
    }

    fn apply_phase_on(&mut self, qubits: &[usize], phase: Complex64) -> Result<&mut Self> {
        check_distinct(qubits, self.num_qubits)?;
        let mask = qubits.iter().fold(0usize, |acc, &q| acc | (1 << q));
        kernels::apply_phase_mask(&mut self.amplitudes, mask, phase);
        trace!(?qubits, "applied diagonal phase");
        Ok(self)
    }

    // ---- Named single-qubit gates ----

    pub fn apply_gate(&mut self, gate: Gate, target: usize) -> Result<&mut Self> {
        self.apply_single_qubit_gate(target, &gate.matrix())
    }

    /// Pauli-X (NOT).
    pub fn x(&mut self, target: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::X, target)
    }

    pub fn y(&mut self, target: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::Y, target)
    }

    pub fn z(&mut self, target: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::Z, target)
    }

    /// Hadamard.
    pub fn h(&mut self, target: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::H, target)
    }

    pub fn s(&mut self, target: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::S, target)
    }

    pub fn sdg(&mut self, target: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::Sdg, target)
    }

    pub fn t(&mut self, target: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::T, target)
    }

    pub fn tdg(&mut self, target: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::Tdg, target)
    }

    /// Phase gate `diag(1, e^{iθ})`.
    pub fn phase(&mut self, target: usize, theta: f64) -> Result<&mut Self> {
        self.apply_gate(Gate::Phase(theta), target)
    }

    /// Hadamard on every qubit.
    pub fn hadamard_all(&mut self) -> Result<&mut Self> {
        for q in 0..self.num_qubits {
            self.h(q)?;
        }
        Ok(self)
    }

    // ---- Two-qubit gates ----

    /// Controlled-NOT: swaps the target pair wherever the control bit is 1.
    pub fn cnot(&mut self, control: usize, target: usize) -> Result<&mut Self> {
        self.apply_controlled_gate(&[control], target, &X_GATE)
    }

    /// Controlled-Z: negates amplitudes with both bits set.
    pub fn cz(&mut self, control: usize, target: usize) -> Result<&mut Self> {
        self.apply_phase_on(&[control, target], NEG1)
    }

    /// Controlled phase: multiplies amplitudes with both bits set by `e^{iθ}`.
    pub fn cphase(&mut self, control: usize, target: usize, theta: f64) -> Result<&mut Self> {
        self.apply_phase_on(&[control, target], Complex64::from_polar(1.0, theta))
    }

    pub fn swap(&mut self, a: usize, b: usize) -> Result<&mut Self> {
        check_distinct(&[a, b], self.num_qubits)?;
        self.cnot(a, b)?.cnot(b, a)?.cnot(a, b)
    }

    // ---- Three-qubit gates ----

    /// Toffoli (CCX) via the standard H / T / T-dagger / CNOT decomposition.
    ///
    /// This is the reference realization; Fredkin, CCZ, CCY and CC-phase are
    /// all built on top of it.
    pub fn toffoli(&mut self, c1: usize, c2: usize, target: usize) -> Result<&mut Self> {
        check_distinct(&[c1, c2, target], self.num_qubits)?;
        self.h(target)?
            .cnot(c2, target)?
            .tdg(target)?
            .cnot(c1, target)?
            .t(target)?
            .cnot(c2, target)?
            .tdg(target)?
            .cnot(c1, target)?
            .t(c2)?
            .t(target)?
            .h(target)?
            .cnot(c1, c2)?
            .t(c1)?
            .tdg(c2)?
            .cnot(c1, c2)
    }

    /// Toffoli applied directly: flip `target` iff both controls are 1.
    pub fn toffoli_direct(&mut self, c1: usize, c2: usize, target: usize) -> Result<&mut Self> {
        self.apply_controlled_gate(&[c1, c2], target, &X_GATE)
    }

    /// Controlled swap of `a` and `b`.
    pub fn fredkin(&mut self, control: usize, a: usize, b: usize) -> Result<&mut Self> {
        check_distinct(&[control, a, b], self.num_qubits)?;
        self.cnot(b, a)?.toffoli(control, a, b)?.cnot(b, a)
    }

    /// Doubly-controlled Z, as Toffoli conjugated by Hadamard on the target.
    pub fn ccz(&mut self, c1: usize, c2: usize, target: usize) -> Result<&mut Self> {
        check_distinct(&[c1, c2, target], self.num_qubits)?;
        self.h(target)?.toffoli(c1, c2, target)?.h(target)
    }

    /// Doubly-controlled Y, as Toffoli conjugated by S on the target.
    pub fn ccy(&mut self, c1: usize, c2: usize, target: usize) -> Result<&mut Self> {
        check_distinct(&[c1, c2, target], self.num_qubits)?;
        self.sdg(target)?.toffoli(c1, c2, target)?.s(target)
    }

    /// Doubly-controlled phase `e^{iθ}` on `|111>`.
    pub fn cc_phase(&mut self, c1: usize, c2: usize, target: usize, theta: f64) -> Result<&mut Self> {
        check_distinct(&[c1, c2, target], self.num_qubits)?;
        self.toffoli(c1, c2, target)?
            .phase(target, -theta / 2.0)?
            .toffoli(c1, c2, target)?
            .phase(target, theta / 2.0)?
            .cphase(c1, c2, theta / 2.0)
    }

    /// Inversion about the mean amplitude (Grover diffusion).
    pub fn grover_diffusion(&mut self) -> Result<&mut Self> {
        let mean = self.amplitudes.sum() / self.dim() as f64;
        self.amplitudes.mapv_inplace(|a| mean * 2.0 - a);
        trace!("applied diffusion");
        Ok(self)
    }

    // ---- Measurement ----

    /// Measure `target` in the computational basis and collapse the state.
    ///
    /// Returns the pre-measurement probabilities and the realized bit. Fails
    /// without touching the state if the drawn outcome has a probability
    /// below [`MIN_COLLAPSE_PROBABILITY`].
    #[instrument(level = "debug", skip(self, rng))]
    pub fn measure_qubit(&mut self, target: usize, rng: &mut impl Rng) -> Result<MeasurementResult> {
        check_qubit(target, self.num_qubits)?;
        let prob0 = self.prob_zero(target);
        let prob1 = 1.0 - prob0;

        let outcome: u8 = if rng.r#gen::<f64>() < prob0 { 0 } else { 1 };
        let p = if outcome == 0 { prob0 } else { prob1 };
        if p < MIN_COLLAPSE_PROBABILITY {
            return Err(SimError::NumericalInstability { probability: p });
        }

        // Collapse: zero out amplitudes inconsistent with outcome, rescale the rest
        let scale = 1.0 / p.sqrt();
        let bit = outcome as usize;
        Zip::indexed(&mut self.amplitudes).for_each(|idx, amp| {
            if (idx >> target) & 1 == bit {
                *amp *= scale;
            } else {
                *amp = ZERO;
            }
        });

        debug!(target, outcome, prob0, "measured qubit");
        Ok(MeasurementResult {
            prob0,
            prob1,
            outcome,
        })
    }

    /// Measure every qubit jointly with a single draw.
    ///
    /// Walks the cumulative distribution over basis states, collapses onto the
    /// chosen index with unit amplitude and returns its bit decomposition.
    #[instrument(level = "debug", skip(self, rng))]
    pub fn measure_all(&mut self, rng: &mut impl Rng) -> Result<BasisMeasurement> {
        let r: f64 = rng.r#gen();
        let mut cumulative = 0.0;
        let mut chosen = None;
        let mut last_nonzero = None;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            let p = amp.norm_sqr();
            if p > 0.0 {
                last_nonzero = Some(i);
            }
            cumulative += p;
            if r < cumulative {
                chosen = Some(i);
                break;
            }
        }
        // rounding can leave the total just under r; fall back to the last populated state
        let index = chosen
            .or(last_nonzero)
            .ok_or(SimError::NumericalInstability {
                probability: cumulative,
            })?;

        let probability = self.amplitudes[index].norm_sqr();
        self.amplitudes.fill(ZERO);
        self.amplitudes[index] = ONE;

        let result = BasisMeasurement::new(index, self.num_qubits, probability);
        debug!(index, probability, "measured register: |{result}>");
        Ok(result)
    }

    // ---- Inspection ----

    /// Return string representation of significant terms in the quantum state.
    pub fn terms(&self) -> String {
        format::terms(&self.amplitudes, self.num_qubits)
    }

    /// Every basis amplitude, one per line, for human inspection.
    pub fn dump(&self, show_binary: bool) -> String {
        format::dump_amplitudes(&self.amplitudes, self.num_qubits, show_binary)
    }

    /// Check if this quantum state is close to another.
    pub fn isclose(&self, other: &StateVector) -> bool {
        if self.dim() != other.dim() {
            return false;
        }
        self.amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .all(|(a, b)| (a - b).norm() < 1e-5)
    }

    /// Check if this quantum state is close to a slice of f64 values (treated as real).
    pub fn isclose_slice(&self, other: &[f64]) -> bool {
        if self.dim() != other.len() {
            return false;
        }
        self.amplitudes
            .iter()
            .zip(other.iter())
            .all(|(a, b)| (a - b).norm() < 1e-5)
    }

    /// Largest entry-wise distance to `other`; infinite when the sizes differ.
    pub fn max_deviation(&self, other: &StateVector) -> f64 {
        if self.dim() != other.dim() {
            return f64::INFINITY;
        }
        self.amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.terms())
    }
}
