// PyO3 Python bindings for rqsim
//
// - ket('0') constructor and StateVector(n, seed=None)
// - Gate methods in upper case with method chaining: X, H, CNOT, CCX, ...
// - M / M_all for measurement, driven by a per-object RNG
// - DensityMatrix with the three noise channels
// - Every engine error surfaces as ValueError

#![allow(non_snake_case)]

use crate::density::DensityMatrix;
use crate::error::SimError;
use crate::state::StateVector;
use num_complex::Complex64;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

impl From<SimError> for PyErr {
    fn from(err: SimError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Python wrapper for StateVector
#[pyclass(name = "StateVector")]
pub struct PyStateVector {
    inner: StateVector,
    rng: StdRng,
}

impl PyStateVector {
    /// Run a chaining engine call and hand the same Python object back.
    fn chain<F>(slf: Py<Self>, py: Python<'_>, op: F) -> PyResult<Py<Self>>
    where
        F: FnOnce(&mut StateVector) -> crate::Result<&mut StateVector>,
    {
        {
            let mut this = slf.borrow_mut(py);
            op(&mut this.inner)?;
        }
        Ok(slf)
    }
}

#[pymethods]
impl PyStateVector {
    /// Register of `num_qubits` qubits in |0...0>
    #[new]
    #[pyo3(signature = (num_qubits, seed=None))]
    fn new(num_qubits: usize, seed: Option<u64>) -> PyResult<Self> {
        Ok(PyStateVector {
            inner: StateVector::new(num_qubits)?,
            rng: make_rng(seed),
        })
    }

    /// Reseed the measurement RNG
    fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // ---- Properties ----

    /// Number of qubits
    #[getter]
    fn n(&self) -> usize {
        self.inner.num_qubits()
    }

    /// State vector amplitudes as list of complex numbers
    #[getter]
    fn amplitudes(&self) -> Vec<Complex64> {
        self.inner.amplitudes().to_vec()
    }

    /// Basis-state probabilities
    #[getter]
    fn probabilities(&self) -> Vec<f64> {
        self.inner.probabilities().to_vec()
    }

    /// L2 norm of the state vector
    #[getter]
    fn norm(&self) -> f64 {
        self.inner.norm()
    }

    // ---- String representations ----

    fn __str__(&self) -> String {
        self.inner.to_string()
    }

    fn __repr__(&self) -> String {
        format!("StateVector({})", self.inner.terms())
    }

    fn terms(&self) -> String {
        self.inner.terms()
    }

    #[pyo3(signature = (show_binary=true))]
    fn dump(&self, show_binary: bool) -> String {
        self.inner.dump(show_binary)
    }

    // ---- Single-qubit gates ----

    fn X(slf: Py<Self>, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.x(target))
    }

    fn Y(slf: Py<Self>, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.y(target))
    }

    fn Z(slf: Py<Self>, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.z(target))
    }

    fn H(slf: Py<Self>, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.h(target))
    }

    fn S(slf: Py<Self>, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.s(target))
    }

    fn Sdg(slf: Py<Self>, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.sdg(target))
    }

    fn T(slf: Py<Self>, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.t(target))
    }

    fn Tdg(slf: Py<Self>, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.tdg(target))
    }

    /// Phase shift by `theta` radians on |1>
    fn P(slf: Py<Self>, target: usize, theta: f64, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.phase(target, theta))
    }

    // ---- Multi-qubit gates ----

    fn CNOT(slf: Py<Self>, control: usize, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.cnot(control, target))
    }

    fn CZ(slf: Py<Self>, control: usize, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.cz(control, target))
    }

    /// Controlled phase; `theta` defaults to pi (controlled-Z)
    #[pyo3(signature = (control, target, theta=std::f64::consts::PI))]
    fn CPHASE(
        slf: Py<Self>,
        control: usize,
        target: usize,
        theta: f64,
        py: Python<'_>,
    ) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.cphase(control, target, theta))
    }

    fn SWAP(slf: Py<Self>, a: usize, b: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.swap(a, b))
    }

    /// Toffoli via the T-gate decomposition
    fn CCX(slf: Py<Self>, c1: usize, c2: usize, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.toffoli(c1, c2, target))
    }

    fn CCZ(slf: Py<Self>, c1: usize, c2: usize, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.ccz(c1, c2, target))
    }

    fn CSWAP(slf: Py<Self>, control: usize, a: usize, b: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.fredkin(control, a, b))
    }

    fn diffuse(slf: Py<Self>, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |s| s.grover_diffusion())
    }

    // ---- Measurement ----

    /// Measure qubit i and collapse; returns 0 or 1
    fn M(&mut self, i: usize) -> PyResult<u8> {
        Ok(self.inner.measure_qubit(i, &mut self.rng)?.outcome)
    }

    /// Measure every qubit; returns bits with element k = qubit k
    fn M_all(&mut self) -> PyResult<Vec<u8>> {
        Ok(self.inner.measure_all(&mut self.rng)?.bits)
    }

    // ---- Comparison ----

    /// Check if this state is close to another StateVector or a list of values
    fn isclose(&self, other: &Bound<'_, PyAny>) -> PyResult<bool> {
        if let Ok(other_state) = other.extract::<PyRef<PyStateVector>>() {
            return Ok(self.inner.isclose(&other_state.inner));
        }

        if let Ok(complex_list) = other.extract::<Vec<Complex64>>() {
            if self.inner.dim() != complex_list.len() {
                return Ok(false);
            }
            return Ok(self
                .inner
                .amplitudes()
                .iter()
                .zip(complex_list.iter())
                .all(|(a, b)| (a - b).norm() < 1e-5));
        }

        if let Ok(float_list) = other.extract::<Vec<f64>>() {
            return Ok(self.inner.isclose_slice(&float_list));
        }

        Err(PyValueError::new_err(
            "isclose() argument must be StateVector or list of numbers",
        ))
    }
}

/// Python wrapper for DensityMatrix
#[pyclass(name = "DensityMatrix")]
pub struct PyDensityMatrix {
    inner: DensityMatrix,
}

impl PyDensityMatrix {
    fn chain<F>(slf: Py<Self>, py: Python<'_>, op: F) -> PyResult<Py<Self>>
    where
        F: FnOnce(&mut DensityMatrix) -> crate::Result<()>,
    {
        {
            let mut this = slf.borrow_mut(py);
            op(&mut this.inner)?;
        }
        Ok(slf)
    }
}

#[pymethods]
impl PyDensityMatrix {
    /// |psi><psi| of a pure state
    #[staticmethod]
    fn from_state(state: PyRef<'_, PyStateVector>) -> PyResult<Self> {
        Ok(PyDensityMatrix {
            inner: DensityMatrix::from_state(&state.inner)?,
        })
    }

    #[getter]
    fn n(&self) -> usize {
        self.inner.num_qubits()
    }

    fn trace(&self) -> Complex64 {
        self.inner.trace()
    }

    fn purity(&self) -> f64 {
        self.inner.purity()
    }

    /// Diagonal of rho
    fn probabilities(&self) -> Vec<f64> {
        self.inner.probabilities().to_vec()
    }

    /// Rows of rho as nested lists
    fn matrix(&self) -> Vec<Vec<Complex64>> {
        self.inner
            .matrix()
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect()
    }

    fn __str__(&self) -> String {
        self.inner.dump()
    }

    fn __repr__(&self) -> String {
        format!(
            "DensityMatrix(n={}, purity={:.6})",
            self.inner.num_qubits(),
            self.inner.purity()
        )
    }

    // ---- Unitaries ----

    fn X(slf: Py<Self>, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |d| d.apply_gate(crate::Gate::X, target).map(drop))
    }

    fn H(slf: Py<Self>, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |d| d.apply_gate(crate::Gate::H, target).map(drop))
    }

    fn CNOT(slf: Py<Self>, control: usize, target: usize, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |d| d.apply_controlled_not(control, target).map(drop))
    }

    // ---- Noise ----

    fn dephasing(slf: Py<Self>, target: usize, p: f64, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |d| crate::noise::dephasing(d, target, p))
    }

    fn amplitude_damping(
        slf: Py<Self>,
        target: usize,
        gamma: f64,
        py: Python<'_>,
    ) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |d| crate::noise::amplitude_damping(d, target, gamma))
    }

    fn depolarizing(slf: Py<Self>, target: usize, p: f64, py: Python<'_>) -> PyResult<Py<Self>> {
        Self::chain(slf, py, |d| crate::noise::depolarizing(d, target, p))
    }
}

/// Create a product state from a string specification
///
/// Characters: '0' = |0>, '1' = |1>, '+' = |+>, '-' = |->. The leftmost
/// character is the highest qubit.
///
/// Examples: ket('0'), ket('01'), ket('++'), ket('101', seed=3)
#[pyfunction]
#[pyo3(signature = (vecstring="0", seed=None))]
fn ket(vecstring: &str, seed: Option<u64>) -> PyResult<PyStateVector> {
    Ok(PyStateVector {
        inner: StateVector::from_ket(vecstring)?,
        rng: make_rng(seed),
    })
}

/// Python module definition
#[pymodule]
fn rqsim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyStateVector>()?;
    m.add_class::<PyDensityMatrix>()?;
    m.add_function(wrap_pyfunction!(ket, m)?)?;
    Ok(())
}
