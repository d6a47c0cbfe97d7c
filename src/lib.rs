// rqsim - state-vector and density-matrix quantum simulator in Rust
//
// Qubit k is bit k of a basis index, counted from the least-significant bit,
// everywhere in the crate. Kets print the highest qubit first.

use num_complex::Complex64;

pub mod config;
pub mod density;
pub mod error;
pub mod format;
pub mod gates;
mod kernels;
pub mod linalg;
pub mod measurement;
pub mod noise;
pub mod state;

pub use density::DensityMatrix;
pub use error::{ConfigError, Result, SimError};
pub use gates::{Gate, GateApplier, apply_and_dump};
pub use measurement::{BasisMeasurement, MeasurementResult};
pub use noise::{NoiseChannel, amplitude_damping, dephasing, depolarizing, extend_local_operator};
pub use state::StateVector;

// ---- Complex Constants ----

pub(crate) const ZERO: Complex64 = Complex64::new(0.0, 0.0);
pub(crate) const ONE: Complex64 = Complex64::new(1.0, 0.0);
pub(crate) const NEG1: Complex64 = Complex64::new(-1.0, 0.0);
pub(crate) const IM: Complex64 = Complex64::new(0.0, 1.0);
pub(crate) const NEG_IM: Complex64 = Complex64::new(0.0, -1.0);
pub(crate) const S2: Complex64 = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
pub(crate) const NEG_S2: Complex64 = Complex64::new(-std::f64::consts::FRAC_1_SQRT_2, 0.0);

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create a product state from a ket string, e.g. `ket("01+")`.
///
/// Shorthand for [`StateVector::from_ket`].
pub fn ket(spec: &str) -> Result<StateVector> {
    StateVector::from_ket(spec)
}

// ---- Python Bindings ----

#[cfg(feature = "pyo3")]
mod python;
