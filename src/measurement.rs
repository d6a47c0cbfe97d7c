// Measurement outcome values.
//
// Both types are plain values handed back to the caller; the engine keeps no
// record of past measurements.

use std::fmt;

/// Outcome of measuring a single qubit in the computational basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementResult {
    /// Probability of reading 0 before collapse.
    pub prob0: f64,
    /// Probability of reading 1 before collapse (`1 - prob0`).
    pub prob1: f64,
    /// The realized bit.
    pub outcome: u8,
}

impl MeasurementResult {
    /// Probability of the outcome that was actually observed.
    pub fn outcome_probability(&self) -> f64 {
        if self.outcome == 0 { self.prob0 } else { self.prob1 }
    }
}

impl fmt::Display for MeasurementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "outcome {} (p0 = {:.6}, p1 = {:.6})",
            self.outcome, self.prob0, self.prob1
        )
    }
}

/// Outcome of a joint measurement of the whole register.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisMeasurement {
    /// Basis index the register collapsed onto.
    pub index: usize,
    /// `bits[k]` is the value read on qubit `k`.
    pub bits: Vec<u8>,
    /// Probability of `index` before collapse.
    pub probability: f64,
}

impl BasisMeasurement {
    pub(crate) fn new(index: usize, num_qubits: usize, probability: f64) -> Self {
        let bits = (0..num_qubits).map(|k| ((index >> k) & 1) as u8).collect();
        BasisMeasurement {
            index,
            bits,
            probability,
        }
    }
}

impl fmt::Display for BasisMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // highest qubit first, matching ket rendering
        for b in self.bits.iter().rev() {
            write!(f, "{b}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_lsb_first() {
        let m = BasisMeasurement::new(0b110, 3, 1.0);
        assert_eq!(m.bits, vec![0, 1, 1]);
        assert_eq!(m.to_string(), "110");
    }

    #[test]
    fn test_outcome_probability() {
        let r = MeasurementResult {
            prob0: 0.25,
            prob1: 0.75,
            outcome: 1,
        };
        assert_eq!(r.outcome_probability(), 0.75);
    }
}
