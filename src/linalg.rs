// Dense complex linear-algebra helpers shared by the engines.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Kronecker product of two vectors. `a` occupies the high-order bits of the result.
pub fn kron(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array1<Complex64> {
    let (la, lb) = (a.len(), b.len());
    let mut result = Array1::zeros(la * lb);
    for i in 0..la {
        for j in 0..lb {
            result[i * lb + j] = a[i] * b[j];
        }
    }
    result
}

/// Conjugate transpose `U†`.
pub fn dagger(u: &Array2<Complex64>) -> Array2<Complex64> {
    u.t().mapv(|x| x.conj())
}

/// Sum of the diagonal entries.
pub fn trace(m: &Array2<Complex64>) -> Complex64 {
    m.diag().sum()
}

/// Entry-wise check that `m` is the identity within `tol`.
pub fn is_identity(m: &Array2<Complex64>, tol: f64) -> bool {
    let (rows, cols) = m.dim();
    if rows != cols {
        return false;
    }
    m.indexed_iter().all(|((i, j), &x)| {
        let expected = if i == j { 1.0 } else { 0.0 };
        (x - Complex64::new(expected, 0.0)).norm() < tol
    })
}

/// Check `U†U = I` within `tol`.
pub fn is_unitary(u: &Array2<Complex64>, tol: f64) -> bool {
    let (rows, cols) = u.dim();
    rows == cols && is_identity(&dagger(u).dot(u), tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IM, NEG_IM, ONE, ZERO};
    use ndarray::array;

    #[test]
    fn test_kron_basis() {
        let zero = array![ONE, ZERO];
        let one = array![ZERO, ONE];
        // |1> (x) |0> = |10> = index 2
        let v = kron(&one, &zero);
        assert_eq!(v, array![ZERO, ZERO, ONE, ZERO]);
    }

    #[test]
    fn test_dagger() {
        let m = array![[ONE, IM], [ZERO, ONE]];
        let d = dagger(&m);
        assert_eq!(d, array![[ONE, ZERO], [NEG_IM, ONE]]);
    }

    #[test]
    fn test_trace_and_identity() {
        let eye: Array2<Complex64> = Array2::eye(4);
        assert_eq!(trace(&eye), Complex64::new(4.0, 0.0));
        assert!(is_identity(&eye, 1e-12));
        assert!(is_unitary(&eye, 1e-12));

        let not_unitary = array![[ONE, ONE], [ZERO, ONE]];
        assert!(!is_unitary(&not_unitary, 1e-9));
    }
}
