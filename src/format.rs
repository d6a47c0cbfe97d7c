// Human-readable rendering of states and density matrices.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use std::fmt::Write;

/// Amplitudes with magnitude below this are left out of ket terms.
pub const TERM_THRESHOLD: f64 = 1e-8;

/// Round to `n` significant figures to eliminate floating-point ULP noise.
fn round_sigfigs(x: f64, n: i32) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    let d = x.abs().log10().ceil() as i32;
    let power = 10f64.powi(n - d);
    (x * power).round() / power
}

/// Format a float to always include a decimal point.
fn format_real(x: f64) -> String {
    let x = round_sigfigs(x, 15);
    let s = format!("{}", x);
    if !s.contains('.') && !s.contains('e') && !s.contains('E') {
        format!("{s}.0")
    } else {
        s
    }
}

/// Format a complex coefficient for display.
/// Returns just the real part if purely real, otherwise the full complex number.
pub fn qcoef(a: Complex64) -> String {
    let re = round_sigfigs(a.re, 15);
    let im = round_sigfigs(a.im, 15);
    if im.abs() < TERM_THRESHOLD {
        format_real(re)
    } else {
        format!("{}+{}i", format_real(re), format_real(im))
    }
}

/// Binary expansion of `index` over `n` qubits, highest qubit first.
pub fn basis_label(index: usize, n: usize) -> String {
    format!("{:0>width$b}", index, width = n)
}

/// Format a single term of a quantum state as "coef|binary>".
fn qterm(i: usize, qi: Complex64, n: usize) -> String {
    format!("{}|{}>", qcoef(qi), basis_label(i, n))
}

/// Space-separated significant terms of a state vector.
pub fn terms(amps: &Array1<Complex64>, n: usize) -> String {
    amps.iter()
        .enumerate()
        .filter(|(_, qi)| qi.norm() > TERM_THRESHOLD)
        .map(|(i, &qi)| qterm(i, qi, n))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line per basis amplitude: index, real part, imaginary part and
/// optionally the binary expansion of the index.
pub fn dump_amplitudes(amps: &Array1<Complex64>, n: usize, show_binary: bool) -> String {
    let width = amps.len().saturating_sub(1).to_string().len();
    let mut out = String::new();
    for (i, a) in amps.iter().enumerate() {
        let _ = write!(out, "{i:>width$}: {:+.6} {:+.6}i", a.re, a.im);
        if show_binary {
            let _ = write!(out, "  |{}>", basis_label(i, n));
        }
        out.push('\n');
    }
    out
}

/// Row-per-line rendering of a complex matrix.
pub fn dump_matrix(m: &Array2<Complex64>) -> String {
    let mut out = String::new();
    for row in m.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|x| format!("({:.4} {:+.4}i)", x.re, x.im))
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}
