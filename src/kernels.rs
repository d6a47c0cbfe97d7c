// Amplitude update kernels.
//
// Every two-amplitude update reads both partners before writing either, so
// each pair is computed from its own pre-update snapshot. Pairs are disjoint,
// which lets large registers fan the blocks out over rayon with identical results.

use ndarray::{Array1, ArrayViewMut1, Axis, Zip};
use num_complex::Complex64;
use rayon::prelude::*;

/// Registers at or above this many amplitudes are updated on the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 1 << 14;

/// Visit every pair `(i, i | 1 << target)` with bit `target` of `i` clear.
///
/// `update` receives the low index `i` and mutable references to both amplitudes.
pub(crate) fn for_each_pair<F>(amps: &mut Array1<Complex64>, target: usize, update: F)
where
    F: Fn(usize, &mut Complex64, &mut Complex64) + Sync + Send,
{
    let half = 1usize << target;
    let block = half << 1;
    if amps.len() >= PARALLEL_THRESHOLD {
        amps.axis_chunks_iter_mut(Axis(0), block)
            .into_par_iter()
            .enumerate()
            .for_each(|(b, chunk)| update_block(b * block, chunk, half, &update));
    } else {
        amps.axis_chunks_iter_mut(Axis(0), block)
            .enumerate()
            .for_each(|(b, chunk)| update_block(b * block, chunk, half, &update));
    }
}

fn update_block<F>(base: usize, chunk: ArrayViewMut1<'_, Complex64>, half: usize, update: &F)
where
    F: Fn(usize, &mut Complex64, &mut Complex64),
{
    let (lo, hi) = chunk.split_at(Axis(0), half);
    Zip::indexed(lo)
        .and(hi)
        .for_each(|k, a0, a1| update(base + k, a0, a1));
}

/// Apply a 2x2 matrix to every pair on `target` whose index has all `control_mask` bits set.
///
/// An empty mask gives the plain single-qubit update.
pub(crate) fn apply_controlled_2x2(
    amps: &mut Array1<Complex64>,
    control_mask: usize,
    target: usize,
    m: [[Complex64; 2]; 2],
) {
    for_each_pair(amps, target, move |i, a0, a1| {
        if i & control_mask != control_mask {
            return;
        }
        let (q0, q1) = (*a0, *a1);
        *a0 = m[0][0] * q0 + m[0][1] * q1;
        *a1 = m[1][0] * q0 + m[1][1] * q1;
    });
}

/// Multiply every amplitude whose index has all `mask` bits set by `phase`.
pub(crate) fn apply_phase_mask(amps: &mut Array1<Complex64>, mask: usize, phase: Complex64) {
    let kernel = |i: usize, a: &mut Complex64| {
        if i & mask == mask {
            *a *= phase;
        }
    };
    if amps.len() >= PARALLEL_THRESHOLD {
        Zip::indexed(amps).par_for_each(kernel);
    } else {
        Zip::indexed(amps).for_each(kernel);
    }
}
