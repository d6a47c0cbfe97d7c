// End-to-end circuits run through the public API.

use approx::assert_abs_diff_eq;
use num_complex::Complex64;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rqsim::{DensityMatrix, Gate, NoiseChannel, SimError, StateVector, ket};

// ============================================================================
// Deutsch's algorithm
// ============================================================================

fn deutsch(oracle: impl Fn(&mut StateVector), rng: &mut StdRng) -> u8 {
    // x on qubit 0, ancilla y = |1> on qubit 1
    let mut state = StateVector::with_basis_state(2, 0b10).unwrap();
    state.h(0).unwrap().h(1).unwrap();
    oracle(&mut state);
    state.h(0).unwrap();
    let result = state.measure_qubit(0, rng).unwrap();
    assert_abs_diff_eq!(result.outcome_probability(), 1.0, epsilon = 1e-10);
    result.outcome
}

#[test]
fn deutsch_distinguishes_constant_from_balanced() {
    let mut rng = StdRng::seed_from_u64(11);

    assert_eq!(deutsch(|_| {}, &mut rng), 0);
    assert_eq!(
        deutsch(
            |s| {
                s.x(1).unwrap();
            },
            &mut rng
        ),
        0
    );
    assert_eq!(
        deutsch(
            |s| {
                s.cnot(0, 1).unwrap();
            },
            &mut rng
        ),
        1
    );
    assert_eq!(
        deutsch(
            |s| {
                s.x(0).unwrap().cnot(0, 1).unwrap().x(0).unwrap();
            },
            &mut rng
        ),
        1
    );
}

// ============================================================================
// Multi-qubit gates
// ============================================================================

#[test]
fn cnot_truth_table() {
    // (input index, expected output) with control qubit 0, target qubit 1
    for (input, expected) in [(0b00, 0b00), (0b01, 0b11), (0b10, 0b10), (0b11, 0b01)] {
        let mut state = StateVector::with_basis_state(2, input).unwrap();
        state.cnot(0, 1).unwrap();
        assert_abs_diff_eq!(state.probabilities()[expected], 1.0, epsilon = 1e-12);
    }
}

#[test]
fn toffoli_decomposition_matches_direct_on_superposition() {
    let amplitudes: Vec<Complex64> = (0..16)
        .map(|i| Complex64::new((i as f64 * 0.7).cos(), (i as f64 * 1.3).sin()))
        .collect();
    let reference = StateVector::from_amplitudes(amplitudes).unwrap();

    for (c1, c2, t) in [(0, 1, 2), (3, 0, 1), (2, 3, 0), (1, 2, 3)] {
        let mut decomposed = reference.clone();
        decomposed.toffoli(c1, c2, t).unwrap();
        let mut direct = reference.clone();
        direct.toffoli_direct(c1, c2, t).unwrap();
        assert!(
            decomposed.max_deviation(&direct) < 1e-10,
            "toffoli({c1}, {c2}, {t}) deviates by {}",
            decomposed.max_deviation(&direct)
        );
    }
}

#[test]
fn fredkin_swaps_only_when_control_set() {
    // |q2 q1 q0> = |0 1 1>: control q0 set, so q1 and q2 exchange
    let mut state = ket("011").unwrap();
    state.fredkin(0, 1, 2).unwrap();
    assert!(state.isclose(&ket("101").unwrap()));

    let mut state = ket("010").unwrap();
    state.fredkin(0, 1, 2).unwrap();
    assert!(state.isclose(&ket("010").unwrap()));
}

#[test]
fn grover_finds_marked_item_in_four() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut state = StateVector::new(2).unwrap();
    state.hadamard_all().unwrap();
    // oracle marking |11>
    state.cz(0, 1).unwrap();
    state.grover_diffusion().unwrap();

    let result = state.measure_all(&mut rng).unwrap();
    assert_eq!(result.index, 0b11);
    assert_eq!(result.bits, vec![1, 1]);
}

#[test]
fn ghz_measurement_is_correlated() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..20 {
        let mut state = StateVector::new(4).unwrap();
        state.h(0).unwrap();
        for q in 0..3 {
            state.cnot(q, q + 1).unwrap();
        }
        let result = state.measure_all(&mut rng).unwrap();
        assert!(result.index == 0 || result.index == 0b1111);
        assert_abs_diff_eq!(result.probability, 0.5, epsilon = 1e-12);
    }
}

#[test]
fn errors_leave_state_usable() {
    let mut state = StateVector::new(2).unwrap();
    assert!(matches!(
        state.x(2),
        Err(SimError::QubitOutOfRange { index: 2, num_qubits: 2 })
    ));
    assert!(matches!(state.cnot(1, 1), Err(SimError::DuplicateQubit(1))));
    state.x(1).unwrap();
    assert_eq!(state.terms(), "1.0|10>");
}

// ============================================================================
// Density matrices and noise
// ============================================================================

fn bell_density() -> DensityMatrix {
    let mut state = StateVector::new(2).unwrap();
    state.h(0).unwrap().cnot(0, 1).unwrap();
    DensityMatrix::from_state(&state).unwrap()
}

#[test]
fn density_engine_tracks_state_engine() {
    let mut state = StateVector::new(2).unwrap();
    let mut rho = DensityMatrix::from_state(&state).unwrap();

    state.h(0).unwrap().t(0).unwrap().cnot(0, 1).unwrap().s(1).unwrap();
    rho.apply_gate(Gate::H, 0)
        .unwrap()
        .apply_gate(Gate::T, 0)
        .unwrap()
        .apply_controlled_not(0, 1)
        .unwrap()
        .apply_gate(Gate::S, 1)
        .unwrap();

    let expected = DensityMatrix::from_state(&state).unwrap();
    for i in 0..4 {
        for j in 0..4 {
            let diff = rho.get(i, j).unwrap() - expected.get(i, j).unwrap();
            assert!(diff.norm() < 1e-12, "rho[{i}][{j}] off by {diff}");
        }
    }
    assert_abs_diff_eq!(rho.purity(), 1.0, epsilon = 1e-12);
}

#[test]
fn noisy_bell_pair_dephasing() {
    let p = 0.2;
    let mut rho = bell_density();
    rqsim::dephasing(&mut rho, 0, p).unwrap();

    assert_abs_diff_eq!(rho.trace().re, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(rho.get(0, 0).unwrap().re, 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(rho.get(3, 3).unwrap().re, 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(rho.get(0, 3).unwrap().re, 0.5 * (1.0 - 2.0 * p), epsilon = 1e-12);
    assert_abs_diff_eq!(
        rho.purity(),
        0.5 + 0.5 * (1.0 - 2.0 * p).powi(2),
        epsilon = 1e-12
    );
}

#[test]
fn noisy_bell_pair_amplitude_damping() {
    let gamma = 0.36;
    let mut rho = bell_density();
    rqsim::amplitude_damping(&mut rho, 0, gamma).unwrap();

    // |11> decays to |10>
    let probs = rho.probabilities();
    assert_abs_diff_eq!(probs[0b00], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(probs[0b01], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(probs[0b10], 0.5 * gamma, epsilon = 1e-12);
    assert_abs_diff_eq!(probs[0b11], 0.5 * (1.0 - gamma), epsilon = 1e-12);
    assert_abs_diff_eq!(rho.get(0, 3).unwrap().re, 0.5 * (1.0 - gamma).sqrt(), epsilon = 1e-12);
    assert!(rho.is_hermitian(1e-12));
}

#[test]
fn fully_depolarized_bell_pair_is_maximally_mixed() {
    let mut rho = bell_density();
    rho.apply_noise(&NoiseChannel::Depolarizing(1.0), 0).unwrap();

    for i in 0..4 {
        for j in 0..4 {
            let expected = if i == j { 0.25 } else { 0.0 };
            assert_abs_diff_eq!(rho.get(i, j).unwrap().re, expected, epsilon = 1e-12);
            assert_abs_diff_eq!(rho.get(i, j).unwrap().im, 0.0, epsilon = 1e-12);
        }
    }
    assert_abs_diff_eq!(rho.purity(), 0.25, epsilon = 1e-12);
}

#[test]
fn out_of_range_noise_is_rejected_without_mutation() {
    let mut rho = bell_density();
    let before = rho.matrix().clone();
    let err = rqsim::depolarizing(&mut rho, 0, 1.5).unwrap_err();
    assert!(matches!(err, SimError::InvalidParameter { .. }));
    assert_eq!(rho.matrix(), &before);
}
