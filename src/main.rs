// `rqsim` binary: demonstrations and a small benchmark for the simulator.
//
// # Usage
//
// ```bash
// cargo run --release -- deutsch --seed 7
// cargo run --release -- --config sim.json noise
// ```

use clap::{Parser, Subcommand};
use rqsim::config::SimConfig;
use rqsim::{DensityMatrix, Gate, GateApplier, StateVector, apply_and_dump};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// Command-line arguments for the simulator driver.
#[derive(Parser, Debug)]
#[command(
    name = "rqsim",
    version,
    about = "State-vector and density-matrix quantum simulator",
    long_about = None
)]
struct Args {
    /// Path to a JSON configuration file.
    ///
    /// If not provided, the default `SimConfig` is used.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the RNG seed from the config.
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run Deutsch's algorithm against all four one-bit oracles.
    Deutsch,
    /// Print the Toffoli truth table, decomposed vs. direct.
    Toffoli,
    /// Apply the configured noise channels to a superposed qubit.
    Noise,
    /// Walk the named single-qubit gates over |+>.
    Gates,
    /// Time GHZ preparation for growing registers.
    Bench {
        /// Largest register size to time.
        #[arg(long, default_value_t = 22)]
        max_qubits: usize,
    },
}

fn main() {
    let args = Args::parse();

    // RUST_LOG wins over --log-level when set
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    info!("rqsim v{}", rqsim::VERSION);

    let mut config = match args.config.as_deref() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            match SimConfig::from_json(path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    error!("Failed to load configuration: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => SimConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {e}");
        std::process::exit(1);
    }

    let outcome = match args.command {
        Command::Deutsch => run_deutsch(&config),
        Command::Toffoli => run_toffoli(),
        Command::Noise => run_noise(&config),
        Command::Gates => run_gates(&config),
        Command::Bench { max_qubits } => run_bench(max_qubits),
    };

    if let Err(e) = outcome {
        error!("Simulation failed: {e}");
        std::process::exit(1);
    }
}

/// One-bit oracle `U_f |x>|y> = |x>|y xor f(x)>` with x on qubit 0, y on qubit 1.
fn apply_oracle(state: &mut StateVector, oracle: usize) -> rqsim::Result<()> {
    match oracle {
        // f(x) = 0
        0 => {}
        // f(x) = 1
        1 => {
            state.x(1)?;
        }
        // f(x) = x
        2 => {
            state.cnot(0, 1)?;
        }
        // f(x) = not x
        _ => {
            state.x(0)?.cnot(0, 1)?.x(0)?;
        }
    }
    Ok(())
}

fn run_deutsch(config: &SimConfig) -> rqsim::Result<()> {
    const NAMES: [&str; 4] = ["constant 0", "constant 1", "balanced identity", "balanced not"];
    let mut rng = config.rng();

    for (oracle, name) in NAMES.iter().enumerate() {
        // |q1 q0> = |1 0>
        let mut state = StateVector::with_basis_state(2, 0b10)?;
        state.h(0)?.h(1)?;
        apply_oracle(&mut state, oracle)?;
        state.h(0)?;

        let result = state.measure_qubit(0, &mut rng)?;
        let verdict = if result.outcome == 0 { "constant" } else { "balanced" };
        println!("{name:<18} -> {verdict:<8} ({result})");
    }
    Ok(())
}

fn run_toffoli() -> rqsim::Result<()> {
    println!(" in  | decomposed | direct | deviation");
    for index in 0..8 {
        let mut decomposed = StateVector::with_basis_state(3, index)?;
        decomposed.toffoli(0, 1, 2)?;
        let mut direct = StateVector::with_basis_state(3, index)?;
        direct.toffoli_direct(0, 1, 2)?;

        println!(
            "|{index:03b}> | {:>10} | {:>6} | {:.2e}",
            decomposed.terms(),
            direct.terms(),
            decomposed.max_deviation(&direct)
        );
    }
    Ok(())
}

fn run_noise(config: &SimConfig) -> rqsim::Result<()> {
    let mut state = StateVector::new(2)?;
    state.h(0)?;
    let initial = DensityMatrix::from_state(&state)?;
    println!("Initial state {state}, purity {:.4}", initial.purity());
    println!("{}", initial.dump());

    for channel in config.noise.channels() {
        let mut rho = initial.clone();
        rho.apply_noise(&channel, 0)?;
        println!("After {channel} on qubit 0, purity {:.4}", rho.purity());
        println!("{}", rho.dump());
    }
    Ok(())
}

fn run_gates(config: &SimConfig) -> rqsim::Result<()> {
    let theta = std::f64::consts::FRAC_PI_3;
    let gates = [
        Gate::X,
        Gate::Y,
        Gate::Z,
        Gate::H,
        Gate::S,
        Gate::Sdg,
        Gate::T,
        Gate::Tdg,
        Gate::Phase(theta),
    ];

    for gate in gates {
        let mut state = StateVector::from_ket("+")?;
        println!("{} |+>:", gate.name());
        print!("{}", apply_and_dump(&mut state, &gate, 0, config.show_binary)?);
    }

    // closures are gate appliers too
    let bit_flip_then_h = |s: &mut StateVector, q: usize| -> rqsim::Result<()> {
        s.x(q)?.h(q)?;
        Ok(())
    };
    let mut state = StateVector::new(1)?;
    bit_flip_then_h.apply(&mut state, 0)?;
    println!("HX |0> = {state}");
    Ok(())
}

fn run_bench(max_qubits: usize) -> rqsim::Result<()> {
    for n in (10..=max_qubits).step_by(4) {
        let t0 = Instant::now();
        let mut state = StateVector::new(n)?;
        let setup = t0.elapsed();

        let t0 = Instant::now();
        state.h(0)?;
        for i in 0..n - 1 {
            state.cnot(i, i + 1)?;
        }
        let gates = t0.elapsed();

        println!(
            "{:2} qubits ({:>8} amps): setup {:>8.2?}, gates {:>8.2?} (H + {} CNOTs)",
            n,
            state.dim(),
            setup,
            gates,
            n - 1,
        );
    }
    Ok(())
}
