//! Trains a small vocabulary end to end on the bundled simulator.
//!
//! Usage: `cargo run --example train_vocabulary -- [config.json] [report.json]`
//!
//! Without arguments it reads `demos/train.json` and prints the tables only.
//! `LLY_*` variables (or a `.env` file) override the config; `RUST_LOG`
//! controls log output.

use lly_dml::{HashTokenizer, LlyError, StateVectorSimulator, Summary, Trainer, TrainingConfig, telemetry};
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = "demos/train.json";

fn print_table(title: &str, rows: &[Summary]) {
    println!("\n{}:", title);
    println!("{:<20} {:>10} {:>8} counts", "label", "outcome", "p");
    for row in rows {
        println!("{}", row);
    }
}

fn main() -> Result<(), LlyError> {
    telemetry::init_tracing("info");

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let report_path = args.next().map(PathBuf::from);

    let config = TrainingConfig::load(Some(config_path.as_path()))?;
    println!(
        "Loaded configuration: {} qubits, {} layers, {} iterations, {} shots ({})",
        config.qubit_count(),
        config.layer_count(),
        config.iterations,
        config.shots,
        config.optimizer
    );

    let mut simulator = match config.seed {
        Some(seed) => StateVectorSimulator::with_seed(seed),
        None => StateVectorSimulator::new(),
    };
    let mut trainer = Trainer::new(config, Box::new(HashTokenizer::new()))?;
    println!("\nTraining phases (shared):\n{}", trainer.training_phases());

    let report = trainer.run(&mut simulator)?;

    print_table("Initial summary", &report.creation);
    print_table("Final summary", &report.final_summaries);

    println!("\nComparison of initial and final states:");
    for row in &report.comparison {
        println!("{}", row);
    }

    if !report.failures.is_empty() {
        println!("\nFailed items:");
        for failure in &report.failures {
            println!("  {}", failure);
        }
    }

    if let Some(path) = report_path {
        std::fs::write(&path, report.to_json()?).map_err(|e| LlyError::Io(e.to_string()))?;
        println!("\nReport written to {}", path.display());
    }
    Ok(())
}
