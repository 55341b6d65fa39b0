// src/simulation/mod.rs

//! Execution backends for encoded circuits.
//!
//! The training code only depends on the [`Backend`] trait: "run this gate
//! sequence over this many qubits, draw this many samples". The bundled
//! [`StateVectorSimulator`] implements it with an internal dense
//! `SimulationEngine`; tests substitute deterministic fakes.

mod results;
pub(crate) mod engine;

pub use results::OutcomeCounts;

use crate::core::{LlyError, LlyResult, QubitId};
use crate::operations::Gate;
use engine::SimulationEngine;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

/// An execution capability that samples a gate sequence.
pub trait Backend {
    /// Executes `gates` on a fresh `qubits`-qubit register and draws `shots` samples.
    ///
    /// The returned counts sum to `shots`.
    fn execute(&mut self, gates: &[Gate], qubits: usize, shots: u32) -> LlyResult<OutcomeCounts>;
}

/// Exact state-vector simulator with Born-rule sampling.
///
/// Measurements must come after every unitary gate; each qubit may be
/// measured at most once per sequence.
pub struct StateVectorSimulator {
    rng: StdRng,
}

impl StateVectorSimulator {
    /// Creates a simulator seeded from the operating system.
    pub fn new() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }

    /// Creates a simulator whose samples are reproducible for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for StateVectorSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for StateVectorSimulator {
    fn execute(&mut self, gates: &[Gate], qubits: usize, shots: u32) -> LlyResult<OutcomeCounts> {
        let mut engine = SimulationEngine::init(qubits)?;
        let mut measured: Vec<QubitId> = Vec::new();

        for gate in gates {
            match gate {
                Gate::Measure { target } => {
                    if measured.contains(target) {
                        return Err(LlyError::SimulationError {
                            message: format!("{} is measured more than once", target),
                        });
                    }
                    measured.push(*target);
                }
                _ if !measured.is_empty() => {
                    return Err(LlyError::SimulationError {
                        message: format!("gate '{}' follows a measurement; only terminal measurement is supported", gate),
                    });
                }
                _ => engine.apply_gate(gate)?,
            }
        }

        debug!(gates = gates.len(), qubits, shots, "executing gate sequence");
        engine.sample(&measured, shots, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn q(i: usize) -> QubitId {
        QubitId(i)
    }

    #[test]
    fn counts_sum_to_shots() -> LlyResult<()> {
        let mut sim = StateVectorSimulator::with_seed(1);
        let gates = [Gate::Hadamard { target: q(0) }, Gate::Hadamard { target: q(1) }, Gate::Measure { target: q(0) }, Gate::Measure { target: q(1) }];
        let counts = sim.execute(&gates, 2, 500)?;
        assert_eq!(counts.total(), 500);
        Ok(())
    }

    #[test]
    fn phase_kickback_is_deterministic() -> LlyResult<()> {
        // H P(π) H |0> = |1>
        let mut sim = StateVectorSimulator::with_seed(2);
        let gates = [
            Gate::Hadamard { target: q(0) },
            Gate::Phase { target: q(0), theta: PI },
            Gate::Hadamard { target: q(0) },
            Gate::Measure { target: q(0) },
        ];
        let counts = sim.execute(&gates, 1, 128)?;
        assert_eq!(counts.get("1"), 128);
        Ok(())
    }

    #[test]
    fn same_seed_same_counts() -> LlyResult<()> {
        let gates = [Gate::Hadamard { target: q(0) }, Gate::Measure { target: q(0) }];
        let a = StateVectorSimulator::with_seed(9).execute(&gates, 1, 200)?;
        let b = StateVectorSimulator::with_seed(9).execute(&gates, 1, 200)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn gate_after_measurement_is_rejected() {
        let gates = [Gate::Measure { target: q(0) }, Gate::Hadamard { target: q(0) }];
        let result = StateVectorSimulator::with_seed(0).execute(&gates, 1, 1);
        assert!(matches!(result, Err(LlyError::SimulationError { .. })));
    }

    #[test]
    fn zero_shots_yield_empty_counts() -> LlyResult<()> {
        let gates = [Gate::Measure { target: q(0) }];
        let counts = StateVectorSimulator::with_seed(0).execute(&gates, 1, 0)?;
        assert!(counts.is_empty());
        Ok(())
    }
}
