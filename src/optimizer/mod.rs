// src/optimizer/mod.rs

//! Gradient-free search over a circuit's training phases.
//!
//! [`Optimizer`] owns the iteration template: evaluate the current best
//! matrix, ask an [`UpdatePolicy`] for a candidate, evaluate the candidate, and
//! keep it only if it lowers the loss. Policies differ only in how candidates
//! are proposed.

mod adam;
mod stochastic;

pub use adam::AdamPolicy;
pub use stochastic::StochasticPolicy;

use crate::circuits::Circuit;
use crate::core::{LlyError, LlyResult, TrainingPhaseMatrix};
use crate::distribution::{self, Distribution};
use crate::simulation::{Backend, OutcomeCounts};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Proposes the next candidate training matrix.
pub trait UpdatePolicy {
    /// Returns a candidate derived from `current`. Stateful policies advance
    /// their internal step here.
    fn propose(&mut self, current: &TrainingPhaseMatrix, rng: &mut StdRng) -> LlyResult<TrainingPhaseMatrix>;

    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;
}

/// Selects an [`UpdatePolicy`] from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    /// Moment-adaptive updates driven by resampled noise.
    #[default]
    Adam,
    /// Plain Gaussian hill climbing.
    Stochastic,
}

impl OptimizerKind {
    /// Builds a fresh policy with the given learning rate.
    pub fn build(self, learning_rate: f64) -> LlyResult<Box<dyn UpdatePolicy>> {
        Ok(match self {
            OptimizerKind::Adam => Box::new(AdamPolicy::new(learning_rate)?),
            OptimizerKind::Stochastic => Box::new(StochasticPolicy::new(learning_rate)?),
        })
    }
}

impl std::str::FromStr for OptimizerKind {
    type Err = LlyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adam" => Ok(OptimizerKind::Adam),
            "stochastic" => Ok(OptimizerKind::Stochastic),
            other => Err(LlyError::InvalidConfiguration {
                message: format!("unknown optimizer '{}' (expected 'adam' or 'stochastic')", other),
            }),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerKind::Adam => write!(f, "adam"),
            OptimizerKind::Stochastic => write!(f, "stochastic"),
        }
    }
}

/// Outcome of one [`Optimizer::optimize`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// Best training matrix found (the initial one if nothing improved).
    pub best_phases: TrainingPhaseMatrix,
    /// Loss of `best_phases` when it was accepted.
    pub best_loss: f64,
    /// Loss of the circuit's matrix before the first iteration.
    pub initial_loss: f64,
    /// Target probability before the first iteration.
    pub initial_probability: f64,
    /// Distribution sampled before the first iteration.
    pub initial_distribution: Distribution,
    /// Loss of the current best matrix at the start of every iteration.
    pub losses: Vec<f64>,
    /// Number of candidates that replaced the best matrix.
    pub accepted: usize,
}

/// `-P(target)`: -1.0 when the target is certain, 0.0 when it never occurs.
pub fn loss(counts: &OutcomeCounts, target: &str) -> f64 {
    // Subtraction keeps an absent target at +0.0 rather than -0.0.
    0.0 - distribution::probability_of(counts, target)
}

/// Runs a fixed budget of propose/evaluate/accept iterations toward `target`.
pub struct Optimizer {
    target: String,
    max_iterations: usize,
    policy: Box<dyn UpdatePolicy>,
    rng: StdRng,
}

impl Optimizer {
    /// Creates an optimizer whose noise is seeded from the operating system.
    pub fn new(target: impl Into<String>, max_iterations: usize, policy: Box<dyn UpdatePolicy>) -> Self {
        Self { target: target.into(), max_iterations, policy, rng: StdRng::from_os_rng() }
    }

    /// Replaces the noise source, e.g. with a seeded one for reproducible runs.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Optimizes the training matrix shared by every layer of `circuit`.
    ///
    /// The search starts from the first layer's matrix. Each iteration
    /// executes the circuit twice: once for the current best matrix (whose
    /// loss goes into the trace) and once for the candidate, each assigned to
    /// all layers. On return every layer holds the best matrix found.
    pub fn optimize(&mut self, circuit: &mut Circuit, backend: &mut dyn Backend) -> LlyResult<OptimizationResult> {
        let initial = circuit
            .shared_training_phases()
            .cloned()
            .ok_or_else(|| LlyError::InvalidConfiguration { message: "circuit has no layer to optimize".to_string() })?;

        let initial_loss = self.evaluate(circuit, backend, &initial)?;
        let initial_counts = circuit.counts()?;
        let initial_probability = distribution::probability_of(initial_counts, &self.target);
        let initial_distribution = distribution::normalize(initial_counts);

        let mut best = initial;
        let mut best_loss = initial_loss;
        let mut losses = Vec::with_capacity(self.max_iterations);
        let mut accepted = 0;

        for iteration in 0..self.max_iterations {
            let reported = self.evaluate(circuit, backend, &best)?;
            losses.push(reported);

            let candidate = self.policy.propose(&best, &mut self.rng)?;
            let candidate_loss = self.evaluate(circuit, backend, &candidate)?;

            let improved = candidate_loss < best_loss;
            if improved {
                best = candidate;
                best_loss = candidate_loss;
                accepted += 1;
            }
            debug!(
                policy = self.policy.name(),
                target_outcome = %self.target,
                iteration,
                loss = reported,
                candidate_loss,
                best_loss,
                accepted = improved,
                "optimizer step"
            );
        }

        circuit.set_shared_training_phases(best.clone())?;
        Ok(OptimizationResult {
            best_phases: best,
            best_loss,
            initial_loss,
            initial_probability,
            initial_distribution,
            losses,
            accepted,
        })
    }

    fn evaluate(&self, circuit: &mut Circuit, backend: &mut dyn Backend, phases: &TrainingPhaseMatrix) -> LlyResult<f64> {
        circuit.set_shared_training_phases(phases.clone())?;
        let counts = circuit.execute(backend)?;
        Ok(loss(counts, &self.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::Layer;
    use crate::core::{PhaseMatrix, QubitId};
    use crate::operations::Gate;

    /// Always reports the same outcome for every shot.
    struct FixedBackend {
        outcome: &'static str,
        calls: usize,
    }

    impl Backend for FixedBackend {
        fn execute(&mut self, _gates: &[Gate], _qubits: usize, shots: u32) -> LlyResult<OutcomeCounts> {
            self.calls += 1;
            Ok(OutcomeCounts::from_pairs([(self.outcome, u64::from(shots))]))
        }
    }

    /// Deterministic: P("1") = sin²(θ/2) for the first phase gate on q0.
    struct AngleBackend;

    impl Backend for AngleBackend {
        fn execute(&mut self, gates: &[Gate], _qubits: usize, shots: u32) -> LlyResult<OutcomeCounts> {
            let theta = gates
                .iter()
                .find_map(|g| match g {
                    Gate::Phase { target: QubitId(0), theta } => Some(*theta),
                    _ => None,
                })
                .unwrap_or(0.0);
            let ones = ((theta / 2.0).sin().powi(2) * f64::from(shots)).round() as u64;
            let shots = u64::from(shots);
            Ok(OutcomeCounts::from_pairs([("1", ones), ("0", shots - ones)]))
        }
    }

    fn circuit(training: PhaseMatrix) -> Circuit {
        let layer = Layer::new(1, training, PhaseMatrix::zeros(1)).unwrap();
        Circuit::new(1, vec![layer], 100).unwrap()
    }

    fn seeded(kind: OptimizerKind, target: &str, iterations: usize) -> Optimizer {
        Optimizer::new(target, iterations, kind.build(0.3).unwrap()).with_rng(StdRng::seed_from_u64(42))
    }

    #[test]
    fn unreachable_target_keeps_zero_loss() -> LlyResult<()> {
        for kind in [OptimizerKind::Adam, OptimizerKind::Stochastic] {
            let mut backend = FixedBackend { outcome: "0", calls: 0 };
            let mut c = circuit(PhaseMatrix::zeros(1));
            let result = seeded(kind, "1", 12).optimize(&mut c, &mut backend)?;
            assert_eq!(result.losses.len(), 12);
            assert!(result.losses.iter().all(|l| *l == 0.0));
            let min = result.losses.iter().copied().fold(f64::INFINITY, f64::min);
            assert_eq!(min, 0.0);
            assert_eq!(result.accepted, 0);
            assert_eq!(result.best_phases, PhaseMatrix::zeros(1));
        }
        Ok(())
    }

    #[test]
    fn each_iteration_runs_two_executions() -> LlyResult<()> {
        let mut backend = FixedBackend { outcome: "0", calls: 0 };
        let mut c = circuit(PhaseMatrix::zeros(1));
        seeded(OptimizerKind::Stochastic, "0", 7).optimize(&mut c, &mut backend)?;
        assert_eq!(backend.calls, 1 + 2 * 7);
        Ok(())
    }

    #[test]
    fn best_loss_never_worsens() -> LlyResult<()> {
        for kind in [OptimizerKind::Adam, OptimizerKind::Stochastic] {
            let start = PhaseMatrix::from_columns([[1.0, 0.0, 0.0]]);
            let mut c = circuit(start);
            let result = seeded(kind, "1", 30).optimize(&mut c, &mut AngleBackend)?;
            assert!(result.best_loss <= result.initial_loss);
            // With a deterministic backend the reported trace is non-increasing.
            assert!(result.losses.windows(2).all(|w| w[1] <= w[0]));
            assert_eq!(c.training_phases(0), Some(&result.best_phases));
        }
        Ok(())
    }

    #[test]
    fn every_layer_ends_on_the_best_phases() -> LlyResult<()> {
        let start = PhaseMatrix::from_columns([[1.0, 0.0, 0.0]]);
        let layers = (0..2).map(|_| Layer::new(1, start.clone(), PhaseMatrix::zeros(1)).unwrap()).collect();
        let mut c = Circuit::new(1, layers, 100)?;
        let result = seeded(OptimizerKind::Stochastic, "1", 30).optimize(&mut c, &mut AngleBackend)?;
        assert!(result.accepted > 0);
        assert_ne!(result.best_phases, start);
        assert_eq!(c.training_phases(0), Some(&result.best_phases));
        assert_eq!(c.training_phases(1), Some(&result.best_phases));
        Ok(())
    }

    #[test]
    fn absent_target_loss_is_positive_zero() -> LlyResult<()> {
        let counts = OutcomeCounts::from_pairs([("0", 10)]);
        let l = loss(&counts, "1");
        assert!(l == 0.0 && l.is_sign_positive());
        assert_eq!(serde_json::to_string(&l).map_err(|e| LlyError::Parse(e.to_string()))?, "0.0");

        let result = seeded(OptimizerKind::Adam, "1", 2)
            .optimize(&mut circuit(PhaseMatrix::zeros(1)), &mut FixedBackend { outcome: "0", calls: 0 })?;
        assert!(result.losses.iter().all(|l| l.is_sign_positive()));
        assert!(result.initial_probability.is_sign_positive());
        Ok(())
    }

    #[test]
    fn already_optimal_phases_are_kept_or_matched() -> LlyResult<()> {
        let start = PhaseMatrix::from_columns([[std::f64::consts::PI, 0.0, 0.0]]);
        let mut c = circuit(start);
        let result = seeded(OptimizerKind::Adam, "1", 10).optimize(&mut c, &mut AngleBackend)?;
        assert_eq!(result.initial_loss, -1.0);
        assert!(result.best_loss <= result.initial_loss);
        assert_eq!(result.initial_probability, 1.0);
        Ok(())
    }

    #[test]
    fn optimizer_kind_parses_case_insensitively() {
        assert_eq!("Adam".parse::<OptimizerKind>(), Ok(OptimizerKind::Adam));
        assert_eq!(" stochastic ".parse::<OptimizerKind>(), Ok(OptimizerKind::Stochastic));
        assert!(matches!("sgd".parse::<OptimizerKind>(), Err(LlyError::InvalidConfiguration { .. })));
    }

    #[test]
    fn negative_learning_rate_is_rejected() {
        assert!(matches!(OptimizerKind::Adam.build(-0.1), Err(LlyError::InvalidConfiguration { .. })));
        assert!(matches!(OptimizerKind::Stochastic.build(f64::NAN), Err(LlyError::InvalidConfiguration { .. })));
    }
}
