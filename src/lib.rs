// src/lib.rs

//! `lly_dml` - Phase-encoded token circuits with sampled training-phase optimization
//!
//! Words are encoded as layers of single-qubit phase gates: every qubit gets a
//! learned training phase and a token-derived input phase per slot, mixed by
//! Hadamards. Sampling the circuit gives an outcome distribution, and an
//! optimizer nudges the training phases until a chosen outcome dominates.
//! Pairs of words are chained into two-layer circuits and trained toward the
//! outcome of a third word.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod validation;
pub mod distribution;
pub mod optimizer;
pub mod tokenizer;
pub mod config;
pub mod training;
pub mod telemetry;

// Re-export the most common types for easier top-level use
pub use crate::core::{InputPhaseMatrix, LlyError, LlyResult, PhaseMatrix, PhaseVector, QubitId, TrainingPhaseMatrix};
pub use operations::Gate;
pub use circuits::{Circuit, LGate, Layer};
pub use simulation::{Backend, OutcomeCounts, StateVectorSimulator};
pub use distribution::{argmax, most_likely, normalize, try_normalize, Distribution};
pub use optimizer::{AdamPolicy, OptimizationResult, Optimizer, OptimizerKind, StochasticPolicy, UpdatePolicy};
pub use tokenizer::{HashTokenizer, Tokenizer, VocabularyTokenizer};
pub use config::{Composition, TrainingConfig};
pub use training::{ComparisonRow, ItemFailure, Summary, Trainer, TrainingReport};
pub use validation::{check_normalization, check_probability_sum};

// Example 1: Encoding a single word and sampling it
// One layer over two qubits, executed on the bundled simulator.
/// ```
/// use lly_dml::{Circuit, HashTokenizer, Layer, LlyError, PhaseMatrix, StateVectorSimulator, Tokenizer};
///
/// let input = HashTokenizer::new().tokenize("cat", 2)?;
/// let layer = Layer::new(2, PhaseMatrix::zeros(2), input)?;
/// let mut circuit = Circuit::new(2, vec![layer], 256)?;
///
/// let mut simulator = StateVectorSimulator::with_seed(7);
/// let counts = circuit.execute(&mut simulator)?;
/// assert_eq!(counts.total(), 256);
///
/// let (outcome, probability) = lly_dml::most_likely(counts).expect("256 shots were sampled");
/// assert_eq!(outcome.len(), 2);
/// assert!(probability > 0.0 && probability <= 1.0);
/// # Ok::<(), LlyError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: A full training run
// Creation, single-word training, composition training and comparison.
/// ```
/// use lly_dml::{HashTokenizer, LlyError, StateVectorSimulator, Trainer, TrainingConfig};
///
/// let config = TrainingConfig::from_json_str(r#"{
///     "single_words": ["cat", "dog"],
///     "word_combinations": { "cat dog": "cat" },
///     "iterations": 5,
///     "shots": 128,
///     "seed": 1
/// }"#)?;
///
/// let mut trainer = Trainer::new(config, Box::new(HashTokenizer::new()))?;
/// let report = trainer.run(&mut StateVectorSimulator::with_seed(1))?;
///
/// assert_eq!(report.creation.len(), 2);
/// assert_eq!(report.final_summaries.len(), 3);
/// assert_eq!(report.comparison.len(), 2);
/// # Ok::<(), LlyError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
