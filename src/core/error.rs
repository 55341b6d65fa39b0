//! Error handling logic

use std::fmt;
use thiserror::Error;

/// Index of a qubit within a circuit's register.
///
/// Indices are dense: a circuit over `n` qubits uses `QubitId(0)..QubitId(n - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct QubitId(pub usize);

impl QubitId {
    /// Returns the raw register index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Errors raised while building, executing or training phase-encoded circuits.
///
/// Configuration and unknown-target errors are scoped to the item being
/// processed; the [`Trainer`](crate::training::Trainer) records them per item
/// instead of aborting a whole run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LlyError {
    /// Qubit count or layer count is missing or zero, or a configured value is unusable.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// What was wrong with the configuration
        message: String,
    },

    /// Counts were requested from a circuit that has not been executed yet.
    #[error("Circuit has not been executed yet")]
    NotExecuted,

    /// A set of outcome counts sums to zero shots.
    #[error("Empty distribution: total shot count is zero")]
    EmptyDistribution,

    /// A composition names a result word that never appeared as a single word.
    #[error("Unknown result word '{word}': not present among single-word summaries")]
    UnknownResultWord {
        /// The result word that could not be resolved
        word: String,
    },

    /// A phase matrix does not cover the circuit's qubits.
    #[error("Phase matrix shape mismatch: expected {expected} qubit columns, got {got}")]
    ShapeMismatch {
        /// Qubit columns required
        expected: usize,
        /// Qubit columns provided
        got: usize,
    },

    /// A tokenizer has no phases for the requested token.
    #[error("Unknown token '{token}'")]
    UnknownToken {
        /// The token that could not be resolved
        token: String,
    },

    /// A gate targets a qubit outside the register.
    #[error("Qubit {qubit} out of range for a {qubits}-qubit register")]
    QubitOutOfRange {
        /// The offending qubit
        qubit: QubitId,
        /// Register size
        qubits: usize,
    },

    /// General error encountered inside the execution backend.
    #[error("Simulation Process Error: {message}")]
    SimulationError {
        /// SimulationError failure message
        message: String,
    },

    /// A training phase was started before the phase it depends on.
    #[error("Training phase out of order: {message}")]
    OutOfOrder {
        /// Which prerequisite is missing
        message: String,
    },

    /// Reading a configuration source failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// A configuration source could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type used throughout the crate.
pub type LlyResult<T> = Result<T, LlyError>;
