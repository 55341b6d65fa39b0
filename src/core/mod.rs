// src/core/mod.rs

//! Core data structures and types

// Declare modules within core
pub mod error;
pub mod phases;
pub mod state;

// Re-export public types for convenient access via `lly_dml::core::TypeName`
pub use error::{LlyError, LlyResult, QubitId};
pub use phases::{InputPhaseMatrix, PhaseMatrix, PhaseVector, TrainingPhaseMatrix};
pub use state::StateVector;

pub mod constants;
pub use constants::lly_constants::{MAX_STATE_VECTOR_BYTES, PHASES_PER_QUBIT, PI, TWO_PI}; // Re-export
