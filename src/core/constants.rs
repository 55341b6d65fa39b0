//! Numeric constants shared by the encoder and the optimizer.

/// Constants used across the crate
pub mod lly_constants {
    /// Used for phase angles (`e^(iθ)`)
    pub const PI: f64 = std::f64::consts::PI;
    /// One full turn; randomly initialised phases are drawn from `[0, TWO_PI)`.
    pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;
    /// Phase slots per qubit in both the training and the input matrix.
    pub const PHASES_PER_QUBIT: usize = 3;

    /// Adam first-moment decay.
    pub const DEFAULT_BETA1: f64 = 0.9;
    /// Adam second-moment decay.
    pub const DEFAULT_BETA2: f64 = 0.999;
    /// Adam denominator guard.
    pub const DEFAULT_EPSILON: f64 = 1e-8;

    /// Default optimizer step size / noise scale.
    pub const DEFAULT_LEARNING_RATE: f64 = 0.01;
    /// Default iteration budget per optimization run.
    pub const DEFAULT_ITERATIONS: usize = 100;
    /// Largest state vector the bundled simulator will allocate (4 GiB, 28 qubits).
    pub const MAX_STATE_VECTOR_BYTES: u64 = 1 << 32;

    /// Default shot count per execution.
    pub const DEFAULT_SHOTS: u32 = 1024;
}

pub use lly_constants::*;
