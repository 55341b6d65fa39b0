// src/operations/mod.rs

//! Defines the gates emitted by the phase encoder.
//!
//! The encoder only ever needs three primitives: a parametric phase shift, the
//! fixed Hadamard mixing step, and a terminal measurement. Backends receive
//! flat sequences of these.

use crate::core::QubitId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single gate acting on one qubit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)] // PartialEq on f64 is fine for structural comparison of built sequences
pub enum Gate {
    /// Phase shift `diag(1, e^(iθ))` on `target`.
    ///
    /// Analogy: Qiskit's `p(theta, qubit)`.
    Phase {
        /// The qubit whose |1⟩ amplitude picks up the phase.
        target: QubitId,
        /// Angle in radians.
        theta: f64,
    },

    /// Parameter-free mixing step between phase pairs.
    Hadamard {
        /// The qubit being mixed.
        target: QubitId,
    },

    /// Terminal measurement of `target` into the outcome bitstring.
    Measure {
        /// The qubit being sampled.
        target: QubitId,
    },
}

impl Gate {
    /// The qubit this gate acts on.
    pub fn target(&self) -> QubitId {
        match self {
            Gate::Phase { target, .. } => *target,
            Gate::Hadamard { target } => *target,
            Gate::Measure { target } => *target,
        }
    }

    /// Short symbol used in circuit diagrams.
    pub fn symbol(&self) -> &'static str {
        match self {
            Gate::Phase { .. } => "P",
            Gate::Hadamard { .. } => "H",
            Gate::Measure { .. } => "M",
        }
    }

    /// `true` for measurement gates.
    pub fn is_measurement(&self) -> bool {
        matches!(self, Gate::Measure { .. })
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Phase { target, theta } => write!(f, "P({:.4}) {}", theta, target),
            Gate::Hadamard { target } => write!(f, "H {}", target),
            Gate::Measure { target } => write!(f, "M {}", target),
        }
    }
}
