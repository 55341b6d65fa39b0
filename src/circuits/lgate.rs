// src/circuits/lgate.rs

//! The per-qubit encoding unit.

use crate::core::{PhaseVector, QubitId};
use crate::operations::Gate;

/// One encoding unit: interleaves a qubit's training and input phases.
///
/// The emitted sequence is
///
/// ```text
/// P(tp0) P(ip0) H P(tp1) P(ip1) H P(tp2) P(ip2)
/// ```
///
/// with the Hadamard only between phase pairs, never after the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct LGate {
    qubit: QubitId,
    training: PhaseVector,
    input: PhaseVector,
}

impl LGate {
    /// Creates the unit for `qubit`.
    pub fn new(qubit: QubitId, training: PhaseVector, input: PhaseVector) -> Self {
        Self { qubit, training, input }
    }

    /// The qubit this unit acts on.
    pub fn qubit(&self) -> QubitId {
        self.qubit
    }

    /// Builds the gate sequence. Pure function of the unit's three inputs.
    pub fn gates(&self) -> Vec<Gate> {
        let slots = self.training.as_array().len();
        let mut gates = Vec::with_capacity(slots * 3 - 1);
        for slot in 0..slots {
            gates.push(Gate::Phase { target: self.qubit, theta: self.training.get(slot) });
            gates.push(Gate::Phase { target: self.qubit, theta: self.input.get(slot) });
            if slot + 1 < slots {
                gates.push(Gate::Hadamard { target: self.qubit });
            }
        }
        gates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_three_phase_pairs_with_two_mixing_steps() {
        let q = QubitId(1);
        let unit = LGate::new(q, PhaseVector::new(0.1, 0.2, 0.3), PhaseVector::new(1.1, 1.2, 1.3));
        let expected = vec![
            Gate::Phase { target: q, theta: 0.1 },
            Gate::Phase { target: q, theta: 1.1 },
            Gate::Hadamard { target: q },
            Gate::Phase { target: q, theta: 0.2 },
            Gate::Phase { target: q, theta: 1.2 },
            Gate::Hadamard { target: q },
            Gate::Phase { target: q, theta: 0.3 },
            Gate::Phase { target: q, theta: 1.3 },
        ];
        assert_eq!(unit.gates(), expected);
    }

    #[test]
    fn identical_inputs_build_identical_sequences() {
        let tp = PhaseVector::new(2.0, 4.0, 6.0);
        let ip = PhaseVector::new(0.5, 1.5, 2.5);
        let first = LGate::new(QubitId(0), tp, ip);
        let other = LGate::new(QubitId(3), ip, tp);
        let _ = other.gates();
        let second = LGate::new(QubitId(0), tp, ip);
        assert_eq!(second.gates(), first.gates());
        assert_eq!(first, second);
    }
}
