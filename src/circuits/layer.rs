// src/circuits/layer.rs

use super::lgate::LGate;
use crate::core::{InputPhaseMatrix, LlyResult, QubitId, TrainingPhaseMatrix};
use crate::operations::Gate;

/// One round of encoding: an [`LGate`] per qubit.
///
/// The layer owns a copy of the training matrix it was built from and the
/// token's input matrix. Gates are derived from the current matrices on every
/// call to [`Layer::gates`], so replacing the training matrix takes effect on
/// the next execution without rebuilding the layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    qubits: usize,
    training: TrainingPhaseMatrix,
    input: InputPhaseMatrix,
}

impl Layer {
    /// Builds a layer over `qubits` qubits.
    ///
    /// # Errors
    /// Returns `LlyError::ShapeMismatch` if either matrix does not have exactly
    /// `qubits` columns.
    pub fn new(qubits: usize, training: TrainingPhaseMatrix, input: InputPhaseMatrix) -> LlyResult<Self> {
        training.ensure_qubits(qubits)?;
        input.ensure_qubits(qubits)?;
        Ok(Self { qubits, training, input })
    }

    pub fn qubits(&self) -> usize {
        self.qubits
    }

    pub fn training_phases(&self) -> &TrainingPhaseMatrix {
        &self.training
    }

    pub fn input_phases(&self) -> &InputPhaseMatrix {
        &self.input
    }

    /// Replaces the training matrix. The shape must not change.
    pub fn set_training_phases(&mut self, training: TrainingPhaseMatrix) -> LlyResult<()> {
        training.ensure_qubits(self.qubits)?;
        self.training = training;
        Ok(())
    }

    /// The encoding units for this layer, one per qubit in index order.
    pub fn units(&self) -> Vec<LGate> {
        self.training
            .columns()
            .iter()
            .zip(self.input.columns())
            .enumerate()
            .map(|(q, (tp, ip))| LGate::new(QubitId(q), *tp, *ip))
            .collect()
    }

    /// Concatenated gate sequence of all units.
    pub fn gates(&self) -> Vec<Gate> {
        self.units().iter().flat_map(LGate::gates).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LlyError, PhaseMatrix};

    #[test]
    fn builds_one_unit_per_qubit() -> LlyResult<()> {
        let layer = Layer::new(3, PhaseMatrix::zeros(3), PhaseMatrix::zeros(3))?;
        let units = layer.units();
        assert_eq!(units.len(), 3);
        assert_eq!(units[2].qubit(), QubitId(2));
        assert_eq!(layer.gates().len(), 3 * 8);
        Ok(())
    }

    #[test]
    fn rejects_matrices_of_wrong_width() {
        let err = Layer::new(2, PhaseMatrix::zeros(3), PhaseMatrix::zeros(2)).unwrap_err();
        assert_eq!(err, LlyError::ShapeMismatch { expected: 2, got: 3 });
    }

    #[test]
    fn replaced_training_phases_show_up_in_next_gates() -> LlyResult<()> {
        let mut layer = Layer::new(1, PhaseMatrix::zeros(1), PhaseMatrix::zeros(1))?;
        layer.set_training_phases(PhaseMatrix::from_columns([[0.7, 0.8, 0.9]]))?;
        let gates = layer.gates();
        assert_eq!(gates[0], Gate::Phase { target: QubitId(0), theta: 0.7 });
        assert_eq!(gates[3], Gate::Phase { target: QubitId(0), theta: 0.8 });
        Ok(())
    }
}
