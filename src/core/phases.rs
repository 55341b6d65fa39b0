// src/core/phases.rs

//! Phase vectors and the per-qubit phase matrices built from them.

use super::constants::{PHASES_PER_QUBIT, TWO_PI};
use super::error::{LlyError, LlyResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered triple of angles (radians) applied to one qubit.
///
/// Each qubit carries one training vector and one input vector; the encoding
/// unit interleaves the two.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseVector(pub [f64; PHASES_PER_QUBIT]);

impl PhaseVector {
    /// Creates a phase vector from three angles.
    pub fn new(p0: f64, p1: f64, p2: f64) -> Self {
        Self([p0, p1, p2])
    }

    /// Angle at `slot` (0, 1 or 2).
    pub fn get(&self, slot: usize) -> f64 {
        self.0[slot]
    }

    /// Read-only view of the three angles.
    pub fn as_array(&self) -> &[f64; PHASES_PER_QUBIT] {
        &self.0
    }
}

impl From<[f64; PHASES_PER_QUBIT]> for PhaseVector {
    fn from(values: [f64; PHASES_PER_QUBIT]) -> Self {
        Self(values)
    }
}

/// A qubit-count x 3 matrix of angles, stored as one [`PhaseVector`] column per qubit.
///
/// The same shape serves two roles:
/// - [`TrainingPhaseMatrix`]: the learned parameters, copied into every circuit
///   built for one run and replaced by the optimizer between executions.
/// - [`InputPhaseMatrix`]: the fixed angles a tokenizer derives from one token.
///
/// The shape never changes after construction; elementwise operations require
/// both operands to have the same qubit count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseMatrix {
    columns: Vec<PhaseVector>,
}

/// Learned phases shared by the layers of one circuit.
pub type TrainingPhaseMatrix = PhaseMatrix;

/// Fixed phases derived from a single token.
pub type InputPhaseMatrix = PhaseMatrix;

impl PhaseMatrix {
    /// All-zero matrix covering `qubits` qubits.
    pub fn zeros(qubits: usize) -> Self {
        Self { columns: vec![PhaseVector::default(); qubits] }
    }

    /// Builds a matrix from explicit per-qubit columns.
    pub fn from_columns<I>(columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PhaseVector>,
    {
        Self { columns: columns.into_iter().map(Into::into).collect() }
    }

    /// Draws every angle uniformly from `[0, 2π)`.
    pub fn random<R: Rng>(qubits: usize, rng: &mut R) -> Self {
        let columns = (0..qubits)
            .map(|_| {
                PhaseVector([
                    rng.random::<f64>() * TWO_PI,
                    rng.random::<f64>() * TWO_PI,
                    rng.random::<f64>() * TWO_PI,
                ])
            })
            .collect();
        Self { columns }
    }

    /// Number of qubit columns.
    pub fn qubits(&self) -> usize {
        self.columns.len()
    }

    /// The three phases for `qubit`, or `None` when out of range.
    pub fn column(&self, qubit: usize) -> Option<&PhaseVector> {
        self.columns.get(qubit)
    }

    /// All columns in qubit order.
    pub fn columns(&self) -> &[PhaseVector] {
        &self.columns
    }

    /// Fails with [`LlyError::ShapeMismatch`] unless this matrix covers exactly `qubits` qubits.
    pub fn ensure_qubits(&self, qubits: usize) -> LlyResult<()> {
        if self.qubits() != qubits {
            return Err(LlyError::ShapeMismatch { expected: qubits, got: self.qubits() });
        }
        Ok(())
    }

    /// Applies `f` to every angle.
    pub fn map<F>(&self, mut f: F) -> Self
    where
        F: FnMut(f64) -> f64,
    {
        let columns = self
            .columns
            .iter()
            .map(|c| PhaseVector([f(c.0[0]), f(c.0[1]), f(c.0[2])]))
            .collect();
        Self { columns }
    }

    /// Combines two equally shaped matrices angle by angle.
    pub fn zip_map<F>(&self, other: &Self, mut f: F) -> LlyResult<Self>
    where
        F: FnMut(f64, f64) -> f64,
    {
        other.ensure_qubits(self.qubits())?;
        let columns = self
            .columns
            .iter()
            .zip(other.columns.iter())
            .map(|(a, b)| {
                PhaseVector([f(a.0[0], b.0[0]), f(a.0[1], b.0[1]), f(a.0[2], b.0[2])])
            })
            .collect();
        Ok(Self { columns })
    }

    /// Iterates over every angle, qubit-major.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.columns.iter().flat_map(|c| c.0.iter().copied())
    }
}

impl fmt::Display for PhaseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PhaseMatrix[{} qubits]", self.columns.len())?;
        for (q, c) in self.columns.iter().enumerate() {
            writeln!(f, "  q{}: [{:.4}, {:.4}, {:.4}]", q, c.0[0], c.0[1], c.0[2])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn random_matrix_stays_in_one_turn() {
        let mut rng = StdRng::seed_from_u64(11);
        let m = PhaseMatrix::random(4, &mut rng);
        assert_eq!(m.qubits(), 4);
        assert!(m.values().all(|v| (0.0..TWO_PI).contains(&v)));
    }

    #[test]
    fn zip_map_rejects_mismatched_shapes() {
        let a = PhaseMatrix::zeros(2);
        let b = PhaseMatrix::zeros(3);
        assert_eq!(
            a.zip_map(&b, |x, y| x + y),
            Err(LlyError::ShapeMismatch { expected: 2, got: 3 })
        );
    }

    #[test]
    fn zip_map_is_elementwise() -> LlyResult<()> {
        let a = PhaseMatrix::from_columns([[1.0, 2.0, 3.0]]);
        let b = PhaseMatrix::from_columns([[0.5, 0.5, 0.5]]);
        let sum = a.zip_map(&b, |x, y| x + y)?;
        assert_eq!(sum.column(0), Some(&PhaseVector::new(1.5, 2.5, 3.5)));
        Ok(())
    }
}
