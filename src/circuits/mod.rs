// src/circuits/mod.rs

//! Defines the layered encoding circuit.
//!
//! A [`Circuit`] stacks one or more [`Layer`]s, each built from one token's
//! input phases and the circuit's single training matrix, and closes the
//! sequence with a measurement on every qubit. Executing it hands the full gate
//! sequence to an injected [`Backend`](crate::simulation::Backend).

mod layer;
mod lgate;

pub use layer::Layer;
pub use lgate::LGate;

use crate::core::{LlyError, LlyResult, QubitId, TrainingPhaseMatrix};
use crate::operations::Gate;
use crate::simulation::{Backend, OutcomeCounts};
use std::collections::HashMap;
use std::fmt;

/// An ordered stack of encoding layers plus terminal measurement.
///
/// The gate structure is fixed at construction; only the layers' training
/// matrices may be replaced afterwards. Every [`Circuit::execute`] call runs
/// the backend again and replaces the stored counts.
///
/// Analogy: Similar to a `qiskit.QuantumCircuit` built from repeated
/// parametric blocks and measured into a classical register of the same width.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    qubits: usize,
    layers: Vec<Layer>,
    shots: u32,
    last_counts: Option<OutcomeCounts>,
}

impl Circuit {
    /// Builds a circuit over `qubits` qubits from `layers`, sampled with `shots` shots.
    ///
    /// # Errors
    /// * `LlyError::InvalidConfiguration` if `qubits` is zero or `layers` is empty.
    /// * `LlyError::ShapeMismatch` if any layer covers a different number of qubits.
    pub fn new(qubits: usize, layers: Vec<Layer>, shots: u32) -> LlyResult<Self> {
        if qubits == 0 || layers.is_empty() {
            return Err(LlyError::InvalidConfiguration {
                message: format!(
                    "qubit count and layer count must be greater than 0 (got {} qubits, {} layers)",
                    qubits,
                    layers.len()
                ),
            });
        }
        if let Some(layer) = layers.iter().find(|l| l.qubits() != qubits) {
            return Err(LlyError::ShapeMismatch { expected: qubits, got: layer.qubits() });
        }
        Ok(Self { qubits, layers, shots, last_counts: None })
    }

    pub fn qubits(&self) -> usize {
        self.qubits
    }

    pub fn shots(&self) -> u32 {
        self.shots
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Training phases currently assigned to `layer`.
    pub fn training_phases(&self, layer: usize) -> Option<&TrainingPhaseMatrix> {
        self.layers.get(layer).map(Layer::training_phases)
    }

    /// The training matrix shared by the layers, read from the first one.
    pub fn shared_training_phases(&self) -> Option<&TrainingPhaseMatrix> {
        self.training_phases(0)
    }

    /// Assigns `training` to every layer. Takes effect on the next execution.
    ///
    /// # Errors
    /// Returns `LlyError::ShapeMismatch` if the matrix width differs from the qubit count.
    pub fn set_shared_training_phases(&mut self, training: TrainingPhaseMatrix) -> LlyResult<()> {
        training.ensure_qubits(self.qubits)?;
        for layer in &mut self.layers {
            layer.set_training_phases(training.clone())?;
        }
        Ok(())
    }

    /// Assigns new training phases to `layer` only. Takes effect on the next execution.
    ///
    /// # Errors
    /// * `LlyError::InvalidConfiguration` if `layer` does not exist.
    /// * `LlyError::ShapeMismatch` if the matrix width differs from the qubit count.
    pub fn set_training_phases(&mut self, layer: usize, training: TrainingPhaseMatrix) -> LlyResult<()> {
        let layer_count = self.layers.len();
        let target = self.layers.get_mut(layer).ok_or_else(|| LlyError::InvalidConfiguration {
            message: format!("layer {} does not exist in a {}-layer circuit", layer, layer_count),
        })?;
        target.set_training_phases(training)
    }

    /// Full gate sequence: every layer in order, then one measurement per qubit.
    pub fn gate_sequence(&self) -> Vec<Gate> {
        let mut gates: Vec<Gate> = self.layers.iter().flat_map(Layer::gates).collect();
        gates.extend((0..self.qubits).map(|q| Gate::Measure { target: QubitId(q) }));
        gates
    }

    /// Runs the circuit on `backend` and stores the fresh counts.
    pub fn execute(&mut self, backend: &mut dyn Backend) -> LlyResult<&OutcomeCounts> {
        let gates = self.gate_sequence();
        let counts = backend.execute(&gates, self.qubits, self.shots)?;
        let stored = self.last_counts.insert(counts);
        Ok(&*stored)
    }

    /// Counts from the most recent [`Circuit::execute`].
    ///
    /// # Errors
    /// Returns `LlyError::NotExecuted` if the circuit has never been executed.
    pub fn counts(&self) -> LlyResult<&OutcomeCounts> {
        self.last_counts.as_ref().ok_or(LlyError::NotExecuted)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gates = self.gate_sequence();

        // Gates on different qubits are packed into the same column.
        let mut columns_per_row = vec![0usize; self.qubits];
        let mut placed: Vec<(usize, usize, &'static str)> = Vec::with_capacity(gates.len());
        for gate in &gates {
            let row = gate.target().index();
            if row >= self.qubits {
                continue;
            }
            placed.push((row, columns_per_row[row], gate.symbol()));
            columns_per_row[row] += 1;
        }
        let width = columns_per_row.iter().copied().max().unwrap_or(0);

        const GATE_WIDTH: usize = 5; // e.g., "──H──"
        const H_WIRE: char = '─';
        const WIRE: &str = "─────";

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            let total_dashes = GATE_WIDTH.saturating_sub(slen);
            let pre_dashes = total_dashes / 2;
            let post_dashes = total_dashes - pre_dashes;
            format!("{}{}{}", H_WIRE.to_string().repeat(pre_dashes), symbol, H_WIRE.to_string().repeat(post_dashes))
        }

        let mut grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); width]; self.qubits];
        let cells: HashMap<(usize, usize), &str> = placed.iter().map(|(r, c, s)| ((*r, *c), *s)).collect();
        for ((r, c), symbol) in cells {
            grid[r][c] = format_gate(symbol);
        }

        writeln!(
            f,
            "lly_dml::Circuit[{} layers on {} qubits, {} shots]",
            self.layers.len(),
            self.qubits,
            self.shots
        )?;
        let label_width = format!("{}", QubitId(self.qubits.saturating_sub(1))).len();
        for (r, row) in grid.iter().enumerate() {
            let label = format!("{}: ", QubitId(r));
            write!(f, "{:<width$}", label, width = label_width + 2)?;
            writeln!(f, "{}", row.join(""))?;
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
