// src/simulation/engine.rs
use crate::core::{LlyError, LlyResult, MAX_STATE_VECTOR_BYTES, QubitId, StateVector};
use crate::operations::Gate;
use crate::simulation::OutcomeCounts;
use crate::validation;
use num_complex::Complex;
use num_traits::Zero; // For Complex::zero()
use rand::Rng;
use rand::rngs::StdRng;
use std::f64::consts::FRAC_1_SQRT_2;
use tracing::trace;

/// Dense state-vector engine for a register of `num_qubits` qubits.
/// (Internal visibility)
pub(crate) struct SimulationEngine {
    /// Amplitudes over 2^N basis states; bit `q` of a basis index is qubit `q`.
    state: StateVector,
    /// Number of qubits being simulated (N).
    num_qubits: usize,
}

impl SimulationEngine {
    /// Initializes the engine in |0...0>.
    pub(crate) fn init(num_qubits: usize) -> LlyResult<Self> {
        if num_qubits == 0 {
            return Err(LlyError::SimulationError {
                message: "Cannot initialize simulation engine with zero qubits".to_string(),
            });
        }
        let dim = u32::try_from(num_qubits)
            .ok()
            .and_then(|n| 1usize.checked_shl(n))
            .filter(|d| *d != 0)
            .ok_or_else(|| LlyError::SimulationError {
                message: "Number of qubits too large, resulting state vector dimension overflows usize.".to_string(),
            })?;
        if dim.checked_mul(size_of::<Complex<f64>>()).is_none_or(|bytes| bytes as u64 > MAX_STATE_VECTOR_BYTES) {
            return Err(LlyError::SimulationError {
                message: format!(
                    "{} qubits need a state vector larger than the {} byte limit",
                    num_qubits, MAX_STATE_VECTOR_BYTES
                ),
            });
        }

        let mut initial_vec = Vec::new();
        initial_vec.try_reserve_exact(dim).map_err(|e| LlyError::SimulationError {
            message: format!("Cannot allocate state vector for {} qubits: {}", num_qubits, e),
        })?;
        initial_vec.resize(dim, Complex::zero());
        initial_vec[0] = Complex::new(1.0, 0.0);

        Ok(Self { state: StateVector::new(initial_vec), num_qubits })
    }

    // Add a crate-visible method to set the state directly for testing
    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: StateVector) -> LlyResult<()> {
        if state.dim() != self.state.dim() {
            return Err(LlyError::SimulationError {
                message: format!(
                    "Cannot set state: provided dimension {} does not match engine dimension {}",
                    state.dim(),
                    self.state.dim()
                ),
            });
        }
        self.state = state;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &StateVector {
        &self.state
    }

    /// Applies a single unitary gate. Measurements are handled by [`SimulationEngine::sample`].
    pub(crate) fn apply_gate(&mut self, gate: &Gate) -> LlyResult<()> {
        match gate {
            Gate::Phase { target, theta } => {
                let idx = self.qubit_index(*target)?;
                self.apply_single_qubit_gate(idx, &phase_shift_matrix(*theta))
            }
            Gate::Hadamard { target } => {
                let idx = self.qubit_index(*target)?;
                self.apply_single_qubit_gate(idx, &hadamard_matrix())
            }
            Gate::Measure { target } => Err(LlyError::SimulationError {
                message: format!("Measurement of {} cannot be applied as a unitary", target),
            }),
        }
    }

    /// Draws `shots` Born-rule samples and renders them as bitstrings.
    ///
    /// Only qubits listed in `measured` contribute; the remaining positions
    /// read '0'. Outcomes are recorded in the order they are first drawn.
    pub(crate) fn sample(&self, measured: &[QubitId], shots: u32, rng: &mut StdRng) -> LlyResult<OutcomeCounts> {
        validation::check_normalization(&self.state, Some(1e-6))?;
        let mut mask = 0usize;
        for qubit in measured {
            mask |= 1 << self.qubit_index(*qubit)?;
        }

        let probabilities = self.state.probabilities();
        let total: f64 = probabilities.iter().sum();
        let last_possible = probabilities.iter().rposition(|p| *p > 0.0).unwrap_or(0);

        let mut counts = OutcomeCounts::new();
        for _ in 0..shots {
            let p_sample: f64 = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = last_possible;
            for (k, p) in probabilities.iter().enumerate() {
                cumulative += *p;
                if p_sample < cumulative {
                    chosen = k;
                    break;
                }
            }
            counts.add(self.bitstring(chosen & mask), 1);
        }
        trace!(shots, outcomes = counts.len(), "sampled register");
        Ok(counts)
    }

    fn bitstring(&self, index: usize) -> String {
        format!("{:0width$b}", index, width = self.num_qubits)
    }

    /// Helper to get a qubit's bit position, returning a specific error if out of range.
    fn qubit_index(&self, qubit: QubitId) -> LlyResult<usize> {
        if qubit.index() >= self.num_qubits {
            return Err(LlyError::QubitOutOfRange { qubit, qubits: self.num_qubits });
        }
        Ok(qubit.index())
    }

    /// Applies a 2x2 matrix to one qubit of the global state vector.
    fn apply_single_qubit_gate(&mut self, bit: usize, matrix: &[[Complex<f64>; 2]; 2]) -> LlyResult<()> {
        let k_mask = 1usize << bit;
        let lower_mask = k_mask - 1;
        let upper_mask = !((k_mask << 1) - 1);

        let dim = self.state.dim();
        let amplitudes = self.state.amplitudes_mut();

        // Iterate over pairs of basis states differing only at the target bit
        for i in 0..dim / 2 {
            let i0 = ((i << 1) & upper_mask) | (i & lower_mask);
            let i1 = i0 | k_mask;
            if i1 >= dim {
                return Err(LlyError::SimulationError {
                    message: format!(
                        "Calculated index out of bounds during single qubit gate application. i0={}, i1={}, dim={}",
                        i0, i1, dim
                    ),
                });
            }
            let a0 = amplitudes[i0];
            let a1 = amplitudes[i1];
            amplitudes[i0] = matrix[0][0] * a0 + matrix[0][1] * a1;
            amplitudes[i1] = matrix[1][0] * a0 + matrix[1][1] * a1;
        }
        Ok(())
    }
}

/// Provides the 2x2 matrix for the Phase gate: `e^(iθ)` on the |1> amplitude.
fn phase_shift_matrix(theta: f64) -> [[Complex<f64>; 2]; 2] {
    [
        [Complex::new(1.0, 0.0), Complex::zero()],
        [Complex::zero(), Complex::new(theta.cos(), theta.sin())], // e^(i*theta)
    ]
}

fn hadamard_matrix() -> [[Complex<f64>; 2]; 2] {
    let h = Complex::new(FRAC_1_SQRT_2, 0.0);
    [[h, h], [h, -h]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[test]
    fn hadamard_splits_amplitude_evenly() -> LlyResult<()> {
        let mut engine = SimulationEngine::init(1)?;
        engine.apply_gate(&Gate::Hadamard { target: QubitId(0) })?;
        let probs = engine.state().probabilities();
        assert_relative_eq!(probs[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(probs[1], 0.5, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn gate_targets_the_matching_bit() -> LlyResult<()> {
        // H on qubit 1 of a 2-qubit register moves weight to indices 0b00 and 0b10.
        let mut engine = SimulationEngine::init(2)?;
        engine.apply_gate(&Gate::Hadamard { target: QubitId(1) })?;
        let probs = engine.state().probabilities();
        assert_relative_eq!(probs[0b10], 0.5, epsilon = 1e-12);
        assert_relative_eq!(probs[0b01], 0.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn out_of_range_target_is_rejected() -> LlyResult<()> {
        let mut engine = SimulationEngine::init(1)?;
        assert_eq!(
            engine.apply_gate(&Gate::Hadamard { target: QubitId(3) }),
            Err(LlyError::QubitOutOfRange { qubit: QubitId(3), qubits: 1 })
        );
        Ok(())
    }

    #[test]
    fn oversized_register_is_an_error() {
        // 29 qubits is the first width past the byte limit; 60 overflowed the allocator.
        for qubits in [29, 60, 64, 200] {
            assert!(matches!(SimulationEngine::init(qubits), Err(LlyError::SimulationError { .. })));
        }
    }

    #[test]
    fn basis_state_always_samples_itself() -> LlyResult<()> {
        let mut engine = SimulationEngine::init(2)?;
        let mut vec = vec![Complex::zero(); 4];
        vec[0b01] = Complex::new(1.0, 0.0);
        engine.set_state(StateVector::new(vec))?;
        let mut rng = StdRng::seed_from_u64(5);
        let counts = engine.sample(&[QubitId(0), QubitId(1)], 64, &mut rng)?;
        assert_eq!(counts.get("01"), 64);
        assert_eq!(counts.len(), 1);
        Ok(())
    }

    #[test]
    fn unmeasured_qubits_read_zero() -> LlyResult<()> {
        let mut engine = SimulationEngine::init(2)?;
        let mut vec = vec![Complex::zero(); 4];
        vec[0b11] = Complex::new(1.0, 0.0);
        engine.set_state(StateVector::new(vec))?;
        let mut rng = StdRng::seed_from_u64(5);
        let counts = engine.sample(&[QubitId(1)], 8, &mut rng)?;
        assert_eq!(counts.get("10"), 8);
        Ok(())
    }
}
