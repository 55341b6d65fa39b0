// src/optimizer/stochastic.rs

use super::UpdatePolicy;
use crate::core::{LlyError, LlyResult, TrainingPhaseMatrix};
use rand::rngs::StdRng;
use rand_distr::{Distribution as _, Normal};

/// Gaussian hill climbing: every angle moves by `N(0, learning_rate)`.
#[derive(Debug, Clone)]
pub struct StochasticPolicy {
    noise: Normal<f64>,
}

impl StochasticPolicy {
    /// # Errors
    /// Returns `LlyError::InvalidConfiguration` for a negative or non-finite rate.
    pub fn new(learning_rate: f64) -> LlyResult<Self> {
        Ok(Self { noise: noise_for(learning_rate)? })
    }
}

impl UpdatePolicy for StochasticPolicy {
    fn propose(&mut self, current: &TrainingPhaseMatrix, rng: &mut StdRng) -> LlyResult<TrainingPhaseMatrix> {
        let noise = self.noise;
        Ok(current.map(|phase| phase + noise.sample(rng)))
    }

    fn name(&self) -> &'static str {
        "stochastic"
    }
}

/// Zero-mean normal with `learning_rate` as its standard deviation.
pub(super) fn noise_for(learning_rate: f64) -> LlyResult<Normal<f64>> {
    if !learning_rate.is_finite() || learning_rate < 0.0 {
        return Err(LlyError::InvalidConfiguration {
            message: format!("learning rate must be finite and non-negative (got {})", learning_rate),
        });
    }
    Normal::new(0.0, learning_rate).map_err(|e| LlyError::InvalidConfiguration { message: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PhaseMatrix;
    use rand::SeedableRng;

    #[test]
    fn zero_rate_proposes_the_same_matrix() -> LlyResult<()> {
        let mut policy = StochasticPolicy::new(0.0)?;
        let mut rng = StdRng::seed_from_u64(3);
        let current = PhaseMatrix::from_columns([[0.1, 0.2, 0.3], [1.0, 2.0, 3.0]]);
        assert_eq!(policy.propose(&current, &mut rng)?, current);
        Ok(())
    }

    #[test]
    fn candidates_keep_shape_and_move() -> LlyResult<()> {
        let mut policy = StochasticPolicy::new(0.5)?;
        let mut rng = StdRng::seed_from_u64(3);
        let current = PhaseMatrix::zeros(3);
        let candidate = policy.propose(&current, &mut rng)?;
        assert_eq!(candidate.qubits(), 3);
        assert_ne!(candidate, current);
        Ok(())
    }
}
