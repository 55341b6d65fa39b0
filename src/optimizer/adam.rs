// src/optimizer/adam.rs

use super::UpdatePolicy;
use super::stochastic::noise_for;
use crate::core::constants::{DEFAULT_BETA1, DEFAULT_BETA2, DEFAULT_EPSILON};
use crate::core::{LlyResult, PhaseMatrix, TrainingPhaseMatrix};
use rand::rngs::StdRng;
use rand_distr::{Distribution as _, Normal};

/// Adam-style moment bookkeeping over a resampled noise "gradient".
///
/// Each step draws `g ~ N(0, learning_rate)` per angle; it is not derived from
/// the loss. The moments are then updated and bias-corrected as in Adam:
///
/// ```text
/// m = β1·m + (1-β1)·g
/// v = β2·v + (1-β2)·g²
/// candidate = current + lr · m̂ / (√v̂ + ε)
/// ```
///
/// The moment matrices are created lazily in the shape of the first matrix
/// seen and restart from zero if a matrix of another shape arrives.
#[derive(Debug, Clone)]
pub struct AdamPolicy {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    noise: Normal<f64>,
    m: Option<PhaseMatrix>,
    v: Option<PhaseMatrix>,
    t: u32,
}

impl AdamPolicy {
    /// Policy with the default β1 = 0.9, β2 = 0.999, ε = 1e-8.
    pub fn new(learning_rate: f64) -> LlyResult<Self> {
        Self::with_moments(learning_rate, DEFAULT_BETA1, DEFAULT_BETA2, DEFAULT_EPSILON)
    }

    pub fn with_moments(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> LlyResult<Self> {
        Ok(Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            noise: noise_for(learning_rate)?,
            m: None,
            v: None,
            t: 0,
        })
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u32 {
        self.t
    }
}

impl UpdatePolicy for AdamPolicy {
    fn propose(&mut self, current: &TrainingPhaseMatrix, rng: &mut StdRng) -> LlyResult<TrainingPhaseMatrix> {
        let qubits = current.qubits();
        let (m, v) = match (self.m.take(), self.v.take()) {
            (Some(m), Some(v)) if m.qubits() == qubits => (m, v),
            _ => (PhaseMatrix::zeros(qubits), PhaseMatrix::zeros(qubits)),
        };

        let noise = self.noise;
        let g = current.map(|_| noise.sample(rng));

        let (b1, b2) = (self.beta1, self.beta2);
        let m = m.zip_map(&g, |m, g| b1 * m + (1.0 - b1) * g)?;
        let v = v.zip_map(&g, |v, g| b2 * v + (1.0 - b2) * g * g)?;
        self.t += 1;

        let t = f64::from(self.t);
        let m_correction = 1.0 - b1.powf(t);
        let v_correction = 1.0 - b2.powf(t);
        let (lr, eps) = (self.learning_rate, self.epsilon);
        let step = m.zip_map(&v, |m, v| lr * (m / m_correction) / ((v / v_correction).sqrt() + eps))?;

        self.m = Some(m);
        self.v = Some(v);
        current.zip_map(&step, |c, s| c + s)
    }

    fn name(&self) -> &'static str {
        "adam"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[test]
    fn first_step_moves_by_about_the_learning_rate() -> LlyResult<()> {
        // At t = 1, m̂ = g and v̂ = g², so each angle moves by ±lr (minus ε effects).
        let mut policy = AdamPolicy::new(0.05)?;
        let mut rng = StdRng::seed_from_u64(8);
        let current = PhaseMatrix::zeros(2);
        let candidate = policy.propose(&current, &mut rng)?;
        for value in candidate.values() {
            assert_relative_eq!(value.abs(), 0.05, epsilon = 1e-6);
        }
        assert_eq!(policy.steps(), 1);
        Ok(())
    }

    #[test]
    fn moments_reset_when_shape_changes() -> LlyResult<()> {
        let mut policy = AdamPolicy::new(0.05)?;
        let mut rng = StdRng::seed_from_u64(8);
        policy.propose(&PhaseMatrix::zeros(2), &mut rng)?;
        let candidate = policy.propose(&PhaseMatrix::zeros(3), &mut rng)?;
        assert_eq!(candidate.qubits(), 3);
        Ok(())
    }
}
