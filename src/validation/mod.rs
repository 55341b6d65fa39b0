// src/validation/mod.rs

//! Provides functions to validate state vectors and sampled distributions.

use crate::core::{LlyError, LlyResult, StateVector};
use crate::distribution::Distribution;

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;
const DEFAULT_PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Checks if the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `state` - The `StateVector` to check.
/// * `tolerance` - Allowed deviation from 1.0 (defaults to 1e-9).
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(LlyError::SimulationError)` if normalization fails.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> LlyResult<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq: f64 = state.amplitudes().iter().map(|c| c.norm_sqr()).sum();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(LlyError::SimulationError {
            message: format!(
                "State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
                norm_sq, effective_tolerance
            ),
        })
    } else {
        Ok(())
    }
}

/// Checks that a non-empty distribution's probabilities sum to 1.0.
///
/// An empty distribution is accepted: it is what
/// [`normalize`](crate::distribution::normalize) yields for zero shots.
pub fn check_probability_sum(distribution: &Distribution, tolerance: Option<f64>) -> LlyResult<()> {
    if distribution.is_empty() {
        return Ok(());
    }
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_PROBABILITY_TOLERANCE);
    let sum: f64 = distribution.iter().map(|(_, p)| p).sum();
    if (sum - 1.0).abs() > effective_tolerance {
        return Err(LlyError::SimulationError {
            message: format!("Distribution probabilities sum to {} (Deviation > {})", sum, effective_tolerance),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn equal_superposition_is_normalized() {
        let state = StateVector::new(vec![Complex::new(FRAC_1_SQRT_2, 0.0), Complex::new(0.0, FRAC_1_SQRT_2)]);
        assert!(check_normalization(&state, None).is_ok());
    }

    #[test]
    fn scaled_state_is_rejected() {
        let state = StateVector::new(vec![Complex::new(1.0, 0.0), Complex::new(1.0, 0.0)]);
        assert!(matches!(check_normalization(&state, None), Err(LlyError::SimulationError { .. })));
    }

    #[test]
    fn empty_distribution_passes_sum_check() {
        assert!(check_probability_sum(&Distribution::default(), None).is_ok());
    }
}
