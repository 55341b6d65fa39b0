// src/training/summary.rs

//! Read-only records handed to reporting.

use crate::core::{LlyError, TrainingPhaseMatrix};
use crate::distribution::{self, Distribution};
use crate::simulation::OutcomeCounts;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// The state of one circuit after one execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Word, or `"a b = result"` for compositions.
    pub label: String,
    /// Most frequent outcome; `None` when no shots were recorded.
    pub outcome: Option<String>,
    /// Probability of `outcome` (0.0 without one).
    pub probability: f64,
    pub counts: OutcomeCounts,
    /// Per-iteration losses of the optimization run, if there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub losses: Option<Vec<f64>>,
    /// Training matrix the counts were sampled with, after optimization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_phases: Option<TrainingPhaseMatrix>,
}

impl Summary {
    /// Summarizes `counts` under `label`.
    pub fn from_counts(label: impl Into<String>, counts: OutcomeCounts) -> Self {
        let label = label.into();
        let (outcome, probability) = match distribution::most_likely(&counts) {
            Some((outcome, p)) => (Some(outcome), p),
            None => {
                warn!(%label, "no shots recorded; summary has no outcome");
                (None, 0.0)
            }
        };
        Self { label, outcome, probability, counts, losses: None, trained_phases: None }
    }

    /// Attaches the optimization trace and the matrix it produced.
    pub fn with_training(mut self, losses: Vec<f64>, trained_phases: TrainingPhaseMatrix) -> Self {
        self.losses = Some(losses);
        self.trained_phases = Some(trained_phases);
        self
    }

    /// Normalized counts, for presentation.
    pub fn distribution(&self) -> Distribution {
        distribution::normalize(&self.counts)
    }

    /// Smallest loss in the trace, if a trace is attached.
    pub fn min_loss(&self) -> Option<f64> {
        self.losses.as_ref().and_then(|l| l.iter().copied().reduce(f64::min))
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20} {:>10} {:>8.4} {}",
            self.label,
            self.outcome.as_deref().unwrap_or("-"),
            self.probability,
            self.counts
        )
    }
}

/// A word's creation summary next to its trained summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub label: String,
    pub initial: Summary,
    pub trained: Summary,
}

impl ComparisonRow {
    /// Whether training kept the creation outcome as the most likely one.
    pub fn outcome_preserved(&self) -> bool {
        self.initial.outcome.is_some() && self.initial.outcome == self.trained.outcome
    }

    /// Change in probability of the creation outcome.
    pub fn probability_gain(&self) -> f64 {
        match &self.initial.outcome {
            Some(target) => {
                distribution::probability_of(&self.trained.counts, target) - self.initial.probability
            }
            None => 0.0,
        }
    }
}

impl fmt::Display for ComparisonRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20} {:>10} {:>8.4} -> {:>10} {:>8.4} ({:+.4})",
            self.label,
            self.initial.outcome.as_deref().unwrap_or("-"),
            self.initial.probability,
            self.trained.outcome.as_deref().unwrap_or("-"),
            self.trained.probability,
            self.probability_gain()
        )
    }
}

/// A word or composition that could not be processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFailure {
    pub label: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: LlyError,
}

fn serialize_error<S: serde::Serializer>(error: &LlyError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.error)
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub qubits: usize,
    pub shots: u32,
    pub iterations: usize,
    pub optimizer: String,
    pub initial_phases: TrainingPhaseMatrix,
    pub creation: Vec<Summary>,
    #[serde(rename = "final")]
    pub final_summaries: Vec<Summary>,
    pub comparison: Vec<ComparisonRow>,
    pub failures: Vec<ItemFailure>,
}

impl TrainingReport {
    /// Pretty-printed JSON for the reporting collaborator.
    pub fn to_json(&self) -> Result<String, LlyError> {
        serde_json::to_string_pretty(self).map_err(|e| LlyError::Parse(e.to_string()))
    }
}
