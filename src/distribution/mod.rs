// src/distribution/mod.rs

//! Turns sampled counts into probabilities.
//!
//! A [`Distribution`] keeps the outcome order of the counts it came from, so
//! [`argmax`] is deterministic for a given execution: ties go to the outcome
//! that was sampled first.

use crate::core::{LlyError, LlyResult};
use crate::simulation::OutcomeCounts;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Ordering;
use std::fmt;
use tracing::warn;

/// Outcome probabilities in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    entries: Vec<(String, f64)>,
}

impl Distribution {
    /// Probability of `outcome`, zero when it was never observed.
    pub fn get(&self, outcome: &str) -> f64 {
        self.entries.iter().find(|(o, _)| o == outcome).map(|(_, p)| *p).unwrap_or(0.0)
    }

    /// Iterates `(outcome, probability)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(o, p)| (o.as_str(), *p))
    }

    /// Entries by descending probability, for presentation.
    ///
    /// The sort is stable, so equal probabilities keep their first-seen order.
    pub fn sorted(&self) -> Vec<(String, f64)> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (outcome, p) in &self.entries {
            map.serialize_entry(outcome, p)?;
        }
        map.end()
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (outcome, p)) in self.sorted().iter().enumerate() {
            write!(f, "{}'{}': {:.4}", if i > 0 { ", " } else { "" }, outcome, p)?;
        }
        write!(f, "}}")
    }
}

/// Maps each outcome to `count / total`.
///
/// # Errors
/// Returns `LlyError::EmptyDistribution` when the counts sum to zero.
pub fn try_normalize(counts: &OutcomeCounts) -> LlyResult<Distribution> {
    let total = counts.total();
    if total == 0 {
        return Err(LlyError::EmptyDistribution);
    }
    let total = total as f64;
    let entries = counts.iter().map(|(o, n)| (o.to_string(), n as f64 / total)).collect();
    Ok(Distribution { entries })
}

/// Like [`try_normalize`], but an empty set of counts logs a warning and
/// yields an empty distribution instead of failing.
pub fn normalize(counts: &OutcomeCounts) -> Distribution {
    match try_normalize(counts) {
        Ok(distribution) => distribution,
        Err(e) => {
            warn!(error = %e, "normalizing empty counts");
            Distribution::default()
        }
    }
}

/// The outcome with the highest count; ties go to the first one recorded.
///
/// `None` only when `counts` is empty.
pub fn argmax(counts: &OutcomeCounts) -> Option<&str> {
    let mut best: Option<(&str, u64)> = None;
    for (outcome, n) in counts.iter() {
        match best {
            Some((_, b)) if n <= b => {}
            _ => best = Some((outcome, n)),
        }
    }
    best.map(|(o, _)| o)
}

/// The maximum-likelihood outcome together with its probability.
///
/// `None` when no shots were recorded.
pub fn most_likely(counts: &OutcomeCounts) -> Option<(String, f64)> {
    let total = counts.total();
    if total == 0 {
        return None;
    }
    argmax(counts).map(|o| (o.to_string(), counts.get(o) as f64 / total as f64))
}

/// Probability of `outcome` in `counts`; zero for empty counts.
pub fn probability_of(counts: &OutcomeCounts, outcome: &str) -> f64 {
    match counts.total() {
        0 => 0.0,
        total => counts.get(outcome) as f64 / total as f64,
    }
}
