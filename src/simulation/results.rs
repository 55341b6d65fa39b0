// src/simulation/results.rs
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Sampled outcome counts from one execution.
///
/// Maps bitstring outcomes to the number of shots that produced them. Outcomes
/// keep the order in which they were first recorded, which is what
/// [`argmax`](crate::distribution::argmax) uses to break ties.
///
/// Bitstrings put the highest-index qubit first, so qubit 0 is the rightmost
/// character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl OutcomeCounts {
    /// Creates an empty set of counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds counts from `(outcome, count)` pairs; repeated outcomes accumulate.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut counts = Self::new();
        for (outcome, n) in pairs {
            counts.add(outcome, n);
        }
        counts
    }

    /// Adds `n` shots to `outcome`, inserting it at the end if unseen.
    pub fn add<S: Into<String>>(&mut self, outcome: S, n: u64) {
        let outcome = outcome.into();
        match self.index.get(&outcome) {
            Some(&i) => self.entries[i].1 += n,
            None => {
                self.index.insert(outcome.clone(), self.entries.len());
                self.entries.push((outcome, n));
            }
        }
    }

    /// Shots recorded for `outcome` (zero when never observed).
    pub fn get(&self, outcome: &str) -> u64 {
        self.index.get(outcome).map(|&i| self.entries[i].1).unwrap_or(0)
    }

    /// Total number of shots across all outcomes.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(outcome, count)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries.iter().map(|(o, n)| (o.as_str(), *n))
    }
}

impl Serialize for OutcomeCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (outcome, n) in &self.entries {
            map.serialize_entry(outcome, n)?;
        }
        map.end()
    }
}

impl fmt::Display for OutcomeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (outcome, n)) in self.entries.iter().enumerate() {
            write!(f, "{}'{}': {}", if i > 0 { ", " } else { "" }, outcome, n)?;
        }
        write!(f, "}}")
    }
}
