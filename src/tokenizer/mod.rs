// src/tokenizer/mod.rs

//! Derives input phases from tokens.

use crate::core::{InputPhaseMatrix, LlyError, LlyResult, PhaseMatrix, PhaseVector, TWO_PI};
use fnv::FnvHasher;
use std::collections::HashMap;
use std::hash::Hasher;

/// Maps a word to its fixed input-phase matrix.
pub trait Tokenizer {
    /// Returns a `qubits`-column matrix for `word`. Must be deterministic.
    fn tokenize(&self, word: &str, qubits: usize) -> LlyResult<InputPhaseMatrix>;
}

/// Hashes `(word, qubit, slot)` into an angle in `[0, 2π)`.
///
/// Every word gets phases without a vocabulary. The hash is 64-bit FNV-1a over
/// the word's UTF-8 bytes, a `0xff` separator, then `qubit` and `slot` as
/// little-endian `u64`s, so phases are identical across builds and platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashTokenizer;

impl HashTokenizer {
    pub fn new() -> Self {
        Self
    }

    fn angle(word: &str, qubit: usize, slot: usize) -> f64 {
        let mut hasher = FnvHasher::default();
        hasher.write(word.as_bytes());
        hasher.write_u8(0xff);
        hasher.write(&(qubit as u64).to_le_bytes());
        hasher.write(&(slot as u64).to_le_bytes());
        // Top 53 bits give a uniform fraction in [0, 1).
        let fraction = (hasher.finish() >> 11) as f64 / (1u64 << 53) as f64;
        fraction * TWO_PI
    }
}

impl Tokenizer for HashTokenizer {
    fn tokenize(&self, word: &str, qubits: usize) -> LlyResult<InputPhaseMatrix> {
        Ok(PhaseMatrix::from_columns((0..qubits).map(|q| {
            PhaseVector::new(Self::angle(word, q, 0), Self::angle(word, q, 1), Self::angle(word, q, 2))
        })))
    }
}

/// A fixed word → phases table.
#[derive(Debug, Clone, Default)]
pub struct VocabularyTokenizer {
    entries: HashMap<String, InputPhaseMatrix>,
}

impl VocabularyTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the phases for `word`.
    pub fn insert(&mut self, word: impl Into<String>, phases: InputPhaseMatrix) {
        self.entries.insert(word.into(), phases);
    }

    pub fn with_entry(mut self, word: impl Into<String>, phases: InputPhaseMatrix) -> Self {
        self.insert(word, phases);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Tokenizer for VocabularyTokenizer {
    fn tokenize(&self, word: &str, qubits: usize) -> LlyResult<InputPhaseMatrix> {
        let phases = self
            .entries
            .get(word)
            .ok_or_else(|| LlyError::UnknownToken { token: word.to_string() })?;
        phases.ensure_qubits(qubits)?;
        Ok(phases.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hash_tokenizer_is_deterministic_and_distinct() -> LlyResult<()> {
        let t = HashTokenizer::new();
        let cat = t.tokenize("cat", 3)?;
        assert_eq!(cat, t.tokenize("cat", 3)?);
        assert_ne!(cat, t.tokenize("dog", 3)?);
        assert_eq!(cat.qubits(), 3);
        assert!(cat.values().all(|v| (0.0..TWO_PI).contains(&v)));
        Ok(())
    }

    #[test]
    fn hash_phases_are_pinned() -> LlyResult<()> {
        // Reports from different builds must stay comparable.
        let t = HashTokenizer::new();
        let at = |m: &PhaseMatrix, q: usize, slot: usize| m.column(q).map_or(f64::NAN, |c| c.get(slot));
        let cat = t.tokenize("cat", 2)?;
        assert_relative_eq!(at(&cat, 0, 0), 4.070328236089062, epsilon = 1e-12);
        assert_relative_eq!(at(&cat, 0, 1), 4.830682004212263, epsilon = 1e-12);
        assert_relative_eq!(at(&cat, 1, 2), 1.2466185907850982, epsilon = 1e-12);
        assert_relative_eq!(at(&t.tokenize("dog", 1)?, 0, 0), 1.6224049006146517, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn vocabulary_rejects_unknown_and_misshaped() {
        let t = VocabularyTokenizer::new().with_entry("cat", PhaseMatrix::zeros(2));
        assert!(t.tokenize("cat", 2).is_ok());
        assert_eq!(t.tokenize("cow", 2), Err(LlyError::UnknownToken { token: "cow".to_string() }));
        assert_eq!(t.tokenize("cat", 3), Err(LlyError::ShapeMismatch { expected: 3, got: 2 }));
    }
}
