//! Training configuration.
//!
//! Supports loading configuration from:
//! 1. JSON files
//! 2. Environment variables (with LLY_ prefix)
//! 3. .env files
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use crate::core::constants::{DEFAULT_ITERATIONS, DEFAULT_LEARNING_RATE, DEFAULT_SHOTS};
use crate::core::{LlyError, LlyResult};
use crate::optimizer::OptimizerKind;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// A declared composition: the words in `key` together should encode `result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    /// Space-separated word pair, e.g. `"cat dog"`.
    pub key: String,
    /// Word whose creation outcome is the training target.
    pub result: String,
}

impl Composition {
    pub fn new(key: impl Into<String>, result: impl Into<String>) -> Self {
        Self { key: key.into(), result: result.into() }
    }

    /// The two words of the key.
    ///
    /// # Errors
    /// Returns `LlyError::InvalidConfiguration` unless the key holds exactly two words.
    pub fn words(&self) -> LlyResult<(&str, &str)> {
        let mut parts = self.key.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) => Ok((a, b)),
            _ => Err(LlyError::InvalidConfiguration {
                message: format!("composition '{}' must name exactly two words", self.key),
            }),
        }
    }

    /// Report label, `"a b = result"`.
    pub fn label(&self) -> String {
        format!("{} = {}", self.key, self.result)
    }
}

/// Everything one training run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Vocabulary; one qubit per word.
    #[serde(default)]
    pub single_words: Vec<String>,

    /// `"a b" -> result` table, in declaration order.
    #[serde(default, serialize_with = "serialize_compositions", deserialize_with = "deserialize_compositions")]
    pub word_combinations: Vec<Composition>,

    /// Optimizer iterations per word or composition
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Samples per circuit execution
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Noise scale of the update policies
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    #[serde(default)]
    pub optimizer: OptimizerKind,

    /// Seeds every RNG of a run; `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

fn default_shots() -> u32 {
    DEFAULT_SHOTS
}

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            single_words: Vec::new(),
            word_combinations: Vec::new(),
            iterations: default_iterations(),
            shots: default_shots(),
            learning_rate: default_learning_rate(),
            optimizer: OptimizerKind::default(),
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Qubits per circuit: one per single word.
    pub fn qubit_count(&self) -> usize {
        self.single_words.len()
    }

    /// Layers across the whole run: one per word plus two per composition.
    pub fn layer_count(&self) -> usize {
        self.single_words.len() + 2 * self.word_combinations.len()
    }

    /// Parse configuration from a JSON string. Does not validate.
    pub fn from_json_str(json: &str) -> LlyResult<Self> {
        serde_json::from_str(json).map_err(|e| LlyError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> LlyResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| LlyError::Io(e.to_string()))?;
        let config = Self::from_json_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Load .env file if it exists
    /// 2. Load from file if provided, otherwise start from defaults
    /// 3. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> LlyResult<Self> {
        dotenvy::dotenv().ok();

        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Merge `LLY_*` environment variables into this configuration.
    pub fn merge_env(self) -> LlyResult<Self> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge overrides read through `lookup`.
    ///
    /// Only variables that are set override the current values.
    pub fn merge_env_from<F>(mut self, lookup: F) -> LlyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LLY_ITERATIONS") {
            self.iterations = parse_var("LLY_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("LLY_SHOTS") {
            self.shots = parse_var("LLY_SHOTS", &v)?;
        }
        if let Some(v) = lookup("LLY_LEARNING_RATE") {
            self.learning_rate = parse_var("LLY_LEARNING_RATE", &v)?;
        }
        if let Some(v) = lookup("LLY_OPTIMIZER") {
            self.optimizer = v.parse()?;
        }
        if let Some(v) = lookup("LLY_SEED") {
            self.seed = Some(parse_var("LLY_SEED", &v)?);
        }
        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> LlyResult<()> {
        if self.qubit_count() == 0 || self.layer_count() == 0 {
            return Err(LlyError::InvalidConfiguration {
                message: format!(
                    "number of qubits and layers must be greater than 0 (got {} qubits, {} layers)",
                    self.qubit_count(),
                    self.layer_count()
                ),
            });
        }
        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return Err(LlyError::InvalidConfiguration {
                message: format!("learning_rate must be finite and non-negative (got {})", self.learning_rate),
            });
        }
        if let Some(word) = self.single_words.iter().find(|w| w.trim().is_empty() || w.contains(char::is_whitespace)) {
            return Err(LlyError::InvalidConfiguration {
                message: format!("single word '{}' must be one non-empty token", word),
            });
        }
        Ok(())
    }
}

fn parse_var<T>(key: &str, value: &str) -> LlyResult<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| LlyError::Parse(format!("{}={}: {}", key, value, e)))
}

fn serialize_compositions<S: Serializer>(compositions: &[Composition], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(compositions.len()))?;
    for c in compositions {
        map.serialize_entry(&c.key, &c.result)?;
    }
    map.end()
}

fn deserialize_compositions<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Composition>, D::Error> {
    struct CompositionVisitor;

    impl<'de> Visitor<'de> for CompositionVisitor {
        type Value = Vec<Composition>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a map of \"word word\" to result word")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut out = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, result)) = access.next_entry::<String, String>()? {
                out.push(Composition { key, result });
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(CompositionVisitor)
}
