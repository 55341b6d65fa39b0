// src/training/mod.rs

//! Orchestrates a full training run.
//!
//! A run is four sequential phases over one shared training matrix:
//!
//! 1. **Creation**: every single word is encoded in a one-layer circuit and
//!    sampled once. Its most likely outcome becomes the word's target.
//! 2. **Single-word training**: each word's circuit is optimized toward its
//!    creation outcome.
//! 3. **Composition training**: for `"a b" -> result`, a two-layer circuit
//!    (a, then b) is optimized toward the creation outcome of `result`.
//! 4. **Comparison**: creation and trained summaries are paired by label.
//!
//! Every circuit receives its own copy of the shared matrix, used by all of its
//! layers. Optimization results are stored in the summaries; the shared matrix
//! is never overwritten. Each training phase runs at most once per creation.
//! A word or composition that fails is recorded as an [`ItemFailure`] and the
//! run continues with the next item.

mod summary;

pub use summary::{ComparisonRow, ItemFailure, Summary, TrainingReport};

use crate::circuits::{Circuit, Layer};
use crate::config::{Composition, TrainingConfig};
use crate::core::{LlyError, LlyResult, PhaseMatrix, TrainingPhaseMatrix};
use crate::optimizer::Optimizer;
use crate::simulation::Backend;
use crate::tokenizer::Tokenizer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

/// Runs creation, training and comparison for one configuration.
pub struct Trainer {
    config: TrainingConfig,
    tokenizer: Box<dyn Tokenizer>,
    training_phases: TrainingPhaseMatrix,
    rng: StdRng,
    creation: Option<Vec<Summary>>,
    single_words_trained: bool,
    compositions_trained: bool,
    final_summaries: Vec<Summary>,
    failures: Vec<ItemFailure>,
}

impl Trainer {
    /// Validates `config` and draws the shared training matrix uniformly in `[0, 2π)`.
    ///
    /// # Errors
    /// Returns `LlyError::InvalidConfiguration` if the configuration is invalid.
    pub fn new(config: TrainingConfig, tokenizer: Box<dyn Tokenizer>) -> LlyResult<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let training_phases = PhaseMatrix::random(config.qubit_count(), &mut rng);
        info!(
            qubits = config.qubit_count(),
            layers = config.layer_count(),
            iterations = config.iterations,
            shots = config.shots,
            optimizer = %config.optimizer,
            "trainer configured"
        );
        Ok(Self {
            config,
            tokenizer,
            training_phases,
            rng,
            creation: None,
            single_words_trained: false,
            compositions_trained: false,
            final_summaries: Vec::new(),
            failures: Vec::new(),
        })
    }

    /// Replaces the shared training matrix before any phase runs.
    pub fn with_training_phases(mut self, training_phases: TrainingPhaseMatrix) -> LlyResult<Self> {
        training_phases.ensure_qubits(self.config.qubit_count())?;
        self.training_phases = training_phases;
        Ok(self)
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// The shared matrix every circuit starts from.
    pub fn training_phases(&self) -> &TrainingPhaseMatrix {
        &self.training_phases
    }

    /// Creation summaries; empty until [`Trainer::create`] has run.
    pub fn creation_summaries(&self) -> &[Summary] {
        self.creation.as_deref().unwrap_or(&[])
    }

    pub fn final_summaries(&self) -> &[Summary] {
        &self.final_summaries
    }

    pub fn failures(&self) -> &[ItemFailure] {
        &self.failures
    }

    /// Encodes and samples every single word once.
    ///
    /// Starts a fresh run: earlier summaries and failures are discarded.
    pub fn create(&mut self, backend: &mut dyn Backend) -> LlyResult<&[Summary]> {
        info!(words = self.config.single_words.len(), "creation phase");
        self.final_summaries.clear();
        self.failures.clear();
        self.single_words_trained = false;
        self.compositions_trained = false;

        let mut summaries = Vec::with_capacity(self.config.single_words.len());
        for word in self.config.single_words.clone() {
            let result = self.build_circuit(&[word.as_str()]).and_then(|mut circuit| {
                let counts = circuit.execute(backend)?.clone();
                Ok(Summary::from_counts(word.as_str(), counts))
            });
            match result {
                Ok(summary) => {
                    info!(word = %summary.label, outcome = ?summary.outcome, probability = summary.probability, "created");
                    summaries.push(summary);
                }
                Err(e) => self.record_failure(word, e),
            }
        }
        Ok(self.creation.insert(summaries).as_slice())
    }

    /// Optimizes every created word toward its creation outcome.
    ///
    /// # Errors
    /// Returns `LlyError::OutOfOrder` if [`Trainer::create`] has not run, or if
    /// single words were already trained since the last creation.
    pub fn train_single_words(&mut self, backend: &mut dyn Backend) -> LlyResult<&[Summary]> {
        let creation = self.require_creation("single-word training")?.to_vec();
        if self.single_words_trained {
            return Err(LlyError::OutOfOrder {
                message: "single words were already trained; run creation again first".to_string(),
            });
        }
        self.single_words_trained = true;
        info!(words = creation.len(), "single-word training phase");
        let start = self.final_summaries.len();

        for initial in creation {
            let result = match initial.outcome.clone() {
                Some(target) => self.train_item(&initial.label, &[initial.label.as_str()], &target, backend),
                None => Err(LlyError::EmptyDistribution),
            };
            match result {
                Ok(summary) => self.final_summaries.push(summary),
                Err(e) => self.record_failure(initial.label, e),
            }
        }
        Ok(&self.final_summaries[start..])
    }

    /// Optimizes every composition toward its result word's creation outcome.
    ///
    /// A composition whose result word has no creation summary fails with
    /// `LlyError::UnknownResultWord` before any circuit is built.
    ///
    /// # Errors
    /// Returns `LlyError::OutOfOrder` if [`Trainer::create`] has not run, or if
    /// compositions were already trained since the last creation.
    pub fn train_compositions(&mut self, backend: &mut dyn Backend) -> LlyResult<&[Summary]> {
        self.require_creation("composition training")?;
        if self.compositions_trained {
            return Err(LlyError::OutOfOrder {
                message: "compositions were already trained; run creation again first".to_string(),
            });
        }
        self.compositions_trained = true;
        info!(compositions = self.config.word_combinations.len(), "composition training phase");
        let start = self.final_summaries.len();

        for composition in self.config.word_combinations.clone() {
            let label = composition.label();
            match self.train_composition(&composition, backend) {
                Ok(summary) => self.final_summaries.push(summary),
                Err(e) => self.record_failure(label, e),
            }
        }
        Ok(&self.final_summaries[start..])
    }

    /// Pairs creation summaries with the trained summary of the same label.
    ///
    /// Composition labels never match a creation label, so they have no row.
    pub fn comparison(&self) -> Vec<ComparisonRow> {
        self.creation_summaries()
            .iter()
            .filter_map(|initial| {
                self.final_summaries.iter().find(|s| s.label == initial.label).map(|trained| ComparisonRow {
                    label: initial.label.clone(),
                    initial: initial.clone(),
                    trained: trained.clone(),
                })
            })
            .collect()
    }

    /// Snapshot of everything recorded so far.
    pub fn report(&self) -> TrainingReport {
        TrainingReport {
            qubits: self.config.qubit_count(),
            shots: self.config.shots,
            iterations: self.config.iterations,
            optimizer: self.config.optimizer.to_string(),
            initial_phases: self.training_phases.clone(),
            creation: self.creation_summaries().to_vec(),
            final_summaries: self.final_summaries.clone(),
            comparison: self.comparison(),
            failures: self.failures.clone(),
        }
    }

    /// Runs all phases in order.
    pub fn run(&mut self, backend: &mut dyn Backend) -> LlyResult<TrainingReport> {
        self.create(backend)?;
        self.train_single_words(backend)?;
        self.train_compositions(backend)?;
        let report = self.report();
        info!(
            created = report.creation.len(),
            trained = report.final_summaries.len(),
            failures = report.failures.len(),
            "training run finished"
        );
        Ok(report)
    }

    fn train_composition(&mut self, composition: &Composition, backend: &mut dyn Backend) -> LlyResult<Summary> {
        let (first, second) = composition.words()?;
        let target = self.creation_target(&composition.result)?;
        self.train_item(&composition.label(), &[first, second], &target, backend)
    }

    /// Optimizes a circuit over `words` toward `target`, then samples it once more.
    fn train_item(&mut self, label: &str, words: &[&str], target: &str, backend: &mut dyn Backend) -> LlyResult<Summary> {
        let mut circuit = self.build_circuit(words)?;
        let policy = self.config.optimizer.build(self.config.learning_rate)?;
        let rng = StdRng::seed_from_u64(self.rng.random());
        let mut optimizer = Optimizer::new(target, self.config.iterations, policy).with_rng(rng);

        let result = optimizer.optimize(&mut circuit, backend)?;
        let counts = circuit.execute(backend)?.clone();
        let summary = Summary::from_counts(label, counts).with_training(result.losses, result.best_phases);
        info!(
            %label,
            target_outcome = %target,
            initial_loss = result.initial_loss,
            best_loss = result.best_loss,
            accepted = result.accepted,
            outcome = ?summary.outcome,
            probability = summary.probability,
            "trained"
        );
        Ok(summary)
    }

    /// One layer per word; all layers start from the same copy of the shared matrix.
    fn build_circuit(&self, words: &[&str]) -> LlyResult<Circuit> {
        let qubits = self.config.qubit_count();
        let layers = words
            .iter()
            .map(|word| {
                let input = self.tokenizer.tokenize(word, qubits)?;
                Layer::new(qubits, self.training_phases.clone(), input)
            })
            .collect::<LlyResult<Vec<_>>>()?;
        Circuit::new(qubits, layers, self.config.shots)
    }

    fn creation_target(&self, word: &str) -> LlyResult<String> {
        let summary = self
            .creation_summaries()
            .iter()
            .find(|s| s.label == word)
            .ok_or_else(|| LlyError::UnknownResultWord { word: word.to_string() })?;
        summary.outcome.clone().ok_or(LlyError::EmptyDistribution)
    }

    fn require_creation(&self, phase: &str) -> LlyResult<&[Summary]> {
        self.creation.as_deref().ok_or_else(|| LlyError::OutOfOrder {
            message: format!("{} requires the creation phase to run first", phase),
        })
    }

    fn record_failure(&mut self, label: String, error: LlyError) {
        warn!(%label, %error, "item failed; continuing");
        self.failures.push(ItemFailure { label, error });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Gate;
    use crate::simulation::OutcomeCounts;
    use crate::tokenizer::HashTokenizer;

    /// Reports every shot as the all-zeros outcome.
    struct ZeroBackend;

    impl Backend for ZeroBackend {
        fn execute(&mut self, _gates: &[Gate], qubits: usize, shots: u32) -> LlyResult<OutcomeCounts> {
            Ok(OutcomeCounts::from_pairs([("0".repeat(qubits), u64::from(shots))]))
        }
    }

    fn config(json: &str) -> TrainingConfig {
        TrainingConfig::from_json_str(json).unwrap()
    }

    fn trainer(json: &str) -> Trainer {
        Trainer::new(config(json), Box::new(HashTokenizer::new())).unwrap()
    }

    #[test]
    fn training_before_creation_is_out_of_order() {
        let mut t = trainer(r#"{"single_words": ["cat"], "iterations": 1, "seed": 1}"#);
        assert!(matches!(t.train_single_words(&mut ZeroBackend), Err(LlyError::OutOfOrder { .. })));
        assert!(matches!(t.train_compositions(&mut ZeroBackend), Err(LlyError::OutOfOrder { .. })));
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        let result = Trainer::new(config("{}"), Box::new(HashTokenizer::new()));
        assert!(matches!(result, Err(LlyError::InvalidConfiguration { .. })));
    }

    #[test]
    fn same_seed_same_shared_matrix() {
        let json = r#"{"single_words": ["cat", "dog"], "seed": 5}"#;
        assert_eq!(trainer(json).training_phases(), trainer(json).training_phases());
    }

    #[test]
    fn bad_composition_key_is_a_per_item_failure() -> LlyResult<()> {
        let mut t = trainer(
            r#"{"single_words": ["cat", "dog"], "word_combinations": {"cat": "dog", "cat dog": "dog"}, "iterations": 2, "seed": 3}"#,
        );
        t.create(&mut ZeroBackend)?;
        let trained = t.train_compositions(&mut ZeroBackend)?;
        assert_eq!(trained.len(), 1);
        assert_eq!(trained[0].label, "cat dog = dog");
        assert_eq!(t.failures().len(), 1);
        assert!(matches!(t.failures()[0].error, LlyError::InvalidConfiguration { .. }));
        Ok(())
    }

    #[test]
    fn training_twice_without_creation_is_out_of_order() -> LlyResult<()> {
        let mut t = trainer(r#"{"single_words": ["cat"], "word_combinations": {"cat cat": "cat"}, "iterations": 2, "seed": 3}"#);
        t.create(&mut ZeroBackend)?;
        t.train_single_words(&mut ZeroBackend)?;
        t.train_compositions(&mut ZeroBackend)?;
        assert_eq!(t.final_summaries().len(), 2);

        assert!(matches!(t.train_single_words(&mut ZeroBackend), Err(LlyError::OutOfOrder { .. })));
        assert!(matches!(t.train_compositions(&mut ZeroBackend), Err(LlyError::OutOfOrder { .. })));
        assert_eq!(t.final_summaries().len(), 2);
        assert_eq!(t.comparison().len(), 1);

        // A fresh creation starts a new run.
        t.create(&mut ZeroBackend)?;
        assert_eq!(t.train_single_words(&mut ZeroBackend)?.len(), 1);
        assert_eq!(t.final_summaries().len(), 1);
        Ok(())
    }

    #[test]
    fn trained_summaries_carry_trace_and_matrix() -> LlyResult<()> {
        let mut t = trainer(r#"{"single_words": ["cat"], "iterations": 4, "shots": 16, "seed": 3}"#);
        t.create(&mut ZeroBackend)?;
        let trained = t.train_single_words(&mut ZeroBackend)?;
        assert_eq!(trained[0].losses.as_ref().map(Vec::len), Some(4));
        assert_eq!(trained[0].min_loss(), Some(-1.0));
        assert!(trained[0].trained_phases.is_some());
        Ok(())
    }
}
