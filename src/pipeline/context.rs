//! Shared, read-only resources loaded once at startup

use crate::config::Config;
use crate::error::{Result, ResumeScorerError};
use crate::processing::encoder::SequenceEncoder;
use crate::processing::language_model::{LanguageModel, LexiconModel};
use crate::processing::normalizer::Normalizer;
use crate::processing::trimmer::SectionTrimmer;
use crate::processing::vocabulary::Vocabulary;
use crate::scoring::classifier::{CandleMatchClassifier, MatchClassifier};
use crate::scoring::scorer::{ClassifierScorer, Scorer, SimilarityScorer};
use crate::scoring::similarity::load_oracle;
use crate::scoring::types::{DecisionLabels, ScoringStrategy};
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Everything a scoring request reads. Built once, never mutated, safe to share behind an `Arc`.
pub struct InferenceContext {
    normalizer: Normalizer,
    trimmer: SectionTrimmer,
    classifier: Option<ClassifierScorer>,
    similarity: Option<SimilarityScorer>,
    decision_labels: DecisionLabels,
}

impl InferenceContext {
    pub fn builder() -> InferenceContextBuilder {
        InferenceContextBuilder::default()
    }

    /// Load every artifact the config names. A strategy whose artifacts fail to load
    /// is disabled and logged; it is an error only when no strategy survives.
    pub fn load(config: &Config) -> Result<Self> {
        let start_time = Instant::now();

        let lemma_lookup = config.lemma_lookup_path();
        let stop_words = config.stop_words_path();
        let language_model =
            LexiconModel::from_files(lemma_lookup.as_deref(), stop_words.as_deref())?;
        info!(
            "Linguistic model ready ({} lemmas, {} stop words)",
            language_model.lemma_count(),
            language_model.stop_word_count()
        );
        if !language_model.lemmatizes() {
            warn!(
                "No lemma table loaded (lemma_lookup {}): words are used unlemmatized and may not \
                 match a vocabulary fitted on lemmas",
                lemma_lookup
                    .as_deref()
                    .map(|p| format!("'{}' is empty", p.display()))
                    .unwrap_or_else(|| "is not configured".to_string())
            );
        }

        let mut builder = Self::builder()
            .language_model(Arc::new(language_model))
            .section_keyword(&config.scoring.section_keyword)
            .decision_labels(config.scoring.decision_labels);

        match Self::load_classifier_scorer(config) {
            Ok(scorer) => builder = builder.classifier_scorer(scorer),
            Err(e) => error!("Classifier scoring disabled: {}", e),
        }

        match load_oracle(config.artifacts.similarity_backend, &config.similarity_model_path()) {
            Ok(oracle) => {
                info!("Similarity oracle ready: {}", oracle.name());
                let scorer = SimilarityScorer::new(Arc::from(oracle))
                    .with_threshold(config.scoring.similarity_threshold);
                builder = builder.similarity_scorer(scorer);
            }
            Err(e) => error!("Similarity scoring disabled: {}", e),
        }

        let context = builder.build()?;
        info!(
            "Inference context loaded in {:.2?} (strategies: {})",
            start_time.elapsed(),
            context
                .available_strategies()
                .iter()
                .map(ScoringStrategy::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(context)
    }

    fn load_classifier_scorer(config: &Config) -> Result<ClassifierScorer> {
        let vocabulary = Vocabulary::from_file(&config.vocabulary_path())?;
        let encoder = SequenceEncoder::new(Arc::new(vocabulary), config.sequence_lengths());
        let classifier = Self::load_classifier(config)?;

        Ok(ClassifierScorer::new(encoder, classifier)?.with_threshold(config.scoring.decision_threshold))
    }

    fn load_classifier(config: &Config) -> Result<Arc<dyn MatchClassifier>> {
        let weights = config.classifier_weights_path();

        if is_onnx(&weights) {
            #[cfg(feature = "onnx")]
            {
                let classifier =
                    crate::scoring::onnx::OnnxMatchClassifier::load(&weights, config.sequence_lengths())?;
                return Ok(Arc::new(classifier));
            }
            #[cfg(not(feature = "onnx"))]
            {
                return Err(ResumeScorerError::ResourceLoad(format!(
                    "'{}' is an ONNX graph but ONNX support was not compiled in",
                    weights.display()
                )));
            }
        }

        let classifier = CandleMatchClassifier::from_files(&weights, &config.classifier_config_path())?;
        Ok(Arc::new(classifier))
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// False when the linguistic model has no lemma table
    pub fn lemmatizes(&self) -> bool {
        self.normalizer.lemmatizes()
    }

    pub fn trimmer(&self) -> &SectionTrimmer {
        &self.trimmer
    }

    pub fn decision_labels(&self) -> DecisionLabels {
        self.decision_labels
    }

    pub fn classifier_scorer(&self) -> Option<&ClassifierScorer> {
        self.classifier.as_ref()
    }

    pub fn similarity_scorer(&self) -> Option<&SimilarityScorer> {
        self.similarity.as_ref()
    }

    pub fn is_available(&self, strategy: ScoringStrategy) -> bool {
        match strategy {
            ScoringStrategy::Classifier => self.classifier.is_some(),
            ScoringStrategy::Similarity => self.similarity.is_some(),
        }
    }

    pub fn available_strategies(&self) -> Vec<ScoringStrategy> {
        [ScoringStrategy::Classifier, ScoringStrategy::Similarity]
            .into_iter()
            .filter(|s| self.is_available(*s))
            .collect()
    }

    pub fn scorer(&self, strategy: ScoringStrategy) -> Result<&dyn Scorer> {
        let scorer: Option<&dyn Scorer> = match strategy {
            ScoringStrategy::Classifier => self.classifier.as_ref().map(|s| s as &dyn Scorer),
            ScoringStrategy::Similarity => self.similarity.as_ref().map(|s| s as &dyn Scorer),
        };
        scorer.ok_or(ResumeScorerError::ScorerUnavailable(strategy))
    }
}

fn is_onnx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("onnx"))
        .unwrap_or(false)
}

#[derive(Default)]
pub struct InferenceContextBuilder {
    language_model: Option<Arc<dyn LanguageModel>>,
    section_keyword: Option<String>,
    classifier: Option<ClassifierScorer>,
    similarity: Option<SimilarityScorer>,
    decision_labels: DecisionLabels,
}

impl InferenceContextBuilder {
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    pub fn section_keyword(mut self, keyword: &str) -> Self {
        self.section_keyword = Some(keyword.to_string());
        self
    }

    pub fn classifier_scorer(mut self, scorer: ClassifierScorer) -> Self {
        self.classifier = Some(scorer);
        self
    }

    pub fn similarity_scorer(mut self, scorer: SimilarityScorer) -> Self {
        self.similarity = Some(scorer);
        self
    }

    pub fn decision_labels(mut self, labels: DecisionLabels) -> Self {
        self.decision_labels = labels;
        self
    }

    pub fn build(self) -> Result<InferenceContext> {
        if self.classifier.is_none() && self.similarity.is_none() {
            return Err(ResumeScorerError::ResourceLoad(
                "no scoring strategy could be loaded".to_string(),
            ));
        }

        let normalizer = match self.language_model {
            Some(model) => Normalizer::new(model),
            None => Normalizer::default(),
        };
        let trimmer = self
            .section_keyword
            .map(|k| SectionTrimmer::new(&k))
            .unwrap_or_default();

        Ok(InferenceContext {
            normalizer,
            trimmer,
            classifier: self.classifier,
            similarity: self.similarity,
            decision_labels: self.decision_labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::scoring::similarity::SimilarityOracle;

    struct ExactMatchOracle;

    impl SimilarityOracle for ExactMatchOracle {
        fn name(&self) -> &str {
            "exact"
        }

        fn similarity(&self, a: &str, b: &str) -> Result<f32> {
            Ok(if a == b { 1.0 } else { 0.0 })
        }
    }

    #[test]
    fn test_builder_requires_a_strategy() {
        assert!(matches!(
            InferenceContext::builder().build(),
            Err(ResumeScorerError::ResourceLoad(_))
        ));
    }

    #[test]
    fn test_missing_strategy_is_unavailable() {
        let context = InferenceContext::builder()
            .similarity_scorer(SimilarityScorer::new(Arc::new(ExactMatchOracle)))
            .build()
            .unwrap();

        assert_eq!(context.available_strategies(), vec![ScoringStrategy::Similarity]);
        assert!(context.scorer(ScoringStrategy::Similarity).is_ok());
        assert!(matches!(
            context.scorer(ScoringStrategy::Classifier),
            Err(ResumeScorerError::ScorerUnavailable(ScoringStrategy::Classifier))
        ));
    }

    #[test]
    fn test_load_degrades_to_similarity() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vectors.txt"), "rust 1 0\ngo 0 1\n").unwrap();

        let mut config = Config::default();
        config.artifacts.artifacts_dir = dir.path().to_path_buf();
        config.artifacts.similarity_model = "vectors.txt".into();

        let context = InferenceContext::load(&config).unwrap();
        assert!(!context.is_available(ScoringStrategy::Classifier));
        assert!(context.is_available(ScoringStrategy::Similarity));
        assert!(!context.lemmatizes());
    }

    #[test]
    fn test_load_with_lemma_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vectors.txt"), "rust 1 0\nrun 0 1\n").unwrap();
        std::fs::write(dir.path().join("lemmas.json"), r#"{"running": "run"}"#).unwrap();

        let mut config = Config::default();
        config.artifacts.artifacts_dir = dir.path().to_path_buf();
        config.artifacts.similarity_model = "vectors.txt".into();
        config.artifacts.lemma_lookup = Some("lemmas.json".into());

        let context = InferenceContext::load(&config).unwrap();
        assert!(context.lemmatizes());
        assert_eq!(context.normalizer().normalize("Running Rust").as_slice(), &["run", "rust"]);
    }

    #[test]
    fn test_empty_lemma_table_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vectors.txt"), "rust 1 0\n").unwrap();
        std::fs::write(dir.path().join("lemmas.json"), "{}").unwrap();

        let mut config = Config::default();
        config.artifacts.artifacts_dir = dir.path().to_path_buf();
        config.artifacts.similarity_model = "vectors.txt".into();
        config.artifacts.lemma_lookup = Some("lemmas.json".into());

        let context = InferenceContext::load(&config).unwrap();
        assert!(!context.lemmatizes());
    }

    #[test]
    fn test_load_fails_without_any_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.artifacts.artifacts_dir = dir.path().to_path_buf();

        assert!(InferenceContext::load(&config).is_err());
    }

    #[test]
    fn test_onnx_detection() {
        assert!(is_onnx(Path::new("model.ONNX")));
        assert!(!is_onnx(Path::new("model.safetensors")));
    }
}
