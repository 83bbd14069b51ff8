//! End-to-end scoring: validate, extract, normalize, trim, score

pub mod context;
pub mod request;

pub use context::{InferenceContext, InferenceContextBuilder};
pub use request::{ScoreRequest, ScoreResponse};

use crate::error::Result;
use crate::input::text_extractor::extract_text;
use crate::processing::document::{Document, DocumentRole};
use crate::processing::normalizer::TokenSequence;
use crate::scoring::types::{ScoreResult, ScoringStrategy};
use log::{debug, info, warn};

/// Runs requests against a loaded context. Holds no per-request state.
pub struct MatchPipeline<'a> {
    context: &'a InferenceContext,
}

impl<'a> MatchPipeline<'a> {
    pub fn new(context: &'a InferenceContext) -> Self {
        Self { context }
    }

    /// Normalized tokens for a text, trimmed when the role calls for it
    pub fn tokens_for(&self, text: &str, role: DocumentRole) -> TokenSequence {
        let tokens = self.context.normalizer().normalize(text);
        if role.is_trimmed() {
            TokenSequence::from(self.context.trimmer().trim(tokens.as_slice()))
        } else {
            tokens
        }
    }

    pub fn prepare_resume(&self, document: &Document) -> Result<TokenSequence> {
        let text = extract_text(document)?;
        debug!("Extracted {} characters from {} resume", text.len(), document.kind());
        Ok(self.tokens_for(&text, DocumentRole::Resume))
    }

    pub fn score(&self, request: &ScoreRequest, strategy: ScoringStrategy) -> Result<ScoreResult> {
        let (resume, job_description) = request.validate()?;
        let scorer = self.context.scorer(strategy)?;

        let resume_tokens = self.prepare_resume(resume)?;
        let job_tokens = self.tokens_for(job_description, DocumentRole::JobDescription);
        debug!(
            "Scoring {} resume tokens against {} job tokens with {}",
            resume_tokens.len(),
            job_tokens.len(),
            strategy
        );

        scorer.score(&resume_tokens, &job_tokens)
    }

    /// Request boundary: every failure becomes an unsuccessful response
    pub fn handle(&self, request: &ScoreRequest, strategy: ScoringStrategy) -> ScoreResponse {
        match self.score(request, strategy) {
            Ok(result) => {
                info!("Scored request with {}: {:.2}%", strategy, result.headline_percentage());
                ScoreResponse::from_result(result, self.context.decision_labels())
            }
            Err(e) => {
                warn!("Scoring request failed ({:?}): {}", e.kind(), e);
                ScoreResponse::from_error(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ResumeScorerError};
    use crate::processing::encoder::{EncodedVector, SequenceEncoder, SequenceLengths};
    use crate::processing::vocabulary::{OovPolicy, Vocabulary};
    use crate::scoring::classifier::MatchClassifier;
    use crate::scoring::scorer::{ClassifierScorer, SimilarityScorer};
    use crate::scoring::similarity::SimilarityOracle;
    use crate::scoring::types::{Decision, DecisionLabels};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingOracle {
        calls: AtomicUsize,
    }

    impl SimilarityOracle for CountingOracle {
        fn name(&self) -> &str {
            "counting"
        }

        fn similarity(&self, a: &str, b: &str) -> Result<f32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(if a == b { 1.0 } else { 0.0 })
        }
    }

    struct FixedClassifier(f32);

    impl MatchClassifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        fn input_lengths(&self) -> SequenceLengths {
            SequenceLengths::default()
        }

        fn predict(&self, _resume: &EncodedVector, _job: &EncodedVector) -> Result<f32> {
            Ok(self.0)
        }
    }

    fn context(oracle: Arc<CountingOracle>, probability: f32) -> InferenceContext {
        let encoder = SequenceEncoder::new(
            Arc::new(Vocabulary::new(HashMap::new(), OovPolicy::Drop)),
            SequenceLengths::default(),
        );
        InferenceContext::builder()
            .classifier_scorer(ClassifierScorer::new(encoder, Arc::new(FixedClassifier(probability))).unwrap())
            .similarity_scorer(SimilarityScorer::new(oracle))
            .decision_labels(DecisionLabels::SelectReject)
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_resume_skips_all_work() {
        let oracle = Arc::new(CountingOracle::default());
        let context = context(oracle.clone(), 0.9);
        let pipeline = MatchPipeline::new(&context);

        let request = ScoreRequest {
            resume: None,
            job_description: Some("distributed systems engineer".to_string()),
        };
        let response = pipeline.handle(&request, ScoringStrategy::Similarity);

        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::Validation));
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_validation_precedes_extraction() {
        let oracle = Arc::new(CountingOracle::default());
        let context = context(oracle, 0.9);
        let pipeline = MatchPipeline::new(&context);

        // An unreadable PDF would be an extraction error if it were ever parsed
        let request = ScoreRequest::new(Document::Pdf(b"not a pdf".to_vec()), "   ");
        let err = pipeline.score(&request, ScoringStrategy::Classifier).unwrap_err();
        assert!(matches!(err, ResumeScorerError::Validation(_)));
    }

    #[test]
    fn test_corrupt_pdf_is_extraction_failure() {
        let context = context(Arc::new(CountingOracle::default()), 0.9);
        let pipeline = MatchPipeline::new(&context);

        let request = ScoreRequest::new(Document::Pdf(b"not a pdf".to_vec()), "Rust engineer");
        let response = pipeline.handle(&request, ScoringStrategy::Classifier);
        assert_eq!(response.error_kind, Some(ErrorKind::Extraction));
    }

    #[test]
    fn test_similarity_end_to_end() {
        let context = context(Arc::new(CountingOracle::default()), 0.9);
        let pipeline = MatchPipeline::new(&context);

        let request = ScoreRequest::new(
            Document::Text("Objective Build scalable systems in distributed computing".to_string()),
            "distributed systems engineer",
        );
        let result = pipeline.score(&request, ScoringStrategy::Similarity).unwrap();

        match result {
            ScoreResult::Similarity(score) => {
                assert!(score.matched_keywords.contains("distributed"));
                assert!(score.matched_keywords.contains("systems"));
                assert_eq!(score.coverage_score, 66.67);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_classifier_end_to_end() {
        let context = context(Arc::new(CountingOracle::default()), 0.31);
        let pipeline = MatchPipeline::new(&context);

        let request = ScoreRequest::new(Document::Text("COBOL mainframe".to_string()), "Rust engineer");
        let response = pipeline.handle(&request, ScoringStrategy::Classifier);

        assert!(response.success);
        assert_eq!(response.message, "Match probability: 31.00% - REJECT");
        assert!(matches!(
            response.result,
            Some(ScoreResult::Classifier(ref s)) if s.decision == Decision::Reject && s.probability == 31.0
        ));
    }

    #[test]
    fn test_trimming_applies_to_resumes_only() {
        let context = context(Arc::new(CountingOracle::default()), 0.5);
        let pipeline = MatchPipeline::new(&context);

        let resume = pipeline.tokens_for("Jane Doe Objective rust", DocumentRole::Resume);
        let job = pipeline.tokens_for("Jane Doe Objective rust", DocumentRole::JobDescription);

        assert_eq!(resume.as_slice(), &["rust"]);
        assert_eq!(job.len(), 4);
    }
}
