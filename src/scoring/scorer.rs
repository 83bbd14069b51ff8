//! The two interchangeable scoring strategies

use crate::error::{Result, ResumeScorerError};
use crate::processing::document::DocumentRole;
use crate::processing::encoder::SequenceEncoder;
use crate::processing::normalizer::TokenSequence;
use crate::scoring::classifier::MatchClassifier;
use crate::scoring::decision::{classifier_verdict, similarity_verdict, DEFAULT_DECISION_THRESHOLD};
use crate::scoring::similarity::SimilarityOracle;
use crate::scoring::types::{ScoreResult, ScoringStrategy};
use log::debug;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;

/// Scores an already normalized (and, for resumes, trimmed) pair of token sequences
pub trait Scorer: Send + Sync {
    fn strategy(&self) -> ScoringStrategy;

    fn score(&self, resume: &TokenSequence, job: &TokenSequence) -> Result<ScoreResult>;
}

pub struct ClassifierScorer {
    encoder: SequenceEncoder,
    classifier: Arc<dyn MatchClassifier>,
    threshold: f32,
}

impl ClassifierScorer {
    /// Fails when the encoder's lengths disagree with the classifier's input shape
    pub fn new(encoder: SequenceEncoder, classifier: Arc<dyn MatchClassifier>) -> Result<Self> {
        if encoder.lengths() != classifier.input_lengths() {
            let expected = classifier.input_lengths();
            return Err(ResumeScorerError::ResourceLoad(format!(
                "encoding lengths ({}, {}) do not match classifier '{}' input shape ({}, {})",
                encoder.lengths().resume,
                encoder.lengths().job_description,
                classifier.name(),
                expected.resume,
                expected.job_description
            )));
        }

        Ok(Self {
            encoder,
            classifier,
            threshold: DEFAULT_DECISION_THRESHOLD,
        })
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn encoder(&self) -> &SequenceEncoder {
        &self.encoder
    }
}

impl Scorer for ClassifierScorer {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::Classifier
    }

    fn score(&self, resume: &TokenSequence, job: &TokenSequence) -> Result<ScoreResult> {
        let resume_vector = self
            .encoder
            .encode_for_role(&resume.joined(), DocumentRole::Resume);
        let job_vector = self
            .encoder
            .encode_for_role(&job.joined(), DocumentRole::JobDescription);
        debug!(
            "Encoded resume ({} known tokens) and job description ({} known tokens)",
            resume_vector.content_len(),
            job_vector.content_len()
        );

        let probability = self.classifier.predict(&resume_vector, &job_vector)?;
        Ok(ScoreResult::Classifier(classifier_verdict(
            probability,
            self.threshold,
        )))
    }
}

pub struct SimilarityScorer {
    oracle: Arc<dyn SimilarityOracle>,
    threshold: f32,
}

impl SimilarityScorer {
    pub fn new(oracle: Arc<dyn SimilarityOracle>) -> Self {
        Self {
            oracle,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// First job token strictly above the threshold, not the best one
    fn first_match<'a>(&self, resume_token: &str, job: &'a [String]) -> Result<Option<(&'a str, f32)>> {
        for job_token in job {
            let similarity = self.oracle.similarity(resume_token, job_token)?;
            if similarity > self.threshold {
                return Ok(Some((job_token.as_str(), similarity)));
            }
        }
        Ok(None)
    }
}

impl Scorer for SimilarityScorer {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::Similarity
    }

    fn score(&self, resume: &TokenSequence, job: &TokenSequence) -> Result<ScoreResult> {
        let mut matched_keywords = BTreeSet::new();
        let mut similarity_sum = 0.0f64;
        let mut match_count = 0usize;

        for resume_token in resume.iter() {
            if let Some((job_token, similarity)) = self.first_match(resume_token, job.as_slice())? {
                matched_keywords.insert(job_token.to_string());
                similarity_sum += similarity as f64;
                match_count += 1;
            }
        }

        // Distinct matches over every job token, repeats included
        let coverage = if job.is_empty() {
            0.0
        } else {
            matched_keywords.len() as f64 / job.len() as f64
        };
        let mean_similarity = if match_count == 0 {
            0.0
        } else {
            similarity_sum / match_count as f64
        };

        debug!(
            "{} of {} resume tokens matched {} distinct job tokens",
            match_count,
            resume.len(),
            matched_keywords.len()
        );

        Ok(ScoreResult::Similarity(similarity_verdict(
            mean_similarity,
            coverage,
            matched_keywords,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::encoder::{EncodedVector, SequenceLengths, JOB_MAX_LEN, RESUME_MAX_LEN};
    use crate::processing::normalizer::Normalizer;
    use crate::processing::trimmer::SectionTrimmer;
    use crate::processing::vocabulary::{OovPolicy, Vocabulary};
    use crate::scoring::types::Decision;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct ExactMatchOracle;

    impl SimilarityOracle for ExactMatchOracle {
        fn name(&self) -> &str {
            "exact"
        }

        fn similarity(&self, a: &str, b: &str) -> Result<f32> {
            Ok(if a == b { 1.0 } else { 0.0 })
        }
    }

    /// Scores fixed per job token, regardless of the resume token
    struct TableOracle(HashMap<&'static str, f32>);

    impl SimilarityOracle for TableOracle {
        fn name(&self) -> &str {
            "table"
        }

        fn similarity(&self, _a: &str, b: &str) -> Result<f32> {
            Ok(self.0.get(b).copied().unwrap_or(0.0))
        }
    }

    struct FixedClassifier {
        probability: f32,
        seen: Mutex<Vec<(usize, usize)>>,
    }

    impl FixedClassifier {
        fn new(probability: f32) -> Self {
            Self {
                probability,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl MatchClassifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        fn input_lengths(&self) -> SequenceLengths {
            SequenceLengths::default()
        }

        fn predict(&self, resume: &EncodedVector, job: &EncodedVector) -> Result<f32> {
            self.seen.lock().unwrap().push((resume.len(), job.len()));
            Ok(self.probability)
        }
    }

    struct FailingClassifier;

    impl MatchClassifier for FailingClassifier {
        fn name(&self) -> &str {
            "failing"
        }

        fn input_lengths(&self) -> SequenceLengths {
            SequenceLengths::default()
        }

        fn predict(&self, _resume: &EncodedVector, _job: &EncodedVector) -> Result<f32> {
            Err(ResumeScorerError::Inference("model crashed".to_string()))
        }
    }

    fn encoder() -> SequenceEncoder {
        let word_index = [("rust", 1), ("engineer", 2)]
            .iter()
            .map(|(w, i)| (w.to_string(), *i))
            .collect();
        SequenceEncoder::new(
            Arc::new(Vocabulary::new(word_index, OovPolicy::Drop)),
            SequenceLengths::default(),
        )
    }

    fn tokens(words: &[&str]) -> TokenSequence {
        TokenSequence::new(words.iter().map(|w| w.to_string()).collect())
    }

    fn similarity_of(result: ScoreResult) -> crate::scoring::types::SimilarityScore {
        match result {
            ScoreResult::Similarity(score) => score,
            other => panic!("expected similarity result, got {:?}", other),
        }
    }

    #[test]
    fn test_classifier_select() {
        let classifier = Arc::new(FixedClassifier::new(0.82));
        let scorer = ClassifierScorer::new(encoder(), classifier.clone()).unwrap();

        let result = scorer
            .score(&tokens(&["rust", "engineer"]), &tokens(&["rust"]))
            .unwrap();

        match result {
            ScoreResult::Classifier(score) => {
                assert_eq!(score.decision, Decision::Select);
                assert_eq!(score.probability, 82.0);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(
            classifier.seen.lock().unwrap().as_slice(),
            &[(RESUME_MAX_LEN, JOB_MAX_LEN)]
        );
    }

    #[test]
    fn test_classifier_reject() {
        let scorer = ClassifierScorer::new(encoder(), Arc::new(FixedClassifier::new(0.31))).unwrap();
        let result = scorer.score(&tokens(&["cobol"]), &tokens(&["rust"])).unwrap();

        match result {
            ScoreResult::Classifier(score) => {
                assert_eq!(score.decision, Decision::Reject);
                assert_eq!(score.probability, 31.0);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_custom_decision_threshold() {
        let scorer = ClassifierScorer::new(encoder(), Arc::new(FixedClassifier::new(0.6)))
            .unwrap()
            .with_threshold(0.75);
        let result = scorer.score(&tokens(&["rust"]), &tokens(&["rust"])).unwrap();
        assert!(matches!(
            result,
            ScoreResult::Classifier(ref s) if s.decision == Decision::Reject
        ));
    }

    #[test]
    fn test_inference_failure_propagates() {
        let scorer = ClassifierScorer::new(encoder(), Arc::new(FailingClassifier)).unwrap();
        let err = scorer.score(&tokens(&["rust"]), &tokens(&["rust"])).unwrap_err();
        assert!(matches!(err, ResumeScorerError::Inference(_)));
    }

    #[test]
    fn test_mismatched_lengths_rejected_at_construction() {
        let short = SequenceEncoder::new(
            encoder().vocabulary().clone().into(),
            SequenceLengths {
                resume: 100,
                job_description: JOB_MAX_LEN,
            },
        );
        let result = ClassifierScorer::new(short, Arc::new(FixedClassifier::new(0.5)));
        assert!(matches!(result, Err(ResumeScorerError::ResourceLoad(_))));
    }

    #[test]
    fn test_trimmed_resume_against_job() {
        let normalizer = Normalizer::default();
        let resume = normalizer.normalize("Objective Build scalable systems in distributed computing");
        let resume = TokenSequence::from(SectionTrimmer::default().trim(resume.as_slice()));
        let job = normalizer.normalize("distributed systems engineer");

        assert!(!resume.iter().any(|t| t == "objective"));

        let scorer = SimilarityScorer::new(Arc::new(ExactMatchOracle));
        let score = similarity_of(scorer.score(&resume, &job).unwrap());

        assert!(score.matched_keywords.contains("distributed"));
        assert!(score.matched_keywords.contains("systems"));
        assert_eq!(score.coverage_score, 66.67);
        assert_eq!(score.similarity_score, 100.0);
    }

    #[test]
    fn test_first_match_wins_over_best_match() {
        let oracle = TableOracle([("backend", 0.75), ("rust", 0.99)].into_iter().collect());
        let scorer = SimilarityScorer::new(Arc::new(oracle));

        let score = similarity_of(
            scorer
                .score(&tokens(&["systems"]), &tokens(&["backend", "rust"]))
                .unwrap(),
        );

        assert_eq!(score.matched_keywords.len(), 1);
        assert!(score.matched_keywords.contains("backend"));
        assert_eq!(score.similarity_score, 75.0);
        assert_eq!(score.coverage_score, 50.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let oracle = TableOracle([("rust", 0.7)].into_iter().collect());
        let scorer = SimilarityScorer::new(Arc::new(oracle));

        let score = similarity_of(scorer.score(&tokens(&["rust"]), &tokens(&["rust"])).unwrap());
        assert!(score.matched_keywords.is_empty());
        assert_eq!(score.similarity_score, 0.0);
    }

    #[test]
    fn test_empty_job_has_zero_coverage() {
        let scorer = SimilarityScorer::new(Arc::new(ExactMatchOracle));
        let score = similarity_of(scorer.score(&tokens(&["rust"]), &tokens(&[])).unwrap());

        assert_eq!(score.coverage_score, 0.0);
        assert_eq!(score.similarity_score, 0.0);
        assert!(score.matched_keywords.is_empty());
    }

    #[test]
    fn test_repeated_job_tokens_count_toward_coverage() {
        let scorer = SimilarityScorer::new(Arc::new(ExactMatchOracle));
        let score = similarity_of(
            scorer
                .score(
                    &tokens(&["rust", "rust", "go"]),
                    &tokens(&["rust", "rust", "python"]),
                )
                .unwrap(),
        );

        assert_eq!(score.matched_keywords.len(), 1);
        assert_eq!(score.coverage_score, 33.33);
        assert_eq!(score.similarity_score, 100.0);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let scorer = SimilarityScorer::new(Arc::new(ExactMatchOracle));
        let cases = [
            (tokens(&[]), tokens(&["a"])),
            (tokens(&["a", "b", "c"]), tokens(&["a", "b", "c"])),
            (tokens(&["a", "a", "a", "a"]), tokens(&["a", "z"])),
        ];

        for (resume, job) in &cases {
            let score = similarity_of(scorer.score(resume, job).unwrap());
            assert!((0.0..=100.0).contains(&score.coverage_score));
            assert!((0.0..=100.0).contains(&score.similarity_score));
            assert!(score
                .matched_keywords
                .iter()
                .all(|k| job.iter().any(|t| t == k)));
        }
    }
}
