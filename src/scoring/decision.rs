//! Turns raw scores into the externally visible verdict

use crate::scoring::types::{ClassifierScore, Decision, SimilarityScore};
use std::collections::BTreeSet;

pub const DEFAULT_DECISION_THRESHOLD: f32 = 0.5;

/// Round a ratio to a percentage with two decimals
pub fn to_percentage(ratio: f64) -> f64 {
    (ratio * 100.0 * 100.0).round() / 100.0
}

pub fn decide(probability: f32, threshold: f32) -> Decision {
    if probability >= threshold {
        Decision::Select
    } else {
        Decision::Reject
    }
}

pub fn classifier_verdict(probability: f32, threshold: f32) -> ClassifierScore {
    ClassifierScore {
        probability: to_percentage(probability as f64),
        decision: decide(probability, threshold),
    }
}

pub fn similarity_verdict(
    mean_similarity: f64,
    coverage: f64,
    matched_keywords: BTreeSet<String>,
) -> SimilarityScore {
    SimilarityScore {
        similarity_score: to_percentage(mean_similarity),
        coverage_score: to_percentage(coverage),
        matched_keywords,
    }
}
