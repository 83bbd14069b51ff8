//! Score result types shared by both scoring strategies

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    Classifier,
    Similarity,
}

impl ScoringStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringStrategy::Classifier => "classifier",
            ScoringStrategy::Similarity => "similarity",
        }
    }
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classifier" | "neural" => Ok(ScoringStrategy::Classifier),
            "similarity" | "semantic" => Ok(ScoringStrategy::Similarity),
            _ => Err(format!(
                "Invalid scoring strategy: {}. Supported: classifier, similarity",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Select,
    Reject,
}

/// Wording used when a decision is shown to a person
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionLabels {
    #[default]
    SelectReject,
    MatchNoMatch,
}

impl Decision {
    pub fn label(&self, labels: DecisionLabels) -> &'static str {
        match (self, labels) {
            (Decision::Select, DecisionLabels::SelectReject) => "SELECT",
            (Decision::Reject, DecisionLabels::SelectReject) => "REJECT",
            (Decision::Select, DecisionLabels::MatchNoMatch) => "MATCH",
            (Decision::Reject, DecisionLabels::MatchNoMatch) => "NO MATCH",
        }
    }

    pub fn is_select(&self) -> bool {
        matches!(self, Decision::Select)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierScore {
    /// Match probability as a percentage, rounded to two decimals
    pub probability: f64,
    pub decision: Decision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    /// Mean similarity of successful matches, percentage with two decimals
    pub similarity_score: f64,
    /// Distinct matched job tokens over all job-description tokens, percentage with two decimals
    pub coverage_score: f64,
    pub matched_keywords: BTreeSet<String>,
}

/// Outcome of one scoring request, tagged with the strategy that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ScoreResult {
    Classifier(ClassifierScore),
    Similarity(SimilarityScore),
}

impl ScoreResult {
    pub fn strategy(&self) -> ScoringStrategy {
        match self {
            ScoreResult::Classifier(_) => ScoringStrategy::Classifier,
            ScoreResult::Similarity(_) => ScoringStrategy::Similarity,
        }
    }

    /// Headline percentage: probability for the classifier, similarity otherwise
    pub fn headline_percentage(&self) -> f64 {
        match self {
            ScoreResult::Classifier(score) => score.probability,
            ScoreResult::Similarity(score) => score.similarity_score,
        }
    }
}
