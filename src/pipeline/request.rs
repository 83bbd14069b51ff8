//! Request and response types at the scoring boundary

use crate::error::{ErrorKind, Result, ResumeScorerError};
use crate::processing::document::Document;
use crate::scoring::types::{DecisionLabels, ScoreResult};
use serde::{Deserialize, Serialize};

/// One resume scored against one job description
#[derive(Debug, Clone, Default)]
pub struct ScoreRequest {
    pub resume: Option<Document>,
    pub job_description: Option<String>,
}

impl ScoreRequest {
    pub fn new(resume: Document, job_description: impl Into<String>) -> Self {
        Self {
            resume: Some(resume),
            job_description: Some(job_description.into()),
        }
    }

    /// Both inputs present and non-blank, checked before any extraction happens
    pub fn validate(&self) -> Result<(&Document, &str)> {
        let resume = self
            .resume
            .as_ref()
            .filter(|doc| !doc.is_empty())
            .ok_or_else(|| ResumeScorerError::Validation("a resume document is required".to_string()))?;

        let job_description = self
            .job_description
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ResumeScorerError::Validation("a job description is required".to_string()))?;

        Ok((resume, job_description))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScoreResult>,
}

impl ScoreResponse {
    pub fn from_result(result: ScoreResult, labels: DecisionLabels) -> Self {
        Self {
            success: true,
            message: summary_message(&result, labels),
            error_kind: None,
            result: Some(result),
        }
    }

    pub fn from_error(error: &ResumeScorerError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            error_kind: Some(error.kind()),
            result: None,
        }
    }
}

/// One-line human summary of a score
pub fn summary_message(result: &ScoreResult, labels: DecisionLabels) -> String {
    match result {
        ScoreResult::Classifier(score) => format!(
            "Match probability: {:.2}% - {}",
            score.probability,
            score.decision.label(labels)
        ),
        ScoreResult::Similarity(score) => format!(
            "Similarity: {:.2}%, keyword coverage: {:.2}% ({} matched keywords)",
            score.similarity_score,
            score.coverage_score,
            score.matched_keywords.len()
        ),
    }
}
