//! Report structures wrapping a score response with run metadata

use crate::pipeline::request::ScoreResponse;
use crate::scoring::types::{DecisionLabels, ScoreResult, ScoringStrategy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub response: ScoreResponse,
    pub metadata: ReportMetadata,
}

/// Where the inputs came from and how they were scored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub resume_source: String,
    pub job_source: String,
    pub strategy: ScoringStrategy,
    pub decision_labels: DecisionLabels,
    pub processing_time_ms: u64,
    pub version: String,
}

impl ReportMetadata {
    pub fn new(
        resume_source: impl Into<String>,
        job_source: impl Into<String>,
        strategy: ScoringStrategy,
        decision_labels: DecisionLabels,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            resume_source: resume_source.into(),
            job_source: job_source.into(),
            strategy,
            decision_labels,
            processing_time_ms,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ScoreReport {
    pub fn new(response: ScoreResponse, metadata: ReportMetadata) -> Self {
        Self { response, metadata }
    }

    pub fn is_success(&self) -> bool {
        self.response.success
    }

    pub fn result(&self) -> Option<&ScoreResult> {
        self.response.result.as_ref()
    }
}
