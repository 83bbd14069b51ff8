//! Error handling for the resume scorer

use crate::scoring::types::ScoringStrategy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeScorerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resource loading error: {0}")]
    ResourceLoad(String),

    #[error("Text extraction error: {0}")]
    Extraction(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Scorer unavailable: {0} artifacts were not loaded")]
    ScorerUnavailable(ScoringStrategy),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

/// Coarse classification of an error, exposed to request-level callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ResourceLoad,
    Extraction,
    Validation,
    Inference,
    Unavailable,
    Internal,
}

impl ResumeScorerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResumeScorerError::ResourceLoad(_) => ErrorKind::ResourceLoad,
            ResumeScorerError::Extraction(_) | ResumeScorerError::UnsupportedFormat(_) => {
                ErrorKind::Extraction
            }
            ResumeScorerError::Validation(_) => ErrorKind::Validation,
            ResumeScorerError::Inference(_) => ErrorKind::Inference,
            ResumeScorerError::ScorerUnavailable(_) => ErrorKind::Unavailable,
            _ => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResumeScorerError>;

/// model2vec reports load failures through anyhow
impl From<anyhow::Error> for ResumeScorerError {
    fn from(err: anyhow::Error) -> Self {
        ResumeScorerError::ResourceLoad(format!("{:#}", err))
    }
}

/// Convert candle core errors to our custom error type
impl From<candle_core::Error> for ResumeScorerError {
    fn from(err: candle_core::Error) -> Self {
        ResumeScorerError::Inference(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ResumeScorerError::Validation("missing resume".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ResumeScorerError::ScorerUnavailable(ScoringStrategy::Classifier).kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(
            ResumeScorerError::UnsupportedFormat("docx".into()).kind(),
            ErrorKind::Extraction
        );
        assert_eq!(
            ResumeScorerError::Configuration("bad".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_anyhow_chain_is_kept() {
        let err: ResumeScorerError = anyhow::anyhow!("file not found")
            .context("Failed to load model2vec model")
            .into();

        assert_eq!(err.kind(), ErrorKind::ResourceLoad);
        assert!(err.to_string().contains("Failed to load model2vec model: file not found"));
    }

    #[test]
    fn test_unavailable_message_names_strategy() {
        let err = ResumeScorerError::ScorerUnavailable(ScoringStrategy::Similarity);
        assert!(err.to_string().contains("similarity"));
    }
}
