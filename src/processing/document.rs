//! Document structures for a single scoring request

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw input for one request. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Pdf(Vec<u8>),
    Text(String),
    Markdown(String),
}

impl Document {
    pub fn is_empty(&self) -> bool {
        match self {
            Document::Pdf(bytes) => bytes.is_empty(),
            Document::Text(text) | Document::Markdown(text) => text.trim().is_empty(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Document::Pdf(_) => "pdf",
            Document::Text(_) => "text",
            Document::Markdown(_) => "markdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    Resume,
    JobDescription,
}

impl DocumentRole {
    /// Only resumes carry a contact header worth trimming
    pub fn is_trimmed(&self) -> bool {
        matches!(self, DocumentRole::Resume)
    }
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentRole::Resume => write!(f, "resume"),
            DocumentRole::JobDescription => write!(f, "job description"),
        }
    }
}

impl FromStr for DocumentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "resume" | "cv" => Ok(DocumentRole::Resume),
            "job" | "job-description" | "jd" => Ok(DocumentRole::JobDescription),
            _ => Err(format!("Invalid document role: {}. Supported: resume, job-description", s)),
        }
    }
}
