//! Loads resumes and job descriptions from disk

use crate::error::{Result, ResumeScorerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::extract_text;
use crate::processing::document::Document;
use log::info;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Default, Clone, Copy)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Read a file into a typed document without extracting its text
    pub async fn load_document(&self, path: &Path) -> Result<Document> {
        let file_type = FileType::from_path(path)?;

        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(ResumeScorerError::Validation(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let document = match file_type {
            FileType::Pdf => {
                info!("Reading PDF: {}", path.display());
                Document::Pdf(fs::read(path).await?)
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                Document::Text(Self::read_utf8(path).await?)
            }
            FileType::Markdown => {
                info!("Reading markdown file: {}", path.display());
                Document::Markdown(Self::read_utf8(path).await?)
            }
            FileType::Unknown => {
                return Err(ResumeScorerError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}",
                    path.display()
                )))
            }
        };

        Ok(document)
    }

    /// Load a file and return its plain text
    pub async fn extract_text(&self, path: &Path) -> Result<String> {
        let document = self.load_document(path).await?;
        extract_text(&document)
    }

    async fn read_utf8(path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        String::from_utf8(bytes).map_err(|e| {
            ResumeScorerError::Extraction(format!("'{}' is not valid UTF-8: {}", path.display(), e))
        })
    }
}
