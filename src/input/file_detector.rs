//! File type detection

use crate::error::{Result, ResumeScorerError};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Text,
    Markdown,
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "txt" => FileType::Text,
            "md" | "markdown" => FileType::Markdown,
            _ => FileType::Unknown,
        }
    }

    /// Detect by extension; a missing or unknown extension is unsupported
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ResumeScorerError::UnsupportedFormat(format!("File has no extension: {}", path.display()))
            })?;

        match Self::from_extension(extension) {
            FileType::Unknown => Err(ResumeScorerError::UnsupportedFormat(format!(
                "Unsupported file type '.{}' for: {}",
                extension,
                path.display()
            ))),
            file_type => Ok(file_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(FileType::from_extension("PDF"), FileType::Pdf);
        assert_eq!(FileType::from_extension("txt"), FileType::Text);
        assert_eq!(FileType::from_extension("markdown"), FileType::Markdown);
        assert_eq!(FileType::from_extension("docx"), FileType::Unknown);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(FileType::from_path(Path::new("cv.pdf")).unwrap(), FileType::Pdf);
        assert!(matches!(
            FileType::from_path(Path::new("cv.docx")),
            Err(ResumeScorerError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            FileType::from_path(Path::new("README")),
            Err(ResumeScorerError::UnsupportedFormat(_))
        ));
    }
}
