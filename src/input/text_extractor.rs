//! Text extraction from uploaded documents

use crate::error::{Result, ResumeScorerError};
use crate::processing::document::Document;
use log::debug;
use pulldown_cmark::{Event, Parser, Tag};
use std::panic;

pub trait TextExtractor {
    type Input: ?Sized;

    fn extract(&self, input: &Self::Input) -> Result<String>;
}

/// Plain text of any supported document, trimmed
pub fn extract_text(document: &Document) -> Result<String> {
    match document {
        Document::Pdf(bytes) => PdfExtractor.extract(bytes.as_slice()),
        Document::Text(text) => PlainTextExtractor.extract(text.as_str()),
        Document::Markdown(markdown) => MarkdownExtractor.extract(markdown.as_str()),
    }
}

/// Pages joined by one space. Pages without text contribute nothing.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|page| page.as_ref().trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    type Input = [u8];

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(ResumeScorerError::Extraction("PDF document is empty".to_string()));
        }

        // The PDF backend panics on some malformed inputs
        let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
            .map_err(|_| {
                ResumeScorerError::Extraction("PDF parser aborted on a malformed document".to_string())
            })?
            .map_err(|e| ResumeScorerError::Extraction(format!("Failed to extract text from PDF: {}", e)))?;

        debug!("Extracted {} PDF pages", pages.len());
        Ok(join_pages(&pages))
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    type Input = str;

    fn extract(&self, text: &str) -> Result<String> {
        Ok(text.trim().to_string())
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    type Input = str;

    fn extract(&self, markdown: &str) -> Result<String> {
        let mut text = String::new();

        for event in Parser::new(markdown) {
            match event {
                Event::Text(content) | Event::Code(content) => text.push_str(&content),
                Event::SoftBreak | Event::HardBreak | Event::Rule => text.push('\n'),
                Event::End(Tag::Paragraph | Tag::Heading(..) | Tag::Item | Tag::CodeBlock(_)) => {
                    text.push('\n')
                }
                _ => {}
            }
        }

        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        Ok(lines.join("\n"))
    }
}
