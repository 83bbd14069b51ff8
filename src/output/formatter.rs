//! Output formatters for score reports

use crate::config::OutputFormat;
use crate::error::{Result, ResumeScorerError};
use crate::output::report::ScoreReport;
use crate::scoring::types::{ClassifierScore, DecisionLabels, ScoreResult, SimilarityScore};
use colored::{Color, Colorize};
use std::path::{Path, PathBuf};

/// Trait for formatting score reports
pub trait OutputFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colored verdicts
pub struct ConsoleFormatter {
    use_colors: bool,
}

/// JSON formatter for API integration and structured data
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for saved reports
pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Report generator that coordinates the formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn file_name(source: &str) -> String {
    Path::new(source)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| source.to_string())
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "█".blue().bold(), title.blue().bold())
        } else {
            format!("\n█ {}\n", title)
        }
    }

    fn format_verdict(&self, score: &ClassifierScore, labels: DecisionLabels) -> String {
        let label = score.decision.label(labels);
        if !self.use_colors {
            return format!("[{}]", label);
        }

        let color = if score.decision.is_select() {
            Color::Green
        } else {
            Color::Red
        };
        format!("[{}]", label.color(color).bold())
    }

    fn format_classifier(&self, score: &ClassifierScore, labels: DecisionLabels) -> String {
        format!(
            "Match probability: {:.2}%\nDecision: {}\n",
            score.probability,
            self.format_verdict(score, labels)
        )
    }

    fn format_similarity(&self, score: &SimilarityScore) -> String {
        let mut output = format!(
            "Similarity score: {:.2}%\nKeyword coverage: {:.2}%\n",
            score.similarity_score, score.coverage_score
        );

        if score.matched_keywords.is_empty() {
            output.push_str(&self.colorize("No job keywords matched\n", Color::Yellow));
        } else {
            let keywords: Vec<&str> = score.matched_keywords.iter().map(String::as_str).collect();
            output.push_str(&format!(
                "Matched keywords ({}): {}\n",
                keywords.len(),
                self.colorize(&keywords.join(", "), Color::Cyan)
            ));
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String> {
        let metadata = &report.metadata;
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME MATCH SCORE"));
        output.push_str(&format!(
            "Resume: {} | Job: {} | Strategy: {}\n",
            file_name(&metadata.resume_source),
            file_name(&metadata.job_source),
            metadata.strategy
        ));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n\n",
            metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            metadata.processing_time_ms
        ));

        match report.result() {
            Some(ScoreResult::Classifier(score)) => {
                output.push_str(&self.format_classifier(score, metadata.decision_labels))
            }
            Some(ScoreResult::Similarity(score)) => output.push_str(&self.format_similarity(score)),
            None => {
                output.push_str(&format!(
                    "{} {}\n",
                    self.colorize("Scoring failed:", Color::Red),
                    report.response.message
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String> {
        let metadata = &report.metadata;
        let mut output = String::new();

        output.push_str("# Resume Match Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Strategy:** {} | **Version:** {}\n",
                metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                metadata.strategy,
                metadata.version
            ));
            output.push_str(&format!(
                "**Resume:** `{}` | **Job:** `{}`\n\n",
                file_name(&metadata.resume_source),
                file_name(&metadata.job_source)
            ));
        }

        match report.result() {
            Some(ScoreResult::Classifier(score)) => {
                output.push_str("| Metric | Value |\n|--------|-------|\n");
                output.push_str(&format!("| Match probability | {:.2}% |\n", score.probability));
                output.push_str(&format!(
                    "| Decision | **{}** |\n",
                    score.decision.label(metadata.decision_labels)
                ));
            }
            Some(ScoreResult::Similarity(score)) => {
                output.push_str("| Metric | Value |\n|--------|-------|\n");
                output.push_str(&format!("| Similarity score | {:.2}% |\n", score.similarity_score));
                output.push_str(&format!("| Keyword coverage | {:.2}% |\n", score.coverage_score));

                output.push_str("\n## Matched Keywords\n\n");
                if score.matched_keywords.is_empty() {
                    output.push_str("_None_\n");
                }
                for keyword in &score.matched_keywords {
                    output.push_str(&format!("- {}\n", keyword));
                }
            }
            None => {
                output.push_str(&format!("**Scoring failed:** {}\n", report.response.message));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, true, true)
    }

    pub fn with_options(use_colors: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &ScoreReport, format: OutputFormat) -> Result<String> {
        let formatter: &dyn OutputFormatter = match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        };
        formatter.format_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content).map_err(|e| {
        ResumeScorerError::OutputFormatting(format!(
            "Failed to write report to '{}': {}",
            file_path.display(),
            e
        ))
    })
}

/// A directory target gets a filename derived from the resume
pub fn report_path(save: &Path, format: OutputFormat, resume_name: &str) -> PathBuf {
    if save.is_dir() {
        save.join(suggest_filename(format, resume_name, true))
    } else {
        save.to_path_buf()
    }
}

pub fn suggest_filename(format: OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_score{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_score{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_score{}.md", base_name, timestamp_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResumeScorerError;
    use crate::output::report::ReportMetadata;
    use crate::pipeline::request::ScoreResponse;
    use crate::scoring::types::{Decision, ScoringStrategy};
    use std::collections::BTreeSet;

    fn classifier_report(decision: Decision, labels: DecisionLabels) -> ScoreReport {
        let result = ScoreResult::Classifier(ClassifierScore {
            probability: 82.0,
            decision,
        });
        ScoreReport::new(
            ScoreResponse::from_result(result, labels),
            ReportMetadata::new("cv/jane.pdf", "job.md", ScoringStrategy::Classifier, labels, 12),
        )
    }

    fn similarity_report() -> ScoreReport {
        let keywords: BTreeSet<String> = ["systems", "distributed"].iter().map(|s| s.to_string()).collect();
        let result = ScoreResult::Similarity(SimilarityScore {
            similarity_score: 100.0,
            coverage_score: 66.67,
            matched_keywords: keywords,
        });
        ScoreReport::new(
            ScoreResponse::from_result(result, DecisionLabels::SelectReject),
            ReportMetadata::new(
                "resume.txt",
                "inline",
                ScoringStrategy::Similarity,
                DecisionLabels::SelectReject,
                3,
            ),
        )
    }

    #[test]
    fn test_console_without_colors() {
        let output = ConsoleFormatter::new(false)
            .format_report(&classifier_report(Decision::Select, DecisionLabels::SelectReject))
            .unwrap();

        assert!(output.contains("Resume: jane.pdf"));
        assert!(output.contains("Match probability: 82.00%"));
        assert!(output.contains("Decision: [SELECT]"));
    }

    #[test]
    fn test_console_similarity_lists_sorted_keywords() {
        let output = ConsoleFormatter::new(false).format_report(&similarity_report()).unwrap();
        assert!(output.contains("Keyword coverage: 66.67%"));
        assert!(output.contains("Matched keywords (2): distributed, systems"));
    }

    #[test]
    fn test_markdown_uses_configured_labels() {
        let output = MarkdownFormatter::new(false)
            .format_report(&classifier_report(Decision::Reject, DecisionLabels::MatchNoMatch))
            .unwrap();
        assert!(output.contains("| Decision | **NO MATCH** |"));
        assert!(!output.contains("**Generated:**"));
    }

    #[test]
    fn test_json_is_parseable() {
        let output = JsonFormatter::new(true).format_report(&similarity_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["response"]["success"], true);
        assert_eq!(value["response"]["result"]["strategy"], "similarity");
        assert_eq!(value["response"]["result"]["coverage_score"], 66.67);
        assert_eq!(value["metadata"]["strategy"], "similarity");
    }

    #[test]
    fn test_failed_response_rendering() {
        let failure = ScoreResponse::from_error(&ResumeScorerError::Validation("no resume".into()));
        let report = ScoreReport::new(
            failure,
            ReportMetadata::new("-", "-", ScoringStrategy::Classifier, DecisionLabels::SelectReject, 0),
        );

        let output = ReportGenerator::with_options(false, true, true)
            .generate_report(&report, OutputFormat::Console)
            .unwrap();
        assert!(output.contains("Scoring failed: Invalid request: no resume"));

        let json = ReportGenerator::default()
            .generate_report(&report, OutputFormat::Json)
            .unwrap();
        assert!(json.contains("\"error_kind\": \"validation\""));
    }

    #[test]
    fn test_save_and_suggest_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("out.md");
        save_report_to_file("# report", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# report");

        assert_eq!(suggest_filename(OutputFormat::Json, "cv/jane.pdf", false), "jane_score.json");
    }

    #[test]
    fn test_report_path_in_directory() {
        let dir = tempfile::tempdir().unwrap();

        let file = dir.path().join("out.json");
        assert_eq!(report_path(&file, OutputFormat::Json, "jane.pdf"), file);

        let suggested = report_path(dir.path(), OutputFormat::Markdown, "cv/jane.pdf");
        assert_eq!(suggested.parent(), Some(dir.path()));
        let name = suggested.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("jane_score_"));
        assert!(name.ends_with(".md"));
    }
}
