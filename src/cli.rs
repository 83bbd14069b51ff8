//! CLI interface for the resume scorer

use crate::config::OutputFormat;
use crate::processing::document::DocumentRole;
use crate::scoring::types::ScoringStrategy;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-scorer")]
#[command(about = "Score how well a resume matches a job description")]
#[command(
    long_about = "Score resume compatibility with a job description using a pretrained two-input classifier or word-similarity keyword matching"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a resume against a job description
    Score {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file (TXT, MD)
        #[arg(short, long, conflicts_with = "job_text", required_unless_present = "job_text")]
        job: Option<PathBuf>,

        /// Job description passed inline
        #[arg(long)]
        job_text: Option<String>,

        /// Scoring strategy: classifier, similarity (defaults to the configured one)
        #[arg(short = 'S', long)]
        strategy: Option<String>,

        /// Output format: console, json, markdown (defaults to the configured one)
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file, or into a directory under a generated name
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Load all artifacts and report which strategies are available
    Check,

    /// Show normalized tokens for a document
    Inspect {
        /// Path to the document (PDF, TXT, MD)
        #[arg(short, long)]
        input: PathBuf,

        /// Document role: resume, job-description
        #[arg(short, long, default_value = "resume")]
        role: String,

        /// Also print the encoded classifier input
        #[arg(short, long)]
        encode: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    format.parse()
}

pub fn parse_strategy(strategy: &str) -> Result<ScoringStrategy, String> {
    strategy.parse()
}

pub fn parse_role(role: &str) -> Result<DocumentRole, String> {
    role.parse()
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
