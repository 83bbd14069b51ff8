//! Resume scorer library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod scoring;

pub use config::Config;
pub use error::{Result, ResumeScorerError};
pub use pipeline::{InferenceContext, MatchPipeline, ScoreRequest, ScoreResponse};
