//! Configuration management for the resume scorer

use crate::error::{Result, ResumeScorerError};
use crate::processing::encoder::{SequenceLengths, JOB_MAX_LEN, RESUME_MAX_LEN};
use crate::processing::trimmer::DEFAULT_SECTION_KEYWORD;
use crate::scoring::decision::DEFAULT_DECISION_THRESHOLD;
use crate::scoring::scorer::DEFAULT_SIMILARITY_THRESHOLD;
use crate::scoring::similarity::SimilarityBackend;
use crate::scoring::types::{DecisionLabels, ScoringStrategy};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CLASSIFIER_ENV_VAR: &str = "RESUME_SCORER_CLASSIFIER";
pub const VOCABULARY_ENV_VAR: &str = "RESUME_SCORER_VOCABULARY";
pub const SIMILARITY_MODEL_ENV_VAR: &str = "RESUME_SCORER_SIMILARITY_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub artifacts: ArtifactConfig,
    pub encoding: EncodingConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

/// Pretrained resources. Relative paths resolve against `artifacts_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub artifacts_dir: PathBuf,
    pub vocabulary: PathBuf,
    pub classifier_weights: PathBuf,
    pub classifier_config: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma_lookup: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_words: Option<PathBuf>,
    pub similarity_model: PathBuf,
    #[serde(default)]
    pub similarity_backend: SimilarityBackend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingConfig {
    pub resume_max_len: usize,
    pub job_max_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub default_strategy: ScoringStrategy,
    pub decision_threshold: f32,
    pub similarity_threshold: f32,
    pub section_keyword: String,
    #[serde(default)]
    pub decision_labels: DecisionLabels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!(
                "Invalid output format: {}. Supported: console, json, markdown",
                s
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let artifacts_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-scorer")
            .join("artifacts");

        Self {
            artifacts: ArtifactConfig {
                artifacts_dir,
                vocabulary: PathBuf::from("tokenizer.json"),
                classifier_weights: PathBuf::from("classifier.safetensors"),
                classifier_config: PathBuf::from("classifier.json"),
                lemma_lookup: None,
                stop_words: None,
                similarity_model: PathBuf::from("word_vectors.txt"),
                similarity_backend: SimilarityBackend::WordVectors,
            },
            encoding: EncodingConfig {
                resume_max_len: RESUME_MAX_LEN,
                job_max_len: JOB_MAX_LEN,
            },
            scoring: ScoringConfig {
                default_strategy: ScoringStrategy::Classifier,
                decision_threshold: DEFAULT_DECISION_THRESHOLD,
                similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
                section_keyword: DEFAULT_SECTION_KEYWORD.to_string(),
                decision_labels: DecisionLabels::SelectReject,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from `path` (or the default location), apply environment overrides, validate.
    /// A missing file yields the defaults, which are written out.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        let mut config = if config_path.exists() {
            debug!("Reading configuration from {}", config_path.display());
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)
                .map_err(|e| ResumeScorerError::Configuration(format!("Failed to parse config: {}", e)))?
        } else {
            info!("No configuration at {}, writing defaults", config_path.display());
            let config = Self::default();
            config.save_to(&config_path)?;
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResumeScorerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-scorer")
            .join("config.toml")
    }

    /// Deployment-time artifact paths from the environment
    pub fn apply_env_overrides(&mut self) {
        let overrides = [
            (CLASSIFIER_ENV_VAR, &mut self.artifacts.classifier_weights),
            (VOCABULARY_ENV_VAR, &mut self.artifacts.vocabulary),
            (SIMILARITY_MODEL_ENV_VAR, &mut self.artifacts.similarity_model),
        ];

        for (var, target) in overrides {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    debug!("{} overrides artifact path with {}", var, value);
                    *target = PathBuf::from(value);
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.encoding.resume_max_len == 0 || self.encoding.job_max_len == 0 {
            return Err(ResumeScorerError::Configuration(
                "encoding max lengths must be greater than zero".to_string(),
            ));
        }

        for (name, value) in [
            ("decision_threshold", self.scoring.decision_threshold),
            ("similarity_threshold", self.scoring.similarity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ResumeScorerError::Configuration(format!(
                    "scoring.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.scoring.section_keyword.trim().is_empty() {
            return Err(ResumeScorerError::Configuration(
                "scoring.section_keyword must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.artifacts.artifacts_dir.join(path)
        }
    }

    pub fn vocabulary_path(&self) -> PathBuf {
        self.resolve(&self.artifacts.vocabulary)
    }

    pub fn classifier_weights_path(&self) -> PathBuf {
        self.resolve(&self.artifacts.classifier_weights)
    }

    pub fn classifier_config_path(&self) -> PathBuf {
        self.resolve(&self.artifacts.classifier_config)
    }

    pub fn lemma_lookup_path(&self) -> Option<PathBuf> {
        self.artifacts.lemma_lookup.as_deref().map(|p| self.resolve(p))
    }

    pub fn stop_words_path(&self) -> Option<PathBuf> {
        self.artifacts.stop_words.as_deref().map(|p| self.resolve(p))
    }

    /// Local paths resolve against the artifacts dir; a missing relative path may be a hub repo id
    pub fn similarity_model_path(&self) -> PathBuf {
        let resolved = self.resolve(&self.artifacts.similarity_model);
        if resolved.exists() || self.artifacts.similarity_backend == SimilarityBackend::WordVectors {
            resolved
        } else {
            self.artifacts.similarity_model.clone()
        }
    }

    pub fn sequence_lengths(&self) -> SequenceLengths {
        SequenceLengths {
            resume: self.encoding.resume_max_len,
            job_description: self.encoding.job_max_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sequence_lengths(), SequenceLengths::default());
        assert_eq!(config.scoring.section_keyword, "objective");
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = Config::default();
        config.encoding.resume_max_len = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scoring.similarity_threshold = 1.2;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scoring.section_keyword = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.encoding.job_max_len, JOB_MAX_LEN);
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.scoring.default_strategy = ScoringStrategy::Similarity;
        config.scoring.decision_labels = DecisionLabels::MatchNoMatch;
        config.artifacts.similarity_backend = SimilarityBackend::StaticModel;
        config.artifacts.lemma_lookup = Some(PathBuf::from("lemmas.json"));
        config.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Config = toml::from_str(&content).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_relative_paths_resolve_against_artifacts_dir() {
        let mut config = Config::default();
        config.artifacts.artifacts_dir = PathBuf::from("/opt/models");
        config.artifacts.classifier_weights = PathBuf::from("/abs/model.safetensors");

        assert_eq!(config.vocabulary_path(), PathBuf::from("/opt/models/tokenizer.json"));
        assert_eq!(config.classifier_weights_path(), PathBuf::from("/abs/model.safetensors"));
        assert_eq!(config.lemma_lookup_path(), None);
    }

    #[test]
    fn test_hub_id_kept_for_static_model() {
        let mut config = Config::default();
        config.artifacts.artifacts_dir = PathBuf::from("/nonexistent");
        config.artifacts.similarity_backend = SimilarityBackend::StaticModel;
        config.artifacts.similarity_model = PathBuf::from("minishlab/potion-base-8M");

        assert_eq!(
            config.similarity_model_path(),
            PathBuf::from("minishlab/potion-base-8M")
        );
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "artifacts = 3").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ResumeScorerError::Configuration(_))
        ));
    }
}
