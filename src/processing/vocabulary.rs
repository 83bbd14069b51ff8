//! Fitted word index used by the sequence encoder

use crate::error::{Result, ResumeScorerError};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tokenizers::Tokenizer;

/// Keras' default `Tokenizer` filters
pub const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// What happens to a word the vocabulary does not know
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OovPolicy {
    Drop,
    Sentinel(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabularyFormat {
    Keras,
    WordIndex,
    HuggingFace,
}

/// Immutable word -> index map. Index 0 is reserved for padding.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    word_index: HashMap<String, u32>,
    oov: OovPolicy,
    num_words: Option<u32>,
    lower: bool,
    filters: String,
    split: String,
}

impl Vocabulary {
    pub fn new(word_index: HashMap<String, u32>, oov: OovPolicy) -> Self {
        Self {
            word_index,
            oov,
            num_words: None,
            lower: true,
            filters: DEFAULT_FILTERS.to_string(),
            split: " ".to_string(),
        }
    }

    pub fn with_num_words(mut self, num_words: Option<u32>) -> Self {
        self.num_words = num_words.filter(|&n| n > 0);
        self
    }

    pub fn with_lowercase(mut self, lower: bool) -> Self {
        self.lower = lower;
        self
    }

    pub fn lowercases(&self) -> bool {
        self.lower
    }

    /// Load a Keras tokenizer JSON, a plain `{word: index}` map, or a HF WordLevel `tokenizer.json`
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResumeScorerError::ResourceLoad(format!(
                "Failed to read vocabulary '{}': {}",
                path.display(),
                e
            ))
        })?;
        let json: Value = serde_json::from_str(&content).map_err(|e| {
            ResumeScorerError::ResourceLoad(format!(
                "Failed to parse vocabulary '{}': {}",
                path.display(),
                e
            ))
        })?;

        let vocabulary = match Self::detect_format(&json) {
            VocabularyFormat::Keras => Self::from_keras_json(&json)?,
            VocabularyFormat::WordIndex => Self::from_word_index_json(&json)?,
            VocabularyFormat::HuggingFace => Self::from_tokenizer_file(path)?,
        };

        info!(
            "Loaded vocabulary with {} words from {} (oov policy: {:?})",
            vocabulary.len(),
            path.display(),
            vocabulary.oov_policy()
        );
        Ok(vocabulary)
    }

    pub fn detect_format(json: &Value) -> VocabularyFormat {
        if json.get("class_name").and_then(Value::as_str) == Some("Tokenizer")
            || json.get("config").and_then(|c| c.get("word_index")).is_some()
        {
            VocabularyFormat::Keras
        } else if json.get("model").is_some() {
            VocabularyFormat::HuggingFace
        } else {
            VocabularyFormat::WordIndex
        }
    }

    pub fn from_keras_json(json: &Value) -> Result<Self> {
        let config = json
            .get("config")
            .ok_or_else(|| ResumeScorerError::ResourceLoad("Keras tokenizer has no config".to_string()))?;

        // Keras stores word_index as a JSON-encoded string
        let word_index_value = match config.get("word_index") {
            Some(Value::String(encoded)) => serde_json::from_str(encoded).map_err(|e| {
                ResumeScorerError::ResourceLoad(format!("Malformed Keras word_index: {}", e))
            })?,
            Some(other) => other.clone(),
            None => {
                return Err(ResumeScorerError::ResourceLoad(
                    "Keras tokenizer has no word_index".to_string(),
                ))
            }
        };
        let word_index = Self::parse_word_index(&word_index_value)?;

        let oov = match config.get("oov_token").and_then(Value::as_str) {
            Some(token) => match word_index.get(token) {
                Some(&index) => OovPolicy::Sentinel(index),
                None => {
                    warn!("oov_token '{}' is not in the word index, unknown words are dropped", token);
                    OovPolicy::Drop
                }
            },
            None => OovPolicy::Drop,
        };

        // 0 and null both mean no limit
        let num_words = config
            .get("num_words")
            .and_then(Value::as_u64)
            .filter(|&n| n > 0)
            .map(|n| n as u32);
        let lower = config.get("lower").and_then(Value::as_bool).unwrap_or(true);
        let filters = config
            .get("filters")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_FILTERS)
            .to_string();
        let split = config
            .get("split")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(" ")
            .to_string();

        Ok(Self {
            word_index,
            oov,
            num_words,
            lower,
            filters,
            split,
        })
    }

    pub fn from_word_index_json(json: &Value) -> Result<Self> {
        let word_index = Self::parse_word_index(json)?;
        Ok(Self::new(word_index, OovPolicy::Drop))
    }

    /// HF WordLevel tokenizer: the vocab becomes the word index, `unk_token` the sentinel,
    /// and case folding follows the tokenizer's own normalizer
    pub fn from_tokenizer_file(path: &Path) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            ResumeScorerError::ResourceLoad(format!("Failed to load tokenizer '{}': {}", path.display(), e))
        })?;

        let spec_json = tokenizer
            .to_string(false)
            .map_err(|e| ResumeScorerError::ResourceLoad(format!("tokenizer -> JSON failed: {}", e)))?;
        let spec: Value = serde_json::from_str(&spec_json)?;
        let model_type = spec
            .get("model")
            .and_then(|m| m.get("type"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        if model_type != "WordLevel" {
            return Err(ResumeScorerError::ResourceLoad(format!(
                "Only WordLevel tokenizers can serve as a vocabulary, got {}",
                model_type
            )));
        }

        let oov = spec
            .get("model")
            .and_then(|m| m.get("unk_token"))
            .and_then(Value::as_str)
            .and_then(|unk| tokenizer.token_to_id(unk))
            .map(OovPolicy::Sentinel)
            .unwrap_or(OovPolicy::Drop);

        let lower = spec
            .get("normalizer")
            .map(normalizer_lowercases)
            .unwrap_or(false);

        Ok(Self::new(tokenizer.get_vocab(false), oov).with_lowercase(lower))
    }

    fn parse_word_index(value: &Value) -> Result<HashMap<String, u32>> {
        let object = value.as_object().ok_or_else(|| {
            ResumeScorerError::ResourceLoad("word index must be a JSON object".to_string())
        })?;

        object
            .iter()
            .map(|(word, index)| {
                index
                    .as_u64()
                    .map(|i| (word.clone(), i as u32))
                    .ok_or_else(|| {
                        ResumeScorerError::ResourceLoad(format!(
                            "word index entry '{}' is not an unsigned integer",
                            word
                        ))
                    })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.word_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_index.is_empty()
    }

    pub fn oov_policy(&self) -> OovPolicy {
        self.oov
    }

    pub fn index_of(&self, word: &str) -> Option<u32> {
        self.word_index.get(word).copied()
    }

    /// Split the way the fitted tokenizer does: lowercase, filter characters become separators
    pub fn split_words(&self, text: &str) -> Vec<String> {
        let text = if self.lower {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let translated: String = text
            .chars()
            .map(|c| if self.filters.contains(c) { ' ' } else { c })
            .collect();

        if self.split == " " {
            translated.split(' ').filter(|w| !w.is_empty()).map(str::to_string).collect()
        } else {
            translated
                .replace(' ', &self.split)
                .split(self.split.as_str())
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect()
        }
    }

    /// Variable-length index sequence for a text
    pub fn text_to_sequence(&self, text: &str) -> Vec<u32> {
        let words = self.split_words(text);
        let mut sequence = Vec::with_capacity(words.len());

        for word in &words {
            match self.word_index.get(word) {
                Some(&index) => match self.num_words {
                    Some(limit) if index >= limit => {
                        if let OovPolicy::Sentinel(oov) = self.oov {
                            sequence.push(oov);
                        }
                    }
                    _ => sequence.push(index),
                },
                None => {
                    if let OovPolicy::Sentinel(oov) = self.oov {
                        sequence.push(oov);
                    }
                }
            }
        }

        debug!("Mapped {} words to {} indices", words.len(), sequence.len());
        sequence
    }
}

/// Whether a serialized HF normalizer folds case
fn normalizer_lowercases(normalizer: &Value) -> bool {
    match normalizer.get("type").and_then(Value::as_str) {
        Some("Lowercase") => true,
        Some("BertNormalizer") => normalizer
            .get("lowercase")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        Some("Sequence") => normalizer
            .get("normalizers")
            .and_then(Value::as_array)
            .map(|parts| parts.iter().any(normalizer_lowercases))
            .unwrap_or(false),
        _ => false,
    }
}
