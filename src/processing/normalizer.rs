//! Text normalization into canonical lemma tokens

use crate::processing::language_model::{LanguageModel, LexiconModel};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

/// Ordered normalized words. Order matters for trimming and padding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSequence(Vec<String>);

impl TokenSequence {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Tokens rejoined with single spaces
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for TokenSequence {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl From<&[String]> for TokenSequence {
    fn from(tokens: &[String]) -> Self {
        Self(tokens.to_vec())
    }
}

pub struct Normalizer {
    model: Arc<dyn LanguageModel>,
    non_alpha_regex: Regex,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(LexiconModel::builtin()))
    }
}

impl Normalizer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        let non_alpha_regex = Regex::new(r"[^a-zA-Z\s]").expect("Invalid non-alphabetic regex");

        Self {
            model,
            non_alpha_regex,
        }
    }

    /// Lowercase, strip everything but ASCII letters and whitespace, then lemmatize
    /// and drop stop words. Stripping happens before tokenization, so "full-stack"
    /// becomes the single token "fullstack".
    pub fn normalize(&self, text: &str) -> TokenSequence {
        let cleaned = self.clean_text(text);

        let tokens = cleaned
            .unicode_words()
            .filter(|word| !self.is_punctuation(word))
            .filter(|word| !self.model.is_stop_word(word))
            .map(|word| self.model.lemmatize(word).into_owned())
            .filter(|lemma| !lemma.is_empty())
            .collect();

        TokenSequence(tokens)
    }

    /// Whether the linguistic model maps words to lemmas
    pub fn lemmatizes(&self) -> bool {
        self.model.lemmatizes()
    }

    /// Steps 1-3: lowercase, remove non-letters, flatten newlines and trim
    pub fn clean_text(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let letters_only = self.non_alpha_regex.replace_all(&lowered, "");
        letters_only.replace('\n', " ").trim().to_string()
    }

    fn is_punctuation(&self, word: &str) -> bool {
        !word.chars().any(|c| c.is_alphabetic())
    }
}
