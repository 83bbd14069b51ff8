//! Linguistic model used by the normalizer: lemma lookup plus stop words

use crate::error::{Result, ResumeScorerError};
use log::info;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub trait LanguageModel: Send + Sync {
    fn lemmatize<'a>(&self, word: &'a str) -> Cow<'a, str>;
    fn is_stop_word(&self, word: &str) -> bool;
    /// False when lemmatize is the identity for every word
    fn lemmatizes(&self) -> bool;
}

/// Lookup-table lemmatizer. Words missing from the table lemmatize to themselves.
#[derive(Debug, Clone)]
pub struct LexiconModel {
    lemmas: HashMap<String, String>,
    stop_words: HashSet<String>,
}

impl Default for LexiconModel {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LexiconModel {
    pub fn new(lemmas: HashMap<String, String>, stop_words: HashSet<String>) -> Self {
        Self { lemmas, stop_words }
    }

    /// English stop words, no lemma table
    pub fn builtin() -> Self {
        Self {
            lemmas: HashMap::new(),
            stop_words: Self::default_stop_words(),
        }
    }

    /// Load a `{ "word": "lemma" }` table and an optional newline-delimited stop word list
    pub fn from_files(lemma_lookup: Option<&Path>, stop_words: Option<&Path>) -> Result<Self> {
        let lemmas = match lemma_lookup {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    ResumeScorerError::ResourceLoad(format!(
                        "Failed to read lemma table '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                let table: HashMap<String, String> = serde_json::from_str(&content).map_err(|e| {
                    ResumeScorerError::ResourceLoad(format!(
                        "Failed to parse lemma table '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                info!("Loaded {} lemma entries from {}", table.len(), path.display());
                table
                    .into_iter()
                    .map(|(word, lemma)| (word.to_lowercase(), lemma.to_lowercase()))
                    .collect()
            }
            None => HashMap::new(),
        };

        let stop_words = match stop_words {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    ResumeScorerError::ResourceLoad(format!(
                        "Failed to read stop words '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                content
                    .lines()
                    .map(|line| line.trim().to_lowercase())
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .collect()
            }
            None => Self::default_stop_words(),
        };

        Ok(Self { lemmas, stop_words })
    }

    pub fn lemma_count(&self) -> usize {
        self.lemmas.len()
    }

    pub fn stop_word_count(&self) -> usize {
        self.stop_words.len()
    }

    fn default_stop_words() -> HashSet<String> {
        let stop_words = [
            "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
            "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
            "amongst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything",
            "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became", "because",
            "become", "becomes", "becoming", "been", "before", "beforehand", "behind", "being",
            "below", "beside", "besides", "between", "beyond", "both", "bottom", "but", "by",
            "ca", "call", "can", "cannot", "could", "did", "do", "does", "doing", "done", "down",
            "due", "during", "each", "eight", "either", "eleven", "else", "elsewhere", "empty",
            "enough", "even", "ever", "every", "everyone", "everything", "everywhere", "except",
            "few", "fifteen", "fifty", "first", "five", "for", "former", "formerly", "forty",
            "four", "from", "front", "full", "further", "get", "give", "go", "had", "has", "have",
            "he", "hence", "her", "here", "hereafter", "hereby", "herein", "hereupon", "hers",
            "herself", "him", "himself", "his", "how", "however", "hundred", "i", "if", "in",
            "indeed", "into", "is", "it", "its", "itself", "just", "keep", "last", "latter",
            "latterly", "least", "less", "made", "make", "many", "may", "me", "meanwhile",
            "might", "mine", "more", "moreover", "most", "mostly", "move", "much", "must", "my",
            "myself", "name", "namely", "neither", "never", "nevertheless", "next", "nine", "no",
            "nobody", "none", "noone", "nor", "not", "nothing", "now", "nowhere", "of", "off",
            "often", "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise",
            "our", "ours", "ourselves", "out", "over", "own", "part", "per", "perhaps", "please",
            "put", "quite", "rather", "re", "really", "regarding", "same", "say", "see", "seem",
            "seemed", "seeming", "seems", "serious", "several", "she", "should", "show", "side",
            "since", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
            "sometimes", "somewhere", "still", "such", "take", "ten", "than", "that", "the",
            "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
            "therefore", "therein", "thereupon", "these", "they", "third", "this", "those",
            "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
            "top", "toward", "towards", "twelve", "twenty", "two", "under", "unless", "until",
            "up", "upon", "us", "used", "using", "various", "very", "via", "was", "we", "well",
            "were", "what", "whatever", "when", "whence", "whenever", "where", "whereafter",
            "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while",
            "whither", "who", "whoever", "whole", "whom", "whose", "why", "will", "with",
            "within", "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
        ];

        stop_words.iter().map(|&s| s.to_string()).collect()
    }
}

impl LanguageModel for LexiconModel {
    fn lemmatize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        match self.lemmas.get(word) {
            Some(lemma) => Cow::Owned(lemma.clone()),
            None => Cow::Borrowed(word),
        }
    }

    fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    fn lemmatizes(&self) -> bool {
        !self.lemmas.is_empty()
    }
}
