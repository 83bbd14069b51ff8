//! Word-level semantic similarity backends

use crate::error::{Result, ResumeScorerError};
use anyhow::Context;
use half::f16;
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use ndarray::{Array2, ArrayView1};
use safetensors::{tensor::Dtype, SafeTensors};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Immutable `(token, token) -> similarity in [-1, 1]`.
///
/// A token with no representation scores 0 against everything and is never an error.
pub trait SimilarityOracle: Send + Sync {
    fn name(&self) -> &str;

    fn similarity(&self, a: &str, b: &str) -> Result<f32>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityBackend {
    #[default]
    WordVectors,
    StaticModel,
}

impl std::str::FromStr for SimilarityBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "word_vectors" | "glove" => Ok(SimilarityBackend::WordVectors),
            "static_model" | "model2vec" => Ok(SimilarityBackend::StaticModel),
            _ => Err(format!(
                "Invalid similarity backend: {}. Supported: word_vectors, static_model",
                s
            )),
        }
    }
}

/// Load the oracle for a backend from a local path (or hub id for static models)
pub fn load_oracle(backend: SimilarityBackend, path: &Path) -> Result<Box<dyn SimilarityOracle>> {
    match backend {
        SimilarityBackend::WordVectors => Ok(Box::new(WordVectors::from_path(path)?)),
        SimilarityBackend::StaticModel => Ok(Box::new(StaticModelOracle::from_pretrained(path)?)),
    }
}

/// Calculate cosine similarity between two vectors; zero vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ResumeScorerError::Inference(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    Ok(cosine_from_parts(dot_product, norm_a, norm_b))
}

fn cosine_from_parts(dot_product: f32, norm_a: f32, norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

/// Word -> dense vector table (GloVe, word2vec text, or safetensors + vocab)
pub struct WordVectors {
    index: HashMap<String, usize>,
    vectors: Array2<f32>,
}

impl WordVectors {
    pub fn new(index: HashMap<String, usize>, vectors: Array2<f32>) -> Result<Self> {
        if let Some((word, &row)) = index.iter().find(|(_, &row)| row >= vectors.nrows()) {
            return Err(ResumeScorerError::ResourceLoad(format!(
                "word '{}' points at row {} but the table has {} rows",
                word,
                row,
                vectors.nrows()
            )));
        }
        Ok(Self { index, vectors })
    }

    /// A directory holding `embeddings.safetensors` (or `model.safetensors`) and
    /// `vocab.txt`, a `.safetensors` file with a sibling `vocab.txt`, or a text table.
    pub fn from_path(path: &Path) -> Result<Self> {
        let start_time = Instant::now();

        let vectors = if path.is_dir() {
            let weights = ["embeddings.safetensors", "model.safetensors"]
                .iter()
                .map(|name| path.join(name))
                .find(|candidate| candidate.exists())
                .ok_or_else(|| {
                    ResumeScorerError::ResourceLoad(format!(
                        "No embeddings safetensors found in {}",
                        path.display()
                    ))
                })?;
            Self::from_safetensors(&weights, &path.join("vocab.txt"))?
        } else if path.extension().and_then(|e| e.to_str()) == Some("safetensors") {
            let vocab = path
                .parent()
                .map(|dir| dir.join("vocab.txt"))
                .unwrap_or_else(|| PathBuf::from("vocab.txt"));
            Self::from_safetensors(path, &vocab)?
        } else {
            Self::from_text_file(path)?
        };

        info!(
            "Loaded {} word vectors (dim {}) from {} in {:.2?}",
            vectors.len(),
            vectors.dimension(),
            path.display(),
            start_time.elapsed()
        );
        Ok(vectors)
    }

    /// `word v1 v2 ...` per line. A leading word2vec `count dim` header is skipped.
    pub fn from_text_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResumeScorerError::ResourceLoad(format!(
                "Failed to read word vectors '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse_text(&content)
    }

    pub fn parse_text(content: &str) -> Result<Self> {
        let mut index = HashMap::new();
        let mut values = Vec::new();
        let mut dimension: Option<usize> = None;

        for (line_no, line) in content.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let word = match fields.next() {
                Some(word) => word,
                None => continue,
            };
            let rest: Vec<&str> = fields.collect();

            if line_no == 0
                && rest.len() == 1
                && word.parse::<usize>().is_ok()
                && rest[0].parse::<usize>().is_ok()
            {
                continue;
            }

            let vector = rest
                .iter()
                .map(|v| v.parse::<f32>())
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| {
                    ResumeScorerError::ResourceLoad(format!(
                        "Bad vector value on line {}: {}",
                        line_no + 1,
                        e
                    ))
                })?;

            match dimension {
                None => dimension = Some(vector.len()),
                Some(dim) if dim != vector.len() => {
                    return Err(ResumeScorerError::ResourceLoad(format!(
                        "Line {} has {} dimensions, expected {}",
                        line_no + 1,
                        vector.len(),
                        dim
                    )))
                }
                _ => {}
            }

            // First occurrence wins, later duplicates are ignored
            if !index.contains_key(word) {
                index.insert(word.to_string(), index.len());
                values.extend(vector);
            }
        }

        let dimension = dimension.unwrap_or(0);
        let vectors = Array2::from_shape_vec((index.len(), dimension), values)
            .map_err(|e| ResumeScorerError::ResourceLoad(format!("Failed to build vector table: {}", e)))?;
        Self::new(index, vectors)
    }

    /// 2-D embedding matrix plus newline-separated vocabulary (row `i` is line `i`)
    pub fn from_safetensors(weights_path: &Path, vocab_path: &Path) -> Result<Self> {
        let bytes = std::fs::read(weights_path).map_err(|e| {
            ResumeScorerError::ResourceLoad(format!(
                "Failed to read '{}': {}",
                weights_path.display(),
                e
            ))
        })?;
        let vectors = decode_embedding_matrix(&bytes)?;

        let vocab = std::fs::read_to_string(vocab_path).map_err(|e| {
            ResumeScorerError::ResourceLoad(format!(
                "Failed to read vocabulary '{}': {}",
                vocab_path.display(),
                e
            ))
        })?;
        let mut index = HashMap::new();
        for (row, word) in vocab.lines().map(str::trim).enumerate() {
            if !word.is_empty() {
                index.entry(word.to_string()).or_insert(row);
            }
        }

        Self::new(index, vectors)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn vector(&self, word: &str) -> Option<ArrayView1<'_, f32>> {
        self.index.get(word).map(|&row| self.vectors.row(row))
    }
}

impl SimilarityOracle for WordVectors {
    fn name(&self) -> &str {
        "word-vectors"
    }

    fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let (va, vb) = match (self.vector(a), self.vector(b)) {
            (Some(va), Some(vb)) => (va, vb),
            _ => return Ok(0.0),
        };

        let dot_product = va.dot(&vb);
        let norm_a = va.dot(&va).sqrt();
        let norm_b = vb.dot(&vb).sqrt();
        Ok(cosine_from_parts(dot_product, norm_a, norm_b))
    }
}

/// Decode the `embeddings` (or `0`, or only) tensor into f32 rows
fn decode_embedding_matrix(bytes: &[u8]) -> Result<Array2<f32>> {
    let safet = SafeTensors::deserialize(bytes)
        .map_err(|e| ResumeScorerError::ResourceLoad(format!("failed to parse safetensors: {}", e)))?;

    let names = safet.names();
    let name = ["embeddings", "0"]
        .iter()
        .find(|candidate| names.iter().any(|n| n.as_str() == **candidate))
        .map(|s| s.to_string())
        .or_else(|| match names.as_slice() {
            [only] => Some(only.to_string()),
            _ => None,
        })
        .ok_or_else(|| ResumeScorerError::ResourceLoad("embeddings tensor not found".to_string()))?;

    let tensor = safet
        .tensor(&name)
        .map_err(|e| ResumeScorerError::ResourceLoad(format!("failed to read tensor '{}': {}", name, e)))?;
    let (rows, cols) = match tensor.shape() {
        [rows, cols] => (*rows, *cols),
        other => {
            return Err(ResumeScorerError::ResourceLoad(format!(
                "embedding tensor is not 2-D: {:?}",
                other
            )))
        }
    };

    let raw = tensor.data();
    let floats: Vec<f32> = match tensor.dtype() {
        Dtype::F32 => raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        Dtype::F16 => raw
            .chunks_exact(2)
            .map(|b| f16::from_le_bytes([b[0], b[1]]).to_f32())
            .collect(),
        Dtype::I8 => raw.iter().map(|&b| f32::from(b as i8)).collect(),
        other => {
            return Err(ResumeScorerError::ResourceLoad(format!(
                "unsupported tensor dtype: {:?}",
                other
            )))
        }
    };

    debug!("Decoded {}x{} embedding matrix '{}'", rows, cols, name);
    Array2::from_shape_vec((rows, cols), floats)
        .map_err(|e| ResumeScorerError::ResourceLoad(format!("failed to build embeddings array: {}", e)))
}

/// Cosine similarity of model2vec static embeddings
pub struct StaticModelOracle {
    model: StaticModel,
    model_name: String,
}

impl StaticModelOracle {
    pub fn new(model: StaticModel, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }

    /// Local model directory or Hugging Face repo id
    pub fn from_pretrained(path: &Path) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec similarity model from: {}", path.display());

        let model = StaticModel::from_pretrained(
            path,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .with_context(|| format!("Failed to load model2vec model '{}'", path.display()))?;

        info!("Model loaded successfully in {:.2?}", start_time.elapsed());
        Ok(Self::new(model, path.display().to_string()))
    }
}

impl SimilarityOracle for StaticModelOracle {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let va = self.model.encode_single(a);
        let vb = self.model.encode_single(b);
        cosine_similarity(&va, &vb)
    }
}
