//! Pretrained two-input match classifier

use crate::error::{Result, ResumeScorerError};
use crate::processing::encoder::{EncodedVector, SequenceLengths, PADDING_INDEX};
use crate::scoring::device::get_device_with_override;
use candle_core::{DType, Device, Tensor};
use candle_nn::rnn::{lstm, LSTMConfig, LSTM, RNN};
use candle_nn::{embedding, linear, Embedding, Linear, Module, VarBuilder};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `(resume, job) -> probability in [0, 1]`. Implementations must be safe for
/// concurrent read-only inference.
pub trait MatchClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Vector widths the classifier was trained with
    fn input_lengths(&self) -> SequenceLengths;

    fn predict(&self, resume: &EncodedVector, job: &EncodedVector) -> Result<f32>;
}

/// Reject vectors whose width differs from the trained input shape
pub fn check_input_lengths(
    expected: SequenceLengths,
    resume: &EncodedVector,
    job: &EncodedVector,
) -> Result<()> {
    if resume.len() != expected.resume || job.len() != expected.job_description {
        return Err(ResumeScorerError::Inference(format!(
            "classifier expects inputs of length ({}, {}), got ({}, {})",
            expected.resume,
            expected.job_description,
            resume.len(),
            job.len()
        )));
    }
    Ok(())
}

/// A probability outside [0, 1] (or NaN) means the model output is unusable
pub fn check_probability(probability: f32) -> Result<f32> {
    if probability.is_finite() && (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(ResumeScorerError::Inference(format!(
            "classifier returned an invalid probability: {}",
            probability
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    Lstm,
    MeanPool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub hidden_size: usize,
    pub dense_size: usize,
    pub tower: TowerKind,
    #[serde(default = "default_resume_len")]
    pub resume_len: usize,
    #[serde(default = "default_job_len")]
    pub job_len: usize,
}

fn default_resume_len() -> usize {
    crate::processing::encoder::RESUME_MAX_LEN
}

fn default_job_len() -> usize {
    crate::processing::encoder::JOB_MAX_LEN
}

impl ClassifierConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResumeScorerError::ResourceLoad(format!(
                "Failed to read classifier config '{}': {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ResumeScorerError::ResourceLoad(format!(
                "Failed to parse classifier config '{}': {}",
                path.display(),
                e
            ))
        })
    }

    fn tower_width(&self) -> usize {
        match self.tower {
            TowerKind::Lstm => self.hidden_size,
            TowerKind::MeanPool => self.embedding_dim,
        }
    }
}

/// One input branch: embedding followed by an LSTM or masked mean pooling
struct Tower {
    embedding: Embedding,
    lstm: Option<LSTM>,
}

impl Tower {
    fn load(config: &ClassifierConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        let embedding = embedding(config.vocab_size, config.embedding_dim, vb.pp("embedding"))?;
        let lstm = match config.tower {
            TowerKind::Lstm => Some(lstm(
                config.embedding_dim,
                config.hidden_size,
                LSTMConfig::default(),
                vb.pp("lstm"),
            )?),
            TowerKind::MeanPool => None,
        };
        Ok(Self { embedding, lstm })
    }

    fn forward(&self, ids: &Tensor) -> candle_core::Result<Tensor> {
        let embedded = self.embedding.forward(ids)?;

        match &self.lstm {
            Some(lstm) => {
                let states = lstm.seq(&embedded)?;
                match states.last() {
                    Some(state) => Ok(state.h().clone()),
                    None => candle_core::bail!("empty input sequence"),
                }
            }
            None => {
                let mask = ids.ne(PADDING_INDEX)?.to_dtype(DType::F32)?.unsqueeze(2)?;
                let summed = embedded.broadcast_mul(&mask)?.sum(1)?;
                let counts = mask.sum(1)?.maximum(1f32)?;
                summed.broadcast_div(&counts)
            }
        }
    }
}

pub struct CandleMatchClassifier {
    resume_tower: Tower,
    job_tower: Tower,
    dense: Linear,
    output: Linear,
    config: ClassifierConfig,
    device: Device,
}

impl CandleMatchClassifier {
    pub fn load(vb: VarBuilder, config: ClassifierConfig, device: Device) -> Result<Self> {
        let build = || -> candle_core::Result<Self> {
            let resume_tower = Tower::load(&config, vb.pp("resume_tower"))?;
            let job_tower = Tower::load(&config, vb.pp("job_tower"))?;
            let dense = linear(config.tower_width() * 2, config.dense_size, vb.pp("dense"))?;
            let output = linear(config.dense_size, 1, vb.pp("output"))?;
            Ok(Self {
                resume_tower,
                job_tower,
                dense,
                output,
                config: config.clone(),
                device: device.clone(),
            })
        };

        build().map_err(|e| ResumeScorerError::ResourceLoad(format!("Failed to build classifier: {}", e)))
    }

    /// Load safetensors weights plus the JSON architecture description
    pub fn from_files(weights_path: &Path, config_path: &Path) -> Result<Self> {
        let config = ClassifierConfig::from_file(config_path)?;
        let device = get_device_with_override()?;

        info!("Loading classifier weights from {}", weights_path.display());
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device).map_err(|e| {
                ResumeScorerError::ResourceLoad(format!(
                    "Failed to load classifier weights '{}': {}",
                    weights_path.display(),
                    e
                ))
            })?
        };

        Self::load(vb, config, device)
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    fn to_input(&self, vector: &EncodedVector) -> Result<Tensor> {
        Ok(Tensor::from_slice(vector.as_slice(), (1, vector.len()), &self.device)?)
    }
}

impl MatchClassifier for CandleMatchClassifier {
    fn name(&self) -> &str {
        match self.config.tower {
            TowerKind::Lstm => "candle-lstm",
            TowerKind::MeanPool => "candle-mean-pool",
        }
    }

    fn input_lengths(&self) -> SequenceLengths {
        SequenceLengths {
            resume: self.config.resume_len,
            job_description: self.config.job_len,
        }
    }

    fn predict(&self, resume: &EncodedVector, job: &EncodedVector) -> Result<f32> {
        check_input_lengths(self.input_lengths(), resume, job)?;

        let resume_ids = self.to_input(resume)?;
        let job_ids = self.to_input(job)?;

        let resume_features = self.resume_tower.forward(&resume_ids)?;
        let job_features = self.job_tower.forward(&job_ids)?;

        let joined = Tensor::cat(&[&resume_features, &job_features], 1)?;
        let hidden = self.dense.forward(&joined)?.relu()?;
        let logits = self.output.forward(&hidden)?;
        let probabilities = candle_nn::ops::sigmoid(&logits)?.flatten_all()?.to_vec1::<f32>()?;

        let probability = probabilities.first().copied().ok_or_else(|| {
            ResumeScorerError::Inference("classifier produced no output".to_string())
        })?;
        debug!("Classifier probability: {:.4}", probability);

        check_probability(probability)
    }
}
