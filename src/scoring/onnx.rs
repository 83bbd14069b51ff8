//! Two-input classifier graphs converted to ONNX

use crate::error::{Result, ResumeScorerError};
use crate::processing::encoder::{EncodedVector, SequenceLengths};
use crate::scoring::classifier::{check_input_lengths, check_probability, MatchClassifier};
use candle_core::{DType, Device, Tensor};
use candle_onnx::onnx::{type_proto, ModelProto};
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

/// ONNX `TensorProto.DataType.FLOAT`
const ONNX_FLOAT: i32 = 1;

struct GraphInput {
    name: String,
    dtype: DType,
}

pub struct OnnxMatchClassifier {
    model: ModelProto,
    resume_input: GraphInput,
    job_input: GraphInput,
    output_name: String,
    lengths: SequenceLengths,
}

impl OnnxMatchClassifier {
    /// Inputs are bound in declaration order: resume first, job description second
    pub fn load(path: &Path, lengths: SequenceLengths) -> Result<Self> {
        info!("Loading ONNX classifier from {}", path.display());
        let model = candle_onnx::read_file(path).map_err(|e| {
            ResumeScorerError::ResourceLoad(format!(
                "Failed to read ONNX model '{}': {}",
                path.display(),
                e
            ))
        })?;

        let graph = model
            .graph
            .as_ref()
            .ok_or_else(|| ResumeScorerError::ResourceLoad("ONNX model has no graph".to_string()))?;

        let initializers: Vec<&str> = graph.initializer.iter().map(|t| t.name.as_str()).collect();
        let mut inputs = graph
            .input
            .iter()
            .filter(|input| !initializers.contains(&input.name.as_str()))
            .map(|input| {
                let elem_type = match input.r#type.as_ref().and_then(|t| t.value.as_ref()) {
                    Some(type_proto::Value::TensorType(tensor)) => tensor.elem_type,
                    _ => ONNX_FLOAT,
                };
                GraphInput {
                    name: input.name.clone(),
                    dtype: if elem_type == ONNX_FLOAT { DType::F32 } else { DType::I64 },
                }
            });

        let (resume_input, job_input) = match (inputs.next(), inputs.next(), inputs.next()) {
            (Some(resume), Some(job), None) => (resume, job),
            _ => {
                return Err(ResumeScorerError::ResourceLoad(
                    "ONNX classifier must declare exactly two inputs".to_string(),
                ))
            }
        };

        let output_name = graph
            .output
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ResumeScorerError::ResourceLoad("ONNX model has no outputs".to_string()))?;

        debug!(
            "ONNX inputs: {} ({:?}), {} ({:?}); output {}",
            resume_input.name, resume_input.dtype, job_input.name, job_input.dtype, output_name
        );

        Ok(Self {
            model,
            resume_input,
            job_input,
            output_name,
            lengths,
        })
    }

    fn to_input(input: &GraphInput, vector: &EncodedVector) -> Result<Tensor> {
        let tensor = Tensor::from_slice(vector.as_slice(), (1, vector.len()), &Device::Cpu)?;
        Ok(tensor.to_dtype(input.dtype)?)
    }
}

impl MatchClassifier for OnnxMatchClassifier {
    fn name(&self) -> &str {
        "onnx"
    }

    fn input_lengths(&self) -> SequenceLengths {
        self.lengths
    }

    fn predict(&self, resume: &EncodedVector, job: &EncodedVector) -> Result<f32> {
        check_input_lengths(self.lengths, resume, job)?;

        let mut inputs = HashMap::new();
        inputs.insert(
            self.resume_input.name.clone(),
            Self::to_input(&self.resume_input, resume)?,
        );
        inputs.insert(
            self.job_input.name.clone(),
            Self::to_input(&self.job_input, job)?,
        );

        let outputs = candle_onnx::simple_eval(&self.model, inputs)?;
        let output = outputs.get(&self.output_name).ok_or_else(|| {
            ResumeScorerError::Inference(format!("ONNX output '{}' missing", self.output_name))
        })?;

        let values = output.to_dtype(DType::F32)?.flatten_all()?.to_vec1::<f32>()?;
        let probability = values
            .first()
            .copied()
            .ok_or_else(|| ResumeScorerError::Inference("ONNX model produced no output".to_string()))?;

        check_probability(probability)
    }
}
