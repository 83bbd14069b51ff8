//! Fixed-length integer encoding of token sequences

use crate::processing::document::DocumentRole;
use crate::processing::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Input width of the trained classifier's resume branch
pub const RESUME_MAX_LEN: usize = 360;
/// Input width of the trained classifier's job-description branch
pub const JOB_MAX_LEN: usize = 462;

pub const PADDING_INDEX: u32 = 0;

/// Vocabulary indices, always exactly the configured length for its role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedVector(Vec<u32>);

impl EncodedVector {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of non-padding positions
    pub fn content_len(&self) -> usize {
        self.0.iter().filter(|&&i| i != PADDING_INDEX).count()
    }
}

/// Pre-padding and pre-truncation: short sequences get zeros in front, long ones
/// lose their earliest entries. The head of a long resume is dropped on purpose
/// to match the shape the classifier was trained on.
pub fn pad_sequence(sequence: &[u32], max_len: usize) -> EncodedVector {
    if sequence.len() >= max_len {
        return EncodedVector(sequence[sequence.len() - max_len..].to_vec());
    }

    let mut padded = vec![PADDING_INDEX; max_len - sequence.len()];
    padded.extend_from_slice(sequence);
    EncodedVector(padded)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceLengths {
    pub resume: usize,
    pub job_description: usize,
}

impl Default for SequenceLengths {
    fn default() -> Self {
        Self {
            resume: RESUME_MAX_LEN,
            job_description: JOB_MAX_LEN,
        }
    }
}

impl SequenceLengths {
    pub fn for_role(&self, role: DocumentRole) -> usize {
        match role {
            DocumentRole::Resume => self.resume,
            DocumentRole::JobDescription => self.job_description,
        }
    }
}

pub struct SequenceEncoder {
    vocabulary: Arc<Vocabulary>,
    lengths: SequenceLengths,
}

impl SequenceEncoder {
    pub fn new(vocabulary: Arc<Vocabulary>, lengths: SequenceLengths) -> Self {
        Self { vocabulary, lengths }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn lengths(&self) -> SequenceLengths {
        self.lengths
    }

    pub fn encode(&self, text: &str, max_len: usize) -> EncodedVector {
        let sequence = self.vocabulary.text_to_sequence(text);
        pad_sequence(&sequence, max_len)
    }

    pub fn encode_for_role(&self, text: &str, role: DocumentRole) -> EncodedVector {
        self.encode(text, self.lengths.for_role(role))
    }
}
