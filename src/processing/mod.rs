//! Text normalization, trimming and sequence encoding

pub mod document;
pub mod encoder;
pub mod language_model;
pub mod normalizer;
pub mod trimmer;
pub mod vocabulary;

pub use document::{Document, DocumentRole};
pub use encoder::{EncodedVector, SequenceEncoder, SequenceLengths};
pub use normalizer::{Normalizer, TokenSequence};
pub use trimmer::SectionTrimmer;
pub use vocabulary::Vocabulary;
