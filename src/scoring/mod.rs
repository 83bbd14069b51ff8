//! Classifier and similarity scoring

pub mod classifier;
pub mod decision;
pub mod device;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod scorer;
pub mod similarity;
pub mod types;

pub use classifier::{CandleMatchClassifier, ClassifierConfig, MatchClassifier, TowerKind};
pub use scorer::{ClassifierScorer, Scorer, SimilarityScorer};
pub use similarity::{SimilarityBackend, SimilarityOracle, StaticModelOracle, WordVectors};
pub use types::{Decision, DecisionLabels, ScoreResult, ScoringStrategy};
