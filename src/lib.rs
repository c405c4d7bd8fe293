#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Pipeline configuration loaded from the environment.
pub mod config;
/// Progressive review record schema.
pub mod data;
mod errors;
/// Lemmatization capability seam and featurization stage.
pub mod featurize;
/// Text normalization helpers.
pub mod normalizer;
/// Timestamp partitioning of the raw record stream.
pub mod partition;
/// Batched pipeline execution and the persistence sink seam.
pub mod runner;
/// Tokenization stage.
pub mod tokenize;
/// Shared type aliases.
pub mod types;
/// Raw record validation and coercion.
pub mod validate;

pub use config::PipelineConfig;
pub use data::{BaseReview, FeaturizedReviewData, IntermediateReview};
pub use errors::PipelineError;
pub use featurize::{AnalyzedToken, DictionaryLemmatizer, Featurizer, Lemmatizer};
pub use normalizer::normalize;
pub use partition::{PartitionSummary, TimestampPartitioner};
pub use runner::{BatchRunner, BatchTiming, FeatureSink, NoopSink, RunSummary};
pub use tokenize::Tokenizer;
pub use types::{RawRecord, Token, UnixTime};
pub use validate::{RecordValidator, ValidationOutcome};
