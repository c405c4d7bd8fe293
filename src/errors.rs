use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for partitioning, validation, featurization, and batch
/// execution failures.
///
/// Schema mismatches are intentionally absent: records whose key set does
/// not match the declared schema are filtered silently, never surfaced.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed stream line, decompression failure, or a missing/invalid
    /// timestamp key during partitioning.
    #[error("parse failure in '{}' at line {line}: {reason}", .path.display())]
    Parse {
        /// Input stream the offending line came from.
        path: PathBuf,
        /// One-based line number within the stream.
        line: usize,
        /// Human-readable failure description.
        reason: String,
    },
    /// A review value violates a `BaseReview` invariant.
    #[error("record invariant violated: {0}")]
    Invariant(String),
    /// A schema-matching record failed coercion or an invariant check.
    #[error("invalid record at position {position}: {reason}")]
    Validation {
        /// Zero-based position of the record within its collection.
        position: usize,
        /// Human-readable failure description.
        reason: String,
    },
    /// The lemmatization capability failed.
    #[error("lemmatization capability failure: {reason}")]
    Capability {
        /// Human-readable failure description.
        reason: String,
    },
    /// A batch failed; carries enough context to re-run just that batch.
    #[error("batch {index} failed (units: {})", .units.join(", "))]
    Batch {
        /// Zero-based batch index within the run.
        index: usize,
        /// Names of the partition units that contributed records.
        units: Vec<String>,
        /// Underlying failure.
        #[source]
        source: Box<PipelineError>,
    },
    /// JSON encoding or decoding failure on a partition unit or snapshot.
    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),
    /// Unit or stream IO failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Missing or invalid environment configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
