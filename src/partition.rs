//! Timestamp partitioning of the compressed raw record stream.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::PipelineError;
use crate::types::{RawRecord, UnixTime};

/// Key holding the partition timestamp in each raw record.
const TIMESTAMP_FIELD: &str = "unixReviewTime";

/// Summary of a completed partition run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartitionSummary {
    /// Number of distinct timestamp buckets materialized.
    pub buckets: usize,
    /// Total records consumed from the stream.
    pub records: usize,
}

/// Splits a gzip newline-delimited JSON stream into one JSON unit per
/// distinct unix timestamp.
///
/// Buckets are keyed by the integer `unixReviewTime` value; record order
/// within a bucket is stream order, and buckets materialize in first-seen
/// order. Unit files are fully overwritten, so re-running on unchanged
/// input is idempotent and byte-identical.
///
/// Failure policy: the run aborts on the first malformed line or
/// missing/non-integer timestamp key. Partition output is the corpus of
/// record for every downstream run; a corrupt feed should be fixed
/// upstream, not sampled around.
pub struct TimestampPartitioner {
    input: PathBuf,
    output_dir: PathBuf,
    intermediate_snapshot: Option<PathBuf>,
}

impl TimestampPartitioner {
    /// Create a partitioner for `input`, materializing units under
    /// `output_dir`.
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            intermediate_snapshot: None,
        }
    }

    /// Also write the whole grouping as one JSON object (timestamp to
    /// record array) before per-bucket units are materialized.
    pub fn with_intermediate_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.intermediate_snapshot = Some(path.into());
        self
    }

    /// Consume the stream and materialize one unit per distinct timestamp.
    pub fn partition(&self) -> Result<PartitionSummary, PipelineError> {
        let buckets = self.bucket_stream()?;
        fs::create_dir_all(&self.output_dir)?;

        if let Some(snapshot_path) = &self.intermediate_snapshot {
            write_json(snapshot_path, &buckets)?;
            debug!(path = %snapshot_path.display(), "wrote intermediate snapshot");
        }

        let mut records = 0;
        for (timestamp, bucket) in &buckets {
            records += bucket.len();
            let unit_path = self.output_dir.join(format!("{timestamp}.json"));
            write_json(&unit_path, bucket)?;
            debug!(timestamp, records = bucket.len(), "materialized partition unit");
        }

        info!(buckets = buckets.len(), records, "partition run complete");
        Ok(PartitionSummary {
            buckets: buckets.len(),
            records,
        })
    }

    fn bucket_stream(&self) -> Result<IndexMap<UnixTime, Vec<RawRecord>>, PipelineError> {
        let file = File::open(&self.input)?;
        let reader = BufReader::new(GzDecoder::new(file));
        let mut buckets: IndexMap<UnixTime, Vec<RawRecord>> = IndexMap::new();

        for (index, line) in reader.lines().enumerate() {
            // Decompression failures surface as read errors on the line
            // iterator; fold them into the parse error with stream context.
            let line = line.map_err(|err| self.parse_error(index, err.to_string()))?;
            let record: RawRecord = serde_json::from_str(&line)
                .map_err(|err| self.parse_error(index, err.to_string()))?;
            let timestamp = record
                .get(TIMESTAMP_FIELD)
                .and_then(Value::as_i64)
                .ok_or_else(|| {
                    self.parse_error(
                        index,
                        format!("missing or non-integer '{TIMESTAMP_FIELD}' key"),
                    )
                })?;
            buckets.entry(timestamp).or_default().push(record);
        }

        Ok(buckets)
    }

    fn parse_error(&self, index: usize, reason: String) -> PipelineError {
        PipelineError::Parse {
            path: self.input.clone(),
            line: index + 1,
            reason,
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
