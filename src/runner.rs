//! Batched pipeline execution over materialized partition units.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::data::FeaturizedReviewData;
use crate::errors::PipelineError;
use crate::featurize::{Featurizer, Lemmatizer};
use crate::tokenize::Tokenizer;
use crate::types::RawRecord;
use crate::validate::RecordValidator;

/// File suffix identifying partition units inside the unit directory.
const UNIT_SUFFIX: &str = "json";

/// Persistence seam for featurized batches.
///
/// The persistence guarantee is implementation-defined; the pipeline calls
/// `persist` at most once per batch, after every record in the batch has
/// been featurized.
pub trait FeatureSink: Send + Sync {
    /// Persist one fully featurized batch.
    fn persist(&self, batch: &[FeaturizedReviewData]) -> Result<(), PipelineError>;
}

/// Reference sink that logs batch sizes and discards the data.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl FeatureSink for NoopSink {
    fn persist(&self, batch: &[FeaturizedReviewData]) -> Result<(), PipelineError> {
        debug!(records = batch.len(), "noop sink discarded batch");
        Ok(())
    }
}

/// Wall-clock timing record for one processed batch.
#[derive(Clone, Debug)]
pub struct BatchTiming {
    /// Zero-based batch index within the run.
    pub index: usize,
    /// Raw records drawn into the batch.
    pub records: usize,
    /// Featurized records delivered to the sink.
    pub featurized: usize,
    /// Wall-clock duration of the validate-tokenize-featurize-persist chain.
    pub duration: Duration,
}

/// Summary of a completed batch run.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    /// Per-batch timings in processing order. Batches skipped by the resume
    /// marker are absent.
    pub batches: Vec<BatchTiming>,
}

impl RunSummary {
    /// Total raw records drawn across all processed batches.
    pub fn total_records(&self) -> usize {
        self.batches.iter().map(|batch| batch.records).sum()
    }

    /// Total featurized records delivered to the sink.
    pub fn total_featurized(&self) -> usize {
        self.batches.iter().map(|batch| batch.featurized).sum()
    }
}

/// Drives validate, tokenize, featurize, and persist over partition units
/// in fixed-size batches.
///
/// Units are enumerated in file-name order so batch composition is stable
/// across runs. Batches carry no data dependency on each other; the
/// reference design processes them strictly sequentially. A batch either
/// reaches the sink whole or fails whole: any validation violation or
/// capability failure aborts the batch before `persist` is invoked, wrapped
/// with the batch index and contributing unit names for targeted re-runs.
pub struct BatchRunner {
    unit_dir: PathBuf,
    batch_size: usize,
    resume_marker: Option<PathBuf>,
    validator: RecordValidator,
    tokenizer: Tokenizer,
    featurizer: Featurizer,
}

impl BatchRunner {
    /// Create a runner over `unit_dir` with a positive batch size.
    pub fn new(unit_dir: impl Into<PathBuf>, batch_size: usize) -> Result<Self, PipelineError> {
        if batch_size == 0 {
            return Err(PipelineError::Configuration(
                "batch size must be positive".to_string(),
            ));
        }
        Ok(Self {
            unit_dir: unit_dir.into(),
            batch_size,
            resume_marker: None,
            validator: RecordValidator,
            tokenizer: Tokenizer,
            featurizer: Featurizer,
        })
    }

    /// Persist the last fully completed batch index to `path` after each
    /// batch, and skip already-completed batches when re-running.
    pub fn with_resume_marker(mut self, path: impl Into<PathBuf>) -> Self {
        self.resume_marker = Some(path.into());
        self
    }

    /// Run the full pipeline over every unit in the directory.
    pub fn run(
        &self,
        capability: &dyn Lemmatizer,
        sink: &dyn FeatureSink,
    ) -> Result<RunSummary, PipelineError> {
        let units = self.enumerate_units()?;
        let completed = self.load_marker()?;
        let mut summary = RunSummary::default();
        let mut pending: Vec<RawRecord> = Vec::with_capacity(self.batch_size);
        let mut pending_units: Vec<String> = Vec::new();
        let mut batch_index = 0usize;

        for unit in &units {
            let unit_name = unit
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            for record in read_unit(unit)? {
                if !pending_units.contains(&unit_name) {
                    pending_units.push(unit_name.clone());
                }
                pending.push(record);
                if pending.len() == self.batch_size {
                    self.dispatch_batch(
                        batch_index,
                        std::mem::take(&mut pending),
                        std::mem::take(&mut pending_units),
                        completed,
                        capability,
                        sink,
                        &mut summary,
                    )?;
                    batch_index += 1;
                }
            }
        }
        if !pending.is_empty() {
            self.dispatch_batch(
                batch_index,
                pending,
                pending_units,
                completed,
                capability,
                sink,
                &mut summary,
            )?;
        }

        info!(
            batches = summary.batches.len(),
            records = summary.total_records(),
            featurized = summary.total_featurized(),
            "batch run complete"
        );
        Ok(summary)
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch_batch(
        &self,
        index: usize,
        records: Vec<RawRecord>,
        units: Vec<String>,
        completed: Option<usize>,
        capability: &dyn Lemmatizer,
        sink: &dyn FeatureSink,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        if completed.is_some_and(|last| index <= last) {
            debug!(batch = index, "skipping batch completed by a prior run");
            return Ok(());
        }
        let timing = self
            .process_batch(index, records, capability, sink)
            .map_err(|err| PipelineError::Batch {
                index,
                units,
                source: Box::new(err),
            })?;
        summary.batches.push(timing);
        if let Some(path) = &self.resume_marker {
            fs::write(path, index.to_string())?;
        }
        Ok(())
    }

    fn process_batch(
        &self,
        index: usize,
        records: Vec<RawRecord>,
        capability: &dyn Lemmatizer,
        sink: &dyn FeatureSink,
    ) -> Result<BatchTiming, PipelineError> {
        let started = Instant::now();
        let drawn = records.len();

        let mut outcome = self.validator.validate_records(&records);
        if let Some(violation) = outcome.violations.drain(..).next() {
            return Err(violation);
        }
        let tokenized = self.tokenizer.tokenize_all(outcome.accepted);
        let featurized = self.featurizer.featurize_all(tokenized, capability)?;
        sink.persist(&featurized)?;

        let duration = started.elapsed();
        info!(
            batch = index,
            records = drawn,
            featurized = featurized.len(),
            elapsed_ms = duration.as_millis() as u64,
            "processed batch"
        );
        Ok(BatchTiming {
            index,
            records: drawn,
            featurized: featurized.len(),
            duration,
        })
    }

    fn enumerate_units(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let mut units = Vec::new();
        for entry in fs::read_dir(&self.unit_dir)? {
            let path = entry?.path();
            if path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(UNIT_SUFFIX)
            {
                units.push(path);
            }
        }
        units.sort();
        Ok(units)
    }

    fn load_marker(&self) -> Result<Option<usize>, PipelineError> {
        let Some(path) = &self.resume_marker else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        let index = contents.trim().parse().map_err(|_| {
            PipelineError::Configuration(format!(
                "resume marker '{}' does not hold a batch index",
                path.display()
            ))
        })?;
        Ok(Some(index))
    }
}

fn read_unit(path: &Path) -> Result<Vec<RawRecord>, PipelineError> {
    let file = File::open(path)?;
    let records = serde_json::from_reader(BufReader::new(file))?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;
    use tempfile::tempdir;

    use crate::featurize::{AnalyzedToken, DictionaryLemmatizer};

    /// Sink that records every persisted batch for inspection.
    #[derive(Default)]
    struct CollectingSink {
        batches: Mutex<Vec<Vec<FeaturizedReviewData>>>,
    }

    impl FeatureSink for CollectingSink {
        fn persist(&self, batch: &[FeaturizedReviewData]) -> Result<(), PipelineError> {
            self.batches.lock().unwrap().push(batch.to_vec());
            Ok(())
        }
    }

    /// Capability that fails whenever the text contains a poison token.
    struct PoisonCapability {
        poison: String,
    }

    impl Lemmatizer for PoisonCapability {
        fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, PipelineError> {
            if text.contains(&self.poison) {
                return Err(PipelineError::Capability {
                    reason: format!("cannot analyze '{}'", self.poison),
                });
            }
            Ok(text
                .split_whitespace()
                .map(|token| AnalyzedToken {
                    lemma: token.to_string(),
                    is_stop: false,
                })
                .collect())
        }
    }

    fn raw_record(text: &str, timestamp: i64) -> RawRecord {
        json!({
            "overall": 4.0,
            "verified": true,
            "reviewText": text,
            "summary": "ok",
            "unixReviewTime": timestamp,
        })
    }

    fn write_unit(dir: &Path, name: &str, records: &[RawRecord]) {
        fs::write(dir.join(name), serde_json::to_string(&records).unwrap()).unwrap();
    }

    #[test]
    fn rejects_zero_batch_size() {
        let temp = tempdir().unwrap();
        assert!(matches!(
            BatchRunner::new(temp.path(), 0),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn splits_twenty_five_records_into_ten_ten_five() {
        let temp = tempdir().unwrap();
        let records: Vec<RawRecord> = (0..25)
            .map(|i| raw_record(&format!("review number {i}"), i))
            .collect();
        write_unit(temp.path(), "0.json", &records);

        let runner = BatchRunner::new(temp.path(), 10).unwrap();
        let sink = CollectingSink::default();
        let summary = runner.run(&DictionaryLemmatizer::default(), &sink).unwrap();

        let sizes: Vec<usize> = summary.batches.iter().map(|batch| batch.records).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(summary.total_records(), 25);
        let persisted = sink.batches.lock().unwrap();
        assert_eq!(persisted.len(), 3);
        assert_eq!(persisted[2].len(), 5);
    }

    #[test]
    fn accumulates_batches_across_units_in_stable_name_order() {
        let temp = tempdir().unwrap();
        write_unit(
            temp.path(),
            "100.json",
            &[raw_record("from first unit", 100)],
        );
        write_unit(
            temp.path(),
            "200.json",
            &[raw_record("from second unit", 200)],
        );
        fs::write(temp.path().join("notes.txt"), "not a unit").unwrap();

        let runner = BatchRunner::new(temp.path(), 2).unwrap();
        let sink = CollectingSink::default();
        let summary = runner.run(&DictionaryLemmatizer::default(), &sink).unwrap();

        assert_eq!(summary.batches.len(), 1);
        let persisted = sink.batches.lock().unwrap();
        assert_eq!(
            persisted[0][0].intermediate.base.review_text,
            "from first unit"
        );
        assert_eq!(
            persisted[0][1].intermediate.base.review_text,
            "from second unit"
        );
    }

    #[test]
    fn batch_failure_carries_index_and_unit_context() {
        let temp = tempdir().unwrap();
        write_unit(temp.path(), "1.json", &[raw_record("clean review", 1)]);
        write_unit(temp.path(), "2.json", &[raw_record("poisoned review", 2)]);

        let runner = BatchRunner::new(temp.path(), 1).unwrap();
        let sink = CollectingSink::default();
        let capability = PoisonCapability {
            poison: "poisoned".to_string(),
        };
        let err = runner.run(&capability, &sink).unwrap_err();

        match err {
            PipelineError::Batch { index, units, source } => {
                assert_eq!(index, 1);
                assert_eq!(units, vec!["2.json".to_string()]);
                assert!(matches!(*source, PipelineError::Capability { .. }));
            }
            other => panic!("expected batch failure, got {other:?}"),
        }
        // The failing batch committed nothing; the first batch did.
        assert_eq!(sink.batches.lock().unwrap().len(), 1);
    }

    #[test]
    fn validation_violation_fails_the_batch_atomically() {
        let temp = tempdir().unwrap();
        write_unit(
            temp.path(),
            "0.json",
            &[raw_record("clean", 1), raw_record("", 2)],
        );

        let runner = BatchRunner::new(temp.path(), 2).unwrap();
        let sink = CollectingSink::default();
        let err = runner
            .run(&DictionaryLemmatizer::default(), &sink)
            .unwrap_err();

        match err {
            PipelineError::Batch { source, .. } => {
                assert!(matches!(*source, PipelineError::Validation { .. }));
            }
            other => panic!("expected batch failure, got {other:?}"),
        }
        assert!(sink.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn schema_mismatched_records_are_dropped_not_fatal() {
        let temp = tempdir().unwrap();
        write_unit(
            temp.path(),
            "0.json",
            &[raw_record("kept", 1), json!({"stray": true})],
        );

        let runner = BatchRunner::new(temp.path(), 2).unwrap();
        let sink = CollectingSink::default();
        let summary = runner.run(&DictionaryLemmatizer::default(), &sink).unwrap();

        assert_eq!(summary.batches[0].records, 2);
        assert_eq!(summary.batches[0].featurized, 1);
    }

    #[test]
    fn resume_marker_skips_completed_batches() {
        let temp = tempdir().unwrap();
        let unit_dir = temp.path().join("units");
        fs::create_dir_all(&unit_dir).unwrap();
        let records: Vec<RawRecord> = (0..4)
            .map(|i| raw_record(&format!("review {i}"), i))
            .collect();
        write_unit(&unit_dir, "0.json", &records);
        let marker = temp.path().join("marker");

        let runner = BatchRunner::new(&unit_dir, 2)
            .unwrap()
            .with_resume_marker(&marker);
        let sink = CollectingSink::default();
        runner.run(&DictionaryLemmatizer::default(), &sink).unwrap();
        assert_eq!(fs::read_to_string(&marker).unwrap(), "1");
        assert_eq!(sink.batches.lock().unwrap().len(), 2);

        // A re-run with the marker in place reprocesses nothing.
        let rerun_sink = CollectingSink::default();
        let summary = runner
            .run(&DictionaryLemmatizer::default(), &rerun_sink)
            .unwrap();
        assert!(summary.batches.is_empty());
        assert!(rerun_sink.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn each_batch_records_a_timing() {
        let temp = tempdir().unwrap();
        write_unit(
            temp.path(),
            "0.json",
            &[raw_record("alpha", 1), raw_record("beta", 2)],
        );

        let runner = BatchRunner::new(temp.path(), 1).unwrap();
        let summary = runner
            .run(&DictionaryLemmatizer::default(), &NoopSink)
            .unwrap();
        assert_eq!(summary.batches.len(), 2);
        assert_eq!(summary.batches[0].index, 0);
        assert_eq!(summary.batches[1].index, 1);
    }
}
