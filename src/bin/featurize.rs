//! Pipeline driver: partition the raw review stream, then featurize it in
//! fixed-size batches with the built-in dictionary capability and the
//! reference no-op sink.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use reviewprep::{
    BatchRunner, DictionaryLemmatizer, NoopSink, PipelineConfig, PipelineError,
    TimestampPartitioner,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run() {
        error!(%err, "pipeline run failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), PipelineError> {
    let config = PipelineConfig::from_env()?;

    let partitioner = TimestampPartitioner::new(
        &config.source_input_path,
        &config.processed_output_path,
    );
    let partition = partitioner.partition()?;
    info!(
        buckets = partition.buckets,
        records = partition.records,
        "partitioned raw stream"
    );

    let runner = BatchRunner::new(&config.processed_output_path, config.batch_size)?;
    let capability = DictionaryLemmatizer::default();
    let summary = runner.run(&capability, &NoopSink)?;
    info!(
        batches = summary.batches.len(),
        records = summary.total_records(),
        featurized = summary.total_featurized(),
        "featurization run complete"
    );
    Ok(())
}
