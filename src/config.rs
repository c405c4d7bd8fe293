//! Environment-sourced pipeline configuration.

use std::env;
use std::path::PathBuf;

use crate::errors::PipelineError;

/// Environment variable holding the compressed input stream path.
pub const ENV_SOURCE_INPUT_PATH: &str = "SOURCE_INPUT_PATH";
/// Environment variable holding the partition unit directory.
pub const ENV_PROCESSED_OUTPUT_PATH: &str = "PROCESSED_OUTPUT_PATH";
/// Environment variable holding the batch size.
pub const ENV_PROCESSING_BATCH_SIZE: &str = "PROCESSING_BATCH_SIZE";

/// Runtime configuration for a full pipeline run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Path to the gzip newline-delimited JSON input stream.
    pub source_input_path: PathBuf,
    /// Directory holding one JSON unit per unix timestamp.
    pub processed_output_path: PathBuf,
    /// Raw records per batch; always positive.
    pub batch_size: usize,
}

impl PipelineConfig {
    /// Load configuration from the enumerated environment variables.
    pub fn from_env() -> Result<Self, PipelineError> {
        let source_input_path = required_var(ENV_SOURCE_INPUT_PATH)?.into();
        let processed_output_path = required_var(ENV_PROCESSED_OUTPUT_PATH)?.into();
        let raw_batch = required_var(ENV_PROCESSING_BATCH_SIZE)?;
        let batch_size: usize = raw_batch.parse().map_err(|_| {
            PipelineError::Configuration(format!(
                "{ENV_PROCESSING_BATCH_SIZE} must be a positive integer; got '{raw_batch}'"
            ))
        })?;
        if batch_size == 0 {
            return Err(PipelineError::Configuration(format!(
                "{ENV_PROCESSING_BATCH_SIZE} must be positive"
            )));
        }
        Ok(Self {
            source_input_path,
            processed_output_path,
            batch_size,
        })
    }
}

fn required_var(name: &str) -> Result<String, PipelineError> {
    env::var(name).map_err(|_| PipelineError::Configuration(format!("{name} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-global, so every case lives in one
    // test body to keep them from interleaving under the parallel runner.
    #[test]
    fn from_env_covers_missing_invalid_and_valid_values() {
        env::remove_var(ENV_SOURCE_INPUT_PATH);
        env::remove_var(ENV_PROCESSED_OUTPUT_PATH);
        env::remove_var(ENV_PROCESSING_BATCH_SIZE);
        assert!(matches!(
            PipelineConfig::from_env(),
            Err(PipelineError::Configuration(_))
        ));

        env::set_var(ENV_SOURCE_INPUT_PATH, "/data/raw/reviews.json.gz");
        env::set_var(ENV_PROCESSED_OUTPUT_PATH, "/data/processed");
        env::set_var(ENV_PROCESSING_BATCH_SIZE, "not-a-number");
        assert!(matches!(
            PipelineConfig::from_env(),
            Err(PipelineError::Configuration(_))
        ));

        env::set_var(ENV_PROCESSING_BATCH_SIZE, "0");
        assert!(matches!(
            PipelineConfig::from_env(),
            Err(PipelineError::Configuration(_))
        ));

        env::set_var(ENV_PROCESSING_BATCH_SIZE, "64");
        let config = PipelineConfig::from_env().unwrap();
        assert_eq!(
            config.source_input_path,
            PathBuf::from("/data/raw/reviews.json.gz")
        );
        assert_eq!(config.processed_output_path, PathBuf::from("/data/processed"));
        assert_eq!(config.batch_size, 64);

        env::remove_var(ENV_SOURCE_INPUT_PATH);
        env::remove_var(ENV_PROCESSED_OUTPUT_PATH);
        env::remove_var(ENV_PROCESSING_BATCH_SIZE);
    }
}
