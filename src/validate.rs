//! Raw record validation: schema filtering, coercion, and invariant checks.

use serde_json::{Map, Value};
use tracing::debug;

use crate::data::BaseReview;
use crate::errors::PipelineError;
use crate::types::RawRecord;

/// Exact key set a raw record must carry to enter the pipeline.
///
/// Records with missing or extra keys are dropped, not surfaced: upstream
/// feeds are heterogeneous and unexpected schema drift must not abort a run.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "overall",
    "verified",
    "reviewText",
    "summary",
    "unixReviewTime",
];

/// Result of validating a record collection.
///
/// Every record is evaluated independently; nothing short-circuits. Records
/// that pass the schema filter but violate a `BaseReview` invariant are
/// surfaced in `violations` with their position, never dropped silently.
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    /// Records that matched the schema and passed every invariant.
    pub accepted: Vec<BaseReview>,
    /// Invariant violations from schema-matching records.
    pub violations: Vec<PipelineError>,
}

impl ValidationOutcome {
    /// True when no schema-matching record violated an invariant.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Validates raw records against the declared schema and coerces accepted
/// ones into `BaseReview` values.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordValidator;

impl RecordValidator {
    /// Evaluate every record in the collection.
    ///
    /// Records whose key set differs from [`REQUIRED_FIELDS`] by even one
    /// field (or that are not JSON objects) are dropped with a debug trail.
    /// Accepted records are coerced (`overall` to float, `verified` to bool,
    /// `unixReviewTime` to integer, text fields as strings); coercion or
    /// invariant failures become positioned violations in the outcome.
    pub fn validate_records(&self, records: &[RawRecord]) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();
        for (position, record) in records.iter().enumerate() {
            let Some(object) = record.as_object() else {
                debug!(position, "dropping non-object record");
                continue;
            };
            if !matches_schema(object) {
                debug!(position, "dropping record with mismatched key set");
                continue;
            }
            match coerce(object, position) {
                Ok(review) => outcome.accepted.push(review),
                Err(violation) => outcome.violations.push(violation),
            }
        }
        outcome
    }
}

fn matches_schema(object: &Map<String, Value>) -> bool {
    object.len() == REQUIRED_FIELDS.len()
        && REQUIRED_FIELDS.iter().all(|field| object.contains_key(*field))
}

fn coerce(object: &Map<String, Value>, position: usize) -> Result<BaseReview, PipelineError> {
    let overall = object
        .get("overall")
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid(position, "overall must be numeric"))?;
    let verified = object
        .get("verified")
        .and_then(Value::as_bool)
        .ok_or_else(|| invalid(position, "verified must be a boolean"))?;
    let unix_review_time = object
        .get("unixReviewTime")
        .and_then(Value::as_i64)
        .ok_or_else(|| invalid(position, "unixReviewTime must be an integer"))?;
    let review_text = text_field(object, "reviewText");
    let summary = text_field(object, "summary");

    BaseReview::new(overall, verified, review_text, summary, unix_review_time)
        .map_err(|err| invalid(position, &err.to_string()))
}

/// Non-string text values (for example JSON null) coerce to the empty
/// string, which the `BaseReview` invariant then rejects for `reviewText`.
fn text_field(object: &Map<String, Value>, field: &str) -> String {
    object
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn invalid(position: usize, reason: &str) -> PipelineError {
    PipelineError::Validation {
        position,
        reason: reason.to_string(),
    }
}
