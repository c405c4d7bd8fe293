use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::types::{Token, UnixTime};

/// Validated review record, the first stage of the progressive schema.
///
/// Invariants enforced at construction: `review_text` is non-empty. The
/// timestamp is a non-optional `i64`, so its presence is guaranteed by the
/// type once the validator has coerced the raw value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseReview {
    /// Star rating given by the reviewer.
    pub overall: f64,
    /// Whether the purchase was verified.
    pub verified: bool,
    /// Free-text review body.
    pub review_text: String,
    /// Short review headline.
    pub summary: String,
    /// Unix timestamp of the review.
    pub unix_review_time: UnixTime,
}

impl BaseReview {
    /// Construct a validated review, enforcing the non-empty-text invariant.
    pub fn new(
        overall: f64,
        verified: bool,
        review_text: impl Into<String>,
        summary: impl Into<String>,
        unix_review_time: UnixTime,
    ) -> Result<Self, PipelineError> {
        let review_text = review_text.into();
        if review_text.is_empty() {
            return Err(PipelineError::Invariant(
                "review text cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            overall,
            verified,
            review_text,
            summary: summary.into(),
            unix_review_time,
        })
    }
}

/// Tokenized review record: a `BaseReview` widened with token sequences.
///
/// Built by [`IntermediateReview::extend`] from an owned prior-stage value;
/// the base fields are carried through unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntermediateReview {
    /// Validated base fields carried through unchanged.
    #[serde(flatten)]
    pub base: BaseReview,
    /// Review body tokens in original word order, duplicates preserved.
    pub tokenized_review_text: Vec<Token>,
    /// Summary tokens in original word order, duplicates preserved.
    pub tokenized_summary: Vec<Token>,
}

impl IntermediateReview {
    /// Widen a `BaseReview` with its token sequences.
    pub fn extend(
        base: BaseReview,
        tokenized_review_text: Vec<Token>,
        tokenized_summary: Vec<Token>,
    ) -> Self {
        Self {
            base,
            tokenized_review_text,
            tokenized_summary,
        }
    }
}

/// Featurized review record: the final stage of the progressive schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeaturizedReviewData {
    /// Tokenized fields carried through unchanged.
    #[serde(flatten)]
    pub intermediate: IntermediateReview,
    /// Non-stopword review body lemmas, tokenization order preserved.
    pub featurized_review_text: Vec<Token>,
    /// Non-stopword summary lemmas, tokenization order preserved.
    pub featurized_summary: Vec<Token>,
}

impl FeaturizedReviewData {
    /// Widen an `IntermediateReview` with its lemma sequences.
    pub fn extend(
        intermediate: IntermediateReview,
        featurized_review_text: Vec<Token>,
        featurized_summary: Vec<Token>,
    ) -> Self {
        Self {
            intermediate,
            featurized_review_text,
            featurized_summary,
        }
    }
}
