//! Featurization stage and the injected lemmatization capability seam.

use std::collections::{HashMap, HashSet};

use crate::data::{FeaturizedReviewData, IntermediateReview};
use crate::errors::PipelineError;
use crate::types::Token;

/// A single analyzed token: its lemma and stopword classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyzedToken {
    /// Base/dictionary form of the token.
    pub lemma: String,
    /// Whether the capability classified the token as low-information.
    pub is_stop: bool,
}

/// Injected lemmatization capability.
///
/// Implementations wrap a loaded language model: expensive to construct,
/// treated as read-only afterwards, and safe for concurrent invocation from
/// independent batches.
pub trait Lemmatizer: Send + Sync {
    /// Analyze whitespace-joined text into per-token lemmas and stopword
    /// flags, preserving token order.
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, PipelineError>;
}

/// Featurization stage: reduce token sequences to ordered non-stopword
/// lemmas via the injected capability.
#[derive(Clone, Copy, Debug, Default)]
pub struct Featurizer;

impl Featurizer {
    /// Featurize one tokenized review.
    ///
    /// The review text and summary token sequences are processed
    /// independently; a capability failure on either propagates.
    pub fn featurize(
        &self,
        review: IntermediateReview,
        capability: &dyn Lemmatizer,
    ) -> Result<FeaturizedReviewData, PipelineError> {
        let featurized_review_text = lemmas(&review.tokenized_review_text, capability)?;
        let featurized_summary = lemmas(&review.tokenized_summary, capability)?;
        Ok(FeaturizedReviewData::extend(
            review,
            featurized_review_text,
            featurized_summary,
        ))
    }

    /// Featurize a collection, preserving order. The first capability
    /// failure aborts the whole collection.
    pub fn featurize_all(
        &self,
        reviews: Vec<IntermediateReview>,
        capability: &dyn Lemmatizer,
    ) -> Result<Vec<FeaturizedReviewData>, PipelineError> {
        reviews
            .into_iter()
            .map(|review| self.featurize(review, capability))
            .collect()
    }
}

fn lemmas(tokens: &[Token], capability: &dyn Lemmatizer) -> Result<Vec<Token>, PipelineError> {
    let text = tokens.join(" ");
    let analyzed = capability.analyze(&text)?;
    Ok(analyzed
        .into_iter()
        .filter(|token| !token.is_stop)
        .map(|token| token.lemma)
        .collect())
}

/// Dictionary-backed reference capability: a fixed stopword set plus
/// explicit lemma overrides. Tokens without an override are their own lemma.
#[derive(Clone, Debug)]
pub struct DictionaryLemmatizer {
    stopwords: HashSet<String>,
    lemmas: HashMap<String, String>,
}

impl DictionaryLemmatizer {
    /// Build a capability from an explicit stopword set and lemma map.
    pub fn new(
        stopwords: impl IntoIterator<Item = impl Into<String>>,
        lemmas: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        Self {
            stopwords: stopwords.into_iter().map(Into::into).collect(),
            lemmas: lemmas
                .into_iter()
                .map(|(token, lemma)| (token.into(), lemma.into()))
                .collect(),
        }
    }

    /// Add a lemma override.
    pub fn with_lemma(mut self, token: impl Into<String>, lemma: impl Into<String>) -> Self {
        self.lemmas.insert(token.into(), lemma.into());
        self
    }
}

impl Default for DictionaryLemmatizer {
    /// Classic English stopword list, no lemma overrides.
    fn default() -> Self {
        const STOPWORDS: [&str; 33] = [
            "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into",
            "is", "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then",
            "there", "these", "they", "this", "to", "was", "will", "with",
        ];
        Self::new(STOPWORDS, HashMap::<String, String>::new())
    }
}

impl Lemmatizer for DictionaryLemmatizer {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, PipelineError> {
        Ok(text
            .split_whitespace()
            .map(|token| AnalyzedToken {
                lemma: self
                    .lemmas
                    .get(token)
                    .cloned()
                    .unwrap_or_else(|| token.to_string()),
                is_stop: self.stopwords.contains(token),
            })
            .collect())
    }
}
