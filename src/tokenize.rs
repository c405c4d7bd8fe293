//! Tokenization stage: widen validated reviews with token sequences.

use crate::data::{BaseReview, IntermediateReview};
use crate::normalizer::normalize;

/// Applies the normalizer to both text fields of a validated review.
///
/// No failure modes: the input's invariants already guarantee usable text,
/// and normalization is total.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tokenizer;

impl Tokenizer {
    /// Tokenize `review_text` and `summary` independently.
    pub fn tokenize(&self, review: BaseReview) -> IntermediateReview {
        let tokenized_review_text = normalize(&review.review_text);
        let tokenized_summary = normalize(&review.summary);
        IntermediateReview::extend(review, tokenized_review_text, tokenized_summary)
    }

    /// Tokenize a collection, preserving order.
    pub fn tokenize_all(&self, reviews: Vec<BaseReview>) -> Vec<IntermediateReview> {
        reviews
            .into_iter()
            .map(|review| self.tokenize(review))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_both_fields_independently() {
        let base =
            BaseReview::new(4.0, false, "Works well. Works fast!", "Solid buy", 10).unwrap();
        let intermediate = Tokenizer.tokenize(base.clone());
        assert_eq!(
            intermediate.tokenized_review_text,
            vec!["works", "well", "works", "fast"]
        );
        assert_eq!(intermediate.tokenized_summary, vec!["solid", "buy"]);
        assert_eq!(intermediate.base, base);
    }

    #[test]
    fn empty_summary_yields_empty_tokens() {
        let base = BaseReview::new(1.0, true, "Broke on arrival", "", 20).unwrap();
        let intermediate = Tokenizer.tokenize(base);
        assert!(intermediate.tokenized_summary.is_empty());
    }

    #[test]
    fn tokenize_all_preserves_collection_order() {
        let reviews = vec![
            BaseReview::new(5.0, true, "First", "a", 1).unwrap(),
            BaseReview::new(2.0, false, "Second", "b", 2).unwrap(),
        ];
        let tokenized = Tokenizer.tokenize_all(reviews);
        assert_eq!(tokenized[0].tokenized_review_text, vec!["first"]);
        assert_eq!(tokenized[1].tokenized_review_text, vec!["second"]);
    }
}
