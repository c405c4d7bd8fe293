//! Text normalization shared by the tokenization stage.

use crate::types::Token;

/// Normalize free text into an ordered token sequence.
///
/// Strips the fixed ASCII punctuation set (`!` through `~` symbol ranges,
/// not locale-aware), lowercases, and splits on whitespace runs. Pure and
/// total: any input is accepted and an empty string yields an empty
/// sequence.
pub fn normalize(text: &str) -> Vec<Token> {
    let stripped: String = text
        .chars()
        .filter(|ch| !ch.is_ascii_punctuation())
        .collect();
    stripped
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_lowercases() {
        assert_eq!(normalize("Great Product!!"), vec!["great", "product"]);
    }

    #[test]
    fn empty_input_yields_empty_sequence() {
        assert_eq!(normalize(""), Vec::<Token>::new());
    }

    #[test]
    fn punctuation_only_input_yields_empty_sequence() {
        assert_eq!(normalize("!!! ... ???"), Vec::<Token>::new());
    }

    #[test]
    fn collapses_whitespace_runs_and_keeps_duplicates() {
        assert_eq!(
            normalize("good\t good\n\n GOOD"),
            vec!["good", "good", "good"]
        );
    }

    #[test]
    fn keeps_original_word_order() {
        assert_eq!(
            normalize("Works well, arrived fast."),
            vec!["works", "well", "arrived", "fast"]
        );
    }

    #[test]
    fn punctuation_inside_words_is_removed_not_split() {
        // Matches byte-level punctuation stripping: "don't" becomes "dont".
        assert_eq!(normalize("Don't stop"), vec!["dont", "stop"]);
    }
}
