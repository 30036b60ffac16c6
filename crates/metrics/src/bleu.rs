//! Sentence-level BLEU

use crate::tokenizer::{clipped_overlap, ngram_counts, tokenize, tokenless_score};

/// Default maximum n-gram order
pub const DEFAULT_MAX_ORDER: usize = 4;

/// Sentence BLEU of `candidate` against a single `reference`
///
/// BLEU = BP × exp(Σ wₙ log pₙ) with uniform weights over orders
/// 1..=min(max_order, candidate length), so identical texts shorter than
/// `max_order` still score 1.0. Orders without any match use add-one
/// smoothing, 1 / (candidate n-grams + 1). BP = exp(1 - r/c) when the
/// candidate is shorter than the reference. Texts without word tokens only
/// match when their raw strings are equal.
pub fn bleu(reference: &str, candidate: &str, max_order: usize) -> f64 {
    let reference_tokens = tokenize(reference);
    let candidate_tokens = tokenize(candidate);

    if reference_tokens.is_empty() || candidate_tokens.is_empty() {
        return tokenless_score(reference, candidate);
    }

    let orders = max_order.min(candidate_tokens.len());
    if orders == 0 {
        return 0.0;
    }

    let weight = 1.0 / orders as f64;
    let mut log_sum = 0.0;
    for n in 1..=orders {
        let reference_ngrams = ngram_counts(&reference_tokens, n);
        let candidate_ngrams = ngram_counts(&candidate_tokens, n);
        let total: usize = candidate_ngrams.values().sum();
        let matches = clipped_overlap(&reference_ngrams, &candidate_ngrams);

        let precision = if matches == 0 {
            1.0 / (total + 1) as f64
        } else {
            matches as f64 / total as f64
        };
        log_sum += weight * precision.ln();
    }

    brevity_penalty(reference_tokens.len(), candidate_tokens.len()) * log_sum.exp()
}

fn brevity_penalty(reference_len: usize, candidate_len: usize) -> f64 {
    if candidate_len >= reference_len {
        1.0
    } else {
        (1.0 - reference_len as f64 / candidate_len as f64).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_score_one() {
        assert!((bleu("the cat sat", "the cat sat", DEFAULT_MAX_ORDER) - 1.0).abs() < 1e-12);
        assert!((bleu("cat", "cat", DEFAULT_MAX_ORDER) - 1.0).abs() < 1e-12);
        let long = "the quick brown fox jumps over the lazy dog";
        assert!((bleu(long, long, DEFAULT_MAX_ORDER) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sides_score_zero() {
        assert_eq!(bleu("", "the cat", DEFAULT_MAX_ORDER), 0.0);
        assert_eq!(bleu("the cat", "", DEFAULT_MAX_ORDER), 0.0);
    }

    #[test]
    fn test_texts_without_word_tokens() {
        assert_eq!(bleu("!!!", "!!!", DEFAULT_MAX_ORDER), 1.0);
        assert_eq!(bleu("!!!", "...", DEFAULT_MAX_ORDER), 0.0);
        assert_eq!(bleu("!!!", "the cat", DEFAULT_MAX_ORDER), 0.0);
    }

    #[test]
    fn test_brevity_penalty_applies_to_short_candidates() {
        let full = bleu("the cat sat on the mat", "the cat sat on the mat", 2);
        let short = bleu("the cat sat on the mat", "the cat sat", 2);
        assert!((full - 1.0).abs() < 1e-12);
        // all n-grams match, only the brevity penalty exp(1 - 6/3) remains
        assert!((short - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_texts_are_smoothed_not_zero() {
        let score = bleu("the cat sat", "a dog ran", DEFAULT_MAX_ORDER);
        assert!(score > 0.0);
        assert!(score < 0.5);
    }

    #[test]
    fn test_bounded() {
        let score = bleu("the cat sat on the mat", "the cat the cat on the mat", DEFAULT_MAX_ORDER);
        assert!((0.0..=1.0).contains(&score));
    }
}
