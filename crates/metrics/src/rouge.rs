//! ROUGE-N and ROUGE-L

use crate::tokenizer::{clipped_overlap, f1, ngram_counts, tokenize, tokenless_score};
use serde::Serialize;

/// Precision, recall and F1 of one ROUGE comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RougeScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl RougeScore {
    fn from_counts(matches: usize, candidate_total: usize, reference_total: usize) -> Self {
        if candidate_total == 0 || reference_total == 0 {
            return Self::default();
        }
        let precision = matches as f64 / candidate_total as f64;
        let recall = matches as f64 / reference_total as f64;
        Self {
            precision,
            recall,
            f1: f1(precision, recall),
        }
    }

    fn uniform(value: f64) -> Self {
        Self {
            precision: value,
            recall: value,
            f1: value,
        }
    }
}

/// ROUGE-N with clipped n-gram counts
///
/// The order is capped at the shorter side's token count, so identical texts
/// shorter than `n` tokens still score 1.0. Texts without word tokens only
/// match when their raw strings are equal.
pub fn rouge_n(reference: &str, candidate: &str, n: usize) -> RougeScore {
    let reference_tokens = tokenize(reference);
    let candidate_tokens = tokenize(candidate);

    if reference_tokens.is_empty() || candidate_tokens.is_empty() {
        return RougeScore::uniform(tokenless_score(reference, candidate));
    }

    let order = n.min(reference_tokens.len()).min(candidate_tokens.len());
    let reference_ngrams = ngram_counts(&reference_tokens, order);
    let candidate_ngrams = ngram_counts(&candidate_tokens, order);

    let overlap = clipped_overlap(&reference_ngrams, &candidate_ngrams);
    RougeScore::from_counts(
        overlap,
        candidate_ngrams.values().sum(),
        reference_ngrams.values().sum(),
    )
}

/// ROUGE-L from the longest common token subsequence
pub fn rouge_l(reference: &str, candidate: &str) -> RougeScore {
    let reference_tokens = tokenize(reference);
    let candidate_tokens = tokenize(candidate);

    if reference_tokens.is_empty() || candidate_tokens.is_empty() {
        return RougeScore::uniform(tokenless_score(reference, candidate));
    }

    let lcs = lcs_length(&reference_tokens, &candidate_tokens);
    RougeScore::from_counts(lcs, candidate_tokens.len(), reference_tokens.len())
}

/// Longest common subsequence length, O(min(m, n)) memory
pub fn lcs_length<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let (short, long) = if a.len() < b.len() { (a, b) } else { (b, a) };

    let mut prev = vec![0usize; short.len() + 1];
    let mut curr = vec![0usize; short.len() + 1];

    for item in long {
        for j in 1..=short.len() {
            curr[j] = if *item == short[j - 1] {
                prev[j - 1] + 1
            } else {
                prev[j].max(curr[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}
