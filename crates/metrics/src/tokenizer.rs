//! Word tokenizer for n-gram metrics

use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

/// Tokenizer shared by ROUGE, BLEU, BERTScore and answer comparison
///
/// Tokenization strategy:
/// 1. Split on Unicode word boundaries (punctuation and whitespace dropped)
/// 2. Normalize to lowercase
/// 3. Filter empty tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        Self
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(str::to_lowercase)
            .filter(|token| !token.is_empty())
            .collect()
    }
}

/// Tokenize with the default [`WordTokenizer`]
pub fn tokenize(text: &str) -> Vec<String> {
    WordTokenizer::new().tokenize(text)
}

/// Count every contiguous n-gram of `tokens`
///
/// Returns an empty map when `n` is zero or exceeds the token count.
pub fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if n == 0 {
        return counts;
    }
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Number of candidate n-grams also present in the reference, each clipped
/// to its reference count
pub fn clipped_overlap<'a>(
    reference: &HashMap<&'a [String], usize>,
    candidate: &HashMap<&'a [String], usize>,
) -> usize {
    candidate
        .iter()
        .map(|(ngram, count)| (*count).min(reference.get(ngram).copied().unwrap_or(0)))
        .sum()
}

/// Harmonic mean of precision and recall, 0 when both are 0
pub(crate) fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// Score for a comparison where at least one side has no word tokens
///
/// Identical non-empty texts (for example `"!!!"` against `"!!!"`) score 1,
/// anything else 0.
pub(crate) fn tokenless_score(reference: &str, candidate: &str) -> f64 {
    if !reference.is_empty() && reference == candidate {
        1.0
    } else {
        0.0
    }
}
