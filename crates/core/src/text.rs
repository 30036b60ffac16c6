//! Aligned ground-truth / generated text pairs

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One evaluation unit: a ground-truth text and the text generated for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPair {
    ground_truth: String,
    generated: String,
}

impl TextPair {
    /// Create a new pair
    pub fn new(ground_truth: impl Into<String>, generated: impl Into<String>) -> Self {
        Self {
            ground_truth: ground_truth.into(),
            generated: generated.into(),
        }
    }

    /// The reference text
    pub fn ground_truth(&self) -> &str {
        &self.ground_truth
    }

    /// The candidate text
    pub fn generated(&self) -> &str {
        &self.generated
    }
}

/// Zip two aligned sequences into pairs
///
/// Fails with [`Error::LengthMismatch`] when the sequences differ in length.
pub fn zip_pairs<G, C>(ground_truths: &[G], generations: &[C]) -> Result<Vec<TextPair>>
where
    G: AsRef<str>,
    C: AsRef<str>,
{
    if ground_truths.len() != generations.len() {
        return Err(Error::length_mismatch(
            ground_truths.len(),
            generations.len(),
        ));
    }

    Ok(ground_truths
        .iter()
        .zip(generations)
        .map(|(gt, generated)| TextPair::new(gt.as_ref(), generated.as_ref()))
        .collect())
}
