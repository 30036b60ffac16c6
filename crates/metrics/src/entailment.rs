//! Entailment score from an NLI model

use ragas_core::error::Result;
use ragas_core::TextPair;
use ragas_models::{InferenceClient, NliPair};

/// Probability that each ground truth entails its generated text
///
/// Premise is the ground truth, hypothesis the generated text. All pairs go
/// to the provider in one call; scores are clamped into [0, 1].
pub async fn entailment_score(pairs: &[TextPair], client: &InferenceClient) -> Result<Vec<f64>> {
    if pairs.is_empty() {
        return Ok(Vec::new());
    }

    let nli_pairs: Vec<NliPair> = pairs
        .iter()
        .map(|pair| NliPair::new(pair.ground_truth(), pair.generated()))
        .collect();

    let scores = client.entailment(&nli_pairs).await?;
    Ok(scores
        .into_iter()
        .map(|score| f64::from(score).clamp(0.0, 1.0))
        .collect())
}
