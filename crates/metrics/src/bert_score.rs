//! BERTScore over provider token embeddings

use crate::tokenizer::{f1, tokenize};
use ragas_core::error::Result;
use ragas_core::TextPair;
use ragas_models::InferenceClient;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Greedy-matching precision, recall and F1, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BertScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Score every pair with a single embedding call
///
/// Tokens are embedded once per distinct token across the whole batch. Each
/// candidate token is matched to its most similar reference token
/// (precision) and vice versa (recall). A pair with no tokens on either side
/// scores 0.
pub async fn bert_score(pairs: &[TextPair], client: &InferenceClient) -> Result<Vec<BertScore>> {
    let tokenized: Vec<(Vec<String>, Vec<String>)> = pairs
        .iter()
        .map(|pair| (tokenize(pair.ground_truth()), tokenize(pair.generated())))
        .collect();

    let mut vocabulary: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (reference, candidate) in &tokenized {
        if reference.is_empty() || candidate.is_empty() {
            continue;
        }
        for token in reference.iter().chain(candidate) {
            if !index.contains_key(token) {
                index.insert(token.clone(), vocabulary.len());
                vocabulary.push(token.clone());
            }
        }
    }

    if vocabulary.is_empty() {
        return Ok(vec![BertScore::default(); pairs.len()]);
    }

    debug!(
        "Embedding {} distinct tokens for {} pairs",
        vocabulary.len(),
        pairs.len()
    );
    let embeddings = client.embed(vocabulary).await?;

    Ok(tokenized
        .iter()
        .map(|(reference, candidate)| {
            greedy_match(
                &lookup(reference, &index, &embeddings),
                &lookup(candidate, &index, &embeddings),
            )
        })
        .collect())
}

fn lookup<'e>(
    tokens: &[String],
    index: &HashMap<String, usize>,
    embeddings: &'e [Vec<f32>],
) -> Vec<&'e [f32]> {
    tokens
        .iter()
        .filter_map(|t| index.get(t).and_then(|&i| embeddings.get(i)))
        .map(Vec::as_slice)
        .collect()
}

fn greedy_match(reference: &[&[f32]], candidate: &[&[f32]]) -> BertScore {
    if reference.is_empty() || candidate.is_empty() {
        return BertScore::default();
    }

    let best_average = |from: &[&[f32]], to: &[&[f32]]| -> f64 {
        from.iter()
            .map(|a| {
                to.iter()
                    .map(|b| cosine_similarity(a, b))
                    .fold(f64::NEG_INFINITY, f64::max)
            })
            .sum::<f64>()
            / from.len() as f64
    };

    let precision = best_average(candidate, reference).clamp(0.0, 1.0);
    let recall = best_average(reference, candidate).clamp(0.0, 1.0);

    BertScore {
        precision,
        recall,
        f1: f1(precision, recall).clamp(0.0, 1.0),
    }
}

/// Cosine similarity, 0 for mismatched or zero-norm vectors
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if norm_a < 1e-10 || norm_b < 1e-10 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
