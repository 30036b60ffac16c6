//! vLLM-compatible NLI provider
//!
//! Talks to the `/score` endpoint of a vLLM server hosting a cross-encoder
//! trained for entailment. `text_1` carries premises, `text_2` hypotheses.

use crate::error::ModelError;
use crate::provider::{NliPair, NliProvider};
use crate::usage::UsageMeter;
use async_trait::async_trait;
use ragas_core::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request payload for vLLM score API
#[derive(Debug, Serialize)]
struct ScoreRequest {
    model: String,
    text_1: Vec<String>,
    text_2: Vec<String>,
}

/// Response from vLLM score API
#[derive(Debug, Deserialize)]
struct ScoreResponse {
    data: Vec<ScoreResult>,
    #[serde(default)]
    usage: Option<ScoreUsage>,
}

/// Individual score result
#[derive(Debug, Deserialize)]
struct ScoreResult {
    index: usize,
    score: f32,
}

#[derive(Debug, Deserialize)]
struct ScoreUsage {
    #[serde(default)]
    prompt_tokens: u64,
}

/// vLLM-compatible NLI provider
pub struct VllmNliProvider {
    client: Client,
    model: String,
    api_base_url: String,
    api_key: Option<String>,
    usage: Arc<UsageMeter>,
}

impl VllmNliProvider {
    /// Create a new vLLM NLI provider
    ///
    /// # Arguments
    /// * `model` - Model name (e.g., "cross-encoder/nli-deberta-v3-base")
    /// * `api_base_url` - Base URL for the vLLM API (e.g., "http://localhost:8000/v1")
    /// * `api_key` - Optional bearer token
    /// * `timeout_secs` - Request timeout in seconds
    /// * `usage` - Meter receiving prompt token counts
    pub fn new(
        model: String,
        api_base_url: String,
        api_key: Option<String>,
        timeout_secs: u64,
        usage: Arc<UsageMeter>,
    ) -> Result<Self> {
        info!("Initializing vLLM NLI provider");
        info!("  Model: {model}");
        info!("  API Base URL: {api_base_url}");
        info!("  Timeout: {timeout_secs}s");

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ModelError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_key,
            usage,
        })
    }

    /// Check if the NLI API is healthy (non-blocking, warns on failure)
    pub async fn check_health(&self) {
        debug!("Checking NLI API health");

        let models_url = format!("{}/models", self.api_base_url);
        match self.client.get(&models_url).send().await {
            Ok(response) if response.status().is_success() => {
                info!("NLI API health check passed");
            }
            Ok(response) => {
                warn!(
                    "NLI API health check failed with status: {}",
                    response.status()
                );
                warn!("  The vLLM NLI service may not be running or still starting up.");
            }
            Err(e) => {
                warn!("NLI API health check failed: {e}");
                warn!("  The vLLM NLI service may not be running or still starting up.");
            }
        }
    }
}

/// Truncate text to approximately fit within the model's context
///
/// Uses a conservative estimate of ~4 characters per token against a 512 token
/// cross-encoder window shared by premise and hypothesis.
fn truncate_for_scoring(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

const MAX_TEXT_CHARS: usize = 1_000;

/// Place scores back into request order, rejecting missing or out-of-range indices
fn scores_in_request_order(results: Vec<ScoreResult>, expected: usize) -> Result<Vec<f32>> {
    let mut scores: Vec<Option<f32>> = vec![None; expected];
    for result in results {
        match scores.get_mut(result.index) {
            Some(slot) => *slot = Some(result.score),
            None => {
                return Err(ModelError::InvalidResponse(format!(
                    "Score API returned out-of-bounds index {}",
                    result.index
                ))
                .into())
            }
        }
    }

    scores
        .into_iter()
        .enumerate()
        .map(|(i, score)| {
            score.ok_or_else(|| {
                Error::from(ModelError::InvalidResponse(format!(
                    "Score API returned no score for pair {i}"
                )))
            })
        })
        .collect()
}

#[async_trait]
impl NliProvider for VllmNliProvider {
    async fn entailment(&self, pairs: &[NliPair]) -> Result<Vec<f32>> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let (premises, hypotheses): (Vec<String>, Vec<String>) = pairs
            .iter()
            .map(|pair| {
                (
                    truncate_for_scoring(&pair.premise, MAX_TEXT_CHARS),
                    truncate_for_scoring(&pair.hypothesis, MAX_TEXT_CHARS),
                )
            })
            .unzip();

        let request = ScoreRequest {
            model: self.model.clone(),
            text_1: premises,
            text_2: hypotheses,
        };

        let score_url = format!("{}/score", self.api_base_url);

        debug!("Sending score request for {} pairs", pairs.len());

        let mut builder = self.client.post(&score_url).json(&request);
        if let Some(ref api_key) = self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ModelError::InferenceError(format!("Score API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(ModelError::InferenceError(format!(
                "Score API returned error {status}: {error_text}"
            ))
            .into());
        }

        let score_response: ScoreResponse = response.json().await.map_err(|e| {
            ModelError::InvalidResponse(format!("Failed to parse score response: {e}"))
        })?;

        if let Some(usage) = score_response.usage {
            self.usage.record(usage.prompt_tokens, 0);
        }

        scores_in_request_order(score_response.data, pairs.len())
    }
}
