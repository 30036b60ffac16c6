//! OpenAI-compatible API provider for embeddings (vLLM, TEI, OpenAI, etc.)

use crate::{error::ModelError, provider::EmbeddingProvider, usage::UsageMeter};
use async_openai::types::{CreateEmbeddingRequest, EmbeddingInput};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use ragas_core::error::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum texts sent in one `/embeddings` request
const MAX_TEXTS_PER_REQUEST: usize = 256;

/// OpenAI-compatible embeddings provider
pub struct OpenAiEmbeddingProvider {
    client: Client<OpenAIConfig>,
    model: String,
    usage: Arc<UsageMeter>,
}

impl OpenAiEmbeddingProvider {
    /// Create a new provider
    ///
    /// # Arguments
    /// * `model` - Model name (e.g., "BAAI/bge-small-en-v1.5")
    /// * `api_base_url` - Base URL of the API (e.g., "http://localhost:8000/v1")
    /// * `api_key` - Optional bearer token
    /// * `usage` - Meter receiving prompt token counts
    pub fn new(
        model: String,
        api_base_url: String,
        api_key: Option<String>,
        usage: Arc<UsageMeter>,
    ) -> Self {
        info!("Initializing OpenAI-compatible embeddings provider");
        info!("  Model: {model}");
        info!("  Base URL: {api_base_url}");

        let mut openai_config = OpenAIConfig::new().with_api_base(&api_base_url);
        if let Some(ref api_key) = api_key {
            openai_config = openai_config.with_api_key(api_key);
        }

        Self {
            client: Client::with_config(openai_config),
            model,
            usage,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(MAX_TEXTS_PER_REQUEST) {
            let request = CreateEmbeddingRequest {
                model: self.model.clone(),
                input: EmbeddingInput::StringArray(batch.to_vec()),
                encoding_format: None,
                dimensions: None,
                user: None,
            };

            debug!("Sending embeddings request for {} texts", batch.len());

            let response = self.client.embeddings().create(request).await.map_err(|e| {
                ModelError::InferenceError(format!("Embeddings API request failed: {e}"))
            })?;

            self.usage
                .record(u64::from(response.usage.prompt_tokens), 0);

            if response.data.len() != batch.len() {
                return Err(ModelError::InvalidResponse(format!(
                    "Embeddings API returned {} vectors for {} texts",
                    response.data.len(),
                    batch.len()
                ))
                .into());
            }

            // Sort by index, the API does not guarantee order
            let mut sorted: Vec<(usize, Vec<f32>)> = response
                .data
                .into_iter()
                .map(|emb| (emb.index as usize, emb.embedding))
                .collect();
            sorted.sort_by_key(|(idx, _)| *idx);

            all_embeddings.extend(sorted.into_iter().map(|(_, embedding)| embedding));
        }

        Ok(all_embeddings)
    }
}
