//! External model providers for model-based metrics
//!
//! This crate defines the call contracts for embedding, natural language
//! inference and text generation services, the HTTP and mock implementations
//! of those contracts, and the [`InferenceClient`] that metrics use to reach
//! them under a per-call timeout.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use ragas_core::config::ModelsConfig;
use ragas_core::error::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

mod chat;
pub mod error;
mod mock;
mod openai_embeddings;
pub mod provider;
pub mod usage;
mod vllm_nli;

pub use chat::ChatCompletionProvider;
pub use error::ModelError;
pub use mock::{MockEmbeddingProvider, MockGenerationProvider, MockNliProvider};
pub use openai_embeddings::OpenAiEmbeddingProvider;
pub use provider::{EmbeddingProvider, GenerationProvider, NliPair, NliProvider};
pub use usage::{TokenUsage, UsageMeter};
pub use vllm_nli::VllmNliProvider;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/v1";
const MOCK_EMBEDDING_DIM: usize = 256;
const API_KEY_ENV_VAR: &str = "RAGAS_API_KEY";

/// Handle to the external model services used by model-based metrics
///
/// Every call is bounded by the client's timeout and is never retried. A
/// failed or timed-out call surfaces as [`Error::ExternalModel`].
#[derive(Clone)]
pub struct InferenceClient {
    embeddings: Option<Arc<dyn EmbeddingProvider>>,
    nli: Option<Arc<dyn NliProvider>>,
    generation: Option<Arc<dyn GenerationProvider>>,
    timeout: Duration,
    q2_max_questions: usize,
    usage: Arc<UsageMeter>,
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("embeddings", &self.embeddings.is_some())
            .field("nli", &self.nli.is_some())
            .field("generation", &self.generation.is_some())
            .field("timeout", &self.timeout)
            .field("q2_max_questions", &self.q2_max_questions)
            .finish()
    }
}

impl InferenceClient {
    /// Create a client without any providers
    pub fn new(timeout: Duration) -> Self {
        Self {
            embeddings: None,
            nli: None,
            generation: None,
            timeout,
            q2_max_questions: 5,
            usage: Arc::new(UsageMeter::new()),
        }
    }

    pub fn with_embeddings(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embeddings = Some(provider);
        self
    }

    pub fn with_nli(mut self, provider: Arc<dyn NliProvider>) -> Self {
        self.nli = Some(provider);
        self
    }

    pub fn with_generation(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation = Some(provider);
        self
    }

    pub fn with_q2_max_questions(mut self, max_questions: usize) -> Self {
        self.q2_max_questions = max_questions;
        self
    }

    /// Share an existing usage meter, typically the one providers record into
    pub fn with_usage_meter(mut self, usage: Arc<UsageMeter>) -> Self {
        self.usage = usage;
        self
    }

    pub fn has_embeddings(&self) -> bool {
        self.embeddings.is_some()
    }

    pub fn has_nli(&self) -> bool {
        self.nli.is_some()
    }

    pub fn has_generation(&self) -> bool {
        self.generation.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn q2_max_questions(&self) -> usize {
        self.q2_max_questions
    }

    pub fn usage_meter(&self) -> Arc<UsageMeter> {
        Arc::clone(&self.usage)
    }

    /// Tokens recorded so far by providers sharing this client's meter
    pub fn usage(&self) -> TokenUsage {
        self.usage.snapshot()
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::external_model(format!(
                "{operation} call timed out after {:?}",
                self.timeout
            ))),
        }
    }

    /// Embed `texts` with the embedding provider
    pub async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let provider = self
            .embeddings
            .as_ref()
            .ok_or(ModelError::MissingProvider("embeddings"))?;
        let expected = texts.len();
        debug!("Embedding {expected} texts");

        let embeddings = self.bounded("Embeddings", provider.embed(texts)).await?;
        if embeddings.len() != expected {
            return Err(Error::external_model(format!(
                "Embedding provider returned {} vectors for {expected} texts",
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }

    /// Entailment probabilities for premise/hypothesis pairs
    pub async fn entailment(&self, pairs: &[NliPair]) -> Result<Vec<f32>> {
        let provider = self
            .nli
            .as_ref()
            .ok_or(ModelError::MissingProvider("NLI"))?;
        debug!("Scoring {} NLI pairs", pairs.len());

        let scores = self.bounded("NLI", provider.entailment(pairs)).await?;
        if scores.len() != pairs.len() {
            return Err(Error::external_model(format!(
                "NLI provider returned {} scores for {} pairs",
                scores.len(),
                pairs.len()
            )));
        }
        Ok(scores)
    }

    /// Complete a prompt with the generation provider
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let provider = self
            .generation
            .as_ref()
            .ok_or(ModelError::MissingProvider("generation"))?;
        self.bounded("Generation", provider.complete(prompt)).await
    }
}

fn resolve_api_key(configured: &Option<String>) -> Option<String> {
    configured
        .clone()
        .or_else(|| std::env::var(API_KEY_ENV_VAR).ok())
}

/// Create an inference client from the models configuration
///
/// Sections absent from the configuration leave the matching provider unset;
/// metrics needing it are rejected when the evaluator is built.
///
/// # Arguments
/// * `config` - Model service configuration including provider names
pub async fn create_inference_client(config: &ModelsConfig) -> Result<InferenceClient> {
    let usage = Arc::new(UsageMeter::new());
    let mut client = InferenceClient::new(Duration::from_secs(config.timeout_secs))
        .with_q2_max_questions(config.q2_max_questions)
        .with_usage_meter(Arc::clone(&usage));

    if let Some(ref embeddings) = config.embeddings {
        let provider: Arc<dyn EmbeddingProvider> = match embeddings.provider.as_str() {
            "openai" => {
                info!("Creating OpenAI-compatible embeddings provider");
                Arc::new(OpenAiEmbeddingProvider::new(
                    embeddings.model.clone(),
                    embeddings
                        .api_base_url
                        .clone()
                        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                    resolve_api_key(&embeddings.api_key),
                    Arc::clone(&usage),
                ))
            }
            "mock" => {
                info!("Creating mock embeddings provider");
                Arc::new(MockEmbeddingProvider::new(MOCK_EMBEDDING_DIM).with_usage(Arc::clone(&usage)))
            }
            other => {
                return Err(Error::config(format!(
                    "Unknown embeddings provider: '{other}'. Valid providers: openai, mock"
                )))
            }
        };
        client = client.with_embeddings(provider);
    }

    if let Some(ref nli) = config.nli {
        let provider: Arc<dyn NliProvider> = match nli.provider.as_str() {
            "vllm" => {
                info!("Creating vLLM NLI provider");
                let provider = VllmNliProvider::new(
                    nli.model.clone(),
                    nli.api_base_url
                        .clone()
                        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                    resolve_api_key(&nli.api_key),
                    config.timeout_secs,
                    Arc::clone(&usage),
                )?;

                // Perform health check (non-blocking)
                provider.check_health().await;

                Arc::new(provider)
            }
            "mock" => {
                info!("Creating mock NLI provider");
                Arc::new(MockNliProvider::new().with_usage(Arc::clone(&usage)))
            }
            other => {
                return Err(Error::config(format!(
                    "Unknown NLI provider: '{other}'. Valid providers: vllm, mock"
                )))
            }
        };
        client = client.with_nli(provider);
    }

    if let Some(ref generation) = config.generation {
        let provider: Arc<dyn GenerationProvider> = match generation.provider.as_str() {
            "openai" => {
                info!("Creating chat completions provider");
                Arc::new(ChatCompletionProvider::new(
                    generation.model.clone(),
                    generation
                        .api_base_url
                        .clone()
                        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                    resolve_api_key(&generation.api_key),
                    config.timeout_secs,
                    Arc::clone(&usage),
                )?)
            }
            "mock" => {
                info!("Creating mock generation provider");
                Arc::new(MockGenerationProvider::new().with_usage(Arc::clone(&usage)))
            }
            other => {
                return Err(Error::config(format!(
                    "Unknown generation provider: '{other}'. Valid providers: openai, mock"
                )))
            }
        };
        client = client.with_generation(provider);
    }

    Ok(client)
}
