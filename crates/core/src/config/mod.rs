//! Configuration module for ragas
//!
//! This module provides configuration structures and loading mechanisms for
//! evaluation runs. Configuration can be loaded from TOML files and/or environment
//! variables.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.ragas/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".ragas").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Which metrics to run and how to batch them
    #[serde(default)]
    pub evaluation: EvaluationSettings,

    /// External model services used by model-based metrics
    #[serde(default)]
    pub models: ModelsConfig,
}

/// Evaluation run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSettings {
    /// Metric names, evaluated in this order
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,

    /// Whether pairs are processed in chunks of `batch_size`
    #[serde(default = "default_batched")]
    pub batched: bool,

    /// Chunk size when `batched` is set
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Metrics reported per example instead of averaged
    #[serde(default)]
    pub per_example: Vec<String>,
}

/// External model services
///
/// Each service is optional; model-based metrics require the matching one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Timeout applied to every external model invocation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on questions generated per pair by Q²
    #[serde(default = "default_q2_max_questions")]
    pub q2_max_questions: usize,

    /// Token embedding service (BERTScore)
    #[serde(default)]
    pub embeddings: Option<EmbeddingsModelConfig>,

    /// Natural language inference service (entailment score, Q²)
    #[serde(default)]
    pub nli: Option<NliModelConfig>,

    /// Text generation service (Q² question generation and answering)
    #[serde(default)]
    pub generation: Option<GenerationModelConfig>,

    /// Price per input token, used to report what an evaluation cost
    #[serde(default)]
    pub input_token_price: Option<f64>,

    /// Price per output token (defaults to the input price)
    #[serde(default)]
    pub output_token_price: Option<f64>,
}

/// Configuration for the embeddings service
///
/// # Providers
/// - `openai` (default): OpenAI-compatible `/embeddings` API (vLLM, TEI, OpenAI)
/// - `mock`: deterministic hashed embeddings for testing
#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingsModelConfig {
    #[serde(default = "default_embeddings_provider")]
    pub provider: String,

    #[serde(default = "default_embeddings_model")]
    pub model: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: Option<String>,

    /// API key (or use RAGAS_API_KEY env var)
    pub api_key: Option<String>,
}

/// Configuration for the NLI service
///
/// # Providers
/// - `vllm` (default): vLLM-compatible `/score` API serving an NLI cross-encoder
/// - `mock`: token-overlap entailment for testing
#[derive(Clone, Serialize, Deserialize)]
pub struct NliModelConfig {
    #[serde(default = "default_nli_provider")]
    pub provider: String,

    #[serde(default = "default_nli_model")]
    pub model: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: Option<String>,

    /// API key (or use RAGAS_API_KEY env var)
    pub api_key: Option<String>,
}

/// Configuration for the text generation service
///
/// # Providers
/// - `openai` (default): OpenAI-compatible `/chat/completions` API
/// - `mock`: answers every prompt with `[]` (no Q² questions), for testing
#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationModelConfig {
    #[serde(default = "default_generation_provider")]
    pub provider: String,

    #[serde(default = "default_generation_model")]
    pub model: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: Option<String>,

    /// API key (or use RAGAS_API_KEY env var)
    pub api_key: Option<String>,
}

macro_rules! redacted_debug {
    ($ty:ident) => {
        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("provider", &self.provider)
                    .field("model", &self.model)
                    .field("api_base_url", &self.api_base_url)
                    .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
                    .finish()
            }
        }
    };
}

redacted_debug!(EmbeddingsModelConfig);
redacted_debug!(NliModelConfig);
redacted_debug!(GenerationModelConfig);

// Default implementations

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            metrics: default_metrics(),
            batched: default_batched(),
            batch_size: default_batch_size(),
            per_example: Vec::new(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            q2_max_questions: default_q2_max_questions(),
            embeddings: None,
            nli: None,
            generation: None,
            input_token_price: None,
            output_token_price: None,
        }
    }
}

impl Default for EmbeddingsModelConfig {
    fn default() -> Self {
        Self {
            provider: default_embeddings_provider(),
            model: default_embeddings_model(),
            api_base_url: default_api_base_url(),
            api_key: None,
        }
    }
}

impl Default for NliModelConfig {
    fn default() -> Self {
        Self {
            provider: default_nli_provider(),
            model: default_nli_model(),
            api_base_url: default_api_base_url(),
            api_key: None,
        }
    }
}

impl Default for GenerationModelConfig {
    fn default() -> Self {
        Self {
            provider: default_generation_provider(),
            model: default_generation_model(),
            api_base_url: default_api_base_url(),
            api_key: None,
        }
    }
}

fn validate_provider(section: &str, provider: &str, valid: &[&str]) -> Result<()> {
    if !valid.contains(&provider) {
        return Err(Error::config(format!(
            "Invalid {section} provider '{provider}'. Must be one of: {valid:?}"
        )));
    }
    Ok(())
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.evaluation.metrics.is_empty() {
            return Err(Error::invalid_config(
                "evaluation.metrics must name at least one metric".to_string(),
            ));
        }

        if self.evaluation.batched && self.evaluation.batch_size == 0 {
            return Err(Error::invalid_config(
                "evaluation.batch_size must be greater than 0 when batched".to_string(),
            ));
        }
        if self.evaluation.batch_size > 10_000 {
            return Err(Error::config(format!(
                "evaluation.batch_size too large (max 10000, got {})",
                self.evaluation.batch_size
            )));
        }

        for name in &self.evaluation.per_example {
            if !self.evaluation.metrics.contains(name) {
                return Err(Error::config(format!(
                    "evaluation.per_example names '{name}' which is not in evaluation.metrics"
                )));
            }
        }

        if self.models.timeout_secs == 0 {
            return Err(Error::config(
                "models.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.models.q2_max_questions == 0 || self.models.q2_max_questions > 20 {
            return Err(Error::config(format!(
                "models.q2_max_questions must be between 1 and 20 (got {})",
                self.models.q2_max_questions
            )));
        }

        for (field, price) in [
            ("input_token_price", self.models.input_token_price),
            ("output_token_price", self.models.output_token_price),
        ] {
            if price.is_some_and(|p| !p.is_finite() || p < 0.0) {
                return Err(Error::config(format!(
                    "models.{field} must be a non-negative number"
                )));
            }
        }
        if self.models.output_token_price.is_some() && self.models.input_token_price.is_none() {
            return Err(Error::config(
                "models.output_token_price requires models.input_token_price".to_string(),
            ));
        }

        if let Some(ref embeddings) = self.models.embeddings {
            validate_provider("embeddings", &embeddings.provider, &["openai", "mock"])?;
        }
        if let Some(ref nli) = self.models.nli {
            validate_provider("nli", &nli.provider, &["vllm", "mock"])?;
        }
        if let Some(ref generation) = self.models.generation {
            validate_provider("generation", &generation.provider, &["openai", "mock"])?;
        }

        Ok(())
    }

    /// Saves the configuration to a TOML file
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, toml_string)
            .map_err(|e| Error::config(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}
