//! Trait definitions for model providers
//!
//! Model-based metrics never talk to a model directly; they go through one of
//! these traits, whether the implementation is a remote API or a mock.

use async_trait::async_trait;
use ragas_core::error::Result;

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate one embedding per input text, in input order
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;
}

/// A premise/hypothesis pair for natural language inference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NliPair {
    pub premise: String,
    pub hypothesis: String,
}

impl NliPair {
    pub fn new(premise: impl Into<String>, hypothesis: impl Into<String>) -> Self {
        Self {
            premise: premise.into(),
            hypothesis: hypothesis.into(),
        }
    }
}

/// Trait for natural language inference providers
#[async_trait]
pub trait NliProvider: Send + Sync {
    /// Probability that each premise entails its hypothesis
    ///
    /// # Returns
    /// One score per pair, in input order. Callers clamp scores into [0, 1].
    async fn entailment(&self, pairs: &[NliPair]) -> Result<Vec<f32>>;
}

/// Trait for text generation providers
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Complete a single user prompt deterministically (temperature ~0)
    async fn complete(&self, prompt: &str) -> Result<String>;
}
