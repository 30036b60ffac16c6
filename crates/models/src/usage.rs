//! Token accounting for external model calls

use ragas_core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Tokens consumed by one or more model calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            model: None,
        }
    }

    /// Total tokens in both directions
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Sum two usages; usages of different models cannot be added
    pub fn try_add(&self, other: &TokenUsage) -> Result<TokenUsage> {
        if self.model != other.model {
            return Err(Error::invalid_input(format!(
                "Cannot add token usage of model {:?} to model {:?}",
                other.model, self.model
            )));
        }
        Ok(TokenUsage {
            input_tokens: self.input_tokens + other.input_tokens,
            output_tokens: self.output_tokens + other.output_tokens,
            model: self.model.clone(),
        })
    }

    /// Usage accumulated since an earlier snapshot of the same counter
    pub fn since(&self, earlier: &TokenUsage) -> TokenUsage {
        TokenUsage {
            input_tokens: self.input_tokens.saturating_sub(earlier.input_tokens),
            output_tokens: self.output_tokens.saturating_sub(earlier.output_tokens),
            model: self.model.clone(),
        }
    }

    /// Monetary cost given per-token prices
    ///
    /// Output tokens are priced like input tokens when no output price is given.
    pub fn cost(&self, cost_per_input_token: f64, cost_per_output_token: Option<f64>) -> f64 {
        let per_output = cost_per_output_token.unwrap_or(cost_per_input_token);
        self.input_tokens as f64 * cost_per_input_token + self.output_tokens as f64 * per_output
    }
}

/// Shared counter that providers record usage into
#[derive(Debug, Default)]
pub struct UsageMeter {
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
}

impl UsageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, input_tokens: u64, output_tokens: u64) {
        self.input_tokens.fetch_add(input_tokens, Ordering::Relaxed);
        self.output_tokens
            .fetch_add(output_tokens, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TokenUsage {
        TokenUsage::new(
            self.input_tokens.load(Ordering::Relaxed),
            self.output_tokens.load(Ordering::Relaxed),
        )
    }
}
