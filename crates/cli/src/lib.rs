//! Library interface for the ragas CLI
//!
//! This module exposes internal functions for integration testing while keeping
//! the main binary logic in main.rs.

pub mod dataset;

pub use anyhow::Result;
pub use dataset::{load_dataset, parse_dataset, Dataset};

use anyhow::Context;
use ragas_core::config::{Config, ModelsConfig};
use ragas_evaluation::{EvaluationConfig, Evaluator, MetricRegistry};
use ragas_models::TokenUsage;
use tracing::info;

/// Build an evaluator for the metrics named in `config`
///
/// Model providers are only contacted when a configured metric needs one.
pub async fn create_evaluator(config: &Config, registry: &MetricRegistry) -> Result<Evaluator> {
    let evaluation = EvaluationConfig::from_settings(&config.evaluation, registry)
        .context("Failed to build evaluation configuration")?;

    let needs_models = evaluation
        .metrics()
        .iter()
        .any(|spec| spec.kind().is_model_based());

    let evaluator = if needs_models {
        info!("Connecting to model providers");
        let client = ragas_models::create_inference_client(&config.models)
            .await
            .context("Failed to create inference client")?;
        Evaluator::with_inference(evaluation, client)?
    } else {
        Evaluator::new(evaluation)?
    };

    Ok(evaluator)
}

/// Cost of `usage` at the configured token prices
///
/// `None` when no input token price is configured.
pub fn usage_cost(usage: &TokenUsage, models: &ModelsConfig) -> Option<f64> {
    models
        .input_token_price
        .map(|input_price| usage.cost(input_price, models.output_token_price))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_cost() {
        let usage = TokenUsage::new(1000, 500);
        let mut models = ModelsConfig::default();
        assert_eq!(usage_cost(&usage, &models), None);

        models.input_token_price = Some(0.001);
        assert!((usage_cost(&usage, &models).unwrap() - 1.5).abs() < 1e-12);

        models.output_token_price = Some(0.002);
        assert!((usage_cost(&usage, &models).unwrap() - 2.0).abs() < 1e-12);
    }
}
