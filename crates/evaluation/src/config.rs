//! Validated evaluation configuration

use crate::registry::MetricRegistry;
use ragas_core::config::EvaluationSettings;
use ragas_core::error::{Error, Result};
use ragas_metrics::{Aggregator, MetricSpec};
use std::collections::HashSet;

/// Ordered metrics plus batching, checked on construction
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    metrics: Vec<MetricSpec>,
    batched: bool,
    batch_size: usize,
}

impl EvaluationConfig {
    /// Build a configuration
    ///
    /// Fails with [`Error::InvalidConfig`] when no metric is given or when
    /// batching is enabled with a zero batch size, and with
    /// [`Error::DuplicateName`] when two metrics share a name. `batch_size` is
    /// ignored unless `batched` is set.
    pub fn new(metrics: Vec<MetricSpec>, batched: bool, batch_size: usize) -> Result<Self> {
        if metrics.is_empty() {
            return Err(Error::invalid_config(
                "at least one metric must be configured".to_string(),
            ));
        }
        if batched && batch_size == 0 {
            return Err(Error::invalid_config(
                "batch_size must be greater than 0 when batched".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for spec in &metrics {
            if !seen.insert(spec.name()) {
                return Err(Error::duplicate_name(spec.name()));
            }
        }

        Ok(Self {
            metrics,
            batched,
            batch_size,
        })
    }

    /// Score one pair at a time
    pub fn unbatched(metrics: Vec<MetricSpec>) -> Result<Self> {
        Self::new(metrics, false, 0)
    }

    /// Score in chunks of `batch_size` pairs
    pub fn batched(metrics: Vec<MetricSpec>, batch_size: usize) -> Result<Self> {
        Self::new(metrics, true, batch_size)
    }

    /// Build from loaded settings, resolving metric names against `registry`
    ///
    /// Metrics listed in `per_example` report per-example scores instead of a
    /// mean.
    pub fn from_settings(settings: &EvaluationSettings, registry: &MetricRegistry) -> Result<Self> {
        for name in &settings.per_example {
            if !settings.metrics.contains(name) {
                return Err(Error::invalid_config(format!(
                    "per-example metric '{name}' is not among the configured metrics"
                )));
            }
        }

        let metrics = registry
            .resolve(&settings.metrics)?
            .into_iter()
            .map(|spec| {
                if settings.per_example.iter().any(|name| name == spec.name()) {
                    spec.with_aggregator(Aggregator::Identity)
                } else {
                    spec
                }
            })
            .collect();

        Self::new(metrics, settings.batched, settings.batch_size)
    }

    pub fn metrics(&self) -> &[MetricSpec] {
        &self.metrics
    }

    pub fn is_batched(&self) -> bool {
        self.batched
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}
