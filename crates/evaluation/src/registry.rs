//! Named metric registry

use ragas_core::error::{Error, Result};
use ragas_metrics::{MetricKind, MetricSpec};

/// Collection of metrics addressable by unique name, in registration order
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    metrics: Vec<MetricSpec>,
}

impl MetricRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in metric under its canonical name
    pub fn with_builtin_metrics() -> Self {
        let metrics = [
            MetricKind::LevenshteinDistance,
            MetricKind::LevenshteinRatio,
            MetricKind::RougeN { n: 1 },
            MetricKind::RougeN { n: 2 },
            MetricKind::RougeL,
            MetricKind::Bleu {
                max_order: ragas_metrics::bleu::DEFAULT_MAX_ORDER,
            },
            MetricKind::BertScore,
            MetricKind::EntailmentScore,
            MetricKind::Q2,
        ]
        .into_iter()
        .map(MetricSpec::new)
        .collect();

        Self { metrics }
    }

    /// Add a metric; fails with [`Error::DuplicateName`] if the name is taken
    pub fn register(&mut self, spec: MetricSpec) -> Result<()> {
        if self.contains(spec.name()) {
            return Err(Error::duplicate_name(spec.name()));
        }
        self.metrics.push(spec);
        Ok(())
    }

    /// Find a metric by name; fails with [`Error::UnknownMetric`] if absent
    pub fn lookup(&self, name: &str) -> Result<&MetricSpec> {
        self.metrics
            .iter()
            .find(|spec| spec.name() == name)
            .ok_or_else(|| Error::unknown_metric(name))
    }

    /// Look up several names in order, stopping at the first unknown one
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<MetricSpec>> {
        names
            .iter()
            .map(|name| self.lookup(name.as_ref()).cloned())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.iter().any(|spec| spec.name() == name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.metrics.iter().map(MetricSpec::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricSpec> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
