//! Evaluation results

use ragas_core::error::Result;
use ragas_core::ErrorKind;
use ragas_models::TokenUsage;
use serde::Serialize;
use std::fmt;

/// Result of one metric over the evaluated pairs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricOutcome {
    /// Aggregated score; NaN when no pair produced a defined score
    Scalar(f64),
    /// One score per input pair, aligned with the input order
    PerExample(Vec<f64>),
    /// The metric could not be computed
    Failed { kind: ErrorKind, message: String },
}

impl MetricOutcome {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_per_example(&self) -> Option<&[f64]> {
        match self {
            Self::PerExample(values) => Some(values),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for MetricOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => write!(f, "{value:.4}"),
            Self::PerExample(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value:.4}")?;
                }
                write!(f, "]")
            }
            Self::Failed { kind, message } => write!(f, "failed ({kind}: {message})"),
        }
    }
}

/// One named entry of a [`ResultSet`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricEntry {
    pub name: String,
    pub outcome: MetricOutcome,
    /// Tokens spent by external model calls for this metric
    #[serde(skip_serializing_if = "TokenUsage::is_empty")]
    pub usage: TokenUsage,
}

/// Ordered mapping from metric name to outcome
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultSet {
    num_pairs: usize,
    entries: Vec<MetricEntry>,
}

impl ResultSet {
    pub(crate) fn new(num_pairs: usize) -> Self {
        Self {
            num_pairs,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, outcome: MetricOutcome, usage: TokenUsage) {
        self.entries.push(MetricEntry {
            name: name.into(),
            outcome,
            usage,
        });
    }

    /// Outcome of the named metric
    pub fn get(&self, name: &str) -> Option<&MetricOutcome> {
        self.entry(name).map(|entry| &entry.outcome)
    }

    /// Aggregated score of the named metric, if it produced one
    pub fn score(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(MetricOutcome::as_scalar)
    }

    pub fn usage(&self, name: &str) -> Option<&TokenUsage> {
        self.entry(name).map(|entry| &entry.usage)
    }

    /// Tokens spent across all metrics
    ///
    /// Fails when entries carry usage of different models.
    pub fn total_usage(&self) -> Result<TokenUsage> {
        self.entries
            .iter()
            .try_fold(TokenUsage::default(), |total, entry| total.try_add(&entry.usage))
    }

    fn entry(&self, name: &str) -> Option<&MetricEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn entries(&self) -> &[MetricEntry] {
        &self.entries
    }

    /// Metric names in configuration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|entry| entry.outcome.is_failed())
    }

    /// Number of evaluated text pairs
    pub fn num_pairs(&self) -> usize {
        self.num_pairs
    }

    /// Number of metric entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}': {}", entry.name, entry.outcome)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        let mut results = ResultSet::new(2);
        results.push("rouge_l", MetricOutcome::Scalar(0.5), TokenUsage::default());
        results.push(
            "levenshtein_distance",
            MetricOutcome::PerExample(vec![0.0, 3.0]),
            TokenUsage::default(),
        );
        results.push(
            "entailment_score",
            MetricOutcome::Failed {
                kind: ErrorKind::ExternalModelFailure,
                message: "timed out".to_string(),
            },
            TokenUsage::new(12, 0),
        );
        results
    }

    #[test]
    fn test_lookup() {
        let results = sample();
        assert_eq!(results.len(), 3);
        assert_eq!(results.num_pairs(), 2);
        assert_eq!(results.score("rouge_l"), Some(0.5));
        assert_eq!(results.score("levenshtein_distance"), None);
        assert_eq!(
            results.get("levenshtein_distance").and_then(MetricOutcome::as_per_example),
            Some(&[0.0, 3.0][..])
        );
        assert!(results.has_failures());
        assert_eq!(results.total_usage().unwrap(), TokenUsage::new(12, 0));
        assert!(results.get("bleu").is_none());
    }

    #[test]
    fn test_total_usage_rejects_mixed_models() {
        let mut results = sample();
        results.push(
            "q2",
            MetricOutcome::Scalar(1.0),
            TokenUsage {
                model: Some("gpt-4o-mini".to_string()),
                ..TokenUsage::new(3, 4)
            },
        );
        let err = results.total_usage().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample().to_string(),
            "{'rouge_l': 0.5000, 'levenshtein_distance': [0.0000, 3.0000], \
             'entailment_score': failed (external_model_failure: timed out)}"
        );
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["num_pairs"], 2);
        assert_eq!(json["entries"][0]["name"], "rouge_l");
        assert_eq!(json["entries"][0]["outcome"], 0.5);
        assert!(json["entries"][0].get("usage").is_none());
        assert_eq!(json["entries"][2]["outcome"]["kind"], "external_model_failure");
        assert_eq!(json["entries"][2]["usage"]["input_tokens"], 12);
    }
}
