//! Metric kinds and specifications

use crate::bert_score::bert_score;
use crate::bleu::{bleu, DEFAULT_MAX_ORDER};
use crate::entailment::entailment_score;
use crate::levenshtein::{levenshtein_distance, levenshtein_ratio};
use crate::q2::q2;
use crate::rouge::{rouge_l, rouge_n};
use ragas_core::error::{Error, Result};
use ragas_core::TextPair;
use ragas_models::InferenceClient;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The closed set of scoring functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    LevenshteinDistance,
    LevenshteinRatio,
    RougeN { n: usize },
    RougeL,
    Bleu { max_order: usize },
    BertScore,
    EntailmentScore,
    Q2,
}

/// External model capability a metric depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRequirement {
    Embeddings,
    Nli,
    Generation,
}

impl fmt::Display for ModelRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embeddings => write!(f, "embeddings"),
            Self::Nli => write!(f, "nli"),
            Self::Generation => write!(f, "generation"),
        }
    }
}

impl ModelRequirement {
    /// Whether `client` has a provider for this capability
    pub fn is_met_by(&self, client: &InferenceClient) -> bool {
        match self {
            Self::Embeddings => client.has_embeddings(),
            Self::Nli => client.has_nli(),
            Self::Generation => client.has_generation(),
        }
    }
}

impl MetricKind {
    /// Whether one invocation can score many pairs
    pub fn supports_batch(&self) -> bool {
        matches!(self, Self::BertScore | Self::EntailmentScore)
    }

    pub fn range(&self) -> ScoreRange {
        match self {
            Self::LevenshteinDistance => ScoreRange::NonNegativeInteger,
            _ => ScoreRange::UnitInterval,
        }
    }

    /// Model providers the metric needs
    pub fn requirements(&self) -> &'static [ModelRequirement] {
        match self {
            Self::BertScore => &[ModelRequirement::Embeddings],
            Self::EntailmentScore => &[ModelRequirement::Nli],
            Self::Q2 => &[ModelRequirement::Generation, ModelRequirement::Nli],
            _ => &[],
        }
    }

    pub fn is_model_based(&self) -> bool {
        !self.requirements().is_empty()
    }

    fn score_local(&self, pair: &TextPair) -> Option<f64> {
        let (reference, candidate) = (pair.ground_truth(), pair.generated());
        let score = match *self {
            Self::LevenshteinDistance => levenshtein_distance(reference, candidate) as f64,
            Self::LevenshteinRatio => levenshtein_ratio(reference, candidate),
            Self::RougeN { n } => rouge_n(reference, candidate, n).f1,
            Self::RougeL => rouge_l(reference, candidate).f1,
            Self::Bleu { max_order } => bleu(reference, candidate, max_order),
            Self::BertScore | Self::EntailmentScore | Self::Q2 => return None,
        };
        Some(score)
    }

    /// Score `pairs` in one invocation, returning one score per pair in order
    ///
    /// Local metrics ignore `client`. Model-based metrics fail with
    /// [`Error::InvalidConfig`] when it is absent.
    pub async fn score_batch(
        &self,
        pairs: &[TextPair],
        client: Option<&InferenceClient>,
    ) -> Result<Vec<f64>> {
        if !self.is_model_based() {
            return Ok(pairs
                .iter()
                .filter_map(|pair| self.score_local(pair))
                .collect());
        }

        let client = client.ok_or_else(|| {
            Error::invalid_config(format!("Metric '{self}' requires an inference client"))
        })?;

        match self {
            Self::BertScore => Ok(bert_score(pairs, client)
                .await?
                .into_iter()
                .map(|score| score.f1)
                .collect()),
            Self::EntailmentScore => entailment_score(pairs, client).await,
            _ => {
                let mut scores = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    scores.push(q2(pair, client).await?);
                }
                Ok(scores)
            }
        }
    }

    /// Score a single pair
    pub async fn score(&self, pair: &TextPair, client: Option<&InferenceClient>) -> Result<f64> {
        let scores = self
            .score_batch(std::slice::from_ref(pair), client)
            .await?;
        scores.into_iter().next().ok_or_else(|| {
            Error::external_model(format!("Metric '{self}' produced no score"))
        })
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevenshteinDistance => write!(f, "levenshtein_distance"),
            Self::LevenshteinRatio => write!(f, "levenshtein_ratio"),
            Self::RougeN { n } => write!(f, "rouge_{n}"),
            Self::RougeL => write!(f, "rouge_l"),
            Self::Bleu { max_order } if *max_order == DEFAULT_MAX_ORDER => write!(f, "bleu"),
            Self::Bleu { max_order } => write!(f, "bleu_{max_order}"),
            Self::BertScore => write!(f, "bert_score"),
            Self::EntailmentScore => write!(f, "entailment_score"),
            Self::Q2 => write!(f, "q2"),
        }
    }
}

impl FromStr for MetricKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s {
            "levenshtein_distance" => Self::LevenshteinDistance,
            "levenshtein_ratio" => Self::LevenshteinRatio,
            "rouge_l" => Self::RougeL,
            "bleu" => Self::Bleu {
                max_order: DEFAULT_MAX_ORDER,
            },
            "bert_score" => Self::BertScore,
            "entailment_score" => Self::EntailmentScore,
            "q2" => Self::Q2,
            other => {
                if let Some(n) = parse_order(other, "rouge_") {
                    Self::RougeN { n }
                } else if let Some(max_order) = parse_order(other, "bleu_") {
                    Self::Bleu { max_order }
                } else {
                    return Err(Error::unknown_metric(other));
                }
            }
        };
        Ok(kind)
    }
}

fn parse_order(name: &str, prefix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?
        .parse::<usize>()
        .ok()
        .filter(|order| *order > 0)
}

impl Serialize for MetricKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Value domain of a metric's per-pair scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRange {
    /// Real number in [0, 1]; NaN marks an undefined score
    UnitInterval,
    /// Integer count such as an edit distance
    NonNegativeInteger,
}

/// How per-pair scores become a result entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregator {
    /// Arithmetic mean, skipping NaN scores
    #[default]
    Mean,
    /// Per-example scores passed through unchanged
    Identity,
}

/// Mean of the non-NaN values; NaN when there are none
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// A named, configured metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSpec {
    name: String,
    kind: MetricKind,
    supports_batch: bool,
    range: ScoreRange,
    aggregator: Aggregator,
}

impl MetricSpec {
    /// Spec named after its kind's canonical name
    pub fn new(kind: MetricKind) -> Self {
        Self::named(kind.to_string(), kind)
    }

    pub fn named(name: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            kind,
            supports_batch: kind.supports_batch(),
            range: kind.range(),
            aggregator: Aggregator::default(),
        }
    }

    pub fn with_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Override batch capability; enabling it on a per-pair kind has no effect
    pub fn with_batch_support(mut self, supports_batch: bool) -> Self {
        self.supports_batch = supports_batch && self.kind.supports_batch();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn supports_batch(&self) -> bool {
        self.supports_batch
    }

    pub fn range(&self) -> ScoreRange {
        self.range
    }

    pub fn aggregator(&self) -> Aggregator {
        self.aggregator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ragas_core::ErrorKind;

    #[test]
    fn test_name_round_trip() {
        for name in [
            "levenshtein_distance",
            "levenshtein_ratio",
            "rouge_1",
            "rouge_3",
            "rouge_l",
            "bleu",
            "bleu_2",
            "bert_score",
            "entailment_score",
            "q2",
        ] {
            assert_eq!(MetricKind::from_str(name).unwrap().to_string(), name);
        }
        assert_eq!(
            MetricKind::from_str("bleu_4").unwrap(),
            MetricKind::Bleu { max_order: 4 }
        );
    }

    #[test]
    fn test_unknown_names() {
        for name in ["rouge_0", "rouge_x", "bleu_", "meteor", ""] {
            let err = MetricKind::from_str(name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnknownMetric, "{name}");
        }
    }

    #[test]
    fn test_kind_properties() {
        assert!(MetricKind::BertScore.supports_batch());
        assert!(!MetricKind::Q2.supports_batch());
        assert!(!MetricKind::RougeL.is_model_based());
        assert_eq!(
            MetricKind::LevenshteinDistance.range(),
            ScoreRange::NonNegativeInteger
        );
        assert_eq!(
            MetricKind::Q2.requirements(),
            &[ModelRequirement::Generation, ModelRequirement::Nli]
        );
    }

    #[test]
    fn test_nan_mean() {
        assert_eq!(nan_mean(&[1.0, f64::NAN, 0.0]), 0.5);
        assert!(nan_mean(&[f64::NAN]).is_nan());
        assert!(nan_mean(&[]).is_nan());
    }

    #[test]
    fn test_spec_batch_override() {
        let spec = MetricSpec::new(MetricKind::EntailmentScore).with_batch_support(false);
        assert!(!spec.supports_batch());
        let spec = MetricSpec::new(MetricKind::RougeL).with_batch_support(true);
        assert!(!spec.supports_batch());
        assert_eq!(spec.name(), "rouge_l");
    }

    #[tokio::test]
    async fn test_identical_text_scores() {
        let pair = TextPair::new("the cat sat", "the cat sat");
        let expectations = [
            ("levenshtein_distance", 0.0),
            ("levenshtein_ratio", 1.0),
            ("rouge_1", 1.0),
            ("rouge_l", 1.0),
            ("bleu", 1.0),
        ];
        for (name, expected) in expectations {
            let kind = MetricKind::from_str(name).unwrap();
            let score = kind.score(&pair, None).await.unwrap();
            assert!((score - expected).abs() < 1e-12, "{name}: {score}");
        }
    }

    #[tokio::test]
    async fn test_model_metric_without_client_is_invalid_config() {
        let err = MetricKind::BertScore
            .score(&TextPair::new("a", "a"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}
