//! Batched text-pair evaluation

use crate::config::EvaluationConfig;
use crate::result::{MetricOutcome, ResultSet};
use ragas_core::error::{Error, Result};
use ragas_core::{zip_pairs, TextPair};
use ragas_metrics::{nan_mean, Aggregator, MetricSpec};
use ragas_models::{InferenceClient, TokenUsage};
use tracing::{debug, info, info_span, warn, Instrument};

/// Runs every configured metric over aligned ground-truth / generated texts
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EvaluationConfig,
    inference: Option<InferenceClient>,
}

impl Evaluator {
    /// Evaluator for local metrics only
    ///
    /// Fails with [`Error::InvalidConfig`] if any configured metric needs an
    /// external model.
    pub fn new(config: EvaluationConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Evaluator whose model-based metrics call out through `client`
    ///
    /// Fails with [`Error::InvalidConfig`] if a configured metric needs a
    /// provider the client lacks.
    pub fn with_inference(config: EvaluationConfig, client: InferenceClient) -> Result<Self> {
        Self::build(config, Some(client))
    }

    fn build(config: EvaluationConfig, inference: Option<InferenceClient>) -> Result<Self> {
        for spec in config.metrics() {
            for requirement in spec.kind().requirements() {
                let met = inference
                    .as_ref()
                    .is_some_and(|client| requirement.is_met_by(client));
                if !met {
                    return Err(Error::invalid_config(format!(
                        "Metric '{}' requires a {requirement} model provider, but none is configured",
                        spec.name()
                    )));
                }
            }
        }

        Ok(Self { config, inference })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Score aligned sequences with every configured metric
    ///
    /// Fails with [`Error::LengthMismatch`] when the sequences differ in
    /// length. A metric whose model call fails or times out is reported as
    /// [`MetricOutcome::Failed`] while the remaining metrics still run.
    pub async fn eval<G, C>(&self, ground_truths: &[G], generations: &[C]) -> Result<ResultSet>
    where
        G: AsRef<str>,
        C: AsRef<str>,
    {
        let pairs = zip_pairs(ground_truths, generations)?;
        self.evaluate_pairs(&pairs).await
    }

    /// Score a single pair with every configured metric
    pub async fn score_pair(&self, pair: &TextPair) -> Result<ResultSet> {
        self.evaluate_pairs(std::slice::from_ref(pair)).await
    }

    async fn evaluate_pairs(&self, pairs: &[TextPair]) -> Result<ResultSet> {
        let span = info_span!(
            "evaluation",
            pairs = pairs.len(),
            metrics = self.config.metrics().len(),
            batched = self.config.is_batched()
        );

        async {
            info!("Evaluating {} text pairs", pairs.len());
            let mut results = ResultSet::new(pairs.len());

            for spec in self.config.metrics() {
                let before = self.usage_snapshot();
                let outcome = self
                    .run_metric(spec, pairs)
                    .instrument(info_span!("metric", name = spec.name()))
                    .await;
                let usage = self.usage_snapshot().since(&before);
                results.push(spec.name(), outcome, usage);
            }

            Ok::<_, Error>(results)
        }
        .instrument(span)
        .await
    }

    fn usage_snapshot(&self) -> TokenUsage {
        self.inference
            .as_ref()
            .map(InferenceClient::usage)
            .unwrap_or_default()
    }

    async fn run_metric(&self, spec: &MetricSpec, pairs: &[TextPair]) -> MetricOutcome {
        match self.metric_scores(spec, pairs).await {
            Ok(scores) => aggregate(spec, scores),
            Err(e) => {
                warn!("Metric '{}' failed: {e}", spec.name());
                MetricOutcome::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        }
    }

    async fn metric_scores(&self, spec: &MetricSpec, pairs: &[TextPair]) -> Result<Vec<f64>> {
        let kind = spec.kind();
        let client = self.inference.as_ref();
        let mut scores = Vec::with_capacity(pairs.len());

        if !self.config.is_batched() {
            for pair in pairs {
                scores.push(kind.score(pair, client).await?);
            }
            return Ok(scores);
        }

        let batch_size = self.config.batch_size();
        let total_chunks = pairs.len().div_ceil(batch_size);
        for (i, chunk) in pairs.chunks(batch_size).enumerate() {
            debug!("Scoring chunk {}/{} ({} pairs)", i + 1, total_chunks, chunk.len());

            if spec.supports_batch() {
                let chunk_scores = kind.score_batch(chunk, client).await?;
                if chunk_scores.len() != chunk.len() {
                    return Err(Error::external_model(format!(
                        "Metric '{}' returned {} scores for {} pairs",
                        spec.name(),
                        chunk_scores.len(),
                        chunk.len()
                    )));
                }
                scores.extend(chunk_scores);
            } else {
                for pair in chunk {
                    scores.push(kind.score(pair, client).await?);
                }
            }
        }

        Ok(scores)
    }
}

fn aggregate(spec: &MetricSpec, scores: Vec<f64>) -> MetricOutcome {
    match spec.aggregator() {
        Aggregator::Mean => {
            let undefined = scores.iter().filter(|s| s.is_nan()).count();
            if undefined > 0 {
                warn!(
                    "Metric '{}' was undefined for {undefined} of {} pairs",
                    spec.name(),
                    scores.len()
                );
            }
            MetricOutcome::Scalar(nan_mean(&scores))
        }
        Aggregator::Identity => MetricOutcome::PerExample(scores),
    }
}
