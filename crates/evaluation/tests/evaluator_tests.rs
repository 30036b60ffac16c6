//! End-to-end evaluator behaviour with local metrics and mock model providers

use pretty_assertions::assert_eq;
use ragas_core::{ErrorKind, TextPair};
use ragas_evaluation::{EvaluationConfig, Evaluator, MetricOutcome, MetricRegistry};
use ragas_metrics::{Aggregator, MetricKind, MetricSpec};
use ragas_core::Result;
use ragas_models::{
    InferenceClient, MockEmbeddingProvider, MockGenerationProvider, MockNliProvider, NliPair,
    NliProvider, UsageMeter,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records the number of pairs in every call before delegating to the mock
#[derive(Default)]
struct CountingNliProvider {
    inner: MockNliProvider,
    calls: Mutex<Vec<usize>>,
}

impl CountingNliProvider {
    fn call_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NliProvider for CountingNliProvider {
    async fn entailment(&self, pairs: &[NliPair]) -> Result<Vec<f32>> {
        self.calls.lock().unwrap().push(pairs.len());
        self.inner.entailment(pairs).await
    }
}

const LOCAL_METRICS: [&str; 6] = [
    "levenshtein_distance",
    "levenshtein_ratio",
    "rouge_1",
    "rouge_2",
    "rouge_l",
    "bleu",
];

fn local_specs() -> Vec<MetricSpec> {
    MetricRegistry::with_builtin_metrics()
        .resolve(&LOCAL_METRICS)
        .unwrap()
}

fn sample_texts() -> (Vec<String>, Vec<String>) {
    let ground_truths = vec![
        "The Eiffel Tower is located in Paris.",
        "Water boils at 100 degrees Celsius at sea level.",
        "The cat sat on the mat.",
        "Rust guarantees memory safety without a garbage collector.",
        "",
        "Mount Everest is the highest mountain above sea level.",
        "Photosynthesis converts light energy into chemical energy.",
    ];
    let generations = vec![
        "The Eiffel Tower is in Paris, France.",
        "At sea level, water boils at 100 degrees Celsius.",
        "A cat was sitting on the mat.",
        "Rust ensures memory safety with no garbage collector.",
        "Nothing to compare against.",
        "Everest is the tallest mountain on Earth.",
        "",
    ];
    (
        ground_truths.into_iter().map(String::from).collect(),
        generations.into_iter().map(String::from).collect(),
    )
}

#[tokio::test]
async fn test_identical_text_local_scores() {
    let evaluator = Evaluator::new(EvaluationConfig::unbatched(local_specs()).unwrap()).unwrap();
    let results = evaluator
        .eval(&["the cat sat"], &["the cat sat"])
        .await
        .unwrap();

    assert_eq!(results.names().collect::<Vec<_>>(), LOCAL_METRICS.to_vec());
    assert_eq!(results.score("levenshtein_distance"), Some(0.0));
    assert_eq!(results.score("levenshtein_ratio"), Some(1.0));
    assert_eq!(results.score("rouge_1"), Some(1.0));
    assert_eq!(results.score("rouge_2"), Some(1.0));
    assert_eq!(results.score("rouge_l"), Some(1.0));
    assert!((results.score("bleu").unwrap() - 1.0).abs() < 1e-12);
}

#[tokio::test]
async fn test_identical_short_and_tokenless_text_scores_one() {
    let evaluator = Evaluator::new(EvaluationConfig::unbatched(local_specs()).unwrap()).unwrap();
    for text in ["cat", "!!!"] {
        let results = evaluator.eval(&[text], &[text]).await.unwrap();
        for name in ["rouge_1", "rouge_2", "rouge_l"] {
            assert_eq!(results.score(name), Some(1.0), "{name} on {text:?}");
        }
        assert!((results.score("bleu").unwrap() - 1.0).abs() < 1e-12, "bleu on {text:?}");
    }
}

#[tokio::test]
async fn test_single_character_edit() {
    let config = EvaluationConfig::unbatched(vec![MetricSpec::new(
        MetricKind::LevenshteinDistance,
    )])
    .unwrap();
    let results = Evaluator::new(config)
        .unwrap()
        .eval(&["abc"], &["abd"])
        .await
        .unwrap();
    assert_eq!(results.score("levenshtein_distance"), Some(1.0));
}

#[tokio::test]
async fn test_length_mismatch() {
    let evaluator = Evaluator::new(EvaluationConfig::unbatched(local_specs()).unwrap()).unwrap();
    let err = evaluator
        .eval(&["a", "b"], &["a"])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LengthMismatch);
    assert!(err.to_string().contains("2 ground truths but 1 generations"));
}

#[tokio::test]
async fn test_one_entry_per_metric() {
    let (ground_truths, generations) = sample_texts();
    let evaluator = Evaluator::new(EvaluationConfig::unbatched(local_specs()).unwrap()).unwrap();
    let results = evaluator.eval(&ground_truths, &generations).await.unwrap();

    assert_eq!(results.len(), LOCAL_METRICS.len());
    assert_eq!(results.num_pairs(), ground_truths.len());
    assert!(!results.has_failures());
    for name in LOCAL_METRICS {
        let score = results.score(name).unwrap();
        assert!(score.is_finite(), "{name}");
    }
}

#[tokio::test]
async fn test_batched_matches_unbatched_for_local_metrics() {
    let (ground_truths, generations) = sample_texts();

    let unbatched = Evaluator::new(EvaluationConfig::unbatched(local_specs()).unwrap())
        .unwrap()
        .eval(&ground_truths, &generations)
        .await
        .unwrap();

    for batch_size in [1, 3, 7, 100] {
        let batched = Evaluator::new(EvaluationConfig::batched(local_specs(), batch_size).unwrap())
            .unwrap()
            .eval(&ground_truths, &generations)
            .await
            .unwrap();
        for name in LOCAL_METRICS {
            assert_eq!(batched.get(name), unbatched.get(name), "{name} @ {batch_size}");
        }
    }
}

#[tokio::test]
async fn test_identity_aggregator_is_aligned_with_input() {
    let config = EvaluationConfig::batched(
        vec![MetricSpec::new(MetricKind::LevenshteinDistance).with_aggregator(Aggregator::Identity)],
        2,
    )
    .unwrap();
    let results = Evaluator::new(config)
        .unwrap()
        .eval(&["abc", "kitten", "", "same"], &["abd", "sitting", "xy", "same"])
        .await
        .unwrap();

    assert_eq!(
        results.get("levenshtein_distance"),
        Some(&MetricOutcome::PerExample(vec![1.0, 3.0, 2.0, 0.0]))
    );
}

#[test]
fn test_missing_provider_is_rejected_before_scoring() {
    let registry = MetricRegistry::with_builtin_metrics();
    let config = EvaluationConfig::unbatched(registry.resolve(&["rouge_l", "q2"]).unwrap()).unwrap();
    // Q² needs generation and NLI; only NLI is present
    let client =
        InferenceClient::new(Duration::from_secs(5)).with_nli(Arc::new(MockNliProvider::new()));

    let err = Evaluator::with_inference(config, client).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    assert!(err.to_string().contains("generation"));
}

async fn entailment_call_sizes(spec: MetricSpec, batch_size: usize) -> Vec<usize> {
    let nli = Arc::new(CountingNliProvider::default());
    let client = InferenceClient::new(Duration::from_secs(5))
        .with_nli(Arc::clone(&nli) as Arc<dyn NliProvider>);
    let config = EvaluationConfig::batched(vec![spec], batch_size).unwrap();

    let ground_truths = ["a b", "c d", "e f", "g h", "i j"];
    let results = Evaluator::with_inference(config, client)
        .unwrap()
        .eval(&ground_truths, &ground_truths)
        .await
        .unwrap();
    assert_eq!(results.score("entailment_score"), Some(1.0));

    nli.call_sizes()
}

#[tokio::test]
async fn test_batch_capable_metric_is_called_once_per_chunk() {
    let sizes = entailment_call_sizes(MetricSpec::new(MetricKind::EntailmentScore), 2).await;
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[tokio::test]
async fn test_metric_without_batch_support_is_called_per_pair() {
    let spec = MetricSpec::new(MetricKind::EntailmentScore).with_batch_support(false);
    let sizes = entailment_call_sizes(spec, 2).await;
    assert_eq!(sizes, vec![1; 5]);
}

#[tokio::test]
async fn test_model_failure_is_isolated() {
    let registry = MetricRegistry::with_builtin_metrics();
    let config = EvaluationConfig::unbatched(
        registry
            .resolve(&["rouge_l", "entailment_score", "levenshtein_ratio"])
            .unwrap(),
    )
    .unwrap();
    let client = InferenceClient::new(Duration::from_secs(5))
        .with_nli(Arc::new(MockNliProvider::new().failing("connection reset")));

    let results = Evaluator::with_inference(config, client)
        .unwrap()
        .eval(&["the cat sat"], &["the cat sat"])
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results.score("rouge_l"), Some(1.0));
    assert_eq!(results.score("levenshtein_ratio"), Some(1.0));
    match results.get("entailment_score") {
        Some(MetricOutcome::Failed { kind, message }) => {
            assert_eq!(*kind, ErrorKind::ExternalModelFailure);
            assert!(message.contains("connection reset"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_model_timeout_is_isolated() {
    let config = EvaluationConfig::batched(
        vec![
            MetricSpec::new(MetricKind::BertScore),
            MetricSpec::new(MetricKind::RougeL),
        ],
        4,
    )
    .unwrap();
    let client = InferenceClient::new(Duration::from_millis(20)).with_embeddings(Arc::new(
        MockEmbeddingProvider::new(64).with_delay(Duration::from_secs(5)),
    ));

    let results = Evaluator::with_inference(config, client)
        .unwrap()
        .eval(&["the cat sat"], &["the cat sat"])
        .await
        .unwrap();

    match results.get("bert_score") {
        Some(MetricOutcome::Failed { kind, message }) => {
            assert_eq!(*kind, ErrorKind::ExternalModelFailure);
            assert!(message.contains("timed out"));
        }
        other => panic!("expected timeout failure, got {other:?}"),
    }
    assert_eq!(results.score("rouge_l"), Some(1.0));
}

#[tokio::test]
async fn test_model_metrics_with_mock_providers() {
    let usage = Arc::new(UsageMeter::new());
    let client = InferenceClient::new(Duration::from_secs(5))
        .with_usage_meter(Arc::clone(&usage))
        .with_embeddings(Arc::new(
            MockEmbeddingProvider::new(1024).with_usage(Arc::clone(&usage)),
        ))
        .with_nli(Arc::new(MockNliProvider::new().with_usage(Arc::clone(&usage))))
        .with_generation(Arc::new(
            MockGenerationProvider::scripted([r#"["Where does the cat sit?"]"#, "mat", "mat"])
                .with_usage(Arc::clone(&usage)),
        ));

    let registry = MetricRegistry::with_builtin_metrics();
    let config = EvaluationConfig::batched(
        registry
            .resolve(&["bert_score", "entailment_score", "q2", "rouge_1"])
            .unwrap(),
        2,
    )
    .unwrap();

    let results = Evaluator::with_inference(config, client)
        .unwrap()
        .eval(&["the cat sat on the mat"], &["the cat sat on the mat"])
        .await
        .unwrap();

    assert!((results.score("bert_score").unwrap() - 1.0).abs() < 1e-6);
    assert_eq!(results.score("entailment_score"), Some(1.0));
    assert_eq!(results.score("q2"), Some(1.0));
    assert!(results.usage("bert_score").is_some_and(|u| u.input_tokens > 0));
    assert!(results.usage("rouge_1").is_some_and(|u| u.is_empty()));
    assert!(!results.total_usage().unwrap().is_empty());
}

#[tokio::test]
async fn test_q2_without_questions_is_nan() {
    let client = InferenceClient::new(Duration::from_secs(5))
        .with_nli(Arc::new(MockNliProvider::new()))
        .with_generation(Arc::new(MockGenerationProvider::new()));
    let config = EvaluationConfig::unbatched(vec![MetricSpec::new(MetricKind::Q2)]).unwrap();

    let results = Evaluator::with_inference(config, client)
        .unwrap()
        .eval(&["The tower is in Paris."], &["I don't know."])
        .await
        .unwrap();

    assert!(results.score("q2").is_some_and(f64::is_nan));
}

#[tokio::test]
async fn test_score_pair() {
    let evaluator = Evaluator::new(EvaluationConfig::unbatched(local_specs()).unwrap()).unwrap();
    let results = evaluator
        .score_pair(&TextPair::new("abc", "abd"))
        .await
        .unwrap();
    assert_eq!(results.num_pairs(), 1);
    assert_eq!(results.score("levenshtein_distance"), Some(1.0));
}
