//! Dataset loading and evaluator construction from configuration

use pretty_assertions::assert_eq;
use ragas::{create_evaluator, load_dataset, parse_dataset, Dataset};
use ragas_core::config::{Config, GenerationModelConfig, NliModelConfig};
use ragas_evaluation::MetricRegistry;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_parse_json_lines_with_aliases() {
    let content = r#"{"ground_truth": "the cat sat", "generated": "the cat sat"}

{"reference": "abc", "answer": "abd", "question": "ignored"}
"#;
    let dataset = parse_dataset(content).unwrap();
    assert_eq!(
        dataset,
        Dataset {
            ground_truths: vec!["the cat sat".to_string(), "abc".to_string()],
            generations: vec!["the cat sat".to_string(), "abd".to_string()],
        }
    );
}

#[test]
fn test_parse_columns() {
    let content = r#"{"ground_truths": ["a", "b"], "generations": ["c", "d"]}"#;
    let dataset = parse_dataset(content).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.generations, vec!["c", "d"]);
}

#[test]
fn test_parse_reports_bad_line() {
    let content = "{\"ground_truth\": \"a\", \"generated\": \"b\"}\nnot json\n";
    let err = parse_dataset(content).unwrap_err();
    assert!(err.to_string().contains("Line 2"));
}

#[test]
fn test_load_dataset_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"ground_truth": "x", "generated": "y"}}"#).unwrap();

    let dataset = load_dataset(file.path()).unwrap();
    assert_eq!(dataset.len(), 1);
    assert!(load_dataset(std::path::Path::new("/nonexistent/data.jsonl")).is_err());
}

#[tokio::test]
async fn test_create_evaluator_local_metrics() {
    let config = Config::default();
    let evaluator = create_evaluator(&config, &MetricRegistry::with_builtin_metrics())
        .await
        .unwrap();

    let results = evaluator
        .eval(&["the cat sat"], &["the cat sat"])
        .await
        .unwrap();
    assert_eq!(results.len(), config.evaluation.metrics.len());
    assert_eq!(results.score("rouge_1"), Some(1.0));
}

#[tokio::test]
async fn test_create_evaluator_with_mock_models() {
    let mut config = Config::default();
    config.evaluation.metrics = vec!["entailment_score".to_string(), "q2".to_string()];
    config.models.nli = Some(NliModelConfig {
        provider: "mock".to_string(),
        ..NliModelConfig::default()
    });
    config.models.generation = Some(GenerationModelConfig {
        provider: "mock".to_string(),
        ..GenerationModelConfig::default()
    });

    let evaluator = create_evaluator(&config, &MetricRegistry::with_builtin_metrics())
        .await
        .unwrap();
    let results = evaluator
        .eval(&["the cat sat on the mat"], &["the cat sat"])
        .await
        .unwrap();

    assert_eq!(results.score("entailment_score"), Some(1.0));
    // the offline generator proposes no questions
    assert!(results.score("q2").is_some_and(f64::is_nan));
}

#[tokio::test]
async fn test_create_evaluator_missing_provider() {
    let mut config = Config::default();
    config.evaluation.metrics = vec!["bert_score".to_string()];

    let err = create_evaluator(&config, &MetricRegistry::with_builtin_metrics())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid configuration"));
}
