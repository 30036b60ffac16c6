//! ragas CLI - text-pair evaluation for generated text
//!
//! This binary provides the command-line interface for the ragas metrics.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ragas::{create_evaluator, load_dataset, usage_cost};
use ragas_core::config::{Config, ModelsConfig};
use ragas_evaluation::{MetricRegistry, ResultSet};
use ragas_metrics::MetricSpec;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ragas")]
#[command(about = "Score generated text against ground truth")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a dataset of ground-truth / generated text pairs
    Eval(EvalArgs),
    /// List the available metrics
    Metrics {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct EvalArgs {
    /// Dataset file (JSON Lines rows or a JSON object of two arrays)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Comma-separated metric names (overrides the configuration)
    #[arg(short, long, value_delimiter = ',')]
    metrics: Option<Vec<String>>,

    /// Score in batches
    #[arg(long)]
    batched: bool,

    /// Pairs per batch (implies --batched)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Comma-separated metrics to report per example instead of as a mean
    #[arg(long, value_delimiter = ',')]
    per_example: Option<Vec<String>>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    // Execute commands
    match cli.command {
        Some(Commands::Eval(args)) => evaluate(args, cli.config.as_deref()).await,
        Some(Commands::Metrics { json }) => list_metrics(json),
        None => {
            // Default behavior - show help
            println!("Run 'ragas eval --input <FILE>' to score a dataset, or --help for more options");
            Ok(())
        }
    }
}

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ragas={level},ragas_core={level},ragas_models={level},ragas_metrics={level},ragas_evaluation={level}"
        ))
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, args: &EvalArgs) {
    if let Some(ref metrics) = args.metrics {
        config.evaluation.metrics = metrics.clone();
    }
    if args.batched {
        config.evaluation.batched = true;
    }
    if let Some(batch_size) = args.batch_size {
        config.evaluation.batched = true;
        config.evaluation.batch_size = batch_size;
    }
    if let Some(ref per_example) = args.per_example {
        config.evaluation.per_example = per_example.clone();
    }
}

async fn evaluate(args: EvalArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = Config::load(config_path)?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let dataset = load_dataset(&args.input)?;
    if dataset.is_empty() {
        warn!("Dataset {} contains no pairs", args.input.display());
    }
    info!(
        "Loaded {} pairs from {}",
        dataset.len(),
        args.input.display()
    );

    let registry = MetricRegistry::with_builtin_metrics();
    let evaluator = create_evaluator(&config, &registry).await?;

    let results = evaluator
        .eval(&dataset.ground_truths, &dataset.generations)
        .await
        .context("Evaluation failed")?;

    print_results(&results, &config.models, args.json)?;

    if results.has_failures() {
        warn!("Some metrics could not be computed");
    }
    Ok(())
}

fn print_results(results: &ResultSet, models: &ModelsConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    println!("{results}");
    let usage = results.total_usage()?;
    if !usage.is_empty() {
        println!(
            "tokens: {} input, {} output",
            usage.input_tokens, usage.output_tokens
        );
        if let Some(cost) = usage_cost(&usage, models) {
            println!("cost: {cost:.6}");
        }
    }
    Ok(())
}

fn list_metrics(json: bool) -> Result<()> {
    let registry = MetricRegistry::with_builtin_metrics();

    if json {
        let specs: Vec<&MetricSpec> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }

    for spec in registry.iter() {
        let requirements: Vec<String> = spec
            .kind()
            .requirements()
            .iter()
            .map(ToString::to_string)
            .collect();
        let models = if requirements.is_empty() {
            "local".to_string()
        } else {
            requirements.join("+")
        };
        let batch = if spec.supports_batch() { "batch" } else { "per-pair" };
        println!("{:<22} {:<10} {models}", spec.name(), batch);
    }
    Ok(())
}
