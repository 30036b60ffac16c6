//! Batched evaluation of text pairs against a set of metrics
//!
//! A [`MetricRegistry`] maps names to metric specifications, an
//! [`EvaluationConfig`] selects and validates the metrics to run, and the
//! [`Evaluator`] scores aligned ground-truth / generated sequences into a
//! [`ResultSet`].
//!
//! ```ignore
//! let registry = MetricRegistry::with_builtin_metrics();
//! let config = EvaluationConfig::unbatched(registry.resolve(&["rouge_l", "bleu"])?)?;
//! let results = Evaluator::new(config)?.eval(&ground_truths, &generations).await?;
//! println!("{results}");
//! ```

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod config;
mod evaluator;
mod registry;
mod result;

pub use config::EvaluationConfig;
pub use evaluator::Evaluator;
pub use registry::MetricRegistry;
pub use result::{MetricEntry, MetricOutcome, ResultSet};
