//! Text-pair scoring functions
//!
//! Character metrics (Levenshtein distance and ratio) and n-gram metrics
//! (ROUGE-N, ROUGE-L, BLEU) are computed locally. BERTScore, entailment score
//! and Q² delegate model work to an [`ragas_models::InferenceClient`].

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod bert_score;
pub mod bleu;
pub mod entailment;
pub mod levenshtein;
mod metric;
pub mod q2;
pub mod rouge;
pub mod tokenizer;

pub use bert_score::BertScore;
pub use levenshtein::{levenshtein_distance, levenshtein_ratio};
pub use metric::{nan_mean, Aggregator, MetricKind, MetricSpec, ModelRequirement, ScoreRange};
pub use rouge::RougeScore;
pub use tokenizer::WordTokenizer;
