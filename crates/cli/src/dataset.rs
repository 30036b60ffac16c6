//! Evaluation dataset files
//!
//! Two layouts are accepted:
//! - JSON Lines, one `{"ground_truth": ..., "generated": ...}` object per line
//!   (`reference` and `answer` are accepted as aliases)
//! - a single JSON object holding two aligned arrays,
//!   `{"ground_truths": [...], "generations": [...]}`

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Aligned ground-truth and generated texts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub ground_truths: Vec<String>,
    pub generations: Vec<String>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.ground_truths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ground_truths.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(alias = "reference")]
    ground_truth: String,
    #[serde(alias = "answer")]
    generated: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Columns {
    #[serde(alias = "references")]
    ground_truths: Vec<String>,
    #[serde(alias = "answers")]
    generations: Vec<String>,
}

/// Load a dataset from `path`
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file {}", path.display()))?;
    parse_dataset(&content).with_context(|| format!("Invalid dataset file {}", path.display()))
}

/// Parse dataset text in either supported layout
pub fn parse_dataset(content: &str) -> Result<Dataset> {
    if let Ok(columns) = serde_json::from_str::<Columns>(content) {
        debug!("Parsed column dataset");
        return Ok(Dataset {
            ground_truths: columns.ground_truths,
            generations: columns.generations,
        });
    }

    let mut dataset = Dataset::default();
    for (line_number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row: Row = serde_json::from_str(line).with_context(|| {
            format!(
                "Line {}: expected a ground_truth/generated object",
                line_number + 1
            )
        })?;
        dataset.ground_truths.push(row.ground_truth);
        dataset.generations.push(row.generated);
    }

    debug!("Parsed {} JSON Lines rows", dataset.len());
    Ok(dataset)
}
