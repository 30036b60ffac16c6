//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;
use tracing::debug;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `RAGAS_` and use double underscores
    /// for nested values. For example:
    /// - `RAGAS_EVALUATION__BATCH_SIZE=32`
    /// - `RAGAS_EVALUATION__METRICS=rouge_1,bleu`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // Section defaults (config crate doesn't apply serde defaults for missing sections)
        let builder = set_config_default(builder, "evaluation.metrics", default_metrics())?;
        let builder = set_config_default(builder, "evaluation.batched", default_batched())?;
        let builder = set_config_default(
            builder,
            "evaluation.batch_size",
            default_batch_size() as i64,
        )?;
        let builder =
            set_config_default(builder, "evaluation.per_example", Vec::<String>::new())?;
        let builder = set_config_default(
            builder,
            "models.timeout_secs",
            default_timeout_secs() as i64,
        )?;
        let mut builder = set_config_default(
            builder,
            "models.q2_max_questions",
            default_q2_max_questions() as i64,
        )?;

        // Add the config file if it exists
        if path.exists() {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        } else {
            debug!(
                "No configuration file at {}, using defaults",
                path.display()
            );
        }

        // Add environment variables with RAGAS_ prefix
        builder = builder.add_source(
            Environment::with_prefix("RAGAS")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("evaluation.metrics")
                .with_list_parse_key("evaluation.per_example")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.ragas/config.toml or custom --config path)
    /// 3. Environment variables (RAGAS_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
