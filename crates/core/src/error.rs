use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Result type for ragas operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ragas operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Evaluation configuration rejected before scoring
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Ground-truth and generated sequences differ in length
    #[error("Length mismatch: {ground_truths} ground truths but {generations} generations")]
    LengthMismatch {
        ground_truths: usize,
        generations: usize,
    },

    /// Requested metric is not registered
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Metric name registered twice
    #[error("Duplicate metric name: {0}")]
    DuplicateName(String),

    /// External model invocation failed or timed out
    #[error("External model failure: {0}")]
    ExternalModel(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of an [`Error`], recorded in partial-failure results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Io,
    Config,
    InvalidConfig,
    LengthMismatch,
    UnknownMetric,
    DuplicateName,
    ExternalModelFailure,
    InvalidInput,
    Other,
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid evaluation configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates a length mismatch error
    pub fn length_mismatch(ground_truths: usize, generations: usize) -> Self {
        Self::LengthMismatch {
            ground_truths,
            generations,
        }
    }

    /// Creates an unknown metric error
    pub fn unknown_metric(name: impl Into<String>) -> Self {
        Self::UnknownMetric(name.into())
    }

    /// Creates a duplicate name error
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName(name.into())
    }

    /// Creates an external model failure
    pub fn external_model(msg: impl Into<String>) -> Self {
        Self::ExternalModel(msg.into())
    }

    /// Creates an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Returns the kind tag for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Config(_) => ErrorKind::Config,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            Self::UnknownMetric(_) => ErrorKind::UnknownMetric,
            Self::DuplicateName(_) => ErrorKind::DuplicateName,
            Self::ExternalModel(_) => ErrorKind::ExternalModelFailure,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::WithContext { source, .. } => match source.downcast_ref::<Error>() {
                Some(inner) => inner.kind(),
                None => ErrorKind::Other,
            },
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}
