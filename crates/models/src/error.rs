//! Error types for the models module

use std::fmt;

/// Errors that can occur while talking to model services
#[derive(Debug)]
pub enum ModelError {
    /// Inference failed
    InferenceError(String),

    /// The service answered with something we could not use
    InvalidResponse(String),

    /// Configuration error
    ConfigError(String),

    /// Provider not configured on the inference client
    MissingProvider(&'static str),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InferenceError(msg) => write!(f, "Inference failed: {msg}"),
            Self::InvalidResponse(msg) => write!(f, "Invalid model response: {msg}"),
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            Self::MissingProvider(role) => write!(f, "No {role} provider configured"),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<ModelError> for ragas_core::error::Error {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::ConfigError(_) => ragas_core::error::Error::config(err.to_string()),
            ModelError::MissingProvider(_) => {
                ragas_core::error::Error::invalid_config(err.to_string())
            }
            ModelError::InferenceError(_) | ModelError::InvalidResponse(_) => {
                ragas_core::error::Error::external_model(err.to_string())
            }
        }
    }
}
