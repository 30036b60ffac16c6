//! Core types for the ragas text evaluation system
//!
//! This crate provides the foundational pieces shared by every other crate:
//!
//! - **Text pairs**: aligned ground-truth / generated inputs
//! - **Configuration**: evaluation and model service settings
//! - **Error handling**: unified error types and kinds
//!

pub mod config;
pub mod error;
pub mod text;

// Re-export main types for convenience
pub use config::{
    Config, EmbeddingsModelConfig, EvaluationSettings, GenerationModelConfig, ModelsConfig,
    NliModelConfig,
};
pub use error::{Error, ErrorKind, Result, ResultExt};
pub use text::{zip_pairs, TextPair};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Result, ResultExt};
    pub use crate::text::TextPair;
}
