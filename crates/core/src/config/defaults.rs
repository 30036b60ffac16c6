//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_EMBEDDINGS_PROVIDER: &str = "openai";
pub(crate) const DEFAULT_EMBEDDINGS_MODEL: &str = "BAAI/bge-small-en-v1.5";
pub(crate) const DEFAULT_NLI_PROVIDER: &str = "vllm";
pub(crate) const DEFAULT_NLI_MODEL: &str = "cross-encoder/nli-deberta-v3-base";
pub(crate) const DEFAULT_GENERATION_PROVIDER: &str = "openai";
pub(crate) const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";
pub(crate) const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/v1";

pub(crate) fn default_metrics() -> Vec<String> {
    vec![
        "levenshtein_ratio".to_string(),
        "rouge_1".to_string(),
        "rouge_l".to_string(),
        "bleu".to_string(),
    ]
}

pub(crate) fn default_batched() -> bool {
    false
}

pub(crate) fn default_batch_size() -> usize {
    16
}

pub(crate) fn default_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_q2_max_questions() -> usize {
    5
}

pub(crate) fn default_embeddings_provider() -> String {
    DEFAULT_EMBEDDINGS_PROVIDER.to_string()
}

pub(crate) fn default_embeddings_model() -> String {
    DEFAULT_EMBEDDINGS_MODEL.to_string()
}

pub(crate) fn default_nli_provider() -> String {
    DEFAULT_NLI_PROVIDER.to_string()
}

pub(crate) fn default_nli_model() -> String {
    DEFAULT_NLI_MODEL.to_string()
}

pub(crate) fn default_generation_provider() -> String {
    DEFAULT_GENERATION_PROVIDER.to_string()
}

pub(crate) fn default_generation_model() -> String {
    DEFAULT_GENERATION_MODEL.to_string()
}

pub(crate) fn default_api_base_url() -> Option<String> {
    Some(DEFAULT_API_BASE_URL.to_string())
}
