//! Deterministic in-process providers for tests and offline runs

use crate::error::ModelError;
use crate::provider::{EmbeddingProvider, GenerationProvider, NliPair, NliProvider};
use crate::usage::UsageMeter;
use async_trait::async_trait;
use ragas_core::error::Result;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use twox_hash::XxHash64;

const HASH_SEED: u64 = 0x5eed;

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Failure and latency injection shared by the mocks
#[derive(Debug, Clone, Default)]
struct Behavior {
    delay: Option<Duration>,
    failure: Option<String>,
    usage: Option<Arc<UsageMeter>>,
}

impl Behavior {
    async fn run(&self, input_tokens: u64, output_tokens: u64) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(ref message) = self.failure {
            return Err(ModelError::InferenceError(message.clone()).into());
        }
        if let Some(ref usage) = self.usage {
            usage.record(input_tokens, output_tokens);
        }
        Ok(())
    }
}

macro_rules! behavior_builders {
    ($ty:ty) => {
        impl $ty {
            /// Sleep before answering each call
            pub fn with_delay(mut self, delay: Duration) -> Self {
                self.behavior.delay = Some(delay);
                self
            }

            /// Fail every call with an inference error
            pub fn failing(mut self, message: impl Into<String>) -> Self {
                self.behavior.failure = Some(message.into());
                self
            }

            /// Record one input token per word into `usage`
            pub fn with_usage(mut self, usage: Arc<UsageMeter>) -> Self {
                self.behavior.usage = Some(usage);
                self
            }
        }
    };
}

/// Mock embedding provider producing hashed bag-of-words vectors
///
/// Equal texts map to equal unit vectors, texts without shared words are
/// (up to hash collisions) orthogonal.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    embedding_dim: usize,
    behavior: Behavior,
}

impl MockEmbeddingProvider {
    /// Create a new mock provider with specified embedding dimension
    pub fn new(embedding_dim: usize) -> Self {
        Self {
            embedding_dim: embedding_dim.max(1),
            behavior: Behavior::default(),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.embedding_dim];
        for word in words(text) {
            let bucket = XxHash64::oneshot(HASH_SEED, word.as_bytes()) as usize % self.embedding_dim;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

behavior_builders!(MockEmbeddingProvider);

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let input_tokens = texts.iter().map(|t| words(t).count() as u64).sum();
        self.behavior.run(input_tokens, 0).await?;
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

/// Mock NLI provider scoring the share of hypothesis words found in the premise
#[derive(Debug, Clone, Default)]
pub struct MockNliProvider {
    behavior: Behavior,
}

impl MockNliProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn score(pair: &NliPair) -> f32 {
        let premise: HashSet<String> = words(&pair.premise).collect();
        let hypothesis: Vec<String> = words(&pair.hypothesis).collect();
        if hypothesis.is_empty() {
            return 0.0;
        }
        let supported = hypothesis.iter().filter(|w| premise.contains(*w)).count();
        supported as f32 / hypothesis.len() as f32
    }
}

behavior_builders!(MockNliProvider);

#[async_trait]
impl NliProvider for MockNliProvider {
    async fn entailment(&self, pairs: &[NliPair]) -> Result<Vec<f32>> {
        let input_tokens = pairs
            .iter()
            .map(|p| (words(&p.premise).count() + words(&p.hypothesis).count()) as u64)
            .sum();
        self.behavior.run(input_tokens, 0).await?;
        Ok(pairs.iter().map(Self::score).collect())
    }
}

type Responder = dyn Fn(&str) -> String + Send + Sync;

/// Mock generation provider
///
/// Answers from a script of canned responses first, then from the responder
/// function. The default responder returns `[]`, which question generation
/// reads as "no questions".
#[derive(Clone)]
pub struct MockGenerationProvider {
    script: Arc<Mutex<VecDeque<String>>>,
    responder: Arc<Responder>,
    behavior: Behavior,
}

impl std::fmt::Debug for MockGenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGenerationProvider")
            .field("behavior", &self.behavior)
            .finish_non_exhaustive()
    }
}

impl Default for MockGenerationProvider {
    fn default() -> Self {
        Self::from_fn(|_| "[]".to_string())
    }
}

impl MockGenerationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to each prompt with `responder(prompt)`
    pub fn from_fn(responder: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            responder: Arc::new(responder),
            behavior: Behavior::default(),
        }
    }

    /// Return `responses` in order before falling back to the responder
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::default();
        if let Ok(mut script) = provider.script.lock() {
            script.extend(responses.into_iter().map(Into::into));
        }
        provider
    }

    fn next_scripted(&self) -> Result<Option<String>> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| ModelError::InferenceError("mock script lock poisoned".to_string()))?;
        Ok(script.pop_front())
    }
}

behavior_builders!(MockGenerationProvider);

#[async_trait]
impl GenerationProvider for MockGenerationProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = match self.next_scripted()? {
            Some(response) => response,
            None => (self.responder)(prompt),
        };
        self.behavior
            .run(words(prompt).count() as u64, words(&response).count() as u64)
            .await?;
        Ok(response)
    }
}
