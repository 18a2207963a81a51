pub mod hash_embedder;
pub mod similarity;
pub mod term_frequency;
pub mod vocab_embedder;

use std::path::PathBuf;

pub use hash_embedder::HashEmbedder;
pub use similarity::cosine_similarity;
pub use term_frequency::TermFrequencyVectorizer;
pub use vocab_embedder::VocabEmbedder;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("embedding backend unavailable: {0}")]
    Unavailable(String),
}

/// A fixed-dimension skill vector, tagged with the backend that produced it.
/// Vectors from different backends never meet in one similarity computation;
/// the tag is what enforces that.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub backend: &'static str,
}

impl Embedding {
    pub fn new(vector: Vec<f32>, backend: &'static str) -> Self {
        Self { vector, backend }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// Abstract embedding provider.
///
/// Implementations:
/// - `VocabEmbedder`: word-vector table exported from the trained model
/// - `HashEmbedder`: feature hashing (deterministic, no model required)
///
/// Same input and backend version must give bit-identical output.
pub trait SkillEmbedder: Send + Sync {
    /// Implementation name ("vocab", "hash").
    fn name(&self) -> &'static str;

    /// Backend generation, bumped whenever token design or weights change.
    fn version(&self) -> &str;

    /// Output vector width.
    fn dimension(&self) -> usize;

    /// One vector per input text.
    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>, BackendError>;

    /// Element-wise mean of `encode(texts)`; a zero vector of `dimension()`
    /// when `texts` is empty.
    fn encode_mean(&self, texts: &[String]) -> Result<Embedding, BackendError> {
        let encoded = self.encode(texts)?;
        let mut mean = vec![0.0f32; self.dimension()];
        if encoded.is_empty() {
            return Ok(Embedding::new(mean, self.name()));
        }

        for embedding in &encoded {
            for (slot, value) in mean.iter_mut().zip(embedding.vector.iter()) {
                *slot += value;
            }
        }
        let count = encoded.len() as f32;
        for slot in &mut mean {
            *slot /= count;
        }
        Ok(Embedding::new(mean, self.name()))
    }

    /// Similarity of two embeddings in 0.0..=1.0. Mismatched backends or
    /// dimensions score zero rather than erroring.
    fn similarity(&self, a: &Embedding, b: &Embedding) -> f32 {
        if a.backend != b.backend {
            warn!(
                backend_a = a.backend,
                backend_b = b.backend,
                "embedding backend mismatch; returning zero similarity"
            );
            return 0.0;
        }
        cosine_similarity(&a.vector, &b.vector)
    }
}

/// Knobs for embedding backends, with `RR_*` env overrides.
#[derive(Debug, Clone)]
pub struct EmbedderConfig {
    /// Vector width of the hash backend (powers of two work best).
    pub dimension: usize,
    /// Word-vector table for the primary backend.
    pub vocab_path: Option<PathBuf>,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            dimension: 256,
            vocab_path: None,
        }
    }
}

impl EmbedderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            dimension: std::env::var("RR_EMBED_DIMENSION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.dimension),
            vocab_path: std::env::var_os("RR_VOCAB_PATH").map(PathBuf::from),
        }
    }
}

/// Build the requested backend, dropping to feature hashing when the primary
/// cannot load. The caller always receives a working embedder.
pub fn create_embedder(name: &str, config: &EmbedderConfig) -> Box<dyn SkillEmbedder> {
    match name {
        "vocab" => {
            let path = config
                .vocab_path
                .clone()
                .unwrap_or_else(|| PathBuf::from("models/skill_vectors.json"));
            match VocabEmbedder::load(&path, config.dimension) {
                Ok(embedder) => Box::new(embedder),
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "vocab backend unavailable; using hash backend"
                    );
                    Box::new(HashEmbedder::new(config.dimension))
                }
            }
        }
        _ => Box::new(HashEmbedder::new(config.dimension)),
    }
}

/// Initialize the embedder from `RR_EMBEDDER` / `RR_EMBED_DIMENSION` /
/// `RR_VOCAB_PATH`.
pub fn init_embedder_from_env() -> Box<dyn SkillEmbedder> {
    let config = EmbedderConfig::from_env();
    let name = std::env::var("RR_EMBEDDER").unwrap_or_else(|_| "hash".into());
    create_embedder(&name, &config)
}
