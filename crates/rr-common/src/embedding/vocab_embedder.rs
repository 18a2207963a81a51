use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use super::hash_embedder::{l2_normalize, HashEmbedder};
use super::{BackendError, Embedding, SkillEmbedder};

/// On-disk word-vector table exported from the trained sentence model.
#[derive(Debug, Deserialize)]
struct VocabFile {
    dimension: usize,
    #[serde(default = "default_version")]
    version: String,
    vectors: HashMap<String, Vec<f32>>,
}

fn default_version() -> String {
    "v1".into()
}

/// Primary embedding backend: averages per-word vectors from an exported
/// table. Out-of-vocabulary words get a deterministic hashed vector of the
/// same width, so every term encodes to something.
#[derive(Debug)]
pub struct VocabEmbedder {
    dimension: usize,
    version: String,
    vectors: HashMap<String, Vec<f32>>,
    oov: HashEmbedder,
}

impl VocabEmbedder {
    /// Load the table, verifying every row against the declared dimension.
    /// Any failure reports as `BackendError::Unavailable`; the factory then
    /// substitutes the hash backend.
    pub fn load(path: &Path, expected_dimension: usize) -> Result<Self, BackendError> {
        let file = File::open(path)
            .map_err(|err| BackendError::Unavailable(format!("open {}: {err}", path.display())))?;
        let parsed: VocabFile = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| BackendError::Unavailable(format!("parse {}: {err}", path.display())))?;

        if parsed.dimension == 0 || parsed.dimension != expected_dimension {
            return Err(BackendError::Unavailable(format!(
                "vocab dimension {} does not match configured {}",
                parsed.dimension, expected_dimension
            )));
        }
        if let Some((word, vector)) = parsed
            .vectors
            .iter()
            .find(|(_, vector)| vector.len() != parsed.dimension)
        {
            return Err(BackendError::Unavailable(format!(
                "vector for {word:?} has width {}, expected {}",
                vector.len(),
                parsed.dimension
            )));
        }

        Ok(Self {
            dimension: parsed.dimension,
            version: parsed.version,
            vectors: parsed.vectors,
            oov: HashEmbedder::new(parsed.dimension),
        })
    }

    fn word_vector(&self, word: &str) -> Vec<f32> {
        match self.vectors.get(word) {
            Some(vector) => vector.clone(),
            None => self.oov.text_vector(word),
        }
    }
}

impl SkillEmbedder for VocabEmbedder {
    fn name(&self) -> &'static str {
        "vocab"
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>, BackendError> {
        let embeddings = texts
            .iter()
            .map(|text| {
                let mut mean = vec![0.0f32; self.dimension];
                let words: Vec<&str> = text.split_whitespace().collect();
                if words.is_empty() {
                    return Embedding::new(self.oov.text_vector(text), self.name());
                }

                for word in &words {
                    for (slot, value) in mean.iter_mut().zip(self.word_vector(word)) {
                        *slot += value;
                    }
                }
                let count = words.len() as f32;
                for slot in &mut mean {
                    *slot /= count;
                }
                l2_normalize(&mut mean);
                Embedding::new(mean, self.name())
            })
            .collect();
        Ok(embeddings)
    }
}
