use std::hash::{Hash, Hasher};

use siphasher::sip::SipHasher13;

use super::{BackendError, Embedding, SkillEmbedder};

/// Fixed seeds for deterministic hashing. Changing either changes every
/// embedding, so any change must come with a version bump.
const HASH_SEED_K0: u64 = 0x6b69_6c6c_7365_7431;
const HASH_SEED_K1: u64 = 0x726f_6c65_6d61_7463;

/// Feature-hashing embedder: no model file, no training, O(tokens) per text.
/// SipHash-1-3 with fixed seeds keeps output stable across Rust versions.
#[derive(Debug)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash_index(&self, token: &str) -> usize {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimension
    }

    /// Sign hashing halves the collision bias of pure additive hashing.
    fn hash_sign(&self, token: &str) -> f32 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K1, HASH_SEED_K0);
        token.hash(&mut hasher);
        if hasher.finish() % 2 == 0 { 1.0 } else { -1.0 }
    }

    /// L2-normalized vector for one text. A text with no word tokens (the
    /// empty-skill convention) still hashes as a single token, so every
    /// input yields a usable unit vector.
    pub(crate) fn text_vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.is_empty() {
            let idx = self.hash_index(text);
            vector[idx] = self.hash_sign(text);
            return vector;
        }

        for token in tokens {
            let idx = self.hash_index(token);
            vector[idx] += self.hash_sign(token);
        }

        l2_normalize(&mut vector);
        vector
    }
}

pub(crate) fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

impl SkillEmbedder for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn version(&self) -> &str {
        "v1"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>, BackendError> {
        Ok(texts
            .iter()
            .map(|text| Embedding::new(self.text_vector(text), self.name()))
            .collect())
    }
}
