use std::collections::HashMap;

use crate::extractor::tokenize;

/// Corpus-local term-frequency vectorizer for the degraded ranking path.
///
/// Vocabulary and vectors only make sense within the corpus they were fitted
/// on, which is why this does not implement `SkillEmbedder`: its vectors
/// must never be compared against model or hash embeddings.
#[derive(Debug, Clone, Default)]
pub struct TermFrequencyVectorizer {
    vocabulary: HashMap<String, usize>,
}

impl TermFrequencyVectorizer {
    /// Fit the vocabulary over every document, in first-seen order.
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let mut vocabulary = HashMap::new();
        for document in documents {
            for token in tokenize(&document.as_ref().to_lowercase()) {
                let next_index = vocabulary.len();
                vocabulary.entry(token).or_insert(next_index);
            }
        }
        Self { vocabulary }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Raw term counts over the fitted vocabulary; unseen tokens are dropped.
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.vocabulary.len()];
        for token in tokenize(&text.to_lowercase()) {
            if let Some(&index) = self.vocabulary.get(&token) {
                vector[index] += 1.0;
            }
        }
        vector
    }
}

/// Plain cosine for non-negative count vectors; range 0.0..=1.0 without any
/// remapping. Zero vectors score zero.
pub fn count_cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}
