//! Deterministic feature-hashing embedding model.
//!
//! Maps word unigrams and character trigrams into a fixed number of signed
//! buckets. No network and no model weights, so results are reproducible
//! across machines; useful for offline runs and tests. Lexical overlap drives
//! the similarity, not meaning.

use crate::embedding::Embedding;
use crate::error::EmbeddingResult;
use crate::model::{EmbedInput, EmbeddingModel, EmbeddingOutput, EmbeddingSettings};
use crate::similarity::normalize;
use async_trait::async_trait;

/// Default number of dimensions, matching `all-MiniLM-L6-v2`.
pub const DEFAULT_HASH_DIMENSIONS: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Feature-hashing embedding model.
///
/// Text with no words or trigrams (empty or punctuation only) maps to the
/// zero vector, and cosine similarity with a zero vector is 0.0. Two empty
/// texts therefore score 0.0 here, unlike a sentence-embedding model.
#[derive(Debug, Clone)]
pub struct HashEmbeddingModel {
    name: String,
    dimensions: usize,
}

impl HashEmbeddingModel {
    /// Create a model producing vectors of `dimensions` length (at least 1).
    pub fn new(dimensions: usize) -> Self {
        let dimensions = dimensions.max(1);
        Self {
            name: format!("hash:{}", dimensions),
            dimensions,
        }
    }

    /// Embed one text synchronously.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            self.add_feature(&mut vector, word.as_bytes(), 1.0);

            let padded: Vec<char> = std::iter::once('#')
                .chain(word.chars())
                .chain(std::iter::once('#'))
                .collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.add_feature(&mut vector, gram.as_bytes(), 0.5);
            }
        }

        normalize(&vector)
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashEmbeddingModel {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSIONS)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

#[async_trait]
impl EmbeddingModel for HashEmbeddingModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(
        &self,
        input: EmbedInput,
        _settings: &EmbeddingSettings,
    ) -> EmbeddingResult<EmbeddingOutput> {
        let embeddings = input
            .texts()
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                Embedding::new(self.embed_text(text))
                    .with_model(&self.name)
                    .with_index(i)
            })
            .collect();
        Ok(EmbeddingOutput::new(embeddings, &self.name))
    }
}
