//! A single embedding vector.

use crate::error::EmbeddingResult;
use crate::similarity;

/// One text's vector, with where it came from.
///
/// Equality looks at the vector only.
#[derive(Debug, Clone)]
pub struct Embedding {
    /// Vector components.
    pub vector: Vec<f32>,
    /// Producing model, when known.
    pub model: Option<String>,
    /// Position of the source text in its request.
    pub index: Option<usize>,
}

impl Embedding {
    /// Wrap a vector.
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            model: None,
            index: None,
        }
    }

    /// Tag with the producing model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Tag with the request position.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Vector length.
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        similarity::l2_norm(&self.vector)
    }

    /// True when every component is zero, e.g. for text with no features.
    pub fn is_zero(&self) -> bool {
        self.vector.iter().all(|x| *x == 0.0)
    }

    /// Unclamped cosine similarity in `[-1, 1]`.
    pub fn cosine(&self, other: &Embedding) -> EmbeddingResult<f64> {
        similarity::cosine_similarity(&self.vector, &other.vector)
    }
}

impl PartialEq for Embedding {
    fn eq(&self, other: &Self) -> bool {
        self.vector == other.vector
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.vector
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(vector: Vec<f32>) -> Self {
        Self::new(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_do_not_affect_equality() {
        let tagged = Embedding::new(vec![0.6, 0.8]).with_model("m").with_index(3);
        assert_eq!(tagged.model.as_deref(), Some("m"));
        assert_eq!(tagged.index, Some(3));
        assert_eq!(tagged, Embedding::from(vec![0.6, 0.8]));
    }

    #[test]
    fn test_norm_and_zero() {
        let e = Embedding::new(vec![3.0, 4.0]);
        assert!((e.norm() - 5.0).abs() < 1e-9);
        assert!(!e.is_zero());
        assert!(Embedding::new(vec![0.0; 4]).is_zero());
    }

    #[test]
    fn test_cosine_can_be_negative() {
        let up = Embedding::new(vec![1.0, 0.0]);
        let down = Embedding::new(vec![-1.0, 0.0]);
        assert!((up.cosine(&down).unwrap() + 1.0).abs() < 1e-9);
        assert_eq!(up.as_ref(), &[1.0, 0.0]);
    }
}
