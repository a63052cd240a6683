//! Similarity functions for embeddings.

use crate::error::{EmbeddingError, EmbeddingResult};

/// Calculate cosine similarity between two vectors.
///
/// Returns a value between -1 and 1, where:
/// - 1 means identical direction
/// - 0 means orthogonal (or either vector is all zeros)
/// - -1 means opposite direction
///
/// Accumulates in `f64` so long vectors do not lose precision.
///
/// # Examples
///
/// ```
/// use refscore_embeddings::cosine_similarity;
///
/// let a = [1.0, 0.0];
/// let b = [1.0, 0.0];
/// assert!((cosine_similarity(&a, &b).unwrap() - 1.0).abs() < 1e-9);
///
/// let c = [0.0, 1.0];
/// assert!(cosine_similarity(&a, &c).unwrap().abs() < 1e-9);
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> EmbeddingResult<f64> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot = dot_product(a, b);
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot / (norm_a * norm_b))
    }
}

/// Dot product of two equal-length vectors.
fn dot_product(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

/// Euclidean length of a vector.
pub fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt()
}

/// Normalize a vector to unit length. Zero vectors are returned unchanged.
///
/// # Examples
///
/// ```
/// use refscore_embeddings::normalize;
///
/// let n = normalize(&[3.0, 4.0]);
/// assert!((n[0] - 0.6).abs() < 1e-6);
/// assert!((n[1] - 0.8).abs() < 1e-6);
/// ```
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = l2_norm(v);
    if norm == 0.0 {
        v.to_vec()
    } else {
        v.iter().map(|x| (f64::from(*x) / norm) as f32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b).unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch { left: 2, right: 1 }
        ));
    }

    #[test]
    fn test_normalize_zero() {
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_l2_norm() {
        assert!((l2_norm(&[3.0, 4.0]) - 5.0).abs() < 1e-9);
    }
}
