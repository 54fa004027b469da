//! Embedding provider seam
//!
//! Query embeddings come from an external generator with a deployment-fixed
//! dimension; the call may fail or time out, and the vector strategy treats
//! either as a disabled refinement rather than a request failure.
//! [`HashingEmbedder`] is a deterministic local provider for tests and
//! offline runs.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding generation failed: {0}")]
    Generation(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// External embedding generator
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate the embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// The fixed embedding dimension
    fn dimension(&self) -> usize;
}

/// Feature-hashing embedder
///
/// Buckets token counts by hash and L2-normalizes. Deterministic for a given
/// input and dimension, so tests can rely on stable similarities; too crude
/// for production relevance.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text.to_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeddings_are_deterministic() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed("red running shoes").await.unwrap();
        let b = embedder.embed("red running shoes").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn shared_tokens_raise_similarity() {
        let embedder = HashingEmbedder::new(64);
        let query = embedder.embed("red shoes").await.unwrap();
        let close = embedder.embed("red running shoes").await.unwrap();
        let far = embedder.embed("ceramic coffee mug").await.unwrap();

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&query, &close) > dot(&query, &far));
    }

    #[tokio::test]
    async fn unit_norm_output() {
        let embedder = HashingEmbedder::new(32);
        let v = embedder.embed("blue denim jacket").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}
