//! Embedding client abstraction used by the summary retriever.
//!
//! The retriever only needs a text-to-vector function; the default client is a
//! deterministic byte-folding encoder so the index works without any external
//! embedding service. Swapping in a hosted provider means implementing
//! [`EmbeddingClient`] and wiring it through [`get_embedding_client`].

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Deterministic embedding client folding input bytes into a unit vector.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Construct an encoder producing vectors of the given dimension.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimension];

        if text.is_empty() {
            return embedding;
        }

        for (idx, byte) in text.bytes().enumerate() {
            let slot = idx % self.dimension;
            embedding[slot] += f32::from(byte) / 255.0;
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();

        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingClient for HashingEmbedder {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        tracing::debug!(
            dimension = self.dimension,
            count = texts.len(),
            "Generating embeddings"
        );

        Ok(texts.iter().map(|text| self.encode(text)).collect())
    }
}

/// Build an embedding client for the configured dimension.
pub fn get_embedding_client(dimension: usize) -> Box<dyn EmbeddingClient> {
    Box::new(HashingEmbedder::new(dimension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeddings_are_deterministic_and_normalized() {
        let client = HashingEmbedder::new(16);
        let first = client
            .generate_embeddings(vec!["case study".into()])
            .await
            .expect("embeddings");
        let second = client
            .generate_embeddings(vec!["case study".into()])
            .await
            .expect("embeddings");
        assert_eq!(first, second);

        let norm: f32 = first[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn empty_input_batch_is_rejected() {
        let client = HashingEmbedder::new(16);
        let error = client
            .generate_embeddings(Vec::new())
            .await
            .expect_err("error");
        assert!(error.to_string().contains("no texts"));
    }

    #[tokio::test]
    async fn zero_dimension_is_rejected() {
        let client = HashingEmbedder::new(0);
        let error = client
            .generate_embeddings(vec!["text".into()])
            .await
            .expect_err("error");
        assert!(error.to_string().contains("dimension"));
    }

    #[tokio::test]
    async fn distinct_texts_produce_distinct_vectors() {
        let client = HashingEmbedder::new(16);
        let vectors = client
            .generate_embeddings(vec!["finance banking".into(), "healthcare ml".into()])
            .await
            .expect("embeddings");
        assert_ne!(vectors[0], vectors[1]);
    }
}
