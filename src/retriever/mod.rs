//! Summary retriever: one capability, interchangeable backends.
//!
//! The index holds one entry per accepted record's summary and is rebuilt from
//! scratch on every ingestion run; it is a cache derived from the accepted
//! set, never a source of truth. The backend is selected by configuration:
//! an in-process cosine store, or a Qdrant collection for deployments that
//! already run one.

mod memory;
mod qdrant;

use crate::config::{Config, RetrieverBackend};
use crate::embedding::{EmbeddingClientError, get_embedding_client};
use crate::record::CaseStudyRecord;
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

pub use memory::MemoryRetriever;
pub use qdrant::QdrantRetriever;

/// Errors raised while building or querying the summary index.
#[derive(Debug, Error)]
pub enum RetrieverError {
    /// Embedding provider failed to produce vectors.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Vector store responded with an unexpected status code.
    #[error("Unexpected vector-store response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Base URL failed to parse or normalize.
    #[error("Invalid vector-store URL: {0}")]
    InvalidUrl(String),
}

/// Similarity search over the accepted records' summaries.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Replace the index content with one entry per accepted record.
    async fn rebuild(&self, records: &[CaseStudyRecord]) -> Result<(), RetrieverError>;

    /// Return the `k` nearest summaries to the query text.
    ///
    /// An empty index yields an empty list, never an error.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<String>, RetrieverError>;
}

/// Build the retriever selected by configuration.
pub fn build_retriever(config: &Config) -> Result<Box<dyn Retriever>, RetrieverError> {
    let embedder = get_embedding_client(config.embedding_dimension);
    match config.retriever_backend {
        RetrieverBackend::Memory => Ok(Box::new(MemoryRetriever::new(embedder))),
        RetrieverBackend::Qdrant => {
            let url = config
                .qdrant_url
                .clone()
                .ok_or_else(|| RetrieverError::InvalidUrl("QDRANT_URL is not set".into()))?;
            Ok(Box::new(QdrantRetriever::new(
                url,
                config.qdrant_collection_name.clone(),
                config.qdrant_api_key.clone(),
                config.embedding_dimension as u64,
                embedder,
            )?))
        }
    }
}
