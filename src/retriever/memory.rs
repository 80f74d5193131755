//! In-process retriever backend using cosine similarity.

use super::{Retriever, RetrieverError};
use crate::embedding::EmbeddingClient;
use crate::record::CaseStudyRecord;
use async_trait::async_trait;
use tokio::sync::RwLock;

struct IndexEntry {
    vector: Vec<f32>,
    summary: String,
}

/// Retriever holding `(embedding, summary)` pairs in memory.
pub struct MemoryRetriever {
    embedder: Box<dyn EmbeddingClient>,
    entries: RwLock<Vec<IndexEntry>>,
}

impl MemoryRetriever {
    /// Construct an empty in-memory retriever.
    pub fn new(embedder: Box<dyn EmbeddingClient>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Retriever for MemoryRetriever {
    async fn rebuild(&self, records: &[CaseStudyRecord]) -> Result<(), RetrieverError> {
        let mut entries = Vec::with_capacity(records.len());
        if !records.is_empty() {
            let summaries: Vec<String> =
                records.iter().map(|record| record.summary.clone()).collect();
            let vectors = self.embedder.generate_embeddings(summaries.clone()).await?;
            entries = vectors
                .into_iter()
                .zip(summaries)
                .map(|(vector, summary)| IndexEntry { vector, summary })
                .collect();
        }

        let count = entries.len();
        *self.entries.write().await = entries;
        tracing::debug!(entries = count, "Rebuilt in-memory summary index");
        Ok(())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<String>, RetrieverError> {
        let entries = self.entries.read().await;
        if entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut vectors = self
            .embedder
            .generate_embeddings(vec![text.to_string()])
            .await?;
        let query_vector = vectors.pop().unwrap_or_default();

        let mut scored: Vec<(f32, &IndexEntry)> = entries
            .iter()
            .map(|entry| (cosine_similarity(&query_vector, &entry.vector), entry))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, entry)| entry.summary.clone())
            .collect())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;

    fn record(file: &str, summary: &str) -> CaseStudyRecord {
        CaseStudyRecord {
            file: file.into(),
            summary: summary.into(),
            category_domain_tech: "1. Category: Case Study\n2. Domain: x".into(),
            full_text: "t".repeat(150),
        }
    }

    fn retriever() -> MemoryRetriever {
        MemoryRetriever::new(Box::new(HashingEmbedder::new(32)))
    }

    #[tokio::test]
    async fn empty_index_returns_empty_results() {
        let retriever = retriever();
        let hits = retriever.query("anything", 5).await.expect("query");
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn single_record_is_always_the_top_hit() {
        let retriever = retriever();
        retriever
            .rebuild(&[record("a.pdf", "A cloud migration case study for a retail bank.")])
            .await
            .expect("rebuild");

        let hits = retriever.query("completely unrelated text", 3).await.expect("query");
        assert_eq!(hits.len(), 1);
        assert!(hits[0].contains("cloud migration"));
    }

    #[tokio::test]
    async fn identical_summary_ranks_first() {
        let retriever = retriever();
        retriever
            .rebuild(&[
                record("a.pdf", "Payment fraud detection with streaming analytics."),
                record("b.pptx", "Warehouse robotics rollout across three sites."),
            ])
            .await
            .expect("rebuild");

        let hits = retriever
            .query("Payment fraud detection with streaming analytics.", 2)
            .await
            .expect("query");
        assert_eq!(hits[0], "Payment fraud detection with streaming analytics.");
    }

    #[tokio::test]
    async fn rebuild_replaces_prior_content() {
        let retriever = retriever();
        retriever
            .rebuild(&[record("a.pdf", "First run summary about logistics.")])
            .await
            .expect("rebuild");
        retriever.rebuild(&[]).await.expect("rebuild empty");

        let hits = retriever.query("logistics", 5).await.expect("query");
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn k_bounds_the_result_count() {
        let retriever = retriever();
        retriever
            .rebuild(&[
                record("a.pdf", "Summary one about data platforms."),
                record("b.pdf", "Summary two about machine learning."),
                record("c.pdf", "Summary three about observability."),
            ])
            .await
            .expect("rebuild");

        let hits = retriever.query("data", 2).await.expect("query");
        assert_eq!(hits.len(), 2);
    }
}
