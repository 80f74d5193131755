//! Qdrant-backed retriever storing one point per accepted summary.
//!
//! Rebuilding drops and recreates the collection so the index always mirrors
//! the latest accepted set; nothing survives from earlier runs.

use super::{Retriever, RetrieverError};
use crate::embedding::EmbeddingClient;
use crate::record::CaseStudyRecord;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

/// Retriever persisting summary vectors in a Qdrant collection.
pub struct QdrantRetriever {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    collection: String,
    vector_size: u64,
    embedder: Box<dyn EmbeddingClient>,
}

impl QdrantRetriever {
    /// Construct a retriever against the given Qdrant instance.
    pub fn new(
        base_url: String,
        collection: String,
        api_key: Option<String>,
        vector_size: u64,
        embedder: Box<dyn EmbeddingClient>,
    ) -> Result<Self, RetrieverError> {
        let client = Client::builder().user_agent("casestack/0.1").build()?;
        let base_url = normalize_base_url(&base_url).map_err(RetrieverError::InvalidUrl)?;
        tracing::debug!(url = %base_url, collection, "Initialized Qdrant retriever");

        Ok(Self {
            client,
            base_url,
            api_key,
            collection,
            vector_size,
            embedder,
        })
    }

    async fn recreate_collection(&self) -> Result<(), RetrieverError> {
        let response = self
            .request(Method::DELETE, &format!("collections/{}", self.collection))
            .send()
            .await?;
        // A missing collection on the first run is expected.
        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RetrieverError::UnexpectedStatus { status, body });
        }

        let body = json!({
            "vectors": {
                "size": self.vector_size,
                "distance": "Cosine"
            }
        });
        let response = self
            .request(Method::PUT, &format!("collections/{}", self.collection))
            .json(&body)
            .send()
            .await?;
        self.ensure_success(response).await?;
        tracing::debug!(collection = %self.collection, "Collection recreated");
        Ok(())
    }

    async fn upsert_summaries(
        &self,
        records: &[CaseStudyRecord],
        vectors: Vec<Vec<f32>>,
    ) -> Result<(), RetrieverError> {
        let now = current_timestamp_rfc3339();
        let points: Vec<Value> = records
            .iter()
            .zip(vectors)
            .map(|(record, vector)| {
                json!({
                    "id": Uuid::new_v4().to_string(),
                    "vector": vector,
                    "payload": {
                        "summary": record.summary,
                        "file": record.file,
                        "summary_hash": compute_summary_hash(&record.summary),
                        "timestamp": now,
                    }
                })
            })
            .collect();

        let point_count = points.len();
        let response = self
            .request(
                Method::PUT,
                &format!("collections/{}/points", self.collection),
            )
            .query(&[("wait", true)])
            .json(&json!({ "points": points }))
            .send()
            .await?;
        self.ensure_success(response).await?;
        tracing::debug!(
            collection = %self.collection,
            points = point_count,
            "Summary points indexed"
        );
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut req = self.client.request(method, format!("{base}/{path}"));
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("api-key", api_key);
        }
        req
    }

    async fn ensure_success(&self, response: reqwest::Response) -> Result<(), RetrieverError> {
        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = RetrieverError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Qdrant request failed");
            Err(error)
        }
    }
}

#[async_trait]
impl Retriever for QdrantRetriever {
    async fn rebuild(&self, records: &[CaseStudyRecord]) -> Result<(), RetrieverError> {
        self.recreate_collection().await?;
        if records.is_empty() {
            return Ok(());
        }

        let summaries: Vec<String> = records.iter().map(|r| r.summary.clone()).collect();
        let vectors = self.embedder.generate_embeddings(summaries).await?;
        self.upsert_summaries(records, vectors).await
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<String>, RetrieverError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut vectors = self
            .embedder
            .generate_embeddings(vec![text.to_string()])
            .await?;
        let vector = vectors.pop().unwrap_or_default();

        let body = json!({
            "query": vector,
            "limit": k,
            "with_payload": true,
        });
        let response = self
            .request(
                Method::POST,
                &format!("collections/{}/points/query", self.collection),
            )
            .json(&body)
            .send()
            .await?;

        // No collection yet means no index content, which is a valid state.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = RetrieverError::UnexpectedStatus { status, body };
            tracing::error!(collection = %self.collection, error = %error, "Qdrant search failed");
            return Err(error);
        }

        let payload: QueryResponse = response.json().await?;
        let points = match payload.result {
            QueryResponseResult::Points(points) => points,
            QueryResponseResult::Object { points } => points,
        };

        Ok(points
            .into_iter()
            .filter_map(|point| extract_summary(point.payload))
            .collect())
    }
}

fn extract_summary(payload: Option<Map<String, Value>>) -> Option<String> {
    payload
        .as_ref()
        .and_then(|map| map.get("summary"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

/// Deterministic hash of the summary text stored alongside each point.
fn compute_summary_hash(summary: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(summary.as_bytes());
    hex::encode(hasher.finalize())
}

fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[derive(Deserialize)]
struct QueryResponse {
    result: QueryResponseResult,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QueryResponseResult {
    Points(Vec<QueryPoint>),
    Object {
        #[serde(default)]
        points: Vec<QueryPoint>,
    },
}

#[derive(Deserialize)]
struct QueryPoint {
    #[serde(default)]
    payload: Option<Map<String, Value>>,
}
