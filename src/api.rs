//! HTTP surface exposing ingestion, the record table, and question answering.
//!
//! Handlers are a thin adapter over [`PipelineApi`]: decode the request, call
//! the pipeline, encode the response. All domain decisions live below this
//! layer.

use crate::pipeline::{Answer, IngestOutcome, PipelineApi};
use crate::record::parse_tags;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Build the application router over any pipeline implementation.
pub fn app<S: PipelineApi>(service: Arc<S>) -> Router {
    Router::new()
        .route("/ingest", post(ingest_handler::<S>))
        .route("/records", get(records_handler::<S>))
        .route("/ask", post(ask_handler::<S>))
        .route("/metrics", get(metrics_handler::<S>))
        .with_state(service)
}

/// Request body for `POST /ingest`.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    /// Source label; defaults to the local documents directory.
    #[serde(default)]
    pub source: Option<String>,
}

/// Request body for `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Free-text question over the ingested summaries.
    pub question: String,
}

/// One row of the record table, with the tag string already parsed.
#[derive(Debug, Serialize)]
pub struct RecordRow {
    /// Document identifier (file name).
    pub file: String,
    /// Parsed document category.
    pub category: String,
    /// Parsed business domain.
    pub domain: String,
    /// Parsed technology list.
    pub technologies: String,
    /// Generated summary text.
    pub summary: String,
}

async fn ingest_handler<S: PipelineApi>(
    State(service): State<Arc<S>>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestOutcome>, AppError> {
    let kind = request
        .source
        .as_deref()
        .unwrap_or("local")
        .parse()
        .unwrap_or_default();
    let outcome = service.ingest(kind).await.map_err(AppError::from_error)?;
    Ok(Json(outcome))
}

async fn records_handler<S: PipelineApi>(State(service): State<Arc<S>>) -> Json<Vec<RecordRow>> {
    let rows = service
        .records()
        .await
        .into_iter()
        .map(|record| {
            let tags = parse_tags(&record.category_domain_tech);
            RecordRow {
                file: record.file,
                category: tags.category,
                domain: tags.domain,
                technologies: tags.technologies,
                summary: record.summary,
            }
        })
        .collect();
    Json(rows)
}

async fn ask_handler<S: PipelineApi>(
    State(service): State<Arc<S>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Answer>, AppError> {
    if request.question.trim().is_empty() {
        return Err(AppError::bad_request("question must not be empty"));
    }
    let answer = service
        .ask(&request.question)
        .await
        .map_err(AppError::from_error)?;
    Ok(Json(answer))
}

async fn metrics_handler<S: PipelineApi>(State(service): State<Arc<S>>) -> Response {
    Json(service.metrics_snapshot()).into_response()
}

/// Error adapter translating pipeline failures into HTTP responses.
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }

    fn from_error(error: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{IngestMetrics, MetricsSnapshot};
    use crate::pipeline::{AskError, FailureReport};
    use crate::record::CaseStudyRecord;
    use crate::retriever::RetrieverError;
    use crate::source::{SourceError, SourceKind};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct StubPipeline {
        ingest_calls: Mutex<Vec<SourceKind>>,
        records: Vec<CaseStudyRecord>,
        fail_source: bool,
        fail_ask: bool,
    }

    #[async_trait]
    impl PipelineApi for StubPipeline {
        async fn ingest(&self, kind: SourceKind) -> Result<IngestOutcome, SourceError> {
            self.ingest_calls.lock().unwrap().push(kind);
            if self.fail_source {
                return Err(SourceError::RootUnavailable {
                    path: "/missing".into(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
                });
            }
            Ok(IngestOutcome {
                records: self.records.clone(),
                failures: FailureReport::default(),
            })
        }

        async fn records(&self) -> Vec<CaseStudyRecord> {
            self.records.clone()
        }

        async fn ask(&self, question: &str) -> Result<Answer, AskError> {
            if self.fail_ask {
                return Err(AskError::Retriever(RetrieverError::InvalidUrl(
                    "bad url".into(),
                )));
            }
            Ok(Answer {
                text: format!("answer to: {question}"),
                matches: vec!["A matching summary".to_string()],
            })
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            IngestMetrics::new().snapshot()
        }
    }

    fn sample_record() -> CaseStudyRecord {
        CaseStudyRecord {
            file: "alpha.pdf".into(),
            summary: "A detailed summary long enough for the validator.".into(),
            category_domain_tech:
                "1. Category: Case Study\n2. Domain: Finance\n3. Technologies: Rust".into(),
            full_text: "x".repeat(150),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn ingest_defaults_to_local_source() {
        let stub = Arc::new(StubPipeline::default());
        let response = app(Arc::clone(&stub))
            .oneshot(
                Request::post("/ingest")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(stub.ingest_calls.lock().unwrap().as_slice(), &[SourceKind::Local]);
    }

    #[tokio::test]
    async fn ingest_with_unknown_source_still_succeeds() {
        let stub = Arc::new(StubPipeline::default());
        let response = app(Arc::clone(&stub))
            .oneshot(
                Request::post("/ingest")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"source":"azure"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            stub.ingest_calls.lock().unwrap().as_slice(),
            &[SourceKind::Unknown]
        );
    }

    #[tokio::test]
    async fn ingest_reports_missing_directory_as_server_error() {
        let stub = Arc::new(StubPipeline {
            fail_source: true,
            ..Default::default()
        });
        let response = app(stub)
            .oneshot(
                Request::post("/ingest")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn records_rows_carry_parsed_tags() {
        let stub = Arc::new(StubPipeline {
            records: vec![sample_record()],
            ..Default::default()
        });
        let response = app(stub)
            .oneshot(Request::get("/records").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let rows = body_json(response).await;
        assert_eq!(rows[0]["file"], "alpha.pdf");
        assert_eq!(rows[0]["category"], "Case Study");
        assert_eq!(rows[0]["domain"], "Finance");
        assert_eq!(rows[0]["technologies"], "Rust");
    }

    #[tokio::test]
    async fn ask_returns_answer_and_matches() {
        let stub = Arc::new(StubPipeline::default());
        let response = app(stub)
            .oneshot(
                Request::post("/ask")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"question":"What about fraud?"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["text"], "answer to: What about fraud?");
        assert_eq!(body["matches"][0], "A matching summary");
    }

    #[tokio::test]
    async fn empty_question_is_a_client_error() {
        let stub = Arc::new(StubPipeline::default());
        let response = app(stub)
            .oneshot(
                Request::post("/ask")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"question":"   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn ask_failure_maps_to_server_error() {
        let stub = Arc::new(StubPipeline {
            fail_ask: true,
            ..Default::default()
        });
        let response = app(stub)
            .oneshot(
                Request::post("/ask")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"question":"anything"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn metrics_snapshot_is_served_as_json() {
        let stub = Arc::new(StubPipeline::default());
        let response = app(stub)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["documents_seen"], 0);
        assert_eq!(body["records_accepted"], 0);
    }
}
