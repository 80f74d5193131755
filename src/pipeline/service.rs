//! Ingestion service wiring the capabilities together.

use super::{Answer, AskError, FailureReport, FileFailure, IngestOutcome, ValidationFailure};
use super::{Fingerprint, RecordCache};
use crate::config::Config;
use crate::extract::{FormatExtractor, TextExtractor};
use crate::generate::{GenerationClient, get_generation_client};
use crate::metrics::{IngestMetrics, MetricsSnapshot};
use crate::record::{CaseStudyRecord, validate};
use crate::retriever::{Retriever, RetrieverError, build_retriever};
use crate::source::{FileSource, SourceError, SourceKind};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Operations the HTTP layer needs from the pipeline.
///
/// Handlers are generic over this trait so tests can drive them with stubs.
#[async_trait]
pub trait PipelineApi: Send + Sync + 'static {
    /// Run one ingestion pass over the given source.
    async fn ingest(&self, kind: SourceKind) -> Result<IngestOutcome, SourceError>;

    /// Return the accepted records from the most recent run.
    async fn records(&self) -> Vec<CaseStudyRecord>;

    /// Answer a question using the summary index as context.
    async fn ask(&self, question: &str) -> Result<Answer, AskError>;

    /// Snapshot of the ingestion counters.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Default pipeline implementation backed by the configured capabilities.
pub struct IngestService {
    source: FileSource,
    extractor: Box<dyn TextExtractor>,
    generation: Box<dyn GenerationClient>,
    retriever: Box<dyn Retriever>,
    cache: RecordCache,
    accepted: RwLock<Vec<CaseStudyRecord>>,
    metrics: Arc<IngestMetrics>,
    search_top_k: usize,
}

impl IngestService {
    /// Assemble the service from configuration.
    pub fn new(config: &Config) -> Result<Self, RetrieverError> {
        Ok(Self::with_components(
            FileSource::new(config.documents_dir.clone()),
            Box::new(FormatExtractor::new()),
            get_generation_client(config),
            build_retriever(config)?,
            config.search_top_k,
        ))
    }

    /// Assemble the service from explicit components.
    pub fn with_components(
        source: FileSource,
        extractor: Box<dyn TextExtractor>,
        generation: Box<dyn GenerationClient>,
        retriever: Box<dyn Retriever>,
        search_top_k: usize,
    ) -> Self {
        Self {
            source,
            extractor,
            generation,
            retriever,
            cache: RecordCache::new(),
            accepted: RwLock::new(Vec::new()),
            metrics: Arc::new(IngestMetrics::new()),
            search_top_k,
        }
    }

    /// Shared handle to the ingestion counters.
    pub fn metrics(&self) -> Arc<IngestMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Process one document into a candidate record, reusing the cache when
    /// the file is unchanged since its last accepted run.
    async fn process_document(
        &self,
        document: &crate::source::DocumentRef,
        failures: &mut FailureReport,
    ) -> Option<CaseStudyRecord> {
        let fingerprint = Fingerprint::of(&document.path);
        if let Some(fingerprint) = fingerprint
            && let Some(record) = self.cache.lookup(&document.file_name, fingerprint)
        {
            // Cached records are revalidated so tightened constraints take
            // effect without a fingerprint change.
            if validate(&record).valid {
                self.metrics.record_cache_hit();
                tracing::debug!(file = %document.file_name, "Reusing cached record");
                return Some(record);
            }
            self.cache.remove(&document.file_name);
        }

        let text = match self.extractor.extract(document) {
            Ok(text) => text,
            Err(error) => {
                self.metrics.record_extraction_failure();
                tracing::warn!(file = %document.file_name, error = %error, "Extraction failed");
                failures.extraction.push(FileFailure {
                    file: document.file_name.clone(),
                    reason: error.to_string(),
                });
                return None;
            }
        };

        let generated = async {
            let summary = self.generation.summarize(&text).await?;
            let tags = self.generation.categorize(&text).await?;
            Ok::<_, crate::generate::GenerationError>((summary, tags))
        }
        .await;
        let (summary, category_domain_tech) = match generated {
            Ok(pair) => pair,
            Err(error) => {
                self.metrics.record_generation_failure();
                tracing::warn!(file = %document.file_name, error = %error, "Generation failed");
                failures.generation.push(FileFailure {
                    file: document.file_name.clone(),
                    reason: error.to_string(),
                });
                return None;
            }
        };

        let record = CaseStudyRecord {
            file: document.file_name.clone(),
            summary,
            category_domain_tech,
            full_text: text,
        };

        let report = validate(&record);
        if !report.valid {
            self.metrics.record_validation_failure();
            tracing::warn!(
                file = %document.file_name,
                issues = report.issues.len(),
                "Candidate record rejected by validation"
            );
            self.cache.remove(&document.file_name);
            failures.validation.push(ValidationFailure {
                file: document.file_name.clone(),
                issues: report.issues,
            });
            return None;
        }

        self.metrics.record_accepted();
        if let Some(fingerprint) = fingerprint {
            self.cache
                .store(document.file_name.clone(), fingerprint, record.clone());
        }
        Some(record)
    }
}

#[async_trait]
impl PipelineApi for IngestService {
    async fn ingest(&self, kind: SourceKind) -> Result<IngestOutcome, SourceError> {
        let documents = self.source.list_files(kind)?;
        tracing::info!(count = documents.len(), "Starting ingestion run");

        let mut records = Vec::new();
        let mut failures = FailureReport::default();
        for document in &documents {
            self.metrics.record_document();
            if let Some(record) = self.process_document(document, &mut failures).await {
                records.push(record);
            }
        }

        let known: std::collections::HashSet<&str> = documents
            .iter()
            .map(|document| document.file_name.as_str())
            .collect();
        self.cache.retain_known(&known);

        // Index trouble degrades retrieval but never the accepted set.
        if let Err(error) = self.retriever.rebuild(&records).await {
            tracing::warn!(error = %error, "Failed to rebuild the summary index");
            failures.index = Some(error.to_string());
        }

        *self.accepted.write().await = records.clone();
        tracing::info!(
            accepted = records.len(),
            extraction_failures = failures.extraction.len(),
            generation_failures = failures.generation.len(),
            validation_failures = failures.validation.len(),
            "Ingestion run finished"
        );
        Ok(IngestOutcome { records, failures })
    }

    async fn records(&self) -> Vec<CaseStudyRecord> {
        self.accepted.read().await.clone()
    }

    async fn ask(&self, question: &str) -> Result<Answer, AskError> {
        let matches = self.retriever.query(question, self.search_top_k).await?;
        if matches.is_empty() {
            self.metrics.record_question();
            return Ok(Answer {
                text: "No case studies have been ingested yet.".to_string(),
                matches,
            });
        }

        let context = matches.join("\n\n");
        let text = self.generation.answer(question, &context).await?;
        self.metrics.record_question();
        tracing::debug!(matches = matches.len(), "Answered question");
        Ok(Answer { text, matches })
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::extract::ExtractionError;
    use crate::generate::GenerationError;
    use crate::retriever::MemoryRetriever;
    use crate::source::DocumentRef;

    struct FixedExtractor;

    impl TextExtractor for FixedExtractor {
        fn extract(&self, _document: &DocumentRef) -> Result<String, ExtractionError> {
            Ok("Document body text. ".repeat(10))
        }
    }

    struct FixedGeneration;

    #[async_trait]
    impl GenerationClient for FixedGeneration {
        async fn summarize(&self, _text: &str) -> Result<String, GenerationError> {
            Ok("A regenerated summary comfortably past the length gate.".to_string())
        }

        async fn categorize(&self, _text: &str) -> Result<String, GenerationError> {
            Ok("1. Category: Case Study\n2. Domain: Retail\n3. Technologies: Rust".to_string())
        }

        async fn answer(&self, _question: &str, _context: &str) -> Result<String, GenerationError> {
            Ok("An answer.".to_string())
        }
    }

    fn service(dir: &std::path::Path) -> IngestService {
        IngestService::with_components(
            FileSource::new(dir),
            Box::new(FixedExtractor),
            Box::new(FixedGeneration),
            Box::new(MemoryRetriever::new(Box::new(HashingEmbedder::new(16)))),
            2,
        )
    }

    #[tokio::test]
    async fn cached_record_failing_revalidation_is_reprocessed() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.pdf"), b"bytes").expect("seed");
        let service = service(dir.path());

        // Plant an entry that would no longer pass validation, under the
        // file's current fingerprint.
        let fingerprint = Fingerprint::of(&dir.path().join("a.pdf")).expect("fingerprint");
        service.cache.store(
            "a.pdf".into(),
            fingerprint,
            CaseStudyRecord {
                file: "a.pdf".into(),
                summary: "too short".into(),
                category_domain_tech: "1. Category: Case Study".into(),
                full_text: "t".repeat(150),
            },
        );

        let outcome = service.ingest(SourceKind::Local).await.expect("ingest");
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.records[0].summary.starts_with("A regenerated"));
        assert_eq!(service.metrics_snapshot().cache_hits, 0);
    }

    #[tokio::test]
    async fn cache_entries_for_deleted_documents_are_evicted() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.pdf"), b"bytes").expect("seed");
        let service = service(dir.path());

        let fingerprint = Fingerprint::of(&dir.path().join("a.pdf")).expect("fingerprint");
        service.ingest(SourceKind::Local).await.expect("first run");
        std::fs::remove_file(dir.path().join("a.pdf")).expect("delete");
        service.ingest(SourceKind::Local).await.expect("second run");

        assert!(service.cache.lookup("a.pdf", fingerprint).is_none());
    }
}
