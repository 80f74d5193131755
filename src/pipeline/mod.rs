//! Ingestion pipeline: discover, extract, generate, validate, index.
//!
//! This is the coordinating piece of the system. Per-file failures never abort
//! a run; they are collected into a [`FailureReport`] returned alongside the
//! accepted records, and the caller is expected to surface that report.

mod cache;
mod service;

pub use cache::{Fingerprint, RecordCache};
pub use service::{IngestService, PipelineApi};

use crate::generate::GenerationError;
use crate::record::{CaseStudyRecord, FieldIssue};
use crate::retriever::RetrieverError;
use serde::Serialize;

/// One document that failed extraction or generation.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    /// Document the failure applies to.
    pub file: String,
    /// Human-readable failure reason.
    pub reason: String,
}

/// One candidate record rejected by the validator.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationFailure {
    /// Document the rejected record was assembled from.
    pub file: String,
    /// Per-field diagnostics from the validator.
    pub issues: Vec<FieldIssue>,
}

/// Structured partial-failure report for one ingestion run.
///
/// This is the sole vehicle for partial-failure visibility; an empty report
/// means every enumerated document produced an accepted record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FailureReport {
    /// Files whose text extraction failed.
    pub extraction: Vec<FileFailure>,
    /// Files whose summarization or categorization failed.
    pub generation: Vec<FileFailure>,
    /// Candidate records rejected by the validator.
    pub validation: Vec<ValidationFailure>,
    /// Diagnostic captured when the retriever index could not be rebuilt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl FailureReport {
    /// True when the run completed without any per-file failure.
    pub fn is_empty(&self) -> bool {
        self.extraction.is_empty()
            && self.generation.is_empty()
            && self.validation.is_empty()
            && self.index.is_none()
    }
}

/// Result of one ingestion run: the accepted set plus the failure report.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    /// Records that passed validation, in processing order.
    pub records: Vec<CaseStudyRecord>,
    /// Everything that went wrong, per file.
    pub failures: FailureReport,
}

/// Answer produced for a free-text question over the accepted summaries.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// Generated answer text.
    pub text: String,
    /// Summaries retrieved as context, nearest first.
    pub matches: Vec<String>,
}

/// Errors raised while answering a question.
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    /// Similarity search against the summary index failed.
    #[error("Retriever query failed: {0}")]
    Retriever(#[from] RetrieverError),
    /// The language-model call failed.
    #[error("Answer generation failed: {0}")]
    Generation(#[from] GenerationError),
}
