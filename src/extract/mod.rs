//! Text extraction, dispatched by document format.
//!
//! Extraction is a capability behind the [`TextExtractor`] trait so the
//! pipeline never depends on a concrete parser. The default implementation
//! reads PDFs through `pdf-extract` and presentations through a zip +
//! `quick-xml` slide walk. An empty extraction result is valid; only corrupt
//! or unreadable files produce an [`ExtractionError`].

mod pdf;
mod slides;

use crate::source::{DocumentFormat, DocumentRef};
use thiserror::Error;

/// Errors raised while extracting text from a single document.
///
/// These are per-file failures: the pipeline records them and moves on.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The file could not be opened or read from disk.
    #[error("Failed to read {file}: {source}")]
    Unreadable {
        /// Document the failure applies to.
        file: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file was readable but its internal structure could not be parsed.
    #[error("Failed to parse {file}: {reason}")]
    Malformed {
        /// Document the failure applies to.
        file: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// Capability turning a document reference into plain text.
pub trait TextExtractor: Send + Sync {
    /// Extract the document's text content.
    fn extract(&self, document: &DocumentRef) -> Result<String, ExtractionError>;
}

/// Default extractor dispatching on the inferred document format.
#[derive(Debug, Default)]
pub struct FormatExtractor;

impl FormatExtractor {
    /// Construct the default format-dispatching extractor.
    pub const fn new() -> Self {
        Self
    }
}

impl TextExtractor for FormatExtractor {
    fn extract(&self, document: &DocumentRef) -> Result<String, ExtractionError> {
        let data = std::fs::read(&document.path).map_err(|source| ExtractionError::Unreadable {
            file: document.file_name.clone(),
            source,
        })?;

        let text = match document.format {
            DocumentFormat::Pdf => pdf::extract_text(&document.file_name, &data)?,
            DocumentFormat::Ppt | DocumentFormat::Pptx => {
                slides::extract_text(&document.file_name, &data)?
            }
        };

        tracing::debug!(
            file = %document.file_name,
            chars = text.len(),
            "Extracted document text"
        );
        Ok(text)
    }
}
