//! File source: enumerates candidate case-study documents from a directory.
//!
//! Only the extensions the extractor understands (`pdf`, `ppt`, `pptx`,
//! case-insensitive) are surfaced; everything else never reaches the pipeline.
//! Enumeration order is whatever the directory iterator yields: deterministic
//! for a stable directory, but not sorted.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while enumerating candidate documents.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The configured documents directory is missing or unreadable. This is the
    /// one fatal misconfiguration: the whole run aborts with this error.
    #[error("Documents directory {path} is not readable: {source}")]
    RootUnavailable {
        /// Directory the server was configured to scan.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Document formats the text extractor can handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Legacy PowerPoint presentation.
    Ppt,
    /// Office Open XML presentation.
    Pptx,
}

impl DocumentFormat {
    /// Infer the format from a file extension, case-insensitively.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "ppt" => Some(Self::Ppt),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }
}

/// Reference to one candidate document, created during enumeration.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    /// Bare file name, used as the record identifier.
    pub file_name: String,
    /// Absolute or root-relative path used to open the file.
    pub path: PathBuf,
    /// Format inferred from the extension.
    pub format: DocumentFormat,
}

/// Origin of the candidate document listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// Configured local directory.
    #[default]
    Local,
    /// Unrecognized source label; listed as empty rather than erroring so new
    /// sources can be introduced without breaking older callers.
    Unknown,
}

impl std::str::FromStr for SourceKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            _ => Ok(Self::Unknown),
        }
    }
}

/// Read-only directory listing scoped to supported document formats.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Create a source rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory this source scans.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate candidate documents for the given source kind.
    ///
    /// Unknown kinds yield an empty list. A missing root directory aborts with
    /// [`SourceError::RootUnavailable`].
    pub fn list_files(&self, kind: SourceKind) -> Result<Vec<DocumentRef>, SourceError> {
        if kind != SourceKind::Local {
            tracing::debug!(?kind, "Unsupported source kind; returning empty listing");
            return Ok(Vec::new());
        }

        let entries =
            std::fs::read_dir(&self.root).map_err(|source| SourceError::RootUnavailable {
                path: self.root.display().to_string(),
                source,
            })?;

        let mut documents = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(format) = path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(DocumentFormat::from_extension)
            else {
                continue;
            };
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            documents.push(DocumentRef {
                file_name: file_name.to_string(),
                path: path.clone(),
                format,
            });
        }

        tracing::debug!(
            root = %self.root.display(),
            count = documents.len(),
            "Enumerated candidate documents"
        );
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn format_inference_is_case_insensitive() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("Pptx"), Some(DocumentFormat::Pptx));
        assert_eq!(DocumentFormat::from_extension("ppt"), Some(DocumentFormat::Ppt));
        assert_eq!(DocumentFormat::from_extension("txt"), None);
        assert_eq!(DocumentFormat::from_extension("docx"), None);
    }

    #[test]
    fn listing_filters_unsupported_extensions() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["a.pdf", "b.txt", "c.PPTX", "d.ppt", "notes.md"] {
            fs::write(dir.path().join(name), b"stub").expect("write");
        }
        fs::create_dir(dir.path().join("nested.pdf")).expect("dir");

        let source = FileSource::new(dir.path());
        let mut names: Vec<String> = source
            .list_files(SourceKind::Local)
            .expect("listing")
            .into_iter()
            .map(|doc| doc.file_name)
            .collect();
        names.sort();

        assert_eq!(names, vec!["a.pdf", "c.PPTX", "d.ppt"]);
    }

    #[test]
    fn unknown_source_kind_lists_nothing() {
        let source = FileSource::new("/definitely/not/there");
        let docs = source
            .list_files("azure".parse().expect("infallible"))
            .expect("empty listing");
        assert!(docs.is_empty());
    }

    #[test]
    fn missing_root_is_fatal() {
        let source = FileSource::new("/definitely/not/there");
        let error = source.list_files(SourceKind::Local).expect_err("error");
        assert!(matches!(error, SourceError::RootUnavailable { .. }));
        assert!(error.to_string().contains("/definitely/not/there"));
    }
}
