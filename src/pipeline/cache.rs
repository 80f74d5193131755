//! Fingerprint cache for previously accepted records.
//!
//! Re-running ingestion over an unchanged directory should not pay for
//! extraction and generation again. Each accepted record is cached under its
//! document's fingerprint (file length plus modification time); a changed
//! fingerprint invalidates the entry. The cache is advisory: any metadata
//! hiccup simply means the document is reprocessed.

use crate::record::CaseStudyRecord;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;

/// Stable identifier of one document's content version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    len: u64,
    mtime: Option<SystemTime>,
}

impl Fingerprint {
    /// Fingerprint a file from its metadata, or `None` when it is unreadable.
    pub fn of(path: &Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        Some(Self {
            len: metadata.len(),
            mtime: metadata.modified().ok(),
        })
    }
}

struct CachedEntry {
    fingerprint: Fingerprint,
    record: CaseStudyRecord,
}

/// Map from document identifier to its last accepted record.
#[derive(Default)]
pub struct RecordCache {
    entries: Mutex<HashMap<String, CachedEntry>>,
}

impl RecordCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached record when the fingerprint still matches.
    ///
    /// A stale entry (fingerprint mismatch) is evicted on the spot.
    pub fn lookup(&self, file: &str, fingerprint: Fingerprint) -> Option<CaseStudyRecord> {
        let mut entries = self.entries.lock().expect("record cache poisoned");
        match entries.get(file) {
            Some(entry) if entry.fingerprint == fingerprint => Some(entry.record.clone()),
            Some(_) => {
                entries.remove(file);
                None
            }
            None => None,
        }
    }

    /// Cache an accepted record under its document fingerprint.
    pub fn store(&self, file: String, fingerprint: Fingerprint, record: CaseStudyRecord) {
        let mut entries = self.entries.lock().expect("record cache poisoned");
        entries.insert(
            file,
            CachedEntry {
                fingerprint,
                record,
            },
        );
    }

    /// Drop a cached entry, forcing the document to be reprocessed.
    pub fn remove(&self, file: &str) {
        let mut entries = self.entries.lock().expect("record cache poisoned");
        entries.remove(file);
    }

    /// Evict entries for documents no longer present in the source listing.
    pub fn retain_known(&self, files: &HashSet<&str>) {
        let mut entries = self.entries.lock().expect("record cache poisoned");
        entries.retain(|file, _| files.contains(file.as_str()));
    }
}
