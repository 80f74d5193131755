use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing ingestion activity.
#[derive(Default)]
pub struct IngestMetrics {
    documents_seen: AtomicU64,
    records_accepted: AtomicU64,
    extraction_failures: AtomicU64,
    generation_failures: AtomicU64,
    validation_failures: AtomicU64,
    cache_hits: AtomicU64,
    questions_answered: AtomicU64,
}

impl IngestMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document pulled from the file source.
    pub fn record_document(&self) {
        self.documents_seen.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a record that passed validation and entered the accepted set.
    pub fn record_accepted(&self) {
        self.records_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a per-file extraction failure.
    pub fn record_extraction_failure(&self) {
        self.extraction_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a per-file generation failure.
    pub fn record_generation_failure(&self) {
        self.generation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a candidate record rejected by the validator.
    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a document served from the fingerprint cache.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an answered question.
    pub fn record_question(&self) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_seen: self.documents_seen.load(Ordering::Relaxed),
            records_accepted: self.records_accepted.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            generation_failures: self.generation_failures.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of ingestion counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents enumerated by the file source since startup.
    pub documents_seen: u64,
    /// Records that passed validation and entered an accepted set.
    pub records_accepted: u64,
    /// Files skipped because text extraction failed.
    pub extraction_failures: u64,
    /// Files skipped because the language-model call failed.
    pub generation_failures: u64,
    /// Candidate records rejected by the validator.
    pub validation_failures: u64,
    /// Documents reused from the fingerprint cache.
    pub cache_hits: u64,
    /// Questions answered through the retriever.
    pub questions_answered: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = IngestMetrics::new();
        metrics.record_document();
        metrics.record_document();
        metrics.record_accepted();
        metrics.record_extraction_failure();
        metrics.record_validation_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_seen, 2);
        assert_eq!(snapshot.records_accepted, 1);
        assert_eq!(snapshot.extraction_failures, 1);
        assert_eq!(snapshot.generation_failures, 0);
        assert_eq!(snapshot.validation_failures, 1);
    }

    #[test]
    fn snapshot_starts_empty() {
        let metrics = IngestMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_seen, 0);
        assert_eq!(snapshot.cache_hits, 0);
        assert_eq!(snapshot.questions_answered, 0);
    }
}
