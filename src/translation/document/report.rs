/*!
 * Per-document translation summary.
 */

use std::time::Duration;

use crate::translation::core::{LogEntry, ServiceStats};
use crate::xliff::XliffVersion;

/// What happened while translating one document into one language
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub version: XliffVersion,
    pub target_language: String,
    /// Source language sent to the provider
    pub source_language: String,

    /// Segments found
    pub segments_total: usize,
    /// Segments whose target now holds a translation
    pub segments_translated: usize,
    /// Segments with nothing to translate
    pub segments_unchanged: usize,
    /// Segments left with the source text
    pub segments_failed: usize,

    pub notes_translated: usize,
    pub attributes_translated: usize,
    /// Notes and attributes left as they were after an error
    pub auxiliary_failed: usize,

    /// Provider call counters for this document
    pub calls: ServiceStats,

    /// Fallbacks worth reviewing
    pub issues: Vec<LogEntry>,

    pub duration: Duration,
}

impl DocumentReport {
    pub fn new(version: XliffVersion, source_language: &str, target_language: &str) -> Self {
        Self {
            version,
            target_language: target_language.to_string(),
            source_language: source_language.to_string(),
            segments_total: 0,
            segments_translated: 0,
            segments_unchanged: 0,
            segments_failed: 0,
            notes_translated: 0,
            attributes_translated: 0,
            auxiliary_failed: 0,
            calls: ServiceStats::default(),
            issues: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Record a fallback
    pub fn issue(&mut self, message: impl Into<String>) {
        self.issues.push(LogEntry::warn(message));
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Whether every provider call made for the document failed
    pub fn provider_unavailable(&self) -> bool {
        self.calls.attempted > 0 && self.calls.failed == self.calls.attempted
    }

    /// One-line summary for the run log
    pub fn summary(&self) -> String {
        format!(
            "XLIFF {} -> {}: {}/{} segments translated, {} unchanged, {} failed; \
             {} notes, {} attributes; {} provider calls ({} failed, {} cached) in {:.1}s",
            self.version,
            self.target_language,
            self.segments_translated,
            self.segments_total,
            self.segments_unchanged,
            self.segments_failed,
            self.notes_translated,
            self.attributes_translated,
            self.calls.attempted,
            self.calls.failed,
            self.calls.cache_hits,
            self.duration.as_secs_f64()
        )
    }
}
