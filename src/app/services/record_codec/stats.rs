//! Decoding statistics
//!
//! Tracks how many lines were read, how many records and attachment lines
//! decoded, how many were skipped and how many rows each section produced.

use crate::models::{DecodedLine, SectionCounts};
use serde::{Deserialize, Serialize};

/// Maximum number of error messages kept for the run summary
const MAX_RECORDED_ERRORS: usize = 100;

/// Simple decoding statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Total number of non-empty lines encountered
    pub lines_read: usize,

    /// Primary lines successfully decoded
    pub records_decoded: usize,

    /// Standalone attachment lines successfully decoded
    pub attachment_lines: usize,

    /// Lines skipped because of recoverable errors
    pub records_skipped: usize,

    /// Rows contributed per section
    pub section_counts: SectionCounts,

    /// First errors for debugging
    pub errors: Vec<String>,
}

impl DecodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a successfully decoded line
    pub fn record(&mut self, line: &DecodedLine) {
        self.lines_read += 1;
        match line {
            DecodedLine::Primary(_) => self.records_decoded += 1,
            DecodedLine::Attachment(_) => self.attachment_lines += 1,
        }
        for (kind, count) in line.section_counts() {
            *self.section_counts.entry(kind).or_insert(0) += count;
        }
    }

    /// Count a skipped line
    pub fn skip(&mut self, error: impl ToString) {
        self.lines_read += 1;
        self.records_skipped += 1;
        if self.errors.len() < MAX_RECORDED_ERRORS {
            self.errors.push(error.to_string());
        }
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.lines_read == 0 {
            0.0
        } else {
            ((self.records_decoded + self.attachment_lines) as f64 / self.lines_read as f64) * 100.0
        }
    }

    /// Fold another run's statistics into this one
    pub fn merge(&mut self, other: &DecodeStats) {
        self.lines_read += other.lines_read;
        self.records_decoded += other.records_decoded;
        self.attachment_lines += other.attachment_lines;
        self.records_skipped += other.records_skipped;
        for (kind, count) in &other.section_counts {
            *self.section_counts.entry(*kind).or_insert(0) += count;
        }
        let room = MAX_RECORDED_ERRORS.saturating_sub(self.errors.len());
        self.errors.extend(other.errors.iter().take(room).cloned());
    }
}
