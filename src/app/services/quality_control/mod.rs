//! Quality-control trimming engine
//!
//! Decodes the packed trimming and QC flags of a record into a flag vector
//! and applies the legacy trimming rule table to decide which observed
//! variables are unusable, or whether the whole report is rejected.
//!
//! Evaluation is a pure function of the record and the options. The only
//! error it raises is `Configuration`: missing trimming flags or options out
//! of range, both of which abort the run.
//!
//! ## Architecture
//!
//! - [`options`] - The six trimming toggles and their ranges
//! - [`flags`] - Flag vector decoding
//! - [`grid`] - Location quality code from the bearing box
//! - [`trimming`] - Rule table and value trimming

pub mod flags;
pub mod grid;
pub mod options;
pub mod trimming;

#[cfg(test)]
pub mod tests;

pub use flags::{decode_flags, FlagVector};
pub use grid::{b2qxy, grid_quality, qb10};
pub use options::TrimOptions;
pub use trimming::{evaluate, trim_flags, Rejections, ReportContext, TrimResult, TrimmedValues};

use crate::error::Result;
use crate::models::CompositeRecord;
use tracing::debug;

/// Trimming engine bound to a validated set of options
#[derive(Debug, Clone, Copy)]
pub struct TrimmingEngine {
    options: TrimOptions,
}

impl TrimmingEngine {
    /// Create an engine; out-of-range options are refused up front
    pub fn new(options: TrimOptions) -> Result<Self> {
        options.validate()?;
        debug!("Trimming with {:?}", options);
        Ok(Self { options })
    }

    pub fn options(&self) -> &TrimOptions {
        &self.options
    }

    pub fn evaluate(&self, record: &CompositeRecord) -> Result<TrimResult> {
        trimming::evaluate(record, &self.options)
    }

    /// Trim a record in place; false when the report is rejected
    pub fn apply(&self, record: &mut CompositeRecord) -> Result<bool> {
        trimming::apply(record, &self.options)
    }
}
