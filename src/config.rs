//! Configuration management and validation.
//!
//! Provides the processing parameters of an ingestion or export run:
//! partition capacity, attachment binding modes, input layout and the
//! default trimming options. Loaded from JSON when a file is given,
//! otherwise built from defaults and overridden by command-line flags.

use crate::app::services::quality_control::TrimOptions;
use crate::constants::DEFAULT_PARTITION_CAPACITY;
use crate::error::{Error, Result};
use crate::schema::RecordFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Global configuration for record processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Rows a partition may hold before the next batch rolls over
    pub partition_capacity: u64,

    /// Create or extend an inventory record for every batch
    pub add_inventory: bool,

    /// Standalone attachment lines start with a bare six-character UID
    pub lead_uid: bool,

    /// Skip attachment rows already present on their parent row
    pub check_existing: bool,

    /// Decode scaled fields to real values instead of raw integers
    pub float_values: bool,

    /// Physical layout of the input lines
    pub input_format: RecordFormat,

    /// Trimming options applied on export
    pub trim: TrimOptions,

    /// Show a progress bar while reading input files
    pub show_progress: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            partition_capacity: DEFAULT_PARTITION_CAPACITY,
            add_inventory: false,
            lead_uid: false,
            check_existing: false,
            float_values: false,
            input_format: RecordFormat::Positional,
            trim: TrimOptions::default(),
            show_progress: true,
        }
    }
}

impl ProcessorConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ProcessorConfig = serde_json::from_str(&content)?;
        debug!("Loaded configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Create configuration with a custom partition capacity
    pub fn with_partition_capacity(mut self, capacity: u64) -> Self {
        self.partition_capacity = capacity;
        self
    }

    pub fn with_add_inventory(mut self, add_inventory: bool) -> Self {
        self.add_inventory = add_inventory;
        self
    }

    pub fn with_lead_uid(mut self, lead_uid: bool) -> Self {
        self.lead_uid = lead_uid;
        self
    }

    pub fn with_check_existing(mut self, check_existing: bool) -> Self {
        self.check_existing = check_existing;
        self
    }

    pub fn with_float_values(mut self, float_values: bool) -> Self {
        self.float_values = float_values;
        self
    }

    pub fn with_input_format(mut self, input_format: RecordFormat) -> Self {
        self.input_format = input_format;
        self
    }

    pub fn with_trim(mut self, trim: TrimOptions) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.partition_capacity == 0 {
            return Err(Error::configuration(
                "partition capacity must be greater than 0",
            ));
        }
        if self.lead_uid && self.input_format == RecordFormat::Delimited {
            return Err(Error::configuration(
                "leading-UID attachment lines only exist in the positional format",
            ));
        }
        self.trim.validate()
    }
}
