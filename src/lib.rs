//! ISPD Processor Library
//!
//! A Rust library for ingesting historical surface-pressure observation
//! records in the fixed-width composite (IMMA-style) and 41-column
//! delimited layouts into a partitioned record store, and for exporting
//! them again with optional ICOADS quality-control trimming.
//!
//! This library provides tools for:
//! - Decoding and encoding records section by section against a static
//!   field schema registry
//! - Binding standalone attachment lines to their parent rows by UID
//! - Assigning row ids and partitions from a per-date inventory
//! - Trimming reports and values on their ICOADS quality flags
//! - Wind components, coordinate projection and base-36 counters

pub mod config;
pub mod constants;
pub mod derived;
pub mod error;
pub mod header;
pub mod models;
pub mod processor;
pub mod schema;

// Core application modules
pub mod app {
    pub mod services {
        pub mod quality_control;
        pub mod record_codec;
        pub mod record_export;
        pub mod record_store;
        pub mod shard_manager;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
    pub mod input;
}

// Re-export commonly used types
pub use app::services::record_codec::RecordCodec;
pub use app::services::record_export::RecordExporter;
pub use app::services::record_store::{MemoryStore, RecordStore};
pub use app::services::shard_manager::ShardManager;
pub use config::ProcessorConfig;
pub use error::{Error, Result};
pub use models::{CompositeRecord, FieldValues, Value};
pub use processor::{IngestProcessor, IngestSummary};
pub use schema::{RecordFormat, SchemaRegistry, SectionKind};
