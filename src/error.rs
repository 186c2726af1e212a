//! Error handling for ISPD/IMMA record processing.
//!
//! Every failure the core can produce is one of a small taxonomy. Some
//! variants describe a defect in configuration or in the schema registry and
//! must abort the whole run; the others describe a single bad input record
//! that is skipped with a warning while the run carries on.

use crate::app::services::record_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Unknown section or field name. Always a registry/config mismatch.
    #[error("Schema lookup failed: {message}")]
    SchemaLookup { message: String },

    /// The line does not match the expected section/field layout.
    #[error("Malformed record: {reason}")]
    MalformedRecord { reason: String },

    /// A value does not fit its fixed output width during encode.
    #[error("Field overflow in {section}.{field}: '{value}' exceeds {width} characters")]
    FieldOverflow {
        section: String,
        field: String,
        value: String,
        width: usize,
    },

    /// An attachment record whose UID cannot be bound to a stored row.
    #[error("Unresolvable UID '{uid}': {reason}")]
    MissingUid { uid: String, reason: String },

    /// Invalid options or thresholds, or absent trimming flags.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a schema lookup error
    pub fn schema_lookup(message: impl Into<String>) -> Self {
        Self::SchemaLookup {
            message: message.into(),
        }
    }

    /// Create a malformed record error
    pub fn malformed_record(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            reason: reason.into(),
        }
    }

    /// Create a field overflow error
    pub fn field_overflow(
        section: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
        width: usize,
    ) -> Self {
        Self::FieldOverflow {
            section: section.into(),
            field: field.into(),
            value: value.into(),
            width,
        }
    }

    /// Create a missing UID error
    pub fn missing_uid(uid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MissingUid {
            uid: uid.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error must terminate the run.
    ///
    /// Record-level conditions (malformed lines, overflowing fields,
    /// unresolvable attachment UIDs) are skipped and counted; everything else
    /// means the registry, configuration or store can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::MalformedRecord { .. }
            | Error::FieldOverflow { .. }
            | Error::MissingUid { .. } => false,
            Error::SchemaLookup { .. }
            | Error::Configuration { .. }
            | Error::Store(_)
            | Error::Io(_)
            | Error::Serialization(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_level_errors_are_recoverable() {
        assert!(!Error::malformed_record("39 fields").is_fatal());
        assert!(!Error::field_overflow("core", "slp", "123456", 5).is_fatal());
        assert!(!Error::missing_uid("AB1234", "not indexed").is_fatal());
    }

    #[test]
    fn test_registry_and_config_errors_are_fatal() {
        assert!(Error::schema_lookup("no field 'xyz'").is_fatal());
        assert!(Error::configuration("OPTF=7").is_fatal());
        assert!(Error::Store(StoreError::TableNotFound("core_1".to_string())).is_fatal());
    }

    #[test]
    fn test_overflow_message_names_field() {
        let err = Error::field_overflow("core regular", "slp", "123456", 5);
        let message = err.to_string();
        assert!(message.contains("core regular.slp"));
        assert!(message.contains("5 characters"));
    }
}
