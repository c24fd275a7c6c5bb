//! Error types for the MFMC reader.

use thiserror::Error;

/// Main error type for MFMC operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Root validation failed: wrong or missing type tag, unsupported version,
    /// or the store does not look like MFMC data at all.
    #[error("Invalid MFMC file: {0}")]
    FileFormat(String),

    /// A field declared mandatory by the schema is absent from storage.
    #[error("Mandatory field not found: {0}")]
    MandatoryFieldMissing(String),

    /// A field declared optional by the schema is absent from storage.
    #[error("Optional field not found: {0}")]
    OptionalFieldMissing(String),

    /// The field name is not part of the entity's schema.
    ///
    /// Producer-defined fields are reached through `user_attributes` and
    /// `user_datasets` instead.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The lookup key is not a usable field name.
    #[error("Invalid field key: {0:?}")]
    InvalidKey(String),

    /// Acquisition index outside `[0, count)`.
    #[error("Index {index} out of range (count: {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// A stored value cannot be mapped onto its declared semantic type.
    #[error("Cannot decode {field}: {reason}")]
    Decode { field: String, reason: String },

    /// The owning file index has been closed or dropped.
    #[error("Storage handle is closed")]
    HandleClosed,

    /// Node or attribute does not exist in storage.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not supported for this data.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Failure reported by the storage engine.
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a decode error for a field.
    pub fn decode(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode { field: field.into(), reason: reason.into() }
    }

    /// Create a file format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::FileFormat(msg.into())
    }

    /// True for the two "field absent" variants.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MandatoryFieldMissing(_) | Self::OptionalFieldMissing(_))
    }
}

/// Result type alias for MFMC operations.
pub type Result<T> = std::result::Result<T, Error>;
