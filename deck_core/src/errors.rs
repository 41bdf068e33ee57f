//! # Error Types
//!
//! Structured error types for deck_core. Geometry problems are never raised
//! through this type; the engine reports them in its error/warning maps.
//! `DeckError` covers everything around the engine: malformed requests,
//! missing reference data, file and configuration failures.
//!
//! ## Example
//!
//! ```rust
//! use deck_core::errors::{DeckError, DeckResult};
//!
//! fn require_wind(wind: f64) -> DeckResult<()> {
//!     if wind < 0.0 {
//!         return Err(DeckError::InvalidInput {
//!             field: "wind".to_string(),
//!             value: wind.to_string(),
//!             reason: "Ensure this value is greater than or equal to 0.".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for deck_core operations
pub type DeckResult<T> = Result<T, DeckError>;

/// Structured error type for service operations.
///
/// Each variant carries enough context for an API client to point at the
/// offending field or file without parsing the message.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum DeckError {
    /// An input value is invalid (out of range, wrong choice, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// No location record matches the requested state/district
    #[error("Location not found: {state} / {district}")]
    LocationNotFound { state: String, district: String },

    /// Reference data has not been ingested yet
    #[error("{catalog} not loaded: {hint}")]
    CatalogNotLoaded { catalog: String, hint: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Store schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error in '{source_name}': {reason}")]
    ConfigError { source_name: String, reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DeckError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        DeckError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        DeckError::MissingField {
            field: field.into(),
        }
    }

    /// Create a LocationNotFound error
    pub fn location_not_found(state: impl Into<String>, district: impl Into<String>) -> Self {
        DeckError::LocationNotFound {
            state: state.into(),
            district: district.into(),
        }
    }

    /// Create a CatalogNotLoaded error
    pub fn catalog_not_loaded(catalog: impl Into<String>, hint: impl Into<String>) -> Self {
        DeckError::CatalogNotLoaded {
            catalog: catalog.into(),
            hint: hint.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        DeckError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        DeckError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        DeckError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Create a ConfigError
    pub fn config(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        DeckError::ConfigError {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DeckError::FileLocked { .. })
    }

    /// Name of the request field this error points at, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            DeckError::InvalidInput { field, .. } | DeckError::MissingField { field } => Some(field),
            _ => None,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            DeckError::InvalidInput { .. } => "INVALID_INPUT",
            DeckError::MissingField { .. } => "MISSING_FIELD",
            DeckError::LocationNotFound { .. } => "LOCATION_NOT_FOUND",
            DeckError::CatalogNotLoaded { .. } => "CATALOG_NOT_LOADED",
            DeckError::FileError { .. } => "FILE_ERROR",
            DeckError::FileLocked { .. } => "FILE_LOCKED",
            DeckError::SerializationError { .. } => "SERIALIZATION_ERROR",
            DeckError::VersionMismatch { .. } => "VERSION_MISMATCH",
            DeckError::ConfigError { .. } => "CONFIG_ERROR",
            DeckError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
