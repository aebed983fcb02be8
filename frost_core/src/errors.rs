//! # Error Types
//!
//! Structured error types for frost_core. Every failure the engine, the
//! reference sources or the history store can produce is one variant of
//! [`CalcError`], carrying enough context for a front end to tell the user
//! which field or file to fix.
//!
//! ## Example
//!
//! ```rust
//! use frost_core::errors::{CalcError, CalcResult};
//!
//! fn validate_thickness(thickness_m: f64) -> CalcResult<()> {
//!     if thickness_m <= 0.0 {
//!         return Err(CalcError::invalid_parameter(
//!             "thickness_m",
//!             thickness_m.to_string(),
//!             "Thickness must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for frost_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A reference record (soil, material) does not exist
    #[error("{kind} not found: {key}")]
    NotFound { kind: String, key: String },

    /// An input value is missing, non-numeric or out of range
    #[error("Invalid parameter '{field}': {value} - {reason}")]
    InvalidParameter {
        field: String,
        value: String,
        reason: String,
    },

    /// A divisor in the formula evaluated to zero
    #[error("Division by zero in {quantity}: {reason}")]
    DivisionByZero { quantity: String, reason: String },

    /// A square-root argument went negative
    #[error("Invalid domain for {quantity}: sqrt of {radicand} - {reason}")]
    InvalidDomain {
        quantity: String,
        radicand: f64,
        reason: String,
    },

    /// The reference-data collaborator failed or timed out
    #[error("Reference data unavailable ({source_name}): {reason}")]
    ReferenceDataUnavailable { source_name: String, reason: String },

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

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (report rendering and the like)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create a NotFound error
    pub fn not_found(kind: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::NotFound {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Create a NotFound error for an unknown soil code
    pub fn soil_not_found(code: impl Into<String>) -> Self {
        Self::not_found("Soil", code)
    }

    /// Create an InvalidParameter error
    pub fn invalid_parameter(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidParameter {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a DivisionByZero error
    pub fn division_by_zero(quantity: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::DivisionByZero {
            quantity: quantity.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidDomain error
    pub fn invalid_domain(quantity: impl Into<String>, radicand: f64, reason: impl Into<String>) -> Self {
        CalcError::InvalidDomain {
            quantity: quantity.into(),
            radicand,
            reason: reason.into(),
        }
    }

    /// Create a ReferenceDataUnavailable error
    pub fn reference_unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ReferenceDataUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (the caller may retry the I/O)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CalcError::FileLocked { .. } | CalcError::ReferenceDataUnavailable { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::NotFound { .. } => "NOT_FOUND",
            CalcError::InvalidParameter { .. } => "INVALID_PARAMETER",
            CalcError::DivisionByZero { .. } => "DIVISION_BY_ZERO",
            CalcError::InvalidDomain { .. } => "INVALID_DOMAIN",
            CalcError::ReferenceDataUnavailable { .. } => "REFERENCE_DATA_UNAVAILABLE",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_parameter("moisture", "1.5", "Moisture must be within [0, 1]");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidParameter\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::soil_not_found("99_9").error_code(), "NOT_FOUND");
        assert_eq!(
            CalcError::division_by_zero("sigma", "lambda_f is zero").error_code(),
            "DIVISION_BY_ZERO"
        );
        assert_eq!(
            CalcError::invalid_domain("part2", -0.5, "negative").error_code(),
            "INVALID_DOMAIN"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(CalcError::reference_unavailable("embedded", "timeout").is_recoverable());
        assert!(CalcError::file_locked("h.json", "someone", "now").is_recoverable());
        assert!(!CalcError::soil_not_found("x").is_recoverable());
    }

    #[test]
    fn test_display_mentions_key() {
        let msg = CalcError::soil_not_found("15_1").to_string();
        assert_eq!(msg, "Soil not found: 15_1");
    }
}
