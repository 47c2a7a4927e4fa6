//! # Error Types
//!
//! Structured error types for fime_core. The calculation engine itself never
//! fails on numeric input (see the `≤ 0` guards in [`crate::equations`]);
//! these errors come from the caller-side `validate()` helpers and from
//! parsing a [`crate::design::DesignInput`] out of JSON text.
//!
//! ## Example
//!
//! ```rust
//! use fime_core::errors::{CalcError, CalcResult};
//!
//! fn validate_flow(flow_lps: f64) -> CalcResult<()> {
//!     if flow_lps <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "flow_lps",
//!             flow_lps.to_string(),
//!             "Design flow must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for fime_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for input validation and parsing.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, non-finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Treatment unit key not recognized by the catalog
    #[error("Unknown treatment unit: {key}")]
    UnknownUnit { key: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownUnit error
    pub fn unknown_unit(key: impl Into<String>) -> Self {
        CalcError::UnknownUnit { key: key.into() }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::UnknownUnit { .. } => "UNKNOWN_UNIT",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

/// Reject zero, negative and non-finite values for a named field.
pub(crate) fn require_positive(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            "Must be a positive, finite number",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization_tag() {
        let error = CalcError::unknown_unit("xyz");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"UnknownUnit\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::unknown_unit("x").error_code(), "UNKNOWN_UNIT");
        assert_eq!(
            CalcError::invalid_input("flow_lps", "-1", "negative").error_code(),
            "INVALID_INPUT"
        );
        let parse = CalcError::SerializationError { reason: "eof".into() };
        assert_eq!(parse.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("flow_lps", 0.5).is_ok());
        assert!(require_positive("flow_lps", 0.0).is_err());
        assert!(require_positive("flow_lps", f64::NAN).is_err());
    }
}
