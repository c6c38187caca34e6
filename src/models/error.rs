//! Custom error types for the ALB event adapter.
//!
//! This module defines error types that are specific to the adapter's domain,
//! providing more meaningful error information to callers and making error
//! handling more precise.

use lambda_runtime::Diagnostic;
use std::fmt;

/// Custom error type for the adapter.
#[derive(Debug)]
pub enum AdapterError {
    /// Malformed base64 payload or invalid percent-encoded data
    Decoding(String),
    /// Invocation event is missing required keys or has wrong-typed values
    MalformedEvent(String),
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decoding(msg) => write!(f, "Decoding error: {msg}"),
            Self::MalformedEvent(msg) => write!(f, "Malformed event: {msg}"),
        }
    }
}

impl std::error::Error for AdapterError {}

impl From<AdapterError> for Diagnostic {
    fn from(error: AdapterError) -> Self {
        let error_type = match &error {
            AdapterError::Decoding(_) => "DecodingError",
            AdapterError::MalformedEvent(_) => "MalformedEventError",
        };
        Self {
            error_type: error_type.to_string(),
            error_message: error.to_string(),
        }
    }
}
