//! Unified application error types for Huddle.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Authentication failed (bad signature, expired token, missing token).
    Authentication,
    /// The callee has no presence entry.
    TargetUnavailable,
    /// The callee is committed to another call.
    TargetBusy,
    /// The caller is not currently declared available.
    CallerNotEligible,
    /// An accept/reject/end referenced a party that has since disconnected.
    StaleCallReference,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A configuration error occurred.
    Configuration,
    /// An internal server error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::TargetUnavailable => write!(f, "TARGET_UNAVAILABLE"),
            Self::TargetBusy => write!(f, "TARGET_BUSY"),
            Self::CallerNotEligible => write!(f, "CALLER_NOT_ELIGIBLE"),
            Self::StaleCallReference => write!(f, "STALE_CALL_REFERENCE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Huddle.
///
/// Call-flow rejections (`TargetUnavailable`, `TargetBusy`, …) are surfaced
/// to the requesting client as a `call-error` event on its own connection;
/// they never terminate the connection and never mutate shared state.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create a target-unavailable error.
    pub fn target_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TargetUnavailable, message)
    }

    /// Create a target-busy error.
    pub fn target_busy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TargetBusy, message)
    }

    /// Create a caller-not-eligible error.
    pub fn caller_not_eligible(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CallerNotEligible, message)
    }

    /// Create a stale-call-reference error.
    pub fn stale_call_reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StaleCallReference, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_codes() {
        assert_eq!(ErrorKind::TargetBusy.to_string(), "TARGET_BUSY");
        assert_eq!(
            ErrorKind::StaleCallReference.to_string(),
            "STALE_CALL_REFERENCE"
        );
    }

    #[test]
    fn test_error_display_includes_kind_and_message() {
        let err = AppError::target_unavailable("User is offline or unavailable");
        assert_eq!(
            err.to_string(),
            "TARGET_UNAVAILABLE: User is offline or unavailable"
        );
    }
}
