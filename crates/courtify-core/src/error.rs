//! Error types for the Courtify core.

use thiserror::Error;
use uuid::Uuid;

use crate::models::DocumentStatus;
use crate::validation::ValidationError;

/// Result type alias using Courtify's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for intake and query operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A file candidate was rejected at submission time
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// HTTP/network request failed (no usable response)
    #[error("Request error: {0}")]
    Request(String),

    /// Remote service answered with a non-success status
    #[error("Remote service returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    /// Serialization/deserialization error, including unexpected response shapes
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Document processing failed after the analysis result was obtained
    #[error("Processing error: {0}")]
    Processing(String),

    /// A document update does not follow the forward lifecycle path
    #[error("Invalid transition for document {id}: {from} -> {to}")]
    InvalidTransition {
        id: Uuid,
        from: DocumentStatus,
        to: DocumentStatus,
    },

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    /// Task was cancelled before reaching a terminal state
    #[error("Cancelled: {0}")]
    Cancelled(Uuid),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error belongs to the transport class absorbed by fallback.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Request(_) | Error::RemoteStatus { .. } | Error::Serialization(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_request() {
        let err = Error::Request("network unreachable".to_string());
        assert_eq!(err.to_string(), "Request error: network unreachable");
    }

    #[test]
    fn test_error_display_remote_status() {
        let err = Error::RemoteStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Remote service returned 500: boom");
    }

    #[test]
    fn test_error_display_invalid_transition() {
        let id = Uuid::nil();
        let err = Error::InvalidTransition {
            id,
            from: DocumentStatus::Completed,
            to: DocumentStatus::Uploading,
        };
        assert_eq!(
            err.to_string(),
            format!("Invalid transition for document {}: completed -> uploading", id)
        );
    }

    #[test]
    fn test_error_display_document_not_found() {
        let id = Uuid::new_v4();
        let err = Error::DocumentNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_from_validation_error() {
        let err: Error = ValidationError::TooLarge {
            name: "big.pdf".to_string(),
            size: 11 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
        }
        .into();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("big.pdf"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_transport_classification() {
        assert!(Error::Request("x".into()).is_transport());
        assert!(Error::Serialization("x".into()).is_transport());
        assert!(Error::RemoteStatus {
            status: 404,
            body: String::new()
        }
        .is_transport());
        assert!(!Error::Processing("x".into()).is_transport());
        assert!(!Error::Internal("x".into()).is_transport());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
