//! Error types for serial-tag synchronization.
//!
//! Two layers of failure exist:
//!
//! - [`ApiError`] describes a single failed call against the controller API.
//!   The sync driver treats it as a per-element skip, except when listing
//!   elements.
//! - [`SyncError`] describes failures that end the whole run.
//!
//! All errors implement `std::error::Error` via `thiserror`.

use std::io;
use thiserror::Error;

/// Result type alias for controller API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for run-level operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// A failed controller API call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The controller answered with a non-success HTTP status.
    #[error("{operation} returned HTTP {status}: {body}")]
    Status {
        /// The API operation (e.g., "get elements").
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the controller.
        body: String,
    },

    /// The request never produced a response.
    #[error("{operation} request failed: {message}")]
    Transport {
        /// The API operation.
        operation: String,
        /// Error message from the HTTP stack.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("{operation} returned an undecodable body: {message}")]
    Decode {
        /// The API operation.
        operation: String,
        /// Decoder error message.
        message: String,
    },

    /// No tenant is bound to the session yet.
    #[error("{operation} requires a logged-in session")]
    NotAuthenticated {
        /// The API operation.
        operation: String,
    },
}

impl ApiError {
    /// Creates an HTTP status error.
    pub fn status(operation: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a not-authenticated error.
    pub fn not_authenticated(operation: impl Into<String>) -> Self {
        Self::NotAuthenticated {
            operation: operation.into(),
        }
    }

    /// Returns the HTTP status code, if the controller sent one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors that abort a synchronization run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The initial element listing failed.
    #[error("Unable to read 'elements': {error}")]
    ElementsUnavailable {
        /// The underlying API failure.
        error: ApiError,
    },

    /// Login or token validation failed.
    #[error("{message}")]
    Auth {
        /// Error message shown to the operator.
        message: String,
    },

    /// Settings file or command line validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The setting that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {message}")]
    HttpClient {
        /// Error message.
        message: String,
    },

    /// Local I/O failed (settings file, prompt, progress output).
    #[error("I/O error during {operation}")]
    Io {
        /// What was being done.
        operation: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    /// Creates an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an I/O error.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ApiError::status("get interfaces", 404, "{\"_error\":\"not found\"}");
        assert_eq!(
            err.to_string(),
            "get interfaces returned HTTP 404: {\"_error\":\"not found\"}"
        );
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn test_transport_error_has_no_status() {
        let err = ApiError::transport("put interface", "connection reset");
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_elements_unavailable_wraps_api_error() {
        let err = SyncError::ElementsUnavailable {
            error: ApiError::status("get elements", 500, "boom"),
        };
        assert_eq!(
            err.to_string(),
            "Unable to read 'elements': get elements returned HTTP 500: boom"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = SyncError::io(
            "read password",
            io::Error::new(io::ErrorKind::UnexpectedEof, "eof"),
        );
        assert_eq!(err.to_string(), "I/O error during read password");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_auth_error_is_verbatim() {
        let err = SyncError::auth("AUTH_TOKEN login failure, please check token.");
        assert_eq!(
            err.to_string(),
            "AUTH_TOKEN login failure, please check token."
        );
    }

    #[test]
    fn test_invalid_config() {
        let err = SyncError::invalid_config("sdkdebug", "must be 0, 1 or 2");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for sdkdebug: must be 0, 1 or 2"
        );
    }
}
