//! Error taxonomy for record operations.

use thiserror::Error;

use crate::store::BackendError;

/// Coarse classification used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request body.
    Decode,
    /// Well-formed body that breaks a field rule.
    Validation,
    /// The requested record does not exist.
    NotFound,
    /// Any store-side failure. Detail stays in the logs.
    Internal,
}

/// Errors produced while turning a request body into a draft.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid request body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("{field} {reason}")]
    Validation { field: &'static str, reason: String },
}

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::Decode(_) => ErrorKind::Decode,
            RequestError::Validation { .. } => ErrorKind::Validation,
        }
    }
}

/// Errors produced by the store gateway.
///
/// Display text names the failed step only; causes are reachable through
/// `source()` for logging.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found (key: {key})")]
    NotFound { key: String },

    #[error("failed to encode record")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write record (key: {key})")]
    WriteFailed {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to read back record (key: {key})")]
    ReadFailed {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("store request failed")]
    Transport {
        #[source]
        source: BackendError,
    },

    #[error("stored record is corrupt (key: {key})")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Encode { .. }
            | StoreError::WriteFailed { .. }
            | StoreError::ReadFailed { .. }
            | StoreError::Transport { .. }
            | StoreError::Corrupt { .. } => ErrorKind::Internal,
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "not_found",
            StoreError::Encode { .. } => "encode",
            StoreError::WriteFailed { .. } => "write_failed",
            StoreError::ReadFailed { .. } => "read_failed",
            StoreError::Transport { .. } => "transport",
            StoreError::Corrupt { .. } => "corrupt",
        }
    }
}

/// Result type for gateway operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_hides_cause() {
        let err = StoreError::Transport {
            source: BackendError::Unavailable("connection reset by peer".into()),
        };
        assert_eq!(err.to_string(), "store request failed");
        assert!(err
            .source()
            .map(|s| s.to_string().contains("connection reset"))
            .unwrap_or(false));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_not_found_kind() {
        let err = StoreError::NotFound {
            key: "record:x".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.label(), "not_found");
    }
}
