//! Error-to-response mapping.
//!
//! # Responsibilities
//! - Map error kinds to status codes
//! - Render `{"message": ...}` bodies
//! - Log the full cause chain and origin server-side only

use std::error::Error;
use std::panic::Location;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::records::{ErrorKind, ErrorResponse, RequestError, StoreError};

/// An error on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    label: &'static str,
    message: String,
    cause: Option<String>,
    location: &'static Location<'static>,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        status_for(self.kind)
    }

    /// Text sent to the client.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source position where the error was converted.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

/// Status code for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Decode | ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render the `source()` chain below `err`, outermost first.
fn cause_chain(err: &dyn Error) -> Option<String> {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    if causes.is_empty() {
        None
    } else {
        Some(causes.join(": "))
    }
}

impl From<StoreError> for ApiError {
    #[track_caller]
    fn from(err: StoreError) -> Self {
        Self {
            kind: err.kind(),
            label: err.label(),
            message: err.to_string(),
            cause: cause_chain(&err),
            location: Location::caller(),
        }
    }
}

impl From<RequestError> for ApiError {
    #[track_caller]
    fn from(err: RequestError) -> Self {
        let label = match err.kind() {
            ErrorKind::Decode => "decode",
            _ => "validation",
        };
        Self {
            kind: err.kind(),
            label,
            message: err.to_string(),
            cause: cause_chain(&err),
            location: Location::caller(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let cause = self.cause.as_deref().unwrap_or("-");
        let origin = format!("{}:{}", self.location.file(), self.location.line());

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                error = %self.message,
                cause = %cause,
                kind = self.label,
                origin = %origin,
                "Request failed"
            );
        } else {
            tracing::warn!(
                status = status.as_u16(),
                error = %self.message,
                cause = %cause,
                kind = self.label,
                origin = %origin,
                "Request rejected"
            );
        }

        (
            status,
            Json(ErrorResponse {
                message: self.message,
            }),
        )
            .into_response()
    }
}
