//! HTTP error responses.
//!
//! Every failure leaves the server as a status code plus `{"message": ...}`.
//! Store failures carry the action that failed in front of the cause, e.g.
//! `Error saving category: UNIQUE constraint failed`. Malformed JSON bodies and
//! query strings are answered the same way through [`JsonBody`] and [`QueryParams`].

use crate::errors::Error;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// An error ready to be sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Maps `err` to a response, prefixing store failures with `action`.
    #[must_use]
    pub fn with_context(err: Error, action: &str) -> Self {
        let mut api_error = Self::from(err);
        if api_error.status == StatusCode::INTERNAL_SERVER_ERROR {
            api_error.message = format!("{action}: {}", api_error.message);
        }
        api_error
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Message sent in the body.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::CategoryNotFound { .. } | Error::TransactionNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::Identity { .. } => StatusCode::BAD_GATEWAY,
            Error::Database(_)
            | Error::Overflow { .. }
            | Error::Config { .. }
            | Error::Io(_)
            | Error::EnvVar(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "Request failed");
        }
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

/// [`Json`] extractor that rejects with an [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// [`Query`](axum::extract::Query) extractor that rejects with an [`ApiError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// Attaches an action description to a failed accessor call.
pub trait ResultExt<T> {
    /// See [`ApiError::with_context`].
    fn context(self, action: &str) -> Result<T, ApiError>;
}

impl<T> ResultExt<T> for crate::errors::Result<T> {
    fn context(self, action: &str) -> Result<T, ApiError> {
        self.map_err(|err| ApiError::with_context(err, action))
    }
}
