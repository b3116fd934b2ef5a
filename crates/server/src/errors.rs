use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::{ErrorKind, ServiceError};
use thiserror::Error;
use tracing::{error, info};

use crate::metrics;

/// Message shown to callers instead of the details of an internal failure.
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "INTERNAL_SERVER_ERROR";

/// HTTP status for each error classification.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error rendered as `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let kind = e.kind();
        metrics::ERRORS_TOTAL.with_label_values(&[kind.as_str()]).inc();
        let message = match kind {
            ErrorKind::Internal => {
                // full detail stays in the log
                error!(error = %e, "request failed");
                INTERNAL_SERVER_ERROR_MESSAGE.to_string()
            }
            _ => {
                info!(error = %e, kind = kind.as_str(), "request rejected");
                e.to_string()
            }
        };
        Self::new(status_for(kind), message)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::errors::RepositoryError;

    #[test]
    fn status_table() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_detail_is_hidden() {
        let e = ServiceError::internal("error when get product", RepositoryError::Db("relation \"product\" does not exist".into()));
        let api: JsonApiError = e.into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, INTERNAL_SERVER_ERROR_MESSAGE);
    }

    #[test]
    fn domain_messages_pass_through() {
        let api: JsonApiError = ServiceError::Validation("category not found".into()).into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "category not found");

        let api: JsonApiError = ServiceError::not_found("product").into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.message, "product not found");
    }
}
