use askdb::{FailureKind, QueryError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors originating from the `askdb` library.
    Query(QueryError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

/// Conversion from `QueryError` to `AppError`.
impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        AppError::Query(err)
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, kind, error_message) = match self {
            AppError::Query(err) => {
                let kind = err.kind();
                let status_code = match kind {
                    FailureKind::InvalidRequest | FailureKind::EmptySchema => {
                        warn!("Rejected request: {err}");
                        StatusCode::BAD_REQUEST
                    }
                    FailureKind::TranslationUnavailable => {
                        error!("Translation unavailable: {err:?}");
                        StatusCode::BAD_GATEWAY
                    }
                    _ => {
                        error!("Unexpected query error: {err:?}");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status_code, Some(kind), err.to_string())
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
        }));

        (status_code, body).into_response()
    }
}
