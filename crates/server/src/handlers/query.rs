//! # Query Handlers
//!
//! The `/query` endpoint runs a question through translation and guarded
//! execution. `/query/validate` exposes the safety check on its own so callers
//! can test a query before sending it anywhere.

use super::{AppError, AppState};
use askdb::{guard, AskRequest, AskResponse, QueryError};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// The request body for the `/query/validate` endpoint.
#[derive(Deserialize, Debug)]
pub struct ValidateRequest {
    pub sql: String,
}

/// The response body for the `/query/validate` endpoint.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ValidateResponse {
    pub safe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Maps a body the `Json` extractor could not read to an `InvalidRequest`.
fn rejected(rejection: JsonRejection) -> AppError {
    QueryError::InvalidRequest(rejection.body_text()).into()
}

/// The handler for the `/query` endpoint.
///
/// Failures before a query exists (bad payload, empty schema, model
/// unavailable) become HTTP errors. Everything after translation is reported
/// inside the `AskResponse` with a `200 OK`.
pub async fn query_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(payload) = payload.map_err(rejected)?;
    let request: AskRequest = serde_json::from_value(payload)
        .map_err(|e| QueryError::InvalidRequest(e.to_string()))?;

    let request_id = Uuid::new_v4();
    let span = info_span!("query", %request_id);

    async move {
        info!("Received question: '{}'", request.question);
        let response = app_state.ask_client.ask(&request).await?;
        info!(
            "Answered with success={} kind={:?}",
            response.success, response.kind
        );
        Ok::<_, AppError>(Json(response))
    }
    .instrument(span)
    .await
}

/// The handler for the `/query/validate` endpoint.
pub async fn validate_handler(
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, AppError> {
    let Json(request) = payload.map_err(rejected)?;
    let response = match guard::validate(&request.sql) {
        Ok(()) => ValidateResponse {
            safe: true,
            reason: None,
        },
        Err(reason) => ValidateResponse {
            safe: false,
            reason: Some(reason.to_string()),
        },
    };
    Ok(Json(response))
}
