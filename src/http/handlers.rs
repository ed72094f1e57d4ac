//! Record endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::records::{parse_create_request, Record, RecordResponse};

/// `POST /records`
///
/// The body is taken as raw bytes so decode failures get the same
/// `{"message"}` shape as every other error.
pub async fn create_record(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RecordResponse>, ApiError> {
    let draft = parse_create_request(&body)?;
    let record = state.gateway.create(draft).await?;

    tracing::info!(id = %record.id, "Record created");
    Ok(Json(record.to_response()))
}

/// `GET /records/{id}`
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecordResponse>, ApiError> {
    let record = state.gateway.get_by_id(&id).await?;
    Ok(Json(record.to_response()))
}

/// `GET /records`
///
/// 204 with no body when nothing is stored.
pub async fn list_records(State(state): State<AppState>) -> Result<Response, ApiError> {
    let records = state.gateway.list_all().await?;
    if records.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<RecordResponse> = records.iter().map(Record::to_response).collect();
    Ok(Json(body).into_response())
}
