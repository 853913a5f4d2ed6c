//! Catch log handlers: list, get, delete, export.

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CatchListResponse, PaginationParams};
use crate::app_state::AppState;
use crate::domain::{CatchId, CatchLogEntry};
use crate::error::{ErrorResponse, GatewayError};
use crate::persistence::EXPORT_FILE_NAME;

/// `GET /catches` — List the catch log, newest first.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/catches",
    tag = "Catches",
    summary = "List catches",
    description = "Returns a page of the catch log, most recent entry first.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated catch log", body = CatchListResponse),
    )
)]
pub async fn list_catches(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let params = params.clamped();
    let limit = usize::try_from(params.per_page).unwrap_or(usize::MAX);
    let (data, total) = state
        .catch_service
        .list_catches(params.offset(), limit)
        .await;

    Ok(Json(CatchListResponse {
        data,
        pagination: params.meta(total),
    }))
}

/// `GET /catches/:id` — One log entry.
///
/// # Errors
///
/// Returns [`GatewayError::CatchNotFound`] if no entry has that id.
#[utoipa::path(
    get,
    path = "/api/v1/catches/{id}",
    tag = "Catches",
    summary = "Get a catch",
    params(
        ("id" = uuid::Uuid, Path, description = "Catch UUID"),
    ),
    responses(
        (status = 200, description = "Catch entry", body = CatchLogEntry),
        (status = 404, description = "Catch not found", body = ErrorResponse),
    )
)]
pub async fn get_catch(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let entry = state.catch_service.get_catch(CatchId::from_uuid(id)).await?;
    Ok(Json(entry))
}

/// `DELETE /catches/:id` — Remove a log entry.
///
/// # Errors
///
/// Returns [`GatewayError::CatchNotFound`] if no entry has that id.
#[utoipa::path(
    delete,
    path = "/api/v1/catches/{id}",
    tag = "Catches",
    summary = "Delete a catch",
    description = "Removes the entry from the log and persists the remaining log.",
    params(
        ("id" = uuid::Uuid, Path, description = "Catch UUID"),
    ),
    responses(
        (status = 204, description = "Catch deleted"),
        (status = 404, description = "Catch not found", body = ErrorResponse),
    )
)]
pub async fn delete_catch(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .catch_service
        .remove_catch(CatchId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /catches/export` — Download the whole log as `catch-log.json`.
///
/// # Errors
///
/// Returns [`GatewayError::Internal`] if serialisation fails.
#[utoipa::path(
    get,
    path = "/api/v1/catches/export",
    tag = "Catches",
    summary = "Export the catch log",
    description = "Downloads the complete log as an indented JSON array. An empty log exports as `[]`.",
    responses(
        (status = 200, description = "Catch log file", body = Vec<CatchLogEntry>, content_type = "application/json"),
    )
)]
pub async fn export_catches(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let body = state.catch_service.export().await?;
    tracing::info!(bytes = body.len(), "catch log exported");
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        body,
    ))
}

/// Catch log routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/catches", get(list_catches))
        .route("/catches/export", get(export_catches))
        .route("/catches/{id}", get(get_catch).delete(delete_catch))
}
