//! Session handlers: lifecycle, photo submission, and catch logging.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    NavigateRequest, SaveCatchRequest, SessionResponse, StartLoggingResponse, SubmitImageRequest,
};
use crate::app_state::AppState;
use crate::domain::{CatchLogEntry, SessionId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /sessions` — Open a new session on the upload screen.
///
/// # Errors
///
/// Returns [`GatewayError::Internal`] on an id collision.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    summary = "Create a session",
    description = "Opens a new client session on the upload screen.",
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let snapshot = state.catch_service.create_session().await?;
    Ok((StatusCode::CREATED, Json(SessionResponse::from(snapshot))))
}

/// `GET /sessions/:id` — Current session state.
///
/// # Errors
///
/// Returns [`GatewayError::SessionNotFound`] if the session does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    summary = "Get session state",
    description = "Returns the current screen, loading flag, identification result or failure message.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 200, description = "Session state", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let snapshot = state
        .catch_service
        .session(SessionId::from_uuid(id))
        .await?;
    Ok(Json(SessionResponse::from(snapshot)))
}

/// `DELETE /sessions/:id` — Drop a session.
///
/// # Errors
///
/// Returns [`GatewayError::SessionNotFound`] if the session does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    summary = "Delete a session",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .catch_service
        .remove_session(SessionId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /sessions/:id/image` — Submit a photo for identification.
///
/// Returns immediately with the session in `loading`; the outcome is
/// pushed over the WebSocket and visible via `GET /sessions/:id`.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidImage`] or [`GatewayError::InvalidRequest`]
/// for a rejected photo, or [`GatewayError::SessionNotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/image",
    tag = "Sessions",
    summary = "Submit a photo",
    description = "Stores the photo, moves the session to the result screen, and starts identification in the background. Any identification already in flight is superseded.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    request_body = SubmitImageRequest,
    responses(
        (status = 202, description = "Identification started", body = SessionResponse),
        (status = 400, description = "Invalid photo", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn submit_image(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<SubmitImageRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let image = req.into_upload()?;
    let pending = state
        .catch_service
        .submit_image(SessionId::from_uuid(id), image)
        .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SessionResponse::from(pending.session)),
    ))
}

/// `POST /sessions/:id/reset` — Back to the upload screen.
///
/// # Errors
///
/// Returns [`GatewayError::SessionNotFound`] if the session does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/reset",
    tag = "Sessions",
    summary = "Reset a session",
    description = "Clears the photo, identification and error. An identification still in flight is discarded when it arrives.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 200, description = "Session reset", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let snapshot = state.catch_service.reset(SessionId::from_uuid(id)).await?;
    Ok(Json(SessionResponse::from(snapshot)))
}

/// `POST /sessions/:id/view` — Switch between upload and history.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidTransition`] for other targets, or
/// [`GatewayError::SessionNotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/view",
    tag = "Sessions",
    summary = "Navigate",
    description = "Header navigation: jumps to the upload or history screen without clearing anything.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "Screen changed", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Target screen not reachable by navigation", body = ErrorResponse),
    )
)]
pub async fn navigate(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<NavigateRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let snapshot = state
        .catch_service
        .navigate(SessionId::from_uuid(id), req.view)
        .await?;
    Ok(Json(SessionResponse::from(snapshot)))
}

/// `POST /sessions/:id/logging` — Open the logging form.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidTransition`] unless the session shows a
/// successful identification, or [`GatewayError::SessionNotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/logging",
    tag = "Sessions",
    summary = "Start logging a catch",
    description = "Moves from a successful identification to the logging form and returns pre-filled form values.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 200, description = "Logging form opened", body = StartLoggingResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "No identification to log", body = ErrorResponse),
    )
)]
pub async fn start_logging(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let (snapshot, draft) = state
        .catch_service
        .start_logging(SessionId::from_uuid(id))
        .await?;
    Ok(Json(StartLoggingResponse {
        session: SessionResponse::from(snapshot),
        draft,
    }))
}

/// `POST /sessions/:id/logging/cancel` — Close the logging form.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidTransition`] if the session is not
/// logging, or [`GatewayError::SessionNotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/logging/cancel",
    tag = "Sessions",
    summary = "Cancel logging",
    description = "Returns to the identification result without discarding it.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 200, description = "Back on the result screen", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Session is not logging", body = ErrorResponse),
    )
)]
pub async fn cancel_logging(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let snapshot = state
        .catch_service
        .cancel_logging(SessionId::from_uuid(id))
        .await?;
    Ok(Json(SessionResponse::from(snapshot)))
}

/// `POST /sessions/:id/catches` — Save the catch being logged.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if `location` or `size` is
/// blank, [`GatewayError::InvalidTransition`] if the session is not
/// logging, or [`GatewayError::SessionNotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/catches",
    tag = "Sessions",
    summary = "Save a catch",
    description = "Combines the identification with the entered details into a new log entry, prepends it to the log, and moves the session to the history screen.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    request_body = SaveCatchRequest,
    responses(
        (status = 201, description = "Catch saved", body = CatchLogEntry),
        (status = 400, description = "Required detail missing", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Session is not logging", body = ErrorResponse),
    )
)]
pub async fn save_catch(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<SaveCatchRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let entry = state
        .catch_service
        .save_catch(SessionId::from_uuid(id), req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Session routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/image", post(submit_image))
        .route("/sessions/{id}/reset", post(reset_session))
        .route("/sessions/{id}/view", post(navigate))
        .route("/sessions/{id}/logging", post(start_logging))
        .route("/sessions/{id}/logging/cancel", post(cancel_logging))
        .route("/sessions/{id}/catches", post(save_catch))
}
