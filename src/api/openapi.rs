//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use super::dto::{
    CatchListResponse, NavigateRequest, PaginationMeta, SaveCatchRequest, SessionResponse,
    StartLoggingResponse, SubmitImageRequest,
};
use super::handlers::{catches, session, system};
use crate::domain::{CatchDetailsDraft, CatchLogEntry, FishIdentification, View};
use crate::error::{ErrorBody, ErrorResponse};

/// OpenAPI description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "catchlog-gateway",
        description = "Identify fish from photos and keep a personal catch log."
    ),
    paths(
        session::create_session,
        session::get_session,
        session::delete_session,
        session::submit_image,
        session::reset_session,
        session::navigate,
        session::start_logging,
        session::cancel_logging,
        session::save_catch,
        catches::list_catches,
        catches::get_catch,
        catches::delete_catch,
        catches::export_catches,
        system::health_handler,
    ),
    components(schemas(
        SessionResponse,
        SubmitImageRequest,
        NavigateRequest,
        StartLoggingResponse,
        SaveCatchRequest,
        CatchListResponse,
        PaginationMeta,
        CatchLogEntry,
        CatchDetailsDraft,
        FishIdentification,
        View,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Sessions", description = "Photo submission and catch logging flow"),
        (name = "Catches", description = "The persisted catch log"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/sessions",
            "/api/v1/sessions/{id}",
            "/api/v1/sessions/{id}/image",
            "/api/v1/sessions/{id}/logging/cancel",
            "/api/v1/catches/export",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
