//! Session DTOs: state snapshots, photo submission, logging.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    CatchDetails, CatchDetailsDraft, FishIdentification, ImageUpload, SessionId, SessionSnapshot,
    View,
};
use crate::error::GatewayError;

/// Current state of a session, returned by every session endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Session identifier.
    pub session_id: SessionId,
    /// Current screen.
    pub view: View,
    /// Whether an identification is in flight.
    pub loading: bool,
    /// Active request generation; increases on every submission or reset.
    pub generation: u64,
    /// Identification result, once available.
    pub identification: Option<FishIdentification>,
    /// User-facing failure message, if the identification failed.
    pub error: Option<String>,
    /// The current photo as a data URI.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last transition.
    pub updated_at: DateTime<Utc>,
}

impl From<SessionSnapshot> for SessionResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            session_id: snapshot.session_id,
            view: snapshot.view,
            loading: snapshot.loading,
            generation: snapshot.generation,
            identification: snapshot.identification,
            error: snapshot.error,
            image_url: snapshot.image_url,
            created_at: snapshot.created_at,
            updated_at: snapshot.last_modified_at,
        }
    }
}

/// Request body for `POST /sessions/:id/image`.
///
/// Either `dataUri` alone, or `imageBase64` together with `mimeType`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitImageRequest {
    /// Base64 photo payload without a data-URI prefix.
    #[serde(default)]
    pub image_base64: Option<String>,
    /// MIME type of the photo, e.g. `image/jpeg`.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Complete `data:<mime>;base64,<data>` URI.
    #[serde(default)]
    pub data_uri: Option<String>,
}

impl SubmitImageRequest {
    /// Validates the payload into an [`ImageUpload`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidImage`] if the photo is rejected, or
    /// [`GatewayError::InvalidRequest`] if neither form is supplied.
    pub fn into_upload(self) -> Result<ImageUpload, GatewayError> {
        match (self.data_uri, self.image_base64, self.mime_type) {
            (Some(uri), _, _) => Ok(ImageUpload::from_data_uri(&uri)?),
            (None, Some(data), Some(mime_type)) => Ok(ImageUpload::new(data, mime_type)?),
            _ => Err(GatewayError::InvalidRequest(
                "provide dataUri, or imageBase64 with mimeType".to_string(),
            )),
        }
    }
}

/// Request body for `POST /sessions/:id/view`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NavigateRequest {
    /// Target screen: `upload` or `history`.
    pub view: View,
}

/// Response body for `POST /sessions/:id/logging`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartLoggingResponse {
    /// Session state, now on the logging screen.
    pub session: SessionResponse,
    /// Pre-filled form values.
    pub draft: CatchDetailsDraft,
}

/// Request body for `POST /sessions/:id/catches`.
///
/// Missing required fields are reported as validation errors by the save
/// itself, so they default to empty here.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SaveCatchRequest {
    /// Where the fish was caught. Required.
    #[serde(default)]
    pub location: String,
    /// Catch date; defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Measured size. Required.
    #[serde(default)]
    pub size: String,
    /// Measured weight.
    #[serde(default)]
    pub weight: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<SaveCatchRequest> for CatchDetails {
    fn from(req: SaveCatchRequest) -> Self {
        Self {
            location: req.location,
            date: req.date,
            size: req.size,
            weight: req.weight,
            notes: req.notes,
        }
    }
}
