//! Per-client view-state machine.
//!
//! A [`Session`] drives the single active screen of one client:
//!
//! ```text
//! Upload --submit_image--> Result(loading) --resolve--> Result(succeeded | failed)
//! Result(succeeded) --start_logging--> Logging --finish_logging--> History
//! Logging --cancel_logging--> Result(succeeded)
//! any --reset--> Upload
//! ```
//!
//! Every `submit_image` and `reset` bumps the session generation. A
//! resolution carrying an older generation is discarded, so a late
//! response for a superseded photo can never overwrite newer state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{FishIdentification, ImageUpload, SessionId};
use crate::identify::IdentifyError;

/// The screen a session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Waiting for a photo.
    Upload,
    /// Showing identification progress, result, or failure.
    Result,
    /// Collecting catch details.
    Logging,
    /// Showing the catch log.
    History,
}

/// Token identifying one identification request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    /// Returns the raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// What happened to an identification outcome handed to [`Session::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The outcome belonged to the active request and was stored.
    Applied,
    /// The request was superseded; the outcome was dropped.
    Stale,
}

/// State of one client session.
#[derive(Debug)]
pub struct Session {
    session_id: SessionId,
    view: View,
    image: Option<ImageUpload>,
    identification: Option<FishIdentification>,
    error: Option<String>,
    loading: bool,
    generation: u64,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session on the upload screen.
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            view: View::Upload,
            image: None,
            identification: None,
            error: None,
            loading: false,
            generation: 0,
            created_at: now,
            last_modified_at: now,
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Current screen.
    #[must_use]
    pub const fn view(&self) -> View {
        self.view
    }

    /// Whether an identification is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The last successful identification, if any.
    #[must_use]
    pub const fn identification(&self) -> Option<&FishIdentification> {
        self.identification.as_ref()
    }

    /// The user-facing failure message, if the last request failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The photo being identified or logged.
    #[must_use]
    pub const fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    /// When the session last changed state.
    #[must_use]
    pub const fn last_modified_at(&self) -> DateTime<Utc> {
        self.last_modified_at
    }

    /// The currently active request generation.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        Generation(self.generation)
    }

    /// Stores `image`, clears the previous outcome, and moves to
    /// `Result(loading)`. Returns the generation the caller must present
    /// when resolving.
    pub fn submit_image(&mut self, image: ImageUpload) -> Generation {
        self.generation = self.generation.wrapping_add(1);
        self.image = Some(image);
        self.identification = None;
        self.error = None;
        self.loading = true;
        self.view = View::Result;
        self.touch();
        Generation(self.generation)
    }

    /// Applies the outcome of the request tagged `generation`.
    ///
    /// Outcomes for any other generation, or arriving when nothing is
    /// loading, are dropped and reported as [`Resolution::Stale`].
    pub fn resolve(
        &mut self,
        generation: Generation,
        outcome: Result<FishIdentification, IdentifyError>,
    ) -> Resolution {
        if generation.0 != self.generation || !self.loading {
            return Resolution::Stale;
        }
        match outcome {
            Ok(identification) => {
                self.identification = Some(identification);
                self.error = None;
            }
            Err(err) => {
                self.identification = None;
                self.error = Some(err.user_message());
            }
        }
        self.loading = false;
        self.touch();
        Resolution::Applied
    }

    /// Moves from a successful result to the logging form.
    ///
    /// Returns `false`, leaving the state untouched, unless the session is
    /// on the result screen with an identification.
    pub fn start_logging(&mut self) -> bool {
        if self.view != View::Result || self.identification.is_none() || self.image.is_none() {
            return false;
        }
        self.view = View::Logging;
        self.touch();
        true
    }

    /// Returns from the logging form to the result it came from.
    ///
    /// Returns `false` if the session is not logging.
    pub fn cancel_logging(&mut self) -> bool {
        if self.view != View::Logging {
            return false;
        }
        self.view = View::Result;
        self.touch();
        true
    }

    /// The identification and photo to be logged, while on the logging form.
    #[must_use]
    pub fn logging_context(&self) -> Option<(&FishIdentification, &ImageUpload)> {
        if self.view != View::Logging {
            return None;
        }
        self.identification.as_ref().zip(self.image.as_ref())
    }

    /// Completes logging: discards the photo and identification and shows
    /// the history.
    pub fn finish_logging(&mut self) {
        self.image = None;
        self.identification = None;
        self.error = None;
        self.loading = false;
        self.view = View::History;
        self.touch();
    }

    /// Returns to the upload screen, clearing everything.
    ///
    /// Any identification still in flight becomes stale.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.image = None;
        self.identification = None;
        self.error = None;
        self.loading = false;
        self.view = View::Upload;
        self.touch();
    }

    /// Header navigation: switches to `Upload` or `History` without
    /// clearing anything. Other targets are refused with `false`.
    pub fn navigate(&mut self, view: View) -> bool {
        if !matches!(view, View::Upload | View::History) {
            return false;
        }
        self.view = view;
        self.touch();
        true
    }

    /// Serializable view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            view: self.view,
            loading: self.loading,
            generation: self.generation,
            identification: self.identification.clone(),
            error: self.error.clone(),
            image_url: self.image.as_ref().map(ImageUpload::data_uri),
            created_at: self.created_at,
            last_modified_at: self.last_modified_at,
        }
    }

    fn touch(&mut self) {
        self.last_modified_at = Utc::now();
    }
}

/// Point-in-time copy of a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub session_id: SessionId,
    /// Current screen.
    pub view: View,
    /// Whether an identification is in flight.
    pub loading: bool,
    /// Active request generation.
    pub generation: u64,
    /// Last successful identification.
    pub identification: Option<FishIdentification>,
    /// User-facing failure message.
    pub error: Option<String>,
    /// Data URI of the current photo.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last transition.
    pub last_modified_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn photo(data: &str) -> ImageUpload {
        let Ok(image) = ImageUpload::new(data, "image/jpeg") else {
            panic!("valid image");
        };
        image
    }

    fn fish(species: &str) -> FishIdentification {
        FishIdentification {
            species: species.to_string(),
            description: "...".to_string(),
            habitat: "freshwater lakes".to_string(),
            is_edible: true,
            estimated_size: "Approx. 30-35 cm".to_string(),
            estimated_weight: "Approx. 1.0-1.2 kg".to_string(),
        }
    }

    #[test]
    fn new_session_starts_on_upload() {
        let session = Session::new(SessionId::new());
        assert_eq!(session.view(), View::Upload);
        assert!(!session.is_loading());
        assert!(session.identification().is_none());
    }

    #[test]
    fn submit_then_success() {
        let mut session = Session::new(SessionId::new());
        let generation = session.submit_image(photo("AAAA"));
        assert_eq!(session.view(), View::Result);
        assert!(session.is_loading());

        let resolution = session.resolve(generation, Ok(fish("Largemouth Bass")));
        assert_eq!(resolution, Resolution::Applied);
        assert!(!session.is_loading());
        assert_eq!(
            session.identification().map(|f| f.species.as_str()),
            Some("Largemouth Bass")
        );
        assert!(session.error().is_none());
    }

    #[test]
    fn domain_failure_message_is_verbatim() {
        let mut session = Session::new(SessionId::new());
        let generation = session.submit_image(photo("AAAA"));
        session.resolve(
            generation,
            Err(IdentifyError::Unidentified("No fish detected in image.".to_string())),
        );
        assert_eq!(session.error(), Some("No fish detected in image."));
        assert!(session.identification().is_none());
        assert_eq!(session.view(), View::Result);

        session.reset();
        assert_eq!(session.view(), View::Upload);
        assert!(session.image().is_none());
        assert!(session.error().is_none());
    }

    #[test]
    fn superseded_result_is_discarded() {
        let mut session = Session::new(SessionId::new());
        let first = session.submit_image(photo("AAAA"));
        let second = session.submit_image(photo("BBBB"));

        assert_eq!(
            session.resolve(second, Ok(fish("Walleye"))),
            Resolution::Applied
        );
        assert_eq!(
            session.resolve(first, Ok(fish("Carp"))),
            Resolution::Stale
        );
        assert_eq!(
            session.identification().map(|f| f.species.as_str()),
            Some("Walleye")
        );
        assert_eq!(session.image().map(ImageUpload::base64_data), Some("BBBB"));
    }

    #[test]
    fn late_failure_does_not_clobber_newer_success() {
        let mut session = Session::new(SessionId::new());
        let first = session.submit_image(photo("AAAA"));
        let second = session.submit_image(photo("BBBB"));
        session.resolve(second, Ok(fish("Walleye")));

        let late = session.resolve(first, Err(IdentifyError::Timeout));
        assert_eq!(late, Resolution::Stale);
        assert!(session.error().is_none());
    }

    #[test]
    fn reset_makes_in_flight_request_stale() {
        let mut session = Session::new(SessionId::new());
        let generation = session.submit_image(photo("AAAA"));
        session.reset();

        assert_eq!(
            session.resolve(generation, Ok(fish("Pike"))),
            Resolution::Stale
        );
        assert_eq!(session.view(), View::Upload);
        assert!(session.identification().is_none());
    }

    #[test]
    fn duplicate_resolution_is_stale() {
        let mut session = Session::new(SessionId::new());
        let generation = session.submit_image(photo("AAAA"));
        session.resolve(generation, Ok(fish("Pike")));
        assert_eq!(
            session.resolve(generation, Ok(fish("Perch"))),
            Resolution::Stale
        );
        assert_eq!(
            session.identification().map(|f| f.species.as_str()),
            Some("Pike")
        );
    }

    #[test]
    fn start_logging_requires_identification() {
        let mut session = Session::new(SessionId::new());
        assert!(!session.start_logging());
        assert_eq!(session.view(), View::Upload);

        let generation = session.submit_image(photo("AAAA"));
        assert!(!session.start_logging());

        session.resolve(generation, Err(IdentifyError::Timeout));
        assert!(!session.start_logging());
        assert_eq!(session.view(), View::Result);
    }

    #[test]
    fn logging_cancel_and_finish() {
        let mut session = Session::new(SessionId::new());
        let generation = session.submit_image(photo("AAAA"));
        session.resolve(generation, Ok(fish("Bluegill")));

        assert!(session.start_logging());
        assert_eq!(session.view(), View::Logging);
        assert!(session.logging_context().is_some());

        assert!(session.cancel_logging());
        assert_eq!(session.view(), View::Result);
        assert!(session.identification().is_some());
        assert!(session.logging_context().is_none());

        assert!(session.start_logging());
        session.finish_logging();
        assert_eq!(session.view(), View::History);
        assert!(session.image().is_none());
        assert!(session.identification().is_none());
        assert!(!session.cancel_logging());
    }

    #[test]
    fn navigation_only_targets_upload_and_history() {
        let mut session = Session::new(SessionId::new());
        assert!(session.navigate(View::History));
        assert_eq!(session.view(), View::History);
        assert!(!session.navigate(View::Logging));
        assert!(!session.navigate(View::Result));
        assert!(session.navigate(View::Upload));
        assert_eq!(session.view(), View::Upload);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut session = Session::new(SessionId::new());
        let generation = session.submit_image(photo("AAAA"));
        let snap = session.snapshot();
        assert_eq!(snap.generation, generation.get());
        assert!(snap.loading);
        assert_eq!(snap.image_url.as_deref(), Some("data:image/jpeg;base64,AAAA"));
    }
}
