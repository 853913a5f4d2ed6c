//! Catch service: drives session transitions, runs identifications, and
//! owns the catch log.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeDelta, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::{
    CatchDetails, CatchDetailsDraft, CatchEvent, CatchId, CatchLogEntry, EventBus,
    FishIdentification, Generation, ImageUpload, Resolution, Session, SessionHandle, SessionId,
    SessionRegistry, SessionSnapshot, View, assemble,
};
use crate::error::GatewayError;
use crate::identify::{FishIdentifier, IdentifyError};
use crate::persistence::{CatchLogStore, catch_log};

/// Default upper bound on a single identification.
pub const DEFAULT_IDENTIFY_TIMEOUT: Duration = Duration::from_secs(60);

/// Default time a session may stay unchanged before it is evicted.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);

const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);
const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(10);

/// A photo submission whose identification is running in the background.
#[derive(Debug)]
pub struct PendingIdentification {
    /// Session state right after submission (`Result`, loading).
    pub session: SessionSnapshot,
    /// Background task; yields whether its outcome was applied or discarded.
    pub task: JoinHandle<Resolution>,
}

/// Orchestration layer for sessions and the catch log.
///
/// Every session mutation follows the pattern: acquire the session lock,
/// apply the transition, emit events, return a snapshot. The catch log
/// is guarded by one lock held across persistence so the stored order
/// always matches the in-memory order.
#[derive(Debug)]
pub struct CatchService {
    identifier: Arc<dyn FishIdentifier>,
    sessions: SessionRegistry,
    catches: RwLock<Vec<CatchLogEntry>>,
    log_store: CatchLogStore,
    event_bus: EventBus,
    identify_timeout: Duration,
}

impl CatchService {
    /// Creates the service, loading the persisted catch log.
    pub async fn load(
        identifier: Arc<dyn FishIdentifier>,
        log_store: CatchLogStore,
        event_bus: EventBus,
        identify_timeout: Duration,
    ) -> Self {
        let catches = log_store.load().await;
        tracing::info!(catches = catches.len(), "catch log ready");
        Self {
            identifier,
            sessions: SessionRegistry::new(),
            catches: RwLock::new(catches),
            log_store,
            event_bus,
            identify_timeout,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`SessionRegistry`].
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Opens a new session on the upload screen.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if the session id collides.
    pub async fn create_session(&self) -> Result<SessionSnapshot, GatewayError> {
        let session = Session::new(SessionId::new());
        let snapshot = session.snapshot();
        self.sessions.insert(session).await?;
        tracing::info!(session_id = %snapshot.session_id, "session created");
        Ok(snapshot)
    }

    /// Returns the current state of a session.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] for unknown sessions.
    pub async fn session(&self, session_id: SessionId) -> Result<SessionSnapshot, GatewayError> {
        let handle = self.sessions.get(session_id).await?;
        let session = handle.read().await;
        Ok(session.snapshot())
    }

    /// Drops a session. An identification still running for it finishes
    /// unobserved.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] for unknown sessions.
    pub async fn remove_session(&self, session_id: SessionId) -> Result<(), GatewayError> {
        self.sessions.remove(session_id).await?;
        tracing::info!(%session_id, "session removed");
        Ok(())
    }

    /// Drops sessions that have not changed for `max_idle` and have no
    /// identification in flight. Returns how many were dropped.
    pub async fn evict_idle_sessions(&self, max_idle: Duration) -> usize {
        let Ok(max_idle) = TimeDelta::from_std(max_idle) else {
            return 0;
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(max_idle) else {
            return 0;
        };
        let evicted = self.sessions.evict_idle(cutoff).await;
        for session_id in &evicted {
            tracing::debug!(%session_id, "idle session evicted");
        }
        if !evicted.is_empty() {
            tracing::info!(evicted = evicted.len(), "evicted idle sessions");
        }
        evicted.len()
    }

    /// Submits a photo and starts identifying it in the background.
    ///
    /// Any identification already in flight for the session is superseded:
    /// its outcome will be discarded when it arrives.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] for unknown sessions.
    pub async fn submit_image(
        &self,
        session_id: SessionId,
        image: ImageUpload,
    ) -> Result<PendingIdentification, GatewayError> {
        let handle = self.sessions.get(session_id).await?;
        let (generation, snapshot) = {
            let mut session = handle.write().await;
            let generation = session.submit_image(image.clone());
            let _ = self.event_bus.publish(CatchEvent::IdentificationStarted {
                session_id,
                generation: generation.get(),
                timestamp: Utc::now(),
            });
            (generation, session.snapshot())
        };
        tracing::info!(
            %session_id,
            generation = generation.get(),
            mime_type = image.mime_type(),
            "identification started"
        );

        let job = IdentificationJob {
            identifier: Arc::clone(&self.identifier),
            handle,
            session_id,
            generation,
            image,
            event_bus: self.event_bus.clone(),
            timeout: self.identify_timeout,
        };
        let task = tokio::spawn(job.run());

        Ok(PendingIdentification {
            session: snapshot,
            task,
        })
    }

    /// Returns the session to the upload screen, discarding the photo and
    /// any outcome. An identification in flight becomes stale.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] for unknown sessions.
    pub async fn reset(&self, session_id: SessionId) -> Result<SessionSnapshot, GatewayError> {
        let handle = self.sessions.get(session_id).await?;
        let mut session = handle.write().await;
        session.reset();
        tracing::debug!(%session_id, "session reset");
        Ok(session.snapshot())
    }

    /// Switches between the upload and history screens.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] for unknown sessions or
    /// [`GatewayError::InvalidTransition`] for any other target view.
    pub async fn navigate(
        &self,
        session_id: SessionId,
        view: View,
    ) -> Result<SessionSnapshot, GatewayError> {
        let handle = self.sessions.get(session_id).await?;
        let mut session = handle.write().await;
        if !session.navigate(view) {
            return Err(GatewayError::InvalidTransition(format!(
                "cannot navigate to {view:?}"
            )));
        }
        Ok(session.snapshot())
    }

    /// Opens the logging form for the current identification and returns
    /// its pre-filled defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] for unknown sessions or
    /// [`GatewayError::InvalidTransition`] unless the session shows a
    /// successful identification. The session is unchanged on error.
    pub async fn start_logging(
        &self,
        session_id: SessionId,
    ) -> Result<(SessionSnapshot, CatchDetailsDraft), GatewayError> {
        let handle = self.sessions.get(session_id).await?;
        let mut session = handle.write().await;
        if !session.start_logging() {
            return Err(GatewayError::InvalidTransition(
                "no identification to log".to_string(),
            ));
        }
        let Some((identification, _)) = session.logging_context() else {
            return Err(GatewayError::Internal(
                "logging started without an identification".to_string(),
            ));
        };
        let draft = CatchDetailsDraft::prefill(identification, today());
        Ok((session.snapshot(), draft))
    }

    /// Leaves the logging form, back to the identification result.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] for unknown sessions or
    /// [`GatewayError::InvalidTransition`] if the session is not logging.
    pub async fn cancel_logging(
        &self,
        session_id: SessionId,
    ) -> Result<SessionSnapshot, GatewayError> {
        let handle = self.sessions.get(session_id).await?;
        let mut session = handle.write().await;
        if !session.cancel_logging() {
            return Err(GatewayError::InvalidTransition(
                "session is not logging a catch".to_string(),
            ));
        }
        Ok(session.snapshot())
    }

    /// Saves the catch being logged: assembles the entry, prepends it to
    /// the log, persists the log, and moves the session to the history.
    ///
    /// A persistence failure is logged and does not fail the save.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] for unknown sessions,
    /// [`GatewayError::InvalidTransition`] if the session is not logging,
    /// or [`GatewayError::InvalidRequest`] if a required detail is blank.
    pub async fn save_catch(
        &self,
        session_id: SessionId,
        details: CatchDetails,
    ) -> Result<CatchLogEntry, GatewayError> {
        let handle = self.sessions.get(session_id).await?;
        let mut session = handle.write().await;
        let Some((identification, image)) = session.logging_context() else {
            return Err(GatewayError::InvalidTransition(
                "session is not logging a catch".to_string(),
            ));
        };
        let entry = assemble(identification, details, image, today())?;

        {
            let mut catches = self.catches.write().await;
            catches.insert(0, entry.clone());
            if !self.log_store.save(&catches).await {
                tracing::warn!(%session_id, catch_id = %entry.id(), "catch kept in memory only");
            }
        }
        session.finish_logging();

        let _ = self.event_bus.publish(CatchEvent::CatchLogged {
            session_id,
            catch_id: entry.id(),
            species: entry.species().to_string(),
            timestamp: Utc::now(),
        });
        tracing::info!(%session_id, catch_id = %entry.id(), species = entry.species(), "catch logged");
        Ok(entry)
    }

    /// Returns a page of the log, newest first, plus the total entry count.
    pub async fn list_catches(&self, offset: usize, limit: usize) -> (Vec<CatchLogEntry>, usize) {
        let catches = self.catches.read().await;
        let page = catches.iter().skip(offset).take(limit).cloned().collect();
        (page, catches.len())
    }

    /// Returns one log entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::CatchNotFound`] if no entry has that id.
    pub async fn get_catch(&self, catch_id: CatchId) -> Result<CatchLogEntry, GatewayError> {
        let catches = self.catches.read().await;
        catches
            .iter()
            .find(|entry| entry.id() == catch_id)
            .cloned()
            .ok_or(GatewayError::CatchNotFound(*catch_id.as_uuid()))
    }

    /// Deletes one log entry and persists the remaining log.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::CatchNotFound`] if no entry has that id.
    pub async fn remove_catch(&self, catch_id: CatchId) -> Result<CatchLogEntry, GatewayError> {
        let removed = {
            let mut catches = self.catches.write().await;
            let Some(position) = catches.iter().position(|entry| entry.id() == catch_id) else {
                return Err(GatewayError::CatchNotFound(*catch_id.as_uuid()));
            };
            let removed = catches.remove(position);
            if !self.log_store.save(&catches).await {
                tracing::warn!(%catch_id, "catch removed from memory only");
            }
            removed
        };

        let _ = self.event_bus.publish(CatchEvent::CatchRemoved {
            catch_id,
            timestamp: Utc::now(),
        });
        tracing::info!(%catch_id, "catch removed");
        Ok(removed)
    }

    /// Renders the whole log as an indented JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if serialisation fails.
    pub async fn export(&self) -> Result<Vec<u8>, GatewayError> {
        let catches = self.catches.read().await;
        catch_log::export(&catches).map_err(|e| GatewayError::Internal(e.to_string()))
    }

    /// Number of entries in the log.
    pub async fn catch_count(&self) -> usize {
        self.catches.read().await.len()
    }
}

/// Everything a background identification needs, detached from the service.
struct IdentificationJob {
    identifier: Arc<dyn FishIdentifier>,
    handle: SessionHandle,
    session_id: SessionId,
    generation: Generation,
    image: ImageUpload,
    event_bus: EventBus,
    timeout: Duration,
}

impl IdentificationJob {
    async fn run(self) -> Resolution {
        let outcome = tokio::time::timeout(self.timeout, self.identifier.identify(&self.image))
            .await
            .unwrap_or(Err(IdentifyError::Timeout));

        if let Err(err) = &outcome {
            match err {
                IdentifyError::Unidentified(message) => {
                    tracing::info!(session_id = %self.session_id, %message, "no fish identified");
                }
                other => {
                    tracing::warn!(
                        session_id = %self.session_id,
                        kind = other.kind(),
                        error = %other,
                        "identification failed"
                    );
                }
            }
        }

        let event = self.event_for(&outcome);
        let mut session = self.handle.write().await;
        let resolution = session.resolve(self.generation, outcome);

        match resolution {
            Resolution::Applied => {
                let _ = self.event_bus.publish(event);
            }
            Resolution::Stale => {
                tracing::debug!(
                    session_id = %self.session_id,
                    generation = self.generation.get(),
                    "discarding superseded identification result"
                );
            }
        }
        resolution
    }

    fn event_for(&self, outcome: &Result<FishIdentification, IdentifyError>) -> CatchEvent {
        match outcome {
            Ok(identification) => CatchEvent::IdentificationSucceeded {
                session_id: self.session_id,
                generation: self.generation.get(),
                species: identification.species.clone(),
                timestamp: Utc::now(),
            },
            Err(err) => CatchEvent::IdentificationFailed {
                session_id: self.session_id,
                generation: self.generation.get(),
                message: err.user_message(),
                timestamp: Utc::now(),
            },
        }
    }
}

/// Spawns the background task that evicts sessions idle for longer than
/// `max_idle`. The task runs until aborted.
pub fn spawn_session_sweeper(service: Arc<CatchService>, max_idle: Duration) -> JoinHandle<()> {
    let period = max_idle.clamp(MIN_SWEEP_PERIOD, MAX_SWEEP_PERIOD);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            service.evict_idle_sessions(max_idle).await;
        }
    })
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
