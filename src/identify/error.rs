//! Identification failure taxonomy.

/// Message shown when the service answered with something unparseable.
pub const MALFORMED_RESPONSE_MESSAGE: &str = "Failed to identify fish. Please try again.";

/// Message shown when the service could not be reached in time.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Could not reach the identification service. Please try again.";

/// Why an identification did not produce a [`crate::domain::FishIdentification`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifyError {
    /// The model ran but declared the photo unusable (no fish, unreadable).
    /// Carries the model's user-facing text.
    #[error("{0}")]
    Unidentified(String),

    /// The response did not match the declared output schema.
    #[error("malformed identification response: {0}")]
    MalformedResponse(String),

    /// Network, authentication, quota, or other non-success HTTP outcome.
    #[error("identification service unavailable: {0}")]
    Transport(String),

    /// No answer within the configured timeout.
    #[error("identification timed out")]
    Timeout,
}

impl IdentifyError {
    /// Text to show the angler.
    ///
    /// Domain failures are passed through verbatim; everything else gets a
    /// generic message and the detail stays in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unidentified(message) => message.clone(),
            Self::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
            Self::Transport(_) | Self::Timeout => TRANSPORT_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Short label used in structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unidentified(_) => "unidentified",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Transport(_) => "transport",
            Self::Timeout => "timeout",
        }
    }
}
