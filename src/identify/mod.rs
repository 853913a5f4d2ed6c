//! Fish identification through a multimodal model.
//!
//! [`FishIdentifier`] is the seam between the catch service and the
//! vision backend. [`GeminiClient`] is the production implementation;
//! [`ScriptedIdentifier`] answers from a fixed table for tests.

mod error;
mod gemini;
mod prompt;
mod response;
mod scripted;

use std::fmt;

use async_trait::async_trait;

pub use error::{IdentifyError, MALFORMED_RESPONSE_MESSAGE, TRANSPORT_FAILURE_MESSAGE};
pub use gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, GeminiClient};
pub use prompt::{IDENTIFICATION_INSTRUCTIONS, response_schema};
pub use response::{IdentificationReport, parse_identification};
pub use scripted::ScriptedIdentifier;

use crate::domain::{FishIdentification, ImageUpload};

/// Turns a photo into a species identification.
#[async_trait]
pub trait FishIdentifier: Send + Sync + fmt::Debug {
    /// Identifies the fish in `image`.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentifyError`] describing why no identification
    /// could be produced.
    async fn identify(&self, image: &ImageUpload) -> Result<FishIdentification, IdentifyError>;
}
