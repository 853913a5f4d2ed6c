//! Table-driven identifier for tests.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{FishIdentifier, IdentifyError};
use crate::domain::{FishIdentification, ImageUpload};

/// Identifier answering from a fixed table keyed by the photo's base64
/// data. Used by tests in place of a network-backed identifier.
#[derive(Debug, Default)]
pub struct ScriptedIdentifier {
    answers: HashMap<String, Result<FishIdentification, IdentifyError>>,
    fallback: Option<Result<FishIdentification, IdentifyError>>,
}

impl ScriptedIdentifier {
    /// Answers every photo with `outcome`.
    #[must_use]
    pub fn always(outcome: Result<FishIdentification, IdentifyError>) -> Self {
        Self {
            answers: HashMap::new(),
            fallback: Some(outcome),
        }
    }

    /// Answers photos whose base64 data equals `data` with `outcome`.
    #[must_use]
    pub fn answer(
        mut self,
        data: impl Into<String>,
        outcome: Result<FishIdentification, IdentifyError>,
    ) -> Self {
        self.answers.insert(data.into(), outcome);
        self
    }
}

#[async_trait]
impl FishIdentifier for ScriptedIdentifier {
    async fn identify(&self, image: &ImageUpload) -> Result<FishIdentification, IdentifyError> {
        self.answers
            .get(image.base64_data())
            .or(self.fallback.as_ref())
            .cloned()
            .unwrap_or_else(|| {
                Err(IdentifyError::Unidentified(
                    "No fish detected in image.".to_string(),
                ))
            })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn photo(data: &str) -> ImageUpload {
        let Ok(image) = ImageUpload::new(data, "image/png") else {
            panic!("valid image");
        };
        image
    }

    #[tokio::test]
    async fn table_entry_wins_over_fallback() {
        let identifier = ScriptedIdentifier::always(Err(IdentifyError::Timeout))
            .answer("AAAA", Err(IdentifyError::Transport("down".to_string())));

        assert_eq!(
            identifier.identify(&photo("AAAA")).await,
            Err(IdentifyError::Transport("down".to_string()))
        );
        assert_eq!(
            identifier.identify(&photo("BBBB")).await,
            Err(IdentifyError::Timeout)
        );
    }

    #[tokio::test]
    async fn empty_table_reports_no_fish() {
        let result = ScriptedIdentifier::default().identify(&photo("AAAA")).await;
        assert!(matches!(result, Err(IdentifyError::Unidentified(_))));
    }
}
