//! Parsing the model's structured output.

use serde::Deserialize;

use super::IdentifyError;
use crate::domain::FishIdentification;

/// Raw structured output, field-for-field with the declared schema.
///
/// Every field is optional on the wire: a failure carries only `error`,
/// and the model may return `null` for inapplicable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationReport {
    /// Common name of the species.
    #[serde(default)]
    pub species: Option<String>,
    /// Short narrative about the fish.
    #[serde(default)]
    pub description: Option<String>,
    /// Typical habitat.
    #[serde(default)]
    pub habitat: Option<String>,
    /// Edibility.
    #[serde(default)]
    pub is_edible: Option<bool>,
    /// Size range or the "cannot be estimated" sentinel.
    #[serde(default)]
    pub estimated_size: Option<String>,
    /// Weight range or the "cannot be estimated" sentinel.
    #[serde(default)]
    pub estimated_weight: Option<String>,
    /// User-facing failure message; when non-blank the report is a failure.
    #[serde(default)]
    pub error: Option<String>,
}

impl IdentificationReport {
    /// Parses the model's raw text answer.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifyError::MalformedResponse`] if `text` is not a JSON
    /// object matching the schema.
    pub fn parse(text: &str) -> Result<Self, IdentifyError> {
        serde_json::from_str(text.trim())
            .map_err(|e| IdentifyError::MalformedResponse(e.to_string()))
    }

    /// Converts the report into a successful identification.
    ///
    /// A non-blank `error` wins over any other field.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifyError::Unidentified`] with the model's message if
    /// `error` is set, or [`IdentifyError::MalformedResponse`] if a
    /// descriptive field is missing.
    pub fn into_identification(self) -> Result<FishIdentification, IdentifyError> {
        if let Some(message) = self.error.filter(|message| !message.trim().is_empty()) {
            return Err(IdentifyError::Unidentified(message));
        }

        Ok(FishIdentification {
            species: require_text(self.species, "species")?,
            description: require_text(self.description, "description")?,
            habitat: require_text(self.habitat, "habitat")?,
            is_edible: self
                .is_edible
                .ok_or_else(|| missing_field("isEdible"))?,
            estimated_size: require_text(self.estimated_size, "estimatedSize")?,
            estimated_weight: require_text(self.estimated_weight, "estimatedWeight")?,
        })
    }
}

/// Parses `text` straight into an identification outcome.
///
/// # Errors
///
/// See [`IdentificationReport::parse`] and
/// [`IdentificationReport::into_identification`].
pub fn parse_identification(text: &str) -> Result<FishIdentification, IdentifyError> {
    IdentificationReport::parse(text)?.into_identification()
}

fn require_text(value: Option<String>, field: &str) -> Result<String, IdentifyError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing_field(field))
}

fn missing_field(field: &str) -> IdentifyError {
    IdentifyError::MalformedResponse(format!("missing field `{field}`"))
}
