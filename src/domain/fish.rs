//! Successful fish identification results.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sentinel the model returns for size/weight when the photo has no
/// visual scale reference.
pub const CANNOT_BE_ESTIMATED: &str = "Cannot be estimated";

/// Species, description, and size/weight estimates for one photo.
///
/// Only successful identifications are represented by this type; a
/// declared model-side failure is an
/// [`crate::identify::IdentifyError::Unidentified`] instead, so a value of
/// this type never carries partial data next to an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FishIdentification {
    /// Common name of the species.
    pub species: String,
    /// Short narrative about the fish.
    pub description: String,
    /// Typical habitat.
    pub habitat: String,
    /// Whether the fish is commonly considered edible.
    pub is_edible: bool,
    /// Estimated length range, or [`CANNOT_BE_ESTIMATED`].
    pub estimated_size: String,
    /// Estimated weight range, or [`CANNOT_BE_ESTIMATED`].
    pub estimated_weight: String,
}

impl FishIdentification {
    /// Returns the size estimate unless the model could not produce one.
    #[must_use]
    pub fn size_estimate(&self) -> Option<&str> {
        usable_estimate(&self.estimated_size)
    }

    /// Returns the weight estimate unless the model could not produce one.
    #[must_use]
    pub fn weight_estimate(&self) -> Option<&str> {
        usable_estimate(&self.estimated_weight)
    }
}

fn usable_estimate(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(CANNOT_BE_ESTIMATED) {
        None
    } else {
        Some(value)
    }
}
