//! Saved catch log entries and the user-entered details behind them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CatchId, FishIdentification};

/// Details the angler enters when logging a catch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatchDetails {
    /// Where the fish was caught. Required.
    pub location: String,
    /// Catch date; `None` means "today".
    pub date: Option<NaiveDate>,
    /// Measured size. Required, independent of the estimate.
    pub size: String,
    /// Measured weight.
    pub weight: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Pre-filled logging form handed to the client when logging starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatchDetailsDraft {
    /// Empty; the angler always types the location.
    pub location: String,
    /// Defaults to today.
    pub date: NaiveDate,
    /// The size estimate, unless none could be made.
    pub size: String,
    /// The weight estimate, unless none could be made.
    pub weight: String,
    /// Empty.
    pub notes: String,
}

impl CatchDetailsDraft {
    /// Builds the form defaults for `identification`.
    #[must_use]
    pub fn prefill(identification: &FishIdentification, today: NaiveDate) -> Self {
        Self {
            location: String::new(),
            date: today,
            size: identification.size_estimate().unwrap_or_default().to_string(),
            weight: identification.weight_estimate().unwrap_or_default().to_string(),
            notes: String::new(),
        }
    }
}

/// One saved catch.
///
/// Identification fields are copied from the [`FishIdentification`] at
/// save time and never change afterwards. Entries are only built by
/// [`super::assembler::assemble`] or loaded from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatchLogEntry {
    id: CatchId,
    image_url: String,
    species: String,
    description: String,
    habitat: String,
    is_edible: bool,
    estimated_size: String,
    estimated_weight: String,
    location: String,
    date: NaiveDate,
    size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

/// Validated user fields, ready to be stamped into an entry.
#[derive(Debug)]
pub(super) struct ValidatedDetails {
    pub(super) location: String,
    pub(super) date: NaiveDate,
    pub(super) size: String,
    pub(super) weight: Option<String>,
    pub(super) notes: Option<String>,
}

impl CatchLogEntry {
    pub(super) fn snapshot(
        id: CatchId,
        image_url: String,
        identification: &FishIdentification,
        details: ValidatedDetails,
    ) -> Self {
        Self {
            id,
            image_url,
            species: identification.species.clone(),
            description: identification.description.clone(),
            habitat: identification.habitat.clone(),
            is_edible: identification.is_edible,
            estimated_size: identification.estimated_size.clone(),
            estimated_weight: identification.estimated_weight.clone(),
            location: details.location,
            date: details.date,
            size: details.size,
            weight: details.weight,
            notes: details.notes,
        }
    }

    /// Entry identifier.
    #[must_use]
    pub const fn id(&self) -> CatchId {
        self.id
    }

    /// Self-contained `data:` URI of the photo.
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Identified species.
    #[must_use]
    pub fn species(&self) -> &str {
        &self.species
    }

    /// Species description at save time.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Habitat at save time.
    #[must_use]
    pub fn habitat(&self) -> &str {
        &self.habitat
    }

    /// Edibility at save time.
    #[must_use]
    pub const fn is_edible(&self) -> bool {
        self.is_edible
    }

    /// Model size estimate at save time.
    #[must_use]
    pub fn estimated_size(&self) -> &str {
        &self.estimated_size
    }

    /// Model weight estimate at save time.
    #[must_use]
    pub fn estimated_weight(&self) -> &str {
        &self.estimated_weight
    }

    /// Catch location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Catch date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Measured size.
    #[must_use]
    pub fn size(&self) -> &str {
        &self.size
    }

    /// Measured weight, if recorded.
    #[must_use]
    pub fn weight(&self) -> Option<&str> {
        self.weight.as_deref()
    }

    /// Notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}
