//! Builds catch log entries from an identification plus user details.
//!
//! [`assemble`] is pure: it stamps a fresh [`CatchId`] and copies fields,
//! but never touches the log itself.

use chrono::NaiveDate;

use super::catch_entry::ValidatedDetails;
use super::{CatchDetails, CatchId, CatchLogEntry, FishIdentification, ImageUpload};

/// Rejection reasons when assembling an entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssembleError {
    /// A required user field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Merges `identification`, `details`, and `image` into a new entry.
///
/// `today` is the fallback catch date when `details.date` is `None`.
/// Blank `weight` / `notes` are stored as absent.
///
/// # Errors
///
/// Returns [`AssembleError::MissingField`] if `location` or `size` is blank.
pub fn assemble(
    identification: &FishIdentification,
    details: CatchDetails,
    image: &ImageUpload,
    today: NaiveDate,
) -> Result<CatchLogEntry, AssembleError> {
    let location = required(details.location, "location")?;
    let size = required(details.size, "size")?;

    let validated = ValidatedDetails {
        location,
        date: details.date.unwrap_or(today),
        size,
        weight: optional(details.weight),
        notes: optional(details.notes),
    };

    Ok(CatchLogEntry::snapshot(
        CatchId::generate(),
        image.data_uri(),
        identification,
        validated,
    ))
}

fn required(value: String, field: &'static str) -> Result<String, AssembleError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AssembleError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
