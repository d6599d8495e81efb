//! Shopping domain model.
//!
//! # Responsibility
//! - Define lists, items, library products/categories and settings.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - Names are stored trimmed and never blank.
//! - Blank notes collapse to `None`.
//! - Timestamps carry millisecond precision so they survive storage.

use chrono::{DateTime, SubsecRound, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod item;
pub mod library;
pub mod list;
pub mod settings;

/// Field-level validation failure for any shopping record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `name` is empty after trimming.
    BlankName { entity: &'static str },
    /// `end_date` precedes `creation_date`.
    EndBeforeCreation { entity: &'static str },
    /// Item quantity must be at least one.
    ZeroQuantity,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName { entity } => write!(f, "{entity} name must not be blank"),
            Self::EndBeforeCreation { entity } => {
                write!(f, "{entity} end_date must not be earlier than creation_date")
            }
            Self::ZeroQuantity => write!(f, "item quantity must be at least 1"),
        }
    }
}

impl Error for ValidationError {}

/// Current time truncated to what the store can round-trip.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub(crate) fn normalize_name(entity: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName { entity });
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_notes(value: Option<String>) -> Option<String> {
    value
        .map(|notes| notes.trim().to_string())
        .filter(|notes| !notes.is_empty())
}

pub(crate) fn check_dates(
    entity: &'static str,
    creation_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match end_date {
        Some(end) if end < creation_date => Err(ValidationError::EndBeforeCreation { entity }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, normalize_notes, now};

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(normalize_name("list", "  Milk ").unwrap(), "Milk");
        assert!(normalize_name("list", " \t ").is_err());
    }

    #[test]
    fn normalize_notes_drops_whitespace_only() {
        assert_eq!(normalize_notes(Some("   ".to_string())), None);
        assert_eq!(
            normalize_notes(Some(" organic ".to_string())).as_deref(),
            Some("organic")
        );
    }

    #[test]
    fn now_has_millisecond_precision() {
        assert_eq!(now().timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
