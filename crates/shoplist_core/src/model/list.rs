//! Shopping list record.

use crate::model::{check_dates, normalize_name, normalize_notes, now, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ListId = Uuid;

/// Named collection of items with scheduling and completion metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: ListId,
    pub name: String,
    pub notes: Option<String>,
    pub creation_date: DateTime<Utc>,
    /// Optional due date for the shopping trip.
    pub end_date: Option<DateTime<Utc>>,
    pub is_pinned: bool,
    /// Multi-selection flag used by batch actions.
    pub is_selected: bool,
    pub is_expanded: bool,
    /// Derived: true iff the list has items and all are completed.
    pub is_completed: bool,
}

impl ShoppingList {
    /// Creates a new list with a fresh id and `creation_date = now`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a list with a caller-provided id.
    pub fn with_id(id: ListId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            notes: None,
            creation_date: now(),
            end_date: None,
            is_pinned: false,
            is_selected: false,
            is_expanded: true,
            is_completed: false,
        }
    }

    /// Validates and normalizes text fields in place.
    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        self.name = normalize_name("list", &self.name)?;
        self.notes = normalize_notes(self.notes.take());
        self.validate()
    }

    /// Checks invariants without mutating.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName { entity: "list" });
        }
        check_dates("list", self.creation_date, self.end_date)
    }
}
