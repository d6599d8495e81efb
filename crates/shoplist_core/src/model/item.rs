//! List item record and priority.

use crate::model::list::ListId;
use crate::model::{check_dates, normalize_name, normalize_notes, now, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ItemId = Uuid;

/// Item priority. Persisted and shared as `0..=2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Low => 0,
            Self::Normal => 1,
            Self::High => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Low),
            1 => Some(Self::Normal),
            2 => Some(Self::High),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    pub fn parse_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" | "0" => Some(Self::Low),
            "normal" | "1" => Some(Self::Normal),
            "high" | "2" => Some(Self::High),
            _ => None,
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::from_i64(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown priority `{raw}`")))
    }
}

/// Single purchasable entry belonging to exactly one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub list_id: ListId,
    pub name: String,
    pub notes: Option<String>,
    pub quantity: u32,
    pub priority: Priority,
    pub is_favorite: bool,
    pub is_completed: bool,
    pub creation_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(list_id: ListId, name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), list_id, name)
    }

    pub fn with_id(id: ItemId, list_id: ListId, name: impl Into<String>) -> Self {
        Self {
            id,
            list_id,
            name: name.into(),
            notes: None,
            quantity: 1,
            priority: Priority::Normal,
            is_favorite: false,
            is_completed: false,
            creation_date: now(),
            end_date: None,
        }
    }

    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        self.name = normalize_name("item", &self.name)?;
        self.notes = normalize_notes(self.notes.take());
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName { entity: "item" });
        }
        if self.quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }
        check_dates("item", self.creation_date, self.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::{Item, Priority};
    use uuid::Uuid;

    #[test]
    fn priority_orders_low_to_high() {
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
        assert_eq!(Priority::from_i64(3), None);
        assert_eq!(Priority::parse_label(" HIGH "), Some(Priority::High));
    }

    #[test]
    fn priority_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "2");
        assert!(serde_json::from_str::<Priority>("7").is_err());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut item = Item::new(Uuid::new_v4(), "eggs");
        item.quantity = 0;
        assert!(item.validate().is_err());
    }
}
