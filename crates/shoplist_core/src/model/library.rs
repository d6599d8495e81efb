//! Product library: reusable products grouped by category.

use crate::model::{normalize_name, normalize_notes, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProductId = Uuid;
/// Seeded categories keep their built-in ids; custom ones are appended.
pub type CategoryId = i64;

/// Ids `1..=MAX_SEEDED_CATEGORY_ID` belong to the built-in library.
pub const MAX_SEEDED_CATEGORY_ID: CategoryId = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub is_favorite: bool,
    pub is_expanded: bool,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_favorite: false,
            is_expanded: true,
        }
    }

    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        self.name = normalize_name("category", &self.name)?;
        Ok(())
    }
}

/// Library entry from which list items can be instantiated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub notes: Option<String>,
    pub category_id: CategoryId,
    /// Inactive products are hidden from the picker but kept.
    pub is_active: bool,
    pub is_favorite: bool,
    /// User-created. Built-in products are never custom.
    pub is_custom: bool,
}

impl Product {
    /// Creates a user-defined product.
    pub fn custom(name: impl Into<String>, category_id: CategoryId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            notes: None,
            category_id,
            is_active: true,
            is_favorite: false,
            is_custom: true,
        }
    }

    /// Creates a built-in product from seed data.
    pub fn seeded(name: impl Into<String>, category_id: CategoryId) -> Self {
        Self {
            is_custom: false,
            ..Self::custom(name, category_id)
        }
    }

    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        self.name = normalize_name("product", &self.name)?;
        self.notes = normalize_notes(self.notes.take());
        Ok(())
    }
}
