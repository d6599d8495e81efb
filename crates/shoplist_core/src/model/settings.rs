//! Per-field visibility settings (singleton).

use serde::{Deserialize, Serialize};

/// Which optional fields the UI renders. Every toggle defaults to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub show_list_notes: bool,
    pub show_list_end_date: bool,
    pub show_item_notes: bool,
    pub show_item_quantity: bool,
    pub show_item_priority: bool,
    pub show_item_end_date: bool,
    pub show_product_notes: bool,
    pub show_product_category: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_list_notes: true,
            show_list_end_date: true,
            show_item_notes: true,
            show_item_quantity: true,
            show_item_priority: true,
            show_item_end_date: true,
            show_product_notes: true,
            show_product_category: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsField {
    ListNotes,
    ListEndDate,
    ItemNotes,
    ItemQuantity,
    ItemPriority,
    ItemEndDate,
    ProductNotes,
    ProductCategory,
}

impl SettingsField {
    pub const ALL: [SettingsField; 8] = [
        Self::ListNotes,
        Self::ListEndDate,
        Self::ItemNotes,
        Self::ItemQuantity,
        Self::ItemPriority,
        Self::ItemEndDate,
        Self::ProductNotes,
        Self::ProductCategory,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::ListNotes => "list_notes",
            Self::ListEndDate => "list_end_date",
            Self::ItemNotes => "item_notes",
            Self::ItemQuantity => "item_quantity",
            Self::ItemPriority => "item_priority",
            Self::ItemEndDate => "item_end_date",
            Self::ProductNotes => "product_notes",
            Self::ProductCategory => "product_category",
        }
    }

    pub fn parse_key(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|field| field.key() == normalized)
    }
}

impl Settings {
    pub fn is_visible(&self, field: SettingsField) -> bool {
        match field {
            SettingsField::ListNotes => self.show_list_notes,
            SettingsField::ListEndDate => self.show_list_end_date,
            SettingsField::ItemNotes => self.show_item_notes,
            SettingsField::ItemQuantity => self.show_item_quantity,
            SettingsField::ItemPriority => self.show_item_priority,
            SettingsField::ItemEndDate => self.show_item_end_date,
            SettingsField::ProductNotes => self.show_product_notes,
            SettingsField::ProductCategory => self.show_product_category,
        }
    }

    pub fn set_visible(&mut self, field: SettingsField, visible: bool) {
        let slot = match field {
            SettingsField::ListNotes => &mut self.show_list_notes,
            SettingsField::ListEndDate => &mut self.show_list_end_date,
            SettingsField::ItemNotes => &mut self.show_item_notes,
            SettingsField::ItemQuantity => &mut self.show_item_quantity,
            SettingsField::ItemPriority => &mut self.show_item_priority,
            SettingsField::ItemEndDate => &mut self.show_item_end_date,
            SettingsField::ProductNotes => &mut self.show_product_notes,
            SettingsField::ProductCategory => &mut self.show_product_category,
        };
        *slot = visible;
    }
}
