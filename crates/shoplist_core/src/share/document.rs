//! Wire shape of a shared list.

use crate::model::item::{Item, ItemId, Priority};
use crate::model::list::{ListId, ShoppingList};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One list with its items, as written to a `.shoplist` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareDocument {
    pub id: ListId,
    pub name: String,
    #[serde(default)]
    pub items: Vec<ShareItem>,
    pub notes: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareItem {
    pub id: ItemId,
    pub list_id: ListId,
    pub name: String,
    pub notes: Option<String>,
    pub priority: Priority,
    pub quantity: u32,
    pub creation_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl ShareDocument {
    pub fn from_list(list: &ShoppingList, items: &[Item]) -> Self {
        Self {
            id: list.id,
            name: list.name.clone(),
            items: items.iter().map(ShareItem::from).collect(),
            notes: list.notes.clone(),
            creation_date: list.creation_date,
            end_date: list.end_date,
            selected: list.is_selected,
        }
    }
}

impl From<&Item> for ShareItem {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            list_id: item.list_id,
            name: item.name.clone(),
            notes: item.notes.clone(),
            priority: item.priority,
            quantity: item.quantity,
            creation_date: item.creation_date,
            end_date: item.end_date,
        }
    }
}
