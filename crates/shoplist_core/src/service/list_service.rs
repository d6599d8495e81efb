//! List and item use-case service.
//!
//! # Responsibility
//! - Create/update/delete lists and their items.
//! - Keep each list's completion flag in step with its items.
//!
//! # Invariants
//! - After any item mutation, every touched list satisfies
//!   `is_completed == (has items && all items completed)`.
//! - Writes are read back so callers always see persisted state.

use crate::model::item::{Item, ItemId, Priority};
use crate::model::library::Product;
use crate::model::list::{ListId, ShoppingList};
use crate::model::ValidationError;
use crate::repo::list_repo::{ItemCounts, ItemQuery, ListQuery, ListRepository};
use crate::repo::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ListServiceError {
    Validation(ValidationError),
    ListNotFound(ListId),
    ItemNotFound(ItemId),
    Repo(RepoError),
    /// A write succeeded but its read-back did not.
    InconsistentState(&'static str),
}

impl Display for ListServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ListNotFound(id) => write!(f, "list not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent list state: {details}"),
        }
    }
}

impl Error for ListServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ListServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ListNotFound(id) => Self::ListNotFound(id),
            RepoError::ItemNotFound(id) => Self::ItemNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ListServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type ListServiceResult<T> = Result<T, ListServiceError>;

/// Input for a new list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewList {
    pub name: String,
    pub notes: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
}

impl NewList {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Input for a new item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub notes: Option<String>,
    pub quantity: u32,
    pub priority: Priority,
    pub is_favorite: bool,
    pub end_date: Option<DateTime<Utc>>,
}

impl NewItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: None,
            quantity: 1,
            priority: Priority::Normal,
            is_favorite: false,
            end_date: None,
        }
    }
}

/// Row of the lists screen: a list plus its item totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOverview {
    pub list: ShoppingList,
    pub counts: ItemCounts,
}

pub struct ListService<R: ListRepository> {
    repo: R,
}

impl<R: ListRepository> ListService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_list(&self, input: NewList) -> ListServiceResult<ShoppingList> {
        let mut list = ShoppingList::new(input.name);
        list.notes = input.notes;
        list.end_date = input.end_date;
        list.normalize()?;

        let id = self.repo.create_list(&list)?;
        info!("event=list_create module=list_service status=ok list_id={id}");
        self.read_back_list(id, "created list missing in read-back")
    }

    pub fn get_list(&self, id: ListId) -> RepoResult<Option<ShoppingList>> {
        self.repo.get_list(id)
    }

    pub fn find_lists_by_name(&self, name: &str) -> RepoResult<Vec<ShoppingList>> {
        self.repo.find_lists_by_name(name)
    }

    pub fn list_lists(&self, query: &ListQuery) -> RepoResult<Vec<ShoppingList>> {
        self.repo.list_lists(query)
    }

    /// Lists with their item totals, in `query` order.
    pub fn list_overview(&self, query: &ListQuery) -> RepoResult<Vec<ListOverview>> {
        self.repo
            .list_lists(query)?
            .into_iter()
            .map(|list| {
                let counts = self.repo.count_items(list.id)?;
                Ok(ListOverview { list, counts })
            })
            .collect()
    }

    /// Full replacement of the editable list fields.
    ///
    /// `is_completed` on the input is ignored; it is always derived.
    pub fn update_list(&self, mut list: ShoppingList) -> ListServiceResult<ShoppingList> {
        list.normalize()?;
        self.repo.update_list(&list)?;
        self.read_back_list(list.id, "updated list missing in read-back")
    }

    pub fn rename_list(&self, id: ListId, name: &str) -> ListServiceResult<ShoppingList> {
        self.edit_list(id, |list| list.name = name.to_string())
    }

    pub fn set_list_pinned(&self, id: ListId, pinned: bool) -> ListServiceResult<ShoppingList> {
        self.edit_list(id, |list| list.is_pinned = pinned)
    }

    pub fn set_list_expanded(&self, id: ListId, expanded: bool) -> ListServiceResult<ShoppingList> {
        self.edit_list(id, |list| list.is_expanded = expanded)
    }

    pub fn set_list_selected(&self, id: ListId, selected: bool) -> ListServiceResult<()> {
        self.repo.set_list_selected(id, selected)?;
        Ok(())
    }

    /// Deletes a list and, through the cascade, every item it owns.
    pub fn delete_list(&self, id: ListId) -> ListServiceResult<()> {
        self.repo.delete_list(id)?;
        info!("event=list_delete module=list_service status=ok list_id={id}");
        Ok(())
    }

    pub fn delete_selected_lists(&self) -> ListServiceResult<usize> {
        let removed = self.repo.delete_selected_lists()?;
        info!("event=list_delete_selected module=list_service status=ok removed={removed}");
        Ok(removed)
    }

    pub fn add_item(&self, list_id: ListId, input: NewItem) -> ListServiceResult<Item> {
        let mut item = Item::new(list_id, input.name);
        item.notes = input.notes;
        item.quantity = input.quantity;
        item.priority = input.priority;
        item.is_favorite = input.is_favorite;
        item.end_date = input.end_date;
        item.normalize()?;

        let id = self.repo.create_item(&item)?;
        self.repo.refresh_list_completion(list_id)?;
        debug!("event=item_add module=list_service status=ok list_id={list_id} item_id={id}");
        self.read_back_item(id, "created item missing in read-back")
    }

    /// Instantiates a library product as a new item of `list_id`.
    pub fn add_item_from_product(
        &self,
        list_id: ListId,
        product: &Product,
    ) -> ListServiceResult<Item> {
        let mut input = NewItem::named(product.name.clone());
        input.notes = product.notes.clone();
        input.is_favorite = product.is_favorite;
        self.add_item(list_id, input)
    }

    pub fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        self.repo.get_item(id)
    }

    pub fn list_items(&self, query: &ItemQuery) -> RepoResult<Vec<Item>> {
        self.repo.list_items(query)
    }

    /// Full replacement of an item. Moving to another list refreshes both.
    pub fn update_item(&self, mut item: Item) -> ListServiceResult<Item> {
        let previous = self.require_item(item.id)?;
        item.normalize()?;
        self.repo.update_item(&item)?;

        self.repo.refresh_list_completion(item.list_id)?;
        if previous.list_id != item.list_id {
            self.repo.refresh_list_completion(previous.list_id)?;
        }
        self.read_back_item(item.id, "updated item missing in read-back")
    }

    pub fn set_item_completed(&self, id: ItemId, completed: bool) -> ListServiceResult<Item> {
        let mut item = self.require_item(id)?;
        item.is_completed = completed;
        self.update_item(item)
    }

    pub fn toggle_item_completed(&self, id: ItemId) -> ListServiceResult<Item> {
        let item = self.require_item(id)?;
        self.set_item_completed(id, !item.is_completed)
    }

    pub fn set_item_favorite(&self, id: ItemId, favorite: bool) -> ListServiceResult<Item> {
        let mut item = self.require_item(id)?;
        item.is_favorite = favorite;
        self.update_item(item)
    }

    pub fn move_item(&self, id: ItemId, to_list: ListId) -> ListServiceResult<Item> {
        let mut item = self.require_item(id)?;
        item.list_id = to_list;
        self.update_item(item)
    }

    pub fn delete_item(&self, id: ItemId) -> ListServiceResult<()> {
        let item = self.require_item(id)?;
        self.repo.delete_item(id)?;
        self.repo.refresh_list_completion(item.list_id)?;
        debug!(
            "event=item_delete module=list_service status=ok list_id={} item_id={id}",
            item.list_id
        );
        Ok(())
    }

    /// Marks every item of a list done (or open). Returns items changed.
    pub fn set_all_items_completed(
        &self,
        list_id: ListId,
        completed: bool,
    ) -> ListServiceResult<usize> {
        let changed = self.repo.set_items_completed(list_id, completed)?;
        self.repo.refresh_list_completion(list_id)?;
        Ok(changed)
    }

    /// Removes completed items. Returns items removed.
    pub fn clear_completed_items(&self, list_id: ListId) -> ListServiceResult<usize> {
        let removed = self.repo.delete_completed_items(list_id)?;
        self.repo.refresh_list_completion(list_id)?;
        Ok(removed)
    }

    fn edit_list(
        &self,
        id: ListId,
        edit: impl FnOnce(&mut ShoppingList),
    ) -> ListServiceResult<ShoppingList> {
        let mut list = self
            .repo
            .get_list(id)?
            .ok_or(ListServiceError::ListNotFound(id))?;
        edit(&mut list);
        self.update_list(list)
    }

    fn require_item(&self, id: ItemId) -> ListServiceResult<Item> {
        self.repo
            .get_item(id)?
            .ok_or(ListServiceError::ItemNotFound(id))
    }

    fn read_back_list(&self, id: ListId, details: &'static str) -> ListServiceResult<ShoppingList> {
        self.repo
            .get_list(id)?
            .ok_or(ListServiceError::InconsistentState(details))
    }

    fn read_back_item(&self, id: ItemId, details: &'static str) -> ListServiceResult<Item> {
        self.repo
            .get_item(id)?
            .ok_or(ListServiceError::InconsistentState(details))
    }
}
