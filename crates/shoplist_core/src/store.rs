//! Unidirectional view-state container.
//!
//! # Responsibility
//! - Accept UI intents as [`Action`]s and run the matching use case.
//! - Re-fetch and publish a complete [`StoreState`] after every action.
//!
//! # Invariants
//! - `dispatch` never panics and never propagates errors: failures are
//!   logged and surfaced through `StoreState::last_error`.
//! - `state()` always reflects storage as of the last dispatch.

use crate::model::item::{Item, ItemId};
use crate::model::library::{Category, CategoryId, ProductId};
use crate::model::list::{ListId, ShoppingList};
use crate::model::settings::{Settings, SettingsField};
use crate::repo::library_repo::{ProductQuery, SqliteLibraryRepository};
use crate::repo::list_repo::{ItemQuery, ItemSort, ListQuery, ListSort, SqliteListRepository};
use crate::repo::settings_repo::SqliteSettingsRepository;
use crate::repo::{RepoError, RepoResult};
use crate::service::library_service::{
    CategoryGroup, LibraryService, LibraryServiceError, NewProduct,
};
use crate::service::list_service::{ListOverview, ListService, ListServiceError, NewItem, NewList};
use crate::service::settings_service::SettingsService;
use crate::share::{self, ShareError};
use log::{debug, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Snapshot rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreState {
    pub lists: Vec<ListOverview>,
    pub active_list: Option<ShoppingList>,
    /// Items of `active_list`, filtered and sorted per the fields below.
    pub items: Vec<Item>,
    pub categories: Vec<Category>,
    pub library: Vec<CategoryGroup>,
    pub product_filter: ProductQuery,
    pub settings: Settings,
    pub list_sort: ListSort,
    pub item_sort: ItemSort,
    pub show_completed_items: bool,
    pub last_export: Option<PathBuf>,
    pub last_error: Option<String>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            lists: Vec::new(),
            active_list: None,
            items: Vec::new(),
            categories: Vec::new(),
            library: Vec::new(),
            product_filter: ProductQuery::default(),
            settings: Settings::default(),
            list_sort: ListSort::default(),
            item_sort: ItemSort::default(),
            show_completed_items: true,
            last_export: None,
            last_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadInitialData,
    Refresh,

    CreateList(NewList),
    RenameList { id: ListId, name: String },
    SetListPinned { id: ListId, pinned: bool },
    SetListExpanded { id: ListId, expanded: bool },
    ToggleListSelected(ListId),
    DeleteList(ListId),
    DeleteSelectedLists,
    OpenList(ListId),
    CloseList,
    SetListSort(ListSort),

    /// Adds to the active list.
    AddItem(NewItem),
    /// Instantiates a library product in the active list.
    AddProduct(ProductId),
    UpdateItem(Item),
    ToggleItem(ItemId),
    DeleteItem(ItemId),
    MoveItem { id: ItemId, to_list: ListId },
    CompleteAllItems(bool),
    ClearCompletedItems,
    SetItemSort(ItemSort),
    SetShowCompletedItems(bool),

    FilterProducts(ProductQuery),
    CreateProduct(NewProduct),
    ToggleProductFavorite(ProductId),
    SetProductActive { id: ProductId, active: bool },
    DeleteProduct(ProductId),
    CreateCategory(String),
    ToggleCategoryExpanded(CategoryId),
    DeleteCategory(CategoryId),

    SetFieldVisible { field: SettingsField, visible: bool },
    ResetSettings,

    /// Writes the active list to a share file in the directory.
    ExportActiveList { dir: PathBuf },
    /// Imports a share file and opens the new list.
    ImportFile(PathBuf),
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Self::LoadInitialData => "load_initial_data",
            Self::Refresh => "refresh",
            Self::CreateList(_) => "create_list",
            Self::RenameList { .. } => "rename_list",
            Self::SetListPinned { .. } => "set_list_pinned",
            Self::SetListExpanded { .. } => "set_list_expanded",
            Self::ToggleListSelected(_) => "toggle_list_selected",
            Self::DeleteList(_) => "delete_list",
            Self::DeleteSelectedLists => "delete_selected_lists",
            Self::OpenList(_) => "open_list",
            Self::CloseList => "close_list",
            Self::SetListSort(_) => "set_list_sort",
            Self::AddItem(_) => "add_item",
            Self::AddProduct(_) => "add_product",
            Self::UpdateItem(_) => "update_item",
            Self::ToggleItem(_) => "toggle_item",
            Self::DeleteItem(_) => "delete_item",
            Self::MoveItem { .. } => "move_item",
            Self::CompleteAllItems(_) => "complete_all_items",
            Self::ClearCompletedItems => "clear_completed_items",
            Self::SetItemSort(_) => "set_item_sort",
            Self::SetShowCompletedItems(_) => "set_show_completed_items",
            Self::FilterProducts(_) => "filter_products",
            Self::CreateProduct(_) => "create_product",
            Self::ToggleProductFavorite(_) => "toggle_product_favorite",
            Self::SetProductActive { .. } => "set_product_active",
            Self::DeleteProduct(_) => "delete_product",
            Self::CreateCategory(_) => "create_category",
            Self::ToggleCategoryExpanded(_) => "toggle_category_expanded",
            Self::DeleteCategory(_) => "delete_category",
            Self::SetFieldVisible { .. } => "set_field_visible",
            Self::ResetSettings => "reset_settings",
            Self::ExportActiveList { .. } => "export_active_list",
            Self::ImportFile(_) => "import_file",
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    NoActiveList,
    ProductNotFound(ProductId),
    CategoryNotFound(CategoryId),
    List(ListServiceError),
    Library(LibraryServiceError),
    Share(ShareError),
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveList => write!(f, "no list is open"),
            Self::ProductNotFound(id) => write!(f, "product not found: {id}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::List(err) => write!(f, "{err}"),
            Self::Library(err) => write!(f, "{err}"),
            Self::Share(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::List(err) => Some(err),
            Self::Library(err) => Some(err),
            Self::Share(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ListServiceError> for StoreError {
    fn from(value: ListServiceError) -> Self {
        Self::List(value)
    }
}

impl From<LibraryServiceError> for StoreError {
    fn from(value: LibraryServiceError) -> Self {
        Self::Library(value)
    }
}

impl From<ShareError> for StoreError {
    fn from(value: ShareError) -> Self {
        Self::Share(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct ShoppingStore<'conn> {
    conn: &'conn Connection,
    lists: ListService<SqliteListRepository<'conn>>,
    library: LibraryService<SqliteLibraryRepository<'conn>>,
    settings: SettingsService<SqliteSettingsRepository<'conn>>,
    state: StoreState,
}

impl<'conn> ShoppingStore<'conn> {
    /// Builds a store over a migrated connection and loads the first snapshot.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let mut store = Self {
            conn,
            lists: ListService::new(SqliteListRepository::try_new(conn)?),
            library: LibraryService::new(SqliteLibraryRepository::try_new(conn)?),
            settings: SettingsService::new(SqliteSettingsRepository::try_new(conn)?),
            state: StoreState::default(),
        };
        store.refresh()?;
        Ok(store)
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Runs one action and republishes state. Returns `false` on failure.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let name = action.name();
        let outcome = self.apply(action);
        let refreshed = self.refresh();

        match outcome.and(refreshed.map_err(StoreError::from)) {
            Ok(()) => {
                debug!("event=store_dispatch module=store status=ok action={name}");
                self.state.last_error = None;
                true
            }
            Err(err) => {
                warn!("event=store_dispatch module=store status=error action={name} error={err}");
                self.state.last_error = Some(err.to_string());
                false
            }
        }
    }

    fn apply(&mut self, action: Action) -> Result<(), StoreError> {
        match action {
            Action::LoadInitialData => {
                self.library.load_initial_data_if_needed()?;
            }
            Action::Refresh => {}

            Action::CreateList(input) => {
                let list = self.lists.create_list(input)?;
                self.state.active_list = Some(list);
            }
            Action::RenameList { id, name } => {
                self.lists.rename_list(id, &name)?;
            }
            Action::SetListPinned { id, pinned } => {
                self.lists.set_list_pinned(id, pinned)?;
            }
            Action::SetListExpanded { id, expanded } => {
                self.lists.set_list_expanded(id, expanded)?;
            }
            Action::ToggleListSelected(id) => {
                let list = self
                    .lists
                    .get_list(id)?
                    .ok_or(ListServiceError::ListNotFound(id))?;
                self.lists.set_list_selected(id, !list.is_selected)?;
            }
            Action::DeleteList(id) => {
                self.lists.delete_list(id)?;
            }
            Action::DeleteSelectedLists => {
                self.lists.delete_selected_lists()?;
            }
            Action::OpenList(id) => {
                let list = self
                    .lists
                    .get_list(id)?
                    .ok_or(ListServiceError::ListNotFound(id))?;
                self.state.active_list = Some(list);
            }
            Action::CloseList => self.state.active_list = None,
            Action::SetListSort(sort) => self.state.list_sort = sort,

            Action::AddItem(input) => {
                let list_id = self.active_list_id()?;
                self.lists.add_item(list_id, input)?;
            }
            Action::AddProduct(product_id) => {
                let list_id = self.active_list_id()?;
                let product = self
                    .library
                    .get_product(product_id)?
                    .ok_or(StoreError::ProductNotFound(product_id))?;
                self.lists.add_item_from_product(list_id, &product)?;
            }
            Action::UpdateItem(item) => {
                self.lists.update_item(item)?;
            }
            Action::ToggleItem(id) => {
                self.lists.toggle_item_completed(id)?;
            }
            Action::DeleteItem(id) => {
                self.lists.delete_item(id)?;
            }
            Action::MoveItem { id, to_list } => {
                self.lists.move_item(id, to_list)?;
            }
            Action::CompleteAllItems(completed) => {
                let list_id = self.active_list_id()?;
                self.lists.set_all_items_completed(list_id, completed)?;
            }
            Action::ClearCompletedItems => {
                let list_id = self.active_list_id()?;
                self.lists.clear_completed_items(list_id)?;
            }
            Action::SetItemSort(sort) => self.state.item_sort = sort,
            Action::SetShowCompletedItems(show) => self.state.show_completed_items = show,

            Action::FilterProducts(query) => self.state.product_filter = query,
            Action::CreateProduct(input) => {
                self.library.create_product(input)?;
            }
            Action::ToggleProductFavorite(id) => {
                let product = self
                    .library
                    .get_product(id)?
                    .ok_or(StoreError::ProductNotFound(id))?;
                self.library.set_product_favorite(id, !product.is_favorite)?;
            }
            Action::SetProductActive { id, active } => {
                self.library.set_product_active(id, active)?;
            }
            Action::DeleteProduct(id) => {
                self.library.delete_product(id)?;
            }
            Action::CreateCategory(name) => {
                self.library.create_category(&name)?;
            }
            Action::ToggleCategoryExpanded(id) => {
                let category = self
                    .library
                    .get_category(id)?
                    .ok_or(StoreError::CategoryNotFound(id))?;
                self.library
                    .set_category_expanded(id, !category.is_expanded)?;
            }
            Action::DeleteCategory(id) => {
                self.library.delete_category(id)?;
            }

            Action::SetFieldVisible { field, visible } => {
                self.settings.set_field_visible(field, visible)?;
            }
            Action::ResetSettings => {
                self.settings.reset_settings()?;
            }

            Action::ExportActiveList { dir } => {
                let list_id = self.active_list_id()?;
                let path = share::export_list_to_file(self.conn, list_id, dir)?;
                self.state.last_export = Some(path);
            }
            Action::ImportFile(path) => {
                let list = share::import_share_file(self.conn, path)?;
                self.state.active_list = Some(list);
            }
        }
        Ok(())
    }

    fn active_list_id(&self) -> Result<ListId, StoreError> {
        self.state
            .active_list
            .as_ref()
            .map(|list| list.id)
            .ok_or(StoreError::NoActiveList)
    }

    fn refresh(&mut self) -> RepoResult<()> {
        self.state.lists = self.lists.list_overview(&ListQuery {
            include_completed: true,
            sort: self.state.list_sort,
        })?;

        let active_id = self.state.active_list.as_ref().map(|list| list.id);
        self.state.active_list = match active_id {
            Some(id) => self.lists.get_list(id)?,
            None => None,
        };
        self.state.items = match self.state.active_list.as_ref() {
            Some(list) => self.lists.list_items(&ItemQuery {
                list_id: list.id,
                include_completed: self.state.show_completed_items,
                favorites_only: false,
                sort: self.state.item_sort,
            })?,
            None => Vec::new(),
        };

        self.state.categories = self.library.list_categories()?;
        self.state.library = self
            .library
            .products_by_category(&self.state.product_filter)?;
        self.state.settings = self.settings.get_settings()?;
        Ok(())
    }
}
