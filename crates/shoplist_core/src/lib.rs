//! Core domain logic for the shoplist shopping-list app.
//! This crate is the single source of truth for list/library rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod share;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{Item, ItemId, Priority};
pub use model::library::{Category, CategoryId, Product, ProductId, MAX_SEEDED_CATEGORY_ID};
pub use model::list::{ListId, ShoppingList};
pub use model::settings::{Settings, SettingsField};
pub use model::ValidationError;
pub use repo::library_repo::{LibraryRepository, ProductQuery, SqliteLibraryRepository};
pub use repo::list_repo::{
    ItemCounts, ItemQuery, ItemSort, ListQuery, ListRepository, ListSort, SqliteListRepository,
};
pub use repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
pub use repo::{RepoError, RepoResult};
pub use service::library_service::{
    CategoryGroup, LibraryService, LibraryServiceError, NewProduct, SeedOutcome,
};
pub use service::list_service::{
    ListOverview, ListService, ListServiceError, NewItem, NewList,
};
pub use service::settings_service::SettingsService;
pub use share::{ShareDocument, ShareError, ShareItem, SHARE_FILE_EXTENSION};
pub use store::{Action, ShoppingStore, StoreError, StoreState};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
