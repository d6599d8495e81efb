//! List sharing through `.shoplist` JSON files.
//!
//! # Responsibility
//! - Encode one list with its items into the share document.
//! - Decode a share document and persist it as a new list.
//!
//! # Invariants
//! - Import is all-or-nothing: a bad document persists no rows.
//! - Imported lists and items get fresh ids, so re-importing a list that
//!   already exists yields a copy instead of a conflict.
//! - Imported items start open; the list completion flag is recomputed.

mod document;

pub use document::{ShareDocument, ShareItem};

use crate::model::item::Item;
use crate::model::list::{ListId, ShoppingList};
use crate::model::ValidationError;
use crate::repo::list_repo::{ItemQuery, ListRepository, SqliteListRepository};
use crate::repo::RepoError;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Extension registered for shared list files.
pub const SHARE_FILE_EXTENSION: &str = "shoplist";

const MAX_FILE_STEM_CHARS: usize = 64;

static UNSAFE_FILE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9 _\-]+").expect("valid file name regex"));

pub type ShareResult<T> = Result<T, ShareError>;

#[derive(Debug)]
pub enum ShareError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Validation(ValidationError),
    ListNotFound(ListId),
    Repo(RepoError),
}

impl Display for ShareError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "share file i/o failed: {err}"),
            Self::Json(err) => write!(f, "malformed share document: {err}"),
            Self::Validation(err) => write!(f, "invalid shared list: {err}"),
            Self::ListNotFound(id) => write!(f, "list not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ShareError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::ListNotFound(_) => None,
        }
    }
}

impl From<std::io::Error> for ShareError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ShareError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ValidationError> for ShareError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ShareError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ListNotFound(id) => Self::ListNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<rusqlite::Error> for ShareError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Builds the share document for one stored list.
pub fn export_list(conn: &Connection, list_id: ListId) -> ShareResult<ShareDocument> {
    let repo = SqliteListRepository::try_new(conn)?;
    let list = repo
        .get_list(list_id)?
        .ok_or(ShareError::ListNotFound(list_id))?;
    let items = repo.list_items(&ItemQuery::for_list(list_id))?;
    Ok(ShareDocument::from_list(&list, &items))
}

/// Pretty-printed JSON for a share document.
pub fn to_json(document: &ShareDocument) -> ShareResult<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

pub fn parse_share_document(source: &str) -> ShareResult<ShareDocument> {
    Ok(serde_json::from_str(source)?)
}

/// Writes `document` into `dir` and returns the file path.
///
/// The file name is derived from the list name; an existing file with the
/// same name is overwritten.
pub fn write_share_file(dir: impl AsRef<Path>, document: &ShareDocument) -> ShareResult<PathBuf> {
    let path = dir.as_ref().join(format!(
        "{}.{SHARE_FILE_EXTENSION}",
        share_file_stem(&document.name)
    ));
    std::fs::write(&path, to_json(document)?)?;
    info!(
        "event=list_export module=share status=ok list_id={} items={}",
        document.id,
        document.items.len()
    );
    Ok(path)
}

pub fn read_share_file(path: impl AsRef<Path>) -> ShareResult<ShareDocument> {
    let source = std::fs::read_to_string(path)?;
    parse_share_document(&source)
}

/// Exports a stored list straight to a file in `dir`.
pub fn export_list_to_file(
    conn: &Connection,
    list_id: ListId,
    dir: impl AsRef<Path>,
) -> ShareResult<PathBuf> {
    let document = export_list(conn, list_id)?;
    write_share_file(dir, &document)
}

/// Persists `document` as a brand new list in a single transaction.
pub fn import_document(conn: &Connection, document: &ShareDocument) -> ShareResult<ShoppingList> {
    let tx = conn.unchecked_transaction()?;
    let imported = {
        let repo = SqliteListRepository::try_new(&tx)?;

        let mut list = ShoppingList::new(document.name.as_str());
        list.notes = document.notes.clone();
        list.creation_date = document.creation_date;
        list.end_date = document.end_date;
        list.is_selected = document.selected;
        list.normalize()?;
        repo.create_list(&list)?;

        for shared in &document.items {
            let mut item = Item::new(list.id, shared.name.as_str());
            item.notes = shared.notes.clone();
            item.priority = shared.priority;
            item.quantity = shared.quantity;
            item.creation_date = shared.creation_date;
            item.end_date = shared.end_date;
            item.normalize()?;
            repo.create_item(&item)?;
        }
        repo.refresh_list_completion(list.id)?;
        repo.get_list(list.id)?.ok_or(ShareError::ListNotFound(list.id))?
    };
    tx.commit()?;

    info!(
        "event=list_import module=share status=ok list_id={} items={}",
        imported.id,
        document.items.len()
    );
    Ok(imported)
}

/// Reads and imports a `.shoplist` file.
pub fn import_share_file(conn: &Connection, path: impl AsRef<Path>) -> ShareResult<ShoppingList> {
    let document = read_share_file(path)?;
    import_document(conn, &document)
}

fn share_file_stem(name: &str) -> String {
    let replaced = UNSAFE_FILE_CHARS_RE.replace_all(name.trim(), "_");
    let stem: String = replaced.trim().chars().take(MAX_FILE_STEM_CHARS).collect();
    if stem.is_empty() || stem.chars().all(|ch| ch == '_') {
        "shopping-list".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::share_file_stem;

    #[test]
    fn file_stem_replaces_path_separators() {
        assert_eq!(share_file_stem("Week 12 / BBQ"), "Week 12 _ BBQ");
        assert_eq!(share_file_stem("../../etc"), "_etc");
    }

    #[test]
    fn file_stem_falls_back_for_unusable_names() {
        assert_eq!(share_file_stem("   "), "shopping-list");
        assert_eq!(share_file_stem("///"), "shopping-list");
    }

    #[test]
    fn file_stem_is_capped() {
        assert_eq!(share_file_stem(&"a".repeat(200)).chars().count(), 64);
    }
}
