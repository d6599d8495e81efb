//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Reduce core errors to simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Ids cross the boundary as canonical UUID strings.
//! - Every call opens its own connection; no handle outlives a call.

use log::warn;
use rusqlite::Connection;
use shoplist_core::config::resolve_db_path;
use shoplist_core::db::open_db;
use shoplist_core::share::{export_list_to_file, import_share_file};
use shoplist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    LibraryService, ListQuery, ListService, NewItem, NewList, Priority, SeedOutcome,
    SqliteLibraryRepository, SqliteListRepository,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Id of the list or item the action produced or touched.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// One row of the lists screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSummary {
    pub id: String,
    pub name: String,
    pub notes: Option<String>,
    /// Creation time as epoch milliseconds.
    pub creation_epoch_ms: i64,
    pub is_pinned: bool,
    pub is_completed: bool,
    pub item_count: u32,
    pub completed_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListsResponse {
    pub ok: bool,
    pub lists: Vec<ListSummary>,
    pub message: String,
}

/// Result of writing a share file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListExportResponse {
    pub ok: bool,
    /// Absolute path of the written `.shoplist` file.
    pub path: Option<String>,
    pub message: String,
}

/// Seeds the built-in product library on first launch.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Idempotent: later calls report that the library is already loaded.
#[flutter_rust_bridge::frb(sync)]
pub fn library_load_initial_data() -> ActionResponse {
    let outcome = with_connection(|conn| {
        let repo = SqliteLibraryRepository::try_new(conn).map_err(|err| err.to_string())?;
        LibraryService::new(repo)
            .load_initial_data_if_needed()
            .map_err(|err| err.to_string())
    });
    match outcome {
        Ok(SeedOutcome::Seeded {
            categories,
            products,
        }) => ActionResponse::success(
            format!("Library seeded with {categories} categories and {products} products."),
            None,
        ),
        Ok(SeedOutcome::AlreadyLoaded) => {
            ActionResponse::success("Library already loaded.", None)
        }
        Err(err) => failure("library_load_initial_data", err),
    }
}

/// Creates a list and returns its id.
#[flutter_rust_bridge::frb(sync)]
pub fn list_create(name: String, notes: Option<String>) -> ActionResponse {
    let input = NewList {
        name,
        notes,
        end_date: None,
    };
    match with_list_service(|service| service.create_list(input).map_err(|err| err.to_string())) {
        Ok(list) => ActionResponse::success("List created.", Some(list.id.to_string())),
        Err(err) => failure("list_create", err),
    }
}

/// Lists with their item totals, pinned first then newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn lists_overview() -> ListsResponse {
    let outcome = with_list_service(|service| {
        service
            .list_overview(&ListQuery::default())
            .map_err(|err| err.to_string())
    });
    match outcome {
        Ok(rows) => {
            let lists = rows
                .into_iter()
                .map(|row| ListSummary {
                    id: row.list.id.to_string(),
                    name: row.list.name,
                    notes: row.list.notes,
                    creation_epoch_ms: row.list.creation_date.timestamp_millis(),
                    is_pinned: row.list.is_pinned,
                    is_completed: row.list.is_completed,
                    item_count: row.counts.total,
                    completed_count: row.counts.completed,
                })
                .collect::<Vec<_>>();
            let message = format!("Found {} list(s).", lists.len());
            ListsResponse {
                ok: true,
                lists,
                message,
            }
        }
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call=lists_overview");
            ListsResponse {
                ok: false,
                lists: Vec::new(),
                message: format!("lists_overview failed: {err}"),
            }
        }
    }
}

/// Adds an item to a list.
///
/// `priority` is `0` (low), `1` (normal) or `2` (high); `quantity` must be
/// at least one.
#[flutter_rust_bridge::frb(sync)]
pub fn item_add(list_id: String, name: String, quantity: u32, priority: i32) -> ActionResponse {
    let list_id = match parse_id("list_id", &list_id) {
        Ok(id) => id,
        Err(err) => return failure("item_add", err),
    };
    let Some(priority) = Priority::from_i64(i64::from(priority)) else {
        return failure("item_add", format!("unknown priority `{priority}`"));
    };
    let mut input = NewItem::named(name);
    input.quantity = quantity;
    input.priority = priority;

    match with_list_service(|service| {
        service
            .add_item(list_id, input)
            .map_err(|err| err.to_string())
    }) {
        Ok(item) => ActionResponse::success("Item added.", Some(item.id.to_string())),
        Err(err) => failure("item_add", err),
    }
}

/// Marks an item done or open; the owning list's completion follows.
#[flutter_rust_bridge::frb(sync)]
pub fn item_set_completed(item_id: String, completed: bool) -> ActionResponse {
    let item_id = match parse_id("item_id", &item_id) {
        Ok(id) => id,
        Err(err) => return failure("item_set_completed", err),
    };
    match with_list_service(|service| {
        service
            .set_item_completed(item_id, completed)
            .map_err(|err| err.to_string())
    }) {
        Ok(item) => ActionResponse::success("Item updated.", Some(item.id.to_string())),
        Err(err) => failure("item_set_completed", err),
    }
}

/// Deletes a list together with its items.
#[flutter_rust_bridge::frb(sync)]
pub fn list_delete(list_id: String) -> ActionResponse {
    let list_id = match parse_id("list_id", &list_id) {
        Ok(id) => id,
        Err(err) => return failure("list_delete", err),
    };
    match with_list_service(|service| service.delete_list(list_id).map_err(|err| err.to_string()))
    {
        Ok(()) => ActionResponse::success("List deleted.", Some(list_id.to_string())),
        Err(err) => failure("list_delete", err),
    }
}

/// Writes a list to a `.shoplist` file inside `dir` for the share sheet.
#[flutter_rust_bridge::frb(sync)]
pub fn list_export(list_id: String, dir: String) -> ListExportResponse {
    let outcome = parse_id("list_id", &list_id).and_then(|list_id| {
        with_connection(|conn| {
            export_list_to_file(conn, list_id, dir.trim()).map_err(|err| err.to_string())
        })
    });
    match outcome {
        Ok(path) => ListExportResponse {
            ok: true,
            path: Some(path.to_string_lossy().into_owned()),
            message: "List exported.".to_string(),
        },
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call=list_export");
            ListExportResponse {
                ok: false,
                path: None,
                message: format!("list_export failed: {err}"),
            }
        }
    }
}

/// Imports a `.shoplist` file as a new list.
///
/// # FFI contract
/// - Async on the Dart side; file and DB work run off the UI thread.
/// - A malformed file persists nothing.
pub fn list_import(path: String) -> ActionResponse {
    match with_connection(|conn| import_share_file(conn, path.trim()).map_err(|err| err.to_string()))
    {
        Ok(list) => ActionResponse::success("List imported.", Some(list.id.to_string())),
        Err(err) => failure("list_import", err),
    }
}

fn failure(call: &str, err: String) -> ActionResponse {
    warn!("event=ffi_call module=ffi status=error call={call}");
    ActionResponse::failure(format!("{call} failed: {err}"))
}

fn parse_id(field: &str, raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("{field} is not a valid id"))
}

fn db_path() -> PathBuf {
    DB_PATH.get_or_init(|| resolve_db_path(None)).clone()
}

fn with_connection<T>(f: impl FnOnce(&Connection) -> Result<T, String>) -> Result<T, String> {
    let conn = open_db(db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    f(&conn)
}

fn with_list_service<T>(
    f: impl FnOnce(&ListService<SqliteListRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo =
            SqliteListRepository::try_new(conn).map_err(|err| format!("repo init failed: {err}"))?;
        f(&ListService::new(repo))
    })
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, item_add, item_set_completed, library_load_initial_data,
        list_create, list_delete, list_export, list_import, lists_overview, ping,
    };
    use shoplist_core::db::open_db;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn library_seed_is_idempotent() {
        let first = library_load_initial_data();
        assert!(first.ok, "{}", first.message);
        let second = library_load_initial_data();
        assert!(second.ok, "{}", second.message);
        assert_eq!(second.message, "Library already loaded.");
    }

    #[test]
    fn created_list_shows_up_with_item_counts() {
        let name = unique_token("ffi-list");
        let created = list_create(name.clone(), None);
        assert!(created.ok, "{}", created.message);
        let list_id = created.id.expect("create should return list id");

        let milk = item_add(list_id.clone(), "Milk".to_string(), 2, 2);
        assert!(milk.ok, "{}", milk.message);
        let eggs = item_add(list_id.clone(), "Eggs".to_string(), 1, 1);
        assert!(eggs.ok, "{}", eggs.message);

        let done = item_set_completed(milk.id.expect("item id"), true);
        assert!(done.ok, "{}", done.message);

        let overview = lists_overview();
        assert!(overview.ok, "{}", overview.message);
        let row = overview
            .lists
            .iter()
            .find(|row| row.id == list_id)
            .expect("created list should be listed");
        assert_eq!(row.name, name);
        assert_eq!(row.item_count, 2);
        assert_eq!(row.completed_count, 1);
        assert!(!row.is_completed);
    }

    #[test]
    fn deleting_list_removes_its_items() {
        let created = list_create(unique_token("ffi-delete"), None);
        let list_id = created.id.expect("create should return list id");
        assert!(item_add(list_id.clone(), "Soap".to_string(), 1, 1).ok);

        let deleted = list_delete(list_id.clone());
        assert!(deleted.ok, "{}", deleted.message);

        let conn = open_db(super::db_path()).expect("open db");
        let remaining: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM items WHERE list_id = ?1",
                [list_id.as_str()],
                |row| row.get(0),
            )
            .expect("count items");
        assert_eq!(remaining, 0);
        assert!(!list_delete(list_id).ok);
    }

    #[test]
    fn item_add_rejects_bad_input() {
        let bad_id = item_add("not-a-uuid".to_string(), "Milk".to_string(), 1, 1);
        assert!(!bad_id.ok);
        assert!(bad_id.message.contains("list_id"));

        let created = list_create(unique_token("ffi-bad-item"), None);
        let list_id = created.id.expect("create should return list id");
        assert!(!item_add(list_id.clone(), "Milk".to_string(), 1, 9).ok);
        assert!(!item_add(list_id.clone(), "Milk".to_string(), 0, 1).ok);
        assert!(!item_add(list_id, "   ".to_string(), 1, 1).ok);
    }

    #[test]
    fn export_then_import_creates_copy() {
        let dir = std::env::temp_dir().join(unique_token("ffi-share"));
        std::fs::create_dir_all(&dir).expect("create share dir");
        let name = unique_token("ffi-export");
        let created = list_create(name.clone(), Some("for the party".to_string()));
        let list_id = created.id.expect("create should return list id");
        assert!(item_add(list_id.clone(), "Cake".to_string(), 1, 2).ok);

        let exported = list_export(list_id.clone(), dir.to_string_lossy().into_owned());
        assert!(exported.ok, "{}", exported.message);
        let path = exported.path.expect("export should return path");
        assert!(path.ends_with(".shoplist"));

        let imported = list_import(path);
        assert!(imported.ok, "{}", imported.message);
        let copy_id = imported.id.expect("import should return list id");
        assert_ne!(copy_id, list_id);

        let overview = lists_overview();
        let copy = overview
            .lists
            .iter()
            .find(|row| row.id == copy_id)
            .expect("imported list should be listed");
        assert_eq!(copy.name, name);
        assert_eq!(copy.item_count, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn import_of_garbage_file_fails() {
        let dir = std::env::temp_dir().join(unique_token("ffi-garbage"));
        std::fs::create_dir_all(&dir).expect("create dir");
        let path = dir.join("broken.shoplist");
        std::fs::write(&path, "{ not json").expect("write file");

        let response = list_import(path.to_string_lossy().into_owned());
        assert!(!response.ok);
        assert!(response.message.starts_with("list_import failed"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
