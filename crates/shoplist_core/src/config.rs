//! Runtime configuration shared by the CLI and FFI front ends.
//!
//! Resolution order for the database path: explicit value, then the
//! `SHOPLIST_DB_PATH` environment variable, then a file in the temp dir.

use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "SHOPLIST_DB_PATH";
pub const DEFAULT_DB_FILE_NAME: &str = "shoplist.sqlite3";

/// Resolves the database file path.
pub fn resolve_db_path(explicit: Option<&str>) -> PathBuf {
    let from_env = std::env::var(DB_PATH_ENV).ok();
    resolve_db_path_from(explicit, from_env.as_deref())
}

fn resolve_db_path_from(explicit: Option<&str>, from_env: Option<&str>) -> PathBuf {
    non_blank(explicit)
        .or_else(|| non_blank(from_env))
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{resolve_db_path, resolve_db_path_from, DEFAULT_DB_FILE_NAME};
    use std::path::PathBuf;

    #[test]
    fn explicit_path_wins() {
        assert_eq!(
            resolve_db_path(Some(" /data/lists.db ")),
            PathBuf::from("/data/lists.db")
        );
        assert_eq!(
            resolve_db_path_from(Some("/data/lists.db"), Some("/env/other.db")),
            PathBuf::from("/data/lists.db")
        );
    }

    #[test]
    fn blank_explicit_path_falls_back_to_env() {
        assert_eq!(
            resolve_db_path_from(Some("   "), Some(" /env/lists.db ")),
            PathBuf::from("/env/lists.db")
        );
    }

    #[test]
    fn blank_everywhere_uses_temp_dir_default() {
        let expected = std::env::temp_dir().join(DEFAULT_DB_FILE_NAME);
        assert_eq!(resolve_db_path_from(Some(""), Some("  ")), expected);
        assert_eq!(resolve_db_path_from(None, None), expected);
    }
}
