//! Settings singleton repository.

use crate::model::settings::Settings;
use crate::repo::{bool_to_int, ensure_connection_ready, int_to_bool, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait SettingsRepository {
    /// Returns defaults when the singleton row is absent.
    fn load_settings(&self) -> RepoResult<Settings>;
    fn save_settings(&self, settings: &Settings) -> RepoResult<()>;
}

pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["settings"])?;
        Ok(Self { conn })
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn load_settings(&self) -> RepoResult<Settings> {
        let raw: Option<[i64; 8]> = self
            .conn
            .query_row(
                "SELECT
                    show_list_notes,
                    show_list_end_date,
                    show_item_notes,
                    show_item_quantity,
                    show_item_priority,
                    show_item_end_date,
                    show_product_notes,
                    show_product_category
                 FROM settings
                 WHERE id = 1;",
                [],
                |row| {
                    Ok([
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                        row.get(7)?,
                    ])
                },
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(Settings::default());
        };

        Ok(Settings {
            show_list_notes: int_to_bool(raw[0], "settings.show_list_notes")?,
            show_list_end_date: int_to_bool(raw[1], "settings.show_list_end_date")?,
            show_item_notes: int_to_bool(raw[2], "settings.show_item_notes")?,
            show_item_quantity: int_to_bool(raw[3], "settings.show_item_quantity")?,
            show_item_priority: int_to_bool(raw[4], "settings.show_item_priority")?,
            show_item_end_date: int_to_bool(raw[5], "settings.show_item_end_date")?,
            show_product_notes: int_to_bool(raw[6], "settings.show_product_notes")?,
            show_product_category: int_to_bool(raw[7], "settings.show_product_category")?,
        })
    }

    fn save_settings(&self, settings: &Settings) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO settings (
                id,
                show_list_notes,
                show_list_end_date,
                show_item_notes,
                show_item_quantity,
                show_item_priority,
                show_item_end_date,
                show_product_notes,
                show_product_category
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (id) DO UPDATE SET
                show_list_notes = excluded.show_list_notes,
                show_list_end_date = excluded.show_list_end_date,
                show_item_notes = excluded.show_item_notes,
                show_item_quantity = excluded.show_item_quantity,
                show_item_priority = excluded.show_item_priority,
                show_item_end_date = excluded.show_item_end_date,
                show_product_notes = excluded.show_product_notes,
                show_product_category = excluded.show_product_category;",
            params![
                bool_to_int(settings.show_list_notes),
                bool_to_int(settings.show_list_end_date),
                bool_to_int(settings.show_item_notes),
                bool_to_int(settings.show_item_quantity),
                bool_to_int(settings.show_item_priority),
                bool_to_int(settings.show_item_end_date),
                bool_to_int(settings.show_product_notes),
                bool_to_int(settings.show_product_category),
            ],
        )?;
        Ok(())
    }
}
