//! List/item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist lists and the items they own as one aggregate.
//! - Provide sorted/filtered reads for list and item views.
//!
//! # Invariants
//! - `lists.is_completed` is only written by `refresh_list_completion`.
//! - Deleting a list removes its items through the FK cascade.
//! - Sorting is deterministic: every ordering ends with `id ASC`.

use crate::model::item::{Item, ItemId, Priority};
use crate::model::list::{ListId, ShoppingList};
use crate::repo::{
    bool_to_int, ensure_connection_ready, fold_case, from_epoch_ms, from_opt_epoch_ms,
    int_to_bool, parse_uuid, to_epoch_ms, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const LIST_SELECT_SQL: &str = "SELECT
    id,
    name,
    notes,
    creation_date,
    end_date,
    is_pinned,
    is_selected,
    is_expanded,
    is_completed
FROM lists";

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    list_id,
    name,
    notes,
    quantity,
    priority,
    is_favorite,
    is_completed,
    creation_date,
    end_date
FROM items";

/// Ordering applied after pinned lists are moved to the top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListSort {
    /// Newest first.
    #[default]
    CreationDate,
    Name,
    /// Soonest due first; undated lists last.
    EndDate,
}

impl ListSort {
    fn order_by(self) -> &'static str {
        match self {
            Self::CreationDate => " ORDER BY is_pinned DESC, creation_date DESC, id ASC",
            Self::Name => " ORDER BY is_pinned DESC, name COLLATE NOCASE ASC, id ASC",
            Self::EndDate => {
                " ORDER BY is_pinned DESC, end_date IS NULL ASC, end_date ASC, id ASC"
            }
        }
    }
}

/// Ordering applied after open items are placed before completed ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemSort {
    /// High priority first, then by name.
    #[default]
    Priority,
    Name,
    /// Newest first.
    CreationDate,
}

impl ItemSort {
    fn order_by(self) -> &'static str {
        match self {
            Self::Priority => {
                " ORDER BY is_completed ASC, priority DESC, name COLLATE NOCASE ASC, id ASC"
            }
            Self::Name => " ORDER BY is_completed ASC, name COLLATE NOCASE ASC, id ASC",
            Self::CreationDate => " ORDER BY is_completed ASC, creation_date DESC, id ASC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub include_completed: bool,
    pub sort: ListSort,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            include_completed: true,
            sort: ListSort::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    pub list_id: ListId,
    pub include_completed: bool,
    pub favorites_only: bool,
    pub sort: ItemSort,
}

impl ItemQuery {
    /// All items of one list in default order.
    pub fn for_list(list_id: ListId) -> Self {
        Self {
            list_id,
            include_completed: true,
            favorites_only: false,
            sort: ItemSort::default(),
        }
    }
}

/// Item totals for one list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemCounts {
    pub total: u32,
    pub completed: u32,
}

pub trait ListRepository {
    fn create_list(&self, list: &ShoppingList) -> RepoResult<ListId>;
    /// Writes every column except the derived `is_completed`.
    fn update_list(&self, list: &ShoppingList) -> RepoResult<()>;
    fn get_list(&self, id: ListId) -> RepoResult<Option<ShoppingList>>;
    fn list_lists(&self, query: &ListQuery) -> RepoResult<Vec<ShoppingList>>;
    /// Case-insensitive (Unicode) exact name match, newest first.
    fn find_lists_by_name(&self, name: &str) -> RepoResult<Vec<ShoppingList>>;
    fn delete_list(&self, id: ListId) -> RepoResult<()>;
    fn set_list_selected(&self, id: ListId, selected: bool) -> RepoResult<()>;
    /// Returns the number of lists removed.
    fn delete_selected_lists(&self) -> RepoResult<usize>;

    fn create_item(&self, item: &Item) -> RepoResult<ItemId>;
    fn update_item(&self, item: &Item) -> RepoResult<()>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    fn list_items(&self, query: &ItemQuery) -> RepoResult<Vec<Item>>;
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
    /// Returns the number of items whose flag changed.
    fn set_items_completed(&self, list_id: ListId, completed: bool) -> RepoResult<usize>;
    fn delete_completed_items(&self, list_id: ListId) -> RepoResult<usize>;
    fn count_items(&self, list_id: ListId) -> RepoResult<ItemCounts>;
    /// Recomputes and stores `is_completed`; returns the new value.
    fn refresh_list_completion(&self, list_id: ListId) -> RepoResult<bool>;
}

pub struct SqliteListRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteListRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["lists", "items"])?;
        Ok(Self { conn })
    }

    fn list_exists(&self, id: ListId) -> RepoResult<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM lists WHERE id = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

impl ListRepository for SqliteListRepository<'_> {
    fn create_list(&self, list: &ShoppingList) -> RepoResult<ListId> {
        list.validate()?;

        self.conn.execute(
            "INSERT INTO lists (
                id,
                name,
                notes,
                creation_date,
                end_date,
                is_pinned,
                is_selected,
                is_expanded,
                is_completed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0);",
            params![
                list.id.to_string(),
                list.name.as_str(),
                list.notes.as_deref(),
                to_epoch_ms(list.creation_date),
                list.end_date.map(to_epoch_ms),
                bool_to_int(list.is_pinned),
                bool_to_int(list.is_selected),
                bool_to_int(list.is_expanded),
            ],
        )?;

        Ok(list.id)
    }

    fn update_list(&self, list: &ShoppingList) -> RepoResult<()> {
        list.validate()?;

        let changed = self.conn.execute(
            "UPDATE lists
             SET
                name = ?1,
                notes = ?2,
                creation_date = ?3,
                end_date = ?4,
                is_pinned = ?5,
                is_selected = ?6,
                is_expanded = ?7
             WHERE id = ?8;",
            params![
                list.name.as_str(),
                list.notes.as_deref(),
                to_epoch_ms(list.creation_date),
                list.end_date.map(to_epoch_ms),
                bool_to_int(list.is_pinned),
                bool_to_int(list.is_selected),
                bool_to_int(list.is_expanded),
                list.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ListNotFound(list.id));
        }
        Ok(())
    }

    fn get_list(&self, id: ListId) -> RepoResult<Option<ShoppingList>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LIST_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_list_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_lists(&self, query: &ListQuery) -> RepoResult<Vec<ShoppingList>> {
        let mut sql = format!("{LIST_SELECT_SQL} WHERE 1 = 1");
        if !query.include_completed {
            sql.push_str(" AND is_completed = 0");
        }
        sql.push_str(query.sort.order_by());

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut lists = Vec::new();
        while let Some(row) = rows.next()? {
            lists.push(parse_list_row(row)?);
        }
        Ok(lists)
    }

    fn find_lists_by_name(&self, name: &str) -> RepoResult<Vec<ShoppingList>> {
        // NOCASE only folds ASCII, so the comparison happens here.
        let wanted = fold_case(name.trim());
        let mut stmt = self.conn.prepare(&format!(
            "{LIST_SELECT_SQL} ORDER BY creation_date DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut lists = Vec::new();
        while let Some(row) = rows.next()? {
            let list = parse_list_row(row)?;
            if fold_case(&list.name) == wanted {
                lists.push(list);
            }
        }
        Ok(lists)
    }

    fn delete_list(&self, id: ListId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM lists WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ListNotFound(id));
        }
        Ok(())
    }

    fn set_list_selected(&self, id: ListId, selected: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE lists SET is_selected = ?1 WHERE id = ?2;",
            params![bool_to_int(selected), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::ListNotFound(id));
        }
        Ok(())
    }

    fn delete_selected_lists(&self) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM lists WHERE is_selected = 1;", [])?;
        Ok(removed)
    }

    fn create_item(&self, item: &Item) -> RepoResult<ItemId> {
        item.validate()?;
        if !self.list_exists(item.list_id)? {
            return Err(RepoError::ListNotFound(item.list_id));
        }

        self.conn.execute(
            "INSERT INTO items (
                id,
                list_id,
                name,
                notes,
                quantity,
                priority,
                is_favorite,
                is_completed,
                creation_date,
                end_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                item.id.to_string(),
                item.list_id.to_string(),
                item.name.as_str(),
                item.notes.as_deref(),
                i64::from(item.quantity),
                item.priority.as_i64(),
                bool_to_int(item.is_favorite),
                bool_to_int(item.is_completed),
                to_epoch_ms(item.creation_date),
                item.end_date.map(to_epoch_ms),
            ],
        )?;

        Ok(item.id)
    }

    fn update_item(&self, item: &Item) -> RepoResult<()> {
        item.validate()?;
        if !self.list_exists(item.list_id)? {
            return Err(RepoError::ListNotFound(item.list_id));
        }

        let changed = self.conn.execute(
            "UPDATE items
             SET
                list_id = ?1,
                name = ?2,
                notes = ?3,
                quantity = ?4,
                priority = ?5,
                is_favorite = ?6,
                is_completed = ?7,
                creation_date = ?8,
                end_date = ?9
             WHERE id = ?10;",
            params![
                item.list_id.to_string(),
                item.name.as_str(),
                item.notes.as_deref(),
                i64::from(item.quantity),
                item.priority.as_i64(),
                bool_to_int(item.is_favorite),
                bool_to_int(item.is_completed),
                to_epoch_ms(item.creation_date),
                item.end_date.map(to_epoch_ms),
                item.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ItemNotFound(item.id));
        }
        Ok(())
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_item_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_items(&self, query: &ItemQuery) -> RepoResult<Vec<Item>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE list_id = ?");
        let bind_values = vec![Value::Text(query.list_id.to_string())];

        if !query.include_completed {
            sql.push_str(" AND is_completed = 0");
        }
        if query.favorites_only {
            sql.push_str(" AND is_favorite = 1");
        }
        sql.push_str(query.sort.order_by());

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ItemNotFound(id));
        }
        Ok(())
    }

    fn set_items_completed(&self, list_id: ListId, completed: bool) -> RepoResult<usize> {
        if !self.list_exists(list_id)? {
            return Err(RepoError::ListNotFound(list_id));
        }
        let changed = self.conn.execute(
            "UPDATE items SET is_completed = ?1 WHERE list_id = ?2 AND is_completed != ?1;",
            params![bool_to_int(completed), list_id.to_string()],
        )?;
        Ok(changed)
    }

    fn delete_completed_items(&self, list_id: ListId) -> RepoResult<usize> {
        if !self.list_exists(list_id)? {
            return Err(RepoError::ListNotFound(list_id));
        }
        let removed = self.conn.execute(
            "DELETE FROM items WHERE list_id = ?1 AND is_completed = 1;",
            [list_id.to_string()],
        )?;
        Ok(removed)
    }

    fn count_items(&self, list_id: ListId) -> RepoResult<ItemCounts> {
        let (total, completed): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_completed), 0) FROM items WHERE list_id = ?1;",
            [list_id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(ItemCounts {
            total: u32::try_from(total)
                .map_err(|_| RepoError::InvalidData(format!("item count `{total}` overflows")))?,
            completed: u32::try_from(completed).map_err(|_| {
                RepoError::InvalidData(format!("completed count `{completed}` overflows"))
            })?,
        })
    }

    fn refresh_list_completion(&self, list_id: ListId) -> RepoResult<bool> {
        let id_text = list_id.to_string();
        let changed = self.conn.execute(
            "UPDATE lists
             SET is_completed = (
                EXISTS(SELECT 1 FROM items WHERE list_id = ?1)
                AND NOT EXISTS(SELECT 1 FROM items WHERE list_id = ?1 AND is_completed = 0)
             )
             WHERE id = ?1;",
            [id_text.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::ListNotFound(list_id));
        }

        let completed: i64 = self.conn.query_row(
            "SELECT is_completed FROM lists WHERE id = ?1;",
            [id_text.as_str()],
            |row| row.get(0),
        )?;
        int_to_bool(completed, "lists.is_completed")
    }
}

fn parse_list_row(row: &Row<'_>) -> RepoResult<ShoppingList> {
    let id_text: String = row.get("id")?;
    let list = ShoppingList {
        id: parse_uuid(&id_text, "lists.id")?,
        name: row.get("name")?,
        notes: row.get("notes")?,
        creation_date: from_epoch_ms(row.get("creation_date")?, "lists.creation_date")?,
        end_date: from_opt_epoch_ms(row.get("end_date")?, "lists.end_date")?,
        is_pinned: int_to_bool(row.get("is_pinned")?, "lists.is_pinned")?,
        is_selected: int_to_bool(row.get("is_selected")?, "lists.is_selected")?,
        is_expanded: int_to_bool(row.get("is_expanded")?, "lists.is_expanded")?,
        is_completed: int_to_bool(row.get("is_completed")?, "lists.is_completed")?,
    };
    list.validate()?;
    Ok(list)
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id_text: String = row.get("id")?;
    let list_id_text: String = row.get("list_id")?;

    let raw_priority: i64 = row.get("priority")?;
    let priority = Priority::from_i64(raw_priority).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid priority `{raw_priority}` in items.priority"))
    })?;

    let raw_quantity: i64 = row.get("quantity")?;
    let quantity = u32::try_from(raw_quantity).map_err(|_| {
        RepoError::InvalidData(format!("invalid quantity `{raw_quantity}` in items.quantity"))
    })?;

    let item = Item {
        id: parse_uuid(&id_text, "items.id")?,
        list_id: parse_uuid(&list_id_text, "items.list_id")?,
        name: row.get("name")?,
        notes: row.get("notes")?,
        quantity,
        priority,
        is_favorite: int_to_bool(row.get("is_favorite")?, "items.is_favorite")?,
        is_completed: int_to_bool(row.get("is_completed")?, "items.is_completed")?,
        creation_date: from_epoch_ms(row.get("creation_date")?, "items.creation_date")?,
        end_date: from_opt_epoch_ms(row.get("end_date")?, "items.end_date")?,
    };
    item.validate()?;
    Ok(item)
}
