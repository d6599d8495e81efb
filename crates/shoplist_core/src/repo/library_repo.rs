//! Product library repository: categories and products.
//!
//! # Invariants
//! - Products always reference an existing category (FK `RESTRICT`).
//! - Seeding writes every category and product in one transaction.
//! - Product listing is sorted by `name COLLATE NOCASE, id`.

use crate::model::library::{Category, CategoryId, Product, ProductId, MAX_SEEDED_CATEGORY_ID};
use crate::model::ValidationError;
use crate::repo::{
    bool_to_int, ensure_connection_ready, fold_case, int_to_bool, parse_uuid, RepoError,
    RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT id, name, is_favorite, is_expanded FROM categories";

const PRODUCT_SELECT_SQL: &str = "SELECT
    id,
    name,
    notes,
    category_id,
    is_active,
    is_favorite,
    is_custom
FROM products";

/// Filters for the product picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category_id: Option<CategoryId>,
    /// Case-insensitive (Unicode) substring of the product name.
    pub text: Option<String>,
    pub favorites_only: bool,
    pub include_inactive: bool,
}

pub trait LibraryRepository {
    /// True once the built-in products are present. Custom data alone does
    /// not count, so creating a category before the first seed is harmless.
    fn has_library_data(&self) -> RepoResult<bool>;
    /// Inserts a full library atomically.
    fn seed_library(&self, categories: &[Category], products: &[Product]) -> RepoResult<()>;

    /// Next custom category id, always above the seeded id range.
    fn next_category_id(&self) -> RepoResult<CategoryId>;
    fn create_category(&self, category: &Category) -> RepoResult<CategoryId>;
    fn update_category(&self, category: &Category) -> RepoResult<()>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    fn delete_category(&self, id: CategoryId) -> RepoResult<()>;
    fn count_products_in_category(&self, id: CategoryId) -> RepoResult<u32>;

    fn create_product(&self, product: &Product) -> RepoResult<ProductId>;
    fn update_product(&self, product: &Product) -> RepoResult<()>;
    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>>;
    fn list_products(&self, query: &ProductQuery) -> RepoResult<Vec<Product>>;
    fn delete_product(&self, id: ProductId) -> RepoResult<()>;
}

pub struct SqliteLibraryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLibraryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["categories", "products"])?;
        Ok(Self { conn })
    }

    fn category_exists(&self, id: CategoryId) -> RepoResult<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

impl LibraryRepository for SqliteLibraryRepository<'_> {
    fn has_library_data(&self) -> RepoResult<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM products WHERE is_custom = 0);",
            [],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn seed_library(&self, categories: &[Category], products: &[Product]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for category in categories {
            insert_category(&tx, category)?;
        }
        for product in products {
            insert_product(&tx, product)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn next_category_id(&self) -> RepoResult<CategoryId> {
        let next = self.conn.query_row(
            "SELECT MAX(COALESCE(MAX(id), 0), ?1) + 1 FROM categories;",
            [MAX_SEEDED_CATEGORY_ID],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    fn create_category(&self, category: &Category) -> RepoResult<CategoryId> {
        insert_category(self.conn, category)?;
        Ok(category.id)
    }

    fn update_category(&self, category: &Category) -> RepoResult<()> {
        if category.name.trim().is_empty() {
            return Err(ValidationError::BlankName { entity: "category" }.into());
        }
        let changed = self.conn.execute(
            "UPDATE categories
             SET name = ?1, is_favorite = ?2, is_expanded = ?3
             WHERE id = ?4;",
            params![
                category.name.as_str(),
                bool_to_int(category.is_favorite),
                bool_to_int(category.is_expanded),
                category.id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::CategoryNotFound(category.id));
        }
        Ok(())
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_category_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} ORDER BY is_favorite DESC, name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::CategoryNotFound(id));
        }
        Ok(())
    }

    fn count_products_in_category(&self, id: CategoryId) -> RepoResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE category_id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        u32::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("product count `{count}` overflows")))
    }

    fn create_product(&self, product: &Product) -> RepoResult<ProductId> {
        if !self.category_exists(product.category_id)? {
            return Err(RepoError::CategoryNotFound(product.category_id));
        }
        insert_product(self.conn, product)?;
        Ok(product.id)
    }

    fn update_product(&self, product: &Product) -> RepoResult<()> {
        if product.name.trim().is_empty() {
            return Err(ValidationError::BlankName { entity: "product" }.into());
        }
        if !self.category_exists(product.category_id)? {
            return Err(RepoError::CategoryNotFound(product.category_id));
        }
        let changed = self.conn.execute(
            "UPDATE products
             SET
                name = ?1,
                notes = ?2,
                category_id = ?3,
                is_active = ?4,
                is_favorite = ?5,
                is_custom = ?6
             WHERE id = ?7;",
            params![
                product.name.as_str(),
                product.notes.as_deref(),
                product.category_id,
                bool_to_int(product.is_active),
                bool_to_int(product.is_favorite),
                bool_to_int(product.is_custom),
                product.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::ProductNotFound(product.id));
        }
        Ok(())
    }

    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_product_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_products(&self, query: &ProductQuery) -> RepoResult<Vec<Product>> {
        let mut sql = format!("{PRODUCT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_inactive {
            sql.push_str(" AND is_active = 1");
        }
        if query.favorites_only {
            sql.push_str(" AND is_favorite = 1");
        }
        if let Some(category_id) = query.category_id {
            sql.push_str(" AND category_id = ?");
            bind_values.push(Value::Integer(category_id));
        }
        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, id ASC");

        // Text matching runs after SQL: LIKE only folds ASCII case.
        let needle = query
            .text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(fold_case);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            let product = parse_product_row(row)?;
            let matches = needle
                .as_deref()
                .map_or(true, |needle| fold_case(&product.name).contains(needle));
            if matches {
                products.push(product);
            }
        }
        Ok(products)
    }

    fn delete_product(&self, id: ProductId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ProductNotFound(id));
        }
        Ok(())
    }
}

fn insert_category(conn: &Connection, category: &Category) -> RepoResult<()> {
    if category.name.trim().is_empty() {
        return Err(ValidationError::BlankName { entity: "category" }.into());
    }
    conn.execute(
        "INSERT INTO categories (id, name, is_favorite, is_expanded) VALUES (?1, ?2, ?3, ?4);",
        params![
            category.id,
            category.name.as_str(),
            bool_to_int(category.is_favorite),
            bool_to_int(category.is_expanded),
        ],
    )?;
    Ok(())
}

fn insert_product(conn: &Connection, product: &Product) -> RepoResult<()> {
    if product.name.trim().is_empty() {
        return Err(ValidationError::BlankName { entity: "product" }.into());
    }
    conn.execute(
        "INSERT INTO products (
            id,
            name,
            notes,
            category_id,
            is_active,
            is_favorite,
            is_custom
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            product.id.to_string(),
            product.name.as_str(),
            product.notes.as_deref(),
            product.category_id,
            bool_to_int(product.is_active),
            bool_to_int(product.is_favorite),
            bool_to_int(product.is_custom),
        ],
    )?;
    Ok(())
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        is_favorite: int_to_bool(row.get("is_favorite")?, "categories.is_favorite")?,
        is_expanded: int_to_bool(row.get("is_expanded")?, "categories.is_expanded")?,
    })
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let id_text: String = row.get("id")?;
    Ok(Product {
        id: parse_uuid(&id_text, "products.id")?,
        name: row.get("name")?,
        notes: row.get("notes")?,
        category_id: row.get("category_id")?,
        is_active: int_to_bool(row.get("is_active")?, "products.is_active")?,
        is_favorite: int_to_bool(row.get("is_favorite")?, "products.is_favorite")?,
        is_custom: int_to_bool(row.get("is_custom")?, "products.is_custom")?,
    })
}
