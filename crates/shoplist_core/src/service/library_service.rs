//! Product library use-case service.
//!
//! # Responsibility
//! - Seed the built-in library exactly once.
//! - Manage categories and products for the picker.
//!
//! # Invariants
//! - A category that still has products cannot be deleted.
//! - Built-in products are deactivated, never deleted.

use crate::model::library::{Category, CategoryId, Product, ProductId};
use crate::model::ValidationError;
use crate::repo::library_repo::{LibraryRepository, ProductQuery};
use crate::repo::{RepoError, RepoResult};
use crate::seed::builtin_library;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum LibraryServiceError {
    Validation(ValidationError),
    CategoryNotFound(CategoryId),
    ProductNotFound(ProductId),
    CategoryInUse { id: CategoryId, products: u32 },
    BuiltInProduct(ProductId),
    /// Embedded seed data failed to decode.
    Seed(serde_json::Error),
    Repo(RepoError),
}

impl Display for LibraryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::ProductNotFound(id) => write!(f, "product not found: {id}"),
            Self::CategoryInUse { id, products } => {
                write!(f, "category {id} still has {products} product(s)")
            }
            Self::BuiltInProduct(id) => {
                write!(f, "built-in product {id} cannot be deleted; deactivate it instead")
            }
            Self::Seed(err) => write!(f, "invalid built-in library: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LibraryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Seed(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LibraryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::CategoryNotFound(id) => Self::CategoryNotFound(id),
            RepoError::ProductNotFound(id) => Self::ProductNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for LibraryServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type LibraryServiceResult<T> = Result<T, LibraryServiceError>;

/// Result of [`LibraryService::load_initial_data_if_needed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { categories: usize, products: usize },
    AlreadyLoaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub notes: Option<String>,
    pub category_id: CategoryId,
    pub is_favorite: bool,
}

/// Category header with its visible products, for grouped library views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: Category,
    pub products: Vec<Product>,
}

pub struct LibraryService<R: LibraryRepository> {
    repo: R,
}

impl<R: LibraryRepository> LibraryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts the built-in library unless any library data already exists.
    pub fn load_initial_data_if_needed(&self) -> LibraryServiceResult<SeedOutcome> {
        if self.repo.has_library_data()? {
            return Ok(SeedOutcome::AlreadyLoaded);
        }

        let library = builtin_library().map_err(LibraryServiceError::Seed)?;
        self.repo
            .seed_library(&library.categories, &library.products)?;
        info!(
            "event=library_seed module=library_service status=ok categories={} products={}",
            library.categories.len(),
            library.products.len()
        );
        Ok(SeedOutcome::Seeded {
            categories: library.categories.len(),
            products: library.products.len(),
        })
    }

    pub fn list_categories(&self) -> RepoResult<Vec<Category>> {
        self.repo.list_categories()
    }

    pub fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        self.repo.get_category(id)
    }

    pub fn create_category(&self, name: &str) -> LibraryServiceResult<Category> {
        let mut category = Category::new(self.repo.next_category_id()?, name);
        category.normalize()?;
        self.repo.create_category(&category)?;
        Ok(category)
    }

    pub fn rename_category(&self, id: CategoryId, name: &str) -> LibraryServiceResult<Category> {
        self.edit_category(id, |category| category.name = name.to_string())
    }

    pub fn set_category_favorite(
        &self,
        id: CategoryId,
        favorite: bool,
    ) -> LibraryServiceResult<Category> {
        self.edit_category(id, |category| category.is_favorite = favorite)
    }

    pub fn set_category_expanded(
        &self,
        id: CategoryId,
        expanded: bool,
    ) -> LibraryServiceResult<Category> {
        self.edit_category(id, |category| category.is_expanded = expanded)
    }

    pub fn delete_category(&self, id: CategoryId) -> LibraryServiceResult<()> {
        let products = self.repo.count_products_in_category(id)?;
        if products > 0 {
            return Err(LibraryServiceError::CategoryInUse { id, products });
        }
        self.repo.delete_category(id)?;
        Ok(())
    }

    pub fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.repo.get_product(id)
    }

    pub fn list_products(&self, query: &ProductQuery) -> RepoResult<Vec<Product>> {
        self.repo.list_products(query)
    }

    /// Groups matching products under their categories, skipping empty groups.
    pub fn products_by_category(&self, query: &ProductQuery) -> RepoResult<Vec<CategoryGroup>> {
        let mut products = self.repo.list_products(query)?;
        let mut groups = Vec::new();
        for category in self.repo.list_categories()? {
            let (members, rest): (Vec<_>, Vec<_>) = products
                .into_iter()
                .partition(|product| product.category_id == category.id);
            products = rest;
            if !members.is_empty() {
                groups.push(CategoryGroup {
                    category,
                    products: members,
                });
            }
        }
        Ok(groups)
    }

    pub fn create_product(&self, input: NewProduct) -> LibraryServiceResult<Product> {
        let mut product = Product::custom(input.name, input.category_id);
        product.notes = input.notes;
        product.is_favorite = input.is_favorite;
        product.normalize()?;
        self.repo.create_product(&product)?;
        Ok(product)
    }

    /// Replaces editable product fields. `is_custom` is kept from storage.
    pub fn update_product(&self, mut product: Product) -> LibraryServiceResult<Product> {
        let stored = self.require_product(product.id)?;
        product.is_custom = stored.is_custom;
        product.normalize()?;
        self.repo.update_product(&product)?;
        Ok(product)
    }

    pub fn set_product_active(&self, id: ProductId, active: bool) -> LibraryServiceResult<Product> {
        let mut product = self.require_product(id)?;
        product.is_active = active;
        self.update_product(product)
    }

    pub fn set_product_favorite(
        &self,
        id: ProductId,
        favorite: bool,
    ) -> LibraryServiceResult<Product> {
        let mut product = self.require_product(id)?;
        product.is_favorite = favorite;
        self.update_product(product)
    }

    pub fn delete_product(&self, id: ProductId) -> LibraryServiceResult<()> {
        let product = self.require_product(id)?;
        if !product.is_custom {
            return Err(LibraryServiceError::BuiltInProduct(id));
        }
        self.repo.delete_product(id)?;
        Ok(())
    }

    fn edit_category(
        &self,
        id: CategoryId,
        edit: impl FnOnce(&mut Category),
    ) -> LibraryServiceResult<Category> {
        let mut category = self
            .repo
            .get_category(id)?
            .ok_or(LibraryServiceError::CategoryNotFound(id))?;
        edit(&mut category);
        category.normalize()?;
        self.repo.update_category(&category)?;
        Ok(category)
    }

    fn require_product(&self, id: ProductId) -> LibraryServiceResult<Product> {
        self.repo
            .get_product(id)?
            .ok_or(LibraryServiceError::ProductNotFound(id))
    }
}
