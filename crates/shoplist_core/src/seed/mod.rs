//! Built-in product library loaded on first launch.

use crate::model::library::{Category, CategoryId, Product};
use serde::Deserialize;

const LIBRARY_JSON: &str = include_str!("library.json");

#[derive(Debug, Deserialize)]
struct SeedFile {
    categories: Vec<SeedCategory>,
}

#[derive(Debug, Deserialize)]
struct SeedCategory {
    id: CategoryId,
    name: String,
    products: Vec<String>,
}

/// Decoded seed, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedLibrary {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

/// Parses the embedded library. Product ids are generated per call.
pub fn builtin_library() -> Result<SeedLibrary, serde_json::Error> {
    parse_library(LIBRARY_JSON)
}

fn parse_library(source: &str) -> Result<SeedLibrary, serde_json::Error> {
    let file: SeedFile = serde_json::from_str(source)?;
    let mut categories = Vec::with_capacity(file.categories.len());
    let mut products = Vec::new();
    for seed in file.categories {
        products.extend(
            seed.products
                .iter()
                .map(|name| Product::seeded(name.as_str(), seed.id)),
        );
        categories.push(Category::new(seed.id, seed.name));
    }
    Ok(SeedLibrary {
        categories,
        products,
    })
}
