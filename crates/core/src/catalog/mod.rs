//! The product catalog.
//!
//! The catalog is a fixed, ordered list of products loaded once at startup,
//! either from the bundled `catalog.json` or from a JSON file of the same
//! shape. It is never mutated afterwards; callers share it behind an `Arc`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Category, Price, ProductId, Size};

/// The catalog shipped with the crate.
const BUNDLED_CATALOG: &str = include_str!("catalog.json");

/// Errors that can occur while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),
}

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Category,
    pub price: Price,
    /// Image URL.
    pub image: String,
    pub description: String,
}

impl Product {
    /// Whether this product is sold by size.
    #[must_use]
    pub const fn is_sized(&self) -> bool {
        self.category.is_sized()
    }

    /// Resolve the size a cart line for this product should carry.
    ///
    /// Sized products fall back to [`Size::DEFAULT`] when none was picked;
    /// unsized products never carry a size.
    #[must_use]
    pub const fn effective_size(&self, requested: Option<Size>) -> Option<Size> {
        if !self.is_sized() {
            return None;
        }
        match requested {
            Some(size) => Some(size),
            None => Some(Size::DEFAULT),
        }
    }
}

/// Category selection for the product grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every product.
    #[default]
    All,
    /// Products in one category.
    Only(Category),
    /// A slug that names no category; matches nothing.
    Unknown(String),
}

impl CategoryFilter {
    /// Parse a filter slug. `"all"` and the empty string select everything.
    #[must_use]
    pub fn parse(slug: &str) -> Self {
        let slug = slug.trim();
        if slug.is_empty() || slug.eq_ignore_ascii_case("all") {
            return Self::All;
        }
        slug.parse::<Category>()
            .map_or_else(|_| Self::Unknown(slug.to_string()), Self::Only)
    }

    /// The slug this filter was built from.
    #[must_use]
    pub fn slug(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Only(category) => category.slug(),
            Self::Unknown(slug) => slug,
        }
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => product.category == *category,
            Self::Unknown(_) => false,
        }
    }
}

/// An immutable, ordered product catalog with id lookup.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    by_id: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog from products, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two products share an id.
    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if by_id.insert(product.id, position).is_some() {
                return Err(CatalogError::DuplicateId(product.id));
            }
        }
        Ok(Self { products, by_id })
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or ids repeat.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::from_products(products)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled data is corrupt.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Load from `path` when given, otherwise use the bundled catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen source cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => {
                let catalog = Self::from_path(path)?;
                tracing::info!(path = %path.display(), products = catalog.len(), "Loaded catalog");
                Ok(catalog)
            }
            None => Self::bundled(),
        }
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.by_id
            .get(&id)
            .and_then(|&position| self.products.get(position))
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products matching a category filter, in catalog order.
    #[must_use]
    pub fn filter(&self, filter: &CategoryFilter) -> Vec<&Product> {
        self.products.iter().filter(|p| filter.matches(p)).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
