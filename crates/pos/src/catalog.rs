//! Product catalog loading and queries.
//!
//! The catalog is read-only once loaded. Every record is validated through
//! [`Product::new`]; names must be unique (a product's name is its identity)
//! and all products must be priced in one currency so cart totals never mix
//! currencies.

use std::collections::HashSet;
use std::path::Path;

use minibar_core::{Category, CategoryFilter, CurrencyCode, Price, Product, ProductError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

/// Inventory shipped with the binary.
const BUILTIN_CATALOG: &str = include_str!("../catalog/minibar.yaml");

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported catalog format '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("Invalid product #{index}: {source}")]
    InvalidProduct {
        index: usize,
        #[source]
        source: ProductError,
    },

    #[error("Duplicate product name '{name}' (#{index})")]
    DuplicateName { index: usize, name: String },

    #[error("Product #{index} is priced in {found}, catalog uses {expected}")]
    MixedCurrency {
        index: usize,
        expected: CurrencyCode,
        found: CurrencyCode,
    },

    #[error("Catalog is priced in {found}, register expects {expected}")]
    WrongCurrency {
        expected: CurrencyCode,
        found: CurrencyCode,
    },

    #[error("Catalog contains no products")]
    Empty,
}

/// A product as written in a catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub image: String,
    pub category: Category,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<ProductRecord>,
}

/// The set of products the register can sell.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    currency: CurrencyCode,
}

impl Catalog {
    /// Build a catalog from already-validated products.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Empty`], [`CatalogError::DuplicateName`] or
    /// [`CatalogError::MixedCurrency`].
    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let currency = products
            .first()
            .map(|product| product.price().currency_code)
            .ok_or(CatalogError::Empty)?;

        let mut seen = HashSet::new();
        for (index, product) in products.iter().enumerate() {
            if !seen.insert(product.name().as_str().to_lowercase()) {
                return Err(CatalogError::DuplicateName {
                    index,
                    name: product.name().to_string(),
                });
            }
            let found = product.price().currency_code;
            if found != currency {
                return Err(CatalogError::MixedCurrency {
                    index,
                    expected: currency,
                    found,
                });
            }
        }

        Ok(Self { products, currency })
    }

    /// Validate raw records and build a catalog from them.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidProduct`] naming the first bad record,
    /// or any error from [`Catalog::from_products`].
    pub fn from_records(records: Vec<ProductRecord>) -> Result<Self, CatalogError> {
        let products = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                Product::new(
                    &record.name,
                    Price::new(record.price, record.currency),
                    record.image,
                    record.category,
                )
                .map_err(|source| CatalogError::InvalidProduct { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_products(products)
    }

    /// Parse a YAML catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(content)?;
        Self::from_records(file.products)
    }

    /// Parse a JSON catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(content)?;
        Self::from_records(file.products)
    }

    /// Load a catalog file, choosing the parser by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown extension,
    /// or fails to parse or validate.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let content = std::fs::read_to_string(path)?;
        let catalog = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            _ => return Err(CatalogError::UnsupportedFormat(extension)),
        };

        info!(products = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// The inventory embedded in the binary.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded document is broken.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Load from `path` if given, otherwise use the built-in inventory.
    ///
    /// # Errors
    ///
    /// See [`Catalog::load`] and [`Catalog::builtin`].
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, CatalogError> {
        path.map_or_else(Self::builtin, Self::load)
    }

    /// Check that the catalog is priced in the register's currency.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::WrongCurrency`] on a mismatch.
    pub fn ensure_currency(self, expected: CurrencyCode) -> Result<Self, CatalogError> {
        if self.currency != expected {
            return Err(CatalogError::WrongCurrency {
                expected,
                found: self.currency,
            });
        }
        Ok(self)
    }

    /// Look up a product by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|product| product.name().matches(name))
    }

    /// Products shown under a category tab, in catalog order.
    pub fn filter(&self, filter: CategoryFilter) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |product| filter.accepts(product.category()))
    }

    /// Products under `filter` whose name contains `query`, ignoring case.
    ///
    /// A blank query matches everything under the filter.
    #[must_use]
    pub fn search(&self, query: &str, filter: CategoryFilter) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        self.filter(filter)
            .filter(|product| {
                needle.is_empty() || product.name().as_str().to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Categories that have at least one product, in tab order.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|category| {
                self.products
                    .iter()
                    .any(|product| product.category() == *category)
            })
            .collect()
    }

    /// All products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// The single currency every product is priced in.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true if the catalog has no products. Never the case for a
    /// catalog built through the loaders, which reject empty input.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
