//! Catalog product records.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price::Price;

/// Errors that can occur when constructing a [`Product`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The product name is empty or whitespace.
    #[error("product name cannot be empty")]
    EmptyName,
    /// The catalog price is below zero.
    #[error("price of '{name}' cannot be negative (got {price})")]
    NegativePrice {
        /// Name of the offending product.
        name: String,
        /// The rejected amount.
        price: Decimal,
    },
    /// The category label is not one of the known tabs.
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}

/// A product name, which is also the product's identity in the catalog.
///
/// Leading and trailing whitespace is trimmed; the remainder must be non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ProductName(String);

impl ProductName {
    /// Parse a `ProductName` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::EmptyName`] if the input is empty after trimming.
    pub fn parse(s: &str) -> Result<Self, ProductError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ProductError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive equality, used for lookups typed by staff.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

impl TryFrom<String> for ProductName {
    type Error = ProductError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductName> for String {
    fn from(name: ProductName) -> Self {
        name.0
    }
}

impl fmt::Display for ProductName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProductName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Product category, shown as a tab in the catalog view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    NonAlcoholic,
    Alcoholic,
    Snacks,
    Other,
}

impl Category {
    /// All categories in tab order.
    pub const ALL: [Self; 4] = [Self::NonAlcoholic, Self::Alcoholic, Self::Snacks, Self::Other];

    /// The wire label (`non-alcoholic`, `alcoholic`, ...).
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NonAlcoholic => "non-alcoholic",
            Self::Alcoholic => "alcoholic",
            Self::Snacks => "snacks",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.label() == wanted)
            .ok_or_else(|| ProductError::UnknownCategory(s.trim().to_owned()))
    }
}

/// Which products a catalog tab shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Number of tabs: "all" followed by every category.
    pub const TAB_COUNT: usize = Category::ALL.len() + 1;

    /// The filter behind the 1-based tab position, if there is one.
    #[must_use]
    pub fn from_tab(index: usize) -> Option<Self> {
        match index {
            1 => Some(Self::All),
            n => Category::ALL.get(n.checked_sub(2)?).copied().map(Self::Only),
        }
    }

    /// Returns true if a product in `category` is visible under this filter.
    #[must_use]
    pub fn accepts(&self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(category) => category.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// A purchasable catalog product.
///
/// Fields are private so every `Product` has passed validation: a non-empty
/// name and a non-negative price.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Product {
    name: ProductName,
    price: Price,
    image: String,
    category: Category,
}

impl Product {
    /// Create a validated product.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::EmptyName`] for a blank name and
    /// [`ProductError::NegativePrice`] for a price below zero.
    pub fn new(
        name: &str,
        price: Price,
        image: impl Into<String>,
        category: Category,
    ) -> Result<Self, ProductError> {
        let name = ProductName::parse(name)?;
        if price.is_negative() {
            return Err(ProductError::NegativePrice {
                name: name.into(),
                price: price.amount,
            });
        }
        Ok(Self {
            name,
            price,
            image: image.into(),
            category,
        })
    }

    /// The product name (its identity).
    #[must_use]
    pub const fn name(&self) -> &ProductName {
        &self.name
    }

    /// The catalog price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Image reference, relative to the front end's asset root.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// The category tab this product belongs to.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }
}
