//! Integration tests for the minibar point-of-sale.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p minibar-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart operations end to end against the built-in catalog
//! - `checkout_flow` - Register commands through checkout and the transaction log
//!
//! Shared fixtures live here so every test file builds products the same way.

use chrono::{DateTime, TimeZone, Utc};
use minibar_core::{Category, CurrencyCode, Price, Product};
use minibar_pos::Catalog;
use rust_decimal::Decimal;

/// The inventory shipped with the register.
///
/// # Panics
///
/// Panics if the bundled catalog fails to load.
#[must_use]
pub fn builtin_catalog() -> Catalog {
    Catalog::builtin().unwrap_or_else(|e| panic!("built-in catalog must load: {e}"))
}

/// A product priced in koruna.
///
/// # Panics
///
/// Panics if `name` is blank or `price` is negative.
#[must_use]
pub fn czk_product(name: &str, price: Decimal, category: Category) -> Product {
    Product::new(name, Price::new(price, CurrencyCode::CZK), "", category)
        .unwrap_or_else(|e| panic!("invalid fixture product {name}: {e}"))
}

/// A fixed checkout time so snapshots compare equal across runs.
///
/// # Panics
///
/// Never; the date is valid.
#[must_use]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 19, 21, 30, 0)
        .single()
        .unwrap_or_else(|| panic!("fixed timestamp is unambiguous"))
}
