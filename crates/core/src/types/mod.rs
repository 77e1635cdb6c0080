//! Core types for the minibar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod product;

pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use product::{Category, CategoryFilter, Product, ProductError, ProductName};
