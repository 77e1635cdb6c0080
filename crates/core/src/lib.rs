//! Minibar Core - Shared domain types.
//!
//! This crate provides the types used across all minibar components:
//! - `pos` - Cart, catalog, checkout and the command router
//! - `cli` - Terminal front end for the register
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no clocks,
//! no logging. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and products

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
