//! Minibar POS - cart, catalog and checkout engine.
//!
//! # Architecture
//!
//! - [`cart`] - Line items, quantities, custom prices and the order total
//! - [`catalog`] - Validated, read-only product catalog (YAML/JSON or built in)
//! - [`checkout`] - Order snapshots and the order-export hook
//! - [`receipt`] - Receipt rendering and stock exporters
//! - [`register`] - Routes UI commands to the cart, catalog and checkout
//! - [`refresh`] - Cancellable delayed catalog refresh
//! - [`config`] - Environment configuration
//!
//! Everything except [`refresh`] is synchronous. A front end builds one
//! [`Register`] at start-up and feeds it commands in the order the user
//! issued them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod receipt;
pub mod refresh;
pub mod register;

pub use cart::{Cart, CartError, LineItem, LineUpdate};
pub use catalog::{Catalog, CatalogError};
pub use checkout::{CheckoutError, ExportError, ExportReceipt, OrderExporter, OrderSnapshot};
pub use config::{ConfigError, PosConfig};
pub use error::{PosError, Result};
pub use receipt::{ChainExporter, JsonLinesExporter, LogExporter};
pub use refresh::{PendingRefresh, RefreshTimer};
pub use register::{Command, Outcome, Register, RegisterError};
