//! Crate-level error type.
//!
//! Each module has its own error enum; `PosError` gathers them for callers
//! that drive the whole register and only need to report failures.

use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::checkout::{CheckoutError, ExportError};
use crate::config::ConfigError;
use crate::register::RegisterError;

/// Any error the minibar engine can return.
#[derive(Debug, Error)]
pub enum PosError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The catalog could not be loaded or failed validation.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A cart mutation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// An order exporter failed outside checkout.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// A register command was rejected.
    #[error("{0}")]
    Register(#[from] RegisterError),

    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for `PosError`.
pub type Result<T> = std::result::Result<T, PosError>;
