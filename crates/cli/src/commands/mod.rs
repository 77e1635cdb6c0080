//! Subcommand implementations.

pub mod catalog;
pub mod receipt_log;
pub mod session;

use minibar_pos::{Catalog, CatalogError, PosConfig};

/// Load the configured catalog.
///
/// When `MINIBAR_CURRENCY` is set the catalog must be priced in it; otherwise
/// the register adopts whatever currency the catalog uses.
pub fn load_catalog(config: &PosConfig) -> Result<Catalog, CatalogError> {
    let catalog = Catalog::load_or_builtin(config.catalog_path.as_deref())?;
    match config.currency {
        Some(expected) => catalog.ensure_currency(expected),
        None => Ok(catalog),
    }
}
