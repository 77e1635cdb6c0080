//! `minibar catalog` - print the product list.

use std::io::Write;

use minibar_core::{CategoryFilter, Product};
use minibar_pos::PosConfig;
use tracing::info;

use super::load_catalog;

/// Print catalog products under `filter`, optionally narrowed by a name search.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or stdout is closed.
pub fn list(
    config: &PosConfig,
    filter: CategoryFilter,
    search: Option<&str>,
) -> minibar_pos::Result<()> {
    let catalog = load_catalog(config)?;
    let products = catalog.search(search.unwrap_or_default(), filter);
    info!(%filter, shown = products.len(), total = catalog.len(), "Listing catalog");

    let mut out = std::io::stdout();
    write_products(&mut out, &products)?;
    Ok(())
}

/// Write one row per product: name, price, category.
///
/// # Errors
///
/// Returns an I/O error if the writer fails.
pub fn write_products(out: &mut impl Write, products: &[&Product]) -> std::io::Result<()> {
    if products.is_empty() {
        return writeln!(out, "No products found");
    }
    let width = products
        .iter()
        .map(|product| product.name().as_str().chars().count())
        .max()
        .unwrap_or_default();
    for product in products {
        writeln!(
            out,
            "{:<width$}  {:>12}  {}",
            product.name().as_str(),
            product.price().to_string(),
            product.category()
        )?;
    }
    Ok(())
}
