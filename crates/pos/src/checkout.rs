//! Checkout: freeze the cart into an order snapshot and hand it to an exporter.

use chrono::{DateTime, Utc};
use minibar_core::{Category, LineId, Price};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cart::{Cart, LineItem};

/// Errors raised by an [`OrderExporter`].
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write order: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize order: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Export rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to check out.
    #[error("Cart is empty")]
    EmptyCart,

    /// The exporter failed; the cart was left as it was.
    #[error("Order export failed: {0}")]
    Export(#[from] ExportError),
}

/// One line of a finalized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_id: LineId,
    pub name: String,
    pub category: Category,
    pub quantity: u32,
    pub unit_price: Price,
    pub catalog_price: Price,
    pub line_total: Price,
}

impl OrderLine {
    fn from_line(line: &LineItem, cart: &Cart) -> Self {
        let currency = cart.currency();
        Self {
            line_id: line.id(),
            name: line.product().name().to_string(),
            category: line.product().category(),
            quantity: line.quantity(),
            unit_price: Price::new(line.unit_price(), currency),
            catalog_price: line.product().price(),
            line_total: Price::new(line.line_total(), currency),
        }
    }
}

/// An immutable record of a checked-out cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub id: Uuid,
    pub items: Vec<OrderLine>,
    pub total: Price,
    pub item_count: u32,
    pub timestamp: DateTime<Utc>,
}

impl OrderSnapshot {
    /// Capture the current cart contents.
    #[must_use]
    pub fn capture(cart: &Cart, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            items: cart
                .items()
                .iter()
                .map(|line| OrderLine::from_line(line, cart))
                .collect(),
            total: cart.total_price(),
            item_count: cart.item_count(),
            timestamp,
        }
    }
}

/// Result reported by an exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReceipt {
    pub success: bool,
    pub message: String,
}

/// The order-export hook invoked on checkout.
///
/// Implementations print a receipt, append to a transaction log, or forward
/// the order elsewhere.
pub trait OrderExporter {
    /// Export a finalized order.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if the order could not be exported.
    fn export(&mut self, order: &OrderSnapshot) -> Result<ExportReceipt, ExportError>;
}

/// Check out the cart at the current time.
///
/// # Errors
///
/// See [`checkout_at`].
pub fn checkout(
    cart: &mut Cart,
    exporter: &mut dyn OrderExporter,
) -> Result<(OrderSnapshot, ExportReceipt), CheckoutError> {
    checkout_at(cart, exporter, Utc::now())
}

/// Check out the cart with an explicit timestamp.
///
/// The snapshot is exported first; the cart is cleared only once the export
/// succeeded.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] for an empty cart and
/// [`CheckoutError::Export`] if the exporter fails. In both cases the cart is
/// unchanged.
#[instrument(skip_all, fields(lines = cart.len()))]
pub fn checkout_at(
    cart: &mut Cart,
    exporter: &mut dyn OrderExporter,
    timestamp: DateTime<Utc>,
) -> Result<(OrderSnapshot, ExportReceipt), CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let order = OrderSnapshot::capture(cart, timestamp);
    let receipt = exporter.export(&order).inspect_err(|e| {
        warn!(order_id = %order.id, error = %e, "Order export failed, cart kept");
    })?;

    cart.clear();
    info!(
        order_id = %order.id,
        total = %order.total,
        items = order.item_count,
        "Checkout complete"
    );
    Ok((order, receipt))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use minibar_core::{CurrencyCode, Product};
    use rust_decimal_macros::dec;

    use super::*;

    #[derive(Default)]
    struct RecordingExporter {
        orders: Vec<OrderSnapshot>,
        fail: bool,
    }

    impl OrderExporter for RecordingExporter {
        fn export(&mut self, order: &OrderSnapshot) -> Result<ExportReceipt, ExportError> {
            if self.fail {
                return Err(ExportError::Rejected("printer offline".to_string()));
            }
            self.orders.push(order.clone());
            Ok(ExportReceipt {
                success: true,
                message: "recorded".to_string(),
            })
        }
    }

    fn cart_with_drinks() -> Cart {
        let cola = Product::new(
            "Coca-Cola",
            Price::new(dec!(32), CurrencyCode::CZK),
            "images/cola.png",
            Category::NonAlcoholic,
        )
        .unwrap();
        let prosecco = Product::new(
            "Prosecco",
            Price::new(dec!(390), CurrencyCode::CZK),
            "images/prosecco.png",
            Category::Alcoholic,
        )
        .unwrap();
        let mut cart = Cart::new(CurrencyCode::CZK);
        cart.add_item(&cola).unwrap();
        cart.add_item(&cola).unwrap();
        let bottle = cart.add_item(&prosecco).unwrap();
        cart.set_custom_price(bottle, dec!(350)).unwrap();
        cart
    }

    #[test]
    fn test_checkout_exports_snapshot_and_clears() {
        let mut cart = cart_with_drinks();
        let mut exporter = RecordingExporter::default();
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 21, 30, 0).unwrap();

        let (order, receipt) = checkout_at(&mut cart, &mut exporter, at).unwrap();

        assert!(receipt.success);
        assert!(cart.is_empty());
        assert_eq!(order.timestamp, at);
        assert_eq!(order.total, Price::new(dec!(414), CurrencyCode::CZK));
        assert_eq!(order.item_count, 3);
        assert_eq!(order.items.len(), 2);
        let prosecco = order.items.get(1).unwrap();
        assert_eq!(prosecco.unit_price.amount, dec!(350));
        assert_eq!(prosecco.catalog_price.amount, dec!(390));
        assert_eq!(exporter.orders, vec![order]);
    }

    #[test]
    fn test_checkout_empty_cart() {
        let mut cart = Cart::default();
        let mut exporter = RecordingExporter::default();
        let result = checkout(&mut cart, &mut exporter);
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert!(exporter.orders.is_empty());
    }

    #[test]
    fn test_failed_export_keeps_cart() {
        let mut cart = cart_with_drinks();
        let mut exporter = RecordingExporter {
            fail: true,
            ..Default::default()
        };
        let result = checkout(&mut cart, &mut exporter);
        assert!(matches!(
            result,
            Err(CheckoutError::Export(ExportError::Rejected(_)))
        ));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.compute_total(), dec!(414));
    }

    #[test]
    fn test_snapshot_ids_are_unique() {
        let cart = cart_with_drinks();
        let now = Utc::now();
        let a = OrderSnapshot::capture(&cart, now);
        let b = OrderSnapshot::capture(&cart, now);
        assert_ne!(a.id, b.id);
        assert_eq!(a.items, b.items);
    }
}
