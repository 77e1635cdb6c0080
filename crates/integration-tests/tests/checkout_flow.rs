//! Integration tests for the register through checkout.
//!
//! Orders are exported into an in-memory transaction log that the tests read
//! back, the same way `minibar receipt-log` reads the file on disk.

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use minibar_core::{Category, CurrencyCode, LineId};
use minibar_integration_tests::{builtin_catalog, czk_product, fixed_time};
use minibar_pos::checkout::checkout_at;
use minibar_pos::receipt::{render_receipt, summarize_log};
use minibar_pos::{
    Cart, CartError, CheckoutError, Command, ExportError, ExportReceipt, JsonLinesExporter,
    OrderExporter, OrderSnapshot, Register, RegisterError,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A log buffer the test keeps a handle to after the register takes the exporter.
#[derive(Clone, Default)]
struct SharedLog(Rc<RefCell<Vec<u8>>>);

impl SharedLog {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

struct OfflinePrinter;

impl OrderExporter for OfflinePrinter {
    fn export(&mut self, _order: &OrderSnapshot) -> Result<ExportReceipt, ExportError> {
        Err(ExportError::Rejected("printer offline".to_string()))
    }
}

fn add(product: &str, price: Option<Decimal>) -> Command {
    Command::Add {
        product: product.to_string(),
        price,
    }
}

fn logged_register() -> (Register, SharedLog) {
    let log = SharedLog::default();
    let register = Register::new(
        builtin_catalog(),
        Box::new(JsonLinesExporter::new(log.clone())),
    );
    (register, log)
}

// =============================================================================
// Register Checkout
// =============================================================================

#[test]
fn test_checkout_writes_order_to_log() {
    let (mut register, log) = logged_register();
    register.dispatch(add("Coca-Cola", None)).unwrap();
    register.dispatch(add("Coca-Cola", None)).unwrap();
    register.dispatch(add("Mojito", Some(dec!(80)))).unwrap();

    let outcome = register.dispatch(Command::Checkout).unwrap();
    let order = outcome.order.unwrap();
    assert_eq!(order.total.amount, dec!(144));
    assert_eq!(order.total.currency_code, CurrencyCode::CZK);
    assert_eq!(order.item_count, 3);
    assert!(register.cart().is_empty());

    let contents = log.contents();
    assert_eq!(contents.lines().count(), 1);
    let logged: OrderSnapshot = serde_json::from_str(contents.trim()).unwrap();
    assert_eq!(logged, order);

    let mojito = logged.items.iter().find(|line| line.name == "Mojito").unwrap();
    assert_eq!(mojito.unit_price.amount, dec!(80));
    assert_eq!(mojito.catalog_price.amount, dec!(99));
}

#[test]
fn test_log_summary_over_several_orders() {
    let (mut register, log) = logged_register();

    register.dispatch(add("Prosecco", None)).unwrap();
    register.dispatch(Command::Checkout).unwrap();

    register.dispatch(add("Red Bull", None)).unwrap();
    register
        .dispatch(Command::SetQuantity {
            line: LineId::new(2),
            quantity: 4,
        })
        .unwrap();
    register.dispatch(Command::Checkout).unwrap();

    let mut contents = log.contents();
    contents.push_str("not json\n");

    let summary = summarize_log(contents.as_bytes()).unwrap();
    assert_eq!(summary.orders, 2);
    assert_eq!(summary.items, 5);
    assert_eq!(summary.totals.get("CZK"), Some(&dec!(626)));
    assert_eq!(summary.skipped, vec![3]);
}

#[test]
fn test_failed_export_keeps_cart_for_retry() {
    let mut register = Register::new(builtin_catalog(), Box::new(OfflinePrinter));
    register.dispatch(add("Sprite", None)).unwrap();

    let err = register.dispatch(Command::Checkout).unwrap_err();
    assert!(matches!(
        err,
        RegisterError::Checkout(CheckoutError::Export(ExportError::Rejected(_)))
    ));
    assert!(register.can_checkout());
    assert_eq!(register.cart().compute_total(), dec!(32));
}

#[test]
fn test_rejected_commands_leave_state_alone() {
    let (mut register, log) = logged_register();
    register.dispatch(add("Malibu", None)).unwrap();

    assert!(register.dispatch(add("Absinthe", None)).is_err());
    assert!(register
        .dispatch(Command::SetCustomPrice {
            line: LineId::new(1),
            price: dec!(-1),
        })
        .is_err());
    assert!(register.dispatch(Command::SelectTab(6)).is_err());

    assert_eq!(register.cart().compute_total(), dec!(99));
    assert!(log.contents().is_empty());
}

#[test]
fn test_oversized_amounts_are_rejected_not_fatal() {
    let (mut register, log) = logged_register();
    register.dispatch(add("Coca-Cola", None)).unwrap();
    let line = LineId::new(1);
    register
        .dispatch(Command::SetQuantity {
            line,
            quantity: i64::from(u32::MAX),
        })
        .unwrap();

    let err = register
        .dispatch(Command::SetCustomPrice {
            line,
            price: dec!(20000000000000000000),
        })
        .unwrap_err();
    assert!(matches!(err, RegisterError::Cart(CartError::AmountTooLarge)));
    assert_eq!(
        register.cart().compute_total(),
        dec!(32) * Decimal::from(u32::MAX)
    );

    register
        .dispatch(Command::SetQuantity { line, quantity: 2 })
        .unwrap();
    let order = register.dispatch(Command::Checkout).unwrap().order.unwrap();
    assert_eq!(order.total.amount, dec!(64));
    assert_eq!(log.contents().lines().count(), 1);
}

#[test]
fn test_cleared_cart_cannot_check_out() {
    let (mut register, log) = logged_register();
    register.dispatch(add("Fanta", None)).unwrap();
    register.dispatch(Command::Clear).unwrap();

    assert!(!register.can_checkout());
    assert!(matches!(
        register.dispatch(Command::Checkout),
        Err(RegisterError::Checkout(CheckoutError::EmptyCart))
    ));
    assert!(log.contents().is_empty());
}

// =============================================================================
// Receipts
// =============================================================================

#[test]
fn test_receipt_for_fixed_order() {
    let peanuts = czk_product("Peanuts", dec!(45), Category::Snacks);
    let mut cart = Cart::default();
    cart.add_item(&peanuts).unwrap();
    cart.add_item(&peanuts).unwrap();
    cart.add_item_at(&peanuts, dec!(30)).unwrap();

    let mut exporter = JsonLinesExporter::new(Vec::new());
    let (order, _) = checkout_at(&mut cart, &mut exporter, fixed_time()).unwrap();
    let receipt = render_receipt(&order, Some("Villa Lipno"));

    let lines: Vec<&str> = receipt.lines().collect();
    assert_eq!(lines.first().unwrap().trim(), "MINIBAR");
    assert_eq!(lines.get(1).unwrap().trim(), "Villa Lipno");
    assert_eq!(*lines.get(2).unwrap(), "2024-07-19 21:30:00 UTC");
    assert!(receipt.contains("    @ 30.00 Kč (list 45.00 Kč)"));
    assert_eq!(
        *lines.last().unwrap(),
        format!("TOTAL{:>35}", "120.00 Kč")
    );
    assert!(cart.is_empty());
}
