//! Receipt rendering and the stock order exporters.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{BufRead, Write};

use minibar_core::CurrencyCode;
use rust_decimal::Decimal;
use tracing::info;

use crate::checkout::{ExportError, ExportReceipt, OrderExporter, OrderSnapshot};

const RECEIPT_WIDTH: usize = 40;

/// Render a plain-text receipt.
///
/// `location` is printed under the heading when set (e.g. the villa name).
#[must_use]
pub fn render_receipt(order: &OrderSnapshot, location: Option<&str>) -> String {
    let rule = "-".repeat(RECEIPT_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{:^RECEIPT_WIDTH$}", "MINIBAR");
    if let Some(location) = location {
        let _ = writeln!(out, "{location:^RECEIPT_WIDTH$}");
    }
    let _ = writeln!(out, "{}", order.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Order {}", order.id);
    let _ = writeln!(out, "{rule}");

    for line in &order.items {
        let label = format!("{} x {}", line.quantity, line.name);
        let amount = line.line_total.to_string();
        let pad = RECEIPT_WIDTH.saturating_sub(amount.chars().count());
        let _ = writeln!(out, "{label:<pad$}{amount}");
        if line.unit_price != line.catalog_price {
            let _ = writeln!(out, "    @ {} (list {})", line.unit_price, line.catalog_price);
        }
    }

    let _ = writeln!(out, "{rule}");
    let total = order.total.to_string();
    let pad = RECEIPT_WIDTH.saturating_sub(total.chars().count());
    let _ = writeln!(out, "{:<pad$}{total}", "TOTAL");
    out
}

/// Receipt stub: logs the order instead of printing it.
#[derive(Debug, Clone, Default)]
pub struct LogExporter {
    location: Option<String>,
}

impl LogExporter {
    #[must_use]
    pub const fn new(location: Option<String>) -> Self {
        Self { location }
    }
}

impl OrderExporter for LogExporter {
    fn export(&mut self, order: &OrderSnapshot) -> Result<ExportReceipt, ExportError> {
        let receipt = render_receipt(order, self.location.as_deref());
        info!(order_id = %order.id, total = %order.total, "Printing receipt\n{receipt}");
        Ok(ExportReceipt {
            success: true,
            message: "Receipt printed successfully".to_string(),
        })
    }
}

/// Appends every order as one JSON line to a transaction log.
#[derive(Debug)]
pub struct JsonLinesExporter<W> {
    writer: W,
}

impl<W: Write> JsonLinesExporter<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OrderExporter for JsonLinesExporter<W> {
    fn export(&mut self, order: &OrderSnapshot) -> Result<ExportReceipt, ExportError> {
        let mut line = serde_json::to_vec(order)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(ExportReceipt {
            success: true,
            message: format!("Order {} saved to transaction log", order.id),
        })
    }
}

/// Runs a list of exporters in order, stopping at the first failure.
#[derive(Default)]
pub struct ChainExporter {
    exporters: Vec<Box<dyn OrderExporter>>,
}

impl ChainExporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, exporter: impl OrderExporter + 'static) -> Self {
        self.exporters.push(Box::new(exporter));
        self
    }
}

impl OrderExporter for ChainExporter {
    fn export(&mut self, order: &OrderSnapshot) -> Result<ExportReceipt, ExportError> {
        let mut messages = Vec::with_capacity(self.exporters.len());
        for exporter in &mut self.exporters {
            messages.push(exporter.export(order)?.message);
        }
        Ok(ExportReceipt {
            success: true,
            message: messages.join("; "),
        })
    }
}

/// Totals over a transaction log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub orders: usize,
    pub items: u64,
    pub totals: BTreeMap<String, Decimal>,
    pub skipped: Vec<usize>,
}

/// Read a JSON-lines transaction log and total it per currency.
///
/// Blank lines are ignored. Lines that do not parse, or whose total would
/// overflow the running sum, are recorded by their 1-based line number in
/// [`LogSummary::skipped`].
///
/// # Errors
///
/// Returns an I/O error if the reader fails.
pub fn summarize_log(reader: impl BufRead) -> std::io::Result<LogSummary> {
    let mut summary = LogSummary::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Ok(order) = serde_json::from_str::<OrderSnapshot>(&line) else {
            summary.skipped.push(index + 1);
            continue;
        };
        let total = summary
            .totals
            .entry(currency_key(order.total.currency_code))
            .or_default();
        match total.checked_add(order.total.amount) {
            Some(sum) => {
                *total = sum;
                summary.orders += 1;
                summary.items = summary.items.saturating_add(u64::from(order.item_count));
            }
            None => summary.skipped.push(index + 1),
        }
    }
    Ok(summary)
}

fn currency_key(code: CurrencyCode) -> String {
    code.code().to_string()
}
