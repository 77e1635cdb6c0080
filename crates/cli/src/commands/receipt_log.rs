//! `minibar receipt-log` - totals over the checkout transaction log.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use minibar_pos::receipt::{LogSummary, summarize_log};
use minibar_pos::{ConfigError, PosConfig};
use tracing::{info, warn};

/// Summarize the log at `path`, falling back to the configured log.
///
/// # Errors
///
/// Returns an error if no log path is known or the file cannot be read.
pub fn summarize(config: &PosConfig, path: Option<PathBuf>) -> minibar_pos::Result<()> {
    let path = path
        .or_else(|| config.receipt_log.clone())
        .ok_or_else(|| ConfigError::MissingEnvVar("MINIBAR_RECEIPT_LOG".to_string()))?;

    info!(path = %path.display(), "Reading transaction log");
    let summary = summarize_log(BufReader::new(File::open(&path)?))?;
    if !summary.skipped.is_empty() {
        warn!(lines = ?summary.skipped, "Skipped unreadable log lines");
    }

    write_summary(&mut std::io::stdout(), &summary)?;
    Ok(())
}

fn write_summary(out: &mut impl Write, summary: &LogSummary) -> std::io::Result<()> {
    writeln!(out, "Orders: {}", summary.orders)?;
    writeln!(out, "Items:  {}", summary.items)?;
    for (currency, total) in &summary.totals {
        writeln!(out, "Total:  {total:.2} {currency}")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_write_summary() {
        let summary = LogSummary {
            orders: 2,
            items: 5,
            totals: BTreeMap::from([("CZK".to_string(), dec!(513))]),
            skipped: Vec::new(),
        };
        let mut out = Vec::new();
        write_summary(&mut out, &summary).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Orders: 2\nItems:  5\nTotal:  513.00 CZK\n"
        );
    }

    #[test]
    fn test_missing_log_path() {
        let err = summarize(&PosConfig::default(), None).unwrap_err();
        assert!(matches!(
            err,
            minibar_pos::PosError::Config(ConfigError::MissingEnvVar(_))
        ));
    }
}
