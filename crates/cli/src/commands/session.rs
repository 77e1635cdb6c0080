//! `minibar session` - interactive register on stdin.
//!
//! Each input line is one user action. Lines are applied strictly in the
//! order they arrive; a catalog refresh completes between two lines, never
//! in the middle of one.

use std::fs::OpenOptions;
use std::io::Write;

use minibar_core::{LineId, Price, PriceError};
use minibar_pos::receipt::{ChainExporter, JsonLinesExporter, LogExporter};
use minibar_pos::{
    Cart, Catalog, CatalogError, Command, OrderExporter, PendingRefresh, PosConfig, RefreshTimer,
    Register,
};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::catalog::write_products;
use super::load_catalog;

const HELP: &str = "\
Commands:
  add <product> [@ <price>]   add one unit, optionally at a custom price
  rm <line>                   remove a line
  qty <line> <n>              set quantity (0 removes the line)
  inc <line> | dec <line>     add or take off one unit
  price <line> <amount>       set a custom unit price
  cart                        show the cart and total
  ls                          show products on the current tab
  tab <1-5>                   switch tab (1 = all)
  search [text]               filter products by name
  clear                       empty the cart
  checkout                    finish the order
  refresh                     reload the catalog
  quit";

/// Errors for input lines that could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid line number '{0}'")]
    Line(String),

    #[error("Invalid quantity '{0}'")]
    Quantity(String),

    #[error("Invalid tab '{0}'")]
    Tab(String),

    #[error(transparent)]
    Price(#[from] PriceError),
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    ShowCart,
    ShowProducts,
    Refresh,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns a [`ParseError`] describing what was wrong with the line.
pub fn parse_line(line: &str) -> Result<Option<Input>, ParseError> {
    let line = line.trim();
    let Some((verb, rest)) = split_verb(line) else {
        return Ok(None);
    };

    let input = match verb.to_ascii_lowercase().as_str() {
        "add" => Input::Command(parse_add(rest)?),
        "rm" | "remove" => Input::Command(Command::Remove(parse_line_id(rest, "rm <line>")?)),
        "qty" => {
            let (line, quantity) = two_args(rest, "qty <line> <n>")?;
            let quantity = quantity
                .parse::<i64>()
                .map_err(|_| ParseError::Quantity(quantity.to_string()))?;
            Input::Command(Command::SetQuantity {
                line: parse_line_id(line, "qty <line> <n>")?,
                quantity,
            })
        }
        "inc" => Input::Command(Command::Increment(parse_line_id(rest, "inc <line>")?)),
        "dec" => Input::Command(Command::Decrement(parse_line_id(rest, "dec <line>")?)),
        "price" => {
            let (line, amount) = two_args(rest, "price <line> <amount>")?;
            Input::Command(Command::SetCustomPrice {
                line: parse_line_id(line, "price <line> <amount>")?,
                price: Price::parse_amount(amount)?,
            })
        }
        "tab" => {
            let index = rest
                .parse::<usize>()
                .map_err(|_| ParseError::Tab(rest.to_string()))?;
            Input::Command(Command::SelectTab(index))
        }
        "search" => Input::Command(Command::Search(rest.to_string())),
        "clear" => Input::Command(Command::Clear),
        "checkout" => Input::Command(Command::Checkout),
        "cart" | "total" => Input::ShowCart,
        "ls" | "products" => Input::ShowProducts,
        "refresh" => Input::Refresh,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(input))
}

fn split_verb(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(
        line.split_once(char::is_whitespace)
            .map_or((line, ""), |(verb, rest)| (verb, rest.trim())),
    )
}

fn two_args<'a>(rest: &'a str, usage: &'static str) -> Result<(&'a str, &'a str), ParseError> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(second), None) => Ok((first, second)),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn parse_line_id(arg: &str, usage: &'static str) -> Result<LineId, ParseError> {
    if arg.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    arg.parse::<LineId>()
        .map_err(|_| ParseError::Line(arg.to_string()))
}

fn parse_add(rest: &str) -> Result<Command, ParseError> {
    let (name, price) = match rest.rsplit_once('@') {
        Some((name, price)) => (name.trim(), Some(Price::parse_amount(price)?)),
        None => (rest, None::<Decimal>),
    };
    if name.is_empty() {
        return Err(ParseError::Usage("add <product> [@ <price>]"));
    }
    Ok(Command::Add {
        product: name.to_string(),
        price,
    })
}

/// Write the cart lines and total.
///
/// # Errors
///
/// Returns an I/O error if the writer fails.
pub fn write_cart(out: &mut impl Write, cart: &Cart) -> std::io::Result<()> {
    if cart.is_empty() {
        writeln!(out, "Cart is empty")?;
    }
    for line in cart.items() {
        let unit = Price::new(line.unit_price(), cart.currency());
        let total = Price::new(line.line_total(), cart.currency());
        let marker = if line.is_custom_price() { " *" } else { "" };
        writeln!(
            out,
            "[{}] {} x {} @ {unit}{marker} = {total}",
            line.id(),
            line.quantity(),
            line.product().name(),
        )?;
    }
    writeln!(out, "Total: {}", cart.total_price())
}

fn build_exporter(config: &PosConfig) -> minibar_pos::Result<Box<dyn OrderExporter>> {
    let printer = LogExporter::new(config.location.clone());
    let Some(path) = &config.receipt_log else {
        return Ok(Box::new(printer));
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    info!(path = %path.display(), "Appending orders to transaction log");
    // Log before printing: a failed log write must not leave a printed receipt.
    Ok(Box::new(
        ChainExporter::new()
            .with(JsonLinesExporter::new(file))
            .with(printer),
    ))
}

/// Read the next input line, or `None` at end of input.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the read,
/// so a garbled line is rejected by the parser like any other typo. Partial
/// reads stay in `buf`, which makes this safe to race in `tokio::select!`.
///
/// # Errors
///
/// Returns an I/O error if the reader fails.
pub async fn next_input<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let read = reader.read_until(b'\n', buf).await?;
    if read == 0 && buf.is_empty() {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf).into_owned();
    buf.clear();
    Ok(Some(line))
}

/// Run the register until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if start-up fails or stdin/stdout break. Rejected
/// commands are reported to the user and do not end the session.
pub async fn run(config: PosConfig) -> minibar_pos::Result<()> {
    let catalog = load_catalog(&config)?;
    let mut register = Register::new(catalog, build_exporter(&config)?);
    let timer = RefreshTimer::new(config.refresh_delay);
    let (refreshed_tx, mut refreshed_rx) =
        mpsc::unbounded_channel::<Result<Catalog, CatalogError>>();
    let mut pending: Option<PendingRefresh> = None;

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut pending_bytes = Vec::new();
    let mut out = std::io::stdout();

    info!(products = register.catalog().len(), "Register session started");
    writeln!(out, "Minibar register. Type 'help' for commands.")?;
    write_products(&mut out, &register.visible_products())?;

    loop {
        tokio::select! {
            line = next_input(&mut stdin, &mut pending_bytes) => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(None) => {}
                    Ok(Some(Input::Quit)) => break,
                    Ok(Some(Input::Help)) => writeln!(out, "{HELP}")?,
                    Ok(Some(Input::ShowCart)) => write_cart(&mut out, register.cart())?,
                    Ok(Some(Input::ShowProducts)) => {
                        write_products(&mut out, &register.visible_products())?;
                    }
                    Ok(Some(Input::Refresh)) => {
                        let tx = refreshed_tx.clone();
                        let reload = config.clone();
                        // Replacing the handle cancels a refresh still in flight.
                        pending = Some(timer.schedule(move || {
                            let _ = tx.send(load_catalog(&reload));
                        }));
                        writeln!(out, "Refreshing products...")?;
                    }
                    Ok(Some(Input::Command(command))) => {
                        let show_products =
                            matches!(command, Command::SelectTab(_) | Command::Search(_));
                        match register.dispatch(command) {
                            Ok(outcome) => {
                                writeln!(out, "{}", outcome.message)?;
                                if show_products {
                                    write_products(&mut out, &register.visible_products())?;
                                }
                            }
                            Err(e) => writeln!(out, "Error: {e}")?,
                        }
                    }
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            Some(result) = refreshed_rx.recv() => {
                pending = None;
                match result {
                    Ok(catalog) => {
                        register.replace_catalog(catalog);
                        writeln!(out, "Products updated")?;
                    }
                    Err(e) => {
                        warn!(error = %e, "Catalog refresh failed");
                        writeln!(out, "Refresh failed: {e}")?;
                    }
                }
            }
        }
    }

    if let Some(refresh) = pending.take() {
        refresh.cancel();
    }
    if !register.cart().is_empty() {
        warn!(lines = register.cart().len(), "Session ended with an open cart");
    }
    info!("Register session ended");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use minibar_core::{Category, CurrencyCode, Product};
    use rust_decimal_macros::dec;

    use super::*;

    fn command(line: &str) -> Command {
        match parse_line(line).unwrap().unwrap() {
            Input::Command(command) => command,
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_add_with_spaces_in_name() {
        assert_eq!(
            command("add Red Bull"),
            Command::Add {
                product: "Red Bull".to_string(),
                price: None
            }
        );
    }

    #[test]
    fn test_parse_add_with_custom_price() {
        assert_eq!(
            command("ADD Jack's Cola @ 79,50"),
            Command::Add {
                product: "Jack's Cola".to_string(),
                price: Some(dec!(79.50))
            }
        );
    }

    #[test]
    fn test_parse_add_without_name() {
        assert_eq!(
            parse_line("add @ 5"),
            Err(ParseError::Usage("add <product> [@ <price>]"))
        );
    }

    #[test]
    fn test_parse_line_commands() {
        assert_eq!(command("rm 2"), Command::Remove(LineId::new(2)));
        assert_eq!(
            command("qty 1 -4"),
            Command::SetQuantity {
                line: LineId::new(1),
                quantity: -4
            }
        );
        assert_eq!(command("inc 3"), Command::Increment(LineId::new(3)));
        assert_eq!(command("dec 3"), Command::Decrement(LineId::new(3)));
        assert_eq!(
            command("price 1 -1"),
            Command::SetCustomPrice {
                line: LineId::new(1),
                price: dec!(-1)
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_line("rm"), Err(ParseError::Usage("rm <line>")));
        assert_eq!(parse_line("rm x"), Err(ParseError::Line("x".to_string())));
        assert_eq!(
            parse_line("qty 1"),
            Err(ParseError::Usage("qty <line> <n>"))
        );
        assert_eq!(
            parse_line("qty 1 lots"),
            Err(ParseError::Quantity("lots".to_string()))
        );
        assert!(matches!(
            parse_line("price 1 free"),
            Err(ParseError::Price(PriceError::InvalidAmount(_)))
        ));
        assert_eq!(parse_line("tab x"), Err(ParseError::Tab("x".to_string())));
        assert_eq!(
            parse_line("dance"),
            Err(ParseError::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn test_parse_session_inputs() {
        assert_eq!(parse_line("cart").unwrap(), Some(Input::ShowCart));
        assert_eq!(parse_line("ls").unwrap(), Some(Input::ShowProducts));
        assert_eq!(parse_line("refresh").unwrap(), Some(Input::Refresh));
        assert_eq!(parse_line("exit").unwrap(), Some(Input::Quit));
        assert_eq!(command("search"), Command::Search(String::new()));
        assert_eq!(command("tab 2"), Command::SelectTab(2));
    }

    #[test]
    fn test_write_cart() {
        let cola = Product::new(
            "Coca-Cola",
            Price::new(dec!(32), CurrencyCode::CZK),
            "",
            Category::NonAlcoholic,
        )
        .unwrap();
        let mut cart = Cart::default();
        cart.add_item(&cola).unwrap();
        cart.add_item(&cola).unwrap();
        cart.add_item_at(&cola, dec!(20)).unwrap();

        let mut out = Vec::new();
        write_cart(&mut out, &cart).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[1] 2 x Coca-Cola @ 32.00 Kč = 64.00 Kč\n\
             [2] 1 x Coca-Cola @ 20.00 Kč * = 20.00 Kč\n\
             Total: 84.00 Kč\n"
        );
    }

    #[tokio::test]
    async fn test_next_input_survives_invalid_utf8() {
        let mut reader: &[u8] = b"add Coca-Cola\n\xff\xfe\ncart";
        let mut buf = Vec::new();

        let first = next_input(&mut reader, &mut buf).await.unwrap();
        assert_eq!(first.as_deref(), Some("add Coca-Cola\n"));

        let garbled = next_input(&mut reader, &mut buf).await.unwrap().unwrap();
        assert!(matches!(parse_line(&garbled), Err(ParseError::Unknown(_))));

        let last = next_input(&mut reader, &mut buf).await.unwrap();
        assert_eq!(last.as_deref(), Some("cart"));
        assert_eq!(next_input(&mut reader, &mut buf).await.unwrap(), None);
    }

    #[test]
    fn test_transaction_log_written_before_receipt() {
        let path = std::env::temp_dir().join(format!(
            "minibar-session-log-{}.jsonl",
            std::process::id()
        ));
        let config = PosConfig {
            receipt_log: Some(path.clone()),
            ..PosConfig::default()
        };
        let mut exporter = build_exporter(&config).unwrap();

        let mut cart = Cart::default();
        let cola = Product::new(
            "Coca-Cola",
            Price::new(dec!(32), CurrencyCode::CZK),
            "",
            Category::NonAlcoholic,
        )
        .unwrap();
        cart.add_item(&cola).unwrap();
        let (order, receipt) =
            minibar_pos::checkout::checkout(&mut cart, exporter.as_mut()).unwrap();

        assert_eq!(
            receipt.message,
            format!(
                "Order {} saved to transaction log; Receipt printed successfully",
                order.id
            )
        );
        let logged = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(logged.lines().count(), 1);
    }

    #[test]
    fn test_write_empty_cart() {
        let mut out = Vec::new();
        write_cart(&mut out, &Cart::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Cart is empty\nTotal: 0.00 Kč\n"
        );
    }
}
