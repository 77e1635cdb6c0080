//! Minibar CLI - terminal register for the minibar point-of-sale.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog, optionally narrowed to one tab or a name search
//! minibar catalog --category alcoholic --search cola
//!
//! # Run an interactive register session on stdin
//! minibar session
//!
//! # Summarize the checkout transaction log
//! minibar receipt-log orders.jsonl
//! ```
//!
//! Configuration comes from `MINIBAR_*` environment variables (see
//! `minibar_pos::config`). Logs go to stderr and honour `RUST_LOG`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use minibar_core::CategoryFilter;
use minibar_pos::PosConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Log filter used when `RUST_LOG` is unset. The binary's own target is
/// `minibar`, the name of the `[[bin]]`.
const DEFAULT_LOG_FILTER: &str = "minibar=info,minibar_pos=info";

#[derive(Parser)]
#[command(name = "minibar")]
#[command(author, version, about = "Minibar point-of-sale register")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Catalog {
        /// Category tab to show (`all`, `non-alcoholic`, `alcoholic`, `snacks`, `other`)
        #[arg(short, long, default_value = "all")]
        category: CategoryFilter,

        /// Only show products whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Run an interactive register session
    Session,
    /// Summarize a checkout transaction log
    ReceiptLog {
        /// Log file (defaults to `MINIBAR_RECEIPT_LOG`)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> minibar_pos::Result<()> {
    let config = PosConfig::from_env()?;
    match cli.command {
        Commands::Catalog { category, search } => {
            commands::catalog::list(&config, category, search.as_deref())?;
        }
        Commands::Session => commands::session::run(config).await?,
        Commands::ReceiptLog { path } => commands::receipt_log::summarize(&config, path)?,
    }
    Ok(())
}
