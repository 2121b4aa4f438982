//! RocketShoes CLI - Drive a persisted cart from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rocketshoes show
//!
//! # Add one unit of product 3
//! rocketshoes add 3
//!
//! # Set product 3 to four units
//! rocketshoes update 3 4
//!
//! # Remove product 3
//! rocketshoes remove 3
//!
//! # Point at another API and cart file
//! rocketshoes --api-url http://localhost:3333 --cart-file /tmp/cart.json show
//! ```
//!
//! # Commands
//!
//! - `show` - Print line items and totals
//! - `add` - Add one unit of a product
//! - `remove` - Remove a product
//! - `update` - Set a product's quantity

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rocketshoes_core::ProductId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "rocketshoes")]
#[command(author, version, about = "RocketShoes cart")]
struct Cli {
    /// Catalog API base URL (overrides `ROCKETSHOES_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// File holding the persisted cart (overrides `ROCKETSHOES_CART_FILE`)
    #[arg(long, global = true)]
    cart_file: Option<PathBuf>,

    /// Start from an empty cart if the stored one cannot be read
    #[arg(long, global = true)]
    reset_corrupt: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity (zero or less is ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    let json_logs = std::env::var("ROCKETSHOES_LOG_FORMAT").is_ok_and(|format| format == "json");
    init_tracing(json_logs);

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, json_logs).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing with `EnvFilter`, writing to stderr.
///
/// With `json`, events are written as JSON lines.
fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_cli=info,rocketshoes_cart=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli, json_logs: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = commands::load_config(cli.api_url.as_deref(), cli.cart_file)?;
    let notifier = commands::CliNotifier::for_log_format(json_logs);
    let mut cart = commands::open_cart(&config, cli.reset_corrupt, notifier)?;

    match cli.command {
        Commands::Show => commands::cart::show(&cart),
        Commands::Add { product_id } => commands::cart::add(&mut cart, product_id).await?,
        Commands::Remove { product_id } => commands::cart::remove(&mut cart, product_id)?,
        Commands::Update { product_id, amount } => {
            commands::cart::update(&mut cart, product_id, amount).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update_with_negative_amount() {
        let cli = Cli::try_parse_from(["rocketshoes", "update", "3", "-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Update { product_id, amount: -1 } if product_id == ProductId::new(3)
        ));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "rocketshoes",
            "add",
            "7",
            "--api-url",
            "http://localhost:3333",
            "--cart-file",
            "/tmp/cart.json",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:3333"));
        assert_eq!(cli.cart_file, Some(PathBuf::from("/tmp/cart.json")));
        assert!(!cli.reset_corrupt);
        assert!(matches!(cli.command, Commands::Add { product_id } if product_id == ProductId::new(7)));
    }

    #[test]
    fn test_rejects_non_numeric_product_id() {
        assert!(Cli::try_parse_from(["rocketshoes", "remove", "sneaker"]).is_err());
    }
}
