//! Strivo CLI - catalog, cart and subscription tools.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! strivo catalog list --category futbol
//! strivo catalog show 1
//!
//! # Work with a cart kept in a JSON file (default: strivo-cart.json)
//! strivo cart add 1 --quantity 2 --size M
//! strivo cart show
//! strivo --cart-file /tmp/cart.json cart clear
//!
//! # Check a subscription
//! strivo subscribe --first-name Ana --last-name Ruiz --email ana@example.com --accept-terms
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_CATALOG_PATH` - Catalog JSON to use instead of the bundled one
//! - `STRIVO_CART_FILE` - Cart slot file

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use strivo_core::{CartStore, Catalog, DEFAULT_SLOT_KEY, ProductId, SubscriptionInput};

mod commands;
mod file_storage;

use file_storage::FileStorage;

#[derive(Parser)]
#[command(name = "strivo")]
#[command(author, version, about = "Strivo storefront CLI tools")]
struct Cli {
    /// Catalog JSON file (defaults to the bundled catalog)
    #[arg(long, global = true, env = "STOREFRONT_CATALOG_PATH")]
    catalog: Option<PathBuf>,

    /// File the cart is kept in
    #[arg(
        long,
        global = true,
        env = "STRIVO_CART_FILE",
        default_value = "strivo-cart.json"
    )]
    cart_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Validate a newsletter subscription
    Subscribe {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(short, long)]
        email: String,

        /// Accept the terms and conditions
        #[arg(long)]
        accept_terms: bool,

        /// Category of interest (repeatable)
        #[arg(short, long = "interest")]
        interests: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Category slug (`futbol`, `running`, `baloncesto`, `entrenamiento`)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product
    Show { id: i32 },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart lines and total
    Show,
    /// Add a product
    Add {
        product_id: i32,

        #[arg(short, long, default_value_t = 1)]
        quantity: i64,

        /// Size for apparel and footwear (S, M, L, XL)
        #[arg(short, long)]
        size: Option<String>,
    },
    /// Set the quantity of a line (0 or less removes it)
    Update {
        index: usize,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { index: usize },
    /// Remove every line
    Clear,
}

fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strivo_cli=info,strivo_core=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Arc::new(Catalog::load(cli.catalog.as_deref())?);
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List { category } => {
                commands::catalog::list(&catalog, category.as_deref(), &mut out)?;
            }
            CatalogAction::Show { id } => {
                commands::catalog::show(&catalog, ProductId::new(id), &mut out)?;
            }
        },
        Commands::Cart { action } => {
            tracing::debug!(path = %cli.cart_file.display(), "Opening cart file");
            let mut store =
                CartStore::load(FileStorage::new(cli.cart_file), DEFAULT_SLOT_KEY, catalog);
            match action {
                CartAction::Show => commands::cart::show(&store, &mut out)?,
                CartAction::Add {
                    product_id,
                    quantity,
                    size,
                } => commands::cart::add(
                    &mut store,
                    ProductId::new(product_id),
                    quantity,
                    size.as_deref(),
                    &mut out,
                )?,
                CartAction::Update { index, quantity } => {
                    commands::cart::update(&mut store, index, quantity, &mut out)?;
                }
                CartAction::Remove { index } => commands::cart::remove(&mut store, index, &mut out)?,
                CartAction::Clear => commands::cart::clear(&mut store, &mut out)?,
            }
        }
        Commands::Subscribe {
            first_name,
            last_name,
            email,
            accept_terms,
            interests,
        } => {
            let input = SubscriptionInput {
                first_name,
                last_name,
                email,
                accept_terms,
                interests,
            };
            commands::subscribe::run(&input, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_update_quantity_parses() {
        let cli = Cli::try_parse_from(["strivo", "cart", "update", "0", "-3"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: CartAction::Update {
                    index: 0,
                    quantity: -3
                }
            })
        ));
    }
}
