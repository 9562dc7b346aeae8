//! # Storefront Cart CLI
//!
//! Drives the cart from a terminal. Every command prints the resulting JSON
//! on stdout; logs go to stderr.
//!
//! ## Usage
//! ```bash
//! # Show the cart
//! storefront show
//!
//! # List a category from a catalog export
//! storefront products ./products.json --category outdoor-saunas
//!
//! # Add the "Large" variant twice
//! storefront add ./products.json barrel-sauna --variant gid://shopify/ProductVariant/12 --qty 2
//!
//! # Change or remove a line
//! storefront update gid://shopify/ProductVariant/12 3
//! storefront remove gid://shopify/ProductVariant/12
//!
//! # Hand off to hosted checkout
//! storefront checkout
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use storefront::commands::{cart, config, product};
use storefront::error::{ApiError, ApiResult};
use storefront::state::{AppConfig, StorageBackend};
use storefront::{init_tracing, AppContext};
use storefront_core::catalog::CatalogQuery;
use storefront_core::validation::parse_quantity;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(version, about = "Storefront shopping cart")]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(short, long, global = true, env = "STOREFRONT_CONFIG")]
    config: Option<PathBuf>,

    /// Keep the cart in memory only; it is discarded on exit
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the cart (default)
    Show,
    /// List products from a catalog export
    Products {
        /// Catalog JSON export
        catalog: PathBuf,

        /// Category slug, e.g. `outdoor-saunas`
        #[arg(long, conflicts_with = "related")]
        category: Option<String>,

        /// Products related to this handle
        #[arg(long)]
        related: Option<String>,

        #[arg(long)]
        limit: Option<u32>,
    },
    /// Add a product by handle
    Add {
        /// Catalog JSON export
        catalog: PathBuf,

        handle: String,

        /// Variant id (default: first variant)
        #[arg(short, long)]
        variant: Option<String>,

        /// Quantity (default 1; 0 or below counts as 1)
        #[arg(short, long, allow_hyphen_values = true, value_parser = quantity_arg)]
        qty: Option<i64>,
    },
    /// Set a line's quantity; 0 or below removes it
    Update {
        variant_id: String,

        #[arg(allow_hyphen_values = true, value_parser = quantity_arg)]
        quantity: i64,
    },
    /// Remove a line
    Remove { variant_id: String },
    /// Empty the cart
    Clear,
    /// Print the checkout hand-off
    Checkout,
    /// Print the active configuration
    Config,
}

fn quantity_arg(text: &str) -> Result<i64, String> {
    parse_quantity(text).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing();

    let mut app_config = AppConfig::load_or_default(cli.config);
    if cli.memory {
        app_config.storage.backend = StorageBackend::Memory;
    }

    let command = cli.command.unwrap_or(Commands::Show);

    let ctx = AppContext::init(app_config).await?;
    info!(backend = %ctx.backend(), ?command, "Running command");

    let outcome = run(&ctx, command);
    ctx.shutdown().await?;

    match outcome {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&err)?);
            std::process::exit(1);
        }
    }
}

fn run(ctx: &AppContext, command: Commands) -> ApiResult<serde_json::Value> {
    match command {
        Commands::Show => to_json(&cart::get_cart(&ctx.cart)),
        Commands::Products {
            catalog,
            category,
            related,
            limit,
        } => {
            let catalog = product::Catalog::from_path(&catalog)?;
            if let Some(handle) = related {
                return to_json(&product::related_products(&catalog, &handle, limit)?);
            }

            let query = match category {
                Some(slug) => CatalogQuery::for_category(&slug),
                None => CatalogQuery::default(),
            };
            let query = match limit {
                Some(n) => query.limit(n),
                None => query,
            };
            to_json(&product::list_products(&catalog, &query))
        }
        Commands::Add {
            catalog,
            handle,
            variant,
            qty,
        } => {
            let catalog = product::Catalog::from_path(&catalog)?;
            to_json(&product::add_product_to_cart(
                &ctx.cart,
                &catalog,
                &handle,
                variant.as_deref(),
                qty,
            )?)
        }
        Commands::Update {
            variant_id,
            quantity,
        } => to_json(&cart::update_cart_item(&ctx.cart, &variant_id, quantity)),
        Commands::Remove { variant_id } => {
            to_json(&cart::remove_from_cart(&ctx.cart, &variant_id))
        }
        Commands::Clear => to_json(&cart::clear_cart(&ctx.cart)),
        Commands::Checkout => to_json(&cart::checkout_cart(
            &ctx.cart,
            ctx.config.shop_domain(),
        )?),
        Commands::Config => to_json(&config::get_config(&ctx.config)),
    }
}

fn to_json<T: Serialize>(value: &T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_show() {
        let cli = Cli::try_parse_from(["storefront", "--memory"]).unwrap();
        assert!(cli.memory);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_config_flag_requires_value() {
        assert!(Cli::try_parse_from(["storefront", "--config"]).is_err());

        let cli = Cli::try_parse_from(["storefront", "show", "-c", "shop.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("shop.toml")));
    }

    #[test]
    fn test_negative_update_quantity_parses() {
        let cli = Cli::try_parse_from(["storefront", "update", "V1", "-2"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Update { quantity: -2, .. })
        ));

        assert!(Cli::try_parse_from(["storefront", "update", "V1", "lots"]).is_err());
    }

    #[test]
    fn test_add_flags() {
        let cli = Cli::try_parse_from([
            "storefront",
            "add",
            "products.json",
            "barrel-sauna",
            "--variant",
            "gid://shopify/ProductVariant/12",
            "--qty",
            "2",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Add {
                handle,
                variant,
                qty,
                ..
            }) => {
                assert_eq!(handle, "barrel-sauna");
                assert_eq!(variant.as_deref(), Some("gid://shopify/ProductVariant/12"));
                assert_eq!(qty, Some(2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_category_and_related_conflict() {
        assert!(Cli::try_parse_from([
            "storefront",
            "products",
            "p.json",
            "--category",
            "steam-rooms",
            "--related",
            "barrel-sauna",
        ])
        .is_err());
    }
}
