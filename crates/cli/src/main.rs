//! ServiceCart CLI - Database migrations, catalog seeding and order listing.
//!
//! # Usage
//!
//! ```bash
//! # Apply storefront migrations and create the session table
//! sc-cli migrate
//!
//! # Load the catalog and payment methods from YAML
//! sc-cli seed --file catalog.yaml
//!
//! # Replace the existing catalog
//! sc-cli seed --file catalog.yaml --clear
//!
//! # Show the ten most recent orders
//! sc-cli orders list --limit 10
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sc-cli")]
#[command(author, version, about = "ServiceCart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (catalog, checkout and sessions)
    Migrate,
    /// Seed the catalog and payment methods from a YAML file
    Seed {
        /// Path to the YAML catalog file
        #[arg(short, long)]
        file: String,

        /// Delete the existing catalog and payment methods first
        #[arg(long)]
        clear: bool,
    },
    /// Inspect placed orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List the most recent orders, newest first
    List {
        /// Maximum number of orders to show
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, clear } => commands::seed::catalog(&file, clear).await?,
        Commands::Orders { action } => match action {
            OrdersAction::List { limit } => commands::orders::list(limit).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_orders_list_default_limit() {
        let cli = Cli::try_parse_from(["sc-cli", "orders", "list"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Orders {
                action: OrdersAction::List { limit: 20 }
            }
        ));
    }

    #[test]
    fn test_seed_flags() {
        let cli = Cli::try_parse_from(["sc-cli", "seed", "--file", "catalog.yaml", "--clear"])
            .unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Commands::Seed { file, clear } => {
                assert_eq!(file, "catalog.yaml");
                assert!(clear);
            }
            _ => panic!("expected seed command"),
        }
    }
}
