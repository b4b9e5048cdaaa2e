//! Boutique CLI - database migrations, seeding, and user management.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! boutique-cli migrate
//!
//! # Replace the catalog with the bundled sample products
//! boutique-cli seed products
//!
//! # Grant admin rights to an existing account
//! boutique-cli users promote --email admin@example.com
//! ```
//!
//! The database URL is read from `POSTGRES_URL` (or `DATABASE_URL`),
//! loading `.env` if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use boutique_storefront::models::Role;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "boutique-cli")]
#[command(author, version, about = "Boutique CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load sample data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Replace all products with the contents of a YAML file
    Products {
        /// Path to the products YAML file
        #[arg(short, long, default_value = commands::seed::DEFAULT_PRODUCTS_FILE)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Grant the admin role
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke the admin role
    Demote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await,
        },
        Commands::Users { action } => match action {
            UserAction::Promote { email } => commands::users::set_role(&email, Role::Admin).await,
            UserAction::Demote { email } => commands::users::set_role(&email, Role::User).await,
        },
    }
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
    fn test_seed_products_default_file() {
        let cli = Cli::try_parse_from(["boutique-cli", "seed", "products"]);
        let Ok(Cli {
            command: Commands::Seed {
                target: SeedTarget::Products { file },
            },
        }) = cli
        else {
            panic!("expected seed products");
        };
        assert_eq!(file, PathBuf::from(commands::seed::DEFAULT_PRODUCTS_FILE));
    }

    #[test]
    fn test_promote_requires_email() {
        assert!(Cli::try_parse_from(["boutique-cli", "users", "promote"]).is_err());
    }
}
