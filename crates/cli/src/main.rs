//! Rolodex CLI - Database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations to the configured database
//! rolodex-cli migrate
//!
//! # Insert 25 demo customers with addresses
//! rolodex-cli seed --customers 25
//! ```
//!
//! Both commands read `ROLODEX_DATABASE_URL` (or `DATABASE_URL`) the same way
//! the server does. Point it at a file; the in-memory default is discarded
//! when the command exits.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use crate::commands::seed::MAX_CUSTOMERS;

mod commands;

#[derive(Parser)]
#[command(name = "rolodex-cli")]
#[command(author, version, about = "Rolodex CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo customers and addresses
    Seed {
        /// Number of customers to create
        #[arg(
            short,
            long,
            default_value_t = 20,
            value_parser = clap::value_parser!(u32).range(..i64::from(MAX_CUSTOMERS))
        )]
        customers: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { customers } => {
            commands::seed::run(customers).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_customer_count_is_capped() {
        let cli = Cli::try_parse_from(["rolodex-cli", "seed", "--customers", "899999999"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Seed { customers: 899_999_999 })
        ));

        let cli = Cli::try_parse_from(["rolodex-cli", "seed", "--customers", "900000000"]);
        assert!(cli.is_err());
    }
}
