//! Catalog CLI - database migrations and store management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! catalog-cli migrate
//!
//! # Write the sample catalog into an empty database
//! catalog-cli seed
//!
//! # Write the sample catalog even if products exist
//! catalog-cli seed --force
//!
//! # Show connectivity and product count
//! catalog-cli status
//! ```
//!
//! The database URL is read from `CATALOG_DATABASE_URL` (or `DATABASE_URL`),
//! including a `.env` file in the working directory.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(author, version, about = "Product catalog CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Write the sample catalog into the database
    Seed {
        /// Insert even if the store already holds products
        #[arg(short, long)]
        force: bool,
    },
    /// Show database connectivity and product count
    Status,
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
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { force } => commands::seed::run(force).await,
        Commands::Status => commands::status::run().await,
    }
}
