use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use sqlx::migrate::Migrator;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bloomstock::adapters::PostgresStore;
use bloomstock::cli::{self, Cli, Commands, DbCommands};
use bloomstock::config::Config;
use bloomstock::services::FlowerShop;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let store = PostgresStore::connect(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(store.pool()).await?;
    tracing::debug!("database migrations completed");

    let shop = FlowerShop::new(Arc::new(store));

    match cli.command {
        Commands::Flowers(command) => cli::handle_flowers(&shop, command).await,
        Commands::Customers(command) => cli::handle_customers(&shop, command).await,
        Commands::Orders(command) => cli::handle_orders(&shop, command).await,
        Commands::Reports(command) => cli::handle_reports(&shop, command).await,
        Commands::Db(DbCommands::Migrate) => {
            // Migrations already ran above.
            println!("✓ Database migrations completed");
            Ok(())
        }
    }
}
