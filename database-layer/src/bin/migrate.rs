//! Schema migration tool
//!
//! Usage:
//!   cargo run --bin migrate -- --database-url postgres://...
//!
//! Applies the embedded migrations to the target database. Safe to run
//! repeatedly; already-applied migrations are skipped.

use clap::Parser;
use database_layer::DatabasePool;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "migrate")]
#[command(about = "Apply schema migrations to the target database")]
struct Args {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let db = DatabasePool::new(&args.database_url).await?;
    db.migrate().await?;

    info!("Migrations applied");
    db.close().await;

    Ok(())
}
