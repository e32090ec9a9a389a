//! Database migration runner for Quill.
//!
//! Usage:
//!   migrator [up [N]]   - Run pending migrations (all, or the next N)
//!   migrator down [N]   - Roll back the last migration (or the last N)
//!   migrator status     - Show migration status
//!   migrator fresh      - Drop all tables and re-run migrations
//!   migrator refresh    - Roll back everything, then re-run
//!   migrator reset      - Roll back everything
//!
//! The database is taken from the same configuration as the server
//! (`config/*.toml`, `QUILL__DATABASE__URL`).

use anyhow::{Context, bail};
use quill_db::connect;
use quill_db::migration::{Migrator, MigratorTrait};
use quill_shared::AppConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sea_orm_migration=info,migrator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "up".to_string());
    let steps = args
        .next()
        .map(|n| n.parse::<u32>())
        .transpose()
        .context("step count must be a positive integer")?;

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    match command.as_str() {
        "up" => Migrator::up(&db, steps).await?,
        "down" => Migrator::down(&db, steps.or(Some(1))).await?,
        "status" => Migrator::status(&db).await?,
        "fresh" => Migrator::fresh(&db).await?,
        "refresh" => Migrator::refresh(&db).await?,
        "reset" => Migrator::reset(&db).await?,
        other => bail!("unknown command {other:?}; expected up, down, status, fresh, refresh or reset"),
    }

    info!(command = %command, "Migration command finished");
    Ok(())
}
