//! One-shot retention sweep. Schedule it daily.

use chrono::Utc;
use index_worker::config;
use index_worker::retention;
use index_worker::store::{schema, PgStore};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let database_url = config::database_url().await?;
    let retention_days = config::retention_days();
    let store = PgStore::connect(&database_url, 2).await?;
    schema::run_migrations(store.pool()).await?;

    let threshold = retention::threshold(Utc::now(), retention_days);
    info!(retention_days, %threshold, "Running retention sweep");
    let report = retention::sweep(&store, &store, threshold).await?;
    info!(
        games_deleted = report.games_deleted,
        periods_deleted = report.periods_deleted,
        "Retention complete"
    );
    Ok(())
}
