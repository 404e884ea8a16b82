use std::sync::Arc;

use axum::http::HeaderValue;
use chess_analyzers::FeatureExtractor;
use index_worker::queue::SqsQueue;
use index_worker::store::{schema, PgStore};
use server::config;
use server::routes;
use server::state::AppState;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;

    tracing::info!("Connecting to database...");
    let store = Arc::new(PgStore::connect(&config.database_url, config.db_max_connections).await?);

    tracing::info!("Running migrations...");
    schema::run_migrations(store.pool()).await?;

    let queue = match &config.sqs_queue_url {
        Some(url) => {
            let queue = SqsQueue::connect(url, config.sqs_endpoint_url.as_deref(), 900).await;
            tracing::info!(queue_url = %url, "SQS index queue configured");
            Some(Arc::new(queue))
        }
        None => {
            tracing::warn!("SQS_QUEUE_URL not set - index requests will not be processed");
            None
        }
    };

    let state = Arc::new(AppState::new(store, queue, Arc::new(FeatureExtractor::new()?)));

    let cors = if config.cors_origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let app = routes::router(state).layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
