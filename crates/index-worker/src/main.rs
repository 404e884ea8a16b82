//! Indexing worker
//!
//! Pulls index requests from SQS and processes each on its own task, up to
//! WORKER_CONCURRENCY at a time.

use std::sync::Arc;
use std::time::Duration;

use chess_analyzers::FeatureExtractor;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use index_worker::config::WorkerConfig;
use index_worker::queue::{IndexQueue, SqsQueue};
use index_worker::source::ChessComClient;
use index_worker::store::{schema, PgStore};
use index_worker::{IndexWorker, ProcessOutcome};

const POLL_TIMEOUT: Duration = Duration::from_secs(20);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file for local dev, before RUST_LOG is read
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = WorkerConfig::load().await?;
    info!(
        concurrency = config.concurrency,
        max_empty_receives = config.max_empty_receives,
        "Worker config loaded"
    );

    let store = Arc::new(PgStore::connect(&config.database_url, config.db_max_connections).await?);
    schema::run_migrations(store.pool()).await?;
    info!("Database ready");

    let queue = Arc::new(
        SqsQueue::connect(
            &config.sqs_queue_url,
            config.sqs_endpoint_url.as_deref(),
            config.visibility_timeout_secs,
        )
        .await,
    );
    info!(queue_url = %config.sqs_queue_url, "SQS client ready");

    let worker = Arc::new(IndexWorker::new(
        Arc::new(ChessComClient::new(&config.user_agent)?),
        FeatureExtractor::new()?,
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
    ));

    let concurrency = config.concurrency;
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut empty_receives = 0;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!("Starting main loop");

    loop {
        // A free slot first, so a polled message never waits on a busy pool.
        let permit = Arc::clone(&semaphore).acquire_owned().await?;

        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, waiting for in-flight work...");
                break;
            }
            result = queue.poll(POLL_TIMEOUT) => match result {
                Ok(Some(queued)) => {
                    empty_receives = 0;
                    let worker = Arc::clone(&worker);
                    let queue = Arc::clone(&queue);

                    tokio::spawn(async move {
                        let _permit = permit; // Hold until done
                        let request_id = queued.message.request_id;

                        match worker.handle(queue.as_ref(), &queued).await {
                            Ok(ProcessOutcome::Completed { games_indexed }) => {
                                info!(request_id, games_indexed, "Request complete");
                            }
                            Ok(ProcessOutcome::Cancelled { games_indexed }) => {
                                info!(request_id, games_indexed, "Request cancelled");
                            }
                            Ok(ProcessOutcome::Failed { error }) => {
                                warn!(request_id, %error, "Request failed");
                            }
                            Err(e) => {
                                // Not acked: redelivered after the visibility timeout.
                                error!(request_id, error = %e, "Request processing failed");
                            }
                        }
                    });
                }
                Ok(None) => {
                    empty_receives += 1;
                    let limit = config.max_empty_receives;
                    if limit > 0 && empty_receives >= limit {
                        info!("No messages after {limit} polls, exiting");
                        break;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to receive messages");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    // Acquire all permits = wait for all tasks to complete
    let _ = semaphore.acquire_many(concurrency as u32).await;
    info!("Graceful shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
