//! Error types for indexing, storage and queries

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    CorruptTag(#[from] chess_core::TagError),

    #[error("Corrupt row: {0}")]
    CorruptStatus(#[from] UnknownStatus),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown request status: {0}")]
pub struct UnknownStatus(pub String);

#[derive(Error, Debug)]
pub enum GameSourceError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("SQS error: {0}")]
    Sqs(String),

    #[error("Invalid message body: {0}")]
    InvalidMessage(#[from] serde_json::Error),

    #[error("Queue closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("Secrets Manager error: {0}")]
    SecretsManager(String),

    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    #[error("Indexing request not found: {0}")]
    RequestNotFound(i64),

    #[error("Extractor setup failed: {0}")]
    Extractor(#[from] regex::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Source(#[from] GameSourceError),
}

/// Request rejected before any work was done. The message is shown to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failures surfaced by the controllers.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Query(#[from] chessql::ChessQlError),

    #[error("Indexing request not found: {0}")]
    NotFound(i64),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}
