//! Indexing job queue: SQS in deployment, in-memory for tests and local runs.

mod memory;
mod sqs;

use std::future::Future;
use std::time::Duration;

use crate::error::QueueError;
use crate::model::IndexMessage;

pub use memory::InMemoryQueue;
pub use sqs::SqsQueue;

/// A received job plus the handle needed to acknowledge it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub message: IndexMessage,
    pub receipt_handle: String,
}

pub trait IndexQueue: Send + Sync {
    fn push(&self, message: &IndexMessage) -> impl Future<Output = Result<(), QueueError>> + Send;

    /// Wait up to `timeout` for one message. `None` means the queue is idle.
    fn poll(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<QueuedMessage>, QueueError>> + Send;

    /// Remove a processed message so it is not delivered again.
    fn ack(&self, message: &QueuedMessage) -> impl Future<Output = Result<(), QueueError>> + Send;
}
