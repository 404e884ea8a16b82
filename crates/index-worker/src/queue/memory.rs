use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Notify};

use super::{IndexQueue, QueuedMessage};
use crate::error::QueueError;
use crate::model::IndexMessage;

/// FIFO queue held in process memory. A polled message is gone; `ack` is a no-op.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    pending: Mutex<VecDeque<IndexMessage>>,
    notify: Notify,
    next_receipt: AtomicU64,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    async fn pop(&self) -> Option<QueuedMessage> {
        let message = self.pending.lock().await.pop_front()?;
        let n = self.next_receipt.fetch_add(1, Ordering::Relaxed);
        Some(QueuedMessage { message, receipt_handle: format!("mem-{n}") })
    }
}

impl IndexQueue for InMemoryQueue {
    async fn push(&self, message: &IndexMessage) -> Result<(), QueueError> {
        self.pending.lock().await.push_back(message.clone());
        self.notify.notify_one();
        Ok(())
    }

    async fn poll(&self, timeout: Duration) -> Result<Option<QueuedMessage>, QueueError> {
        if let Some(queued) = self.pop().await {
            return Ok(Some(queued));
        }
        let _ = tokio::time::timeout(timeout, self.notify.notified()).await;
        Ok(self.pop().await)
    }

    async fn ack(&self, _message: &QueuedMessage) -> Result<(), QueueError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn message(id: i64) -> IndexMessage {
        IndexMessage {
            request_id: id,
            player: "hikaru".into(),
            platform: "CHESS_COM".into(),
            start_month: "2024-01".into(),
            end_month: "2024-01".into(),
        }
    }

    #[tokio::test]
    async fn test_poll_in_push_order() {
        let queue = InMemoryQueue::new();
        queue.push(&message(1)).await.unwrap();
        queue.push(&message(2)).await.unwrap();
        assert_eq!(queue.len().await, 2);

        let first = queue.poll(Duration::from_millis(10)).await.unwrap().unwrap();
        let second = queue.poll(Duration::from_millis(10)).await.unwrap().unwrap();
        assert_eq!(first.message.request_id, 1);
        assert_eq!(second.message.request_id, 2);
        assert_ne!(first.receipt_handle, second.receipt_handle);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_idle_poll_returns_none() {
        let queue = InMemoryQueue::new();
        assert!(queue.poll(Duration::from_millis(10)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_poll_wakes_on_push() {
        let queue = Arc::new(InMemoryQueue::new());
        let sender = Arc::clone(&queue);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            sender.push(&message(7)).await.unwrap();
        });

        let polled = queue.poll(Duration::from_secs(5)).await.unwrap();
        handle.await.unwrap();
        assert_eq!(polled.map(|q| q.message.request_id), Some(7));
    }
}
