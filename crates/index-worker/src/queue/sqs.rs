//! SQS-backed queue for indexing jobs

use std::time::Duration;

use aws_sdk_sqs::Client;
use tracing::{debug, warn};

use super::{IndexQueue, QueuedMessage};
use crate::error::QueueError;
use crate::model::IndexMessage;

#[derive(Clone)]
pub struct SqsQueue {
    client: Client,
    queue_url: String,
    visibility_timeout: i32,
}

impl SqsQueue {
    /// `endpoint_url` points at LocalStack in local development.
    pub async fn connect(
        queue_url: &str,
        endpoint_url: Option<&str>,
        visibility_timeout_secs: u32,
    ) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let client = if let Some(endpoint) = endpoint_url {
            let sqs_config = aws_sdk_sqs::config::Builder::from(&aws_config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(sqs_config)
        } else {
            Client::new(&aws_config)
        };

        Self {
            client,
            queue_url: queue_url.to_string(),
            visibility_timeout: i32::try_from(visibility_timeout_secs).unwrap_or(i32::MAX),
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

impl IndexQueue for SqsQueue {
    async fn push(&self, message: &IndexMessage) -> Result<(), QueueError> {
        let body = serde_json::to_string(message)?;
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| QueueError::Sqs(format!("Failed to send message: {e}")))?;

        debug!(request_id = message.request_id, "Queued indexing job");
        Ok(())
    }

    async fn poll(&self, timeout: Duration) -> Result<Option<QueuedMessage>, QueueError> {
        // SQS long polling caps at 20 seconds.
        let wait = timeout.as_secs().min(20) as i32;
        let response = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(1)
            .wait_time_seconds(wait)
            .visibility_timeout(self.visibility_timeout)
            .send()
            .await
            .map_err(|e| QueueError::Sqs(format!("Failed to receive message: {e}")))?;

        let Some(msg) = response.messages().first() else {
            return Ok(None);
        };
        let (Some(body), Some(receipt)) = (msg.body(), msg.receipt_handle()) else {
            return Ok(None);
        };

        match serde_json::from_str::<IndexMessage>(body) {
            Ok(message) => {
                debug!(request_id = message.request_id, "Received message");
                Ok(Some(QueuedMessage { message, receipt_handle: receipt.to_string() }))
            }
            Err(e) => {
                // Poison message: drop it so it is not redelivered forever.
                warn!(error = %e, body, "Discarding undecodable message");
                self.delete(receipt).await?;
                Ok(None)
            }
        }
    }

    async fn ack(&self, message: &QueuedMessage) -> Result<(), QueueError> {
        self.delete(&message.receipt_handle).await
    }
}

impl SqsQueue {
    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| QueueError::Sqs(format!("Failed to delete message: {e}")))?;

        debug!("Deleted message");
        Ok(())
    }
}
