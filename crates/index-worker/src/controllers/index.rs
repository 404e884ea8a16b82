use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ControllerError, ValidationError};
use crate::model::{IndexMessage, IndexingRequest, RequestStatus, YearMonth};
use crate::queue::IndexQueue;
use crate::store::RequestStore;

pub const SUPPORTED_PLATFORM: &str = "CHESS_COM";
const MAX_MONTHS: i64 = 12;
const LIST_LIMIT: i64 = 50;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRequest {
    pub player: Option<String>,
    pub platform: Option<String>,
    pub start_month: Option<String>,
    pub end_month: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    pub id: i64,
    pub status: RequestStatus,
    pub games_indexed: i32,
    pub error_message: Option<String>,
}

impl From<IndexingRequest> for IndexResponse {
    fn from(request: IndexingRequest) -> Self {
        Self {
            id: request.id,
            status: request.status,
            games_indexed: request.games_indexed,
            error_message: request.error_message,
        }
    }
}

/// A request that passed validation, normalised for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ValidIndexRequest {
    player: String,
    platform: &'static str,
    start: YearMonth,
    end: YearMonth,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::new(format!("{field} is required"))),
    }
}

fn parse_month(value: &Option<String>, field: &str) -> Result<YearMonth, ValidationError> {
    let value = required(value, field)?;
    value.parse().map_err(|_| {
        ValidationError::new(format!("{field} must be in YYYY-MM format, got: {value}"))
    })
}

fn validate(request: &IndexRequest) -> Result<ValidIndexRequest, ValidationError> {
    let player = required(&request.player, "player")?;
    let platform = required(&request.platform, "platform")?;
    if !platform.eq_ignore_ascii_case(SUPPORTED_PLATFORM) {
        return Err(ValidationError::new(format!(
            "Unsupported platform: {platform}. Supported: {SUPPORTED_PLATFORM}"
        )));
    }

    let start = parse_month(&request.start_month, "startMonth")?;
    let end = parse_month(&request.end_month, "endMonth")?;
    if start > end {
        return Err(ValidationError::new("startMonth must not be after endMonth"));
    }
    let span = start.span(end);
    if span > MAX_MONTHS {
        return Err(ValidationError::new(format!(
            "Maximum range is {MAX_MONTHS} months, got {span}"
        )));
    }

    Ok(ValidIndexRequest {
        player: player.to_lowercase(),
        platform: SUPPORTED_PLATFORM,
        start,
        end,
    })
}

pub struct IndexController<R, Q> {
    requests: Arc<R>,
    queue: Option<Arc<Q>>,
}

impl<R: RequestStore, Q: IndexQueue> IndexController<R, Q> {
    /// Without a queue, requests are recorded but nothing picks them up.
    pub fn new(requests: Arc<R>, queue: Option<Arc<Q>>) -> Self {
        Self { requests, queue }
    }

    pub async fn create_index(
        &self,
        request: &IndexRequest,
    ) -> Result<IndexResponse, ControllerError> {
        let valid = validate(request)?;
        let start = valid.start.to_string();
        let end = valid.end.to_string();

        info!(
            player = %valid.player,
            platform = valid.platform,
            start = %start,
            end = %end,
            "POST /index"
        );

        if let Some(existing) =
            self.requests.find_active(&valid.player, valid.platform, &start, &end).await?
        {
            info!(request_id = existing.id, "Returning in-flight request");
            return Ok(existing.into());
        }

        let created = self.requests.create(&valid.player, valid.platform, &start, &end).await?;

        let Some(queue) = &self.queue else {
            warn!(request_id = created.id, "No queue configured; request will not be processed");
            return Ok(created.into());
        };

        let message = IndexMessage {
            request_id: created.id,
            player: created.player.clone(),
            platform: created.platform.clone(),
            start_month: start,
            end_month: end,
        };
        if let Err(e) = queue.push(&message).await {
            let reason = format!("Failed to enqueue: {e}");
            self.requests
                .update_status(created.id, RequestStatus::Failed, Some(&reason), 0)
                .await?;
            return Err(e.into());
        }

        Ok(created.into())
    }

    pub async fn get_index(&self, id: i64) -> Result<IndexResponse, ControllerError> {
        self.requests
            .find_by_id(id)
            .await?
            .map(IndexResponse::from)
            .ok_or(ControllerError::NotFound(id))
    }

    /// Most recent requests first.
    pub async fn list_requests(&self) -> Result<Vec<IndexingRequest>, ControllerError> {
        Ok(self.requests.list_recent(LIST_LIMIT).await?)
    }

    /// Cancel a pending or running request. Finished requests are returned unchanged.
    pub async fn cancel(&self, id: i64) -> Result<IndexResponse, ControllerError> {
        let request = self.requests.find_by_id(id).await?.ok_or(ControllerError::NotFound(id))?;
        if !request.status.is_active() {
            return Ok(request.into());
        }

        self.requests
            .update_status(id, RequestStatus::Cancelled, None, request.games_indexed)
            .await?;
        info!(request_id = id, "Indexing request cancelled");
        Ok(IndexResponse { status: RequestStatus::Cancelled, ..request.into() })
    }
}
