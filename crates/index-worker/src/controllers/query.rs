use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ControllerError, ValidationError};
use crate::model::GameFeature;
use crate::store::{FeatureStore, OccurrencesByMotif};

pub const MAX_QUERY_LENGTH: usize = 4096;
pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    pub query: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A matching game with its occurrences keyed by lowercase motif name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameResult {
    #[serde(flatten)]
    pub game: GameFeature,
    pub occurrences: OccurrencesByMotif,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResponse {
    pub games: Vec<GameResult>,
    pub count: usize,
}

fn validate(request: &QueryRequest) -> Result<(&str, i64, i64), ValidationError> {
    let query = request.query.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ValidationError::new("query is required"));
    }
    if query.chars().count() > MAX_QUERY_LENGTH {
        return Err(ValidationError::new(format!(
            "query must be at most {MAX_QUERY_LENGTH} characters"
        )));
    }

    let limit = request.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ValidationError::new(format!("limit must be between 1 and {MAX_LIMIT}")));
    }
    let offset = request.offset.unwrap_or(0);
    if offset < 0 {
        return Err(ValidationError::new("offset must not be negative"));
    }
    Ok((query, limit, offset))
}

pub struct QueryController<F> {
    features: Arc<F>,
}

impl<F: FeatureStore> QueryController<F> {
    pub fn new(features: Arc<F>) -> Self {
        Self { features }
    }

    /// Compile and run a ChessQL query. Text is validated before compiling.
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ControllerError> {
        let (text, limit, offset) = validate(request)?;
        let compiled = chessql::compile_str(text)?;
        info!(query = text, limit, offset, "POST /query");

        let games = self.features.query(&compiled, limit, offset).await?;
        let urls: Vec<String> = games.iter().map(|g| g.game_url.clone()).collect();
        let mut occurrences = self.features.query_occurrences(&urls).await?;

        let games: Vec<GameResult> = games
            .into_iter()
            .map(|game| {
                let occurrences = occurrences.remove(&game.game_url).unwrap_or_default();
                GameResult { game, occurrences }
            })
            .collect();

        Ok(QueryResponse { count: games.len(), games })
    }
}
