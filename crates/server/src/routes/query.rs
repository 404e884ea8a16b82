use std::sync::Arc;

use axum::{Extension, Json};
use index_worker::controllers::{QueryRequest, QueryResponse};
use index_worker::queue::IndexQueue;

use crate::error::AppError;
use crate::state::{AppState, Store};

/// POST /query
pub async fn run_query<S: Store, Q: IndexQueue + 'static>(
    Extension(state): Extension<Arc<AppState<S, Q>>>,
    Json(body): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    Ok(Json(state.query.query(&body).await?))
}
