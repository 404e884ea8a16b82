use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use index_worker::controllers::{IndexRequest, IndexResponse};
use index_worker::model::IndexingRequest;
use index_worker::queue::IndexQueue;

use crate::error::AppError;
use crate::state::{AppState, Store};

/// POST /index
pub async fn create_index<S: Store, Q: IndexQueue + 'static>(
    Extension(state): Extension<Arc<AppState<S, Q>>>,
    Json(body): Json<IndexRequest>,
) -> Result<Json<IndexResponse>, AppError> {
    Ok(Json(state.index.create_index(&body).await?))
}

/// GET /index
pub async fn list_requests<S: Store, Q: IndexQueue + 'static>(
    Extension(state): Extension<Arc<AppState<S, Q>>>,
) -> Result<Json<Vec<IndexingRequest>>, AppError> {
    Ok(Json(state.index.list_requests().await?))
}

/// GET /index/{id}
pub async fn get_index<S: Store, Q: IndexQueue + 'static>(
    Extension(state): Extension<Arc<AppState<S, Q>>>,
    Path(id): Path<i64>,
) -> Result<Json<IndexResponse>, AppError> {
    Ok(Json(state.index.get_index(id).await?))
}

/// DELETE /index/{id}
pub async fn cancel_index<S: Store, Q: IndexQueue + 'static>(
    Extension(state): Extension<Arc<AppState<S, Q>>>,
    Path(id): Path<i64>,
) -> Result<Json<IndexResponse>, AppError> {
    Ok(Json(state.index.cancel(id).await?))
}
