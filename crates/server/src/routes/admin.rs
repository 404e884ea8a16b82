use std::sync::Arc;

use axum::{Extension, Json};
use index_worker::controllers::ReanalysisResponse;
use index_worker::queue::IndexQueue;

use crate::error::AppError;
use crate::state::{AppState, Store};

/// POST /admin/reanalyze
///
/// Synchronous: returns once every stored game has been re-run.
pub async fn reanalyze<S: Store, Q: IndexQueue + 'static>(
    Extension(state): Extension<Arc<AppState<S, Q>>>,
) -> Result<Json<ReanalysisResponse>, AppError> {
    Ok(Json(state.reanalysis.reanalyze().await?))
}
