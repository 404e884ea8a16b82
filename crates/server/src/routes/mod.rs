pub mod admin;
pub mod health;
pub mod index;
pub mod query;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use index_worker::queue::IndexQueue;

use crate::state::{AppState, Store};

pub fn router<S: Store, Q: IndexQueue + 'static>(state: Arc<AppState<S, Q>>) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Indexing requests
        .route(
            "/index",
            post(index::create_index::<S, Q>).get(index::list_requests::<S, Q>),
        )
        .route(
            "/index/{id}",
            get(index::get_index::<S, Q>).delete(index::cancel_index::<S, Q>),
        )
        // ChessQL
        .route("/query", post(query::run_query::<S, Q>))
        // Admin
        .route("/admin/reanalyze", post(admin::reanalyze::<S, Q>))
        .layer(Extension(state))
}
