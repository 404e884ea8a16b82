use std::sync::Arc;

use chess_analyzers::FeatureExtractor;
use index_worker::controllers::{IndexController, QueryController, ReanalysisController};
use index_worker::queue::IndexQueue;
use index_worker::store::{FeatureStore, RequestStore};

/// Storage the HTTP surface needs: games for queries, requests for indexing.
pub trait Store: FeatureStore + RequestStore + 'static {}

impl<T: FeatureStore + RequestStore + 'static> Store for T {}

pub struct AppState<S, Q> {
    pub index: IndexController<S, Q>,
    pub query: QueryController<S>,
    pub reanalysis: ReanalysisController<S>,
}

impl<S: Store, Q: IndexQueue + 'static> AppState<S, Q> {
    pub fn new(store: Arc<S>, queue: Option<Arc<Q>>, extractor: Arc<FeatureExtractor>) -> Self {
        Self {
            index: IndexController::new(Arc::clone(&store), queue),
            query: QueryController::new(Arc::clone(&store)),
            reanalysis: ReanalysisController::new(store, extractor),
        }
    }
}
