//! Request handling shared by the HTTP server and tests: validation, then
//! calls into the stores and the queue.

mod index;
mod query;
mod reanalysis;

pub use index::{IndexController, IndexRequest, IndexResponse, SUPPORTED_PLATFORM};
pub use query::{
    GameResult, QueryController, QueryRequest, QueryResponse, DEFAULT_LIMIT, MAX_LIMIT,
    MAX_QUERY_LENGTH,
};
pub use reanalysis::{ReanalysisController, ReanalysisResponse, BATCH_SIZE};
