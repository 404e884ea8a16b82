//! Storage contracts for indexed games, indexing requests and fetched periods.
//!
//! Methods return `impl Future + Send` so the worker's futures stay `Send`
//! for `tokio::spawn`. Postgres and in-memory backends implement every trait.

mod memory;
mod postgres;
pub mod schema;

use std::collections::{BTreeMap, HashMap};
use std::future::Future;

use chess_core::{Motif, MotifOccurrence};
use chessql::CompiledQuery;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::model::{GameFeature, IndexedPeriod, IndexingRequest, RequestStatus};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Occurrences of one game keyed by lowercase motif name.
pub type OccurrencesByMotif = BTreeMap<String, Vec<MotifOccurrence>>;

/// A stored game's URL and PGN, for re-analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPgn {
    pub game_url: String,
    pub pgn: String,
}

pub trait FeatureStore: Send + Sync {
    /// Insert or replace a game and all of its occurrences in one transaction.
    /// Presence flags are taken from `feature.motifs`.
    fn upsert(
        &self,
        feature: &GameFeature,
        occurrences: &BTreeMap<Motif, Vec<MotifOccurrence>>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Replace a stored game's occurrences, presence flags and move count.
    /// Returns false when no game with that URL exists.
    fn replace_occurrences(
        &self,
        game_url: &str,
        num_moves: i32,
        occurrences: &BTreeMap<Motif, Vec<MotifOccurrence>>,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn query(
        &self,
        query: &CompiledQuery,
        limit: i64,
        offset: i64,
    ) -> impl Future<Output = Result<Vec<GameFeature>, StoreError>> + Send;

    fn query_occurrences(
        &self,
        game_urls: &[String],
    ) -> impl Future<Output = Result<HashMap<String, OccurrencesByMotif>, StoreError>> + Send;

    /// Up to `limit` games ordered by URL, strictly after `after`.
    fn fetch_for_reanalysis(
        &self,
        after: Option<&str>,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<StoredPgn>, StoreError>> + Send;

    /// Delete games (and their occurrences) indexed before `threshold`.
    fn delete_older_than(
        &self,
        threshold: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

pub trait RequestStore: Send + Sync {
    fn create(
        &self,
        player: &str,
        platform: &str,
        start_month: &str,
        end_month: &str,
    ) -> impl Future<Output = Result<IndexingRequest, StoreError>> + Send;

    fn find_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<IndexingRequest>, StoreError>> + Send;

    /// Most recent pending or running request for the same player and range.
    fn find_active(
        &self,
        player: &str,
        platform: &str,
        start_month: &str,
        end_month: &str,
    ) -> impl Future<Output = Result<Option<IndexingRequest>, StoreError>> + Send;

    fn list_recent(
        &self,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<IndexingRequest>, StoreError>> + Send;

    fn update_status(
        &self,
        id: i64,
        status: RequestStatus,
        error_message: Option<&str>,
        games_indexed: i32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

pub trait PeriodStore: Send + Sync {
    fn find_complete_period(
        &self,
        player: &str,
        platform: &str,
        month: &str,
    ) -> impl Future<Output = Result<Option<IndexedPeriod>, StoreError>> + Send;

    fn upsert_period(
        &self,
        period: &IndexedPeriod,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Forget periods fetched before `threshold` so they are fetched again.
    fn delete_fetched_before(
        &self,
        threshold: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}
