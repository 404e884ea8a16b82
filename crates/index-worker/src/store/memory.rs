//! In-memory stores for tests and local runs.

use std::collections::{BTreeMap, HashMap};

use chess_core::{Motif, MotifOccurrence, Side};
use chessql::{Column, CompiledQuery, GameRow};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{FeatureStore, OccurrencesByMotif, PeriodStore, RequestStore, StoredPgn};
use crate::error::StoreError;
use crate::model::{GameFeature, IndexedPeriod, IndexingRequest, RequestStatus};

#[derive(Debug, Clone)]
struct StoredGame {
    feature: GameFeature,
    occurrences: BTreeMap<Motif, Vec<MotifOccurrence>>,
}

impl GameRow for StoredGame {
    fn text(&self, column: Column) -> Option<&str> {
        let f = &self.feature;
        match column {
            Column::WhiteUsername => f.white_username.as_deref(),
            Column::BlackUsername => f.black_username.as_deref(),
            Column::TimeClass => f.time_class.as_deref(),
            Column::Eco => f.eco.as_deref(),
            Column::Result => f.result.as_deref(),
            Column::Platform => Some(&f.platform),
            Column::GameUrl => Some(&f.game_url),
            _ => None,
        }
    }

    fn int(&self, column: Column) -> Option<i64> {
        let f = &self.feature;
        match column {
            Column::WhiteElo => f.white_elo.map(i64::from),
            Column::BlackElo => f.black_elo.map(i64::from),
            Column::NumMoves => Some(i64::from(f.num_moves)),
            _ => None,
        }
    }

    fn timestamp(&self, column: Column) -> Option<DateTime<Utc>> {
        match column {
            Column::PlayedAt => self.feature.played_at,
            _ => None,
        }
    }

    fn has_motif(&self, motif: Motif) -> bool {
        self.feature.has(motif)
    }

    fn occurrence_plies(&self, motif: Motif) -> Vec<(u32, Side)> {
        self.occurrences
            .get(&motif)
            .map(|occs| occs.iter().map(|o| (o.ply, o.side)).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct State {
    games: BTreeMap<String, StoredGame>,
    requests: BTreeMap<i64, IndexingRequest>,
    next_request_id: i64,
    periods: HashMap<(String, String, String), IndexedPeriod>,
}

/// Implements every store trait over process memory. Share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn game_count(&self) -> usize {
        self.state.lock().await.games.len()
    }

    pub async fn get_game(&self, game_url: &str) -> Option<GameFeature> {
        self.state.lock().await.games.get(game_url).map(|g| g.feature.clone())
    }

    pub async fn occurrences(&self, game_url: &str) -> BTreeMap<Motif, Vec<MotifOccurrence>> {
        self.state
            .lock()
            .await
            .games
            .get(game_url)
            .map(|g| g.occurrences.clone())
            .unwrap_or_default()
    }

    /// Overwrite a game's `indexed_at`, for retention tests.
    pub async fn set_indexed_at(&self, game_url: &str, indexed_at: DateTime<Utc>) {
        if let Some(game) = self.state.lock().await.games.get_mut(game_url) {
            game.feature.indexed_at = indexed_at;
        }
    }
}

fn non_empty(
    occurrences: &BTreeMap<Motif, Vec<MotifOccurrence>>,
) -> BTreeMap<Motif, Vec<MotifOccurrence>> {
    occurrences
        .iter()
        .filter(|(_, occs)| !occs.is_empty())
        .map(|(m, occs)| (*m, occs.clone()))
        .collect()
}

impl FeatureStore for MemoryStore {
    async fn upsert(
        &self,
        feature: &GameFeature,
        occurrences: &BTreeMap<Motif, Vec<MotifOccurrence>>,
    ) -> Result<(), StoreError> {
        let stored = StoredGame { feature: feature.clone(), occurrences: non_empty(occurrences) };
        self.state.lock().await.games.insert(feature.game_url.clone(), stored);
        Ok(())
    }

    async fn replace_occurrences(
        &self,
        game_url: &str,
        num_moves: i32,
        occurrences: &BTreeMap<Motif, Vec<MotifOccurrence>>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let Some(game) = state.games.get_mut(game_url) else {
            return Ok(false);
        };
        game.occurrences = non_empty(occurrences);
        game.feature.motifs = game.occurrences.keys().copied().collect();
        game.feature.num_moves = num_moves;
        Ok(true)
    }

    async fn query(
        &self,
        query: &CompiledQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GameFeature>, StoreError> {
        let state = self.state.lock().await;
        let mut matched: Vec<&StoredGame> =
            state.games.values().filter(|g| query.predicate.matches(*g)).collect();
        matched.sort_by(|a, b| query.order.compare(*a, *b));

        Ok(matched
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|g| g.feature.clone())
            .collect())
    }

    async fn query_occurrences(
        &self,
        game_urls: &[String],
    ) -> Result<HashMap<String, OccurrencesByMotif>, StoreError> {
        let state = self.state.lock().await;
        let mut result = HashMap::new();
        for url in game_urls {
            let Some(game) = state.games.get(url) else { continue };
            let by_name: OccurrencesByMotif = game
                .occurrences
                .iter()
                .map(|(motif, occs)| (motif.name().to_string(), occs.clone()))
                .collect();
            result.insert(url.clone(), by_name);
        }
        Ok(result)
    }

    async fn fetch_for_reanalysis(
        &self,
        after: Option<&str>,
        limit: i64,
    ) -> Result<Vec<StoredPgn>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .games
            .values()
            .filter(|g| after.map_or(true, |a| g.feature.game_url.as_str() > a))
            .take(limit.max(0) as usize)
            .map(|g| StoredPgn { game_url: g.feature.game_url.clone(), pgn: g.feature.pgn.clone() })
            .collect())
    }

    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let before = state.games.len();
        state.games.retain(|_, g| g.feature.indexed_at >= threshold);
        Ok((before - state.games.len()) as u64)
    }
}

impl RequestStore for MemoryStore {
    async fn create(
        &self,
        player: &str,
        platform: &str,
        start_month: &str,
        end_month: &str,
    ) -> Result<IndexingRequest, StoreError> {
        let mut state = self.state.lock().await;
        state.next_request_id += 1;
        let now = Utc::now();
        let request = IndexingRequest {
            id: state.next_request_id,
            player: player.to_string(),
            platform: platform.to_string(),
            start_month: start_month.to_string(),
            end_month: end_month.to_string(),
            status: RequestStatus::Pending,
            games_indexed: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
        };
        state.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<IndexingRequest>, StoreError> {
        Ok(self.state.lock().await.requests.get(&id).cloned())
    }

    async fn find_active(
        &self,
        player: &str,
        platform: &str,
        start_month: &str,
        end_month: &str,
    ) -> Result<Option<IndexingRequest>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .requests
            .values()
            .rev()
            .find(|r| {
                r.status.is_active()
                    && r.player == player
                    && r.platform == platform
                    && r.start_month == start_month
                    && r.end_month == end_month
            })
            .cloned())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<IndexingRequest>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.requests.values().rev().take(limit.max(0) as usize).cloned().collect())
    }

    async fn update_status(
        &self,
        id: i64,
        status: RequestStatus,
        error_message: Option<&str>,
        games_indexed: i32,
    ) -> Result<(), StoreError> {
        if let Some(request) = self.state.lock().await.requests.get_mut(&id) {
            request.status = status;
            request.error_message = error_message.map(String::from);
            request.games_indexed = games_indexed;
            request.updated_at = Utc::now();
        }
        Ok(())
    }
}

impl PeriodStore for MemoryStore {
    async fn find_complete_period(
        &self,
        player: &str,
        platform: &str,
        month: &str,
    ) -> Result<Option<IndexedPeriod>, StoreError> {
        let key = (player.to_string(), platform.to_string(), month.to_string());
        Ok(self.state.lock().await.periods.get(&key).filter(|p| p.is_complete).cloned())
    }

    async fn upsert_period(&self, period: &IndexedPeriod) -> Result<(), StoreError> {
        let key = (period.player.clone(), period.platform.clone(), period.month.clone());
        self.state.lock().await.periods.insert(key, period.clone());
        Ok(())
    }

    async fn delete_fetched_before(&self, threshold: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let before = state.periods.len();
        state.periods.retain(|_, p| p.fetched_at >= threshold);
        Ok((before - state.periods.len()) as u64)
    }
}
