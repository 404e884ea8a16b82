//! Indexes one request: fetch each month, extract motifs per game, store.

use std::sync::Arc;

use chess_analyzers::{FeatureExtractor, GameFeatures};
use chess_core::pgn::extract_header;
use chess_core::PlayedGame;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::error::WorkerError;
use crate::model::{GameFeature, IndexMessage, IndexedPeriod, RequestStatus, YearMonth};
use crate::queue::{IndexQueue, QueuedMessage};
use crate::result_mapper::map_result;
use crate::source::GameSource;
use crate::store::{FeatureStore, PeriodStore, RequestStore};

/// How a request ended. Storage failures while recording the status itself
/// surface as `Err` from [`IndexWorker::process`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Completed { games_indexed: i32 },
    Cancelled { games_indexed: i32 },
    Failed { error: String },
}

pub struct IndexWorker<S, F, R, P> {
    source: Arc<S>,
    extractor: FeatureExtractor,
    features: Arc<F>,
    requests: Arc<R>,
    periods: Arc<P>,
}

enum GameResult {
    Indexed,
    Skipped,
}

impl<S, F, R, P> IndexWorker<S, F, R, P>
where
    S: GameSource,
    F: FeatureStore,
    R: RequestStore,
    P: PeriodStore,
{
    pub fn new(
        source: Arc<S>,
        extractor: FeatureExtractor,
        features: Arc<F>,
        requests: Arc<R>,
        periods: Arc<P>,
    ) -> Self {
        Self { source, extractor, features, requests, periods }
    }

    /// Process a message to completion and record the final status.
    pub async fn process(&self, message: &IndexMessage) -> Result<ProcessOutcome, WorkerError> {
        let mut games_indexed = 0;
        match self.run(message, &mut games_indexed).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let reason = e.to_string();
                error!(request_id = message.request_id, error = %reason, "Indexing failed");
                self.requests
                    .update_status(
                        message.request_id,
                        RequestStatus::Failed,
                        Some(&reason),
                        games_indexed,
                    )
                    .await?;
                Ok(ProcessOutcome::Failed { error: reason })
            }
        }
    }

    /// Process a queued message and ack it once its outcome is recorded.
    /// Unrecorded failures leave the message for redelivery.
    pub async fn handle<Q: IndexQueue>(
        &self,
        queue: &Q,
        queued: &QueuedMessage,
    ) -> Result<ProcessOutcome, WorkerError> {
        let outcome = self.process(&queued.message).await?;
        queue.ack(queued).await?;
        Ok(outcome)
    }

    async fn run(
        &self,
        message: &IndexMessage,
        games_indexed: &mut i32,
    ) -> Result<ProcessOutcome, WorkerError> {
        let request_id = message.request_id;
        let player = message.player.as_str();
        let platform = message.platform.as_str();
        let start: YearMonth = message.start_month.parse()?;
        let end: YearMonth = message.end_month.parse()?;

        if self.is_cancelled(request_id).await? {
            return Ok(self.cancelled(request_id, 0));
        }
        info!(request_id, player, start = %start, end = %end, "Indexing request started");
        self.requests.update_status(request_id, RequestStatus::Running, None, 0).await?;

        let current = YearMonth::current();

        for month in start.through(end) {
            if self.is_cancelled(request_id).await? {
                return Ok(self.cancelled(request_id, *games_indexed));
            }

            let month_key = month.to_string();
            if let Some(period) =
                self.periods.find_complete_period(player, platform, &month_key).await?
            {
                debug!(
                    request_id,
                    month = %month_key,
                    games = period.games_count,
                    "Month already indexed"
                );
                *games_indexed += period.games_count;
                continue;
            }

            let games = match self.source.fetch_games(player, month).await {
                Ok(Some(games)) => games,
                Ok(None) => {
                    info!(request_id, player, month = %month_key, "No games for month");
                    continue;
                }
                Err(e) => {
                    // Left incomplete so the next request retries it.
                    warn!(request_id, player, month = %month_key, error = %e, "Fetch failed");
                    continue;
                }
            };

            let mut month_count = 0;
            for game in &games {
                if self.is_cancelled(request_id).await? {
                    return Ok(self.cancelled(request_id, *games_indexed));
                }
                if let GameResult::Indexed = self.index_game(message, game).await? {
                    month_count += 1;
                    *games_indexed += 1;
                }
            }

            if month < current {
                self.periods
                    .upsert_period(&IndexedPeriod {
                        player: player.to_string(),
                        platform: platform.to_string(),
                        month: month_key.clone(),
                        fetched_at: Utc::now(),
                        is_complete: true,
                        games_count: month_count,
                    })
                    .await?;
            }

            info!(request_id, month = %month_key, games = month_count, "Month indexed");
            self.requests
                .update_status(request_id, RequestStatus::Running, None, *games_indexed)
                .await?;
        }

        self.requests
            .update_status(request_id, RequestStatus::Completed, None, *games_indexed)
            .await?;
        info!(request_id, games_indexed = *games_indexed, "Indexing request completed");
        Ok(ProcessOutcome::Completed { games_indexed: *games_indexed })
    }

    async fn is_cancelled(&self, request_id: i64) -> Result<bool, WorkerError> {
        let request = self.requests.find_by_id(request_id).await?;
        Ok(request.is_some_and(|r| r.status == RequestStatus::Cancelled))
    }

    fn cancelled(&self, request_id: i64, games_indexed: i32) -> ProcessOutcome {
        info!(request_id, games_indexed, "Indexing request cancelled");
        ProcessOutcome::Cancelled { games_indexed }
    }

    async fn index_game(
        &self,
        message: &IndexMessage,
        game: &PlayedGame,
    ) -> Result<GameResult, WorkerError> {
        if game.rules != "chess" {
            debug!(game_url = %game.url, rules = %game.rules, "Skipping variant game");
            return Ok(GameResult::Skipped);
        }

        let extracted = match self.extractor.extract(&game.pgn) {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!(game_url = %game.url, error = %e, "Skipping unparseable game");
                return Ok(GameResult::Skipped);
            }
        };

        let feature = build_feature(game, &extracted, message, Utc::now());
        self.features.upsert(&feature, &extracted.occurrences).await?;
        Ok(GameResult::Indexed)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Row for one played game. ECO comes from the PGN header when present.
pub fn build_feature(
    game: &PlayedGame,
    extracted: &GameFeatures,
    message: &IndexMessage,
    indexed_at: DateTime<Utc>,
) -> GameFeature {
    let eco = extract_header(&game.pgn, "ECO").or_else(|| game.eco.as_deref().and_then(non_empty));

    GameFeature {
        game_url: game.url.clone(),
        request_id: Some(message.request_id),
        platform: message.platform.clone(),
        white_username: non_empty(&game.white.username),
        black_username: non_empty(&game.black.username),
        white_elo: (game.white.rating > 0).then_some(game.white.rating),
        black_elo: (game.black.rating > 0).then_some(game.black.rating),
        time_class: non_empty(&game.time_class),
        eco,
        result: Some(map_result(&game.white.result, &game.black.result).to_string()),
        played_at: (game.end_time > 0)
            .then(|| DateTime::from_timestamp(game.end_time, 0))
            .flatten(),
        num_moves: i32::try_from(extracted.num_moves).unwrap_or(i32::MAX),
        motifs: extracted
            .occurrences
            .iter()
            .filter(|(_, occs)| !occs.is_empty())
            .map(|(motif, _)| *motif)
            .collect(),
        pgn: game.pgn.clone(),
        indexed_at,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    use chess_core::{Motif, MotifOccurrence, PlayerResult};
    use chessql::CompiledQuery;

    use super::*;
    use crate::error::{GameSourceError, StoreError};
    use crate::store::{MemoryStore, OccurrencesByMotif, StoredPgn};

    const SCHOLARS_MATE: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[White "White"]
[Black "Black"]
[Result "1-0"]
[ECO "C20"]

1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0
"#;

    #[derive(Default)]
    struct FakeSource {
        responses: HashMap<YearMonth, Vec<PlayedGame>>,
        failing: Vec<YearMonth>,
        calls: Mutex<Vec<YearMonth>>,
    }

    enum UpsertHook {
        /// Cancel the request right after storing a game, the way a concurrent
        /// DELETE /index would.
        Cancel(i64),
        /// Fail the write for this game URL.
        Fail(&'static str),
    }

    struct HookedFeatures {
        inner: Arc<MemoryStore>,
        hook: UpsertHook,
    }

    impl FeatureStore for HookedFeatures {
        async fn upsert(
            &self,
            feature: &GameFeature,
            occurrences: &BTreeMap<Motif, Vec<MotifOccurrence>>,
        ) -> Result<(), StoreError> {
            match self.hook {
                UpsertHook::Cancel(request_id) => {
                    self.inner.upsert(feature, occurrences).await?;
                    self.inner.update_status(request_id, RequestStatus::Cancelled, None, 0).await
                }
                UpsertHook::Fail(url) if feature.game_url == url => {
                    Err(StoreError::Database(sqlx::Error::PoolTimedOut))
                }
                UpsertHook::Fail(_) => self.inner.upsert(feature, occurrences).await,
            }
        }

        async fn replace_occurrences(
            &self,
            game_url: &str,
            num_moves: i32,
            occurrences: &BTreeMap<Motif, Vec<MotifOccurrence>>,
        ) -> Result<bool, StoreError> {
            self.inner.replace_occurrences(game_url, num_moves, occurrences).await
        }

        async fn query(
            &self,
            query: &CompiledQuery,
            limit: i64,
            offset: i64,
        ) -> Result<Vec<GameFeature>, StoreError> {
            self.inner.query(query, limit, offset).await
        }

        async fn query_occurrences(
            &self,
            game_urls: &[String],
        ) -> Result<HashMap<String, OccurrencesByMotif>, StoreError> {
            self.inner.query_occurrences(game_urls).await
        }

        async fn fetch_for_reanalysis(
            &self,
            after: Option<&str>,
            limit: i64,
        ) -> Result<Vec<StoredPgn>, StoreError> {
            self.inner.fetch_for_reanalysis(after, limit).await
        }

        async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, StoreError> {
            FeatureStore::delete_older_than(self.inner.as_ref(), threshold).await
        }
    }

    impl FakeSource {
        fn calls(&self) -> Vec<YearMonth> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GameSource for FakeSource {
        async fn fetch_games(
            &self,
            _player: &str,
            month: YearMonth,
        ) -> Result<Option<Vec<PlayedGame>>, GameSourceError> {
            self.calls.lock().unwrap().push(month);
            if self.failing.contains(&month) {
                return Err(GameSourceError::Status { status: 503, url: month.to_string() });
            }
            Ok(self.responses.get(&month).cloned())
        }
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn played(url: &str, pgn: &str) -> PlayedGame {
        PlayedGame {
            url: url.to_string(),
            pgn: pgn.to_string(),
            end_time: 1_704_200_000,
            rated: true,
            time_class: "blitz".into(),
            rules: "chess".into(),
            eco: Some("https://www.chess.com/openings/Kings-Pawn".into()),
            white: PlayerResult { rating: 1500, result: "win".into(), username: "White".into() },
            black: PlayerResult {
                rating: 1480,
                result: "checkmated".into(),
                username: "Black".into(),
            },
        }
    }

    type TestWorker = IndexWorker<FakeSource, MemoryStore, MemoryStore, MemoryStore>;

    fn worker(source: FakeSource) -> (TestWorker, Arc<FakeSource>, Arc<MemoryStore>) {
        let source = Arc::new(source);
        let store = Arc::new(MemoryStore::new());
        let worker = IndexWorker::new(
            Arc::clone(&source),
            FeatureExtractor::new().unwrap(),
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
        );
        (worker, source, store)
    }

    async fn message(store: &MemoryStore, start: &str, end: &str) -> IndexMessage {
        let request = store.create("testplayer", "CHESS_COM", start, end).await.unwrap();
        IndexMessage {
            request_id: request.id,
            player: request.player,
            platform: request.platform,
            start_month: request.start_month,
            end_month: request.end_month,
        }
    }

    fn cached(month: &str, games_count: i32) -> IndexedPeriod {
        IndexedPeriod {
            player: "testplayer".into(),
            platform: "CHESS_COM".into(),
            month: month.into(),
            fetched_at: DateTime::UNIX_EPOCH,
            is_complete: true,
            games_count,
        }
    }

    #[tokio::test]
    async fn test_cached_period_is_not_fetched() {
        let (worker, source, store) = worker(FakeSource::default());
        store.upsert_period(&cached("2024-01", 7)).await.unwrap();
        let msg = message(&store, "2024-01", "2024-02").await;

        let outcome = worker.process(&msg).await.unwrap();

        assert_eq!(source.calls(), vec![ym("2024-02")]);
        assert_eq!(outcome, ProcessOutcome::Completed { games_indexed: 7 });
        let request = store.find_by_id(msg.request_id).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Completed);
        assert_eq!(request.games_indexed, 7);
    }

    #[tokio::test]
    async fn test_cached_middle_month_is_skipped() {
        let (worker, source, store) = worker(FakeSource::default());
        store.upsert_period(&cached("2024-02", 5)).await.unwrap();
        let msg = message(&store, "2024-01", "2024-03").await;

        let outcome = worker.process(&msg).await.unwrap();

        assert_eq!(source.calls(), vec![ym("2024-01"), ym("2024-03")]);
        assert_eq!(outcome, ProcessOutcome::Completed { games_indexed: 5 });
    }

    #[tokio::test]
    async fn test_indexes_games_with_occurrences() {
        let mut source = FakeSource::default();
        source
            .responses
            .insert(ym("2024-01"), vec![played("https://chess.com/game/1", SCHOLARS_MATE)]);
        let (worker, _, store) = worker(source);
        let msg = message(&store, "2024-01", "2024-01").await;

        let outcome = worker.process(&msg).await.unwrap();
        assert_eq!(outcome, ProcessOutcome::Completed { games_indexed: 1 });

        let game = store.get_game("https://chess.com/game/1").await.unwrap();
        assert!(game.has(Motif::Check));
        assert!(game.has(Motif::Checkmate));
        assert_eq!(game.eco.as_deref(), Some("C20"));
        assert_eq!(game.result.as_deref(), Some("1-0"));
        assert_eq!(game.num_moves, 4);
        assert_eq!(game.request_id, Some(msg.request_id));

        let occurrences = store.occurrences("https://chess.com/game/1").await;
        let mate = &occurrences[&Motif::Checkmate][0];
        assert_eq!(mate.move_number, 4);
        assert!(!mate.description.is_empty());

        let period = store.find_complete_period("testplayer", "CHESS_COM", "2024-01").await.unwrap();
        assert_eq!(period.map(|p| p.games_count), Some(1));
    }

    #[tokio::test]
    async fn test_bad_and_variant_games_are_skipped() {
        let mut variant = played("https://chess.com/game/960", SCHOLARS_MATE);
        variant.rules = "chess960".into();
        let mut source = FakeSource::default();
        source.responses.insert(
            ym("2024-01"),
            vec![
                played("https://chess.com/game/bad", "1. e4 e5 2. Ke7 *"),
                variant,
                played("https://chess.com/game/good", SCHOLARS_MATE),
            ],
        );
        let (worker, _, store) = worker(source);
        let msg = message(&store, "2024-01", "2024-01").await;

        let outcome = worker.process(&msg).await.unwrap();

        assert_eq!(outcome, ProcessOutcome::Completed { games_indexed: 1 });
        assert_eq!(store.game_count().await, 1);
        assert!(store.get_game("https://chess.com/game/good").await.is_some());
    }

    #[tokio::test]
    async fn test_missing_or_failed_month_stays_incomplete() {
        let source = FakeSource { failing: vec![ym("2024-02")], ..FakeSource::default() };
        let (worker, source, store) = worker(source);
        let msg = message(&store, "2024-01", "2024-02").await;

        let outcome = worker.process(&msg).await.unwrap();

        assert_eq!(outcome, ProcessOutcome::Completed { games_indexed: 0 });
        assert_eq!(source.calls().len(), 2);
        for month in ["2024-01", "2024-02"] {
            let period = store.find_complete_period("testplayer", "CHESS_COM", month).await.unwrap();
            assert!(period.is_none());
        }
    }

    #[tokio::test]
    async fn test_current_month_is_not_marked_complete() {
        let current = YearMonth::current();
        let mut source = FakeSource::default();
        source.responses.insert(current, vec![played("https://chess.com/game/now", SCHOLARS_MATE)]);
        let (worker, _, store) = worker(source);
        let msg = message(&store, &current.to_string(), &current.to_string()).await;

        worker.process(&msg).await.unwrap();

        assert_eq!(store.game_count().await, 1);
        let period = store
            .find_complete_period("testplayer", "CHESS_COM", &current.to_string())
            .await
            .unwrap();
        assert!(period.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_request_is_not_started() {
        let (worker, source, store) = worker(FakeSource::default());
        let msg = message(&store, "2024-01", "2024-03").await;
        store.update_status(msg.request_id, RequestStatus::Cancelled, None, 0).await.unwrap();

        let outcome = worker.process(&msg).await.unwrap();

        assert_eq!(outcome, ProcessOutcome::Cancelled { games_indexed: 0 });
        assert!(source.calls().is_empty());
        let request = store.find_by_id(msg.request_id).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_between_games_keeps_indexed_games() {
        let store = Arc::new(MemoryStore::new());
        let msg = message(&store, "2024-01", "2024-02").await;
        let mut source = FakeSource::default();
        source.responses.insert(
            ym("2024-01"),
            vec![
                played("https://chess.com/game/1", SCHOLARS_MATE),
                played("https://chess.com/game/2", SCHOLARS_MATE),
            ],
        );
        let source = Arc::new(source);
        let worker = IndexWorker::new(
            Arc::clone(&source),
            FeatureExtractor::new().unwrap(),
            Arc::new(HookedFeatures {
                inner: Arc::clone(&store),
                hook: UpsertHook::Cancel(msg.request_id),
            }),
            Arc::clone(&store),
            Arc::clone(&store),
        );

        let outcome = worker.process(&msg).await.unwrap();

        assert_eq!(outcome, ProcessOutcome::Cancelled { games_indexed: 1 });
        assert_eq!(source.calls(), vec![ym("2024-01")]);
        assert_eq!(store.game_count().await, 1);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_month_incomplete() {
        let store = Arc::new(MemoryStore::new());
        let msg = message(&store, "2024-01", "2024-01").await;
        let mut source = FakeSource::default();
        source.responses.insert(
            ym("2024-01"),
            vec![
                played("https://chess.com/game/1", SCHOLARS_MATE),
                played("https://chess.com/game/2", SCHOLARS_MATE),
            ],
        );
        let worker = IndexWorker::new(
            Arc::new(source),
            FeatureExtractor::new().unwrap(),
            Arc::new(HookedFeatures {
                inner: Arc::clone(&store),
                hook: UpsertHook::Fail("https://chess.com/game/2"),
            }),
            Arc::clone(&store),
            Arc::clone(&store),
        );

        let outcome = worker.process(&msg).await.unwrap();

        assert!(matches!(outcome, ProcessOutcome::Failed { .. }));
        let request = store.find_by_id(msg.request_id).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Failed);
        assert_eq!(request.games_indexed, 1);
        assert!(store
            .find_complete_period("testplayer", "CHESS_COM", "2024-01")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_invalid_month_marks_request_failed() {
        let (worker, source, store) = worker(FakeSource::default());
        let mut msg = message(&store, "2024-01", "2024-01").await;
        msg.end_month = "2024-13".into();

        let outcome = worker.process(&msg).await.unwrap();

        assert!(matches!(outcome, ProcessOutcome::Failed { .. }));
        assert!(source.calls().is_empty());
        let request = store.find_by_id(msg.request_id).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Failed);
        assert!(request.error_message.unwrap().contains("2024-13"));
    }

    #[test]
    fn test_build_feature_falls_back_to_archive_eco() {
        let mut game = played("u", "1. e4 e5 *");
        game.eco = Some("B00".into());
        game.end_time = 0;
        game.white.rating = 0;
        let msg = IndexMessage {
            request_id: 3,
            player: "p".into(),
            platform: "CHESS_COM".into(),
            start_month: "2024-01".into(),
            end_month: "2024-01".into(),
        };
        let feature = build_feature(&game, &GameFeatures::default(), &msg, Utc::now());
        assert_eq!(feature.eco.as_deref(), Some("B00"));
        assert_eq!(feature.played_at, None);
        assert_eq!(feature.white_elo, None);
        assert_eq!(feature.black_elo, Some(1480));
        assert!(feature.motifs.is_empty());
    }
}
