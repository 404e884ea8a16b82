//! Indexing requests end to end over the in-memory store and queue.

mod common;

use common::*;
use index_worker::model::{RequestStatus, YearMonth};
use index_worker::ProcessOutcome;

#[tokio::test]
async fn test_completed_month_is_served_from_cache() {
    let pipeline = Pipeline::new();
    pipeline.source.set_games(
        MONTH,
        vec![
            played_game(KINGS_GAMBIT_URL, KINGS_GAMBIT_PGN),
            played_game(OPERA_GAME_URL, OPERA_GAME_PGN),
        ],
    );

    pipeline.index.create_index(&Pipeline::index_request(MONTH)).await.unwrap();
    pipeline.drain().await;
    assert_eq!(pipeline.source.fetch_count(), 1);

    let again = pipeline.index.create_index(&Pipeline::index_request(MONTH)).await.unwrap();
    let outcomes = pipeline.drain().await;

    assert_eq!(pipeline.source.fetch_count(), 1);
    assert_eq!(outcomes, vec![ProcessOutcome::Completed { games_indexed: 2 }]);
    let finished = pipeline.index.get_index(again.id).await.unwrap();
    assert_eq!(finished.status, RequestStatus::Completed);
    assert_eq!(pipeline.store.game_count().await, 2);
}

#[tokio::test]
async fn test_reindexing_current_month_is_idempotent() {
    let pipeline = Pipeline::new();
    let month = YearMonth::current().to_string();
    pipeline
        .source
        .set_games(&month, vec![played_game(OPERA_GAME_URL, OPERA_GAME_PGN)]);

    pipeline.index.create_index(&Pipeline::index_request(&month)).await.unwrap();
    pipeline.drain().await;
    let first = pipeline.store.occurrences(OPERA_GAME_URL).await;
    assert!(!first.is_empty());

    pipeline.index.create_index(&Pipeline::index_request(&month)).await.unwrap();
    pipeline.drain().await;

    // The current month is never cached, so the archive was read twice.
    assert_eq!(pipeline.source.fetch_count(), 2);
    assert_eq!(pipeline.store.game_count().await, 1);
    assert_eq!(pipeline.store.occurrences(OPERA_GAME_URL).await, first);
}

#[tokio::test]
async fn test_duplicate_request_while_pending_is_not_requeued() {
    let pipeline = Pipeline::new();
    let first = pipeline.index.create_index(&Pipeline::index_request(MONTH)).await.unwrap();
    let second = pipeline.index.create_index(&Pipeline::index_request(MONTH)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(pipeline.queue.len().await, 1);
}

#[tokio::test]
async fn test_cancelled_request_is_acked_without_fetching() {
    let pipeline = Pipeline::new();
    pipeline
        .source
        .set_games(MONTH, vec![played_game(KINGS_GAMBIT_URL, KINGS_GAMBIT_PGN)]);

    let created = pipeline.index.create_index(&Pipeline::index_request(MONTH)).await.unwrap();
    let cancelled = pipeline.index.cancel(created.id).await.unwrap();
    assert_eq!(cancelled.status, RequestStatus::Cancelled);

    let outcomes = pipeline.drain().await;
    assert_eq!(outcomes, vec![ProcessOutcome::Cancelled { games_indexed: 0 }]);
    assert_eq!(pipeline.source.fetch_count(), 0);
    assert_eq!(pipeline.store.game_count().await, 0);
    assert!(pipeline.queue.is_empty().await);
}
