#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chess_analyzers::FeatureExtractor;
use chess_core::{PlayedGame, PlayerResult};
use index_worker::controllers::{IndexController, IndexRequest, QueryController};
use index_worker::error::GameSourceError;
use index_worker::model::YearMonth;
use index_worker::queue::{InMemoryQueue, IndexQueue};
use index_worker::source::GameSource;
use index_worker::store::MemoryStore;
use index_worker::{IndexWorker, ProcessOutcome};

pub const PLAYER: &str = "motif_e2e_player";
pub const PLATFORM: &str = "CHESS_COM";
pub const MONTH: &str = "2024-07";

pub const KINGS_GAMBIT_URL: &str = "https://www.chess.com/game/live/kings-gambit";
pub const OPERA_GAME_URL: &str = "https://www.chess.com/game/live/opera-game";

/// _prior vs zapblast, 54 moves, ends 54.Ra5#.
pub const KINGS_GAMBIT_PGN: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[White "_prior"]
[Black "zapblast"]
[Result "1-0"]
[ECO "C30"]

1. e4 e5 2. f4 d6 3. Nf3 Nc6 4. Bb5 Bd7 5. Nc3 f6 6. f5 Be7 7. Nh4 h5
8. Ng6 Rh6 9. Nd5 Nd4 10. Bxd7+ Qxd7 11. d3 Rh7 12. h4 c6 13. Ngxe7 Nxe7
14. Nxe7 Kxe7 15. Be3 c5 16. g4 hxg4 17. Qxg4 Qa4 18. Bxd4 cxd4 19. Qg6 Rah8
20. a3 Qxc2 21. O-O Rxh4 22. Qxg7+ Ke8 23. Qg6+ Kf8 24. Qxf6+ Ke8 25. Qe6+ Kd8
26. Qxd6+ Kc8 27. Qe6+ Kb8 28. Qxe5+ Ka8 29. Rf2 Rh1+ 30. Kg2 R8h2+ 31. Qxh2 Rxh2+
32. Kxh2 Qxf2+ 33. Kh1 Qxb2 34. Rg1 a6 35. f6 Qf2 36. e5 Qf3+ 37. Kh2 Qf4+
38. Rg3 Qxe5 39. f7 Qh5+ 40. Kg2 Qxf7 41. Rf3 Qa2+ 42. Kg3 Qxa3 43. Kf4 Qf8+
44. Ke4 Qe8+ 45. Kxd4 Qd7+ 46. Ke5 a5 47. d4 a4 48. d5 Qg7+ 49. Ke6 Qg4+
50. Rf5 a3 51. d6 Kb8 52. d7 Qg7 53. d8=Q+ Ka7 54. Ra5# 1-0
"#;

/// Morphy vs Duke Karl, Paris 1858, ends 17.Rd8#.
pub const OPERA_GAME_PGN: &str = r#"[Event "Opera Game"]
[White "Morphy"]
[Black "Duke Karl"]
[Result "1-0"]
[ECO "C41"]

1. e4 e5 2. Nf3 d6 3. d4 Bg4 4. dxe5 Bxf3 5. Qxf3 dxe5 6. Bc4 Nf6
7. Qb3 Qe7 8. Nc3 c6 9. Bg5 b5 10. Nxb5 cxb5 11. Bxb5+ Nbd7 12. O-O-O Rd8
13. Rxd7 Rxd7 14. Rd1 Qe6 15. Bxd7+ Nxd7 16. Qb8+ Nxb8 17. Rd8# 1-0
"#;

pub fn played_game(url: &str, pgn: &str) -> PlayedGame {
    PlayedGame {
        url: url.to_string(),
        pgn: pgn.to_string(),
        end_time: 1_720_000_000,
        rated: true,
        time_class: "blitz".to_string(),
        rules: "chess".to_string(),
        eco: None,
        white: PlayerResult { rating: 1500, result: "win".into(), username: "white".into() },
        black: PlayerResult {
            rating: 1500,
            result: "checkmated".into(),
            username: "black".into(),
        },
    }
}

/// Serves canned monthly archives and records every fetch.
#[derive(Default)]
pub struct FakeChessClient {
    games: Mutex<HashMap<YearMonth, Vec<PlayedGame>>>,
    fetches: Mutex<Vec<YearMonth>>,
}

impl FakeChessClient {
    pub fn set_games(&self, month: &str, games: Vec<PlayedGame>) {
        let month = month.parse().expect("valid month");
        self.games.lock().unwrap().insert(month, games);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

impl GameSource for FakeChessClient {
    async fn fetch_games(
        &self,
        _player: &str,
        month: YearMonth,
    ) -> Result<Option<Vec<PlayedGame>>, GameSourceError> {
        self.fetches.lock().unwrap().push(month);
        Ok(self.games.lock().unwrap().get(&month).cloned())
    }
}

/// Controllers, worker and queue wired to one in-memory store.
pub struct Pipeline {
    pub store: Arc<MemoryStore>,
    pub queue: Arc<InMemoryQueue>,
    pub source: Arc<FakeChessClient>,
    pub index: IndexController<MemoryStore, InMemoryQueue>,
    pub query: QueryController<MemoryStore>,
    pub worker: IndexWorker<FakeChessClient, MemoryStore, MemoryStore, MemoryStore>,
}

impl Pipeline {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(InMemoryQueue::new());
        let source = Arc::new(FakeChessClient::default());
        let worker = IndexWorker::new(
            Arc::clone(&source),
            FeatureExtractor::new().expect("extractor"),
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
        );
        Self {
            index: IndexController::new(Arc::clone(&store), Some(Arc::clone(&queue))),
            query: QueryController::new(Arc::clone(&store)),
            store,
            queue,
            source,
            worker,
        }
    }

    pub fn index_request(month: &str) -> IndexRequest {
        IndexRequest {
            player: Some(PLAYER.to_string()),
            platform: Some(PLATFORM.to_string()),
            start_month: Some(month.to_string()),
            end_month: Some(month.to_string()),
        }
    }

    /// Run every queued message through the worker.
    pub async fn drain(&self) -> Vec<ProcessOutcome> {
        let mut outcomes = Vec::new();
        while let Some(queued) = self.queue.poll(Duration::ZERO).await.expect("poll") {
            outcomes.push(self.worker.handle(self.queue.as_ref(), &queued).await.expect("handle"));
        }
        outcomes
    }
}
