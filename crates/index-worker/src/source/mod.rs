//! Where played games come from.

pub(crate) mod chess_com;

use std::future::Future;

use chess_core::PlayedGame;

use crate::error::GameSourceError;
use crate::model::YearMonth;

pub use chess_com::ChessComClient;

pub trait GameSource: Send + Sync {
    /// All standard-chess games the player finished in `month`.
    /// `None` when the archive has no page for that month.
    fn fetch_games(
        &self,
        player: &str,
        month: YearMonth,
    ) -> impl Future<Output = Result<Option<Vec<PlayedGame>>, GameSourceError>> + Send;
}
