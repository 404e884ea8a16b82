pub mod board;
pub mod game_data;
pub mod motif;
pub mod pgn;
pub mod replay;

pub use board::{parse_placement, piece_value, Grid};
pub use game_data::{GamesResponse, PlayedGame, PlayerResult};
pub use motif::{Motif, MotifOccurrence, PinType, Side, TagError};
pub use replay::{replay, PositionContext, ReplayError};
