//! Game replay: applies SAN moves from the standard start position and records
//! a snapshot after every ply.

use serde::Serialize;
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{Chess, Color, EnPassantMode, Position};
use thiserror::Error;

/// One ply of a replayed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionContext {
    /// Full-move number of the move that produced this position. Both white's
    /// and black's Nth move report N; the start position reports 0.
    pub move_number: u32,
    /// Half-moves played so far (0 for the start position).
    pub ply: u32,
    pub fen: String,
    /// Whose turn it is after this move.
    pub white_to_move: bool,
    pub last_move_san: Option<String>,
}

impl PositionContext {
    fn snapshot(pos: &Chess, ply: u32, last_move_san: Option<String>) -> Self {
        Self {
            move_number: (ply + 1) / 2,
            ply,
            fen: Fen::from_position(pos, EnPassantMode::Legal).to_string(),
            white_to_move: pos.turn() == Color::White,
            last_move_san,
        }
    }

    /// Side credited for the move that produced this position.
    pub fn mover_is_white(&self) -> bool {
        !self.white_to_move
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("Invalid SAN '{san}' at ply {ply}")]
    InvalidSan { ply: u32, san: String },
    #[error("Illegal move '{san}' at ply {ply}")]
    IllegalMove { ply: u32, san: String },
}

/// Replay SAN moves from the initial position. The returned sequence starts
/// with the initial position and has one entry per applied move. Stops at the
/// first move that cannot be parsed or applied.
pub fn replay(moves: &[String]) -> Result<Vec<PositionContext>, ReplayError> {
    let mut pos = Chess::default();
    let mut positions = Vec::with_capacity(moves.len() + 1);
    positions.push(PositionContext::snapshot(&pos, 0, None));

    for (idx, san_str) in moves.iter().enumerate() {
        let ply = idx as u32 + 1;
        let san: SanPlus = san_str.parse().map_err(|_| ReplayError::InvalidSan {
            ply,
            san: san_str.clone(),
        })?;
        let mv = san.san.to_move(&pos).map_err(|_| ReplayError::IllegalMove {
            ply,
            san: san_str.clone(),
        })?;
        pos.play_unchecked(mv);
        positions.push(PositionContext::snapshot(&pos, ply, Some(san_str.clone())));
    }

    Ok(positions)
}
