//! One module per motif. Every detector is a pure function over the full
//! replayed position sequence; pairwise detectors walk adjacent pairs.

pub mod attack;
pub mod back_rank_mate;
pub mod check;
pub mod cross_pin;
pub mod discovered_check;
pub mod double_check;
pub mod fork;
pub mod interference;
pub mod overloaded_piece;
pub mod pin;
pub mod promotion;
pub mod sacrifice;
pub mod skewer;
pub mod smothered_mate;
pub mod zugzwang;

use chess_core::board::{parse_placement, Grid};
use chess_core::PositionContext;

/// Positions produced by a move, with their parsed grids.
pub(crate) fn moves(
    positions: &[PositionContext],
) -> impl Iterator<Item = (&PositionContext, &str, Grid)> {
    positions.iter().filter_map(|ctx| {
        let san = ctx.last_move_san.as_deref()?;
        Some((ctx, san, parse_placement(&ctx.fen)))
    })
}

/// Adjacent (before, after) pairs where `after` was produced by a move.
pub(crate) fn move_pairs(
    positions: &[PositionContext],
) -> impl Iterator<Item = (&PositionContext, &str, Grid, Grid)> {
    positions.windows(2).filter_map(|pair| {
        let after = &pair[1];
        let san = after.last_move_san.as_deref()?;
        Some((after, san, parse_placement(&pair[0].fen), parse_placement(&after.fen)))
    })
}
