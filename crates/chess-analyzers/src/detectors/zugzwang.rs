//! Zugzwang in simple endgames: after the move, the side to move has pieces
//! besides its king but none of them can move, so only king moves remain.

use chess_core::board::{Grid, BISHOP, KING, KNIGHT, PAWN, QUEEN, ROOK};
use chess_core::{MotifOccurrence, PositionContext};

use crate::board_utils::{
    attacked_squares, is_color, is_white, occupied, piece_at, step, Square,
};

const MAX_PIECES: usize = 8;

fn pawn_is_stuck(grid: &Grid, from: Square, white: bool) -> bool {
    let forward = if white { -1 } else { 1 };
    let blocked = step(from, (forward, 0)).map_or(true, |sq| piece_at(grid, sq) != 0);
    let can_capture = [-1, 1]
        .iter()
        .filter_map(|&dc| step(from, (forward, dc)))
        .any(|sq| is_color(piece_at(grid, sq), !white));
    blocked && !can_capture
}

fn piece_is_stuck(grid: &Grid, from: Square, white: bool) -> bool {
    attacked_squares(grid, from)
        .into_iter()
        .all(|sq| is_color(piece_at(grid, sq), white))
}

/// True when the side to move has a non-king piece and every non-king piece
/// it owns is immobile.
pub fn only_king_moves(grid: &Grid, side_white: bool) -> bool {
    let pieces: Vec<(Square, i8)> = occupied(grid).collect();
    if pieces.len() > MAX_PIECES || pieces.iter().any(|(_, p)| p.abs() == QUEEN) {
        return false;
    }

    let own: Vec<_> = pieces
        .iter()
        .filter(|(_, p)| is_color(*p, side_white) && p.abs() != KING)
        .collect();
    if own.is_empty() {
        return false;
    }
    own.iter().all(|&&(sq, p)| match p.abs() {
        PAWN => pawn_is_stuck(grid, sq, is_white(p)),
        KNIGHT | BISHOP | ROOK => piece_is_stuck(grid, sq, is_white(p)),
        _ => false,
    })
}

pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    super::moves(positions)
        .filter(|(ctx, _, grid)| only_king_moves(grid, ctx.white_to_move))
        .map(|(ctx, san, _)| {
            let stuck = if ctx.white_to_move { "white" } else { "black" };
            MotifOccurrence::at(ctx, format!("{} leaves {} with only king moves", san, stuck))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::{position, start};

    #[test]
    fn test_blocked_pawns_leave_only_king_moves() {
        let occs = detect(&[position("4k3/8/8/4p3/4P3/8/8/4K3 w - - 0 1", Some("Ke8"))]);
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].side.as_str(), "black");
    }

    #[test]
    fn test_not_zugzwang() {
        assert!(detect(&[]).is_empty());
        assert!(detect(&[start()]).is_empty());
        // position without a move
        assert!(detect(&[position("4k3/8/8/4p3/4P3/8/8/4K3 w - - 0 1", None)]).is_empty());
        // pawn can advance
        let free = position("4k3/8/8/8/4P3/8/8/4K3 w - - 0 1", Some("Ke8"));
        assert!(detect(&[free]).is_empty());
        // queens on the board
        let queens = position("3qk3/8/8/4p3/4P3/8/8/3QK3 w - - 0 1", Some("Ke8"));
        assert!(detect(&[queens]).is_empty());
        // too many pieces
        let crowded = position("4k3/pppp4/8/4p3/4P3/8/PPP5/4K3 w - - 0 1", Some("Ke8"));
        assert!(detect(&[crowded]).is_empty());
        // a knight can still move
        let knight = position("4k3/8/8/4p3/4P3/8/8/N3K3 w - - 0 1", Some("Ke8"));
        assert!(detect(&[knight]).is_empty());
    }
}
