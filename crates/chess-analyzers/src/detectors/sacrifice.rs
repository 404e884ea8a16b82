//! Sacrifice: a capture where the capturing piece is worth more than the
//! piece it takes, leaving it exposed to recapture.

use chess_core::board::{notation, PAWN};
use chess_core::{MotifOccurrence, PositionContext};

use crate::board_utils::{is_color, is_promotion, occupied, piece_at};

pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    let mut occurrences = Vec::new();

    for (ctx, san, before, after) in super::move_pairs(positions) {
        let mover_white = ctx.mover_is_white();
        let Some((square, capturer)) = occupied(&after).find(|&(sq, piece)| {
            is_color(piece, mover_white) && is_color(piece_at(&before, sq), !mover_white)
        }) else {
            continue;
        };
        let captured = piece_at(&before, square);
        // A promoting pawn captures as a pawn.
        let capturer_value = if is_promotion(san) { PAWN } else { capturer.abs() };
        if capturer_value <= captured.abs() {
            continue;
        }

        let (Some(moved), Some(taken)) = (
            notation(&after, square.0, square.1),
            notation(&before, square.0, square.1),
        ) else {
            continue;
        };
        let description = format!("{} gives itself up for {}", moved, taken);
        occurrences.push(MotifOccurrence {
            moved_piece: Some(moved.clone()),
            attacker: Some(moved),
            target: Some(taken),
            ..MotifOccurrence::at(ctx, description)
        });
    }
    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::{pair, position};

    #[test]
    fn test_queen_takes_pawn() {
        let occs = detect(&pair(
            "4k3/5p2/8/8/8/8/8/3QK3 w - - 0 1",
            "4k3/5Q2/8/8/8/8/8/4K3 b - - 0 1",
            "Qxf7+",
        ));
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].moved_piece.as_deref(), Some("Qf7"));
        assert_eq!(occs[0].target.as_deref(), Some("pf7"));
        assert_eq!(occs[0].side.as_str(), "white");
    }

    #[test]
    fn test_black_rook_takes_knight() {
        let occs = detect(&pair(
            "4k3/8/8/8/8/8/r3N3/4K3 b - - 0 1",
            "4k3/8/8/8/8/8/4r3/4K3 w - - 0 1",
            "Rxe2+",
        ));
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].side.as_str(), "black");
        assert_eq!(occs[0].moved_piece.as_deref(), Some("re2"));
        assert_eq!(occs[0].target.as_deref(), Some("Ne2"));
    }

    #[test]
    fn test_equal_and_winning_captures_are_not_sacrifices() {
        let equal = pair(
            "4k3/8/8/3n4/8/4N3/8/4K3 w - - 0 1",
            "4k3/8/8/3N4/8/8/8/4K3 b - - 0 1",
            "Nxd5",
        );
        assert!(detect(&equal).is_empty());

        let winning = pair(
            "4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1",
            "4k3/8/8/3R4/8/8/8/4K3 b - - 0 1",
            "Rxd5",
        );
        assert!(detect(&winning).is_empty());
    }

    #[test]
    fn test_promotion_capture_counts_as_pawn() {
        let occs = detect(&pair(
            "3rk3/4P3/8/8/8/8/8/4K3 w - - 0 1",
            "3Qk3/8/8/8/8/8/8/4K3 b - - 0 1",
            "exd8=Q+",
        ));
        assert!(occs.is_empty());
    }

    #[test]
    fn test_needs_two_positions() {
        assert!(detect(&[]).is_empty());
        assert!(detect(&[position("4k3/5Q2/8/8/8/8/8/4K3 b - - 0 1", Some("Qxf7+"))]).is_empty());
    }
}
