use chess_core::board::KNIGHT;
use chess_core::{MotifOccurrence, PositionContext};

use crate::board_utils::{
    attacked_enemies, destination_square, is_castling, notation_at, piece_at,
};

/// Fork: the piece that just moved attacks two or more enemy pieces worth at
/// least a knight. The most valuable target is reported.
pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    let mut occurrences = Vec::new();

    for (ctx, san, before, after) in super::move_pairs(positions) {
        if is_castling(san) {
            continue;
        }
        let Some(dest) = destination_square(&before, &after, ctx.mover_is_white()) else {
            continue;
        };
        let mut targets: Vec<_> = attacked_enemies(&after, dest)
            .into_iter()
            .filter(|&sq| piece_at(&after, sq).abs() >= KNIGHT)
            .collect();
        if targets.len() < 2 {
            continue;
        }
        targets.sort_by_key(|&sq| std::cmp::Reverse(piece_at(&after, sq).abs()));

        let attacker = notation_at(&after, dest);
        let names: Vec<String> = targets.iter().map(|&sq| notation_at(&after, sq)).collect();
        let description = format!("{} forks {}", attacker, names.join(", "));
        occurrences.push(MotifOccurrence {
            moved_piece: Some(attacker.clone()),
            attacker: Some(attacker),
            target: Some(names[0].clone()),
            ..MotifOccurrence::at(ctx, description)
        });
    }
    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::pair;

    #[test]
    fn test_knight_forks_king_and_rook() {
        let occs = detect(&pair(
            "r3k3/8/8/1N6/8/8/8/4K3 w - - 0 1",
            "r3k3/2N5/8/8/8/8/8/4K3 b - - 1 1",
            "Nc7+",
        ));
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].attacker.as_deref(), Some("Nc7"));
        assert_eq!(occs[0].target.as_deref(), Some("ke8"));
        assert_eq!(occs[0].pin_type, None);
    }

    #[test]
    fn test_pawns_do_not_count() {
        let occs = detect(&pair(
            "7k/8/p3r3/8/1N6/8/8/4K3 w - - 0 1",
            "7k/2N5/p3r3/8/8/8/8/4K3 b - - 1 1",
            "Nc7",
        ));
        assert!(occs.is_empty());
    }

    #[test]
    fn test_slider_fork_stops_at_first_piece() {
        // the rook on h8 hides behind the bishop on f6
        let occs = detect(&pair(
            "4k2r/8/5b2/8/8/8/8/3QK3 w - - 0 1",
            "4k2r/8/5b2/8/3Q4/8/8/4K3 b - - 1 1",
            "Qd4",
        ));
        assert!(occs.is_empty());
        assert!(detect(&[]).is_empty());
    }
}
