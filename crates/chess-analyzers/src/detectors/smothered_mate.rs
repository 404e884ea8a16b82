//! Smothered mate: a knight mates a king whose every neighbouring square is
//! occupied by its own pieces.

use chess_core::board::KNIGHT;
use chess_core::{MotifOccurrence, PositionContext};

use crate::board_utils::{
    attackers_of, find_king, gives_mate, is_color, notation_at, piece_at, step, QUEEN_DIRECTIONS,
};

pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    let mut occurrences = Vec::new();

    for (ctx, san, grid) in super::moves(positions) {
        if !gives_mate(san) {
            continue;
        }
        let mated_white = ctx.white_to_move;
        let Some(king) = find_king(&grid, mated_white) else {
            continue;
        };
        let Some(knight) = attackers_of(&grid, !mated_white, king)
            .into_iter()
            .find(|&sq| piece_at(&grid, sq).abs() == KNIGHT)
        else {
            continue;
        };
        let smothered = QUEEN_DIRECTIONS
            .iter()
            .filter_map(|&dir| step(king, dir))
            .all(|sq| is_color(piece_at(&grid, sq), mated_white));
        if !smothered {
            continue;
        }

        let attacker = notation_at(&grid, knight);
        let target = notation_at(&grid, king);
        let description = format!("Smothered mate: {} mates {}", attacker, target);
        occurrences.push(MotifOccurrence {
            attacker: Some(attacker),
            target: Some(target),
            is_mate: true,
            ..MotifOccurrence::at(ctx, description)
        });
    }
    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::{position, start};

    #[test]
    fn test_classic_smothered_mate() {
        let occs = detect(&[position("6rk/5Npp/8/8/8/8/8/6K1 b - - 1 1", Some("Nf7#"))]);
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].attacker.as_deref(), Some("Nf7"));
        assert_eq!(occs[0].target.as_deref(), Some("kh8"));
        assert!(occs[0].is_mate);
    }

    #[test]
    fn test_not_smothered() {
        assert!(detect(&[]).is_empty());
        assert!(detect(&[start()]).is_empty());
        // knight check without mate suffix
        let check = position("6rk/5Npp/8/8/8/8/8/6K1 b - - 1 1", Some("Nf7+"));
        assert!(detect(&[check]).is_empty());
        // a flight square is empty
        let open = position("6rk/5Np1/8/8/8/8/8/6K1 b - - 1 1", Some("Nf7#"));
        assert!(detect(&[open]).is_empty());
        // mate by a rook
        let rook = position("R5k1/5ppp/8/8/8/8/8/6K1 b - - 1 1", Some("Ra8#"));
        assert!(detect(&[rook]).is_empty());
    }
}
