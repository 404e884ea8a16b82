use chess_core::{MotifOccurrence, PositionContext};

use crate::board_utils::{
    attackers_of, find_king, gives_check, gives_mate, notation_at, san_destination,
};

/// Double check: the move gives check and two or more pieces attack the king.
pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    let mut occurrences = Vec::new();

    for (ctx, san, grid) in super::moves(positions) {
        if !gives_check(san) {
            continue;
        }
        let defender_white = ctx.white_to_move;
        let Some(king) = find_king(&grid, defender_white) else {
            continue;
        };
        let mut checkers = attackers_of(&grid, !defender_white, king);
        if checkers.len() < 2 {
            continue;
        }
        // Report the piece that moved first.
        if let Some(dest) = san_destination(san) {
            if let Some(pos) = checkers.iter().position(|&sq| sq == dest) {
                checkers.swap(0, pos);
            }
        }

        let names: Vec<String> = checkers.iter().map(|&sq| notation_at(&grid, sq)).collect();
        let target = notation_at(&grid, king);
        let description = format!("Double check on {} by {}", target, names.join(" and "));
        occurrences.push(MotifOccurrence {
            attacker: Some(names[0].clone()),
            target: Some(target),
            is_mate: gives_mate(san),
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
    fn test_bishop_and_rook_double_check() {
        let occs = detect(&[position("k7/8/8/3B4/8/8/8/R6K b - - 1 1", Some("Bd5+"))]);
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].attacker.as_deref(), Some("Bd5"));
        assert_eq!(occs[0].target.as_deref(), Some("ka8"));
        assert_eq!(occs[0].side.as_str(), "white");
    }

    #[test]
    fn test_single_check_is_not_double() {
        assert!(detect(&[]).is_empty());
        assert!(detect(&[start()]).is_empty());
        assert!(detect(&[position("k7/8/8/8/8/8/8/1R5K b - - 1 1", Some("Rb1+"))]).is_empty());
        // two attackers but no check suffix
        assert!(detect(&[position("k7/8/8/3B4/8/8/8/R6K b - - 1 1", Some("Bd5"))]).is_empty());
    }
}
