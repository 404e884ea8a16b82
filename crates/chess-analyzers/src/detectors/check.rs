//! Check and checkmate, read from the SAN suffix of the last move. The board
//! supplies the checking piece and the king.

use chess_core::{MotifOccurrence, PositionContext};

use crate::board_utils::{find_checker, gives_check, gives_mate, notation_at, san_destination};

fn checks(positions: &[PositionContext], mate_only: bool) -> Vec<MotifOccurrence> {
    super::moves(positions)
        .filter(|(_, san, _)| if mate_only { gives_mate(san) } else { gives_check(san) })
        .map(|(ctx, san, grid)| {
            let is_mate = gives_mate(san);
            let checker = find_checker(&grid, ctx.white_to_move, san_destination(san));
            let (attacker, target) = match checker {
                Some((from, king)) => {
                    (Some(notation_at(&grid, from)), Some(notation_at(&grid, king)))
                }
                None => (None, None),
            };
            let label = if is_mate { "Checkmate" } else { "Check" };
            MotifOccurrence {
                attacker,
                target,
                is_mate,
                ..MotifOccurrence::at(ctx, format!("{} with {}", label, san))
            }
        })
        .collect()
}

pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    checks(positions, false)
}

pub fn detect_checkmate(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    checks(positions, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::{position, start};

    #[test]
    fn test_rook_check() {
        let occs = detect(&[position("3R3k/8/8/8/8/8/8/4K3 b - - 1 1", Some("Rd8+"))]);
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].attacker.as_deref(), Some("Rd8"));
        assert_eq!(occs[0].target.as_deref(), Some("kh8"));
        assert_eq!(occs[0].side.as_str(), "white");
        assert!(!occs[0].is_mate);
        let quiet = [position("3R3k/8/8/8/8/8/8/4K3 b - - 1 1", Some("Rd8+"))];
        assert!(detect_checkmate(&quiet).is_empty());
    }

    #[test]
    fn test_black_queen_check() {
        let occs = detect(&[position("7k/8/8/8/7q/8/8/4K3 w - - 1 1", Some("Qh4+"))]);
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].side.as_str(), "black");
        assert_eq!(occs[0].attacker.as_deref(), Some("qh4"));
        assert_eq!(occs[0].target.as_deref(), Some("Ke1"));
    }

    #[test]
    fn test_promotion_check_credits_new_queen() {
        let occs = detect(&[position("4Qk2/8/8/8/8/8/8/4K3 b - - 0 1", Some("e8=Q+"))]);
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].attacker.as_deref(), Some("Qe8"));
        assert_eq!(occs[0].target.as_deref(), Some("kf8"));
    }

    #[test]
    fn test_checkmate_sets_mate_flag() {
        let fen = "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4";
        let mated = [position(fen, Some("Qxf7#"))];
        let mates = detect_checkmate(&mated);
        assert_eq!(mates.len(), 1);
        assert!(mates[0].is_mate);
        assert_eq!(mates[0].attacker.as_deref(), Some("Qf7"));
        assert_eq!(mates[0].target.as_deref(), Some("ke8"));
        assert_eq!(detect(&mated).len(), 1);
    }

    #[test]
    fn test_quiet_moves_and_empty_input() {
        assert!(detect(&[]).is_empty());
        assert!(detect_checkmate(&[]).is_empty());
        assert!(detect(&[start()]).is_empty());
        assert!(detect(&[position("3R3k/8/8/8/8/8/8/4K3 b - - 1 1", Some("Rd8"))]).is_empty());
    }
}
