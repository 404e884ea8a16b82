//! Attack detector.
//!
//! Two kinds of attack are reported after each move:
//! - direct: the piece that moved now attacks a king or queen, or two or more
//!   pieces worth at least a knight (all of those are reported);
//! - discovered: the move vacated a square and a friendly slider behind it now
//!   reaches an enemy piece (every revealed target is reported).
//!
//! Discovered occurrences carry `is_discovered = true`; the discovered-attack
//! motif is the subset of attack occurrences with that flag.

use chess_core::board::{square_name, Grid, KING, KNIGHT, QUEEN};
use chess_core::{MotifOccurrence, PositionContext};

use crate::board_utils::{
    attacked_enemies, destination_square, first_piece_along, gives_mate, is_castling, is_color,
    notation_at, piece_at, slides_along, vacated_squares, Square, QUEEN_DIRECTIONS,
};

/// One line opened by a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedAttack {
    /// Letter, origin and destination of the piece that moved, e.g. "Nf3d4".
    pub moved_piece: String,
    pub attacker: Square,
    pub target: Square,
}

pub fn discovered_attacks(before: &Grid, after: &Grid, mover_white: bool) -> Vec<RevealedAttack> {
    let dest = destination_square(before, after, mover_white);
    let mut revealed = Vec::new();

    for vacated in vacated_squares(before, after, mover_white) {
        let letter = notation_at(before, vacated);
        let moved_piece = format!(
            "{}{}",
            letter,
            dest.map(|d| square_name(d.0, d.1)).unwrap_or_else(|| "??".to_string())
        );

        for &dir in QUEEN_DIRECTIONS.iter() {
            let behind = (-dir.0, -dir.1);
            let Some(attacker) = first_piece_along(after, vacated, behind) else {
                continue;
            };
            if Some(attacker) == dest {
                continue;
            }
            let slider = piece_at(after, attacker);
            if !is_color(slider, mover_white) || !slides_along(slider, dir) {
                continue;
            }
            let Some(target) = first_piece_along(after, vacated, dir) else {
                continue;
            };
            if is_color(piece_at(after, target), !mover_white) {
                revealed.push(RevealedAttack {
                    moved_piece: moved_piece.clone(),
                    attacker,
                    target,
                });
            }
        }
    }
    revealed
}

/// Targets of the moved piece worth reporting: kings and queens always, and
/// every piece worth at least a knight when there are two or more of those.
fn significant_targets(grid: &Grid, from: Square) -> Vec<Square> {
    let targets = attacked_enemies(grid, from);
    let valuable = targets
        .iter()
        .filter(|&&sq| piece_at(grid, sq).abs() >= KNIGHT)
        .count();
    targets
        .into_iter()
        .filter(|&sq| {
            let value = piece_at(grid, sq).abs();
            value == KING || value == QUEEN || (valuable >= 2 && value >= KNIGHT)
        })
        .collect()
}

pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    let mut occurrences = Vec::new();

    for (ctx, san, before, after) in super::move_pairs(positions) {
        let mover_white = ctx.mover_is_white();
        let mate = gives_mate(san);

        if !is_castling(san) {
            if let Some(dest) = destination_square(&before, &after, mover_white) {
                let attacker = notation_at(&after, dest);
                for target in significant_targets(&after, dest) {
                    let is_king = piece_at(&after, target).abs() == KING;
                    let target = notation_at(&after, target);
                    let description = format!("{} attacks {}", attacker, target);
                    occurrences.push(MotifOccurrence {
                        moved_piece: Some(attacker.clone()),
                        attacker: Some(attacker.clone()),
                        target: Some(target),
                        is_mate: mate && is_king,
                        ..MotifOccurrence::at(ctx, description)
                    });
                }
            }
        }

        for revealed in discovered_attacks(&before, &after, mover_white) {
            let is_king = piece_at(&after, revealed.target).abs() == KING;
            let attacker = notation_at(&after, revealed.attacker);
            let target = notation_at(&after, revealed.target);
            let description = format!(
                "{} uncovers {} attacking {}",
                revealed.moved_piece, attacker, target
            );
            occurrences.push(MotifOccurrence {
                moved_piece: Some(revealed.moved_piece),
                attacker: Some(attacker),
                target: Some(target),
                is_discovered: true,
                is_mate: mate && is_king,
                ..MotifOccurrence::at(ctx, description)
            });
        }
    }
    occurrences
}
