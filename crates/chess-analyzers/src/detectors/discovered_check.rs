use chess_core::board::KING;
use chess_core::{MotifOccurrence, PositionContext};

use super::attack::discovered_attacks;
use crate::board_utils::{gives_mate, notation_at, piece_at};

/// Discovered check: a move opens a friendly slider's line onto the enemy king.
pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    let mut occurrences = Vec::new();

    for (ctx, san, before, after) in super::move_pairs(positions) {
        for revealed in discovered_attacks(&before, &after, ctx.mover_is_white()) {
            if piece_at(&after, revealed.target).abs() != KING {
                continue;
            }
            let attacker = notation_at(&after, revealed.attacker);
            let target = notation_at(&after, revealed.target);
            let description = format!("{} discovers check from {}", revealed.moved_piece, attacker);
            occurrences.push(MotifOccurrence {
                moved_piece: Some(revealed.moved_piece),
                attacker: Some(attacker),
                target: Some(target),
                is_discovered: true,
                is_mate: gives_mate(san),
                ..MotifOccurrence::at(ctx, description)
            });
        }
    }
    occurrences
}
