//! Back-rank mate: checkmate along the mated king's first rank where the
//! king's own pieces block its way forward.

use chess_core::{MotifOccurrence, PositionContext};

use crate::board_utils::{
    attackers_of, find_checker, gives_mate, is_color, notation_at, piece_at, san_destination, step,
};

pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    let mut occurrences = Vec::new();

    for (ctx, san, grid) in super::moves(positions) {
        if !gives_mate(san) {
            continue;
        }
        let mated_white = ctx.white_to_move;
        let Some((checker, king)) = find_checker(&grid, mated_white, san_destination(san)) else {
            continue;
        };
        let back_rank = if mated_white { 7 } else { 0 };
        if king.0 != back_rank || checker.0 != back_rank {
            continue;
        }

        let forward = if mated_white { -1 } else { 1 };
        let escape_squares: Vec<_> = [-1, 0, 1]
            .iter()
            .filter_map(|&dc| step(king, (forward, dc)))
            .collect();
        let mut own_blockers = 0;
        let sealed = escape_squares.iter().all(|&sq| {
            if is_color(piece_at(&grid, sq), mated_white) {
                own_blockers += 1;
                true
            } else {
                !attackers_of(&grid, !mated_white, sq).is_empty()
            }
        });
        if !sealed || own_blockers == 0 {
            continue;
        }

        let attacker = notation_at(&grid, checker);
        let target = notation_at(&grid, king);
        let description = format!("Back-rank mate: {} mates {}", attacker, target);
        occurrences.push(MotifOccurrence {
            attacker: Some(attacker),
            target: Some(target),
            is_mate: true,
            ..MotifOccurrence::at(ctx, description)
        });
    }
    occurrences
}
