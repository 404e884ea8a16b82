//! Overloaded piece: one defender is responsible for two or more pieces that
//! the same enemy piece attacks.

use chess_core::{MotifOccurrence, PositionContext};

use crate::board_utils::{attacked_enemies, attacks, is_color, notation_at, occupied};

pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    let mut occurrences = Vec::new();

    for (ctx, _, grid) in super::moves(positions) {
        let mover_white = ctx.mover_is_white();
        let mut reported = Vec::new();

        for (attacker, piece) in occupied(&grid) {
            if !is_color(piece, mover_white) {
                continue;
            }
            let threatened = attacked_enemies(&grid, attacker);
            if threatened.len() < 2 {
                continue;
            }
            for (defender, guard) in occupied(&grid) {
                if !is_color(guard, !mover_white) || reported.contains(&defender) {
                    continue;
                }
                let duties = threatened
                    .iter()
                    .filter(|&&sq| sq != defender && attacks(&grid, defender, sq))
                    .count();
                if duties < 2 {
                    continue;
                }
                reported.push(defender);

                let attacker_name = notation_at(&grid, attacker);
                let target = notation_at(&grid, defender);
                let description = format!("{} is overloaded against {}", target, attacker_name);
                occurrences.push(MotifOccurrence {
                    attacker: Some(attacker_name),
                    target: Some(target),
                    ..MotifOccurrence::at(ctx, description)
                });
            }
        }
    }
    occurrences
}
