//! Cross-pin: one enemy piece pinned along two different lines at the same
//! time, so it cannot leave either.

use chess_core::{MotifOccurrence, PositionContext};

use super::pin::{find_pins, Pin};
use crate::board_utils::notation_at;

pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    let mut occurrences = Vec::new();

    for (ctx, _, grid) in super::moves(positions) {
        let pins = find_pins(&grid, ctx.mover_is_white());
        let mut seen = Vec::new();

        for pin in &pins {
            if seen.contains(&pin.pinned) {
                continue;
            }
            let lines: Vec<&Pin> = pins
                .iter()
                .filter(|p| p.pinned == pin.pinned && p.direction != pin.direction)
                .collect();
            let Some(second) = lines.first() else {
                continue;
            };
            seen.push(pin.pinned);

            let attacker = notation_at(&grid, pin.attacker);
            let target = notation_at(&grid, pin.pinned);
            let description = format!(
                "{} is pinned by {} and {}",
                target,
                attacker,
                notation_at(&grid, second.attacker)
            );
            occurrences.push(MotifOccurrence {
                attacker: Some(attacker),
                target: Some(target),
                pin_type: Some(pin.pin_type),
                ..MotifOccurrence::at(ctx, description)
            });
        }
    }
    occurrences
}
