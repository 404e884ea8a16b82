//! Pin detector: a sliding piece of the side that just moved attacks an enemy
//! piece that shields a more valuable enemy piece (or the king) behind it.

use chess_core::board::{Grid, KING};
use chess_core::{MotifOccurrence, PinType, PositionContext};

use crate::board_utils::{
    first_piece_along, is_color, is_ray_piece, notation_at, occupied, piece_at, ray_directions,
    Direction, Square,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    pub attacker: Square,
    pub pinned: Square,
    pub behind: Square,
    pub direction: Direction,
    pub pin_type: PinType,
}

/// Every pin exerted by the `attacker_white` side's sliders on this board.
pub fn find_pins(grid: &Grid, attacker_white: bool) -> Vec<Pin> {
    let mut pins = Vec::new();

    for (from, piece) in occupied(grid) {
        if !is_color(piece, attacker_white) || !is_ray_piece(piece) {
            continue;
        }
        for &dir in ray_directions(piece) {
            let Some(pinned) = first_piece_along(grid, from, dir) else {
                continue;
            };
            let front = piece_at(grid, pinned);
            if !is_color(front, !attacker_white) || front.abs() == KING {
                continue;
            }
            let Some(behind) = first_piece_along(grid, pinned, dir) else {
                continue;
            };
            let back = piece_at(grid, behind);
            if !is_color(back, !attacker_white) {
                continue;
            }

            let pin_type = if back.abs() == KING {
                PinType::Absolute
            } else if back.abs() > front.abs() {
                PinType::Relative
            } else {
                continue;
            };
            pins.push(Pin { attacker: from, pinned, behind, direction: dir, pin_type });
        }
    }
    pins
}

pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    super::moves(positions)
        .flat_map(|(ctx, _, grid)| {
            find_pins(&grid, ctx.mover_is_white())
                .into_iter()
                .map(|pin| {
                    let attacker = notation_at(&grid, pin.attacker);
                    let target = notation_at(&grid, pin.pinned);
                    let description = format!(
                        "{} pins {} to {}",
                        attacker,
                        target,
                        notation_at(&grid, pin.behind)
                    );
                    MotifOccurrence {
                        attacker: Some(attacker),
                        target: Some(target),
                        pin_type: Some(pin.pin_type),
                        ..MotifOccurrence::at(ctx, description)
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
