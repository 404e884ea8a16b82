//! Skewer detector: a slider attacks an enemy piece with a (non-pawn) enemy
//! piece of equal or lesser value standing behind it on the same line.

use chess_core::board::Grid;
use chess_core::{MotifOccurrence, PositionContext};

use crate::board_utils::{
    first_piece_along, is_color, is_ray_piece, notation_at, occupied, piece_at, ray_directions,
    Square,
};

pub struct Skewer {
    pub attacker: Square,
    pub front: Square,
    pub behind: Square,
}

pub fn find_skewers(grid: &Grid, attacker_white: bool) -> Vec<Skewer> {
    let mut skewers = Vec::new();

    for (from, piece) in occupied(grid) {
        if !is_color(piece, attacker_white) || !is_ray_piece(piece) {
            continue;
        }
        for &dir in ray_directions(piece) {
            let Some(front) = first_piece_along(grid, from, dir) else {
                continue;
            };
            let Some(behind) = first_piece_along(grid, front, dir) else {
                continue;
            };
            let (front_piece, back_piece) = (piece_at(grid, front), piece_at(grid, behind));
            if !is_color(front_piece, !attacker_white) || !is_color(back_piece, !attacker_white) {
                continue;
            }
            if front_piece.abs() >= back_piece.abs() && back_piece.abs() >= 2 {
                skewers.push(Skewer { attacker: from, front, behind });
            }
        }
    }
    skewers
}

pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    super::moves(positions)
        .flat_map(|(ctx, _, grid)| {
            find_skewers(&grid, ctx.mover_is_white())
                .into_iter()
                .map(|s| {
                    let attacker = notation_at(&grid, s.attacker);
                    let target = notation_at(&grid, s.front);
                    let description = format!(
                        "{} skewers {} to {}",
                        attacker,
                        target,
                        notation_at(&grid, s.behind)
                    );
                    MotifOccurrence {
                        attacker: Some(attacker),
                        target: Some(target),
                        ..MotifOccurrence::at(ctx, description)
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
