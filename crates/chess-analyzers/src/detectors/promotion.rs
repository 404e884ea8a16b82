//! Promotion and its check / checkmate variants, triggered by the `=` suffix.

use chess_core::{MotifOccurrence, PositionContext};

use crate::board_utils::{
    attacks, find_king, gives_check, gives_mate, is_promotion, notation_at, san_destination,
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Variant {
    Plain,
    WithCheck,
    WithCheckmate,
}

fn promotions(positions: &[PositionContext], variant: Variant) -> Vec<MotifOccurrence> {
    let mut occurrences = Vec::new();

    for (ctx, san, grid) in super::moves(positions) {
        if !is_promotion(san) {
            continue;
        }
        let Some(dest) = san_destination(san) else {
            continue;
        };
        let promoted = notation_at(&grid, dest);

        match variant {
            Variant::Plain => occurrences.push(MotifOccurrence {
                moved_piece: Some(promoted.clone()),
                ..MotifOccurrence::at(ctx, format!("{} promotes to {}", san, promoted))
            }),
            Variant::WithCheck | Variant::WithCheckmate => {
                let qualifies = match variant {
                    Variant::WithCheck => san.ends_with('+'),
                    _ => gives_mate(san),
                };
                if !qualifies || !gives_check(san) {
                    continue;
                }
                let Some(king) = find_king(&grid, ctx.white_to_move) else {
                    continue;
                };
                // A discovered check on promotion does not count.
                if !attacks(&grid, dest, king) {
                    continue;
                }
                let is_mate = variant == Variant::WithCheckmate;
                let label = if is_mate { "checkmate" } else { "check" };
                occurrences.push(MotifOccurrence {
                    moved_piece: Some(promoted.clone()),
                    attacker: Some(promoted.clone()),
                    target: Some(notation_at(&grid, king)),
                    is_mate,
                    ..MotifOccurrence::at(ctx, format!("{} promotes with {}", san, label))
                });
            }
        }
    }
    occurrences
}

pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    promotions(positions, Variant::Plain)
}

pub fn detect_with_check(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    promotions(positions, Variant::WithCheck)
}

pub fn detect_with_checkmate(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    promotions(positions, Variant::WithCheckmate)
}
