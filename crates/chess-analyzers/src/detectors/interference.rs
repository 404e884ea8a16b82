//! Interference: a piece steps onto an empty square that sat on an enemy
//! slider's open line, cutting the slider off from the piece it reached.

use chess_core::{MotifOccurrence, PositionContext};

use crate::board_utils::{
    destination_square, first_piece_along, is_castling, is_color, is_ray_piece, notation_at,
    occupied, piece_at, ray_directions, step,
};

pub fn detect(positions: &[PositionContext]) -> Vec<MotifOccurrence> {
    let mut occurrences = Vec::new();

    for (ctx, san, before, after) in super::move_pairs(positions) {
        if is_castling(san) {
            continue;
        }
        let mover_white = ctx.mover_is_white();
        let Some(dest) = destination_square(&before, &after, mover_white) else {
            continue;
        };
        if piece_at(&before, dest) != 0 {
            continue;
        }
        let blocker = notation_at(&after, dest);

        for (slider, piece) in occupied(&before) {
            if !is_color(piece, !mover_white) || !is_ray_piece(piece) {
                continue;
            }
            for &dir in ray_directions(piece) {
                // The line must pass over the destination and reach a piece beyond it.
                let Some(reached) = first_piece_along(&before, slider, dir) else {
                    continue;
                };
                let mut current = slider;
                let mut crosses = false;
                while let Some(next) = step(current, dir) {
                    if next == reached {
                        break;
                    }
                    if next == dest {
                        crosses = true;
                        break;
                    }
                    current = next;
                }
                if !crosses {
                    continue;
                }

                let target = notation_at(&before, slider);
                let description = format!(
                    "{} cuts {} off from {}",
                    blocker,
                    target,
                    notation_at(&before, reached)
                );
                occurrences.push(MotifOccurrence {
                    moved_piece: Some(blocker.clone()),
                    attacker: Some(blocker.clone()),
                    target: Some(target),
                    ..MotifOccurrence::at(ctx, description)
                });
            }
        }
    }
    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::pair;

    #[test]
    fn test_knight_blocks_rook_defence() {
        // the black rook on a4 guards the knight on h4 until Nd4 lands in between
        let occs = detect(&pair(
            "4k3/8/8/8/r6n/8/2N5/4K3 w - - 0 1",
            "4k3/8/8/8/r2N3n/8/8/4K3 b - - 1 1",
            "Nd4",
        ));
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].attacker.as_deref(), Some("Nd4"));
        assert_eq!(occs[0].target.as_deref(), Some("ra4"));
        assert_eq!(occs[0].side.as_str(), "white");
    }

    #[test]
    fn test_no_interference() {
        assert!(detect(&[]).is_empty());
        // line runs off the board without reaching a piece
        let occs = detect(&pair(
            "4k3/8/8/8/r7/8/2N5/4K3 w - - 0 1",
            "4k3/8/8/8/r2N4/8/8/4K3 b - - 1 1",
            "Nd4",
        ));
        assert!(occs.is_empty());
        // captures are not interference
        let occs = detect(&pair(
            "4k3/8/8/8/r2p3n/8/2N5/4K3 w - - 0 1",
            "4k3/8/8/8/r2N3n/8/8/4K3 b - - 0 1",
            "Nxd4",
        ));
        assert!(occs.is_empty());
    }
}
