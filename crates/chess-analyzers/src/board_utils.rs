/// Board utility functions shared by the motif detectors.
///
/// Coordinates follow the grid convention: (0, 0) is a8, (7, 7) is h1.
/// Colors are read from the sign of a cell, positive for white.

use chess_core::board::{notation, Grid, BISHOP, KING, KNIGHT, PAWN, QUEEN, ROOK};

pub type Square = (usize, usize);
pub type Direction = (i32, i32);

pub const ROOK_DIRECTIONS: [Direction; 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
pub const BISHOP_DIRECTIONS: [Direction; 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const QUEEN_DIRECTIONS: [Direction; 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
const KNIGHT_OFFSETS: [Direction; 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub fn is_white(piece: i8) -> bool {
    piece > 0
}

/// True when `piece` is non-empty and belongs to the given color.
pub fn is_color(piece: i8, white: bool) -> bool {
    piece != 0 && is_white(piece) == white
}

/// Is this a ray (sliding) piece type?
pub fn is_ray_piece(piece: i8) -> bool {
    matches!(piece.abs(), BISHOP | ROOK | QUEEN)
}

/// Directions a sliding piece moves along; empty for non-sliders.
pub fn ray_directions(piece: i8) -> &'static [Direction] {
    match piece.abs() {
        BISHOP => &BISHOP_DIRECTIONS,
        ROOK => &ROOK_DIRECTIONS,
        QUEEN => &QUEEN_DIRECTIONS,
        _ => &[],
    }
}

/// Can `piece` slide along `dir`?
pub fn slides_along(piece: i8, dir: Direction) -> bool {
    ray_directions(piece).contains(&dir)
}

pub fn step(square: Square, dir: Direction) -> Option<Square> {
    let row = square.0 as i32 + dir.0;
    let col = square.1 as i32 + dir.1;
    if (0..8).contains(&row) && (0..8).contains(&col) {
        Some((row as usize, col as usize))
    } else {
        None
    }
}

/// First occupied square strictly beyond `from` along `dir`.
pub fn first_piece_along(grid: &Grid, from: Square, dir: Direction) -> Option<Square> {
    let mut current = from;
    while let Some(next) = step(current, dir) {
        if grid[next.0][next.1] != 0 {
            return Some(next);
        }
        current = next;
    }
    None
}

/// All occupied squares in row-major order.
pub fn occupied(grid: &Grid) -> impl Iterator<Item = (Square, i8)> + '_ {
    (0..8)
        .flat_map(move |r| (0..8).map(move |c| ((r, c), grid[r][c])))
        .filter(|(_, piece)| *piece != 0)
}

pub fn find_king(grid: &Grid, white: bool) -> Option<Square> {
    let king = if white { KING } else { -KING };
    occupied(grid).find(|(_, p)| *p == king).map(|(sq, _)| sq)
}

pub fn piece_at(grid: &Grid, square: Square) -> i8 {
    grid[square.0][square.1]
}

/// Piece-square notation, "??" for an empty square.
pub fn notation_at(grid: &Grid, square: Square) -> String {
    notation(grid, square.0, square.1).unwrap_or_else(|| "??".to_string())
}

fn path_clear(grid: &Grid, from: Square, to: Square) -> bool {
    let dir = (
        (to.0 as i32 - from.0 as i32).signum(),
        (to.1 as i32 - from.1 as i32).signum(),
    );
    let mut current = from;
    while let Some(next) = step(current, dir) {
        if next == to {
            return true;
        }
        if piece_at(grid, next) != 0 {
            return false;
        }
        current = next;
    }
    false
}

/// Does the piece on `from` attack `to`? Pawns attack diagonally forward only;
/// sliders need a clear path.
pub fn attacks(grid: &Grid, from: Square, to: Square) -> bool {
    let piece = piece_at(grid, from);
    if piece == 0 || from == to {
        return false;
    }
    let dr = to.0 as i32 - from.0 as i32;
    let dc = to.1 as i32 - from.1 as i32;

    match piece.abs() {
        PAWN => {
            let forward = if is_white(piece) { -1 } else { 1 };
            dr == forward && dc.abs() == 1
        }
        KNIGHT => (dr.abs() == 2 && dc.abs() == 1) || (dr.abs() == 1 && dc.abs() == 2),
        KING => dr.abs() <= 1 && dc.abs() <= 1,
        BISHOP => dr.abs() == dc.abs() && path_clear(grid, from, to),
        ROOK => (dr == 0 || dc == 0) && path_clear(grid, from, to),
        QUEEN => (dr == 0 || dc == 0 || dr.abs() == dc.abs()) && path_clear(grid, from, to),
        _ => false,
    }
}

/// Squares attacked by the piece on `from`. Sliding attacks include the first
/// occupied square and stop there.
pub fn attacked_squares(grid: &Grid, from: Square) -> Vec<Square> {
    let piece = piece_at(grid, from);
    match piece.abs() {
        BISHOP | ROOK | QUEEN => ray_directions(piece)
            .iter()
            .flat_map(|&dir| {
                let mut squares = Vec::new();
                let mut current = from;
                while let Some(next) = step(current, dir) {
                    squares.push(next);
                    if piece_at(grid, next) != 0 {
                        break;
                    }
                    current = next;
                }
                squares
            })
            .collect(),
        KNIGHT => KNIGHT_OFFSETS.iter().filter_map(|&d| step(from, d)).collect(),
        KING => QUEEN_DIRECTIONS.iter().filter_map(|&d| step(from, d)).collect(),
        PAWN => {
            let forward = if is_white(piece) { -1 } else { 1 };
            [(forward, -1), (forward, 1)]
                .iter()
                .filter_map(|&d| step(from, d))
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Pieces of the given color attacking `target`, in row-major order.
pub fn attackers_of(grid: &Grid, white: bool, target: Square) -> Vec<Square> {
    occupied(grid)
        .filter(|&(sq, p)| sq != target && is_color(p, white) && attacks(grid, sq, target))
        .map(|(sq, _)| sq)
        .collect()
}

/// Enemy pieces (relative to the piece on `from`) that it attacks.
pub fn attacked_enemies(grid: &Grid, from: Square) -> Vec<Square> {
    let white = is_white(piece_at(grid, from));
    attacked_squares(grid, from)
        .into_iter()
        .filter(|&sq| is_color(piece_at(grid, sq), !white))
        .collect()
}

/// Checker of the `defender_white` king by the other side. Prefers `preferred`
/// (usually the square the last move landed on) when it is one of the checkers.
pub fn find_checker(
    grid: &Grid,
    defender_white: bool,
    preferred: Option<Square>,
) -> Option<(Square, Square)> {
    let king = find_king(grid, defender_white)?;
    let checkers = attackers_of(grid, !defender_white, king);
    let checker = preferred
        .filter(|sq| checkers.contains(sq))
        .or_else(|| checkers.first().copied())?;
    Some((checker, king))
}

/// Square a mover's piece arrived on: the first square now holding a mover's
/// piece that held nothing or an enemy piece before.
pub fn destination_square(before: &Grid, after: &Grid, mover_white: bool) -> Option<Square> {
    occupied(after)
        .find(|&(sq, p)| is_color(p, mover_white) && !is_color(piece_at(before, sq), mover_white))
        .map(|(sq, _)| sq)
}

/// Squares a mover's piece left empty.
pub fn vacated_squares(before: &Grid, after: &Grid, mover_white: bool) -> Vec<Square> {
    occupied(before)
        .filter(|&(sq, p)| is_color(p, mover_white) && piece_at(after, sq) == 0)
        .map(|(sq, _)| sq)
        .collect()
}

pub fn gives_check(san: &str) -> bool {
    san.ends_with('+') || san.ends_with('#')
}

pub fn gives_mate(san: &str) -> bool {
    san.ends_with('#')
}

pub fn is_castling(san: &str) -> bool {
    san.starts_with("O-O")
}

pub fn is_promotion(san: &str) -> bool {
    san.contains('=')
}

/// Target square written in a SAN move ("exd8=Q+" -> d8). `None` for castling.
pub fn san_destination(san: &str) -> Option<Square> {
    if is_castling(san) {
        return None;
    }
    let core = san.trim_end_matches(['+', '#']);
    let core = core.split('=').next().unwrap_or(core);
    let start = core.len().checked_sub(2)?;
    chess_core::board::parse_square(core.get(start..)?)
}
