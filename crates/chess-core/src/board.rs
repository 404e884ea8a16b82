//! Signed 8x8 board encoding built from FEN piece placement.
//!
//! Row 0 is rank 8, column 0 is the a-file. Cells hold the piece value with a
//! positive sign for white and negative for black, 0 for an empty square.

pub type Grid = [[i8; 8]; 8];

pub const KING: i8 = 6;
pub const QUEEN: i8 = 5;
pub const ROOK: i8 = 4;
pub const BISHOP: i8 = 3;
pub const KNIGHT: i8 = 2;
pub const PAWN: i8 = 1;

/// Piece worth used by every value-comparing detector. Case-insensitive;
/// anything that is not a piece letter is worth 0.
pub fn piece_value(piece: char) -> i8 {
    match piece.to_ascii_lowercase() {
        'k' => KING,
        'q' => QUEEN,
        'r' => ROOK,
        'b' => BISHOP,
        'n' => KNIGHT,
        'p' => PAWN,
        _ => 0,
    }
}

/// Parse the placement field of a FEN (a full FEN is accepted, only the first
/// field is read). Squares past the board edge are ignored.
pub fn parse_placement(fen: &str) -> Grid {
    let mut grid = [[0i8; 8]; 8];
    let placement = fen.split_whitespace().next().unwrap_or("");

    for (row, rank) in placement.split('/').take(8).enumerate() {
        let mut col = 0usize;
        for c in rank.chars() {
            if let Some(skip) = c.to_digit(10) {
                col += skip as usize;
                continue;
            }
            let value = piece_value(c);
            if value != 0 && col < 8 {
                grid[row][col] = if c.is_ascii_uppercase() { value } else { -value };
            }
            col += 1;
        }
    }
    grid
}

/// Side-to-move field of a FEN; defaults to white when missing.
pub fn is_white_to_move(fen: &str) -> bool {
    fen.split_whitespace().nth(1) != Some("b")
}

/// Piece letter for a signed cell value ('K' white king, 'k' black king).
pub fn piece_char(value: i8) -> Option<char> {
    let c = match value.abs() {
        KING => 'k',
        QUEEN => 'q',
        ROOK => 'r',
        BISHOP => 'b',
        KNIGHT => 'n',
        PAWN => 'p',
        _ => return None,
    };
    Some(if value > 0 { c.to_ascii_uppercase() } else { c })
}

pub fn square_name(row: usize, col: usize) -> String {
    let file = (b'a' + col as u8) as char;
    let rank = (b'8' - row as u8) as char;
    format!("{}{}", file, rank)
}

/// Inverse of [`square_name`]: "e4" -> (4, 4).
pub fn parse_square(square: &str) -> Option<(usize, usize)> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let (file, rank) = (bytes[0], bytes[1]);
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some(((b'8' - rank) as usize, (file - b'a') as usize))
}

/// Piece-square notation such as "Qd5" or "ke8". Empty squares yield `None`.
pub fn notation(grid: &Grid, row: usize, col: usize) -> Option<String> {
    piece_char(grid[row][col]).map(|c| format!("{}{}", c, square_name(row, col)))
}
