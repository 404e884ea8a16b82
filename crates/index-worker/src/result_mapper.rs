//! chess.com per-side result codes -> PGN result notation

const DRAW_CODES: &[&str] = &[
    "agreed",
    "repetition",
    "stalemate",
    "insufficient",
    "50move",
    "timevsinsufficient",
    "drawn",
];

const LOSS_CODES: &[&str] = &["resigned", "checkmated", "timeout", "abandoned", "lose"];

pub fn is_draw(code: &str) -> bool {
    DRAW_CODES.contains(&code)
}

pub fn is_loss(code: &str) -> bool {
    LOSS_CODES.contains(&code)
}

/// `1-0`, `0-1`, `1/2-1/2` or `unknown`.
pub fn map_result(white: &str, black: &str) -> &'static str {
    if white == "win" {
        "1-0"
    } else if black == "win" {
        "0-1"
    } else if is_draw(white) || is_draw(black) {
        "1/2-1/2"
    } else if is_loss(white) {
        "0-1"
    } else if is_loss(black) {
        "1-0"
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins() {
        assert_eq!(map_result("win", "resigned"), "1-0");
        assert_eq!(map_result("checkmated", "win"), "0-1");
    }

    #[test]
    fn test_draws() {
        for code in DRAW_CODES {
            assert_eq!(map_result(code, code), "1/2-1/2");
        }
        assert_eq!(map_result("", "stalemate"), "1/2-1/2");
    }

    #[test]
    fn test_loss_without_win_code() {
        assert_eq!(map_result("timeout", ""), "0-1");
        assert_eq!(map_result("", "abandoned"), "1-0");
    }

    #[test]
    fn test_unknown() {
        assert_eq!(map_result("", ""), "unknown");
        assert_eq!(map_result("kingofthehill", "bughousepartnerlose"), "unknown");
    }
}
