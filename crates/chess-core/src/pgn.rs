//! PGN move-text parsing: lightweight regex-based tokenizer.

use regex::Regex;

/// Splits PGN move text into SAN tokens. Check, mate and promotion suffixes
/// are kept as written since detectors read them directly.
#[derive(Debug, Clone)]
pub struct PgnParser {
    header_re: Regex,
    move_re: Regex,
}

impl PgnParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            header_re: Regex::new(r"\[[^\]]*\]")?,
            move_re: Regex::new(
                r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O[+#]?|O-O[+#]?",
            )?,
        })
    }

    /// Extract SAN moves from PGN text (after removing headers, comments, variations).
    pub fn parse_moves(&self, pgn: &str) -> Vec<String> {
        let no_headers = self.header_re.replace_all(pgn, "");
        let move_text = strip_annotations(&no_headers);

        self.move_re
            .find_iter(&move_text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Drop `{...}` comments, `;` line comments and `(...)` variations, which may nest.
fn strip_annotations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut variation_depth = 0usize;
    let mut in_brace = false;
    let mut in_line_comment = false;

    for c in text.chars() {
        if in_line_comment {
            if c == '\n' {
                in_line_comment = false;
                out.push(' ');
            }
            continue;
        }
        if in_brace {
            if c == '}' {
                in_brace = false;
                out.push(' ');
            }
            continue;
        }
        match c {
            '{' => in_brace = true,
            ';' => in_line_comment = true,
            '(' => variation_depth += 1,
            ')' => {
                variation_depth = variation_depth.saturating_sub(1);
                out.push(' ');
            }
            _ if variation_depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Extract a string value from a PGN header (e.g. White, ECO, Link).
pub fn extract_header(pgn: &str, header_name: &str) -> Option<String> {
    let pattern = format!(r#"\[{}\s+"([^"]*)"\]"#, regex::escape(header_name));
    let re = Regex::new(&pattern).ok()?;
    let value = re.captures(pgn)?.get(1)?.as_str().to_string();
    if value.is_empty() { None } else { Some(value) }
}

/// Extract an integer value from a PGN header.
pub fn extract_header_int(pgn: &str, header_name: &str) -> Option<i32> {
    let pattern = format!(r#"\[{}\s+"(\d+)"\]"#, regex::escape(header_name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(pgn)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}
