use std::fmt;

use crate::error::ChessQlError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Number(i64),
    Str(String),
    And,
    Or,
    Not,
    In,
    Motif,
    Sequence,
    Then,
    Order,
    By,
    Asc,
    Desc,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Str(s) => write!(f, "string \"{}\"", s),
            TokenKind::And => f.write_str("AND"),
            TokenKind::Or => f.write_str("OR"),
            TokenKind::Not => f.write_str("NOT"),
            TokenKind::In => f.write_str("IN"),
            TokenKind::Motif => f.write_str("motif"),
            TokenKind::Sequence => f.write_str("sequence"),
            TokenKind::Then => f.write_str("THEN"),
            TokenKind::Order => f.write_str("ORDER"),
            TokenKind::By => f.write_str("BY"),
            TokenKind::Asc => f.write_str("ASC"),
            TokenKind::Desc => f.write_str("DESC"),
            TokenKind::Eq => f.write_str("'='"),
            TokenKind::Neq => f.write_str("'!='"),
            TokenKind::Lt => f.write_str("'<'"),
            TokenKind::Lte => f.write_str("'<='"),
            TokenKind::Gt => f.write_str("'>'"),
            TokenKind::Gte => f.write_str("'>='"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::LBracket => f.write_str("'['"),
            TokenKind::RBracket => f.write_str("']'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Dot => f.write_str("'.'"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character offset into the query text.
    pub position: usize,
}

fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word.to_ascii_uppercase().as_str() {
        "AND" => TokenKind::And,
        "OR" => TokenKind::Or,
        "NOT" => TokenKind::Not,
        "IN" => TokenKind::In,
        "MOTIF" => TokenKind::Motif,
        "SEQUENCE" => TokenKind::Sequence,
        "THEN" => TokenKind::Then,
        "ORDER" => TokenKind::Order,
        "BY" => TokenKind::By,
        "ASC" => TokenKind::Asc,
        "DESC" => TokenKind::Desc,
        _ => return None,
    };
    Some(kind)
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, ChessQlError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        let next = chars.get(pos + 1).copied();

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '=' => TokenKind::Eq,
            '!' if next == Some('=') => {
                pos += 1;
                TokenKind::Neq
            }
            '<' if next == Some('=') => {
                pos += 1;
                TokenKind::Lte
            }
            '<' => TokenKind::Lt,
            '>' if next == Some('=') => {
                pos += 1;
                TokenKind::Gte
            }
            '>' => TokenKind::Gt,
            '"' | '\'' => {
                let (text, end) = read_string(&chars, pos)?;
                tokens.push(Token { kind: TokenKind::Str(text), position: start });
                pos = end;
                continue;
            }
            c if c.is_ascii_digit() || (c == '-' && next.is_some_and(|n| n.is_ascii_digit())) => {
                pos += 1;
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
                let text: String = chars[start..pos].iter().collect();
                let value = text
                    .parse::<i64>()
                    .map_err(|_| ChessQlError::InvalidNumber { text, position: start })?;
                tokens.push(Token { kind: TokenKind::Number(value), position: start });
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                    pos += 1;
                }
                let word: String = chars[start..pos].iter().collect();
                let kind = keyword(&word).unwrap_or(TokenKind::Ident(word));
                tokens.push(Token { kind, position: start });
                continue;
            }
            other => return Err(ChessQlError::UnexpectedChar { ch: other, position: pos }),
        };
        tokens.push(Token { kind, position: start });
        pos += 1;
    }

    tokens.push(Token { kind: TokenKind::Eof, position: chars.len() });
    Ok(tokens)
}

/// Reads a quoted string starting at `start`; returns the unescaped text and
/// the position just past the closing quote.
fn read_string(chars: &[char], start: usize) -> Result<(String, usize), ChessQlError> {
    let quote = chars[start];
    let mut text = String::new();
    let mut pos = start + 1;

    while pos < chars.len() {
        match chars[pos] {
            '\\' if pos + 1 < chars.len() => {
                text.push(chars[pos + 1]);
                pos += 2;
            }
            c if c == quote => return Ok((text, pos + 1)),
            c => {
                text.push(c);
                pos += 1;
            }
        }
    }

    Err(ChessQlError::UnterminatedString(start))
}
