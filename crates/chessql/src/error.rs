use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessQlError {
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("Unterminated string at position {0}")]
    UnterminatedString(usize),

    #[error("Invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("{message} at position {position}")]
    Syntax { message: String, position: usize },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown motif: {0}")]
    UnknownMotif(String),

    #[error("Field {field} expects {expected}")]
    TypeMismatch { field: String, expected: &'static str },

    #[error("Invalid date for {field}: {value}")]
    InvalidDate { field: String, value: String },

    #[error("sequence() requires at least 2 motifs")]
    ShortSequence,
}

impl ChessQlError {
    pub(crate) fn syntax(message: impl Into<String>, position: usize) -> Self {
        ChessQlError::Syntax { message: message.into(), position }
    }
}
