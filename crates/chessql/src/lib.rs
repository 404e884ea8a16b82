//! ChessQL: a small predicate language over indexed games.
//!
//! ```text
//! white.elo >= 2000 AND motif(fork) AND NOT time.class = "bullet"
//! sequence(check THEN fork) ORDER BY motif_count(fork) DESC
//! ```
//!
//! Queries are lexed, parsed into an [`ast::Query`] and compiled into a
//! parameterized Postgres statement plus a typed [`Predicate`] that in-memory
//! stores evaluate directly.

pub mod ast;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;

pub use compiler::{
    compile, Column, ColumnKind, CompiledQuery, GameRow, Literal, Predicate, SortOrder, SqlValue,
};
pub use error::ChessQlError;
pub use parser::parse;

/// Parse and compile in one step.
pub fn compile_str(input: &str) -> Result<CompiledQuery, ChessQlError> {
    compile(&parse(input)?)
}
