//! Recursive-descent parser.
//!
//! ```text
//! query    := or_expr [ORDER BY order_key [ASC | DESC]]
//! or_expr  := and_expr (OR and_expr)*
//! and_expr := not_expr (AND not_expr)*
//! not_expr := NOT not_expr | primary
//! primary  := '(' or_expr ')'
//!           | motif '(' ident ')'
//!           | sequence '(' ident (THEN ident)+ ')'
//!           | field op value
//!           | field IN '[' value (',' value)* ']'
//! field    := ident ('.' ident)*
//! order_key := motif_count '(' ident ')' | field
//! ```

use crate::ast::{CompareOp, Expr, OrderBy, OrderKey, Query, Value};
use crate::error::ChessQlError;
use crate::lexer::{tokenize, Token, TokenKind};

/// Deepest allowed nesting of parentheses and NOT.
pub const MAX_DEPTH: usize = 64;

pub fn parse(input: &str) -> Result<Query, ChessQlError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let query = parser.query()?;
    parser.expect(TokenKind::Eof)?;
    Ok(query)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn current(&self) -> &Token {
        // The lexer always terminates the stream with Eof and we never advance past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ChessQlError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("Expected {}", kind)))
        }
    }

    fn unexpected(&self, expected: &str) -> ChessQlError {
        let token = self.current();
        ChessQlError::syntax(format!("{}, got {}", expected, token.kind), token.position)
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ChessQlError>,
    ) -> Result<T, ChessQlError> {
        if self.depth >= MAX_DEPTH {
            return Err(ChessQlError::syntax("Query nested too deeply", self.current().position));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn ident(&mut self) -> Result<String, ChessQlError> {
        match self.current().kind.clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("Expected identifier")),
        }
    }

    fn query(&mut self) -> Result<Query, ChessQlError> {
        let expr = self.or_expr()?;
        let order_by = if self.check(&TokenKind::Order) {
            self.advance();
            self.expect(TokenKind::By)?;
            Some(self.order_by()?)
        } else {
            None
        };
        Ok(Query { expr, order_by })
    }

    fn or_expr(&mut self) -> Result<Expr, ChessQlError> {
        let mut operands = vec![self.and_expr()?];
        while self.check(&TokenKind::Or) {
            self.advance();
            operands.push(self.and_expr()?);
        }
        Ok(if operands.len() == 1 { operands.remove(0) } else { Expr::Or(operands) })
    }

    fn and_expr(&mut self) -> Result<Expr, ChessQlError> {
        let mut operands = vec![self.not_expr()?];
        while self.check(&TokenKind::And) {
            self.advance();
            operands.push(self.not_expr()?);
        }
        Ok(if operands.len() == 1 { operands.remove(0) } else { Expr::And(operands) })
    }

    fn not_expr(&mut self) -> Result<Expr, ChessQlError> {
        if self.check(&TokenKind::Not) {
            self.advance();
            let inner = self.nested(Self::not_expr)?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ChessQlError> {
        match self.current().kind {
            TokenKind::LParen => {
                self.advance();
                let expr = self.nested(Self::or_expr)?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Motif => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let name = self.ident()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Motif(name))
            }
            TokenKind::Sequence => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let mut names = vec![self.ident()?];
                while self.check(&TokenKind::Then) {
                    self.advance();
                    names.push(self.ident()?);
                }
                self.expect(TokenKind::RParen)?;
                if names.len() < 2 {
                    return Err(ChessQlError::ShortSequence);
                }
                Ok(Expr::Sequence(names))
            }
            TokenKind::Ident(_) => self.field_expr(),
            _ => Err(self.unexpected("Expected expression")),
        }
    }

    fn field(&mut self) -> Result<String, ChessQlError> {
        let mut name = self.ident()?;
        while self.check(&TokenKind::Dot) {
            self.advance();
            name.push('.');
            name.push_str(&self.ident()?);
        }
        Ok(name)
    }

    fn field_expr(&mut self) -> Result<Expr, ChessQlError> {
        let field = self.field()?;

        if self.check(&TokenKind::In) {
            self.advance();
            self.expect(TokenKind::LBracket)?;
            let mut values = vec![self.value()?];
            while self.check(&TokenKind::Comma) {
                self.advance();
                values.push(self.value()?);
            }
            self.expect(TokenKind::RBracket)?;
            return Ok(Expr::In { field, values });
        }

        let op = match self.current().kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::Neq => CompareOp::Neq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Lte => CompareOp::Lte,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::Gte => CompareOp::Gte,
            _ => return Err(self.unexpected("Expected comparison operator")),
        };
        self.advance();
        let value = self.value()?;
        Ok(Expr::Compare { field, op, value })
    }

    fn value(&mut self) -> Result<Value, ChessQlError> {
        let value = match &self.current().kind {
            TokenKind::Number(n) => Value::Int(*n),
            TokenKind::Str(s) => Value::Text(s.clone()),
            _ => return Err(self.unexpected("Expected value")),
        };
        self.advance();
        Ok(value)
    }

    fn order_by(&mut self) -> Result<OrderBy, ChessQlError> {
        let field = self.field()?;
        let key = if field.eq_ignore_ascii_case("motif_count") && self.check(&TokenKind::LParen) {
            self.advance();
            let name = self.ident()?;
            self.expect(TokenKind::RParen)?;
            OrderKey::MotifCount(name)
        } else {
            OrderKey::Field(field)
        };

        let ascending = match self.current().kind {
            TokenKind::Asc => {
                self.advance();
                true
            }
            TokenKind::Desc => {
                self.advance();
                false
            }
            _ => false,
        };
        Ok(OrderBy { key, ascending })
    }
}
