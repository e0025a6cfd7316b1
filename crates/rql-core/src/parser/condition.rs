//! Recursive descent parser for `where` expressions.
//!
//! Grammar (left-associative, `and` binds tighter than `or`, and
//! adjacency of two primaries is an implicit `and`):
//!
//! ```text
//! Or         := And ("or" And)*
//! And        := Primary (("and")? Primary)*
//! Primary    := "(" Or ")" | Comparison
//! Comparison := FieldTok OpTok? ValueTok      // default op "="
//! ```

use super::error::{ParseError, Result};
use crate::ast::{CompareOp, Condition, Value};
use crate::lexer::{Keyword, Token, TokenKind};

/// Parses a token stream into a flattened condition tree.
pub(crate) struct ConditionParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

/// Maps a token that cannot continue the grammar to the error the
/// caller reports.
pub(crate) fn unexpected_token(kind: &TokenKind) -> ParseError {
    match kind {
        TokenKind::RParen => ParseError::new("Unbalanced parentheses in where clause"),
        TokenKind::Op(_) => ParseError::new("Incomplete comparison in where clause"),
        _ => ParseError::new("Invalid value in where comparison"),
    }
}

impl<'a> ConditionParser<'a> {
    /// Creates a parser over the given tokens.
    pub(crate) const fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Returns true once every token has been consumed.
    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Returns the next unconsumed token kind, if any.
    pub(crate) fn peek(&self) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos).map(|token| &token.kind)
    }

    fn advance(&mut self) -> Option<&'a TokenKind> {
        let kind = self.peek()?;
        self.pos += 1;
        Some(kind)
    }

    /// Returns true if the next token can start a primary.
    fn at_primary_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(TokenKind::LParen | TokenKind::Ident(_) | TokenKind::String(_))
        )
    }

    /// Parses a disjunction.
    pub(crate) fn parse_or(&mut self) -> Result<Condition> {
        if matches!(self.peek(), Some(TokenKind::Keyword(Keyword::Or))) {
            return Err(ParseError::new("Invalid where: OR with no left side"));
        }

        let mut children = vec![self.parse_and()?];
        while matches!(self.peek(), Some(TokenKind::Keyword(Keyword::Or))) {
            self.advance();
            if !self.at_primary_start()
                && !matches!(self.peek(), Some(TokenKind::Keyword(Keyword::And)))
            {
                return Err(ParseError::new("Invalid where: OR with no right side"));
            }
            children.push(self.parse_and()?);
        }
        Ok(Condition::or_of(children))
    }

    /// Parses a conjunction, treating adjacent primaries as an
    /// implicit `and`.
    fn parse_and(&mut self) -> Result<Condition> {
        if matches!(self.peek(), Some(TokenKind::Keyword(Keyword::And))) {
            return Err(ParseError::new("Invalid where: AND with no left side"));
        }

        let mut children = vec![self.parse_primary()?];
        loop {
            if matches!(self.peek(), Some(TokenKind::Keyword(Keyword::And))) {
                self.advance();
                if !self.at_primary_start() {
                    return Err(ParseError::new("Invalid where: AND with no right side"));
                }
                children.push(self.parse_primary()?);
            } else if self.at_primary_start() {
                children.push(self.parse_primary()?);
            } else {
                break;
            }
        }
        Ok(Condition::and_of(children))
    }

    /// Parses a parenthesized group or a comparison.
    fn parse_primary(&mut self) -> Result<Condition> {
        match self.peek() {
            Some(TokenKind::LParen) => {
                self.advance();
                if matches!(self.peek(), Some(TokenKind::RParen)) {
                    return Err(ParseError::new("Empty parenthetical expression"));
                }
                let inner = self.parse_or()?;
                match self.peek() {
                    Some(TokenKind::RParen) => {
                        self.advance();
                        Ok(inner)
                    }
                    Some(other) => Err(unexpected_token(other)),
                    None => Err(ParseError::new("Missing closing parenthesis")),
                }
            }
            Some(TokenKind::Ident(_) | TokenKind::String(_)) => self.parse_comparison(),
            Some(other) => Err(unexpected_token(other)),
            None => Err(ParseError::new("Empty or invalid where expression")),
        }
    }

    /// Parses a `field op? value` comparison.
    fn parse_comparison(&mut self) -> Result<Condition> {
        let field = match self.advance() {
            Some(TokenKind::Ident(name) | TokenKind::String(name)) => name.clone(),
            _ => return Err(ParseError::new("Empty or invalid where expression")),
        };

        let op = if let Some(TokenKind::Op(op)) = self.peek() {
            let op = *op;
            self.advance();
            op
        } else {
            CompareOp::Eq
        };

        let value = match self.peek() {
            Some(TokenKind::Ident(text)) => Value::String(text.clone()),
            Some(TokenKind::String(text)) => Value::String(text.clone()),
            Some(TokenKind::Number(value)) => value.clone(),
            Some(TokenKind::Boolean(b)) => Value::Bool(*b),
            Some(TokenKind::RParen) | None => {
                return Err(ParseError::new("Incomplete comparison in where clause"));
            }
            Some(TokenKind::LParen | TokenKind::Op(_) | TokenKind::Keyword(_)) => {
                return Err(ParseError::new("Invalid value in where comparison"));
            }
        };
        self.advance();

        Ok(Condition::Comparison { field, op, value })
    }
}
