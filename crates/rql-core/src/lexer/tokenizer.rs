//! Tokenizer for `where` expressions.

use super::token::classify_word;
use super::{is_query_whitespace, Span, Token, TokenKind};
use crate::ast::CompareOp;
use crate::parser::ParseError;

/// Characters that terminate an unquoted word.
const fn is_delimiter(c: char) -> bool {
    is_query_whitespace(c) || matches!(c, '(' | ')' | '"' | '=' | '<' | '>' | '!')
}

/// A lexer that tokenizes a `where` expression.
///
/// Two modes are offered: [`tokenize`](Lexer::tokenize) rejects
/// unclosed quotes and stray characters, while
/// [`tokenize_lossy`](Lexer::tokenize_lossy) accepts anything and is
/// used on the in-progress input seen by the autocomplete engine.
pub struct Lexer<'a> {
    /// The expression source.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given expression.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes the given character if it is next.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skips whitespace.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_query_whitespace) {
            self.advance();
        }
    }

    /// Creates a token spanning from the token start to the current position.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    /// Scans a quoted string, applying the escapes `\"` → `"`,
    /// `\\` → `\`, and `\x` → `x`. Returns the unescaped content and
    /// whether the closing quote was found.
    fn scan_string(&mut self) -> (String, bool) {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.advance() {
                Some('"') => return (value, true),
                Some('\\') => {
                    if let Some(escaped) = self.advance() {
                        value.push(escaped);
                    }
                }
                Some(c) => value.push(c),
                None => return (value, false),
            }
        }
    }

    /// Scans an unquoted word (maximal run of non-delimiter characters).
    fn scan_word(&mut self) -> &'a str {
        while self.peek().is_some_and(|c| !is_delimiter(c)) {
            self.advance();
        }
        &self.input[self.start..self.pos]
    }

    /// Scans the next token, rejecting malformed input.
    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_whitespace();
        self.start = self.pos;

        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let kind = match c {
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            '"' => {
                let (value, terminated) = self.scan_string();
                if !terminated {
                    return Err(ParseError::new("Unclosed quoted string in where clause"));
                }
                TokenKind::String(value)
            }
            '=' => {
                self.advance();
                TokenKind::Op(CompareOp::Eq)
            }
            '<' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::Op(CompareOp::LtEq)
                } else {
                    TokenKind::Op(CompareOp::Lt)
                }
            }
            '>' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::Op(CompareOp::GtEq)
                } else {
                    TokenKind::Op(CompareOp::Gt)
                }
            }
            '!' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::Op(CompareOp::NotEq)
                } else {
                    return Err(ParseError::new("Unexpected character in where clause"));
                }
            }
            _ => classify_word(self.scan_word()),
        };

        Ok(Some(self.make_token(kind)))
    }

    /// Scans the next token, tolerating malformed input: an unclosed
    /// quote yields a string token holding the remainder and a lone
    /// `!` becomes an ident.
    fn next_token_lossy(&mut self) -> Option<Token> {
        self.skip_whitespace();
        self.start = self.pos;

        let c = self.peek()?;

        let kind = match c {
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            '"' => {
                let (value, _) = self.scan_string();
                TokenKind::String(value)
            }
            '=' => {
                self.advance();
                TokenKind::Op(CompareOp::Eq)
            }
            '<' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::Op(CompareOp::LtEq)
                } else {
                    TokenKind::Op(CompareOp::Lt)
                }
            }
            '>' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::Op(CompareOp::GtEq)
                } else {
                    TokenKind::Op(CompareOp::Gt)
                }
            }
            '!' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::Op(CompareOp::NotEq)
                } else {
                    TokenKind::Ident("!".to_string())
                }
            }
            _ => classify_word(self.scan_word()),
        };

        Some(self.make_token(kind))
    }

    /// Tokenizes the entire expression.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` on an unclosed quoted string or a `!`
    /// not followed by `=`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Tokenizes the entire expression without ever failing.
    #[must_use]
    pub fn tokenize_lossy(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token_lossy() {
            tokens.push(token);
        }
        tokens
    }
}
