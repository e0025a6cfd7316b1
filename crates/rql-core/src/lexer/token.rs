//! Token types for the `where` expression lexer.

use std::sync::LazyLock;

use regex::Regex;

use super::Span;
use crate::ast::{CompareOp, Value};

/// Numeric token shape: an optional sign, digits, and an optional
/// fractional part.
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("static number pattern"));

/// Logical keywords inside a `where` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// Conjunction (`and`, any case).
    And,
    /// Disjunction (`or`, any case).
    Or,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("and") {
            Some(Self::And)
        } else if s.eq_ignore_ascii_case("or") {
            Some(Self::Or)
        } else {
            None
        }
    }

    /// Returns the lowercased keyword text.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// The kind of a `where` expression token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// A comparison operator.
    Op(CompareOp),
    /// `and` or `or`.
    Keyword(Keyword),
    /// A double-quoted string, with escapes applied.
    String(String),
    /// An unquoted numeric literal ([`Value::Int`] or [`Value::Float`]).
    Number(Value),
    /// An unquoted `true` or `false` (any case).
    Boolean(bool),
    /// Any other run of non-delimiter characters.
    Ident(String),
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was scanned.
    pub kind: TokenKind,
    /// Where it was scanned, as byte offsets into the expression.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Classifies an unquoted word: keyword, boolean, number, or ident.
///
/// Integer-shaped words parse as integers, fractional ones as floats.
/// An integer too large for `i64` falls back to a float.
#[must_use]
pub(crate) fn classify_word(text: &str) -> TokenKind {
    if let Some(keyword) = Keyword::from_str(text) {
        return TokenKind::Keyword(keyword);
    }
    if text.eq_ignore_ascii_case("true") {
        return TokenKind::Boolean(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return TokenKind::Boolean(false);
    }
    if NUMBER_RE.is_match(text) {
        if !text.contains('.') {
            if let Ok(i) = text.parse::<i64>() {
                return TokenKind::Number(Value::Int(i));
            }
        }
        if let Ok(f) = text.parse::<f64>() {
            return TokenKind::Number(Value::Float(f));
        }
    }
    TokenKind::Ident(text.to_string())
}
