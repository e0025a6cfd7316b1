//! Top-level clause splitting.
//!
//! A query is an ordered sequence of whitespace-separated `key:value`
//! clauses. Two keys need more than "consume until whitespace": an
//! `order:` value may contain spaces (`order:price asc,name desc`), so
//! it extends until the next recognized `key:` that follows
//! whitespace; and a `where:(...)` value extends through its matching
//! closing parenthesis, skipping quoted strings.
//!
//! The scanner comes in a strict flavor for the parser and a lossy
//! flavor for the autocomplete engine. The lossy flavor never fails:
//! an unclosed quote or an unbalanced `where` block simply extends to
//! the end of the input.

use super::error::{ParseError, Result};
use crate::lexer::{is_query_whitespace, Span};

/// The recognized top-level keys.
pub(crate) const KEYS: [&str; 5] = ["entity", "limit", "order", "include", "where"];

/// A single top-level clause and its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Clause<'a> {
    /// The clause text, exactly as written.
    pub text: &'a str,
    /// The byte range the clause occupies in the query.
    pub span: Span,
}

/// Returns true if `rest` starts with `key` (ASCII case-insensitive)
/// immediately followed by a colon.
pub(crate) fn has_key_prefix(rest: &str, key: &str) -> bool {
    let bytes = rest.as_bytes();
    let key = key.as_bytes();
    bytes.len() > key.len()
        && bytes[key.len()] == b':'
        && bytes[..key.len()].eq_ignore_ascii_case(key)
}

/// Returns true if `rest` starts with any recognized `key:`.
fn at_recognized_key(rest: &str) -> bool {
    KEYS.iter().any(|key| has_key_prefix(rest, key))
}

/// Walks a query left to right, producing clauses.
struct ClauseScanner<'a> {
    input: &'a str,
    pos: usize,
    /// In lossy mode malformed input extends the clause to end-of-input
    /// instead of failing.
    lossy: bool,
}

impl<'a> ClauseScanner<'a> {
    const fn new(input: &'a str, lossy: bool) -> Self {
        Self {
            input,
            pos: 0,
            lossy,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_query_whitespace) {
            self.advance();
        }
    }

    /// Consumes a quoted string starting at the current `"`. Returns
    /// false if the input ended before the closing quote.
    fn skip_string(&mut self) -> bool {
        self.advance(); // opening quote
        loop {
            match self.advance() {
                Some('"') => return true,
                Some('\\') => {
                    self.advance();
                }
                Some(_) => {}
                None => return false,
            }
        }
    }

    /// Consumes an `order:` clause: the value runs until whitespace
    /// followed by a recognized `key:`, or to end-of-input.
    fn scan_order_clause(&mut self) {
        self.pos += "order:".len();
        while let Some(c) = self.peek() {
            if is_query_whitespace(c) {
                let run_start = self.pos;
                self.skip_whitespace();
                if at_recognized_key(&self.input[self.pos..]) {
                    self.pos = run_start;
                    return;
                }
            } else {
                self.advance();
            }
        }
    }

    /// Consumes a `where:(...)` clause through its matching `)`,
    /// skipping quoted strings.
    fn scan_where_block(&mut self) -> Result<()> {
        self.pos += "where:(".len();
        let mut depth = 1u32;
        while let Some(c) = self.peek() {
            match c {
                '"' => {
                    if !self.skip_string() && !self.lossy {
                        return Err(ParseError::new("Unclosed quoted string in where clause"));
                    }
                }
                '(' => {
                    depth += 1;
                    self.advance();
                }
                ')' => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
        if self.lossy {
            Ok(())
        } else {
            Err(ParseError::new("Unbalanced parentheses in where clause"))
        }
    }

    /// Consumes a quoted-string clause. A top-level clause cannot
    /// legitimately start with a quote; it is still scanned as one
    /// token so the error surfaces during interpretation.
    fn scan_quoted_clause(&mut self) -> Result<()> {
        if !self.skip_string() && !self.lossy {
            return Err(ParseError::new("Unclosed quoted string"));
        }
        Ok(())
    }

    /// Consumes a plain clause up to the next whitespace.
    fn scan_plain_clause(&mut self) {
        while self.peek().is_some_and(|c| !is_query_whitespace(c)) {
            self.advance();
        }
    }

    fn next_clause(&mut self) -> Option<Result<Clause<'a>>> {
        self.skip_whitespace();
        let start = self.pos;
        let rest = &self.input[self.pos..];
        if rest.is_empty() {
            return None;
        }

        let scanned = if rest.starts_with('"') {
            self.scan_quoted_clause()
        } else if has_key_prefix(rest, "order") {
            self.scan_order_clause();
            Ok(())
        } else if has_key_prefix(rest, "where") && rest.as_bytes().get(6) == Some(&b'(') {
            self.scan_where_block()
        } else {
            self.scan_plain_clause();
            Ok(())
        };

        if let Err(err) = scanned {
            return Some(Err(err));
        }
        Some(Ok(Clause {
            text: &self.input[start..self.pos],
            span: Span::new(start, self.pos),
        }))
    }
}

/// Returns the byte index of the `)` that closes the `(` opening
/// `value`, skipping quoted strings, or `None` if `value` does not
/// start with `(` or the paren never closes.
pub(crate) fn matching_paren(value: &str) -> Option<usize> {
    if !value.starts_with('(') {
        return None;
    }
    let mut depth = 0u32;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, c) in value.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Computes the final paren nesting depth of `value`, skipping quoted
/// strings. Negative when a `)` closes more than was opened.
pub(crate) fn paren_depth(value: &str) -> i32 {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for c in value.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Splits a query into clauses, rejecting malformed input.
pub(crate) fn split_clauses(input: &str) -> Result<Vec<Clause<'_>>> {
    let mut scanner = ClauseScanner::new(input, false);
    let mut clauses = Vec::new();
    while let Some(clause) = scanner.next_clause() {
        clauses.push(clause?);
    }
    Ok(clauses)
}

/// Splits a query into clauses without ever failing.
pub(crate) fn scan_clauses(input: &str) -> Vec<Clause<'_>> {
    let mut scanner = ClauseScanner::new(input, true);
    let mut clauses = Vec::new();
    while let Some(Ok(clause)) = scanner.next_clause() {
        clauses.push(clause);
    }
    clauses
}

/// Collects each recognized top-level key of the query, lowercased,
/// once, in first-appearance order.
pub(crate) fn used_keys(input: &str) -> Vec<String> {
    let mut keys = Vec::new();
    for clause in scan_clauses(input) {
        if let Some((raw, _)) = clause.text.split_once(':') {
            let key = raw.to_ascii_lowercase();
            if KEYS.contains(&key.as_str()) && !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}

/// Extracts the value of the first `entity:` clause, trimmed, or an
/// empty string if the query has none.
pub(crate) fn entity_value(input: &str) -> String {
    for clause in scan_clauses(input) {
        if has_key_prefix(clause.text, "entity") {
            return clause.text["entity:".len()..].trim().to_string();
        }
    }
    String::new()
}
