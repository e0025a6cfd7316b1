//! Cursor context classification.
//!
//! Stage A of the autocomplete pipeline: given a query string and a
//! byte cursor position, decide what kind of thing the user is typing.
//! The input is typically incomplete and often would not parse; every
//! function here is total.

use serde::{Deserialize, Serialize};

use crate::ast::CompareOp;
use crate::lexer::{is_query_whitespace, Lexer, Token, TokenKind};
use crate::parser::clauses::{
    entity_value, matching_paren, paren_depth, scan_clauses, used_keys,
};

/// Where the cursor sits within a query, and the partial text a
/// suggestion may replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CursorContext {
    /// Between clauses, or typing a key.
    TopLevel {
        /// The key prefix typed so far.
        partial: String,
        /// Keys already present anywhere in the query, lowercased,
        /// in first-appearance order.
        used_keys: Vec<String>,
    },
    /// Typing the value of `entity:`.
    EntityValue {
        /// The entity name typed so far.
        partial: String,
    },
    /// Typing the value of `limit:`.
    LimitValue {
        /// The number typed so far, trimmed.
        partial: String,
    },
    /// Typing an `order:` term.
    OrderValue {
        /// The word typed so far within the current term.
        partial: String,
        /// The value of the query's `entity:` clause, if any.
        entity_value: String,
        /// True when a field name has been typed and the cursor sits
        /// after it, where a direction may follow.
        after_field: bool,
    },
    /// Typing an `include:` relation name.
    IncludeValue {
        /// The relation name typed so far, trimmed.
        partial: String,
        /// The value of the query's `entity:` clause, if any.
        entity_value: String,
    },
    /// Typing a field name inside `where:(...)`.
    WhereField {
        /// The field name typed so far.
        partial: String,
        /// The value of the query's `entity:` clause, if any.
        entity_value: String,
    },
    /// Typing a comparison value inside `where:(...)`.
    WhereValue {
        /// The value typed so far (unquoted if a string).
        partial: String,
        /// The field on the left of the comparison.
        field: String,
        /// The comparison operator.
        op: CompareOp,
        /// The value of the query's `entity:` clause, if any.
        entity_value: String,
    },
    /// Anything unrecognized.
    Unknown {
        /// The segment under the cursor.
        partial: String,
    },
}

/// Classifies the cursor position within a query.
///
/// `cursor` is a byte offset; it is clamped into the query (and down
/// to a character boundary) so that no input can make this fail.
#[must_use]
pub fn context(query: &str, cursor: usize) -> CursorContext {
    let mut cursor = cursor.min(query.len());
    while cursor > 0 && !query.is_char_boundary(cursor) {
        cursor -= 1;
    }

    let used_keys = used_keys(query);
    let entity_value = entity_value(query);
    let prefix = &query[..cursor];

    // The clause containing the cursor is the last one of the prefix,
    // provided it actually touches the cursor; a cursor sitting in
    // trailing whitespace belongs to no clause.
    let clauses = scan_clauses(prefix);
    let segment = match clauses.last() {
        Some(clause) if clause.span.end == cursor => clause.text,
        _ => "",
    };

    classify(segment, used_keys, entity_value)
}

/// Maps a clause segment to a context.
fn classify(segment: &str, used_keys: Vec<String>, entity_value: String) -> CursorContext {
    if segment.is_empty() {
        return CursorContext::TopLevel {
            partial: String::new(),
            used_keys,
        };
    }

    let Some((raw_key, value)) = segment.split_once(':') else {
        return CursorContext::TopLevel {
            partial: segment.to_string(),
            used_keys,
        };
    };

    match raw_key.to_ascii_lowercase().as_str() {
        "entity" => CursorContext::EntityValue {
            partial: value.to_string(),
        },
        "limit" => CursorContext::LimitValue {
            partial: value.trim().to_string(),
        },
        "order" => order_context(value, entity_value, used_keys),
        "include" => CursorContext::IncludeValue {
            partial: value.rsplit(',').next().unwrap_or(value).trim().to_string(),
            entity_value,
        },
        "where" => where_context(value, entity_value, used_keys),
        _ => CursorContext::Unknown {
            partial: segment.to_string(),
        },
    }
}

/// Classifies a cursor inside an `order:` value.
fn order_context(value: &str, entity_value: String, used_keys: Vec<String>) -> CursorContext {
    let ends_with_space = value.chars().last().is_some_and(is_query_whitespace);

    // A space right after `order:` means the user moved on without
    // naming a field yet.
    if value.trim().is_empty() {
        if ends_with_space {
            return CursorContext::TopLevel {
                partial: String::new(),
                used_keys,
            };
        }
        return CursorContext::OrderValue {
            partial: String::new(),
            entity_value,
            after_field: false,
        };
    }

    let term = value.rsplit(',').next().unwrap_or(value);
    let term_ends_with_space = term.chars().last().is_some_and(is_query_whitespace);
    if term_ends_with_space && !term.trim().is_empty() {
        return CursorContext::OrderValue {
            partial: String::new(),
            entity_value,
            after_field: true,
        };
    }

    CursorContext::OrderValue {
        partial: term
            .split_ascii_whitespace()
            .last()
            .unwrap_or("")
            .to_string(),
        entity_value,
        after_field: false,
    }
}

/// Returns the raw source text of a token.
fn raw_text(inner: &str, token: &Token) -> String {
    inner[token.span.start..token.span.end].to_string()
}

/// Extracts a field name from a token, if it holds one.
fn field_text(token: Option<&Token>, inner: &str) -> String {
    match token.map(|token| &token.kind) {
        Some(TokenKind::Ident(text) | TokenKind::String(text)) => text.clone(),
        Some(TokenKind::Number(_) | TokenKind::Boolean(_)) => token
            .map(|token| raw_text(inner, token))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Classifies a cursor inside a `where:` value.
fn where_context(value: &str, entity_value: String, used_keys: Vec<String>) -> CursorContext {
    // Cursor immediately past a completed `where:(...)` block: back at
    // the top level.
    if matching_paren(value) == Some(value.len().saturating_sub(1)) {
        return CursorContext::TopLevel {
            partial: String::new(),
            used_keys,
        };
    }

    let mut inner = value.strip_prefix('(').unwrap_or(value);
    if inner.ends_with(')') && paren_depth(inner) < 0 {
        inner = &inner[..inner.len() - 1];
    }

    // Whitespace before the cursor starts a new (implicit-and) field.
    if inner.chars().last().is_some_and(is_query_whitespace) {
        return CursorContext::WhereField {
            partial: String::new(),
            entity_value,
        };
    }

    let tokens = Lexer::new(inner).tokenize_lossy();
    let Some(last) = tokens.last() else {
        return CursorContext::WhereField {
            partial: String::new(),
            entity_value,
        };
    };
    let prev = tokens.len().checked_sub(2).and_then(|idx| tokens.get(idx));
    let prev_prev = tokens.len().checked_sub(3).and_then(|idx| tokens.get(idx));

    match &last.kind {
        TokenKind::Op(op) => CursorContext::WhereValue {
            partial: String::new(),
            field: field_text(prev, inner),
            op: *op,
            entity_value,
        },
        TokenKind::String(text) => match prev.map(|token| &token.kind) {
            Some(TokenKind::Op(op)) => CursorContext::WhereValue {
                partial: text.clone(),
                field: field_text(prev_prev, inner),
                op: *op,
                entity_value,
            },
            _ => CursorContext::WhereField {
                partial: text.clone(),
                entity_value,
            },
        },
        TokenKind::Ident(_) | TokenKind::Number(_) | TokenKind::Boolean(_) => {
            let partial = raw_text(inner, last);
            match prev.map(|token| &token.kind) {
                Some(TokenKind::Op(op)) => CursorContext::WhereValue {
                    partial,
                    field: field_text(prev_prev, inner),
                    op: *op,
                    entity_value,
                },
                _ => CursorContext::WhereField {
                    partial,
                    entity_value,
                },
            }
        }
        TokenKind::LParen | TokenKind::RParen | TokenKind::Keyword(_) => {
            CursorContext::WhereField {
                partial: String::new(),
                entity_value,
            }
        }
    }
}
