//! Suggestion synthesis.
//!
//! Stage B of the autocomplete pipeline: turn a [`CursorContext`] into
//! a ranked, prefix-filtered, deduplicated list of suggestions drawn
//! from the schema. Ordering is deterministic: candidates appear in
//! schema declaration order and a set-based dedup keeps the first
//! appearance of each name.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::context::{context, CursorContext};
use crate::ast::CompareOp;
use crate::schema::Schema;

/// The fixed top-level key completions.
const TOP_LEVEL: [(&str, &str); 5] = [
    ("entity", "entity:"),
    ("limit", "limit:"),
    ("order", "order:"),
    ("include", "include:"),
    ("where", "where:("),
];

/// A single completion the client can apply.
///
/// When `replace_partial` is true, `replace_length` is the byte length
/// of the context's partial, and the client splices
/// `text[0..cursor - replace_length] + insert_text + text[cursor..]`.
/// When it is false, `replace_length` is zero and `insert_text` is
/// inserted at the cursor as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// The display label.
    pub label: String,
    /// The text to insert.
    pub insert_text: String,
    /// Whether the current partial should be replaced.
    #[serde(default = "default_replace_partial")]
    pub replace_partial: bool,
    /// Byte length of the partial to replace.
    #[serde(default)]
    pub replace_length: usize,
}

const fn default_replace_partial() -> bool {
    true
}

impl Suggestion {
    /// A suggestion that replaces the current partial.
    fn replacing(label: impl Into<String>, partial: &str) -> Self {
        let label = label.into();
        Self {
            insert_text: label.clone(),
            label,
            replace_partial: true,
            replace_length: partial.len(),
        }
    }

    /// A suggestion inserted at the cursor without replacing anything.
    fn inserting(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            insert_text: label.clone(),
            label,
            replace_partial: false,
            replace_length: 0,
        }
    }
}

/// ASCII case-insensitive prefix test.
fn matches_prefix(candidate: &str, partial: &str) -> bool {
    candidate.len() >= partial.len()
        && candidate.as_bytes()[..partial.len()].eq_ignore_ascii_case(partial.as_bytes())
}

/// Appends `candidate` if it matches the partial and was not already
/// suggested.
fn push_match(
    out: &mut Vec<Suggestion>,
    seen: &mut HashSet<String>,
    candidate: &str,
    partial: &str,
) {
    if matches_prefix(candidate, partial) && seen.insert(candidate.to_string()) {
        out.push(Suggestion::replacing(candidate, partial));
    }
}

/// Produces suggestions for a cursor context.
///
/// Total for every context; contexts with no sensible candidates
/// (limit values, unknown segments) yield an empty list.
#[must_use]
pub fn suggest(context: &CursorContext, schema: &Schema) -> Vec<Suggestion> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();

    match context {
        CursorContext::TopLevel { partial, used_keys } => {
            for (key, label) in TOP_LEVEL {
                if used_keys.iter().any(|used| used == key) {
                    continue;
                }
                if matches_prefix(label, partial) {
                    out.push(Suggestion::replacing(label, partial));
                }
            }
        }

        CursorContext::EntityValue { partial } => {
            for name in schema.entity_names() {
                push_match(&mut out, &mut seen, name, partial);
            }
        }

        CursorContext::LimitValue { .. } | CursorContext::Unknown { .. } => {}

        CursorContext::IncludeValue {
            partial,
            entity_value,
        } => {
            for entity in schema.relevant_entities(entity_value) {
                for relation in entity.relation_names() {
                    push_match(&mut out, &mut seen, relation, partial);
                }
            }
        }

        CursorContext::OrderValue {
            partial,
            entity_value,
            after_field,
        } => {
            for entity in schema.relevant_entities(entity_value) {
                for field in entity.field_names() {
                    push_match(&mut out, &mut seen, field, partial);
                }
            }
            if *after_field {
                push_match(&mut out, &mut seen, "asc", partial);
                push_match(&mut out, &mut seen, "desc", partial);
            }
        }

        CursorContext::WhereField {
            partial,
            entity_value,
        } => {
            let entities = schema.relevant_entities(entity_value);
            // A fully typed field name switches to operator completions.
            if entities
                .iter()
                .any(|entity| entity.field_names().any(|field| field == partial))
            {
                return CompareOp::ALL
                    .iter()
                    .map(|op| Suggestion::inserting(op.as_str()))
                    .collect();
            }
            for entity in entities {
                for field in entity.field_names() {
                    push_match(&mut out, &mut seen, field, partial);
                }
            }
        }

        CursorContext::WhereValue {
            partial,
            field,
            entity_value,
            ..
        } => {
            for entity in schema.relevant_entities(entity_value) {
                if let Some(values) = entity.field(field).and_then(|def| def.values.as_ref()) {
                    for value in values {
                        push_match(&mut out, &mut seen, value, partial);
                    }
                }
            }
        }
    }

    out
}

/// Classifies the cursor and produces suggestions in one call.
#[must_use]
pub fn suggest_at(query: &str, cursor: usize, schema: &Schema) -> Vec<Suggestion> {
    let ctx = context(query, cursor);
    let suggestions = suggest(&ctx, schema);
    trace!(cursor, count = suggestions.len(), "computed suggestions");
    suggestions
}
