//! RQL Parser
//!
//! A hand-written recursive descent parser for the single-line RQL
//! query syntax, producing the canonical query tree.
//!
//! # Parsing approach
//!
//! The input is first split into top-level `key:value` clauses by a
//! small state machine that understands quoted strings, space-bearing
//! `order:` values, and parenthesized `where:(...)` blocks. Each
//! clause is then interpreted by a dedicated method; `where`
//! expressions go through their own tokenizer and a recursive descent
//! grammar with `and` binding tighter than `or`.
//!
//! # Clauses
//!
//! | Clause     | Value |
//! |------------|-------|
//! | `entity:`  | Entity name, stored verbatim |
//! | `limit:`   | Non-negative integer, no sign, no decimals |
//! | `order:`   | Comma-separated `field [asc\|desc]` terms |
//! | `include:` | Comma-separated relation names |
//! | `where:`   | Condition expression, usually parenthesized |
//!
//! Keys are matched case-insensitively and each may appear at most
//! once. Logical nodes of the resulting condition tree are flattened:
//! no `and` is a direct child of an `and`, and likewise for `or`.
//!
//! # Validation
//!
//! When a schema is supplied, a successful parse is followed by a
//! validation pass that checks the entity name, every `include`
//! relation, and every field referenced in `where` (unknown fields are
//! aggregated into a single error). `order:` fields are not checked.

pub(crate) mod clauses;
mod condition;
mod core;
mod error;
mod validate;

use tracing::{debug, trace};

pub use self::core::Parser;
pub use error::{ParseError, Result};

use crate::ast::Query;
use crate::schema::Schema;

/// Parses a query, optionally validating it against a schema.
///
/// # Errors
///
/// Returns a `ParseError` on malformed input or, when a schema is
/// supplied, on unknown entity, relation, or field references.
pub fn parse(input: &str, schema: Option<&Schema>) -> Result<Query> {
    trace!(input, "parsing query");
    let query = Parser::new(input).parse().inspect_err(|err| {
        debug!(input, error = %err, "parse failed");
    })?;
    if let Some(schema) = schema {
        validate::validate(&query, schema).inspect_err(|err| {
            debug!(input, error = %err, "validation failed");
        })?;
    }
    Ok(query)
}

/// Returns true if the input parses (and validates) cleanly.
#[must_use]
pub fn is_valid(input: &str, schema: Option<&Schema>) -> bool {
    parse(input, schema).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CompareOp, Condition, Value};
    use crate::schema::EntityDef;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_produces_canonical_json_shape() {
        let query = parse("entity:users limit:10 where:(status=active age>=18)", None).unwrap();
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "entity": "users",
                "limit": 10,
                "where": {"and": [
                    {"field": "status", "op": "=", "value": "active"},
                    {"field": "age", "op": ">=", "value": 18},
                ]},
            })
        );
    }

    #[test]
    fn test_parse_nested_groups_shape() {
        let query = parse(
            "entity:users where:((role=admin) OR (age>=18 AND verified=true))",
            None,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "entity": "users",
                "where": {"or": [
                    {"field": "role", "op": "=", "value": "admin"},
                    {"and": [
                        {"field": "age", "op": ">=", "value": 18},
                        {"field": "verified", "op": "=", "value": true},
                    ]},
                ]},
            })
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let query = parse("where:(a=1 OR b=2 AND c=3)", None).unwrap();
        assert_eq!(
            query.where_,
            Some(Condition::Or {
                or: vec![
                    Condition::comparison("a", CompareOp::Eq, Value::Int(1)),
                    Condition::And {
                        and: vec![
                            Condition::comparison("b", CompareOp::Eq, Value::Int(2)),
                            Condition::comparison("c", CompareOp::Eq, Value::Int(3)),
                        ]
                    },
                ]
            })
        );
    }

    #[test]
    fn test_round_trip_through_json_is_stable() {
        let query = parse(
            "entity:users limit:10 order:name desc include:posts where:(status=active)",
            None,
        )
        .unwrap();
        let encoded = serde_json::to_string(&query).unwrap();
        let decoded: Query = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, query);
    }

    #[test]
    fn test_is_valid_matches_parse_outcome() {
        let schema = Schema::new(vec![EntityDef::new("users")]);
        assert!(is_valid("entity:users", Some(&schema)));
        assert!(!is_valid("entity:ghosts", Some(&schema)));
        assert!(!is_valid("limit:-1", None));
        assert!(is_valid("", None));
    }

    #[test]
    fn test_scenario_limit_negative() {
        assert_eq!(
            parse("entity:users limit:-1", None).unwrap_err().to_string(),
            "limit must be non-negative"
        );
    }
}
