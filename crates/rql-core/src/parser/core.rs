//! Clause interpretation: turning split clauses into a [`Query`].

use std::sync::LazyLock;

use regex::Regex;

use super::clauses::{self, split_clauses, Clause, KEYS};
use super::condition::{unexpected_token, ConditionParser};
use super::error::{ParseError, Result};
use crate::ast::{Condition, OrderDirection, OrderTerm, Query};
use crate::lexer::Lexer;
use indexmap::IndexMap;

/// Non-negative integer with no sign and no decimal part.
static LIMIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("static limit pattern"));

/// Signed integer or decimal, used only to pick the error message for
/// rejected limits.
static SIGNED_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\d+(\.\d+)?$").expect("static signed number pattern"));

/// Unsigned decimal, used only to pick the error message for rejected
/// limits.
static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+$").expect("static decimal pattern"));

/// RQL parser.
///
/// Splits the input into top-level clauses and interprets each one.
/// Schema validation is a separate pass; see [`crate::parser::parse`].
pub struct Parser<'a> {
    input: &'a str,
    /// Keys already interpreted, for duplicate detection.
    seen: Vec<String>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            seen: Vec::new(),
        }
    }

    /// Parses the input into a query tree.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` on any malformed clause or `where`
    /// expression.
    pub fn parse(mut self) -> Result<Query> {
        let mut query = Query::default();
        for clause in split_clauses(self.input)? {
            self.apply_clause(&mut query, clause)?;
        }
        Ok(query)
    }

    /// Interprets a single `key:value` clause.
    fn apply_clause(&mut self, query: &mut Query, clause: Clause<'_>) -> Result<()> {
        let Some((raw_key, value)) = clause.text.split_once(':') else {
            return Err(ParseError::new(format!(
                "Invalid clause \"{}\": expected key:value",
                clause.text
            )));
        };

        let key = raw_key.to_ascii_lowercase();
        if !KEYS.contains(&key.as_str()) {
            return Err(ParseError::new(format!(
                "Unknown top-level key \"{raw_key}\""
            )));
        }
        if self.seen.contains(&key) {
            return Err(ParseError::new(format!("Duplicate top-level key: {key}")));
        }
        self.seen.push(key.clone());

        match key.as_str() {
            "entity" => {
                if value.is_empty() {
                    return Err(ParseError::new("entity must not be empty"));
                }
                query.entity = Some(value.to_string());
            }
            "limit" => query.limit = Some(parse_limit(value)?),
            "order" => query.order = Some(parse_order(value)?),
            "include" => query.include = Some(parse_include(value)?),
            _ => query.where_ = Some(parse_where(value)?),
        }
        Ok(())
    }
}

/// Parses a `limit:` value.
fn parse_limit(value: &str) -> Result<u64> {
    if LIMIT_RE.is_match(value) {
        return value
            .parse::<u64>()
            .map_err(|_| ParseError::new("limit must be a valid integer"));
    }
    if SIGNED_NUMBER_RE.is_match(value) {
        return Err(ParseError::new("limit must be non-negative"));
    }
    if DECIMAL_RE.is_match(value) {
        return Err(ParseError::new("limit must be an integer without decimals"));
    }
    Err(ParseError::new("limit must be a valid integer"))
}

/// Parses an `order:` value: comma-separated terms of a field name and
/// an optional direction.
fn parse_order(value: &str) -> Result<Vec<OrderTerm>> {
    let mut terms = Vec::new();
    for part in value.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let mut words = part.split_ascii_whitespace();
        let Some(field) = words.next() else {
            continue;
        };
        if OrderDirection::from_str(field).is_some() {
            return Err(ParseError::new(format!(
                "Invalid order term \"{part}\": order must be a field name"
            )));
        }
        let dir = match words.next() {
            None => OrderDirection::default(),
            Some(word) => OrderDirection::from_str(word).ok_or_else(|| {
                ParseError::new(format!(
                    "Invalid order direction \"{word}\": expected asc or desc"
                ))
            })?,
        };
        if words.next().is_some() {
            return Err(ParseError::new(format!(
                "Invalid order term \"{part}\": expected a field name and an optional direction"
            )));
        }
        terms.push(OrderTerm::new(field, dir));
    }
    Ok(terms)
}

/// Parses an `include:` value: comma-separated relation names.
fn parse_include(value: &str) -> Result<IndexMap<String, bool>> {
    let mut include = IndexMap::new();
    for part in value.split(',') {
        let name = part.trim();
        if name.is_empty() {
            return Err(ParseError::new("Empty include value"));
        }
        include.insert(name.to_string(), true);
    }
    Ok(include)
}

/// Strips one layer of outermost balanced parentheses, if present.
fn unwrap_parens(value: &str) -> &str {
    match clauses::matching_paren(value) {
        Some(idx) if idx == value.len() - 1 => &value[1..idx],
        _ => value,
    }
}

/// Parses a `where:` value into a condition tree.
fn parse_where(value: &str) -> Result<Condition> {
    let inner = unwrap_parens(value);
    if inner.trim().is_empty() {
        return Err(ParseError::new("Empty where clause"));
    }

    let tokens = Lexer::new(inner).tokenize()?;
    let mut parser = ConditionParser::new(&tokens);
    if parser.at_end() {
        return Err(ParseError::new("Empty or invalid where expression"));
    }
    let condition = parser.parse_or()?;
    if let Some(kind) = parser.peek() {
        return Err(unexpected_token(kind));
    }
    Ok(condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CompareOp, Value};
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Result<Query> {
        Parser::new(input).parse()
    }

    fn parse_err(input: &str) -> String {
        parse(input).unwrap_err().to_string()
    }

    #[test]
    fn test_entity_only() {
        let query = parse("entity:users").unwrap();
        assert_eq!(query.entity.as_deref(), Some("users"));
        assert_eq!(query.limit, None);
        assert_eq!(query.where_, None);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let query = parse("ENTITY:users Limit:10").unwrap();
        assert_eq!(query.entity.as_deref(), Some("users"));
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn test_entity_value_case_preserved() {
        let query = parse("entity:Users").unwrap();
        assert_eq!(query.entity.as_deref(), Some("Users"));
    }

    #[test]
    fn test_missing_colon() {
        assert_eq!(
            parse_err("entity:users bogus"),
            "Invalid clause \"bogus\": expected key:value"
        );
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(parse_err("select:users"), "Unknown top-level key \"select\"");
    }

    #[test]
    fn test_duplicate_key() {
        let duplicates = [
            ("entity:users entity:posts", "entity"),
            ("limit:1 LIMIT:2", "limit"),
            ("order:a order:b", "order"),
            ("include:a include:a", "include"),
            ("where:(a=1) where:(b=2)", "where"),
        ];
        for (input, key) in duplicates {
            assert_eq!(parse_err(input), format!("Duplicate top-level key: {key}"));
        }
    }

    #[test]
    fn test_empty_entity() {
        assert_eq!(parse_err("entity:"), "entity must not be empty");
    }

    #[test]
    fn test_limit_values() {
        assert_eq!(parse("limit:0").unwrap().limit, Some(0));
        assert_eq!(parse("limit:10").unwrap().limit, Some(10));
        assert_eq!(parse_err("limit:-1"), "limit must be non-negative");
        assert_eq!(
            parse_err("limit:1.5"),
            "limit must be an integer without decimals"
        );
        assert_eq!(parse_err("limit:ten"), "limit must be a valid integer");
        assert_eq!(parse_err("limit:+1"), "limit must be a valid integer");
        assert_eq!(parse_err("limit:"), "limit must be a valid integer");
    }

    #[test]
    fn test_order_terms() {
        let query = parse("entity:products order:price asc,name").unwrap();
        assert_eq!(
            query.order,
            Some(vec![
                OrderTerm::new("price", OrderDirection::Asc),
                OrderTerm::new("name", OrderDirection::Asc),
            ])
        );
    }

    #[test]
    fn test_order_direction_case_insensitive() {
        let query = parse("order:price DESC").unwrap();
        assert_eq!(
            query.order,
            Some(vec![OrderTerm::new("price", OrderDirection::Desc)])
        );
    }

    #[test]
    fn test_order_direction_as_field_is_an_error() {
        assert_eq!(
            parse_err("order:asc"),
            "Invalid order term \"asc\": order must be a field name"
        );
    }

    #[test]
    fn test_order_bad_direction() {
        assert_eq!(
            parse_err("order:price up"),
            "Invalid order direction \"up\": expected asc or desc"
        );
    }

    #[test]
    fn test_order_extra_tokens() {
        assert_eq!(
            parse_err("order:price asc extra"),
            "Invalid order term \"price asc extra\": expected a field name and an optional direction"
        );
    }

    #[test]
    fn test_include_list() {
        let query = parse("include:posts, comments").unwrap();
        let include = query.include.unwrap();
        assert_eq!(
            include.keys().collect::<Vec<_>>(),
            vec!["posts", "comments"]
        );
        assert!(include.values().all(|v| *v));
    }

    #[test]
    fn test_include_empty_item() {
        assert_eq!(parse_err("include:posts,,comments"), "Empty include value");
        assert_eq!(parse_err("include:"), "Empty include value");
    }

    #[test]
    fn test_where_simple() {
        let query = parse("entity:users where:(status=active)").unwrap();
        assert_eq!(
            query.where_,
            Some(Condition::comparison(
                "status",
                CompareOp::Eq,
                Value::String("active".into())
            ))
        );
    }

    #[test]
    fn test_where_without_parens() {
        let query = parse("where:status=active").unwrap();
        assert_eq!(
            query.where_,
            Some(Condition::comparison(
                "status",
                CompareOp::Eq,
                Value::String("active".into())
            ))
        );
    }

    #[test]
    fn test_where_implicit_and() {
        let query = parse("entity:users limit:10 where:(status=active age>=18)").unwrap();
        assert_eq!(
            query.where_,
            Some(Condition::And {
                and: vec![
                    Condition::comparison("status", CompareOp::Eq, Value::String("active".into())),
                    Condition::comparison("age", CompareOp::GtEq, Value::Int(18)),
                ]
            })
        );
    }

    #[test]
    fn test_where_quoted_number_is_string() {
        let query = parse(r#"entity:items where:(id="18")"#).unwrap();
        assert_eq!(
            query.where_,
            Some(Condition::comparison(
                "id",
                CompareOp::Eq,
                Value::String("18".into())
            ))
        );
    }

    #[test]
    fn test_where_empty() {
        assert_eq!(parse_err("where:()"), "Empty where clause");
        assert_eq!(parse_err("where:"), "Empty where clause");
    }

    #[test]
    fn test_where_group_not_unwrapped_when_not_outermost() {
        // `(a=1) OR (b=2)` must not lose its first group to unwrapping.
        let query = parse("where:((a=1) OR (b=2))").unwrap();
        assert_eq!(
            query.where_,
            Some(Condition::Or {
                or: vec![
                    Condition::comparison("a", CompareOp::Eq, Value::Int(1)),
                    Condition::comparison("b", CompareOp::Eq, Value::Int(2)),
                ]
            })
        );
    }

    #[test]
    fn test_where_unbalanced() {
        assert_eq!(
            parse_err("where:((a=1)"),
            "Unbalanced parentheses in where clause"
        );
    }

    #[test]
    fn test_where_unclosed_quote() {
        assert_eq!(
            parse_err(r#"where:(name="Jo)"#),
            "Unclosed quoted string in where clause"
        );
    }

    #[test]
    fn test_where_leftover_tokens() {
        assert_eq!(
            parse_err("where:(a=1 5)"),
            "Invalid value in where comparison"
        );
    }
}
