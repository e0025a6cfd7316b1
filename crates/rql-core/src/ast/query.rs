//! Query tree types.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Condition;

/// Sort direction for an order term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Attempts to parse a direction from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    /// Returns the RQL representation of the direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single term of an `order:` clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTerm {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    pub dir: OrderDirection,
}

impl OrderTerm {
    /// Creates a new order term.
    #[must_use]
    pub fn new(field: impl Into<String>, dir: OrderDirection) -> Self {
        Self {
            field: field.into(),
            dir,
        }
    }
}

/// A parsed RQL query.
///
/// Serializes to the canonical JSON shape: `entity`, `limit`, `order`
/// (array of `{field, dir}`), `include` (object mapping relation name
/// to `true`, insertion order preserved), and `where` (a [`Condition`]
/// tree). Absent clauses are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// The entity the query targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    /// Maximum number of results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// Sort terms, in source order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<OrderTerm>>,

    /// Relations to include, each mapped to `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<IndexMap<String, bool>>,

    /// The filter condition.
    #[serde(
        rename = "where",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub where_: Option<Condition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CompareOp, Value};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_direction_from_str_is_case_insensitive() {
        assert_eq!(OrderDirection::from_str("ASC"), Some(OrderDirection::Asc));
        assert_eq!(OrderDirection::from_str("Desc"), Some(OrderDirection::Desc));
        assert_eq!(OrderDirection::from_str("down"), None);
    }

    #[test]
    fn test_empty_query_serializes_to_empty_object() {
        assert_eq!(serde_json::to_value(Query::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_query_json_shape() {
        let mut include = IndexMap::new();
        include.insert("posts".to_string(), true);
        include.insert("comments".to_string(), true);
        let query = Query {
            entity: Some("users".into()),
            limit: Some(10),
            order: Some(vec![OrderTerm::new("name", OrderDirection::Desc)]),
            include: Some(include),
            where_: Some(Condition::comparison(
                "status",
                CompareOp::Eq,
                Value::String("active".into()),
            )),
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "entity": "users",
                "limit": 10,
                "order": [{"field": "name", "dir": "desc"}],
                "include": {"posts": true, "comments": true},
                "where": {"field": "status", "op": "=", "value": "active"},
            })
        );
    }

    #[test]
    fn test_query_round_trips_through_json() {
        let query = Query {
            entity: Some("items".into()),
            limit: Some(0),
            order: Some(vec![
                OrderTerm::new("price", OrderDirection::Asc),
                OrderTerm::new("name", OrderDirection::Asc),
            ]),
            include: None,
            where_: Some(Condition::comparison(
                "id",
                CompareOp::Eq,
                Value::String("18".into()),
            )),
        };
        let encoded = serde_json::to_string(&query).unwrap();
        let decoded: Query = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, query);
    }
}
