//! Condition tree types for `where` expressions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison operators usable inside a `where` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// Equality (`=`).
    #[serde(rename = "=")]
    Eq,
    /// Inequality (`!=`).
    #[serde(rename = "!=")]
    NotEq,
    /// Less than (`<`).
    #[serde(rename = "<")]
    Lt,
    /// Greater than (`>`).
    #[serde(rename = ">")]
    Gt,
    /// Less than or equal (`<=`).
    #[serde(rename = "<=")]
    LtEq,
    /// Greater than or equal (`>=`).
    #[serde(rename = ">=")]
    GtEq,
}

impl CompareOp {
    /// All operators, in suggestion order.
    pub const ALL: [Self; 6] = [
        Self::Eq,
        Self::NotEq,
        Self::Lt,
        Self::Gt,
        Self::LtEq,
        Self::GtEq,
    ];

    /// Returns the RQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal comparison value.
///
/// The integer/float distinction is preserved: `18` stays an integer
/// while `18.5` becomes a float, and quoted values are always strings
/// even when they look numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// String literal.
    String(String),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A `where` condition tree.
///
/// Serializes to the canonical JSON union: `{field, op, value}` for
/// comparisons, `{"and": [...]}` and `{"or": [...]}` for logical nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// A leaf comparison.
    Comparison {
        /// The field name.
        field: String,
        /// The comparison operator.
        op: CompareOp,
        /// The literal value.
        value: Value,
    },
    /// A conjunction of two or more conditions.
    And {
        /// The children, in source order.
        and: Vec<Condition>,
    },
    /// A disjunction of two or more conditions.
    Or {
        /// The children, in source order.
        or: Vec<Condition>,
    },
}

impl Condition {
    /// Creates a leaf comparison.
    #[must_use]
    pub fn comparison(field: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Self::Comparison {
            field: field.into(),
            op,
            value,
        }
    }

    /// Builds a conjunction, flattening nested `And` children and
    /// collapsing a single child to the child itself.
    #[must_use]
    pub fn and_of(children: Vec<Self>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Self::And { and } => flat.extend(and),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Self::And { and: flat }
        }
    }

    /// Builds a disjunction, flattening nested `Or` children and
    /// collapsing a single child to the child itself.
    #[must_use]
    pub fn or_of(children: Vec<Self>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Self::Or { or } => flat.extend(or),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Self::Or { or: flat }
        }
    }
}
