//! Schema validation of parsed queries.
//!
//! Runs only after a successful syntactic parse. Unknown-field errors
//! are aggregated across the whole `where` tree and reported once;
//! every other check aborts on the first failure. `order:` fields are
//! deliberately not checked.

use super::error::{ParseError, Result};
use crate::ast::{Condition, Query};
use crate::schema::{EntityDef, Schema};

/// Validates entity, relation, and field references against a schema.
///
/// A query without an `entity:` clause has nothing to resolve names
/// against and passes unchecked.
pub(crate) fn validate(query: &Query, schema: &Schema) -> Result<()> {
    let Some(entity_name) = query.entity.as_deref() else {
        return Ok(());
    };

    let Some(entity) = schema.entity(entity_name) else {
        return Err(ParseError::new(format!(
            "Unknown entity \"{entity_name}\". Known entities: {}",
            schema.entity_names().collect::<Vec<_>>().join(", ")
        )));
    };

    if let Some(include) = &query.include {
        let relations = entity.relation_names();
        for name in include.keys() {
            if !relations.iter().any(|relation| relation == name) {
                return Err(ParseError::new(format!(
                    "Unknown relation \"{name}\" for entity \"{entity_name}\". \
                     Known relations: {}",
                    relations.join(", ")
                )));
            }
        }
    }

    if let Some(condition) = &query.where_ {
        let mut unknown = Vec::new();
        collect_unknown_fields(condition, entity, &mut unknown);
        if !unknown.is_empty() {
            return Err(ParseError::new(format!(
                "Unknown field(s) for entity \"{entity_name}\": {}. Known fields: {}",
                unknown.join(", "),
                entity.field_names().collect::<Vec<_>>().join(", ")
            )));
        }
    }

    Ok(())
}

/// Collects unknown field names across the tree, deduplicated in
/// first-appearance order.
fn collect_unknown_fields(condition: &Condition, entity: &EntityDef, unknown: &mut Vec<String>) {
    match condition {
        Condition::Comparison { field, .. } => {
            if entity.field(field).is_none() && !unknown.iter().any(|name| name == field) {
                unknown.push(field.clone());
            }
        }
        Condition::And { and: children } | Condition::Or { or: children } => {
            for child in children {
                collect_unknown_fields(child, entity, unknown);
            }
        }
    }
}
