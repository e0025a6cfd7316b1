//! Schema model describing entities, their relations, and their fields.
//!
//! A [`Schema`] is a passive, immutable input consumed by the parser's
//! validation pass and by the autocomplete engine. How an application
//! loads its schema is out of scope; this module only defines the
//! in-memory shape and its JSON form:
//!
//! ```json
//! { "entities": [ { "name": "users",
//!                   "relations": ["posts"],
//!                   "fields": { "status": { "type": "string",
//!                                           "values": ["active", "banned"] } } } ] }
//! ```
//!
//! Entity, relation, and field names are compared case-sensitively for
//! validation and case-insensitively for autocomplete prefix matching.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Advisory type tag for a field.
///
/// The tag is not enforced against literal value types during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// String values.
    String,
    /// Numeric values.
    Number,
    /// Boolean values.
    Boolean,
}

/// A field of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Advisory type tag.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,

    /// Example or enumerated values, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

impl FieldDef {
    /// Creates an untyped field with no declared values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the type tag.
    #[must_use]
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Sets the declared values.
    #[must_use]
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// An entity definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    /// The entity name.
    pub name: String,

    /// Relation names resolvable through `include:`, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<String>>,

    /// Fields referenceable in `where:` and `order:`, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<IndexMap<String, FieldDef>>,
}

impl EntityDef {
    /// Creates an entity with no relations and no fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relations: None,
            fields: None,
        }
    }

    /// Adds a relation.
    #[must_use]
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relations
            .get_or_insert_with(Vec::new)
            .push(relation.into());
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), def);
        self
    }

    /// Returns the relation names, or an empty slice if none are declared.
    #[must_use]
    pub fn relation_names(&self) -> &[String] {
        self.relations.as_deref().unwrap_or_default()
    }

    /// Iterates over field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .flat_map(|fields| fields.keys().map(String::as_str))
    }

    /// Looks up a field by exact name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.as_ref().and_then(|fields| fields.get(name))
    }
}

/// An ordered collection of entity definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// The entities, in declaration order.
    pub entities: Vec<EntityDef>,
}

impl Schema {
    /// Creates a schema from a list of entities.
    #[must_use]
    pub fn new(entities: Vec<EntityDef>) -> Self {
        Self { entities }
    }

    /// Looks up an entity by exact (case-sensitive) name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    /// Iterates over entity names in declaration order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|entity| entity.name.as_str())
    }

    /// Returns the entities whose names equal or start with
    /// `entity_value`, compared ASCII case-insensitively.
    ///
    /// An empty `entity_value` matches every entity. This is the
    /// suggestion pool used by the autocomplete engine, so that typing
    /// `entity:u` draws fields and relations from both `user` and
    /// `users`.
    #[must_use]
    pub fn relevant_entities(&self, entity_value: &str) -> Vec<&EntityDef> {
        self.entities
            .iter()
            .filter(|entity| {
                entity.name.len() >= entity_value.len()
                    && entity.name.as_bytes()[..entity_value.len()]
                        .eq_ignore_ascii_case(entity_value.as_bytes())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Schema {
        Schema::new(vec![
            EntityDef::new("user")
                .with_relation("posts")
                .with_field("name", FieldDef::new().with_type(FieldType::String)),
            EntityDef::new("users")
                .with_relation("posts")
                .with_relation("comments")
                .with_field(
                    "status",
                    FieldDef::new()
                        .with_type(FieldType::String)
                        .with_values(["active", "banned"]),
                ),
            EntityDef::new("products"),
        ])
    }

    #[test]
    fn test_entity_lookup_is_case_sensitive() {
        let schema = sample();
        assert!(schema.entity("users").is_some());
        assert!(schema.entity("Users").is_none());
    }

    #[test]
    fn test_relevant_entities_prefix_match() {
        let schema = sample();
        let names: Vec<_> = schema
            .relevant_entities("U")
            .into_iter()
            .map(|entity| entity.name.as_str())
            .collect();
        assert_eq!(names, vec!["user", "users"]);
    }

    #[test]
    fn test_relevant_entities_empty_value_matches_all() {
        let schema = sample();
        assert_eq!(schema.relevant_entities("").len(), 3);
    }

    #[test]
    fn test_field_iteration_preserves_declaration_order() {
        let entity = EntityDef::new("users")
            .with_field("b", FieldDef::new())
            .with_field("a", FieldDef::new());
        let names: Vec<_> = entity.field_names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_schema_deserializes_from_json_shape() {
        let schema: Schema = serde_json::from_value(json!({
            "entities": [
                {
                    "name": "users",
                    "relations": ["posts"],
                    "fields": {
                        "status": {"type": "string", "values": ["active"]},
                        "age": {"type": "number"},
                    },
                },
            ],
        }))
        .unwrap();
        let users = schema.entity("users").unwrap();
        assert_eq!(users.relation_names(), ["posts".to_string()]);
        assert_eq!(
            users.field("status").unwrap().values,
            Some(vec!["active".to_string()])
        );
        assert_eq!(
            users.field("age").unwrap().field_type,
            Some(FieldType::Number)
        );
    }
}
