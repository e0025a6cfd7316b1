//! # rql-core
//!
//! Parser, schema validator, and cursor-aware autocomplete engine for
//! RQL, a compact single-line query syntax for search and filter bars:
//!
//! ```text
//! entity:users limit:10 where:(status=active OR role=admin)
//! ```
//!
//! This crate provides:
//! - A hand-written tokenizer and recursive descent parser producing a
//!   canonical, JSON-serializable query tree
//! - Validation of entity, relation, and field references against an
//!   in-memory schema
//! - An autocomplete engine that classifies a cursor position inside
//!   possibly incomplete input and emits ranked, prefix-filtered
//!   suggestions
//!
//! ## Parsing
//!
//! ```rust
//! use rql_core::parse;
//!
//! let query = parse("entity:users limit:10 where:(age>=18)", None).unwrap();
//! assert_eq!(query.entity.as_deref(), Some("users"));
//! assert_eq!(query.limit, Some(10));
//! ```
//!
//! ## Autocomplete
//!
//! ```rust
//! use rql_core::{suggest_at, EntityDef, Schema};
//!
//! let schema = Schema::new(vec![EntityDef::new("users"), EntityDef::new("posts")]);
//! let suggestions = suggest_at("entity:u", 8, &schema);
//! assert_eq!(suggestions.len(), 1);
//! assert_eq!(suggestions[0].label, "users");
//! assert_eq!(suggestions[0].replace_length, 1);
//! ```
//!
//! The library is pure and synchronous: no I/O, no global state, and
//! every call completes in time linear in the input length.

pub mod ast;
pub mod complete;
pub mod lexer;
pub mod parser;
pub mod schema;

pub use ast::{CompareOp, Condition, OrderDirection, OrderTerm, Query, Value};
pub use complete::{context, suggest, suggest_at, CursorContext, Suggestion};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{is_valid, parse, ParseError, Parser, Result};
pub use schema::{EntityDef, FieldDef, FieldType, Schema};
