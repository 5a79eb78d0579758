//! Data model for the Tapestry platform.
//!
//! This crate defines the property-graph representation exchanged with the
//! platform's REST endpoints: an [`Individual`] is an entity identified by
//! URI carrying a multi-valued property map, and each property value is a
//! typed, optionally language-tagged [`ValueItem`].
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`value`] | [`ValueItem`]: a typed scalar with optional language tag |
//! | [`individual`] | [`Individual`]: URI identity plus predicate → ordered values |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use tapestry_model::{datatype, Individual};
//!
//! let mut person = Individual::new("d:person1");
//! person.add_value("rdf:type", "v-s:Person", datatype::URI, None);
//! person.add_value("rdfs:label", "Alice", datatype::STRING, Some("EN"));
//!
//! // Serialise to the wire JSON shape.
//! let json = serde_json::to_string(&person).unwrap();
//! ```
//!
//! # Parsing policy
//!
//! Deserialization is deliberately permissive: platform responses may carry
//! partial records or non-array metadata fields, and the model degrades
//! gracefully (missing fields become absent, non-array properties are
//! dropped) rather than failing. Only the HTTP client layer in
//! `tapestry-client` surfaces errors, and only for transport and session
//! conditions.

pub mod individual;
pub mod value;

pub use individual::{Individual, PropertyValue};
pub use value::{datatype, ValueItem};
