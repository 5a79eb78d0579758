//! Async HTTP client for the Tapestry platform REST API.
//!
//! The platform exposes a resource-oriented API over a handful of
//! endpoints: ticket-based authentication, CRUD on individuals, free-text
//! query, rights and membership lookups, operation-state polling, and
//! file transfer. This crate wraps each endpoint in a typed method on
//! [`TapestryClient`], serializing [`tapestry_model::Individual`]s into
//! request bodies and deserializing responses back.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`client`] | [`TapestryClient`] and the per-endpoint methods |
//! | [`api`] | Wire request/response bodies ([`QueryRequest`], [`OpResult`], ...) |
//! | [`files`] | Multipart upload and streaming download |
//! | [`error`] | [`ClientError`] — the status-code taxonomy |
//! | [`util`] | Password hashing, query-string building |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use tapestry_client::{util, QueryRequest, TapestryClient};
//!
//! let mut client = TapestryClient::new("http://platform.example.com/api");
//! client
//!     .authenticate("karpovrt", &util::hash_password("123"), None)
//!     .await?;
//!
//! let page = client
//!     .query(&QueryRequest::new("'rdf:type'=='v-s:Document'"))
//!     .await?;
//! for uri in &page.result {
//!     let individual = client.get_individual(uri, None).await?;
//!     println!("{}", serde_json::to_string_pretty(&individual)?);
//! }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod files;
pub mod util;

pub use api::{AuthResponse, OpResult, QueryRequest, QueryResponse, UpdateOptions};
pub use client::{Session, TapestryClient};
pub use error::{ClientError, Result};
