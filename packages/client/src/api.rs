//! Request and response types for the Tapestry platform REST API.
//!
//! These are the machine-readable bodies the client exchanges with the
//! platform, separate from the data model itself (see `tapestry-model`).
//! Response types default every field so that a partial body parses
//! cleanly instead of failing the whole call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Response body of `GET /authenticate` and `GET /get_ticket_trusted`.
///
/// ```json
/// { "id": "ticket-uuid", "user_uri": "cfg:Admin", "end_time": 1756500000000 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthResponse {
    /// The opaque session ticket, required on most subsequent calls.
    pub id: Option<String>,

    /// URI of the authenticated user's individual.
    pub user_uri: Option<String>,

    /// Ticket expiry, platform clock milliseconds.
    pub end_time: Option<i64>,

    /// Platform result code, when included.
    pub result: Option<i64>,
}

// ---------------------------------------------------------------------------
// Write operations
// ---------------------------------------------------------------------------

/// Response body of every individual write endpoint (`put_individual`,
/// `remove_individual`, `set_in_individual`, ...).
///
/// ```json
/// { "op_id": 12345, "result": 200 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OpResult {
    /// Platform-assigned operation id, usable with `get_operation_state`.
    pub op_id: i64,

    /// Status code of the stored operation.
    pub result: i64,
}

/// Optional knobs shared by all individual write endpoints.
///
/// Every field is omitted from the request body when unset. `event_id`
/// and `transaction_id` are additionally omitted when set to an empty
/// string, matching the platform's treatment of falsy identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Ask the platform to run event scripts for this change.
    pub prepare_events: Option<bool>,

    /// Bit mask of subsystems that should process the change.
    pub assigned_subsystems: Option<u8>,

    /// Identifier of the originating event, for change tracing.
    pub event_id: Option<String>,

    /// Identifier of an enclosing transaction.
    pub transaction_id: Option<String>,
}

impl UpdateOptions {
    /// Merge the set fields into a request body under the platform's key
    /// names.
    pub(crate) fn apply(&self, body: &mut Map<String, Value>) {
        if let Some(prepare_events) = self.prepare_events {
            body.insert("prepare_events".into(), prepare_events.into());
        }
        if let Some(assigned_subsystems) = self.assigned_subsystems {
            body.insert("assigned_subsystems".into(), assigned_subsystems.into());
        }
        if let Some(event_id) = &self.event_id {
            if !event_id.is_empty() {
                body.insert("event_id".into(), event_id.as_str().into());
            }
        }
        if let Some(transaction_id) = &self.transaction_id {
            if !transaction_id.is_empty() {
                body.insert("transaction_id".into(), transaction_id.as_str().into());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Request body of `POST /query` — a free-text query with optional paging
/// and routing parameters. Unset fields are omitted from the body.
///
/// # Example
///
/// ```rust,ignore
/// let req = QueryRequest {
///     query: "'rdf:type'=='v-s:Document'".into(),
///     top: Some(10),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    /// The full-text query string.
    pub query: String,

    /// Sort expression, e.g. `"'v-s:created' desc"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    /// Comma-separated list of databases to search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub databases: Option<String>,

    /// Reopen the server-side index before searching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reopen: Option<bool>,

    /// Result offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<i64>,

    /// Maximum number of results to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<i64>,

    /// Server-side evaluation limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    /// Enable server-side query tracing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<bool>,
}

impl QueryRequest {
    /// A query with every optional parameter left unset.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// Response body of `POST /query`.
///
/// ```json
/// { "result": ["d:a1", "d:a2"], "count": 2, "estimated": 2,
///   "processed": 2, "cursor": 2, "result_code": 200 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueryResponse {
    /// URIs of the matching individuals.
    pub result: Vec<String>,

    /// Number of URIs in `result`.
    pub count: i64,

    /// Server estimate of the total match count.
    pub estimated: i64,

    /// Number of candidates the server examined.
    pub processed: i64,

    /// Paging cursor to pass as `from` on the next call.
    pub cursor: i64,

    /// Platform result code for the query itself.
    pub result_code: i64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auth_response_partial_body_parses() {
        let resp: AuthResponse = serde_json::from_value(json!({"id": "t1"})).unwrap();
        assert_eq!(resp.id.as_deref(), Some("t1"));
        assert!(resp.user_uri.is_none());
    }

    #[test]
    fn query_request_omits_unset_fields() {
        let req = QueryRequest::new("'rdf:type'=='v-s:Document'");
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, json!({"query": "'rdf:type'=='v-s:Document'"}));
    }

    #[test]
    fn query_request_keeps_set_fields() {
        let req = QueryRequest {
            query: "q".into(),
            top: Some(10),
            reopen: Some(true),
            ..Default::default()
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, json!({"query": "q", "top": 10, "reopen": true}));
    }

    #[test]
    fn query_response_defaults() {
        let resp: QueryResponse =
            serde_json::from_value(json!({"result": ["d:a1"]})).unwrap();
        assert_eq!(resp.result, vec!["d:a1"]);
        assert_eq!(resp.count, 0);
    }

    #[test]
    fn update_options_empty_ids_are_omitted() {
        let opts = UpdateOptions {
            prepare_events: Some(false),
            event_id: Some(String::new()),
            transaction_id: Some("tx1".into()),
            ..Default::default()
        };
        let mut body = Map::new();
        opts.apply(&mut body);
        assert_eq!(body.get("prepare_events"), Some(&json!(false)));
        assert!(!body.contains_key("event_id"));
        assert_eq!(body.get("transaction_id"), Some(&json!("tx1")));
    }

    #[test]
    fn update_options_default_adds_nothing() {
        let mut body = Map::new();
        UpdateOptions::default().apply(&mut body);
        assert!(body.is_empty());
    }
}
