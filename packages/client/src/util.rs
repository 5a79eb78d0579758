//! Small helpers for callers: password hashing and query-string building.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hash a plain-text password into the hex digest form the platform's
/// `authenticate` endpoint expects.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Build a platform query string from field/value conditions, ANDed
/// together. String values are quoted; other JSON values are compared
/// verbatim.
///
/// # Example
///
/// ```rust,ignore
/// let q = build_query([
///     ("rdf:type", &json!("v-s:Document")),
///     ("v-s:deleted", &json!(false)),
/// ]);
/// assert_eq!(q, "('rdf:type'=='v-s:Document') && ('v-s:deleted'==false)");
/// ```
pub fn build_query<'a>(conditions: impl IntoIterator<Item = (&'a str, &'a Value)>) -> String {
    conditions
        .into_iter()
        .map(|(field, value)| match value {
            Value::String(s) => format!("('{field}'=='{s}')"),
            other => format!("('{field}'=={other})"),
        })
        .collect::<Vec<_>>()
        .join(" && ")
}
