//! A single typed scalar value of a predicate.
//!
//! On the wire a value item is the record `{"data": ..., "type": "...",
//! "lang": "..."?}`. The `lang` key appears only for language-tagged
//! strings; when the tag is unset *or empty* it is omitted from the
//! serialized form entirely, never emitted as `null`.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known data type tags.
///
/// The vocabulary is open-ended: the model treats the tag as an opaque
/// string and never validates it against the payload's actual shape.
pub mod datatype {
    pub const URI: &str = "Uri";
    pub const STRING: &str = "String";
    pub const INTEGER: &str = "Integer";
    pub const DATETIME: &str = "Datetime";
    pub const BOOLEAN: &str = "Boolean";
    pub const DECIMAL: &str = "Decimal";
}

/// One typed scalar value of an [`Individual`](crate::Individual) property.
///
/// # Example
///
/// ```rust,ignore
/// use tapestry_model::{datatype, ValueItem};
///
/// let label = ValueItem::new("Контракт", datatype::STRING, Some("RU"));
/// let json = serde_json::to_value(&label).unwrap();
/// assert_eq!(json["lang"], "RU");
/// ```
#[derive(Debug, Clone)]
pub struct ValueItem {
    /// The value payload. `Null` when the source record had no `data` key.
    pub data: Value,

    /// The data type tag (wire key `type`). `None` when the source record
    /// had no `type` key.
    pub data_type: Option<String>,

    /// Language tag for localized string labels (e.g. `"EN"`, `"RU"`).
    pub lang: Option<String>,
}

impl ValueItem {
    /// Create a new value item. The caller is trusted: no consistency check
    /// is made between `data_type` and the actual shape of `data`.
    pub fn new(data: impl Into<Value>, data_type: impl Into<String>, lang: Option<&str>) -> Self {
        Self {
            data: data.into(),
            data_type: Some(data_type.into()),
            lang: lang.map(str::to_string),
        }
    }

    /// Build a value item from a wire JSON record.
    ///
    /// Parsing is permissive and never fails: a missing `data` key becomes
    /// `Null`, a missing or non-string `type` or `lang` becomes `None`, and
    /// non-object input yields a fully-unset item. Downstream code simply
    /// sees absent fields.
    pub fn from_json(record: &Value) -> Self {
        let Some(obj) = record.as_object() else {
            return Self {
                data: Value::Null,
                data_type: None,
                lang: None,
            };
        };
        Self {
            data: obj.get("data").cloned().unwrap_or(Value::Null),
            data_type: obj.get("type").and_then(Value::as_str).map(str::to_string),
            lang: obj.get("lang").and_then(Value::as_str).map(str::to_string),
        }
    }

    /// Convert to the wire JSON record.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Whether the language tag is effectively absent. An empty tag counts
    /// as absent and is omitted on serialization, matching the platform's
    /// treatment of falsy tags.
    fn lang_is_absent(&self) -> bool {
        self.lang.as_deref().map_or(true, str::is_empty)
    }
}

/// Emits `data` and `type` unconditionally (null allowed), and `lang` only
/// when it is set and non-empty.
impl Serialize for ValueItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.lang_is_absent() { 2 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("data", &self.data)?;
        map.serialize_entry("type", &self.data_type)?;
        if let Some(lang) = &self.lang {
            if !lang.is_empty() {
                map.serialize_entry("lang", lang)?;
            }
        }
        map.end()
    }
}

/// Delegates to [`ValueItem::from_json`]; malformed records degrade to
/// unset fields instead of erroring.
impl<'de> Deserialize<'de> for ValueItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&record))
    }
}

/// Compares `(data, type, lang)` triples, treating an unset language tag
/// and an empty one as equal so that round-tripped items compare equal.
impl PartialEq for ValueItem {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
            && self.data_type == other.data_type
            && self.lang_is_absent() == other.lang_is_absent()
            && (self.lang_is_absent() || self.lang == other.lang)
    }
}

impl fmt::Display for ValueItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lang {
            Some(lang) if !lang.is_empty() => write!(f, "{}@{}", self.data, lang),
            _ => write!(f, "{}", self.data),
        }
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialize_with_lang() {
        let item = ValueItem::new("Test", datatype::STRING, Some("EN"));
        assert_eq!(
            item.to_json(),
            json!({"data": "Test", "type": "String", "lang": "EN"})
        );
    }

    #[test]
    fn serialize_without_lang_omits_key() {
        let item = ValueItem::new(42, datatype::INTEGER, None);
        assert_eq!(item.to_json(), json!({"data": 42, "type": "Integer"}));
    }

    #[test]
    fn serialize_empty_lang_omits_key() {
        // A falsy (empty) tag is treated as absent, not emitted as "".
        let item = ValueItem::new("Test", datatype::STRING, Some(""));
        assert_eq!(item.to_json(), json!({"data": "Test", "type": "String"}));
    }

    #[test]
    fn from_json_full_record() {
        let item = ValueItem::from_json(&json!({
            "data": "Test", "type": "String", "lang": "EN"
        }));
        assert_eq!(item.data, json!("Test"));
        assert_eq!(item.data_type.as_deref(), Some("String"));
        assert_eq!(item.lang.as_deref(), Some("EN"));
    }

    #[test]
    fn from_json_missing_fields_are_unset() {
        let item = ValueItem::from_json(&json!({}));
        assert_eq!(item.data, Value::Null);
        assert!(item.data_type.is_none());
        assert!(item.lang.is_none());
    }

    #[test]
    fn from_json_non_object_is_unset() {
        let item = ValueItem::from_json(&json!("scalar"));
        assert_eq!(item.data, Value::Null);
        assert!(item.data_type.is_none());
    }

    #[test]
    fn roundtrip_preserves_triple() {
        let item = ValueItem::new(true, datatype::BOOLEAN, None);
        let back = ValueItem::from_json(&item.to_json());
        assert_eq!(back, item);
    }

    #[test]
    fn empty_lang_equals_absent_lang() {
        let explicit = ValueItem::new("x", datatype::STRING, Some(""));
        let absent = ValueItem::new("x", datatype::STRING, None);
        assert_eq!(explicit, absent);
        // And the round-trip through the wire form stays equal.
        assert_eq!(ValueItem::from_json(&explicit.to_json()), explicit);
    }

    #[test]
    fn serde_deserialize_is_permissive() {
        let item: ValueItem = serde_json::from_str(r#"{"data": 3.5}"#).unwrap();
        assert_eq!(item.data, json!(3.5));
        assert!(item.data_type.is_none());
    }
}
