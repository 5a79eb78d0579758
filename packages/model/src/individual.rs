//! An individual — the platform's unit of entity data.
//!
//! On the wire an individual is the record
//! `{"@": "<uri>", "<predicate>": [<value item>, ...], ...}`. Every
//! predicate maps to an *ordered* sequence of [`ValueItem`]s; the platform
//! attaches significance to that order, so the model preserves it verbatim
//! and never reorders or deduplicates.

use std::collections::HashMap;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::ValueItem;

/// An input accepted by [`Individual::set_property`]: either an existing
/// [`ValueItem`] or a raw wire record still in JSON form.
///
/// Raw JSON objects are converted via [`ValueItem::from_json`]; raw JSON
/// that is not an object is silently skipped, matching the platform
/// client's permissive handling of mixed inputs.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// An already-constructed value item, kept as-is.
    Item(ValueItem),
    /// A raw wire record, converted on insertion.
    Json(Value),
}

impl From<ValueItem> for PropertyValue {
    fn from(item: ValueItem) -> Self {
        PropertyValue::Item(item)
    }
}

impl From<Value> for PropertyValue {
    fn from(record: Value) -> Self {
        PropertyValue::Json(record)
    }
}

/// An entity with a URI identity and a multi-valued property set.
///
/// The individual exclusively owns its property map and all contained
/// value items; the structure is flat (entity → predicate → ordered
/// values), so no sharing or cycles are possible.
///
/// All operations are pure in-memory mutations and are total over any
/// reachable state — there is no lifecycle beyond "constructed".
///
/// # Example
///
/// ```rust,ignore
/// use tapestry_model::{datatype, Individual};
///
/// let mut doc = Individual::new("d:doc1");
/// doc.add_value("rdf:type", "v-s:Document", datatype::URI, None);
/// doc.set_value("v-s:created", "2026-08-30T12:00:00Z", datatype::DATETIME, None);
/// assert_eq!(doc.get_first_value("rdf:type").unwrap(), "v-s:Document");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Individual {
    /// The entity's unique identifier (wire key `"@"`). May be empty
    /// transiently during construction; callers must set it before writing
    /// to the platform.
    pub uri: String,

    /// Predicate name → ordered value sequence. Any string key is
    /// accepted; no validation or implicit sorting is applied.
    pub properties: HashMap<String, Vec<ValueItem>>,
}

impl Individual {
    /// Create an individual with the given URI and no properties.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            properties: HashMap::new(),
        }
    }

    /// Create an individual from already-built parts.
    pub fn with_properties(
        uri: impl Into<String>,
        properties: HashMap<String, Vec<ValueItem>>,
    ) -> Self {
        Self {
            uri: uri.into(),
            properties,
        }
    }

    /// Build an individual from a wire JSON record.
    ///
    /// `record["@"]` becomes the URI (missing → empty string). Every other
    /// key whose value is an array is converted element-wise via
    /// [`ValueItem::from_json`]; keys whose value is *not* an array are
    /// silently dropped — platform responses may carry non-array metadata
    /// fields, and those must not fail the parse. Never errors.
    pub fn from_json(record: &Value) -> Self {
        let Some(obj) = record.as_object() else {
            return Self::default();
        };

        let uri = obj
            .get("@")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut properties = HashMap::new();
        for (key, value) in obj {
            if key == "@" {
                continue;
            }
            if let Some(items) = value.as_array() {
                properties.insert(
                    key.clone(),
                    items.iter().map(ValueItem::from_json).collect(),
                );
            }
        }

        Self { uri, properties }
    }

    /// Convert to the wire JSON record: `"@"` plus one entry per property
    /// key mapping to its ordered serialized value list.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// The ordered value sequence for `key`, or an empty slice if the
    /// property is absent. Never creates the key as a side effect.
    pub fn get_property(&self, key: &str) -> &[ValueItem] {
        self.properties.get(key).map_or(&[], Vec::as_slice)
    }

    /// The `data` payload of the first value of `key`, or `None` when the
    /// property is missing or empty.
    pub fn get_first_value(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)?.first().map(|item| &item.data)
    }

    /// All `data` payloads of `key`, in stored order.
    pub fn get_values(&self, key: &str) -> Vec<&Value> {
        self.get_property(key).iter().map(|item| &item.data).collect()
    }

    /// Replace the entire value sequence for `key` wholesale.
    ///
    /// Inputs may mix [`ValueItem`]s and raw JSON records (see
    /// [`PropertyValue`]). Raw non-object entries are silently skipped. An
    /// empty input yields an empty sequence, which still serializes as an
    /// empty array.
    pub fn set_property<I>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator,
        I::Item: Into<PropertyValue>,
    {
        let mut items = Vec::new();
        for value in values {
            match value.into() {
                PropertyValue::Item(item) => items.push(item),
                PropertyValue::Json(record) if record.is_object() => {
                    items.push(ValueItem::from_json(&record));
                }
                PropertyValue::Json(_) => {}
            }
        }
        self.properties.insert(key.into(), items);
    }

    /// Append one new value to `key`'s sequence, creating the key with a
    /// fresh empty sequence first if absent. Never deduplicates.
    pub fn add_value(
        &mut self,
        key: impl Into<String>,
        data: impl Into<Value>,
        data_type: impl Into<String>,
        lang: Option<&str>,
    ) {
        self.properties
            .entry(key.into())
            .or_default()
            .push(ValueItem::new(data, data_type, lang));
    }

    /// Replace `key`'s entire sequence with a single new value — a
    /// destructive overwrite of all prior values for that predicate.
    pub fn set_value(
        &mut self,
        key: impl Into<String>,
        data: impl Into<Value>,
        data_type: impl Into<String>,
        lang: Option<&str>,
    ) {
        self.properties
            .insert(key.into(), vec![ValueItem::new(data, data_type, lang)]);
    }

    /// Replace the first value in `key`'s sequence whose `data` equals
    /// `old_data` (value equality) with a new value, preserving its
    /// position. Returns whether a match was found; no match means no
    /// mutation. When several values match, only the lowest index is
    /// replaced.
    pub fn replace_value(
        &mut self,
        key: &str,
        old_data: &Value,
        new_data: impl Into<Value>,
        data_type: impl Into<String>,
        lang: Option<&str>,
    ) -> bool {
        let Some(items) = self.properties.get_mut(key) else {
            return false;
        };
        match items.iter_mut().find(|item| item.data == *old_data) {
            Some(slot) => {
                *slot = ValueItem::new(new_data, data_type, lang);
                true
            }
            None => false,
        }
    }

    /// Remove *all* values in `key`'s sequence whose `data` equals the
    /// given value. Returns whether the sequence shrank. An absent key is
    /// a no-op returning `false`. Emptying a sequence does not delete the
    /// key — only [`remove_predicate`](Self::remove_predicate) does.
    pub fn remove_value(&mut self, key: &str, data: &Value) -> bool {
        let Some(items) = self.properties.get_mut(key) else {
            return false;
        };
        let before = items.len();
        items.retain(|item| item.data != *data);
        items.len() < before
    }

    /// Delete `key` entirely from the property map, reporting whether it
    /// existed.
    pub fn remove_predicate(&mut self, key: &str) -> bool {
        self.properties.remove(key).is_some()
    }

    /// Delete `key` entirely from the property map. Silent on a missing
    /// key; use [`remove_predicate`](Self::remove_predicate) for the
    /// boolean-returning contract.
    pub fn remove_property(&mut self, key: &str) {
        self.properties.remove(key);
    }
}

/// Emits `"@"` followed by one entry per property key.
impl Serialize for Individual {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len() + 1))?;
        map.serialize_entry("@", &self.uri)?;
        for (key, values) in &self.properties {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

/// Delegates to [`Individual::from_json`]; malformed records degrade to an
/// empty individual instead of erroring.
impl<'de> Deserialize<'de> for Individual {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&record))
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::datatype;
    use serde_json::json;

    fn labeled() -> Individual {
        let mut ind = Individual::new("test:123");
        ind.add_value("rdf:type", "test:Type", datatype::URI, None);
        ind.add_value("rdfs:label", "Test Label", datatype::STRING, Some("EN"));
        ind
    }

    #[test]
    fn new_has_empty_properties() {
        let ind = Individual::new("test:123");
        assert_eq!(ind.uri, "test:123");
        assert!(ind.properties.is_empty());
    }

    #[test]
    fn from_json_parses_uri_and_properties() {
        let ind = Individual::from_json(&json!({
            "@": "test:123",
            "rdf:type": [{"data": "test:Type", "type": "Uri"}],
            "rdfs:label": [
                {"data": "Test Label", "type": "String", "lang": "EN"},
                {"data": "Тестовая метка", "type": "String", "lang": "RU"}
            ]
        }));
        assert_eq!(ind.uri, "test:123");
        assert_eq!(ind.get_property("rdf:type").len(), 1);
        assert_eq!(ind.get_property("rdfs:label").len(), 2);
        assert_eq!(
            ind.get_property("rdfs:label")[1].lang.as_deref(),
            Some("RU")
        );
    }

    #[test]
    fn from_json_drops_non_array_keys() {
        let ind = Individual::from_json(&json!({
            "@": "x",
            "rdf:type": [{"data": "T", "type": "Uri"}],
            "ignored": "scalar"
        }));
        assert_eq!(ind.uri, "x");
        assert_eq!(ind.get_property("rdf:type").len(), 1);
        assert!(!ind.properties.contains_key("ignored"));
    }

    #[test]
    fn from_json_missing_uri_is_empty() {
        let ind = Individual::from_json(&json!({"p": []}));
        assert_eq!(ind.uri, "");
        assert_eq!(ind.get_property("p").len(), 0);
        assert!(ind.properties.contains_key("p"));
    }

    #[test]
    fn to_json_shape() {
        let data = labeled().to_json();
        assert_eq!(data["@"], "test:123");
        assert_eq!(data["rdf:type"][0]["data"], "test:Type");
        assert_eq!(data["rdfs:label"][0]["lang"], "EN");
    }

    #[test]
    fn roundtrip_preserves_triples() {
        let mut ind = labeled();
        ind.add_value("v-s:count", 7, datatype::INTEGER, None);
        ind.set_property("v-s:empty", Vec::<ValueItem>::new());

        let back = Individual::from_json(&ind.to_json());
        assert_eq!(back, ind);
        // The transiently-empty sequence survives as an empty array.
        assert!(back.properties.contains_key("v-s:empty"));
    }

    #[test]
    fn get_property_missing_is_empty_slice() {
        let ind = labeled();
        assert!(ind.get_property("rdfs:comment").is_empty());
        // No side-effect key creation.
        assert!(!ind.properties.contains_key("rdfs:comment"));
    }

    #[test]
    fn get_first_value() {
        let mut ind = Individual::new("test:123");
        ind.add_value("rdfs:label", "first", datatype::STRING, Some("EN"));
        ind.add_value("rdfs:label", "second", datatype::STRING, Some("EN"));
        assert_eq!(ind.get_first_value("rdfs:label").unwrap(), "first");
        assert!(ind.get_first_value("rdfs:comment").is_none());
    }

    #[test]
    fn get_values_in_order() {
        let mut ind = Individual::new("test:123");
        ind.add_value("p", "a", datatype::STRING, None);
        ind.add_value("p", "b", datatype::STRING, None);
        assert_eq!(ind.get_values("p"), vec![&json!("a"), &json!("b")]);
    }

    #[test]
    fn set_property_mixes_items_and_records() {
        let mut ind = Individual::new("test:123");
        ind.set_property(
            "rdfs:label",
            [
                PropertyValue::from(ValueItem::new("Item", datatype::STRING, Some("EN"))),
                PropertyValue::from(json!({"data": "Record", "type": "String"})),
                // Not an item and not an object — silently skipped.
                PropertyValue::from(json!("stray scalar")),
            ],
        );
        let values = ind.get_property("rdfs:label");
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].data, json!("Item"));
        assert_eq!(values[1].data, json!("Record"));
    }

    #[test]
    fn set_property_replaces_wholesale() {
        let mut ind = labeled();
        ind.set_property("rdfs:label", [json!({"data": "New", "type": "String"})]);
        assert_eq!(ind.get_property("rdfs:label").len(), 1);
        assert_eq!(ind.get_first_value("rdfs:label").unwrap(), "New");
    }

    #[test]
    fn add_value_appends_in_call_order() {
        let mut ind = Individual::new("test:123");
        ind.add_value("p", "a", datatype::STRING, None);
        assert_eq!(ind.get_property("p").len(), 1);
        ind.add_value("p", "a", datatype::STRING, None);
        // Duplicates by value are allowed — never deduplicated.
        assert_eq!(ind.get_property("p").len(), 2);
    }

    #[test]
    fn set_value_overwrites_all_prior() {
        let mut ind = Individual::new("test:123");
        ind.add_value("p", "a", datatype::STRING, None);
        ind.add_value("p", "b", datatype::STRING, None);
        ind.set_value("p", "c", datatype::STRING, None);
        let values = ind.get_property("p");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].data, json!("c"));
    }

    #[test]
    fn replace_value_first_match_in_place() {
        let mut ind = Individual::new("test:123");
        ind.add_value("p", "old", datatype::STRING, None);
        ind.add_value("p", "other", datatype::STRING, None);

        assert!(ind.replace_value("p", &json!("old"), "new", datatype::STRING, None));
        assert_eq!(ind.get_values("p"), vec![&json!("new"), &json!("other")]);

        // Same call again: nothing left to match, state unchanged.
        assert!(!ind.replace_value("p", &json!("old"), "new", datatype::STRING, None));
        assert_eq!(ind.get_values("p"), vec![&json!("new"), &json!("other")]);
    }

    #[test]
    fn replace_value_only_lowest_index() {
        let mut ind = Individual::new("test:123");
        ind.add_value("p", "dup", datatype::STRING, None);
        ind.add_value("p", "dup", datatype::STRING, None);
        assert!(ind.replace_value("p", &json!("dup"), "new", datatype::STRING, None));
        assert_eq!(ind.get_values("p"), vec![&json!("new"), &json!("dup")]);
    }

    #[test]
    fn remove_value_removes_all_matches() {
        let mut ind = Individual::new("test:123");
        ind.add_value("p", "d", datatype::STRING, None);
        ind.add_value("p", "other", datatype::STRING, None);
        ind.add_value("p", "d", datatype::STRING, None);

        assert!(ind.remove_value("p", &json!("d")));
        assert_eq!(ind.get_values("p"), vec![&json!("other")]);

        assert!(!ind.remove_value("p", &json!("d")));
        assert!(!ind.remove_value("absent", &json!("d")));
    }

    #[test]
    fn remove_value_emptying_keeps_key() {
        let mut ind = Individual::new("test:123");
        ind.add_value("p", "d", datatype::STRING, None);
        assert!(ind.remove_value("p", &json!("d")));
        assert!(ind.properties.contains_key("p"));
        assert!(ind.get_property("p").is_empty());
    }

    #[test]
    fn remove_predicate_reports_existence() {
        let mut ind = labeled();
        assert!(ind.remove_predicate("rdfs:label"));
        assert!(!ind.remove_predicate("rdfs:label"));
    }

    #[test]
    fn remove_property_is_silent_on_missing_key() {
        let mut ind = labeled();
        ind.remove_property("rdfs:label");
        assert!(!ind.properties.contains_key("rdfs:label"));
        assert!(ind.properties.contains_key("rdf:type"));
        ind.remove_property("non:existing");
    }

    #[test]
    fn serde_roundtrip_through_string() {
        let ind = labeled();
        let json = serde_json::to_string(&ind).unwrap();
        let back: Individual = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ind);
    }
}
