//! Schema-less response decoder
//!
//! The OHT API publishes no schema, so response bodies are decoded into a
//! [`DecodedNode`] tree instead of fixed structs. Objects whose keys are all
//! usable field names become [`Record`]s with ordered named fields; objects
//! keyed by runtime values (resource UUIDs, hyphenated names) stay
//! lookup-by-key [`DecodedNode::Mapping`]s.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::ops::Index;

use crate::core::errors::Result;

/// Rust keywords, including reserved and edition-2018+ ones
const RESERVED_WORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
];

static NULL: DecodedNode = DecodedNode::Scalar(Scalar::Null);

/// Leaf value, carried over from JSON without coercion
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `null`
    Null,
    /// `true` or `false`
    Bool(bool),
    /// Keeps the exact digits of the source text
    Number(Number),
    /// String, never parsed as a number
    String(String),
}

/// Object whose keys are all valid field identifiers
///
/// Field order follows the order of keys in the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, DecodedNode)>,
}

impl Record {
    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&DecodedNode> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, node)| node)
    }

    /// Check whether the record has a field
    pub fn has_field(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in source order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Fields in source order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodedNode)> {
        self.fields.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for decoded records
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Shape tag of a decoded node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// [`DecodedNode::Record`]
    Record,
    /// [`DecodedNode::Mapping`]
    Mapping,
    /// [`DecodedNode::Sequence`]
    Sequence,
    /// [`Scalar::Null`]
    Null,
    /// [`Scalar::Bool`]
    Bool,
    /// [`Scalar::Number`]
    Number,
    /// [`Scalar::String`]
    String,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Record => "record",
            NodeKind::Mapping => "mapping",
            NodeKind::Sequence => "sequence",
            NodeKind::Null => "null",
            NodeKind::Bool => "bool",
            NodeKind::Number => "number",
            NodeKind::String => "string",
        };
        f.write_str(name)
    }
}

/// Decoded form of one JSON value
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedNode {
    /// Non-empty object with identifier-safe keys only
    Record(Record),
    /// Empty object, or object with at least one non-identifier key
    Mapping(IndexMap<String, DecodedNode>),
    /// Array, elements decoded independently
    Sequence(Vec<DecodedNode>),
    /// Leaf value
    Scalar(Scalar),
}

/// Decode a raw response body
///
/// Fails with [`OhtError::MalformedInput`](crate::core::errors::OhtError::MalformedInput)
/// when `raw` is not a single valid JSON document.
pub fn decode(raw: &str) -> Result<DecodedNode> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(DecodedNode::from(value))
}

/// Check whether `key` can be exposed as a record field name
///
/// A key qualifies when it starts with a letter or `_`, continues with
/// letters, ASCII digits or `_`, is not `_` alone and is not a Rust keyword.
/// Letters are Unicode `Alphabetic`, which is close to but not exactly
/// `XID_Start`/`XID_Continue`. Non-ASCII digits and numeric symbols such as
/// `²` are rejected, so the approximation can only err towards
/// [`DecodedNode::Mapping`], which still exposes every key.
pub fn is_field_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    if key == "_" || RESERVED_WORDS.contains(&key) {
        return false;
    }
    chars.all(|c| c.is_alphabetic() || c.is_ascii_digit() || c == '_')
}

fn decode_object(map: Map<String, Value>) -> DecodedNode {
    // Children first; the form of this object does not depend on them.
    let entries: Vec<(String, DecodedNode)> = map
        .into_iter()
        .map(|(key, value)| (key, DecodedNode::from(value)))
        .collect();

    if !entries.is_empty() && entries.iter().all(|(key, _)| is_field_identifier(key)) {
        DecodedNode::Record(Record { fields: entries })
    } else {
        DecodedNode::Mapping(entries.into_iter().collect())
    }
}

impl From<Value> for DecodedNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => DecodedNode::Scalar(Scalar::Null),
            Value::Bool(b) => DecodedNode::Scalar(Scalar::Bool(b)),
            Value::Number(n) => DecodedNode::Scalar(Scalar::Number(n)),
            Value::String(s) => DecodedNode::Scalar(Scalar::String(s)),
            Value::Array(items) => {
                DecodedNode::Sequence(items.into_iter().map(DecodedNode::from).collect())
            }
            Value::Object(map) => decode_object(map),
        }
    }
}

impl DecodedNode {
    /// Shape of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            DecodedNode::Record(_) => NodeKind::Record,
            DecodedNode::Mapping(_) => NodeKind::Mapping,
            DecodedNode::Sequence(_) => NodeKind::Sequence,
            DecodedNode::Scalar(Scalar::Null) => NodeKind::Null,
            DecodedNode::Scalar(Scalar::Bool(_)) => NodeKind::Bool,
            DecodedNode::Scalar(Scalar::Number(_)) => NodeKind::Number,
            DecodedNode::Scalar(Scalar::String(_)) => NodeKind::String,
        }
    }

    /// Look up a key on either a record or a mapping
    pub fn get(&self, key: &str) -> Option<&DecodedNode> {
        match self {
            DecodedNode::Record(record) => record.get(key),
            DecodedNode::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Element of a sequence
    pub fn element(&self, i: usize) -> Option<&DecodedNode> {
        self.as_sequence().and_then(|items| items.get(i))
    }

    /// The record, if this node is one
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            DecodedNode::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The mapping, if this node is one
    pub fn as_mapping(&self) -> Option<&IndexMap<String, DecodedNode>> {
        match self {
            DecodedNode::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Elements, if this node is a sequence
    pub fn as_sequence(&self) -> Option<&[DecodedNode]> {
        match self {
            DecodedNode::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// The leaf value, if this node is one
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            DecodedNode::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedNode::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Number value with its original digits
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            DecodedNode::Scalar(Scalar::Number(n)) => Some(n),
            _ => None,
        }
    }

    /// Number as `i64`, if it fits
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    /// Number as `u64`, if it fits
    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().and_then(Number::as_u64)
    }

    /// Number as `f64`
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    /// Boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedNode::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// True for JSON `null`
    pub fn is_null(&self) -> bool {
        matches!(self, DecodedNode::Scalar(Scalar::Null))
    }

    /// Number of fields, entries or elements; zero for scalars
    pub fn len(&self) -> usize {
        match self {
            DecodedNode::Record(record) => record.len(),
            DecodedNode::Mapping(map) => map.len(),
            DecodedNode::Sequence(items) => items.len(),
            DecodedNode::Scalar(_) => 0,
        }
    }

    /// True for empty containers and for scalars
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Index<&str> for DecodedNode {
    type Output = DecodedNode;

    /// Missing keys yield a null node, as `serde_json::Value` does
    fn index(&self, key: &str) -> &DecodedNode {
        self.get(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for DecodedNode {
    type Output = DecodedNode;

    fn index(&self, i: usize) -> &DecodedNode {
        self.element(i).unwrap_or(&NULL)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Number(n) => n.serialize(serializer),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for DecodedNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DecodedNode::Record(record) => {
                let mut map = serializer.serialize_map(Some(record.len()))?;
                for (name, node) in record.iter() {
                    map.serialize_entry(name, node)?;
                }
                map.end()
            }
            DecodedNode::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, node) in entries {
                    map.serialize_entry(key, node)?;
                }
                map.end()
            }
            DecodedNode::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DecodedNode::Scalar(scalar) => scalar.serialize(serializer),
        }
    }
}

impl fmt::Display for DecodedNode {
    /// Compact JSON; `{:#}` pretty-prints
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if f.alternate() {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
        .map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;

    const PROJECT_DETAILS: &str = r#"{"status":{"code":0,"msg":"ok"},"results":{"project_id":"807837","project_type":"Translation","project_status":"Being translated","project_status_code":"signed","source_language":"en-us","target_language":"ru-ru","resources":{"sources":["rsc-560a693ccfbbc2-86754957","rsc-560a6a5524b4a2-38348001"],"translations":["rsc-560abb5ab099b0-90175867","rsc-560abb5ab4ab73-60700513"],"proofs":"","transcriptions":""},"wordcount":"5","custom":"","resource_binding":{"rsc-560a693ccfbbc2-86754957":["rsc-560abb5ab099b0-90175867"],"rsc-560a6a5524b4a2-38348001":["rsc-560abb5ab4ab73-60700513"],"rsc-560abb5ab099b0-90175867":null,"rsc-560abb5ab4ab73-60700513":null},"linguist_uuid":"70f6df63-9359-4f5b-a7c2-2483123a269a"},"errors":[]}"#;

    #[test]
    fn test_status_envelope_decodes_to_records() {
        let node = decode(r#"{"status":{"code":0,"msg":"ok"},"results":{"project_id":"807837"},"errors":[]}"#)
            .unwrap();

        let root = node.as_record().unwrap();
        assert_eq!(root.names().collect::<Vec<_>>(), ["status", "results", "errors"]);

        let status = root.get("status").unwrap();
        assert_eq!(status.kind(), NodeKind::Record);
        assert_eq!(status["code"].as_i64(), Some(0));
        assert_eq!(status["msg"].as_str(), Some("ok"));

        let results = root.get("results").unwrap();
        assert_eq!(results.kind(), NodeKind::Record);
        assert_eq!(results["project_id"].as_str(), Some("807837"));

        assert_eq!(root.get("errors"), Some(&DecodedNode::Sequence(vec![])));
    }

    #[test]
    fn test_single_unsafe_key_forces_mapping() {
        let node = decode(r#"{"a-b":1,"c":2}"#).unwrap();
        let map = node.as_mapping().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), ["a-b", "c"]);
        assert_eq!(map["a-b"].as_i64(), Some(1));
        assert_eq!(map["c"].as_i64(), Some(2));
    }

    #[test]
    fn test_empty_object_is_empty_mapping() {
        let node = decode("{}").unwrap();
        assert_eq!(node, DecodedNode::Mapping(IndexMap::new()));
        assert!(node.as_record().is_none());
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        for raw in ["{sdfsdf:{\"sd\":8}", "", "   ", "{\"a\":1", "[1,2", "nul", "{\"a\":1} x", "{'a':1}"] {
            let err = decode(raw).unwrap_err();
            assert!(err.is_malformed_input(), "expected MalformedInput for {:?}, got {}", raw, err);
        }
    }

    #[test]
    fn test_resource_binding_stays_a_mapping() {
        let node = decode(r#"{"resource_binding":{"rsc-1":["rsc-2"],"rsc-2":null}}"#).unwrap();
        assert_eq!(node.kind(), NodeKind::Record);

        let binding = node["resource_binding"].as_mapping().unwrap();
        assert_eq!(binding.len(), 2);
        assert_eq!(binding["rsc-1"].as_sequence().unwrap().len(), 1);
        assert_eq!(binding["rsc-1"][0].as_str(), Some("rsc-2"));
        assert!(binding["rsc-2"].is_null());
    }

    #[test]
    fn test_full_project_details_payload() {
        let node = decode(PROJECT_DETAILS).unwrap();
        let results = &node["results"];

        assert_eq!(results.kind(), NodeKind::Record);
        assert_eq!(results["wordcount"].as_str(), Some("5"));
        assert_eq!(results["resources"].kind(), NodeKind::Record);
        assert_eq!(results["resources"]["sources"].len(), 2);
        assert_eq!(results["resource_binding"].kind(), NodeKind::Mapping);
        assert_eq!(results["resource_binding"].len(), 4);

        assert_json_eq!(
            serde_json::to_value(&node).unwrap(),
            serde_json::from_str::<Value>(PROJECT_DETAILS).unwrap()
        );
    }

    #[test]
    fn test_record_preserves_key_order() {
        let node = decode(r#"{"zeta":1,"alpha":2,"mid":3}"#).unwrap();
        let names: Vec<_> = node.as_record().unwrap().names().collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert_eq!(node.to_string(), r#"{"zeta":1,"alpha":2,"mid":3}"#);
    }

    #[test]
    fn test_sequence_elements_decided_independently() {
        let node = decode(r#"[{"code":"en-us","name":"English"},{"en-us":"English"},{},[1,"2"],null]"#)
            .unwrap();
        let items = node.as_sequence().unwrap();

        assert_eq!(items.len(), 5);
        assert_eq!(items[0].kind(), NodeKind::Record);
        assert_eq!(items[1].kind(), NodeKind::Mapping);
        assert_eq!(items[2].kind(), NodeKind::Mapping);
        assert_eq!(items[3].kind(), NodeKind::Sequence);
        assert_eq!(items[3][1].as_str(), Some("2"));
        assert!(items[4].is_null());
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(decode("\"807837\"").unwrap().as_str(), Some("807837"));
        assert_eq!(decode("807837").unwrap().as_u64(), Some(807837));
        assert_eq!(decode("-3").unwrap().as_i64(), Some(-3));
        assert_eq!(decode("2.5").unwrap().as_f64(), Some(2.5));
        assert_eq!(decode("true").unwrap().as_bool(), Some(true));
        assert!(decode("null").unwrap().is_null());
        assert_eq!(decode("\"true\"").unwrap().kind(), NodeKind::String);
    }

    #[test]
    fn test_numbers_keep_their_digits() {
        let node = decode(r#"{"big":123456789012345678901234567890,"price":0.10}"#).unwrap();
        assert_eq!(node["big"].as_number().unwrap().to_string(), "123456789012345678901234567890");
        assert_eq!(node["price"].as_number().unwrap().to_string(), "0.10");
    }

    #[test]
    fn test_reserved_word_key_forces_mapping() {
        let node = decode(r#"{"type":"file","length":27}"#).unwrap();
        assert_eq!(node.kind(), NodeKind::Mapping);
        assert_eq!(node["type"].as_str(), Some("file"));
        assert_eq!(node["length"].as_i64(), Some(27));
    }

    #[test]
    fn test_numeric_key_forces_mapping() {
        let node = decode(r#"{"807837":{"msg":"ok"}}"#).unwrap();
        assert_eq!(node.kind(), NodeKind::Mapping);
        assert_eq!(node["807837"].kind(), NodeKind::Record);
    }

    #[test]
    fn test_field_identifier_rules() {
        for key in ["status", "TranslatedText", "_private", "project_id", "a1", "résumé", "__"] {
            assert!(is_field_identifier(key), "{}", key);
        }
        for key in ["", "_", "r#", "1abc", "a-b", "a b", "a.b", "type", "match", "self", "async", "rsc-1"] {
            assert!(!is_field_identifier(key), "{}", key);
        }
    }

    #[test]
    fn test_numeric_symbols_are_not_identifier_chars() {
        for key in ["a\u{b2}", "x\u{bd}", "n\u{2460}"] {
            assert!(!is_field_identifier(key), "{}", key);
        }
        assert!(is_field_identifier("gr\u{f6}\u{df}e"));
        assert!(is_field_identifier("\u{540d}\u{524d}2"));

        let node = decode("{\"a\u{b2}\":1,\"b\":2}").unwrap();
        assert_eq!(node.kind(), NodeKind::Mapping);
        assert_eq!(node["a\u{b2}"].as_i64(), Some(1));
    }

    #[test]
    fn test_missing_key_indexes_to_null() {
        let node = decode(r#"{"status":{"code":0}}"#).unwrap();
        assert!(node["results"].is_null());
        assert!(node["status"]["code"]["deeper"].is_null());
        assert!(node[3].is_null());
        assert_eq!(node.get("results"), None);
    }

    #[test]
    fn test_decode_is_deterministic() {
        assert_eq!(decode(PROJECT_DETAILS).unwrap(), decode(PROJECT_DETAILS).unwrap());
    }

    #[test]
    fn test_excessive_nesting_is_malformed() {
        let raw = format!("{}{}", "[".repeat(200), "]".repeat(200));
        assert!(decode(&raw).unwrap_err().is_malformed_input());
    }

    #[test]
    fn test_pretty_display() {
        let node = decode(r#"{"a":[1]}"#).unwrap();
        assert_eq!(format!("{:#}", node), "{\n  \"a\": [\n    1\n  ]\n}");
    }
}
