//! Decoder types

use crate::types::{DisambiguationMap, JsonObject, JsonValue};
use indexmap::IndexMap;
use serde::Serialize;

/// Decoded field literal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    /// Plain JSON; a composite one is kept verbatim and never re-inferred
    Literal(JsonValue),
    /// `Name(...)`: a nested class, with the literal body when present
    Class {
        class: String,
        value: Option<JsonValue>,
    },
    /// `<Name>[...]`: a list of a nested class, with the item literal when
    /// present
    List {
        class: String,
        value: Option<JsonValue>,
    },
    /// `<String, Name>{"key": ...}`: a map whose value class is recorded
    /// under its representative `key`
    Mapped {
        class: String,
        key: String,
        value: JsonObject,
    },
    /// `<String, dynamic>{...}`: an opaque map
    Dynamic(JsonValue),
}

impl FieldValue {
    /// Class referenced by this literal, if any
    pub fn class_ref(&self) -> Option<&str> {
        match self {
            FieldValue::Class { class, .. }
            | FieldValue::List { class, .. }
            | FieldValue::Mapped { class, .. } => Some(class),
            FieldValue::Literal(_) | FieldValue::Dynamic(_) => None,
        }
    }
}

/// One class seen in the document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassRecord {
    /// Opened by a marker before anything referenced it
    pub top: bool,
    /// Opened by a marker at all; a class only ever referenced has no
    /// block of its own
    pub opened: bool,
    /// Marker carried `--strict`
    pub strict: bool,
    /// Field literals in comment order, keyed by the original JSON key
    pub fields: IndexMap<String, FieldValue>,
}

impl ClassRecord {
    pub(crate) fn new(top: bool) -> Self {
        Self {
            top,
            opened: top,
            strict: false,
            fields: IndexMap::new(),
        }
    }
}

/// Result of decoding an emitted document
#[derive(Debug, Clone, PartialEq)]
pub struct Restored {
    /// Command recorded by the provenance comment
    pub cmd: Option<String>,
    /// Argument string recorded by the provenance comment
    pub args: Option<String>,
    /// Reconstructed sample of the top class
    pub data: JsonValue,
    /// Reconstructed decisions, rooted at the top class
    pub map: DisambiguationMap,
}

impl Restored {
    /// Provenance arguments split on whitespace
    pub fn argv(&self) -> Vec<String> {
        self.args
            .as_deref()
            .map(|a| a.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
