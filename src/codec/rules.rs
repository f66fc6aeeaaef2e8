//! Field literal grammar
//!
//! Plain JSON is tried first. Anything else goes through [`RULES`] top to
//! bottom and the first matching pattern decides; its handler may still
//! reject the literal.

use super::types::FieldValue;
use crate::schema::DYNAMIC_TAG;
use crate::types::{JsonObject, JsonValue};
use regex::{Captures, Regex};
use std::sync::LazyLock;

struct LiteralRule {
    pattern: LazyLock<Regex>,
    parse: fn(&Captures<'_>) -> Option<FieldValue>,
}

static RULES: [LiteralRule; 3] = [
    // <Name>[...]
    LiteralRule {
        pattern: LazyLock::new(|| Regex::new(r"^<(\w+)>\[(.*)\]$").expect("valid list literal regex")),
        parse: |c| {
            Some(FieldValue::List {
                class: c[1].to_string(),
                value: body(c.get(2)),
            })
        },
    },
    // <String, Name>{...}
    LiteralRule {
        pattern: LazyLock::new(|| {
            Regex::new(r"^<String,\s*(\w+)>(\{.*\})$").expect("valid map literal regex")
        }),
        parse: parse_map,
    },
    // Name(...)
    LiteralRule {
        pattern: LazyLock::new(|| {
            Regex::new(r"^([a-zA-Z]\w*)(?:\((.*)\)$)?").expect("valid class literal regex")
        }),
        parse: |c| {
            Some(FieldValue::Class {
                class: c[1].to_string(),
                value: body(c.get(2)),
            })
        },
    },
];

/// JSON body of a class literal; elided or unparsable bodies are `None`
fn body(m: Option<regex::Match<'_>>) -> Option<JsonValue> {
    m.and_then(|m| serde_json::from_str(m.as_str()).ok())
}

fn parse_map(c: &Captures<'_>) -> Option<FieldValue> {
    let value: JsonObject = serde_json::from_str(&c[2]).ok()?;
    if &c[1] == DYNAMIC_TAG {
        return Some(FieldValue::Dynamic(value.into()));
    }
    let key = value.keys().next()?.clone();
    Some(FieldValue::Mapped {
        class: c[1].to_string(),
        key,
        value,
    })
}

/// Parse the backquoted literal of a field comment
pub fn parse_literal(literal: &str) -> Option<FieldValue> {
    if let Ok(value) = serde_json::from_str(literal) {
        return Some(FieldValue::Literal(value));
    }
    RULES
        .iter()
        .find_map(|rule| rule.pattern.captures(literal).map(|c| (rule.parse)(&c)))
        .flatten()
}
