//! Dart class emission
//!
//! Renders one class block: the metadata comment (decoded later by
//! [`crate::codec`]) followed by the class body. The four composite
//! literal renderings here are the exact inverse of the decoder rules:
//!
//! | field kind | literal                         |
//! |------------|---------------------------------|
//! | plain      | compact JSON                    |
//! | class      | `Name(<json>)`                  |
//! | class list | `<Name>[<json of merged item>]` |
//! | mapped     | `<String, Name>{"<key>":<json>}`|
//! | dynamic    | `<String, dynamic>{...}`        |
//!
//! Class-typed literals are elided once longer than `max_comment`; plain
//! and dynamic literals are always kept since nothing else records them,
//! and so are the literals of classes that got no block of their own.

use super::naming::{field_name, is_valid_identifier};
use crate::error::{Error, Result};
use crate::merge::merge_array;
use crate::template::{render, TemplateContext};
use crate::types::{BuildOptions, FieldMapping, JsonObject, JsonValue, FROM_VARIABLES, TO_VARIABLES};
use std::collections::HashSet;

/// Name used in `{@tool ...}` markers
pub const TOOL_NAME: &str = "json2dart";

/// Literal type tag for opaque maps
pub const DYNAMIC_TAG: &str = "dynamic";

const TOOL_OPEN: &str = "/// {@tool {{ tool }} --name {{ name }}{{ extra }}}";
const TOOL_CLOSE: &str = "/// {@end-tool}";
const FIELD_COMMENT: &str = "/// * {{ field }}{{ key_note }}: `{{ literal }}`";
const FIELD_DECL: &str = "  {{ type }}{{ optional }} {{ field }};";
const FROM_OPEN: &str = "  {{ name }}.fromJson(Map<String, dynamic> {{ from }}) {";
const TO_OPEN: &str = "  Map<String, dynamic> toJson() {\n    final {{ to }} = <String, dynamic>{};";
const TO_CLOSE: &str = "    return {{ to }};\n  }";

const FROM_PLAIN: &str = "    {{ field }} = {{ from }}[\"{{ key }}\"];";
const FROM_CAST: &str = "    {{ field }} = {{ from }}[\"{{ key }}\"] as {{ type }}?;";
const FROM_NUMBER: &str = "    {{ field }} = ({{ from }}[\"{{ key }}\"] as num?)?{{ convert }};";
const FROM_LIST: &str = "    {{ field }} = ({{ from }}[\"{{ key }}\"] as List?)?.cast<{{ item }}>();";
const FROM_NUMBER_LIST: &str =
    "    {{ field }} = ({{ from }}[\"{{ key }}\"] as List?)?.map((v) => (v as num){{ convert }}).toList();";
const FROM_MAP: &str =
    "    {{ field }} = ({{ from }}[\"{{ key }}\"] as Map?)?.cast<String, dynamic>();";
const FROM_CLASS: &str = "    {{ field }} = {{ from }}[\"{{ key }}\"] != null ? {{ class }}.fromJson({{ from }}[\"{{ key }}\"]) : null;";
const FROM_CLASS_LIST: &str =
    "    {{ field }} = ({{ from }}[\"{{ key }}\"] as List?)?.map((v) => {{ class }}.fromJson(v)).toList();";
const FROM_MAPPED: &str = "    {{ field }} = ({{ from }}[\"{{ key }}\"] as Map?)?.map((k, v) => MapEntry(k as String, {{ class }}.fromJson(v)));";

const TO_PLAIN: &str = "    {{ to }}[\"{{ key }}\"] = {{ field }};";
const TO_CLASS: &str = "    {{ to }}[\"{{ key }}\"] = {{ field }}?.toJson();";
const TO_CLASS_LIST: &str = "    {{ to }}[\"{{ key }}\"] = {{ field }}?.map((v) => v.toJson()).toList();";
const TO_MAPPED: &str =
    "    {{ to }}[\"{{ key }}\"] = {{ field }}?.map((k, v) => MapEntry(k, v.toJson()));";

/// How a field is typed and recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind<'a> {
    /// Scalar or null
    Scalar,
    /// Array without an item class
    PlainList,
    /// Object without a class
    PlainMap,
    /// Nested class
    Class(&'a str),
    /// Array of a nested class
    ClassList(&'a str),
    /// String-keyed map of a nested class
    Mapped { class: &'a str, key: &'a str },
    /// Opaque string-keyed map
    Dynamic,
}

impl<'a> FieldKind<'a> {
    /// Class named by the literal, if any
    pub fn class(&self) -> Option<&'a str> {
        match *self {
            FieldKind::Class(class) | FieldKind::ClassList(class) => Some(class),
            FieldKind::Mapped { class, .. } => Some(class),
            _ => None,
        }
    }
}

/// Decide the field kind from the sample value and its mapping
pub fn classify<'a>(value: &JsonValue, mapping: Option<&'a FieldMapping>) -> FieldKind<'a> {
    let class_name = |m: &'a FieldMapping| m.name.as_deref().filter(|n| is_valid_identifier(n));
    match value {
        JsonValue::Array(items) => match mapping {
            Some(m) if !m.ignore && !items.is_empty() && merge_array(items).is_object() => {
                class_name(m).map_or(FieldKind::PlainList, FieldKind::ClassList)
            }
            _ => FieldKind::PlainList,
        },
        JsonValue::Object(_) => match mapping {
            None => FieldKind::PlainMap,
            Some(m) if m.ignore => FieldKind::PlainMap,
            Some(m) if m.dynamic => FieldKind::Dynamic,
            Some(m) if m.mapped => match m.mapped_value() {
                Some((key, entry)) if !entry.dynamic && !entry.mapped && !entry.ignore => {
                    class_name(entry)
                        .map_or(FieldKind::Dynamic, |class| FieldKind::Mapped { class, key })
                }
                _ => FieldKind::Dynamic,
            },
            Some(m) => class_name(m).map_or(FieldKind::PlainMap, FieldKind::Class),
        },
        _ => FieldKind::Scalar,
    }
}

/// Everything needed to render one class block
#[derive(Debug, Clone, Copy)]
pub struct ClassSpec<'a> {
    /// Class name
    pub name: &'a str,
    /// Representative sample of the class
    pub sample: &'a JsonObject,
    /// Decisions for the composite fields
    pub mapping: &'a FieldMapping,
    /// Strict numeric typing for this class
    pub strict: bool,
    /// Record `--strict` in the tool marker
    pub mark_strict: bool,
    /// Referenced classes without a block; their literals are never elided
    pub blockless: &'a HashSet<String>,
}

/// Render a class block, ending with a newline
pub fn render_class(spec: &ClassSpec<'_>, options: &BuildOptions) -> Result<String> {
    let ClassSpec {
        name,
        sample,
        mapping,
        strict,
        mark_strict,
        blockless,
    } = *spec;

    let from = pick_variable(sample, FROM_VARIABLES, options).ok_or_else(|| {
        Error::VariableNameExhausted {
            class: name.to_string(),
            method: "fromJson".to_string(),
            raw: pretty(sample),
        }
    })?;
    let to = pick_variable(sample, TO_VARIABLES, options).ok_or_else(|| {
        Error::VariableNameExhausted {
            class: name.to_string(),
            method: "toJson".to_string(),
            raw: pretty(sample),
        }
    })?;

    let base = TemplateContext::new()
        .with("tool", TOOL_NAME)
        .with("name", name)
        .with("from", from.as_str())
        .with("to", to.as_str())
        .with("extra", if mark_strict && strict { " --strict" } else { "" });

    let mut comments = vec![render(TOOL_OPEN, &base)?];
    let mut decls = Vec::new();
    let mut ctor_fields = Vec::new();
    let mut from_lines = vec![render(FROM_OPEN, &base)?];
    let mut to_lines = vec![render(TO_OPEN, &base)?];

    for (key, value) in sample {
        let field = field_name(key);
        let kind = classify(value, mapping.map.get(key));
        let max_comment = match kind.class() {
            Some(class) if blockless.contains(class) => usize::MAX,
            _ => options.max_comment,
        };
        let shape = FieldShape::of(value, kind, strict, max_comment);

        let mut ctx = base.clone();
        ctx.set("key", key.as_str())
            .set("field", field.as_str())
            .set(
                "key_note",
                if field == *key {
                    String::new()
                } else {
                    format!("({key})")
                },
            )
            .set("literal", shape.literal)
            .set("type", shape.decl_type.as_str())
            .set("optional", if shape.decl_type == "dynamic" { "" } else { "?" })
            .set("item", shape.item.unwrap_or("dynamic"))
            .set("convert", shape.convert.unwrap_or_default())
            .set("class", shape.class.unwrap_or_default());

        comments.push(render(FIELD_COMMENT, &ctx)?);
        decls.push(render(FIELD_DECL, &ctx)?);
        ctor_fields.push(format!("    this.{field},"));
        from_lines.push(render(shape.from, &ctx)?);
        to_lines.push(render(shape.to, &ctx)?);
    }

    comments.push(TOOL_CLOSE.to_string());
    from_lines.push("  }".to_string());
    to_lines.push(render(TO_CLOSE, &base)?);

    let mut code = Vec::with_capacity(decls.len() * 2 + 12);
    code.push(format!("class {name} {{"));
    code.extend(decls);
    code.push(String::new());
    if ctor_fields.is_empty() {
        code.push(format!("  {name}();"));
    } else {
        code.push(format!("  {name}({{"));
        code.extend(ctor_fields);
        code.push("  });".to_string());
    }
    code.push(String::new());
    code.push(from_lines.join("\n"));
    code.push(String::new());
    code.push(to_lines.join("\n"));
    code.push("}".to_string());

    Ok(format!("{}\n{}\n", comments.join("\n"), code.join("\n")))
}

/// Rendering details of one field
struct FieldShape<'a> {
    decl_type: String,
    literal: String,
    from: &'static str,
    to: &'static str,
    item: Option<&'static str>,
    convert: Option<&'static str>,
    class: Option<&'a str>,
}

impl<'a> FieldShape<'a> {
    fn of(value: &JsonValue, kind: FieldKind<'a>, strict: bool, max_comment: usize) -> Self {
        let elide = |literal: String| {
            if literal.len() > max_comment {
                String::new()
            } else {
                literal
            }
        };
        let plain = Self {
            decl_type: String::new(),
            literal: compact(value),
            from: FROM_PLAIN,
            to: TO_PLAIN,
            item: None,
            convert: None,
            class: None,
        };

        match kind {
            FieldKind::Scalar => {
                let (decl_type, convert) = scalar_type(value, strict);
                let from = match (decl_type, convert) {
                    (_, Some(_)) => FROM_NUMBER,
                    ("dynamic", None) => FROM_PLAIN,
                    _ => FROM_CAST,
                };
                Self {
                    decl_type: decl_type.to_string(),
                    from,
                    convert,
                    ..plain
                }
            }
            FieldKind::PlainList => {
                let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
                let (item, convert) = list_item_type(items, strict);
                let from = if convert.is_some() {
                    FROM_NUMBER_LIST
                } else {
                    FROM_LIST
                };
                Self {
                    decl_type: format!("List<{item}>"),
                    from,
                    item: Some(item),
                    convert,
                    ..plain
                }
            }
            FieldKind::PlainMap => Self {
                decl_type: "Map<String, dynamic>".to_string(),
                from: FROM_MAP,
                ..plain
            },
            FieldKind::Dynamic => Self {
                decl_type: "Map<String, dynamic>".to_string(),
                literal: format!("<String, {DYNAMIC_TAG}>{}", compact(value)),
                from: FROM_MAP,
                ..plain
            },
            FieldKind::Class(class) => Self {
                decl_type: class.to_string(),
                literal: format!("{class}({})", elide(compact(value))),
                from: FROM_CLASS,
                to: TO_CLASS,
                class: Some(class),
                ..plain
            },
            FieldKind::ClassList(class) => {
                let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
                Self {
                    decl_type: format!("List<{class}>"),
                    literal: format!("<{class}>[{}]", elide(compact(&merge_array(items)))),
                    from: FROM_CLASS_LIST,
                    to: TO_CLASS_LIST,
                    class: Some(class),
                    ..plain
                }
            }
            FieldKind::Mapped { class, key } => {
                let mut literal = elide(compact(value));
                if literal.is_empty() {
                    let mut placeholder = JsonObject::new();
                    placeholder.insert(key.to_string(), JsonValue::Object(JsonObject::new()));
                    literal = compact(&JsonValue::Object(placeholder));
                }
                Self {
                    decl_type: format!("Map<String, {class}>"),
                    literal: format!("<String, {class}>{literal}"),
                    from: FROM_MAPPED,
                    to: TO_MAPPED,
                    class: Some(class),
                    ..plain
                }
            }
        }
    }
}

/// Dart type of a scalar, and the numeric conversion under strict mode
fn scalar_type(value: &JsonValue, strict: bool) -> (&'static str, Option<&'static str>) {
    match value {
        JsonValue::Bool(_) => ("bool", None),
        JsonValue::String(_) => ("String", None),
        JsonValue::Number(_) if strict => {
            if is_integral(value) {
                ("int", Some(".toInt()"))
            } else {
                ("double", Some(".toDouble()"))
            }
        }
        JsonValue::Number(_) => ("num", None),
        _ => ("dynamic", None),
    }
}

/// Common element type of a scalar array
fn list_item_type(items: &[JsonValue], strict: bool) -> (&'static str, Option<&'static str>) {
    let present: Vec<&JsonValue> = items.iter().filter(|v| !v.is_null()).collect();
    if present.is_empty() {
        return ("dynamic", None);
    }
    if present.iter().all(|v| v.is_boolean()) {
        ("bool", None)
    } else if present.iter().all(|v| v.is_string()) {
        ("String", None)
    } else if present.iter().all(|v| v.is_number()) {
        if !strict {
            ("num", None)
        } else if present.iter().all(|v| is_integral(v)) {
            ("int", Some(".toInt()"))
        } else {
            ("double", Some(".toDouble()"))
        }
    } else {
        ("dynamic", None)
    }
}

/// Whether a number survives integer truncation
fn is_integral(value: &JsonValue) -> bool {
    match value {
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => true,
        JsonValue::Number(n) => n
            .as_f64()
            .is_some_and(|f| f.is_finite() && f.trunc() == f),
        _ => false,
    }
}

/// First candidate that is neither a key nor a field name of the class
fn pick_variable(sample: &JsonObject, defaults: &[&str], options: &BuildOptions) -> Option<String> {
    let taken = |candidate: &str| {
        sample.contains_key(candidate) || sample.keys().any(|k| field_name(k) == candidate)
    };
    let pool: Vec<&str> = match &options.variables {
        Some(vars) => vars.iter().map(String::as_str).collect(),
        None => defaults.to_vec(),
    };
    std::iter::once("json")
        .chain(pool)
        .find(|c| !taken(c))
        .map(str::to_string)
}

fn compact(value: &JsonValue) -> String {
    value.to_string()
}

fn pretty(sample: &JsonObject) -> String {
    serde_json::to_string_pretty(sample).unwrap_or_default()
}
