//! Common types used throughout json2dart
//!
//! This module contains the disambiguation map model shared by the
//! builder, the emitter and the metadata decoder, plus the resolved
//! option set consumed by the builder.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type (insertion ordered)
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Root of the naming/typing decision tree, rooted at the top class
pub type DisambiguationMap = FieldMapping;

// ============================================================================
// Field Mapping
// ============================================================================

/// Per-field record of the decisions taken for a composite value
///
/// The same record describes a whole class: `name` is the class name and
/// `map` holds one entry per composite field, keyed by the original JSON
/// key, in object key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    /// Resolved class name of the value type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Emitted as `Map<String, Name>`; the value class comes from the
    /// single entry of `map`
    #[serde(default, skip_serializing_if = "is_false")]
    pub mapped: bool,

    /// Emitted as `Map<String, dynamic>`, never descended into
    #[serde(default, skip_serializing_if = "is_false")]
    pub dynamic: bool,

    /// Kept as a plain JSON literal, no class is inferred for it
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore: bool,

    /// Class-level strict numeric typing
    #[serde(default, skip_serializing_if = "is_false")]
    pub strict: bool,

    /// Whether an array item class name receives the item suffix
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub suffix: bool,

    /// Suffix stripped from `name` before it prefixes child names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_trim: Option<String>,

    /// Nested mappings for composite children
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub map: IndexMap<String, FieldMapping>,
}

fn default_true() -> bool {
    true
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_true(b: &bool) -> bool {
    *b
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            name: None,
            mapped: false,
            dynamic: false,
            ignore: false,
            strict: false,
            suffix: true,
            name_trim: None,
            map: IndexMap::new(),
        }
    }
}

impl FieldMapping {
    /// Create an empty mapping for the named class
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Resolved name, or the empty string when unresolved
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Name with `name_trim` removed from its end
    ///
    /// This is the stem used when the name prefixes child class names.
    pub fn stem(&self) -> &str {
        let name = self.name_or_empty();
        match &self.name_trim {
            Some(trim) if !trim.is_empty() => name.strip_suffix(trim.as_str()).unwrap_or(name),
            _ => name,
        }
    }

    /// Value class of a mapped field: its representative key and mapping
    pub fn mapped_value(&self) -> Option<(&str, &FieldMapping)> {
        self.map
            .first()
            .filter(|(_, m)| m.name.is_some())
            .map(|(k, m)| (k.as_str(), m))
    }
}

// ============================================================================
// Build Output
// ============================================================================

/// One generated unit: source text plus the decisions that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmittedUnit {
    /// Top class name
    pub name: String,
    /// Generated source, one block per distinct class name
    pub code: String,
    /// Decision tree rooted at the top class
    pub map: DisambiguationMap,
}

// ============================================================================
// Build Options
// ============================================================================

/// Default fromJson variable candidates
pub const FROM_VARIABLES: &[&str] = &["json", "d", "v", "j", "_json"];

/// Default toJson variable candidates
pub const TO_VARIABLES: &[&str] = &["json", "d", "r", "j", "_json"];

/// Fully resolved generation options
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// Concatenate the parent class name into default child names
    pub concat: bool,
    /// Prefix applied to every class name except the top one
    pub prefix: Option<String>,
    /// Append `array_item_suffix` to array item class names
    pub suffix: bool,
    /// Suffix for array item class names
    pub array_item_suffix: Option<String>,
    /// Array field names excluded from name concatenation
    pub array: Vec<String>,
    /// Candidate pool for method-local variable names
    pub variables: Option<Vec<String>>,
    /// Longest comment literal kept for a class-typed field
    pub max_comment: usize,
    /// Global strict mode; overrides the per-class flag when set
    pub strict: Option<bool>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            concat: true,
            prefix: None,
            suffix: true,
            array_item_suffix: Some("Item".to_string()),
            array: Vec::new(),
            variables: None,
            max_comment: 0,
            strict: None,
        }
    }
}

impl BuildOptions {
    /// Create options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set global strict mode
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Set the comment literal limit
    #[must_use]
    pub fn with_max_comment(mut self, max_comment: usize) -> Self {
        self.max_comment = max_comment;
        self
    }

    /// Set the class name prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Enable/disable parent name concatenation
    #[must_use]
    pub fn with_concat(mut self, concat: bool) -> Self {
        self.concat = concat;
        self
    }

    /// Set the array field aliases
    #[must_use]
    pub fn with_array_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.array = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Set the variable name pool
    #[must_use]
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = Some(variables.into_iter().map(Into::into).collect());
        self
    }

    /// Suffix appended to array item names, when enabled
    pub fn item_suffix(&self) -> Option<&str> {
        if self.suffix {
            self.array_item_suffix.as_deref().filter(|s| !s.is_empty())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_mapping_serde_defaults() {
        let mapping: FieldMapping = serde_json::from_value(json!({"name": "User"})).unwrap();
        assert_eq!(mapping.name.as_deref(), Some("User"));
        assert!(mapping.suffix);
        assert!(!mapping.mapped);

        let value = serde_json::to_value(FieldMapping::named("User")).unwrap();
        assert_eq!(value, json!({"name": "User"}));

        let value = serde_json::to_value(FieldMapping {
            suffix: false,
            name_trim: Some("Item".to_string()),
            ..FieldMapping::named("UserItem")
        })
        .unwrap();
        assert_eq!(
            value,
            json!({"name": "UserItem", "suffix": false, "nameTrim": "Item"})
        );
    }

    #[test]
    fn test_stem() {
        let mut mapping = FieldMapping::named("UsersItem");
        assert_eq!(mapping.stem(), "UsersItem");
        mapping.name_trim = Some("Item".to_string());
        assert_eq!(mapping.stem(), "Users");
        mapping.name = Some("Users".to_string());
        assert_eq!(mapping.stem(), "Users");
    }

    #[test]
    fn test_mapped_value() {
        let mut mapping = FieldMapping::default();
        assert!(mapping.mapped_value().is_none());
        mapping
            .map
            .insert("a".to_string(), FieldMapping::named("Entry"));
        let (key, value) = mapping.mapped_value().unwrap();
        assert_eq!(key, "a");
        assert_eq!(value.name.as_deref(), Some("Entry"));
    }

    #[test]
    fn test_item_suffix() {
        let options = BuildOptions::default();
        assert_eq!(options.item_suffix(), Some("Item"));
        let options = BuildOptions {
            suffix: false,
            ..Default::default()
        };
        assert_eq!(options.item_suffix(), None);
    }
}
