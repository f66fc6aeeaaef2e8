//! Project settings
//!
//! Settings come from `.json2dart` in the working directory, a JSON
//! object with camelCase keys. Every key is optional; a missing file
//! means defaults.

use crate::error::{Error, Result};
use crate::merge::merge_config;
use crate::types::{BuildOptions, DisambiguationMap, JsonObject, JsonValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings file looked up in the working directory
pub const SETTINGS_FILE: &str = ".json2dart";

/// Directory used for output when it exists and nothing else is set
pub const DEFAULT_MODEL_DIR: &str = "lib/models";

// ============================================================================
// Settings
// ============================================================================

/// Options shared by every run in a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Extraction rules: dotted path to extract → conditions on the input
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub picker: IndexMap<String, JsonObject>,

    /// Array field names not concatenated into item class names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub array: Vec<String>,

    /// Candidate pool for method-local variable names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<String>>,

    /// Output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Formatter command; empty disables formatting
    #[serde(default = "default_formatter")]
    pub formatter: String,

    /// Longest class literal kept in comments
    #[serde(default)]
    pub max_comment: usize,

    /// Fetch options (an object, or the name of a JSON file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_option: Option<JsonValue>,

    /// Suffix for array item class names
    #[serde(default = "default_item_suffix")]
    pub array_item_suffix: String,

    /// Concatenate parent names into default class names
    #[serde(default = "default_true")]
    pub concat: bool,

    /// Global strict mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    /// Prefix for every class name except the top one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Append the item suffix to array item names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<bool>,

    /// Initial disambiguation map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<DisambiguationMap>,
}

fn default_formatter() -> String {
    "dartfmt".to_string()
}

fn default_item_suffix() -> String {
    "Item".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            picker: IndexMap::new(),
            array: Vec::new(),
            variables: None,
            dir: None,
            formatter: default_formatter(),
            max_comment: 0,
            from_option: None,
            array_item_suffix: default_item_suffix(),
            concat: true,
            strict: None,
            prefix: None,
            suffix: None,
            map: None,
        }
    }
}

impl Settings {
    /// Load `.json2dart` from `dir`, defaults when absent
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(SETTINGS_FILE);
        match Self::from_file(&path) {
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Load settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_json(&text).map_err(|e| Error::config(format!("{}: {e}", path.display())))
    }

    /// Parse settings from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    /// Config-merge `overlay` on top of these settings
    pub fn overlay(&self, overlay: &JsonValue) -> Result<Self> {
        let merged = merge_config(&serde_json::to_value(self)?, overlay);
        serde_json::from_value(merged).map_err(|e| Error::config(e.to_string()))
    }

    /// Options for the class tree builder
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            concat: self.concat,
            prefix: self.prefix.clone().filter(|p| !p.is_empty()),
            suffix: self.suffix.unwrap_or(true),
            array_item_suffix: Some(self.array_item_suffix.clone()).filter(|s| !s.is_empty()),
            array: self.array.clone(),
            variables: self.variables.clone(),
            max_comment: self.max_comment,
            strict: self.strict,
        }
    }

    /// Output directory: `dir` when set, else `lib/models` under `root`
    /// when it exists, else `root`
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        if let Some(dir) = &self.dir {
            return root.join(dir);
        }
        let models = root.join(DEFAULT_MODEL_DIR);
        if models.is_dir() {
            models
        } else {
            root.to_path_buf()
        }
    }

    /// Apply the first matching picker rule to `data`
    ///
    /// A rule matches when every condition holds: `true` requires the path
    /// to exist, `false` requires it to be absent, any other value must be
    /// equal. The rule's key is then the path of the extracted value.
    pub fn pick(&self, data: JsonValue) -> JsonValue {
        for (extract, conditions) in &self.picker {
            if !conditions.iter().all(|(path, expected)| holds(&data, path, expected)) {
                continue;
            }
            if let Some(picked) = lookup(&data, extract) {
                debug!(path = %extract, "picked input data");
                return picked.clone();
            }
        }
        data
    }
}

fn holds(data: &JsonValue, path: &str, expected: &JsonValue) -> bool {
    let found = lookup(data, path);
    match expected {
        JsonValue::Bool(true) => found.is_some(),
        JsonValue::Bool(false) => found.is_none(),
        other => found == Some(other),
    }
}

/// Value at a dotted path; numeric segments index arrays
pub fn lookup<'v>(value: &'v JsonValue, path: &str) -> Option<&'v JsonValue> {
    path.split('.').try_fold(value, |current, segment| match current {
        JsonValue::Object(obj) => obj.get(segment),
        JsonValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Resolve an option that is either inline JSON or a JSON file name
///
/// Objects are used as is; a string starting with `{` is parsed as JSON,
/// any other string names a file (relative to `base`), and a missing
/// file means `{}`.
pub fn json_or_file(value: Option<&JsonValue>, base: &Path) -> Result<JsonValue> {
    let empty = || JsonValue::Object(JsonObject::new());
    match value {
        None | Some(JsonValue::Null) => Ok(empty()),
        Some(JsonValue::String(s)) if s.trim_start().starts_with('{') => Ok(serde_json::from_str(s)?),
        Some(JsonValue::String(file)) => {
            let path = base.join(file);
            match std::fs::read_to_string(&path) {
                Ok(text) => serde_json::from_str(&text)
                    .map_err(|e| Error::config(format!("{}: {e}", path.display()))),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(empty()),
                Err(e) => Err(e.into()),
            }
        }
        Some(other) => Ok(other.clone()),
    }
}
