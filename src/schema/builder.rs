//! Class tree builder
//!
//! Walks a sample depth-first, asking the prompter to name every composite
//! field, and collects one class per resolved name. Class blocks come out
//! in discovery order (a parent before its children) and are rendered once
//! the walk is complete.

use super::emitter::{render_class, ClassSpec};
use super::naming::{check_identifier, is_valid_identifier, upper_camel};
use crate::error::{Error, Result};
use crate::merge::{merge_array, merge_config, merge_data};
use crate::prompt::Prompter;
use crate::types::{BuildOptions, DisambiguationMap, EmittedUnit, FieldMapping, JsonObject, JsonValue};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Build the classes for `sample`, naming the top class from `map.name`
///
/// `map` carries the decisions of an earlier run (or is empty); it is
/// updated in place with every answer and returned in the unit. A top
/// level array is collapsed into one representative object first.
pub fn build<P>(
    prompter: &mut P,
    sample: &JsonValue,
    map: DisambiguationMap,
    options: &BuildOptions,
) -> Result<EmittedUnit>
where
    P: Prompter + ?Sized,
{
    let mut map = map;
    let name = map
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::invalid_sample("the top class has no name"))?;

    let root = match sample {
        JsonValue::Object(obj) => obj.clone(),
        JsonValue::Array(items) => match merge_array(items) {
            JsonValue::Object(obj) => obj,
            _ => return Err(Error::invalid_sample("array items are not objects")),
        },
        other => {
            return Err(Error::invalid_sample(format!(
                "expected an object or an array of objects, got {}",
                type_name(other)
            )))
        }
    };

    let mut builder = ClassTreeBuilder::new(prompter, options);
    builder.visit_object(&root, &mut map, true)?;
    let code = builder.finish()?;

    Ok(EmittedUnit { name, code, map })
}

/// A class collected during the walk
#[derive(Debug, Default)]
struct ClassBlock {
    /// `None` until the node that reserved the slot has been visited
    sample: Option<JsonObject>,
    mapping: FieldMapping,
    strict: bool,
}

/// Naming context handed from a node to its fields
struct Parent {
    name: String,
    stem: String,
    is_top: bool,
}

/// Stateful walk over one sample
pub struct ClassTreeBuilder<'a, P: Prompter + ?Sized> {
    prompter: &'a mut P,
    options: &'a BuildOptions,
    classes: IndexMap<String, ClassBlock>,
    blockless: HashSet<String>,
}

impl<'a, P: Prompter + ?Sized> ClassTreeBuilder<'a, P> {
    /// Create a builder asking `prompter`
    pub fn new(prompter: &'a mut P, options: &'a BuildOptions) -> Self {
        Self {
            prompter,
            options,
            classes: IndexMap::new(),
            blockless: HashSet::new(),
        }
    }

    /// Number of distinct classes collected so far
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    fn visit_object(&mut self, obj: &JsonObject, cfg: &mut FieldMapping, is_top: bool) -> Result<()> {
        let name = cfg.name_or_empty().to_string();
        let emits = self.emits_class(obj, cfg, &name);
        if emits {
            self.classes.entry(name.clone()).or_default();
        } else if !cfg.ignore && !cfg.mapped && !name.is_empty() {
            self.blockless.insert(name.clone());
        }
        if cfg.mapped {
            align_representative(obj, cfg);
        }

        let parent = Parent {
            stem: cfg.stem().to_string(),
            name,
            is_top,
        };

        // A mapped container only elaborates its first value; the other
        // values are assumed to share its shape.
        let fields = obj.len().min(if cfg.mapped { 1 } else { usize::MAX });
        for (key, value) in obj.iter().take(fields) {
            match value {
                JsonValue::Array(items) if !items.is_empty() => {
                    if let JsonValue::Object(item) = merge_array(items) {
                        let mp = cfg.map.entry(key.clone()).or_default();
                        self.visit_array_field(&parent, key, &item, mp)?;
                    }
                }
                JsonValue::Object(child) => {
                    let mp = cfg.map.entry(key.clone()).or_default();
                    if cfg.mapped {
                        mp.suffix = false;
                    }
                    self.visit_object_field(&parent, key, child, mp)?;
                }
                _ => {}
            }
        }

        if emits {
            self.record(&parent.name, obj, cfg)?;
        }
        Ok(())
    }

    fn emits_class(&self, obj: &JsonObject, cfg: &FieldMapping, name: &str) -> bool {
        if cfg.ignore || cfg.mapped {
            return false;
        }
        if let Err(e) = check_identifier(name) {
            warn!(error = %e, "no class emitted for this object");
            return false;
        }
        if let Some(key) = obj.keys().find(|k| !is_valid_identifier(k)) {
            warn!(class = %name, key = %key, "invalid field key, no class emitted");
            return false;
        }
        true
    }

    fn visit_array_field(
        &mut self,
        parent: &Parent,
        key: &str,
        item: &JsonObject,
        mp: &mut FieldMapping,
    ) -> Result<()> {
        if mp.ignore {
            debug!(field = %key, "array field ignored");
            return Ok(());
        }
        self.prompter.prompt(&format!(
            "\nThe following array child objects are detected({}.{key}[]):\n{}\n",
            parent.name,
            pretty(item)
        ));

        let default_name = match &mp.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.default_item_name(parent, key, mp),
        };
        let answer = self.prompter.ask(
            &format!("Enter name of item of array ({default_name}): "),
            Some(&default_name),
        )?;
        let answer = answer.trim();
        let name = if answer.is_empty() {
            default_name
        } else {
            answer.to_string()
        };

        if mp.name_trim.is_none() && mp.suffix {
            if let Some(suffix) = self.options.item_suffix() {
                if name.len() > suffix.len() && name.ends_with(suffix) {
                    mp.name_trim = Some(suffix.to_string());
                }
            }
        }
        mp.name = Some(name);
        mp.mapped = false;
        mp.dynamic = false;

        self.visit_object(item, mp, false)
    }

    fn visit_object_field(
        &mut self,
        parent: &Parent,
        key: &str,
        child: &JsonObject,
        mp: &mut FieldMapping,
    ) -> Result<()> {
        if mp.ignore {
            debug!(field = %key, "object field ignored");
            return Ok(());
        }
        self.prompter.prompt(&format!(
            "\nThe following child object was detected({}.{key}):\n{}\n",
            parent.name,
            pretty(child)
        ));

        let default_name = match &mp.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.default_object_name(parent, key),
        };
        let default_choice = if mp.mapped {
            "1"
        } else if mp.dynamic {
            "2"
        } else {
            "0"
        };
        let query = format!(
            "  0. The default object name ({default_name})\n  \
             1. Is a object map (map)\n  \
             2. Is a dynamic object (dynamic)\n\n\
             Enter a new name or the number above ({default_choice}): "
        );
        let answer = self.prompter.ask(&query, Some(default_choice))?;
        let answer = answer.trim();
        let choice = if answer.is_empty() { default_choice } else { answer };

        mp.mapped = false;
        mp.dynamic = false;
        mp.name = Some(default_name);
        match choice {
            "0" => {}
            "1" | "map" => mp.mapped = true,
            "2" | "dynamic" => mp.dynamic = true,
            other => mp.name = Some(other.to_string()),
        }

        if mp.mapped && !child.values().next().is_some_and(JsonValue::is_object) {
            warn!(field = %key, "map values are not objects, using a dynamic map");
            mp.mapped = false;
            mp.dynamic = true;
        }
        if mp.dynamic {
            return Ok(());
        }
        self.visit_object(child, mp, false)
    }

    /// Parent stem without the class prefix, for concatenation
    fn parent_base<'p>(&self, parent: &'p Parent) -> &'p str {
        match self.options.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() && !parent.is_top => {
                parent.stem.strip_prefix(prefix).unwrap_or(&parent.stem)
            }
            _ => &parent.stem,
        }
    }

    fn with_prefix(&self, name: String) -> String {
        match self.options.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}{name}"),
            _ => name,
        }
    }

    fn default_object_name(&self, parent: &Parent, key: &str) -> String {
        let base = if self.options.concat {
            format!("{}{}", self.parent_base(parent), upper_camel(key))
        } else {
            upper_camel(key)
        };
        self.with_prefix(base)
    }

    fn default_item_name(&self, parent: &Parent, key: &str, mp: &mut FieldMapping) -> String {
        let mut base = String::new();
        if self.options.concat {
            base.push_str(self.parent_base(parent));
        }
        if !self.options.array.iter().any(|alias| alias == key) {
            base.push_str(&upper_camel(key));
        }
        let mut name = self.with_prefix(base);
        if mp.suffix {
            if let Some(suffix) = self.options.item_suffix() {
                name.push_str(suffix);
                mp.name_trim = Some(suffix.to_string());
            }
        }
        if name.is_empty() {
            name = upper_camel(key);
        }
        name
    }

    /// Store a visited node under its class name, widening on collision
    fn record(&mut self, name: &str, obj: &JsonObject, cfg: &FieldMapping) -> Result<()> {
        let strict = self.options.strict.unwrap_or(cfg.strict);
        let block = self.classes.entry(name.to_string()).or_default();

        let Some(existing) = block.sample.take() else {
            debug!(class = %name, fields = obj.len(), "class resolved");
            block.sample = Some(obj.clone());
            block.mapping = cfg.clone();
            block.strict = strict;
            return Ok(());
        };

        if !existing.keys().eq(obj.keys()) {
            warn!(class = %name, "class name reused for a different shape, widening");
        }
        // Keys keep the first occurrence's order, and so do its values on
        // conflict.
        let existing = JsonValue::Object(existing);
        let incoming = JsonValue::Object(obj.clone());
        block.sample = match merge_data(&existing, &merge_data(&incoming, &existing)) {
            JsonValue::Object(widened) => Some(widened),
            _ => Some(obj.clone()),
        };
        let existing = serde_json::to_value(&block.mapping)?;
        let incoming = serde_json::to_value(cfg)?;
        block.mapping =
            serde_json::from_value(merge_config(&existing, &merge_config(&incoming, &existing)))?;
        block.strict = block.strict || strict;
        Ok(())
    }

    /// Render every collected class, in discovery order
    fn finish(self) -> Result<String> {
        let mark_strict = self.options.strict.is_none();
        let blockless: HashSet<String> = self
            .blockless
            .iter()
            .filter(|name| !self.classes.contains_key(*name))
            .cloned()
            .collect();
        let mut blocks: Vec<String> = Vec::with_capacity(self.classes.len());
        for (name, block) in &self.classes {
            let Some(sample) = &block.sample else { continue };
            let spec = ClassSpec {
                name,
                sample,
                mapping: &block.mapping,
                strict: block.strict,
                mark_strict,
                blockless: &blockless,
            };
            match render_class(&spec, self.options) {
                Ok(code) => blocks.push(code),
                Err(Error::VariableNameExhausted { class, method, raw }) => {
                    blocks.push(raw);
                    return Err(Error::VariableNameExhausted {
                        class,
                        method,
                        raw: blocks.join("\n"),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(blocks.join("\n"))
    }
}

/// Key the representative map entry by the first key of the sample
fn align_representative(obj: &JsonObject, cfg: &mut FieldMapping) {
    let Some(first) = obj.keys().next() else { return };
    if cfg.map.len() == 1 && cfg.map.contains_key(first) {
        return;
    }
    let representative = cfg
        .map
        .shift_remove(first)
        .or_else(|| cfg.map.shift_remove_index(0).map(|(_, m)| m));
    cfg.map.clear();
    if let Some(mut representative) = representative {
        representative.suffix = false;
        cfg.map.insert(first.clone(), representative);
    }
}

fn pretty(obj: &JsonObject) -> String {
    serde_json::to_string_pretty(obj).unwrap_or_default()
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
