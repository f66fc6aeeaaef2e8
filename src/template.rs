//! Template interpolation for emitted Dart snippets
//!
//! Handles `{{ variable }}` interpolation in the line templates the
//! emitter renders. Substitution is single pass: text inserted for one
//! variable is never scanned again, so sample JSON containing braces is
//! safe to interpolate.

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Regex for matching template variables: {{ variable }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}").expect("valid template regex")
});

/// Variables available to a template
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: Vec<(&'static str, String)>,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any previous value
    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a variable in place
    pub fn set(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.vars.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((name, value)),
        }
        self
    }

    /// Get a variable value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut missing = BTreeSet::new();

    let rendered = TEMPLATE_REGEX.replace_all(template, |cap: &Captures<'_>| {
        let name = &cap[1];
        match ctx.get(name) {
            Some(value) => value.to_string(),
            None => {
                missing.insert(name.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(
            missing.into_iter().collect::<Vec<_>>().join(", "),
        ))
    }
}
