//! Line state machine over class records

use super::lines::LineSplitter;
use super::rules::parse_literal;
use super::types::{ClassRecord, FieldValue, Restored};
use crate::error::{Error, Result};
use crate::schema::TOOL_NAME;
use crate::types::{FieldMapping, JsonObject, JsonValue};
use indexmap::IndexMap;
use regex::Regex;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static TOOL_OPEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\W*\{{@tool\s+{TOOL_NAME}\s+([^}}]+)\}}")).expect("valid tool regex")
});

static TOOL_CLOSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\W*\{@end-tool\}").expect("valid end-tool regex"));

static FIELD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\s*(\w+)(?:\((\w+)\))?\s*:\s*`(.*)`\s*$").expect("valid field regex")
});

static PROVENANCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"//\W+GENERATED\s+BY\s+`\s*([\w-]+)(.*)`\s*$").expect("valid provenance regex")
});

/// Document decoder, fed one line at a time
#[derive(Debug, Default)]
pub struct Decoder {
    records: IndexMap<String, ClassRecord>,
    current: Option<String>,
    cmd: Option<String>,
    args: Option<String>,
    line_no: usize,
}

impl Decoder {
    /// Create a decoder with no records
    pub fn new() -> Self {
        Self::default()
    }

    /// Records collected so far, in discovery order
    pub fn records(&self) -> &IndexMap<String, ClassRecord> {
        &self.records
    }

    /// Process one line (without its terminator)
    pub fn feed_line(&mut self, line: &str) -> Result<()> {
        self.line_no += 1;

        if let Some(caps) = TOOL_OPEN_REGEX.captures(line) {
            let argv: Vec<&str> = caps[1].split_whitespace().collect();
            let name = argv
                .iter()
                .position(|a| *a == "--name")
                .and_then(|i| argv.get(i + 1))
                .ok_or_else(|| self.syntax_error(line))?
                .to_string();
            let record = self.records.entry(name.clone()).or_insert_with(|| {
                debug!(class = %name, "class record opened");
                ClassRecord::new(true)
            });
            record.opened = true;
            if argv.contains(&"--strict") {
                record.strict = true;
            }
            self.current = Some(name);
        } else if TOOL_CLOSE_REGEX.is_match(line) {
            self.current = None;
        } else if let Some(current) = self.current.clone() {
            let Some(caps) = FIELD_REGEX.captures(line) else {
                return Ok(());
            };
            let key = caps.get(2).or_else(|| caps.get(1)).map_or("", |m| m.as_str());
            let value = parse_literal(&caps[3]).ok_or_else(|| self.syntax_error(line))?;
            if let Some(class) = value.class_ref() {
                self.reference(class, &current);
            }
            if let Some(record) = self.records.get_mut(&current) {
                record.fields.insert(key.to_string(), value);
            }
        } else if let Some(caps) = PROVENANCE_REGEX.captures(line) {
            self.cmd = Some(caps[1].to_string());
            self.args = Some(caps[2].trim().to_string());
        }
        Ok(())
    }

    /// Note a reference from `from` to `class`
    ///
    /// A referenced class is nested somewhere, so it cannot be the top
    /// class, unless it refers to itself.
    fn reference(&mut self, class: &str, from: &str) {
        match self.records.get_mut(class) {
            Some(record) if class != from => record.top = false,
            Some(_) => {}
            None => {
                debug!(class = %class, "forward reference");
                self.records.insert(class.to_string(), ClassRecord::new(false));
            }
        }
    }

    fn syntax_error(&self, line: &str) -> Error {
        Error::DecodeSyntax {
            line_no: self.line_no,
            line: line.to_string(),
            partial: self.partial(),
        }
    }

    fn partial(&self) -> String {
        serde_json::to_string_pretty(&self.records).unwrap_or_default()
    }

    /// Resolve the top class and assemble its data and map
    pub fn finish(self) -> Result<Restored> {
        let Some(top) = self
            .records
            .iter()
            .find(|(_, record)| record.top)
            .map(|(name, _)| name.clone())
        else {
            return Err(Error::NoTopClass {
                partial: self.partial(),
            });
        };

        let mut visiting = Vec::new();
        let (data, map) = self.assemble(&top, &mut visiting);
        debug!(class = %top, records = self.records.len(), "decoded");
        Ok(Restored {
            cmd: self.cmd,
            args: self.args,
            data,
            map,
        })
    }

    /// Data and mapping of a referenced class
    ///
    /// A class that never got a block of its own is only recorded by the
    /// referencing literal, so that literal is its data.
    fn resolve(
        &self,
        class: &str,
        literal: Option<&JsonValue>,
        visiting: &mut Vec<String>,
    ) -> (JsonValue, FieldMapping) {
        let opened = self.records.get(class).is_some_and(|r| r.opened);
        match literal {
            Some(value) if !opened => (value.clone(), FieldMapping::named(class)),
            _ => self.assemble(class, visiting),
        }
    }

    /// Data and mapping of one class, with references resolved
    ///
    /// A class already on the `visiting` stack resolves to an empty object.
    fn assemble(&self, name: &str, visiting: &mut Vec<String>) -> (JsonValue, FieldMapping) {
        let mut mapping = FieldMapping::named(name);
        let mut data = JsonObject::new();
        let record = match self.records.get(name) {
            Some(record) if !visiting.iter().any(|v| v == name) => record,
            _ => return (data.into(), mapping),
        };
        mapping.strict = record.strict;
        visiting.push(name.to_string());

        for (key, field) in &record.fields {
            match field {
                FieldValue::Literal(value) => {
                    if value.is_object() || value.is_array() {
                        mapping.map.insert(
                            key.clone(),
                            FieldMapping {
                                ignore: true,
                                ..Default::default()
                            },
                        );
                    }
                    data.insert(key.clone(), value.clone());
                }
                FieldValue::Dynamic(value) => {
                    mapping.map.insert(
                        key.clone(),
                        FieldMapping {
                            dynamic: true,
                            ..Default::default()
                        },
                    );
                    data.insert(key.clone(), value.clone());
                }
                FieldValue::Class { class, value } => {
                    let (value, child) = self.resolve(class, value.as_ref(), visiting);
                    mapping.map.insert(key.clone(), child);
                    data.insert(key.clone(), value);
                }
                FieldValue::List { class, value } => {
                    let (value, child) = self.resolve(class, value.as_ref(), visiting);
                    mapping.map.insert(key.clone(), child);
                    data.insert(key.clone(), JsonValue::Array(vec![value]));
                }
                FieldValue::Mapped {
                    class,
                    key: representative,
                    value,
                } => {
                    let literal = value.get(representative);
                    let (item, mut child) = self.resolve(class, literal, visiting);
                    child.suffix = false;
                    let mut value = value.clone();
                    value.insert(representative.clone(), item);
                    let mut container = FieldMapping {
                        mapped: true,
                        ..Default::default()
                    };
                    container.map.insert(representative.clone(), child);
                    mapping.map.insert(key.clone(), container);
                    data.insert(key.clone(), value.into());
                }
            }
        }

        visiting.pop();
        (data.into(), mapping)
    }
}

/// Decode a whole document held in memory
pub fn decode(text: &str) -> Result<Restored> {
    let mut decoder = Decoder::new();
    let mut splitter = LineSplitter::new();
    for line in splitter.push(text.as_bytes()) {
        decoder.feed_line(&line)?;
    }
    if let Some(line) = splitter.finish() {
        decoder.feed_line(&line)?;
    }
    decoder.finish()
}

/// Decode a document read from any byte stream
pub fn decode_reader<R: Read>(mut reader: R) -> Result<Restored> {
    let mut decoder = Decoder::new();
    let mut splitter = LineSplitter::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for line in splitter.push(&buf[..n]) {
            decoder.feed_line(&line)?;
        }
    }
    if let Some(line) = splitter.finish() {
        decoder.feed_line(&line)?;
    }
    decoder.finish()
}

/// Decode a file; a missing file is [`Error::FileNotFound`]
pub fn decode_file(path: &Path) -> Result<Restored> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    decode_reader(file)
}
