//! Generation pipeline
//!
//! Input JSON → picker → name → existing output (data and decisions) →
//! class tree builder. Every question goes through the [`Prompter`], so
//! the same pipeline serves interactive runs, `--yes` and rebuilds.

use crate::codec::{decode_file, Restored};
use crate::error::Result;
use crate::merge::{merge_config, merge_data};
use crate::prompt::{ask_until, ask_when_empty, Prompter};
use crate::schema;
use crate::types::{BuildOptions, DisambiguationMap, EmittedUnit, JsonValue};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything one generation needs
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Top class name; asked for when neither this nor `map.name` is set
    pub name: Option<String>,
    /// Input data; asked for when absent
    pub data: Option<JsonValue>,
    /// Decisions to start from
    pub map: DisambiguationMap,
    /// Merge the data recorded in the existing output into the input
    pub merge: bool,
    /// Start from the decisions recorded in the existing output
    pub use_existing_config: bool,
    /// Resolves the output file from the top class name
    pub output: Option<OutputResolver>,
    /// Builder options
    pub options: BuildOptions,
}

/// Output file naming, resolved once the top class name is known
#[derive(Debug, Clone)]
pub enum OutputResolver {
    /// A fixed file
    File(PathBuf),
    /// `<dir>/<snake_case(name)>.dart`
    Dir(PathBuf),
}

impl OutputResolver {
    /// Output path for `name`
    pub fn resolve(&self, name: &str) -> PathBuf {
        match self {
            OutputResolver::File(path) => path.clone(),
            OutputResolver::Dir(dir) => dir.join(crate::output::dart_file_name(name)),
        }
    }
}

/// Result of a generation
#[derive(Debug, Clone)]
pub struct Generated {
    /// Emitted classes and decisions
    pub unit: EmittedUnit,
    /// Resolved output file, if any
    pub output: Option<PathBuf>,
    /// Final input data after picking and merging
    pub data: JsonValue,
}

/// Run the pipeline
///
/// `pick` is applied to the supplied data and to every JSON answer.
pub fn generate<P, F>(prompter: &mut P, request: GenerateRequest, pick: F) -> Result<Generated>
where
    P: Prompter + ?Sized,
    F: Fn(JsonValue) -> JsonValue,
{
    let GenerateRequest {
        name,
        data,
        mut map,
        merge,
        use_existing_config,
        output,
        options,
    } = request;

    let data = ask_until(prompter, "Enter json: ", data.map(&pick), true, |answer| {
        if answer.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<JsonValue>(answer)
            .map(|value| Some(pick(value)))
            .map_err(|e| e.to_string())
    })?;
    prompter.prompt(&format!(
        "\nThe following json object was detected:\n{}\n",
        pretty(&data)
    ));

    let known = name.as_deref().or(map.name.as_deref()).map(str::to_string);
    let name = ask_when_empty(prompter, "Enter name of json object: ", known.as_deref())?;

    let output = output.map(|resolver| resolver.resolve(&name));
    let mut data = data;
    if let Some(path) = output.as_deref().filter(|_| merge || use_existing_config) {
        if let Some(existing) = restore_existing(path)? {
            if merge {
                data = merge_data(&existing.data, &data);
                prompter.prompt(&format!(
                    "\nThe merged json object is as follows:\n{}\n",
                    pretty(&data)
                ));
            }
            if use_existing_config {
                let merged = merge_config(
                    &serde_json::to_value(&existing.map)?,
                    &serde_json::to_value(&map)?,
                );
                map = serde_json::from_value(merged)?;
            }
        }
    }

    map.name = Some(name);
    let unit = schema::build(prompter, &data, map, &options)?;
    Ok(Generated { unit, output, data })
}

/// Decode an existing output file; `None` when it does not exist
pub fn restore_existing(path: &Path) -> Result<Option<Restored>> {
    match decode_file(path) {
        Ok(restored) => {
            debug!(path = %path.display(), "restored existing output");
            Ok(Some(restored))
        }
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn pretty(value: &JsonValue) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
