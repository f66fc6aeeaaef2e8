//! CLI arguments and option resolution

use crate::config::Settings;
use crate::types::BuildOptions;
use clap::Parser;
use std::path::PathBuf;

/// Command name written into provenance lines
pub const CMD: &str = "json2dart";

/// Generate Dart model classes from sample JSON
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "json2dart")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Concatenate parent names into default class names (default)
    #[arg(long, overrides_with = "no_concat")]
    pub concat: bool,

    /// Use the field name alone for default class names
    #[arg(long = "no-concat", overrides_with = "concat")]
    pub no_concat: bool,

    /// Start from a config: a `.dart` output, a `.json` settings overlay,
    /// or the existing output when given without a value
    #[arg(
        long,
        value_name = "CONFIG",
        num_args = 0..=1,
        default_missing_value = "",
        overrides_with = "no_config"
    )]
    pub config: Option<String>,

    /// Ignore the decisions recorded in the existing output
    #[arg(long = "no-config", overrides_with = "config")]
    pub no_config: bool,

    /// Output directory
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Print the generated code instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Output file
    #[arg(long, value_name = "DART_FILE")]
    pub file: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(short, long)]
    pub force: bool,

    /// Read the input JSON from a URL or file
    #[arg(long, value_name = "URL_OR_FILE")]
    pub from: Option<String>,

    /// Fetch options, inline JSON or a JSON file
    #[arg(long, value_name = "OPTION")]
    pub from_option: Option<String>,

    /// Formatter command; empty disables formatting
    #[arg(long, value_name = "COMMAND")]
    pub formatter: Option<String>,

    /// Longest class literal kept in comments
    #[arg(long, value_name = "LENGTH")]
    pub max_comment: Option<usize>,

    /// Merge the data recorded in the existing output (default)
    #[arg(long, overrides_with = "no_merge")]
    pub merge: bool,

    /// Use the input data alone
    #[arg(long = "no-merge", overrides_with = "merge")]
    pub no_merge: bool,

    /// Top class name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Prefix for every class name except the top one
    #[arg(
        short,
        long,
        value_name = "PREFIX",
        num_args = 0..=1,
        default_missing_value = "",
        overrides_with = "no_prefix"
    )]
    pub prefix: Option<String>,

    /// Disable the configured prefix
    #[arg(long = "no-prefix", overrides_with = "prefix")]
    pub no_prefix: bool,

    /// Regenerate a Dart file from its own comments
    #[arg(long, value_name = "DART_FILE", conflicts_with = "restore")]
    pub rebuild: Option<PathBuf>,

    /// Print the JSON and decisions recorded in a Dart file
    #[arg(long, value_name = "DART_FILE")]
    pub restore: Option<PathBuf>,

    /// Type numbers as int/double from the sample
    #[arg(long, overrides_with = "no_strict")]
    pub strict: bool,

    /// Type every number as num
    #[arg(long = "no-strict", overrides_with = "strict")]
    pub no_strict: bool,

    /// Append the item suffix to array item class names (default)
    #[arg(long, overrides_with = "no_suffix")]
    pub suffix: bool,

    /// Do not append the item suffix
    #[arg(long = "no-suffix", overrides_with = "suffix")]
    pub no_suffix: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Accept every default answer
    #[arg(short, long)]
    pub yes: bool,
}

/// Where the starting decisions come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// The existing output file, when there is one
    Existing,
    /// Nothing: start from the settings map only
    Disabled,
    /// Decisions restored from another Dart file
    Dart(PathBuf),
    /// A JSON settings overlay
    Json(PathBuf),
}

fn flag(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl Cli {
    /// `--concat` / `--no-concat`
    pub fn concat_flag(&self) -> Option<bool> {
        flag(self.concat, self.no_concat)
    }

    /// `--strict` / `--no-strict`
    pub fn strict_flag(&self) -> Option<bool> {
        flag(self.strict, self.no_strict)
    }

    /// `--suffix` / `--no-suffix`
    pub fn suffix_flag(&self) -> Option<bool> {
        flag(self.suffix, self.no_suffix)
    }

    /// `--merge` / `--no-merge`
    pub fn merge_flag(&self) -> Option<bool> {
        flag(self.merge, self.no_merge)
    }

    /// Resolve `--config` / `--no-config`
    pub fn config_source(&self) -> ConfigSource {
        if self.no_config {
            return ConfigSource::Disabled;
        }
        match self.config.as_deref() {
            None | Some("") => ConfigSource::Existing,
            Some(file) if file.ends_with(".dart") => ConfigSource::Dart(PathBuf::from(file)),
            Some(file) => ConfigSource::Json(PathBuf::from(file)),
        }
    }

    /// Builder options: settings first, flags on top
    pub fn build_options(&self, settings: &Settings) -> BuildOptions {
        let mut options = settings.build_options();
        if let Some(concat) = self.concat_flag() {
            options.concat = concat;
        }
        if let Some(strict) = self.strict_flag() {
            options.strict = Some(strict);
        }
        if let Some(suffix) = self.suffix_flag() {
            options.suffix = suffix;
        }
        if self.no_prefix {
            options.prefix = None;
        } else if let Some(prefix) = &self.prefix {
            options.prefix = Some(prefix.clone()).filter(|p| !p.is_empty());
        }
        if let Some(max_comment) = self.max_comment {
            options.max_comment = max_comment;
        }
        options
    }

    /// Flags given on `over` replace the ones recorded here
    ///
    /// Used by rebuilds: recorded provenance arguments first, the current
    /// command line on top.
    #[must_use]
    pub fn overridden_by(&self, over: &Cli) -> Cli {
        fn pair(base: (bool, bool), over: (bool, bool)) -> (bool, bool) {
            if over.0 || over.1 {
                over
            } else {
                base
            }
        }

        let (concat, no_concat) = pair((self.concat, self.no_concat), (over.concat, over.no_concat));
        let (strict, no_strict) = pair((self.strict, self.no_strict), (over.strict, over.no_strict));
        let (suffix, no_suffix) = pair((self.suffix, self.no_suffix), (over.suffix, over.no_suffix));
        let (merge, no_merge) = pair((self.merge, self.no_merge), (over.merge, over.no_merge));
        let (prefix, no_prefix) = if over.prefix.is_some() || over.no_prefix {
            (over.prefix.clone(), over.no_prefix)
        } else {
            (self.prefix.clone(), self.no_prefix)
        };
        let (config, no_config) = if over.config.is_some() || over.no_config {
            (over.config.clone(), over.no_config)
        } else {
            (self.config.clone(), self.no_config)
        };

        Cli {
            concat,
            no_concat,
            config,
            no_config,
            dir: over.dir.clone().or_else(|| self.dir.clone()),
            dry_run: over.dry_run,
            file: over.file.clone().or_else(|| self.file.clone()),
            force: over.force,
            from: over.from.clone().or_else(|| self.from.clone()),
            from_option: over.from_option.clone().or_else(|| self.from_option.clone()),
            formatter: over.formatter.clone().or_else(|| self.formatter.clone()),
            max_comment: over.max_comment.or(self.max_comment),
            merge,
            no_merge,
            name: over.name.clone().or_else(|| self.name.clone()),
            prefix,
            no_prefix,
            rebuild: over.rebuild.clone(),
            restore: over.restore.clone(),
            strict,
            no_strict,
            suffix,
            no_suffix,
            verbose: over.verbose,
            yes: self.yes || over.yes,
        }
    }

    /// Arguments recorded in the provenance line, enough to reproduce
    /// the run
    pub fn provenance_args(&self, name: &str) -> String {
        let mut args = vec!["-n".to_string(), name.to_string()];
        if let Some(dir) = &self.dir {
            args.push("--dir".to_string());
            args.push(dir.display().to_string());
        }
        match self.strict_flag() {
            Some(true) => args.push("--strict".to_string()),
            Some(false) => args.push("--no-strict".to_string()),
            None => {}
        }
        if self.concat_flag() == Some(false) {
            args.push("--no-concat".to_string());
        }
        if self.no_prefix {
            args.push("--no-prefix".to_string());
        } else if let Some(prefix) = self.prefix.as_deref().filter(|p| !p.is_empty()) {
            args.push("-p".to_string());
            args.push(prefix.to_string());
        }
        if self.suffix_flag() == Some(false) {
            args.push("--no-suffix".to_string());
        }
        if let Some(max_comment) = self.max_comment.filter(|m| *m > 0) {
            args.push("--max-comment".to_string());
            args.push(max_comment.to_string());
        }
        if let Some(from) = &self.from {
            args.push("--from".to_string());
            args.push(from.clone());
        }
        if let Some(from_option) = &self.from_option {
            args.push("--from-option".to_string());
            args.push(from_option.clone());
        }
        if self.no_config {
            args.push("--no-config".to_string());
        } else if let Some(config) = &self.config {
            args.push("--config".to_string());
            if !config.is_empty() {
                args.push(config.clone());
            }
        }
        if self.yes {
            args.push("-y".to_string());
        }
        args.join(" ")
    }
}
