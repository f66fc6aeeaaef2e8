//! CLI runner - executes commands

use crate::cli::commands::{Cli, ConfigSource, CMD};
use crate::codec::decode_file;
use crate::config::{json_or_file, Settings};
use crate::error::{Error, Result, ResultExt};
use crate::fetch::{FetchConfig, Fetcher};
use crate::generate::{generate, GenerateRequest, Generated, OutputResolver};
use crate::merge::merge_config;
use crate::output::{format_code, with_provenance, write_code};
use crate::prompt::{BlockOptions, BlockPrompter, ScriptedPrompter};
use crate::types::JsonValue;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
    cwd: PathBuf,
}

impl Runner {
    /// Create a runner working in the current directory
    pub fn new(cli: Cli) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { cli, cwd }
    }

    /// Resolve relative paths and `.json2dart` against `cwd`
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        if let Some(path) = &self.cli.restore {
            return self.restore(path);
        }
        let settings = Settings::load(&self.cwd)?;
        match &self.cli.rebuild {
            Some(path) => self.rebuild(path, &settings).await,
            None => self.generate(settings).await,
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.cwd.join(path)
    }

    /// Print the data recorded in a Dart file, and its decisions when verbose
    fn restore(&self, path: &Path) -> Result<()> {
        let restored = decode_file(&self.resolve(path))?;
        println!("{}", serde_json::to_string_pretty(&restored.data)?);
        if self.cli.verbose {
            eprintln!("{}", serde_json::to_string_pretty(&restored.map)?);
        }
        Ok(())
    }

    /// Regenerate a Dart file from its own comments, without asking anything
    async fn rebuild(&self, path: &Path, settings: &Settings) -> Result<()> {
        let file = self.resolve(path);
        let restored = decode_file(&file)?;

        let recorded = Cli::try_parse_from(std::iter::once(CMD.to_string()).chain(restored.argv()))
            .map_err(|e| {
                Error::config(format!(
                    "{}: unreadable provenance arguments: {e}",
                    file.display()
                ))
            })?;
        let cli = recorded.overridden_by(&self.cli);
        let output = self
            .cli
            .file
            .as_deref()
            .map_or_else(|| file.clone(), |f| self.resolve(f));

        let request = GenerateRequest {
            name: restored.map.name.clone(),
            data: Some(restored.data),
            map: restored.map,
            merge: false,
            use_existing_config: false,
            output: Some(OutputResolver::File(output)),
            options: cli.build_options(settings),
        };
        let mut prompter = ScriptedPrompter::auto();
        let generated = generate(&mut prompter, request, |data| data)?;

        // Recorded arguments stay verbatim unless this run changed them
        let name = &generated.unit.name;
        let args = match restored.args {
            Some(args) if cli.provenance_args(name) == recorded.provenance_args(name) => args,
            _ => cli.provenance_args(name),
        };
        let cmd = restored.cmd.unwrap_or_else(|| CMD.to_string());
        info!(class = %name, "rebuilt from comments");
        self.emit(&generated, &cmd, &args, settings, true).await
    }

    async fn generate(&self, settings: Settings) -> Result<()> {
        let mut settings = settings;
        let mut map = settings.map.clone().unwrap_or_default();
        let use_existing_config = match self.cli.config_source() {
            ConfigSource::Existing => true,
            ConfigSource::Disabled => false,
            ConfigSource::Dart(path) => {
                map = decode_file(&self.resolve(&path))
                    .with_context(|| format!("--config {}", path.display()))?
                    .map;
                false
            }
            ConfigSource::Json(path) => {
                let overlay = read_json_file(&self.resolve(&path))
                    .with_context(|| format!("--config {}", path.display()))?;
                settings = settings.overlay(&overlay)?;
                if let Some(overlay) = settings.map.clone() {
                    map = overlay;
                }
                true
            }
        };

        let output_dir = match &self.cli.dir {
            Some(dir) => self.resolve(dir),
            None => settings.output_dir(&self.cwd),
        };
        let output = match &self.cli.file {
            Some(file) => OutputResolver::File(self.resolve(file)),
            None => OutputResolver::Dir(output_dir.clone()),
        };
        let data = match &self.cli.from {
            Some(from) => Some(self.fetch(from, &settings, &output_dir).await?),
            None => None,
        };

        let request = GenerateRequest {
            name: self.cli.name.clone(),
            data,
            map,
            merge: self.cli.merge_flag().unwrap_or(true),
            use_existing_config,
            output: Some(output),
            options: self.cli.build_options(&settings),
        };

        // Prompting blocks on stdin, keep it off the async workers
        let options = BlockOptions::default().with_yes(self.cli.yes);
        let picker = settings.clone();
        let generated = tokio::task::spawn_blocking(move || {
            let mut prompter = BlockPrompter::stdio(options);
            generate(&mut prompter, request, |data| picker.pick(data))
        })
        .await
        .map_err(|e| Error::Other(format!("generation task failed: {e}")))??;

        let args = self.cli.provenance_args(&generated.unit.name);
        self.emit(&generated, CMD, &args, &settings, self.cli.force)
            .await
    }

    async fn fetch(&self, from: &str, settings: &Settings, output_dir: &Path) -> Result<JsonValue> {
        let configured = json_or_file(settings.from_option.as_ref(), &self.cwd)?;
        let given = self.cli.from_option.clone().map(JsonValue::String);
        let option = merge_config(&configured, &json_or_file(given.as_ref(), &self.cwd)?);

        let fetcher = Fetcher::new(FetchConfig::from_value(option)?)?.with_base_dir(&self.cwd);
        let fetched = fetcher.fetch(from, output_dir).await?;
        debug!(from = %fetched.from, "input fetched");
        Ok(fetched.data)
    }

    /// Format and write (or print) the generated code
    async fn emit(
        &self,
        generated: &Generated,
        cmd: &str,
        args: &str,
        settings: &Settings,
        force: bool,
    ) -> Result<()> {
        let formatter = self.cli.formatter.as_deref().unwrap_or(&settings.formatter);
        let code = format_code(&with_provenance(&generated.unit.code, cmd, args), formatter).await?;

        if self.cli.dry_run {
            if self.cli.verbose {
                eprintln!("{}", serde_json::to_string_pretty(&generated.unit.map)?);
            }
            println!("{code}");
            return Ok(());
        }

        let path = generated
            .output
            .as_deref()
            .ok_or_else(|| Error::Other("no output file".to_string()))?;
        write_code(path, &code, force).await
    }
}

fn read_json_file(path: &Path) -> Result<JsonValue> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    serde_json::from_str(&text).map_err(|e| Error::config(format!("{}: {e}", path.display())))
}
