// Allow common clippy pedantic lints
#![allow(clippy::must_use_candidate)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::needless_pass_by_value)]

//! json2dart CLI
//!
//! Generates Dart model classes from sample JSON

use clap::Parser;
use json2dart::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries generated code and restored data
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        if let Some(raw) = e.raw() {
            println!("{raw}");
        }
        std::process::exit(1);
    }
}
