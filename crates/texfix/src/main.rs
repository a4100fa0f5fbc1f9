//! texfix - Fix chapter headings in a generated LaTeX index
//!
//! Rewrites the documentation index file in place:
//! - `\chapter{...}` before `\input{hierarchy}` becomes `\chapter{Class Index}`
//! - `\chapter{...}` before `\input{files}` is dropped together with the input
//!
//! Usage:
//!   texfix latex/refman.tex
//!
//! The rewritten file is staged at `latex/temp.tex` (relative to the current
//! directory) unless the config file sets `[fixer] temp_path`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use texfix_core::{default_config_path, fix_index, load_config, Config};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "texfix")]
#[command(about = "Fix chapter headings in a generated LaTeX documentation index")]
#[command(version)]
struct Args {
    /// Index file to rewrite in place
    input_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = load_config_or_default();
    let fixer_config = config.fixer_config();

    let stats = fix_index(&args.input_file, &fixer_config)
        .with_context(|| format!("Failed to fix index {}", args.input_file.display()))?;

    tracing::debug!(?stats, "done");
    Ok(())
}

fn load_config_or_default() -> Config {
    let Some(config_path) = default_config_path() else {
        return Config::default();
    };
    match load_config(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}. Using defaults.");
            Config::default()
        }
    }
}
