mod config;
mod discover;
mod manifest;
mod utils;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use config::Config;
use discover::discover;
use manifest::Manifest;
use std::{
    fmt::{self, Display},
    io::{stderr, IsTerminal},
    path::PathBuf,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use utils::{write_atomic, KVPairs};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum EmitTarget {
    #[default]
    Files,
    Stdout,
}

impl Display for EmitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stdout => "stdout",
            Self::Files => "files",
        })
    }
}

#[derive(Parser)]
#[command(name = "gen-cmake-lists", about)]
struct Cli {
    #[arg(
        short = 'C',
        long,
        default_value = ".",
        value_name = "dir",
        help = "Directory to scan for test sources; the output path is relative to it"
    )]
    dir: PathBuf,
    #[arg(
        long,
        default_value_t,
        value_name = "what",
        help = "What data to emit and how",
        next_line_help = true
    )]
    emit: EmitTarget,
    #[arg(
        long,
        value_name = "path",
        help = "Path to a config file, instead of gen-cmake-lists.toml in the scanned directory"
    )]
    config_path: Option<PathBuf>,
    #[arg(
        long,
        value_name = "key1=val1,key2=val2...",
        help = "Set options from the command line, overriding the config file"
    )]
    config: Option<KVPairs>,
}

pub fn main() -> anyhow::Result<()> {
    _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_ansi(stderr().is_terminal())
        .with_writer(stderr)
        .try_init();

    let Cli { dir, emit, config_path, config } = Cli::parse();
    let overrides = config.unwrap_or_default();
    let config = Config::fetch(config_path.as_deref(), &dir, overrides.iter())
        .context("failed to load the configuration")?;

    let entries = discover(&dir, &config.extension)?;
    let manifest = Manifest::render(&entries, &config);
    debug!(
        executables = manifest.executables(),
        discovery = manifest.discovery(),
        "rendered the fragments"
    );

    match emit {
        EmitTarget::Stdout => print!("{manifest}"),
        EmitTarget::Files => {
            let output = dir.join(&config.output);
            write_atomic(&output, manifest.document())
                .with_context(|| format!("failed to write {output:?}"))?;
            info!(output = %output.display(), targets = entries.len(), "wrote the manifest");
        }
    }
    Ok(())
}
