//! `dd`: digest a raw design response into a compact design.
//!
//! Reads a file/nodes API response (a file path, or stdin when omitted or
//! `-`) and prints the simplified design as YAML or JSON on stdout.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use dd_core::{DigestConfig, IdStrategy, OutputFormat};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "dd", version, about = "Simplify a design-tool response for LLM consumption")]
struct Cli {
    /// Raw response JSON. Reads stdin when omitted or `-`.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    format: Format,

    /// Seed the style-id generator for reproducible output.
    #[arg(long, value_name = "N", conflicts_with = "content_hash_ids")]
    seed: Option<u64>,

    /// Derive style ids from the style content instead of at random.
    #[arg(long)]
    content_hash_ids: bool,

    /// Keep `VECTOR` nodes as they are instead of typing them `IMAGE-SVG`.
    #[arg(long)]
    keep_vectors: bool,

    /// Log progress and pruned nodes to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => OutputFormat::Yaml,
            Format::Json => OutputFormat::Json,
        }
    }
}

impl Cli {
    fn config(&self) -> DigestConfig {
        let ids = match (self.seed, self.content_hash_ids) {
            (_, true) => IdStrategy::ContentHash,
            (Some(seed), false) => IdStrategy::Seeded(seed),
            (None, false) => IdStrategy::Random,
        };
        DigestConfig {
            ids,
            rewrite_vectors: !self.keep_vectors,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let (label, text) = read_input(cli.input.as_deref())?;
    log::info!("read {} bytes from {label}", text.len());

    let design = dd_core::build_from_str(&text, &cli.config())
        .with_context(|| format!("failed to digest {label}"))?;
    log::info!(
        "{} nodes, {} style variables",
        design.node_count(),
        design.global_vars.styles.len()
    );

    let output = dd_core::render(&design, cli.format.into())?;
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Read the whole input, returning a label for messages alongside it.
fn read_input(path: Option<&Path>) -> anyhow::Result<(String, String)> {
    match path {
        Some(path) if path != Path::new("-") => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok((path.display().to_string(), text))
        }
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(("<stdin>".to_string(), text))
        }
    }
}
