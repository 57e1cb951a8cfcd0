#![forbid(unsafe_code)]

//! # rolecolor
//!
//! Command-line front end for the `rolecolor` engine. Reads theme documents
//! or style variations and prints their resolved color roles as JSON.

mod cli;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, bail};
use rolecolor::{EngineConfig, Resolver, ThemeDocument, Variation, VariationList};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use cli::{Cli, InputKind};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    init_tracing(&cli);

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let resolver = Resolver::with_config(config).context("invalid engine config")?;
    let input = read_input(&cli)?;
    let output = run(&resolver, &cli, input)?;

    let text = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(cli: &Cli) -> anyhow::Result<Value> {
    match cli.input.as_deref() {
        Some(path) if !cli.reads_stdin() => {
            let text =
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            parse_by_extension(path, &text).with_context(|| format!("parsing {}", path.display()))
        }
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            serde_json::from_str(&text).context("stdin is not valid JSON")
        }
    }
}

fn parse_by_extension(path: &Path, text: &str) -> anyhow::Result<Value> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") | None => Ok(serde_json::from_str(text)?),
        Some("toml") => Ok(toml::from_str(text)?),
        #[cfg(feature = "yaml")]
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(text)?),
        Some(other) => bail!("unsupported input format '{other}'"),
    }
}

fn detect(value: &Value) -> InputKind {
    if value.get("variations").is_some() {
        InputKind::List
    } else if value.get("config").is_some() {
        InputKind::Variation
    } else {
        InputKind::Document
    }
}

fn run(resolver: &Resolver, cli: &Cli, input: Value) -> anyhow::Result<Value> {
    let kind = match cli.kind {
        InputKind::Auto => detect(&input),
        explicit => explicit,
    };
    tracing::debug!(input.kind = ?kind, dark = cli.dark, preview = cli.preview, "resolving");

    let output = match kind {
        InputKind::Document => {
            let doc = ThemeDocument::from_value(input).context("not a theme document")?;
            if cli.preview {
                let variation = Variation {
                    config: doc,
                    ..Variation::default()
                };
                serde_json::to_value(resolver.preview(&variation, cli.dark))?
            } else {
                serde_json::to_value(resolver.resolve(&doc, cli.dark))?
            }
        }
        InputKind::Variation => {
            let variation: Variation =
                serde_json::from_value(input).context("not a style variation")?;
            render(resolver, &variation, cli)?
        }
        InputKind::List | InputKind::Auto => {
            let list: VariationList =
                serde_json::from_value(input).context("not a variation listing")?;
            tracing::info!(variations.count = list.variations.len(), "resolving listing");
            let cards = list
                .variations
                .iter()
                .map(|v| render(resolver, v, cli))
                .collect::<anyhow::Result<Vec<_>>>()?;
            Value::Array(cards)
        }
    };
    Ok(output)
}

fn render(resolver: &Resolver, variation: &Variation, cli: &Cli) -> anyhow::Result<Value> {
    let value = if cli.preview {
        serde_json::to_value(resolver.preview(variation, cli.dark))?
    } else {
        serde_json::to_value(resolver.resolve_variation(variation, cli.dark))?
    };
    Ok(value)
}
