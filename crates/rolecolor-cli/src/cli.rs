//! Command-line interface for `rolecolor`.
//!
//! # Examples
//!
//! ```bash
//! # Resolve a theme.json for light mode
//! rolecolor theme.json
//!
//! # Dark mode, reading from stdin
//! cat theme.json | rolecolor --dark
//!
//! # Preview cards for every variation in a listing
//! rolecolor variations.json --preview --pretty
//!
//! # Print the default engine configuration
//! rolecolor --print-config
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Resolve theme palettes into semantic color roles.
///
/// Reads a theme document, a single style variation, or a `{"variations": [...]}`
/// listing and prints the resolved roles and foreground pairs as JSON.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rolecolor",
    author,
    version,
    about = "Resolve theme palettes into semantic color roles"
)]
pub struct Cli {
    /// Input file (`.json` or `.toml`). Reads JSON from stdin when absent or `-`.
    pub input: Option<PathBuf>,

    /// Resolve against the dark page background
    #[arg(long, short = 'd')]
    pub dark: bool,

    /// Emit full preview cards (swatch labels, font samples, scoped CSS)
    #[arg(long, short = 'p')]
    pub preview: bool,

    /// Engine configuration file (TOML, JSON or YAML)
    #[arg(long, short = 'c', env = "ROLECOLOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// How to interpret the input
    #[arg(long, value_enum, default_value_t = InputKind::Auto)]
    pub kind: InputKind,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Print the effective engine configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Shape of the input document.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    /// Guess from the top-level keys
    #[default]
    Auto,
    /// A bare theme document
    Document,
    /// One variation with a `config` key
    Variation,
    /// A `{"variations": [...]}` listing
    List,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the input comes from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input
            .as_deref()
            .is_none_or(|p| p.as_os_str() == "-")
    }

    /// The tracing filter directive for the requested verbosity.
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::try_parse_from(["rolecolor"]).unwrap();

        assert!(cli.input.is_none());
        assert!(cli.reads_stdin());
        assert!(!cli.dark);
        assert!(!cli.preview);
        assert!(!cli.pretty);
        assert_eq!(cli.kind, InputKind::Auto);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn cli_parses_input_and_flags() {
        let cli =
            Cli::try_parse_from(["rolecolor", "theme.json", "--dark", "-p", "--pretty"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("theme.json")));
        assert!(!cli.reads_stdin());
        assert!(cli.dark);
        assert!(cli.preview);
        assert!(cli.pretty);
    }

    #[test]
    fn cli_dash_means_stdin() {
        let cli = Cli::try_parse_from(["rolecolor", "-"]).unwrap();
        assert!(cli.reads_stdin());
    }

    #[test]
    fn cli_parses_kind() {
        let cli = Cli::try_parse_from(["rolecolor", "--kind", "list"]).unwrap();
        assert_eq!(cli.kind, InputKind::List);
        assert!(Cli::try_parse_from(["rolecolor", "--kind", "nope"]).is_err());
    }

    #[test]
    fn cli_verbosity() {
        let cli = Cli::try_parse_from(["rolecolor", "-v"]).unwrap();
        assert_eq!(cli.log_level(), "debug");
        let cli = Cli::try_parse_from(["rolecolor", "-vvv"]).unwrap();
        assert_eq!(cli.log_level(), "trace");
    }
}
