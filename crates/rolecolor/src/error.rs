//! Error types.
//!
//! [`ColorError`] is the internal failure taxonomy of the resolution pipeline.
//! It is returned by the low-level parsing and lookup functions and is always
//! degraded to a sentinel value before it leaves a component. Callers of the
//! pipeline only ever see [`DocumentError`] or [`ConfigError`], and only when
//! the input bytes cannot be read as a document at all.

use thiserror::Error;

/// Failure to turn a color value into a concrete color.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// The string is not in any supported color notation.
    #[error("cannot parse color '{0}'")]
    Parse(String),
    /// The string looks like a keyword but no host facility could resolve it.
    #[error("color '{0}' could not be resolved")]
    UnresolvedColor(String),
    /// A `var()` chain or a preset slug lookup found nothing.
    #[error("reference '{0}' could not be resolved")]
    UnresolvedReference(String),
    /// The palette has no usable colors.
    #[error("palette has no usable colors")]
    EmptyPalette,
    /// A palette entry without a slug or a color.
    #[error("palette entry {index} is missing a slug or a color")]
    MalformedPaletteEntry { index: usize },
}

/// Convenience alias for color parsing results.
pub type ColorResult<T> = Result<T, ColorError>;

/// Error loading a configuration document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[cfg(feature = "yaml")]
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Error loading or saving an engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[cfg(feature = "yaml")]
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid color '{value}' for '{field}'")]
    InvalidColor { field: &'static str, value: String },
}
