//! Engine configuration.
//!
//! The constants the pipeline uses (compositing backgrounds, sentinel color,
//! default foreground and background, reference depth) live in
//! [`EngineConfig`] so hosts can tune them. Every field has a default, so an
//! empty file is a valid configuration.
//!
//! ```toml
//! neutral_background = "#808080"
//! light_page_background = "#ffffff"
//! dark_page_background = "#000000"
//! placeholder = "#cccccc"
//! max_var_depth = 1
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::color::{Rgba, to_rgba};
use crate::error::ConfigError;

/// Tunable constants of the resolution pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Background translucent palette colors are composited over.
    pub neutral_background: String,
    /// Page background in light mode.
    pub light_page_background: String,
    /// Page background in dark mode.
    pub dark_page_background: String,
    /// Sentinel for roles and expressions that could not be resolved.
    pub placeholder: String,
    /// Substitute for foregrounds that cannot be parsed.
    pub default_foreground: String,
    /// Substitute for backgrounds that cannot be parsed.
    pub default_background: String,
    /// Extra `var()` hops followed after the first lookup.
    pub max_var_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            neutral_background: "#808080".to_string(),
            light_page_background: "#ffffff".to_string(),
            dark_page_background: "#000000".to_string(),
            placeholder: crate::PLACEHOLDER.to_string(),
            default_foreground: "#000000".to_string(),
            default_background: "#ffffff".to_string(),
            max_var_depth: 1,
        }
    }
}

/// [`EngineConfig`] with every color parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EngineColors {
    pub neutral_background: Rgba,
    pub light_page_background: Rgba,
    pub dark_page_background: Rgba,
    pub default_foreground: Rgba,
    pub default_background: Rgba,
}

impl Default for EngineColors {
    fn default() -> Self {
        Self {
            neutral_background: Rgba::rgb(128, 128, 128),
            light_page_background: Rgba::WHITE,
            dark_page_background: Rgba::BLACK,
            default_foreground: Rgba::BLACK,
            default_background: Rgba::WHITE,
        }
    }
}

impl EngineColors {
    pub fn page_background(&self, dark: bool) -> Rgba {
        if dark {
            self.dark_page_background
        } else {
            self.light_page_background
        }
    }
}

impl EngineConfig {
    /// Checks that every color field parses natively.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidColor`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.colors().map(|_| ())
    }

    /// Page background for the given mode.
    pub fn page_background(&self, dark: bool) -> &str {
        if dark {
            &self.dark_page_background
        } else {
            &self.light_page_background
        }
    }

    pub(crate) fn colors(&self) -> Result<EngineColors, ConfigError> {
        let parse = |field: &'static str, value: &str| {
            to_rgba(value).map_err(|_| ConfigError::InvalidColor {
                field,
                value: value.to_string(),
            })
        };
        to_rgba(&self.placeholder).map_err(|_| ConfigError::InvalidColor {
            field: "placeholder",
            value: self.placeholder.clone(),
        })?;
        Ok(EngineColors {
            neutral_background: parse("neutral_background", &self.neutral_background)?.opaque(),
            light_page_background: parse("light_page_background", &self.light_page_background)?
                .opaque(),
            dark_page_background: parse("dark_page_background", &self.dark_page_background)?
                .opaque(),
            default_foreground: parse("default_foreground", &self.default_foreground)?,
            default_background: parse("default_background", &self.default_background)?,
        })
    }

    /// Load from TOML text.
    ///
    /// # Errors
    /// Returns `ConfigError::TomlDe` on syntax errors and
    /// `ConfigError::InvalidColor` for unparseable colors.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from JSON text.
    ///
    /// # Errors
    /// Returns `ConfigError::Json` on syntax errors and
    /// `ConfigError::InvalidColor` for unparseable colors.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from YAML text.
    ///
    /// # Errors
    /// Returns `ConfigError::Yaml` on syntax errors and
    /// `ConfigError::InvalidColor` for unparseable colors.
    #[cfg(feature = "yaml")]
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, choosing the format by extension.
    ///
    /// # Errors
    /// Returns `ConfigError` if reading, parsing or validation fails.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config = match ext.as_deref() {
            Some("toml") => Self::from_toml(&fs::read_to_string(path)?),
            Some("json") => Self::from_json(&fs::read_to_string(path)?),
            #[cfg(feature = "yaml")]
            Some("yaml" | "yml") => Self::from_yaml(&fs::read_to_string(path)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("unknown".to_string())),
        }?;
        info!(config.path = %path.display(), "Loaded engine configuration");
        Ok(config)
    }

    /// Serialize to TOML.
    ///
    /// # Errors
    /// Returns `ConfigError::TomlSer` if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to a TOML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if serialization or writing fails.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        fs::write(path, self.to_toml()?)?;
        debug!(config.path = %path.display(), "Saved engine configuration");
        Ok(())
    }
}
