//! Theme configuration documents.
//!
//! A [`ThemeDocument`] is the subset of a `theme.json` / style variation file
//! that color resolution reads. It is deserialized once at the input boundary
//! into optional-field structs; nothing downstream re-checks its shape.
//!
//! Palettes and font family lists occur in two shapes:
//!
//! ```json
//! { "palette": [ { "slug": "base", "color": "#fff" } ] }
//! { "palette": { "theme": [ ... ], "custom": [ ... ] } }
//! ```
//!
//! Both are accepted. Individual entries that are not objects, or whose fields
//! have the wrong type, are kept as [`Slot::Malformed`] instead of failing the
//! whole document.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// The parts of a theme configuration that color resolution consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<Styles>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typography: Option<TypographySettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<PresetList<RawPaletteEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypographySettings {
    #[serde(rename = "fontFamilies", skip_serializing_if = "Option::is_none")]
    pub font_families: Option<PresetList<FontFamilyEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Styles {
    /// Raw CSS, usually custom property assignments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typography: Option<StyleTypography>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Elements>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTypography {
    #[serde(rename = "fontFamily", skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Elements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<ButtonStyle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorPair>,
    #[serde(rename = ":hover", skip_serializing_if = "Option::is_none")]
    pub hover: Option<ButtonState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorPair>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPair {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A palette entry as written in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPaletteEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RawPaletteEntry {
    pub fn new(slug: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            color: Some(color.into()),
            name: None,
        }
    }
}

/// A font family preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontFamilyEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(
        rename = "fontFamily",
        alias = "font-family",
        skip_serializing_if = "Option::is_none"
    )]
    pub font_family: Option<String>,
}

/// One position in a preset list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot<T> {
    Entry(T),
    Malformed(serde_json::Value),
}

/// The list stored under one origin of an origin-wrapped preset list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OriginSlots<T> {
    List(Vec<Slot<T>>),
    Malformed(serde_json::Value),
}

/// A preset list in either of its two document shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PresetList<T> {
    Flat(Vec<Slot<T>>),
    ByOrigin(BTreeMap<String, OriginSlots<T>>),
    Malformed(serde_json::Value),
}

/// Origins read first, in this order. `default` (core presets) always last.
const LEADING_ORIGINS: [&str; 2] = ["theme", "custom"];
const TRAILING_ORIGIN: &str = "default";

impl<T> PresetList<T> {
    /// All slots in resolution order.
    ///
    /// Origin-wrapped lists are flattened as `theme`, `custom`, any other
    /// origin alphabetically, then `default`.
    pub fn slots(&self) -> Vec<&Slot<T>> {
        match self {
            PresetList::Flat(list) => list.iter().collect(),
            PresetList::ByOrigin(origins) => {
                let mut names: Vec<&str> = LEADING_ORIGINS
                    .iter()
                    .copied()
                    .filter(|o| origins.contains_key(*o))
                    .collect();
                names.extend(
                    origins
                        .keys()
                        .map(String::as_str)
                        .filter(|o| !LEADING_ORIGINS.contains(o) && *o != TRAILING_ORIGIN),
                );
                if origins.contains_key(TRAILING_ORIGIN) {
                    names.push(TRAILING_ORIGIN);
                }
                names
                    .into_iter()
                    .filter_map(|name| match origins.get(name) {
                        Some(OriginSlots::List(list)) => Some(list.iter()),
                        _ => None,
                    })
                    .flatten()
                    .collect()
            }
            PresetList::Malformed(_) => Vec::new(),
        }
    }

    /// Well-formed entries in resolution order.
    pub fn entries(&self) -> impl Iterator<Item = &T> {
        self.slots().into_iter().filter_map(|slot| match slot {
            Slot::Entry(entry) => Some(entry),
            Slot::Malformed(_) => None,
        })
    }

    pub fn is_origin_wrapped(&self) -> bool {
        matches!(self, PresetList::ByOrigin(_))
    }
}

impl<T> From<Vec<T>> for PresetList<T> {
    fn from(entries: Vec<T>) -> Self {
        PresetList::Flat(entries.into_iter().map(Slot::Entry).collect())
    }
}

impl ThemeDocument {
    /// Builds a document holding only a flat palette.
    pub fn with_palette(entries: Vec<RawPaletteEntry>) -> Self {
        Self {
            settings: Some(Settings {
                color: Some(ColorSettings {
                    palette: Some(entries.into()),
                }),
                typography: None,
            }),
            ..Self::default()
        }
    }

    /// Sets the raw CSS block.
    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.styles.get_or_insert_with(Styles::default).css = Some(css.into());
        self
    }

    pub fn palette(&self) -> Option<&PresetList<RawPaletteEntry>> {
        self.settings.as_ref()?.color.as_ref()?.palette.as_ref()
    }

    pub fn font_families(&self) -> Option<&PresetList<FontFamilyEntry>> {
        self.settings.as_ref()?.typography.as_ref()?.font_families.as_ref()
    }

    pub fn css(&self) -> Option<&str> {
        self.styles.as_ref()?.css.as_deref()
    }

    pub fn body_font_family(&self) -> Option<&str> {
        self.styles.as_ref()?.typography.as_ref()?.font_family.as_deref()
    }

    fn button(&self) -> Option<&ButtonStyle> {
        self.styles.as_ref()?.elements.as_ref()?.button.as_ref()
    }

    pub fn button_colors(&self) -> Option<&ColorPair> {
        self.button()?.color.as_ref()
    }

    pub fn button_hover_colors(&self) -> Option<&ColorPair> {
        self.button()?.hover.as_ref()?.color.as_ref()
    }

    /// Load a document from JSON text.
    ///
    /// # Errors
    /// Returns `DocumentError::Json` if the text is not a JSON document of
    /// the expected shape.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert an already-parsed JSON value.
    ///
    /// # Errors
    /// Returns `DocumentError::Json` if the value has the wrong shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Load a document from TOML text.
    ///
    /// # Errors
    /// Returns `DocumentError::Toml` if parsing fails.
    pub fn from_toml(text: &str) -> Result<Self, DocumentError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a document from YAML text.
    ///
    /// # Errors
    /// Returns `DocumentError::Yaml` if parsing fails.
    #[cfg(feature = "yaml")]
    pub fn from_yaml(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a document from a file, choosing the format by extension.
    ///
    /// # Errors
    /// Returns `DocumentError` if reading or parsing fails, or the extension
    /// is not supported.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        match extension(path).as_deref() {
            Some("json") => Self::from_json(&fs::read_to_string(path)?),
            Some("toml") => Self::from_toml(&fs::read_to_string(path)?),
            Some("yaml" | "yml") => {
                #[cfg(feature = "yaml")]
                {
                    Self::from_yaml(&fs::read_to_string(path)?)
                }
                #[cfg(not(feature = "yaml"))]
                {
                    Err(DocumentError::UnsupportedFormat("yaml".into()))
                }
            }
            Some(ext) => Err(DocumentError::UnsupportedFormat(ext.into())),
            None => Err(DocumentError::UnsupportedFormat("unknown".into())),
        }
    }
}

/// A style variation as listed for the preview grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Variation {
    /// Where the variation came from (`theme`, `export`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub config: ThemeDocument,
    /// The parent theme's palette. Preset references that the variation's own
    /// palette does not define fall back to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_palette: Option<PresetList<RawPaletteEntry>>,
}

impl Variation {
    /// Display label: the title, else the slug, else the document title.
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .or(self.slug.as_deref())
            .or(self.config.title.as_deref())
            .unwrap_or("variation")
    }
}

/// The payload listing every available variation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariationList {
    pub variations: Vec<Variation>,
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}
