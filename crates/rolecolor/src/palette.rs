//! Palette normalization.
//!
//! Turns the raw palette of a document into entries whose colors are concrete
//! and opaque. Translucent colors are composited over a neutral background so
//! role assignment and contrast math never see alpha. Entries whose color
//! cannot be resolved keep their slug but leave the usable pool.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::color::{Rgba, composite_over};
use crate::document::{PresetList, RawPaletteEntry, Slot};
use crate::error::ColorError;
use crate::resolve::SymbolResolver;

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_-]+").expect("valid slug regex"));

/// Lowercases a slug and replaces runs of characters outside `[a-z0-9_-]`
/// with `-`, trimming leading and trailing dashes.
///
/// ```rust
/// use rolecolor::palette::normalize_slug;
///
/// assert_eq!(normalize_slug("Primary Light"), "primary-light");
/// assert_eq!(normalize_slug("  --Accent #2 "), "accent-2");
/// ```
pub fn normalize_slug(slug: &str) -> String {
    let lower = slug.trim().to_lowercase();
    NON_SLUG.replace_all(&lower, "-").trim_matches('-').to_string()
}

/// A palette entry after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEntry {
    /// Position among the well-formed entries.
    pub index: usize,
    pub slug: String,
    pub normalized_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The color as written in the document.
    pub raw: String,
    /// Concrete opaque color, `None` when the entry could not be resolved.
    pub color: Option<String>,
    #[serde(skip)]
    pub rgba: Option<Rgba>,
    /// The resolved color before compositing, alpha included.
    #[serde(skip)]
    pub resolved: Option<Rgba>,
}

impl NormalizedEntry {
    pub fn is_usable(&self) -> bool {
        self.color.is_some()
    }

    /// The display label: the name, else the slug.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.slug)
    }
}

/// The outcome of normalizing one palette.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPalette {
    /// Every well-formed entry in palette order, usable or not.
    pub entries: Vec<NormalizedEntry>,
    /// Entries dropped for lacking a slug or a color.
    pub malformed: usize,
}

/// A usable entry: concrete opaque color plus its channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsableColor<'a> {
    pub entry: &'a NormalizedEntry,
    pub color: &'a str,
    pub rgba: Rgba,
}

impl NormalizedPalette {
    /// Usable entries in palette order.
    pub fn usable(&self) -> impl Iterator<Item = UsableColor<'_>> {
        self.entries.iter().filter_map(|entry| {
            Some(UsableColor {
                entry,
                color: entry.color.as_deref()?,
                rgba: entry.rgba?,
            })
        })
    }

    pub fn usable_count(&self) -> usize {
        self.usable().count()
    }

    /// Well-formed entries whose color could not be resolved.
    pub fn unresolved_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_usable()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.usable_count() == 0
    }

    pub fn get(&self, slug: &str) -> Option<&NormalizedEntry> {
        let slug = normalize_slug(slug);
        self.entries.iter().find(|e| e.normalized_slug == slug)
    }
}

/// Normalizes a raw palette.
///
/// `neutral` is the background translucent colors are composited over and
/// `underlying` the page background for `color-mix(.., transparent)`.
pub fn normalize(
    palette: Option<&PresetList<RawPaletteEntry>>,
    symbols: &SymbolResolver<'_>,
    neutral: Rgba,
    underlying: Rgba,
) -> NormalizedPalette {
    let mut out = NormalizedPalette::default();
    let Some(palette) = palette else {
        return out;
    };

    for (position, slot) in palette.slots().into_iter().enumerate() {
        let Some((slug, raw, name)) = well_formed(slot) else {
            debug!(
                error = %ColorError::MalformedPaletteEntry { index: position },
                "Skipping palette entry"
            );
            out.malformed += 1;
            continue;
        };

        let (color, rgba, resolved) = match symbols.resolve(raw, underlying) {
            Ok(resolved) if resolved.rgba.is_opaque() => (
                Some(resolved.value),
                Some(resolved.rgba),
                Some(resolved.rgba),
            ),
            Ok(resolved) => {
                let flat = composite_over(resolved.rgba, neutral);
                trace!(palette.slug = %slug, palette.alpha = resolved.rgba.a, "Composited translucent palette color");
                (Some(flat.to_rgb_string()), Some(flat), Some(resolved.rgba))
            }
            Err(err) => {
                debug!(palette.slug = %slug, palette.color = %raw, error = %err, "Palette color unresolved");
                (None, None, None)
            }
        };

        out.entries.push(NormalizedEntry {
            index: out.entries.len(),
            normalized_slug: normalize_slug(slug),
            slug: slug.to_string(),
            name: name.map(str::to_string),
            raw: raw.trim().to_string(),
            color,
            rgba,
            resolved,
        });
    }
    out
}

fn well_formed(slot: &Slot<RawPaletteEntry>) -> Option<(&str, &str, Option<&str>)> {
    let Slot::Entry(entry) = slot else {
        return None;
    };
    let slug = entry.slug.as_deref().filter(|s| !s.trim().is_empty())?;
    let color = entry.color.as_deref().filter(|c| !c.trim().is_empty())?;
    Some((slug, color, entry.name.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::CssVariableTable;
    use crate::document::ThemeDocument;
    use crate::named::NamedColors;

    const GRAY: Rgba = Rgba::rgb(128, 128, 128);

    fn run(json: &str, css: &str) -> NormalizedPalette {
        let doc = ThemeDocument::from_json(json).unwrap();
        let vars = CssVariableTable::parse(css);
        let raw: Vec<(String, String)> = doc
            .palette()
            .map(|p| {
                p.entries()
                    .filter_map(|e| Some((e.slug.clone()?, e.color.clone()?)))
                    .collect()
            })
            .unwrap_or_default();
        let symbols = SymbolResolver::new(&vars, &NamedColors).with_palette(raw);
        normalize(doc.palette(), &symbols, GRAY, Rgba::WHITE)
    }

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("Base"), "base");
        assert_eq!(normalize_slug("Primary Light"), "primary-light");
        assert_eq!(normalize_slug("accent_2"), "accent_2");
        assert_eq!(normalize_slug("!!!"), "");
    }

    #[test]
    fn test_opaque_literals_pass_through() {
        let p = run(
            r##"{"settings":{"color":{"palette":[
                {"slug":"base","color":" #FFFFFF "},
                {"slug":"ink","color":"rgb(27 27 27)"}
            ]}}}"##,
            "",
        );
        assert_eq!(p.entries[0].color.as_deref(), Some("#FFFFFF"));
        assert_eq!(p.entries[1].color.as_deref(), Some("rgb(27 27 27)"));
        assert_eq!(p.usable_count(), 2);
    }

    #[test]
    fn test_translucent_composited_over_gray() {
        let p = run(
            r##"{"settings":{"color":{"palette":[{"slug":"veil","color":"rgba(0,0,0,0.5)"}]}}}"##,
            "",
        );
        assert_eq!(p.entries[0].color.as_deref(), Some("rgb(64,64,64)"));
        assert_eq!(p.entries[0].rgba, Some(Rgba::rgb(64, 64, 64)));
        assert!((p.entries[0].resolved.unwrap().a - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_var_and_preset_colors_resolve() {
        let p = run(
            r##"{"settings":{"color":{"palette":[
                {"slug":"brand","color":"var(--brand)"},
                {"slug":"alias","color":"var:preset|color|brand"}
            ]}}}"##,
            "--brand: #336699;",
        );
        assert_eq!(p.entries[0].color.as_deref(), Some("#336699"));
        assert_eq!(p.entries[1].color.as_deref(), Some("#336699"));
    }

    #[test]
    fn test_unresolved_entries_keep_slug() {
        let p = run(
            r##"{"settings":{"color":{"palette":[
                {"slug":"ghost","color":"var(--nope)"},
                {"slug":"bad-mix","color":"color-mix(in hsl, red, blue)"},
                {"slug":"ok","color":"navy"}
            ]}}}"##,
            "",
        );
        assert_eq!(p.entries.len(), 3);
        assert_eq!(p.unresolved_count(), 2);
        assert_eq!(p.usable_count(), 1);
        assert_eq!(p.get("ghost").unwrap().raw, "var(--nope)");
    }

    #[test]
    fn test_malformed_entries_are_counted() {
        let p = run(
            r##"{"settings":{"color":{"palette":[
                {"slug":"ok","color":"#000"},
                "nope",
                {"slug":"","color":"#fff"},
                {"slug":"no-color"}
            ]}}}"##,
            "",
        );
        assert_eq!(p.malformed, 3);
        assert_eq!(p.entries.len(), 1);
        assert_eq!(p.entries[0].index, 0);
    }

    #[test]
    fn test_missing_palette() {
        let p = run("{}", "");
        assert!(p.is_empty());
        assert_eq!(p.malformed, 0);
    }
}
