//! Font samples for the preview card.

use serde::Serialize;
use tracing::trace;

use crate::css::{parse_preset_token, parse_var, preset_slug};
use crate::document::{FontFamilyEntry, ThemeDocument};

/// How many declared font families a card shows.
pub const MAX_FONT_SAMPLES: usize = 2;

/// One font line on a preview card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSample {
    pub label: String,
    /// A CSS `font-family` value.
    pub family: String,
    /// Whether this is the body font from `styles.typography.fontFamily`.
    pub body: bool,
}

/// Collects the font samples of a document.
///
/// The first [`MAX_FONT_SAMPLES`] declared families with a `fontFamily` are
/// listed, labelled by name, else slug, else `Font`. The body font follows,
/// with preset references resolved against the declared families.
pub fn font_samples(doc: &ThemeDocument) -> Vec<FontSample> {
    let families: Vec<&FontFamilyEntry> = doc
        .font_families()
        .map(|list| list.entries().collect())
        .unwrap_or_default();

    let mut samples: Vec<FontSample> = families
        .iter()
        .filter_map(|entry| {
            let family = entry.font_family.as_deref()?.trim();
            (!family.is_empty()).then(|| FontSample {
                label: entry
                    .name
                    .as_deref()
                    .or(entry.slug.as_deref())
                    .unwrap_or("Font")
                    .to_string(),
                family: family.to_string(),
                body: false,
            })
        })
        .take(MAX_FONT_SAMPLES)
        .collect();

    if let Some(body) = doc.body_font_family() {
        match resolve_font_family(body, &families) {
            Some(family) => samples.push(FontSample {
                label: "Body".to_string(),
                family,
                body: true,
            }),
            None => trace!(font.value = %body, "Body font family unresolved"),
        }
    }
    samples
}

/// Resolves a `font-family` value, following preset references.
///
/// Returns `None` for references to undeclared presets.
pub fn resolve_font_family(value: &str, families: &[&FontFamilyEntry]) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let slug = if let Some(token) = parse_preset_token(value) {
        if token.kind != "font-family" {
            return None;
        }
        token.slug
    } else if let Some(reference) = parse_var(value) {
        match preset_slug(reference.name, "font-family") {
            Some(slug) => slug.to_string(),
            None => return reference.fallback.map(str::to_string),
        }
    } else {
        return Some(value.to_string());
    };

    families
        .iter()
        .find(|f| f.slug.as_deref() == Some(slug.as_str()))
        .and_then(|f| f.font_family.clone())
}
