//! The resolution pipeline.
//!
//! ```text
//! ThemeDocument ──► CssVariableTable + presets ──► NormalizedPalette
//!                                                        │
//!      ResolvedPalette ◄── ForegroundPairs ◄── RoleMap ◄─┘
//! ```
//!
//! Every call builds a fresh [`ResolutionContext`]; nothing is cached between
//! calls, so a [`Resolver`] can be shared freely across threads.
//!
//! # Example
//!
//! ```rust
//! use rolecolor::{Resolver, ThemeDocument};
//!
//! let doc = ThemeDocument::from_json(r##"{
//!     "settings": { "color": { "palette": [
//!         { "slug": "base", "color": "#ffffff" },
//!         { "slug": "contrast", "color": "#1b1b1b" }
//!     ] } }
//! }"##).unwrap();
//!
//! let palette = Resolver::new().resolve(&doc, false);
//! assert_eq!(palette.roles.get(rolecolor::Role::BaseLight), "#ffffff");
//! assert_eq!(palette.pairs.text, "#1b1b1b");
//! assert_eq!(palette.placeholder_count, 0);
//! ```

use serde::Serialize;
use tracing::{debug, info_span};

use crate::color::{ColorHost, Rgba};
use crate::config::{EngineColors, EngineConfig};
use crate::contrast::{ContrastSelector, CtaColors, ForegroundPairs, SwatchLabel, swatch_labels};
use crate::css::{CssVariableTable, scope_css};
use crate::document::{PresetList, RawPaletteEntry, ThemeDocument, Variation};
use crate::error::ConfigError;
use crate::named::NamedColors;
use crate::palette::{NormalizedPalette, normalize, normalize_slug};
use crate::resolve::{ResolvedColor, SymbolResolver};
use crate::roles::{Role, RoleMap, assign_roles};
use crate::typography::{FontSample, font_samples};

/// Class prefix of a preview card's CSS scope.
pub const CARD_SCOPE_PREFIX: &str = "rolecolor-card--";

/// Per-call state of one resolution.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub vars: CssVariableTable,
    pub palette: NormalizedPalette,
    pub dark: bool,
    /// Background translucent palette colors are composited over.
    pub neutral_background: Rgba,
    /// The page behind everything; `color-mix(.., transparent)` and
    /// transparent CTA backgrounds land on it.
    pub page_background: Rgba,
    /// Slug to color pairs for preset lookups: the document palette, then the
    /// base palette.
    presets: Vec<(String, String)>,
}

/// The resolved role map with its paired foregrounds and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPalette {
    #[serde(flatten)]
    pub roles: RoleMap,
    #[serde(flatten)]
    pub pairs: ForegroundPairs,
    /// Usable palette colors.
    pub palette_color_count: usize,
    /// Roles filled with the placeholder.
    pub placeholder_count: usize,
    pub malformed_entry_count: usize,
    pub unresolved_entry_count: usize,
}

impl ResolvedPalette {
    pub fn role(&self, role: Role) -> &str {
        self.roles.get(role)
    }
}

/// Everything a preview card for one variation needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPreview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub title: String,
    pub dark: bool,
    pub scope_class: String,
    pub colors: ResolvedPalette,
    pub swatches: Vec<SwatchLabel>,
    pub fonts: Vec<FontSample>,
    /// The variation's CSS rewritten to the card scope.
    pub scoped_css: String,
}

/// Resolves theme documents into role maps.
#[derive(Debug)]
pub struct Resolver {
    config: EngineConfig,
    colors: EngineColors,
    host: Box<dyn ColorHost>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// A resolver with the default configuration and the CSS named colors.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            colors: EngineColors::default(),
            host: Box::new(NamedColors),
        }
    }

    /// A resolver with a custom configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidColor`] if a configured color does not
    /// parse.
    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        let colors = config.colors()?;
        Ok(Self {
            config,
            colors,
            host: Box::new(NamedColors),
        })
    }

    /// Replaces the host color facility.
    pub fn with_host(mut self, host: impl ColorHost + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn symbols<'a>(&'a self, vars: &'a CssVariableTable, presets: &[(String, String)]) -> SymbolResolver<'a> {
        SymbolResolver::new(vars, self.host.as_ref())
            .with_palette(presets.iter().cloned())
            .with_max_depth(self.config.max_var_depth)
            .with_placeholder(self.config.placeholder.clone())
    }

    fn selector(&self, dark: bool) -> ContrastSelector<'_> {
        ContrastSelector::new(self.host.as_ref())
            .with_underlying(self.colors.page_background(dark))
            .with_defaults(self.colors.default_foreground, self.colors.default_background)
    }

    /// Parses the CSS block and normalizes the palette of `doc`.
    ///
    /// `base_palette` supplies preset colors the document's own palette does
    /// not define; its colors never join the usable pool.
    pub fn context(
        &self,
        doc: &ThemeDocument,
        base_palette: Option<&PresetList<RawPaletteEntry>>,
        dark: bool,
    ) -> ResolutionContext {
        let vars = CssVariableTable::parse(doc.css().unwrap_or_default());
        let presets: Vec<(String, String)> = doc
            .palette()
            .into_iter()
            .chain(base_palette)
            .flat_map(PresetList::entries)
            .filter_map(|e| Some((e.slug.clone()?, e.color.clone()?)))
            .collect();
        let page_background = self.colors.page_background(dark);

        let palette = {
            let symbols = self.symbols(&vars, &presets);
            normalize(
                doc.palette(),
                &symbols,
                self.colors.neutral_background,
                page_background,
            )
        };
        debug!(
            palette.usable = palette.usable_count(),
            palette.unresolved = palette.unresolved_count(),
            palette.malformed = palette.malformed,
            css.vars = vars.len(),
            "Built resolution context"
        );

        ResolutionContext {
            vars,
            palette,
            dark,
            neutral_background: self.colors.neutral_background,
            page_background,
            presets,
        }
    }

    /// Resolves a document's role map for the given mode.
    pub fn resolve(&self, doc: &ThemeDocument, dark: bool) -> ResolvedPalette {
        let _span = info_span!("resolve", dark).entered();
        let ctx = self.context(doc, None, dark);
        self.resolve_in(&ctx, doc)
    }

    /// Resolves a variation, letting presets fall back to its base palette.
    pub fn resolve_variation(&self, variation: &Variation, dark: bool) -> ResolvedPalette {
        let _span = info_span!("resolve", variation = %variation.label(), dark).entered();
        let ctx = self.context(&variation.config, variation.base_palette.as_ref(), dark);
        self.resolve_in(&ctx, &variation.config)
    }

    /// Runs role assignment and contrast selection over a prepared context.
    pub fn resolve_in(&self, ctx: &ResolutionContext, doc: &ThemeDocument) -> ResolvedPalette {
        let symbols = self.symbols(&ctx.vars, &ctx.presets);
        let resolve_button = |value: Option<&String>, what: &str| -> Option<ResolvedColor> {
            let value = value?;
            match symbols.resolve(value, ctx.page_background) {
                Ok(resolved) => Some(resolved),
                Err(err) => {
                    debug!(button.value = %value, button.state = what, error = %err, "Ignoring button color");
                    None
                }
            }
        };
        let button = resolve_button(
            doc.button_colors().and_then(|c| c.background.as_ref()),
            "default",
        );
        let hover = resolve_button(
            doc.button_hover_colors().and_then(|c| c.background.as_ref()),
            "hover",
        );

        let assignment = assign_roles(&ctx.palette, button.as_ref(), &self.config.placeholder);
        let cta = CtaColors {
            background: button.map(|b| b.value),
            hover_background: hover.map(|h| h.value),
        };
        let pairs = ForegroundPairs::compute(&assignment.roles, ctx.dark, &cta, &self.selector(ctx.dark));

        ResolvedPalette {
            placeholder_count: assignment.placeholder_count(),
            roles: assignment.roles,
            pairs,
            palette_color_count: ctx.palette.usable_count(),
            malformed_entry_count: ctx.palette.malformed,
            unresolved_entry_count: ctx.palette.unresolved_count(),
        }
    }

    /// Builds the full card preview of a variation.
    pub fn preview(&self, variation: &Variation, dark: bool) -> CardPreview {
        let doc = &variation.config;
        let ctx = self.context(doc, variation.base_palette.as_ref(), dark);
        let colors = self.resolve_in(&ctx, doc);

        let selector = self.selector(dark);
        let card_background = selector.background(&colors.pairs.background);
        let swatches = swatch_labels(&ctx.palette, &colors.roles, card_background, &selector);

        let scope_class = format!(
            "{CARD_SCOPE_PREFIX}{}",
            normalize_slug(variation.slug.as_deref().unwrap_or(variation.label()))
        );
        CardPreview {
            slug: variation.slug.clone(),
            title: variation.label().to_string(),
            dark,
            scoped_css: scope_css(doc.css().unwrap_or_default(), &scope_class),
            scope_class,
            colors,
            swatches,
            fonts: font_samples(doc),
        }
    }
}

/// Resolves `doc` with the default resolver.
pub fn resolve(doc: &ThemeDocument, dark: bool) -> ResolvedPalette {
    Resolver::new().resolve(doc, dark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::VariationList;

    fn doc(json: &str) -> ThemeDocument {
        ThemeDocument::from_json(json).unwrap()
    }

    #[test]
    fn test_end_to_end_base_and_contrast() {
        let d = doc(r##"{"settings":{"color":{"palette":[
            {"slug":"base","color":"#ffffff"},
            {"slug":"contrast","color":"#1b1b1b"}
        ]}}}"##);
        let out = resolve(&d, false);
        assert_eq!(out.role(Role::BaseLight), "#ffffff");
        assert_eq!(out.role(Role::TextOnLight), "#1b1b1b");
        assert_eq!(out.pairs.background, "#ffffff");
        assert_eq!(out.pairs.text, "#1b1b1b");
        assert_eq!(out.palette_color_count, 2);
        assert_eq!(out.placeholder_count, 0);

        let dark = resolve(&d, true);
        assert_eq!(dark.pairs.background, "#1b1b1b");
        assert_eq!(dark.pairs.text, "#ffffff");
    }

    #[test]
    fn test_empty_document() {
        let out = resolve(&ThemeDocument::default(), false);
        assert_eq!(out.placeholder_count, Role::COUNT);
        assert_eq!(out.palette_color_count, 0);
        assert_eq!(out.pairs.background, "#cccccc");
    }

    #[test]
    fn test_css_variables_feed_the_palette() {
        let d = doc(r##"{
            "settings":{"color":{"palette":[
                {"slug":"base","color":"var(--surface)"},
                {"slug":"accent","color":"color-mix(in srgb, var(--wp--preset--color--ink) 50%, transparent)"},
                {"slug":"ink","color":"#000000"}
            ]}},
            "styles":{"css":":root{--surface:#fafafa;--surface:var(--surface);}"}
        }"##);
        let out = resolve(&d, false);
        assert_eq!(out.role(Role::BaseLight), "#fafafa");
        // Black at 50% over the white page.
        assert_eq!(out.role(Role::AccentLight), "rgb(128,128,128)");
        assert_eq!(out.unresolved_entry_count, 0);
    }

    #[test]
    fn test_button_background_drives_cta() {
        let d = doc(r##"{
            "settings":{"color":{"palette":[
                {"slug":"base","color":"#ffffff"},
                {"slug":"contrast","color":"#111111"},
                {"slug":"text-on-dark","color":"#ffffff"},
                {"slug":"brand","color":"#0044cc"}
            ]}},
            "styles":{"elements":{"button":{
                "color":{"background":"var:preset|color|brand"},
                ":hover":{"color":{"background":"transparent"}}
            }}}
        }"##);
        let out = resolve(&d, false);
        assert_eq!(out.pairs.cta_background, "#0044cc");
        assert_eq!(out.role(Role::AccentLight), "#0044cc");
        assert_eq!(out.pairs.cta_text, "#ffffff");
        assert_eq!(out.pairs.cta_hover_background, "transparent");
        assert_eq!(out.pairs.cta_hover_text, "#111111");
    }

    #[test]
    fn test_variation_base_palette_fallback() {
        let list: VariationList = serde_json::from_str(r##"{"variations":[{
            "slug":"Ocean Blue",
            "config":{
                "settings":{"color":{"palette":[{"slug":"accent","color":"var:preset|color|sea"}]}},
                "styles":{"css":":root{--x:#fff}"}
            },
            "basePalette":[{"slug":"sea","color":"#006699"},{"slug":"sand","color":"#eeddcc"}]
        }]}"##)
        .unwrap();
        let variation = &list.variations[0];
        let resolver = Resolver::new();
        let out = resolver.resolve_variation(variation, false);
        assert_eq!(out.role(Role::AccentLight), "#006699");
        // Base palette colors stay out of the pool.
        assert_eq!(out.palette_color_count, 1);

        let preview = resolver.preview(variation, false);
        assert_eq!(preview.scope_class, "rolecolor-card--ocean-blue");
        assert_eq!(preview.scoped_css, ".rolecolor-card--ocean-blue{--x:#fff}");
        assert_eq!(preview.swatches.len(), 1);
    }

    #[test]
    fn test_custom_config() {
        let config = EngineConfig {
            placeholder: "#ff00ff".into(),
            ..EngineConfig::default()
        };
        let resolver = Resolver::with_config(config).unwrap();
        let out = resolver.resolve(&ThemeDocument::default(), false);
        assert_eq!(out.role(Role::AccentDark), "#ff00ff");
    }

    #[test]
    fn test_output_is_flat_camel_case() {
        let out = resolve(&ThemeDocument::default(), true);
        let json = serde_json::to_value(&out).unwrap();
        let obj = json.as_object().unwrap();
        for role in Role::ALL {
            assert!(obj.contains_key(role.as_str()), "{role}");
        }
        for key in [
            "background",
            "text",
            "headingText",
            "ctaBackground",
            "ctaHoverText",
            "listItemText",
            "successText",
            "paletteColorCount",
            "placeholderCount",
            "malformedEntryCount",
            "unresolvedEntryCount",
        ] {
            assert!(obj.contains_key(key), "{key}");
        }
    }
}
