//! Foreground selection by WCAG contrast.
//!
//! [`ContrastSelector::best`] returns the candidate with the strictly highest
//! contrast ratio against a background; on exact ties the earlier candidate
//! wins, so callers list their preferred color first.

use serde::Serialize;
use tracing::{trace, warn};

use crate::color::{ColorHost, Rgba, composite_over, contrast_ratio, to_rgba_with};
use crate::named::NamedColors;
use crate::palette::NormalizedPalette;
use crate::roles::{Role, RoleMap};

/// WCAG AA minimum for body text.
pub const AA_NORMAL_TEXT: f64 = 4.5;

/// Picks foregrounds against backgrounds given as color strings.
#[derive(Debug, Clone, Copy)]
pub struct ContrastSelector<'a> {
    host: &'a dyn ColorHost,
    underlying: Rgba,
    default_foreground: Rgba,
    default_background: Rgba,
}

impl<'a> ContrastSelector<'a> {
    /// A selector over a white page with black and white defaults.
    pub fn new(host: &'a dyn ColorHost) -> Self {
        Self {
            host,
            underlying: Rgba::WHITE,
            default_foreground: Rgba::BLACK,
            default_background: Rgba::WHITE,
        }
    }

    /// Sets the page background translucent backgrounds sit on.
    pub fn with_underlying(mut self, underlying: Rgba) -> Self {
        self.underlying = underlying.opaque();
        self
    }

    /// Sets the substitutes for unparseable foregrounds and backgrounds.
    pub fn with_defaults(mut self, foreground: Rgba, background: Rgba) -> Self {
        self.default_foreground = foreground;
        self.default_background = background;
        self
    }

    /// The opaque color a background string renders as.
    ///
    /// Transparent and translucent backgrounds are composited over the page
    /// background. Unparseable ones become the default background.
    pub fn background(&self, value: &str) -> Rgba {
        match to_rgba_with(value, self.host) {
            Ok(c) if c.is_opaque() => c,
            Ok(c) => composite_over(c, self.underlying),
            Err(err) => {
                trace!(contrast.background = %value, error = %err, "Using default background");
                composite_over(self.default_background, self.underlying)
            }
        }
    }

    /// The opaque color a foreground string renders as over `bg`.
    pub fn foreground(&self, value: &str, bg: Rgba) -> Rgba {
        let fg = to_rgba_with(value, self.host).unwrap_or_else(|err| {
            trace!(contrast.foreground = %value, error = %err, "Using default foreground");
            self.default_foreground
        });
        composite_over(fg, bg)
    }

    /// The contrast ratio of `fg` over `bg`, both as strings.
    pub fn ratio(&self, bg: &str, fg: &str) -> f64 {
        let bg = self.background(bg);
        contrast_ratio(bg, self.foreground(fg, bg))
    }

    /// The candidate with the highest contrast against `bg`.
    pub fn best<'c>(&self, bg: &str, candidates: &[&'c str]) -> Option<&'c str> {
        self.best_over(self.background(bg), candidates)
    }

    /// [`Self::best`] against an already opaque background.
    pub fn best_over<'c>(&self, bg: Rgba, candidates: &[&'c str]) -> Option<&'c str> {
        let mut best: Option<(&'c str, f64)> = None;
        for &candidate in candidates {
            let ratio = contrast_ratio(bg, self.foreground(candidate, bg));
            if best.is_none_or(|(_, r)| ratio > r) {
                best = Some((candidate, ratio));
            }
        }
        best.map(|(c, _)| c)
    }
}

/// The candidate with the highest contrast against `bg`, parsing keywords
/// with the CSS named colors.
///
/// ```rust
/// use rolecolor::contrast::best_foreground;
///
/// assert_eq!(best_foreground("#ffffff", &["#1b1b1b", "#eeeeee"]), Some("#1b1b1b"));
/// assert_eq!(best_foreground("navy", &["black", "white"]), Some("white"));
/// ```
pub fn best_foreground<'c>(bg: &str, candidates: &[&'c str]) -> Option<&'c str> {
    ContrastSelector::new(&NamedColors).best(bg, candidates)
}

/// Theme-level CTA colors, already resolved to strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CtaColors {
    pub background: Option<String>,
    pub hover_background: Option<String>,
}

/// Background/foreground pairs for the preview card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForegroundPairs {
    pub background: String,
    pub text: String,
    pub heading_text: String,
    pub cta_background: String,
    pub cta_text: String,
    pub cta_hover_background: String,
    pub cta_hover_text: String,
    pub list_item_background: String,
    pub list_item_text: String,
    pub error_text: String,
    pub notice_text: String,
    pub success_text: String,
}

impl ForegroundPairs {
    /// Computes every pair from the role map.
    ///
    /// Light mode uses the `*Light` variants as backgrounds, dark mode the
    /// `*Dark` variants. Text candidates are the two text roles, the one
    /// matching the mode first.
    pub fn compute(roles: &RoleMap, dark: bool, cta: &CtaColors, selector: &ContrastSelector<'_>) -> Self {
        let pick = |light: Role, dark_role: Role| if dark { dark_role } else { light };
        let (preferred, other) = if dark {
            (roles.get(Role::TextOnDark), roles.get(Role::TextOnLight))
        } else {
            (roles.get(Role::TextOnLight), roles.get(Role::TextOnDark))
        };
        let text_on = |bg: &str| -> String {
            selector
                .best(bg, &[preferred, other])
                .unwrap_or(preferred)
                .to_string()
        };

        let background = roles.get(pick(Role::BaseLight, Role::BaseDark)).to_string();
        let text = text_on(&background);
        let body_ratio = selector.ratio(&background, &text);
        if body_ratio < AA_NORMAL_TEXT {
            warn!(
                contrast.background = %background,
                contrast.text = %text,
                contrast.ratio = body_ratio,
                "Body text is below WCAG AA"
            );
        }

        let heading_candidates = if dark {
            [
                roles.get(Role::PrimaryLighter),
                roles.get(Role::PrimaryDarker),
                roles.get(Role::TextOnDark),
                roles.get(Role::TextOnLight),
            ]
        } else {
            [
                roles.get(Role::PrimaryDarker),
                roles.get(Role::PrimaryLighter),
                roles.get(Role::TextOnLight),
                roles.get(Role::TextOnDark),
            ]
        };
        let heading_text = selector
            .best(&background, &heading_candidates)
            .unwrap_or(&text)
            .to_string();

        let cta_background = cta
            .background
            .clone()
            .unwrap_or_else(|| roles.get(pick(Role::AccentLight, Role::AccentDark)).to_string());
        let cta_text = text_on(&cta_background);
        let cta_hover_background = cta.hover_background.clone().unwrap_or_else(|| {
            roles
                .get(pick(Role::AccentDarker, Role::AccentLighter))
                .to_string()
        });
        let cta_hover_text = text_on(&cta_hover_background);

        let list_item_background = roles.get(pick(Role::TertiaryLight, Role::TertiaryDark)).to_string();
        let list_item_text = text_on(&list_item_background);

        Self {
            error_text: text_on(roles.get(pick(Role::ErrorLight, Role::ErrorDark))),
            notice_text: text_on(roles.get(pick(Role::NoticeLight, Role::NoticeDark))),
            success_text: text_on(roles.get(pick(Role::SuccessLight, Role::SuccessDark))),
            background,
            text,
            heading_text,
            cta_background,
            cta_text,
            cta_hover_background,
            cta_hover_text,
            list_item_background,
            list_item_text,
        }
    }
}

/// The label color for one palette swatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwatchLabel {
    pub slug: String,
    pub label: String,
    /// What the swatch paints: the resolved color, else the raw value.
    pub background: String,
    pub text: String,
}

/// Label colors for every palette swatch on a card.
///
/// Swatches paint the resolved color with its alpha, so translucent colors
/// are composited over `card_background`. A swatch whose color cannot be
/// resolved is scored as if it showed `textOnLight`. `textOnDark` wins ties.
pub fn swatch_labels(
    palette: &NormalizedPalette,
    roles: &RoleMap,
    card_background: Rgba,
    selector: &ContrastSelector<'_>,
) -> Vec<SwatchLabel> {
    let on_light = roles.get(Role::TextOnLight);
    let on_dark = roles.get(Role::TextOnDark);
    let fallback = selector.background(on_light);

    palette
        .entries
        .iter()
        .map(|entry| {
            let bg = entry
                .resolved
                .map_or(fallback, |c| composite_over(c, card_background));
            let text = selector
                .best_over(bg, &[on_dark, on_light])
                .unwrap_or(on_dark)
                .to_string();
            SwatchLabel {
                slug: entry.slug.clone(),
                label: entry.label().to_string(),
                background: entry.color.clone().unwrap_or_else(|| entry.raw.clone()),
                text,
            }
        })
        .collect()
}
