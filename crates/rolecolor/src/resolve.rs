//! Symbolic color resolution.
//!
//! [`SymbolResolver`] turns `var()` references, preset tokens and
//! `color-mix()` expressions into concrete colors, using the custom properties
//! of a CSS block and the palette itself as lookup tables.
//!
//! Reference chains are bounded. After the first lookup at most
//! `max_depth` further `var()` hops are followed (one by default); a chain
//! that is still symbolic after that fails closed and is reported as an
//! unresolved reference.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::color::{ColorHost, Rgba, composite_over, mix, to_rgba_with};
use crate::css::{
    CssVariableTable, PRESET_COLOR_PREFIX, parse_preset_token, parse_var, preset_slug,
    split_top_level,
};
use crate::error::{ColorError, ColorResult};
use crate::palette::normalize_slug;

/// Nesting bound for `color-mix()` arguments that themselves hold references.
const NESTING_LIMIT: usize = 8;

/// A fully resolved color: the concrete string plus its channels.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColor {
    /// The concrete color string. The original text when it was already a
    /// literal color, otherwise the reference target or the computed result.
    pub value: String,
    pub rgba: Rgba,
}

/// Resolves symbolic color values for one resolution pass.
#[derive(Debug)]
pub struct SymbolResolver<'a> {
    vars: &'a CssVariableTable,
    palette: HashMap<String, String>,
    host: &'a dyn ColorHost,
    max_depth: usize,
    placeholder: String,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(vars: &'a CssVariableTable, host: &'a dyn ColorHost) -> Self {
        Self {
            vars,
            palette: HashMap::new(),
            host,
            max_depth: 1,
            placeholder: crate::PLACEHOLDER.to_string(),
        }
    }

    /// Registers palette colors for preset lookups by slug.
    ///
    /// Slugs are normalized the way palette slugs are, and the first entry
    /// for a slug wins.
    pub fn with_palette<I, S, C>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, C)>,
        S: Into<String>,
        C: Into<String>,
    {
        for (slug, color) in entries {
            let slug: String = slug.into();
            self.palette
                .entry(normalize_slug(&slug))
                .or_insert_with(|| color.into());
        }
        self
    }

    /// Sets how many extra `var()` hops are followed after the first lookup.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the sentinel returned by [`Self::resolve_color_mix`] on failure.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Resolves a custom property name (with or without `--`).
    ///
    /// Preset color names (`wp--preset--color--<slug>`) are looked up in the
    /// palette first, then in the CSS table. Returns `None` when nothing is
    /// found. The returned string may still be symbolic when the chain is
    /// longer than the hop bound.
    pub fn resolve_var(&self, name: &str) -> Option<String> {
        let bare = name.trim().trim_start_matches("--");
        let first = self.lookup(bare)?;
        Some(self.follow(first))
    }

    /// One raw lookup step, without following the result.
    fn lookup(&self, bare: &str) -> Option<String> {
        if let Some(slug) = preset_slug(bare, "color") {
            if let Some(color) = self.palette.get(&normalize_slug(slug)) {
                trace!(resolve.var = %bare, resolve.slug = %slug, "Preset color from palette");
                return Some(color.clone());
            }
        }
        let value = self.vars.get(bare).map(str::to_string);
        trace!(resolve.var = %bare, resolve.found = value.is_some(), "Custom property lookup");
        value
    }

    /// Follows at most `max_depth` further references from `value`.
    fn follow(&self, value: String) -> String {
        let mut current = value;
        for _ in 0..self.max_depth {
            let next = if let Some(reference) = parse_var(&current) {
                self.lookup(reference.name)
                    .or_else(|| reference.fallback.map(str::to_string))
            } else if let Some(token) = parse_preset_token(&current) {
                self.lookup(&token.css_variable())
            } else {
                break;
            };
            match next {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Resolves any supported color value to a concrete color.
    ///
    /// `underlying` is the page background that `color-mix(..., transparent)`
    /// composites onto.
    ///
    /// # Errors
    /// Returns [`ColorError::UnresolvedReference`] for dangling or over-long
    /// reference chains, and the errors of [`to_rgba_with`] for unparseable
    /// literals.
    pub fn resolve(&self, value: &str, underlying: Rgba) -> ColorResult<ResolvedColor> {
        self.resolve_nested(value, underlying, 0)
    }

    fn resolve_nested(&self, value: &str, underlying: Rgba, depth: usize) -> ColorResult<ResolvedColor> {
        let value = value.trim();
        if depth > NESTING_LIMIT {
            return Err(ColorError::UnresolvedReference(value.to_string()));
        }

        if let Some(token) = parse_preset_token(value) {
            if !token.is_color() {
                return Err(ColorError::UnresolvedReference(value.to_string()));
            }
            let target = self
                .resolve_var(&token.css_variable())
                .ok_or_else(|| ColorError::UnresolvedReference(value.to_string()))?;
            return self.resolve_target(value, &target, underlying, depth);
        }

        if let Some(reference) = parse_var(value) {
            let target = self
                .resolve_var(reference.name)
                .or_else(|| reference.fallback.map(str::to_string))
                .ok_or_else(|| ColorError::UnresolvedReference(value.to_string()))?;
            return self.resolve_target(value, &target, underlying, depth);
        }

        if is_color_mix(value) {
            let rgba = self.mix_rgba(value, underlying, depth)?;
            return Ok(ResolvedColor {
                value: rgba.to_string(),
                rgba,
            });
        }

        let rgba = to_rgba_with(value, self.host)?;
        Ok(ResolvedColor {
            value: value.to_string(),
            rgba,
        })
    }

    /// Resolves the target of a reference, refusing to chase it further.
    fn resolve_target(
        &self,
        original: &str,
        target: &str,
        underlying: Rgba,
        depth: usize,
    ) -> ColorResult<ResolvedColor> {
        if parse_var(target).is_some() || parse_preset_token(target).is_some() {
            debug!(resolve.value = %original, resolve.stuck_at = %target, "Reference chain exceeds hop bound");
            return Err(ColorError::UnresolvedReference(original.to_string()));
        }
        self.resolve_nested(target, underlying, depth + 1)
    }

    /// Evaluates `color-mix(in srgb, A P%, B)`.
    ///
    /// When `B` is `transparent` the result is `A` at `P%` opacity composited
    /// over `underlying`. Any failure yields the placeholder color.
    pub fn resolve_color_mix(&self, expr: &str, underlying: Rgba) -> String {
        match self.mix_rgba(expr, underlying, 0) {
            Ok(rgba) => rgba.to_string(),
            Err(err) => {
                debug!(resolve.expr = %expr, error = %err, "color-mix fell back to placeholder");
                self.placeholder.clone()
            }
        }
    }

    fn mix_rgba(&self, expr: &str, underlying: Rgba, depth: usize) -> ColorResult<Rgba> {
        let parse_err = || ColorError::Parse(expr.to_string());
        let expr = expr.trim();
        if !is_color_mix(expr) || !expr.ends_with(')') {
            return Err(parse_err());
        }
        let inner = &expr["color-mix(".len()..expr.len() - 1];
        let parts = split_top_level(inner, ',');
        let [space, first, second] = parts.as_slice() else {
            return Err(parse_err());
        };
        let space: Vec<String> = space
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();
        if space != ["in", "srgb"] {
            return Err(parse_err());
        }

        let (a_text, a_pct) = split_percentage(first);
        let (b_text, b_pct) = split_percentage(second);
        let weight = match (a_pct, b_pct) {
            (Some(a), Some(b)) if a + b > 0.0 => a / (a + b),
            (Some(a), _) => a / 100.0,
            (None, Some(b)) => 1.0 - b / 100.0,
            (None, None) => 0.5,
        }
        .clamp(0.0, 1.0);

        if b_text.eq_ignore_ascii_case("transparent") {
            let a = self.resolve_nested(a_text, underlying, depth + 1)?.rgba;
            let faded = Rgba::new(a.r, a.g, a.b, a.a * weight);
            return Ok(composite_over(faded, underlying));
        }
        if a_text.eq_ignore_ascii_case("transparent") {
            let b = self.resolve_nested(b_text, underlying, depth + 1)?.rgba;
            let faded = Rgba::new(b.r, b.g, b.b, b.a * (1.0 - weight));
            return Ok(composite_over(faded, underlying));
        }

        let a = self.resolve_nested(a_text, underlying, depth + 1)?.rgba;
        let b = self.resolve_nested(b_text, underlying, depth + 1)?.rgba;
        Ok(mix(a, b, weight))
    }
}

/// Returns true for values that look like a preset color custom property.
pub fn is_preset_color_var(name: &str) -> bool {
    name.trim().trim_start_matches("--").starts_with(PRESET_COLOR_PREFIX)
}

fn is_color_mix(value: &str) -> bool {
    value
        .get(.."color-mix(".len())
        .is_some_and(|head| head.eq_ignore_ascii_case("color-mix("))
}

/// Splits `"<color> <pct>%"` into the color text and the percentage.
fn split_percentage(part: &str) -> (&str, Option<f64>) {
    let part = part.trim();
    if let Some((color, tail)) = part.rsplit_once(char::is_whitespace) {
        if let Some(pct) = tail.strip_suffix('%').and_then(|p| p.parse::<f64>().ok()) {
            if pct.is_finite() {
                return (color.trim(), Some(pct.clamp(0.0, 100.0)));
            }
        }
    }
    (part, None)
}
