//! CSS custom properties, `var()` references and preset tokens.
//!
//! Theme documents carry a raw CSS block (`styles.css`) that assigns custom
//! properties, and color values that point at those properties or at palette
//! presets:
//!
//! ```text
//! --accent-soft: color-mix(in srgb, var(--wp--preset--color--accent) 20%, transparent);
//! color: var(--accent-soft);
//! background: var:preset|color|base;
//! ```
//!
//! This module only parses. Following references is the job of
//! [`crate::resolve::SymbolResolver`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"--([A-Za-z0-9_-]+)\s*:\s*([^;{}]+)").expect("valid declaration regex")
});

static SELF_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(--[A-Za-z0-9_-]+)\s*:\s*var\(\s*(--[A-Za-z0-9_-]+)\s*\)\s*;?")
        .expect("valid self-assignment regex")
});

static ROOT_AND_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":root\s*,\s*\.editor-styles-wrapper").expect("valid selector regex")
});

static ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":root([^\w-]|$)").expect("valid root regex"));

static WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.editor-styles-wrapper").expect("valid wrapper regex"));

/// Prefix of the custom property WordPress emits for a palette color.
pub const PRESET_COLOR_PREFIX: &str = "wp--preset--color--";

/// Custom property assignments extracted from a CSS block.
///
/// Keys are bare names (no leading `--`). Later declarations overwrite earlier
/// ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssVariableTable {
    vars: HashMap<String, String>,
}

impl CssVariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `css` for `--name: value;` declarations in document order.
    ///
    /// Self-assignments (`--x: var(--x);`) are dropped first. A value that is
    /// exactly `var(--other)` is replaced by the value of `other` when that is
    /// already known; otherwise it is kept for on-demand resolution.
    pub fn parse(css: &str) -> Self {
        let css = strip_self_references(css);
        let mut table = Self::new();
        for caps in DECLARATION.captures_iter(&css) {
            let name = caps[1].to_string();
            let value = caps[2].trim();
            if value.is_empty() {
                continue;
            }
            let value = match parse_var(value) {
                Some(reference) if reference.fallback.is_none() => table
                    .get(reference.name)
                    .map_or_else(|| value.to_string(), str::to_string),
                _ => value.to_string(),
            };
            trace!(css.var = %name, css.value = %value, "Custom property declared");
            table.vars.insert(name, value);
        }
        table
    }

    /// Looks up a variable by name, with or without the leading `--`.
    pub fn get(&self, name: &str) -> Option<&str> {
        let bare = name.trim().trim_start_matches("--");
        self.vars.get(bare).map(String::as_str)
    }

    /// Sets a variable, replacing any previous value.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let bare = name.as_ref().trim().trim_start_matches("--").to_string();
        self.vars.insert(bare, value.into());
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Removes `--x: var(--x);` declarations, an authoring artifact that would
/// otherwise read as a cycle.
pub fn strip_self_references(css: &str) -> Cow<'_, str> {
    SELF_ASSIGNMENT.replace_all(css, |caps: &Captures<'_>| {
        // Custom property names are case-sensitive.
        if caps[1] == caps[2] {
            String::new()
        } else {
            caps[0].to_string()
        }
    })
}

/// Rewrites global selectors in a variation's CSS to a card-specific class so
/// the variables only apply inside that card.
pub fn scope_css(css: &str, scope_class: &str) -> String {
    if css.trim().is_empty() {
        return String::new();
    }
    let scope = format!(".{scope_class}");
    let out = ROOT_AND_WRAPPER.replace_all(css, scope.as_str());
    let out = ROOT.replace_all(&out, |caps: &Captures<'_>| format!("{scope}{}", &caps[1]));
    let out = WRAPPER.replace_all(&out, scope.as_str());
    strip_self_references(&out).into_owned()
}

/// A parsed `var(--name, fallback)` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarReference<'a> {
    /// The variable name without the leading `--`.
    pub name: &'a str,
    pub fallback: Option<&'a str>,
}

/// Parses a value that is exactly one `var()` expression.
pub fn parse_var(value: &str) -> Option<VarReference<'_>> {
    let value = value.trim();
    let head = value.get(..4)?;
    if !head.eq_ignore_ascii_case("var(") || !value.ends_with(')') {
        return None;
    }
    let inner = &value[4..value.len() - 1];
    let (name, fallback) = match split_once_top_level(inner, ',') {
        Some((name, rest)) => {
            let rest = rest.trim();
            (name, (!rest.is_empty()).then_some(rest))
        }
        None => (inner, None),
    };
    let name = name.trim().strip_prefix("--")?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return None;
    }
    Some(VarReference { name, fallback })
}

/// A WordPress preset token such as `var:preset|color|base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetToken {
    /// Preset kind (`color`, `font-family`, ...).
    pub kind: String,
    pub slug: String,
}

impl PresetToken {
    /// The custom property WordPress generates for this preset, without `--`.
    pub fn css_variable(&self) -> String {
        format!("wp--preset--{}--{}", self.kind, self.slug)
    }

    pub fn is_color(&self) -> bool {
        self.kind == "color"
    }
}

/// Parses `var:preset|<kind>|<slug>`.
pub fn parse_preset_token(value: &str) -> Option<PresetToken> {
    let rest = value.trim().strip_prefix("var:preset|")?;
    let (kind, slug) = rest.split_once('|')?;
    if kind.is_empty() || slug.is_empty() || slug.contains('|') {
        return None;
    }
    Some(PresetToken {
        kind: kind.to_string(),
        slug: slug.to_string(),
    })
}

/// Extracts the slug from a preset custom property name of the given kind,
/// e.g. `wp--preset--color--base` with kind `color` gives `base`.
pub fn preset_slug<'a>(var_name: &'a str, kind: &str) -> Option<&'a str> {
    let bare = var_name.trim().trim_start_matches("--");
    let rest = bare.strip_prefix("wp--preset--")?;
    let slug = rest.strip_prefix(kind)?.strip_prefix("--")?;
    (!slug.is_empty()).then_some(slug)
}

/// Splits at the first `sep` that is not nested inside parentheses.
pub(crate) fn split_once_top_level(s: &str, sep: char) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => return Some((&s[..i], &s[i + c.len_utf8()..])),
            _ => {}
        }
    }
    None
}

/// Splits on `sep` where it is not nested inside parentheses.
pub(crate) fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations_in_document_order() {
        let css = ":root { --a: #fff; --b: rgb(0, 0, 0); --a: #000; }";
        let table = CssVariableTable::parse(css);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a"), Some("#000"));
        assert_eq!(table.get("--b"), Some("rgb(0, 0, 0)"));
    }

    #[test]
    fn test_self_reference_is_dropped() {
        let css = ":root{--x: var(--x);--y:#123456;}";
        let table = CssVariableTable::parse(css);
        assert!(!table.contains("x"));
        assert_eq!(table.get("y"), Some("#123456"));
    }

    #[test]
    fn test_self_reference_stripping_keeps_other_refs() {
        let out = strip_self_references("--x: var(--x); --y: var(--x);");
        assert_eq!(out.trim(), "--y: var(--x);");
    }

    #[test]
    fn test_self_reference_is_case_sensitive() {
        let table = CssVariableTable::parse(":root{--brand:#123456;--Brand: var(--brand);}");
        assert_eq!(table.get("Brand"), Some("#123456"));
        assert_eq!(table.get("brand"), Some("#123456"));

        let scoped = scope_css(":root{--Brand: var(--brand);}", "card");
        assert_eq!(scoped, ".card{--Brand: var(--brand);}");
    }

    #[test]
    fn test_eager_single_level_resolution() {
        let css = "--base: #eee; --bg: var(--base); --late: var(--later); --later: red;";
        let table = CssVariableTable::parse(css);
        assert_eq!(table.get("bg"), Some("#eee"));
        assert_eq!(table.get("late"), Some("var(--later)"));
    }

    #[test]
    fn test_parse_var() {
        let r = parse_var("var(--wp--preset--color--base)").unwrap();
        assert_eq!(r.name, "wp--preset--color--base");
        assert_eq!(r.fallback, None);

        let r = parse_var("VAR( --x , rgb(1, 2, 3) )").unwrap();
        assert_eq!(r.name, "x");
        assert_eq!(r.fallback, Some("rgb(1, 2, 3)"));

        assert!(parse_var("var(x)").is_none());
        assert!(parse_var("#fff").is_none());
        assert!(parse_var("var(--a) var(--b)").is_none());
    }

    #[test]
    fn test_preset_token() {
        let t = parse_preset_token("var:preset|color|accent-2").unwrap();
        assert!(t.is_color());
        assert_eq!(t.slug, "accent-2");
        assert_eq!(t.css_variable(), "wp--preset--color--accent-2");
        assert!(parse_preset_token("var:preset|color").is_none());
        assert!(parse_preset_token("var(--x)").is_none());
    }

    #[test]
    fn test_preset_slug() {
        assert_eq!(preset_slug("--wp--preset--color--base", "color"), Some("base"));
        assert_eq!(preset_slug("wp--preset--font-family--body", "font-family"), Some("body"));
        assert_eq!(preset_slug("wp--preset--color--", "color"), None);
        assert_eq!(preset_slug("brand", "color"), None);
    }

    #[test]
    fn test_scope_css() {
        let css = ":root, .editor-styles-wrapper { --a: #fff; --a2: var(--a2); }\n:root{--b:#000}";
        let out = scope_css(css, "card--ocean");
        assert!(out.starts_with(".card--ocean {"));
        assert!(out.contains(".card--ocean{--b:#000}"));
        assert!(!out.contains("--a2"));
        assert!(!out.contains(":root"));
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("in srgb, rgb(1, 2, 3) 40%, transparent", ','),
            vec!["in srgb", "rgb(1, 2, 3) 40%", "transparent"]
        );
    }
}
