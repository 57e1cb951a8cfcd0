//! Color values and WCAG contrast math.
//!
//! Every color notation the engine understands is reduced to an [`Rgba`]
//! quadruple: 8-bit sRGB channels plus a floating point alpha.
//!
//! Supported notations:
//! - Hex: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`
//! - `rgb()` / `rgba()` with comma syntax or space syntax with `/ alpha`
//! - `oklch(L C H)` with optional `/ alpha`
//! - `transparent`
//!
//! Anything else (named keywords such as `rebeccapurple`, or other functional
//! notations) is handed to a [`ColorHost`], the host's own color resolution
//! facility. See [`crate::named::NamedColors`] for the default host.
//!
//! # Example
//!
//! ```rust
//! use rolecolor::color::{Rgba, contrast_ratio, to_rgba};
//!
//! let bg = to_rgba("#ffffff").unwrap();
//! let fg = to_rgba("rgb(27 27 27)").unwrap();
//! assert!(contrast_ratio(bg, fg) > 17.0);
//! assert_eq!(to_rgba("#00000080").unwrap().a, 128.0 / 255.0);
//! # let _ = Rgba::WHITE;
//! ```

// r, g, b, a, l, c, h are the standard names in color math.
#![allow(clippy::many_single_char_names)]

use std::fmt;

use crate::error::{ColorError, ColorResult};

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Returns true when the color carries no transparency.
    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// The same channels with alpha forced to 1.
    pub fn opaque(self) -> Self {
        Self::rgb(self.r, self.g, self.b)
    }

    /// WCAG relative luminance of the color channels (alpha is ignored).
    pub fn luminance(&self) -> f64 {
        relative_luminance(f64::from(self.r), f64::from(self.g), f64::from(self.b))
    }

    /// Formats as `rgb(r,g,b)`, dropping alpha.
    pub fn to_rgb_string(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// Formats as `#rrggbb`, dropping alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    /// `rgb(r,g,b)` for opaque colors, `rgba(r,g,b,a)` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "rgb({},{},{})", self.r, self.g, self.b)
        } else {
            let a = (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
            write!(f, "rgba({},{},{},{a})", self.r, self.g, self.b)
        }
    }
}

impl From<(u8, u8, u8)> for Rgba {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::rgb(r, g, b)
    }
}

/// The host's color resolution facility.
///
/// Consulted for any color string the engine does not parse natively. A host
/// must be side-effect free; returning `None` is always acceptable.
pub trait ColorHost: fmt::Debug + Send + Sync {
    fn resolve(&self, value: &str) -> Option<Rgba>;
}

/// A host that resolves nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoHost;

impl ColorHost for NoHost {
    fn resolve(&self, _value: &str) -> Option<Rgba> {
        None
    }
}

/// Parse a color natively, without any host facility.
///
/// # Errors
/// Returns [`ColorError::Parse`] for malformed hex or functional notation and
/// [`ColorError::UnresolvedColor`] for anything that would need a host.
pub fn to_rgba(value: &str) -> ColorResult<Rgba> {
    to_rgba_with(value, &NoHost)
}

/// Parse a color, delegating unknown notations to `host`.
///
/// # Errors
/// Same as [`to_rgba`], except that notations the host understands succeed.
pub fn to_rgba_with(value: &str, host: &dyn ColorHost) -> ColorResult<Rgba> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err(ColorError::Parse(value.to_string()));
    }
    let lower = raw.to_ascii_lowercase();

    if lower == "transparent" {
        return Ok(Rgba::TRANSPARENT);
    }
    if let Some(hex) = raw.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ColorError::Parse(raw.to_string()));
    }
    if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
        return parse_rgb_args(args).ok_or_else(|| ColorError::Parse(raw.to_string()));
    }
    if let Some(args) = function_args(&lower, "oklch") {
        return parse_oklch_args(args).ok_or_else(|| ColorError::Parse(raw.to_string()));
    }

    host.resolve(raw)
        .map(|c| Rgba::new(c.r, c.g, c.b, sanitize_alpha(c.a)))
        .ok_or_else(|| ColorError::UnresolvedColor(raw.to_string()))
}

/// Returns the text between `name(` and the closing `)`.
fn function_args<'a>(lower: &'a str, name: &str) -> Option<&'a str> {
    let rest = lower.strip_prefix(name)?;
    let rest = rest.trim_start().strip_prefix('(')?;
    rest.trim_end().strip_suffix(')')
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba::new(
            nibble(0)?,
            nibble(1)?,
            nibble(2)?,
            f64::from(nibble(3)?) / 255.0,
        )),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            f64::from(byte(6)?) / 255.0,
        )),
        _ => None,
    }
}

/// Splits functional notation arguments into color components and an
/// optional alpha, accepting both `a, b, c, d` and `a b c / d`.
fn split_components(args: &str) -> Option<(Vec<&str>, Option<&str>)> {
    if args.contains(',') {
        let mut parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        let alpha = if parts.len() == 4 { parts.pop() } else { None };
        Some((parts, alpha))
    } else {
        let (channels, alpha) = match args.split_once('/') {
            Some((channels, alpha)) => (channels, Some(alpha.trim())),
            None => (args, None),
        };
        Some((channels.split_whitespace().collect(), alpha))
    }
}

/// A finite number, or a percentage scaled so that `100%` equals `full`.
fn parse_component(token: &str, full: f64) -> Option<f64> {
    if token == "none" {
        return Some(0.0);
    }
    let value = match token.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0 * full,
        None => token.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

fn parse_alpha(token: Option<&str>) -> Option<f64> {
    match token {
        None => Some(1.0),
        Some(t) => parse_component(t, 1.0).map(|a| a.clamp(0.0, 1.0)),
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let (channels, alpha) = split_components(args)?;
    if channels.len() != 3 {
        return None;
    }
    let r = parse_component(channels[0], 255.0)?;
    let g = parse_component(channels[1], 255.0)?;
    let b = parse_component(channels[2], 255.0)?;
    Some(Rgba::new(to_channel(r), to_channel(g), to_channel(b), parse_alpha(alpha)?))
}

fn parse_oklch_args(args: &str) -> Option<Rgba> {
    let (channels, alpha) = split_components(args)?;
    if channels.len() != 3 {
        return None;
    }
    let l = parse_component(channels[0], 1.0)?;
    let c = parse_component(channels[1], 0.4)?;
    let h_token = channels[2].strip_suffix("deg").unwrap_or(channels[2]);
    let h = parse_component(h_token, 360.0)?;
    let mut color = oklch_to_rgba(l, c, h);
    color.a = parse_alpha(alpha)?;
    Some(color)
}

/// Converts OKLCH to sRGB.
///
/// Out-of-range inputs are clamped (`L` to `[0, 1]`, `C` to `[0, 0.4]`) or
/// wrapped (`H` modulo 360). Out-of-gamut results are clamped per channel.
pub fn oklch_to_rgba(l: f64, c: f64, h: f64) -> Rgba {
    let l = finite_or_zero(l).clamp(0.0, 1.0);
    let c = finite_or_zero(c).clamp(0.0, 0.4);
    let h = finite_or_zero(h).rem_euclid(360.0).to_radians();

    let a = c * h.cos();
    let b = c * h.sin();

    let l_ = (l + 0.396_337_777_4 * a + 0.215_803_757_3 * b).powi(3);
    let m_ = (l - 0.105_561_345_8 * a - 0.063_854_172_8 * b).powi(3);
    let s_ = (l - 0.089_484_177_5 * a - 1.291_485_548_0 * b).powi(3);

    let r = 4.076_741_662_1 * l_ - 3.307_711_591_3 * m_ + 0.230_969_929_2 * s_;
    let g = -1.268_438_004_6 * l_ + 2.609_757_401_1 * m_ - 0.341_319_396_5 * s_;
    let b = -0.004_196_086_3 * l_ - 0.703_418_614_7 * m_ + 1.707_614_701_0 * s_;

    Rgba::rgb(
        to_channel(gamma_encode(r) * 255.0),
        to_channel(gamma_encode(g) * 255.0),
        to_channel(gamma_encode(b) * 255.0),
    )
}

fn gamma_encode(v: f64) -> f64 {
    if v <= 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn sanitize_alpha(a: f64) -> f64 {
    if a.is_nan() { 1.0 } else { a.clamp(0.0, 1.0) }
}

/// Rounds and clamps a channel value into a byte. NaN becomes 0.
fn to_channel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// WCAG 2.x relative luminance of 0-255 sRGB channels.
///
/// Returns a value in `[0, 1]`. NaN channels are treated as 0 so a malformed
/// color can never poison the contrast math.
pub fn relative_luminance(r: f64, g: f64, b: f64) -> f64 {
    let lin = |c: f64| {
        let c = if c.is_nan() { 0.0 } else { c.clamp(0.0, 255.0) } / 255.0;
        if c <= 0.039_28 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * lin(r) + 0.7152 * lin(g) + 0.0722 * lin(b)
}

/// WCAG contrast ratio between two colors, in `[1, 21]`.
///
/// Symmetric in its arguments. A NaN result is reported as 1, the worst case.
pub fn contrast_ratio(bg: Rgba, fg: Rgba) -> f64 {
    let lb = bg.luminance();
    let lf = fg.luminance();
    let ratio = (lb.max(lf) + 0.05) / (lb.min(lf) + 0.05);
    if ratio.is_nan() { 1.0 } else { ratio }
}

/// Alpha-blends `fg` over `bg`, returning an opaque color.
///
/// A NaN alpha degrades to the background.
pub fn composite_over(fg: Rgba, bg: Rgba) -> Rgba {
    if fg.a.is_nan() {
        return bg.opaque();
    }
    let a = fg.a.clamp(0.0, 1.0);
    let blend = |f: u8, b: u8| to_channel(f64::from(f) * a + f64::from(b) * (1.0 - a));
    Rgba::rgb(blend(fg.r, bg.r), blend(fg.g, bg.g), blend(fg.b, bg.b))
}

/// Linear per-channel blend: `weight` of `a` and `1 - weight` of `b`.
pub fn mix(a: Rgba, b: Rgba, weight: f64) -> Rgba {
    let w = finite_or_zero(weight).clamp(0.0, 1.0);
    let blend = |x: u8, y: u8| to_channel(f64::from(x) * w + f64::from(y) * (1.0 - w));
    let alpha = if a.is_opaque() && b.is_opaque() {
        1.0
    } else {
        sanitize_alpha(a.a * w + b.a * (1.0 - w))
    };
    Rgba::new(blend(a.r, b.r), blend(a.g, b.g), blend(a.b, b.b), alpha)
}
