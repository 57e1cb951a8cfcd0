#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

use proptest::prelude::*;
use rolecolor::color::{Rgba, composite_over, contrast_ratio, oklch_to_rgba, to_rgba};
use rolecolor::contrast::best_foreground;
use rolecolor::document::RawPaletteEntry;
use rolecolor::{CssVariableTable, PLACEHOLDER, Role, ThemeDocument, resolve};

fn any_rgb() -> impl Strategy<Value = Rgba> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgba::rgb(r, g, b))
}

fn hex(c: Rgba) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

// =============================================================================
// Color model
// =============================================================================

proptest! {
    #[test]
    fn hex6_round_trips(c in any_rgb(), upper in any::<bool>()) {
        let text = if upper { hex(c).to_uppercase() } else { hex(c) };
        let parsed = to_rgba(&text).unwrap();
        prop_assert_eq!(parsed, c);
        prop_assert!((parsed.a - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn oklch_in_range_never_escapes(l in 0.0f64..=1.0, c in 0.0f64..=0.4, h in 0.0f64..360.0) {
        // Channels are u8, so only NaN-free alpha is left to check.
        let color = oklch_to_rgba(l, c, h);
        prop_assert!((color.a - 1.0).abs() < f64::EPSILON);
        let text = format!("oklch({l} {c} {h})");
        prop_assert_eq!(to_rgba(&text).unwrap(), color);
    }

    #[test]
    fn oklch_out_of_range_is_clamped(l in -10.0f64..10.0, c in -2.0f64..2.0, h in -1000.0f64..1000.0) {
        let _ = oklch_to_rgba(l, c, h);
        let _ = to_rgba(&format!("oklch({l} {c} {h})"));
    }

    #[test]
    fn parsing_never_panics(s in "\\PC{0,60}") {
        let _ = to_rgba(&s);
        let _ = CssVariableTable::parse(&s);
    }

    #[test]
    fn contrast_is_symmetric(a in any_rgb(), b in any_rgb()) {
        let ab = contrast_ratio(a, b);
        let ba = contrast_ratio(b, a);
        prop_assert!((ab - ba).abs() < 1e-12);
        prop_assert!((1.0..=21.0 + 1e-9).contains(&ab));
    }

    #[test]
    fn contrast_with_self_is_one(c in any_rgb()) {
        prop_assert!((contrast_ratio(c, c) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn composite_stays_between_endpoints(fg in any_rgb(), bg in any_rgb(), alpha in 0.0f64..=1.0) {
        let out = composite_over(Rgba::new(fg.r, fg.g, fg.b, alpha), bg);
        for (o, f, b) in [(out.r, fg.r, bg.r), (out.g, fg.g, bg.g), (out.b, fg.b, bg.b)] {
            prop_assert!(o >= f.min(b) && o <= f.max(b));
        }
        prop_assert!(out.is_opaque());
    }
}

// =============================================================================
// Contrast selection
// =============================================================================

proptest! {
    #[test]
    fn best_foreground_dominates(bg in any_rgb(), a in any_rgb(), b in any_rgb()) {
        let (bg_hex, a_hex, b_hex) = (hex(bg), hex(a), hex(b));
        let picked = best_foreground(&bg_hex, &[&a_hex, &b_hex]).unwrap();
        let picked_rgba = to_rgba(picked).unwrap();
        let other = if picked == a_hex { b } else { a };
        prop_assert!(contrast_ratio(bg, picked_rgba) >= contrast_ratio(bg, other));
    }
}

// =============================================================================
// Role assignment
// =============================================================================

proptest! {
    #[test]
    fn one_color_never_needs_the_placeholder(c in any_rgb(), slug in "[a-z]{1,12}") {
        let doc = ThemeDocument::with_palette(vec![RawPaletteEntry::new(slug, hex(c))]);
        let out = resolve(&doc, false);
        prop_assert_eq!(out.placeholder_count, 0);
        prop_assert_eq!(out.palette_color_count, 1);
        let color = hex(c);
        for role in Role::ALL {
            prop_assert_eq!(out.role(role), color.as_str());
        }
    }

    #[test]
    fn small_palettes_fill_every_role(colors in prop::collection::vec(any_rgb(), 1..8)) {
        let entries = colors
            .iter()
            .enumerate()
            .map(|(i, c)| RawPaletteEntry::new(format!("swatch-{i}"), hex(*c)))
            .collect();
        let out = resolve(&ThemeDocument::with_palette(entries), true);
        prop_assert_eq!(out.placeholder_count, 0);
        prop_assert_eq!(out.palette_color_count, colors.len());
    }

    #[test]
    fn empty_palettes_are_all_placeholder(dark in any::<bool>()) {
        let out = resolve(&ThemeDocument::with_palette(Vec::new()), dark);
        prop_assert_eq!(out.placeholder_count, Role::COUNT);
        for role in Role::ALL {
            prop_assert_eq!(out.role(role), PLACEHOLDER);
        }
    }
}
