//! End-to-end resolution scenarios.

use rolecolor::color::Rgba;
use rolecolor::roles::RoleSource;
use rolecolor::{
    CssVariableTable, EngineConfig, NoHost, PLACEHOLDER, Resolver, Role, SymbolResolver,
    ThemeDocument, VariationList, best_foreground, contrast_ratio, resolve, to_rgba,
};

fn doc(json: &str) -> ThemeDocument {
    ThemeDocument::from_json(json).expect("valid test document")
}

mod scenarios {
    use super::*;

    #[test]
    fn test_base_and_contrast_light_mode() {
        let d = doc(r##"{"settings":{"color":{"palette":[
            {"slug":"base","color":"#ffffff"},
            {"slug":"contrast","color":"#1b1b1b"}
        ]}}}"##);
        let out = resolve(&d, false);
        assert_eq!(out.role(Role::BaseLight), "#ffffff");
        assert_eq!(out.role(Role::TextOnLight), "#1b1b1b");
        let ratio = contrast_ratio(to_rgba("#ffffff").unwrap(), to_rgba("#1b1b1b").unwrap());
        assert!(ratio > 17.0);
        assert_eq!(out.pairs.text, "#1b1b1b");
    }

    #[test]
    fn test_zero_entry_palette() {
        let out = resolve(&doc(r#"{"settings":{"color":{"palette":[]}}}"#), false);
        assert_eq!(out.placeholder_count, Role::COUNT);
        assert!(Role::ALL.iter().all(|r| out.role(*r) == PLACEHOLDER));
    }

    #[test]
    fn test_single_color_palette() {
        let out = resolve(
            &doc(r##"{"settings":{"color":{"palette":[{"slug":"only","color":"#3a7bd5"}]}}}"##),
            false,
        );
        assert_eq!(out.placeholder_count, 0);
        assert_eq!(out.role(Role::SuccessDark), "#3a7bd5");
    }

    #[test]
    fn test_twentysomething_theme() {
        // A typical block theme palette.
        let d = doc(r##"{
            "settings":{"color":{"palette":[
                {"slug":"base","color":"#f9f9f9","name":"Base"},
                {"slug":"base-2","color":"#ffffff","name":"Base / Two"},
                {"slug":"contrast","color":"#111111","name":"Contrast"},
                {"slug":"contrast-2","color":"#636363","name":"Contrast / Two"},
                {"slug":"accent","color":"#cfcabe","name":"Accent"},
                {"slug":"accent-2","color":"#c2a990","name":"Accent / Two"},
                {"slug":"accent-3","color":"#d8613c","name":"Accent / Three"}
            ]}},
            "styles":{"elements":{"button":{"color":{"background":"var:preset|color|contrast","text":"var:preset|color|base"}}}}
        }"##);
        let out = resolve(&d, false);
        assert_eq!(out.role(Role::BaseLight), "#f9f9f9");
        assert_eq!(out.role(Role::TextOnLight), "#111111");
        // Slug match beats the button color for accent roles.
        assert_eq!(out.role(Role::AccentLight), "#cfcabe");
        assert_eq!(out.pairs.cta_background, "#111111");
        assert_eq!(out.pairs.text, "#111111");
        assert_eq!(out.placeholder_count, 0);
        assert_eq!(out.palette_color_count, 7);
    }

    #[test]
    fn test_dark_mode_pairs() {
        let d = doc(r##"{"settings":{"color":{"palette":[
            {"slug":"base","color":"#ffffff"},
            {"slug":"base-dark","color":"#101010"},
            {"slug":"contrast","color":"#101010"},
            {"slug":"text-on-dark","color":"#fafafa"}
        ]}}}"##);
        let out = resolve(&d, true);
        assert_eq!(out.pairs.background, "#101010");
        assert_eq!(out.pairs.text, "#fafafa");
        assert_eq!(out.pairs.heading_text, "#fafafa");
    }
}

mod symbols {
    use super::*;

    #[test]
    fn test_color_mix_transparent_over_white() {
        let vars = CssVariableTable::new();
        let r = SymbolResolver::new(&vars, &NoHost);
        assert_eq!(
            r.resolve_color_mix("color-mix(in srgb, #000000 50%, transparent)", Rgba::WHITE),
            "rgb(128,128,128)"
        );
    }

    #[test]
    fn test_self_reference_is_dropped() {
        let vars = CssVariableTable::parse(":root { --x: var(--x); --y: #fff; }");
        assert!(!vars.contains("x"));
        assert!(vars.contains("y"));
    }

    #[test]
    fn test_dangling_reference_leaves_entry_unresolved() {
        let out = resolve(
            &doc(r##"{"settings":{"color":{"palette":[
                {"slug":"ghost","color":"var(--missing)"},
                {"slug":"real","color":"#224466"}
            ]}}}"##),
            false,
        );
        assert_eq!(out.unresolved_entry_count, 1);
        assert_eq!(out.palette_color_count, 1);
        assert_eq!(out.placeholder_count, 0);
    }

    #[test]
    fn test_deeper_chains_need_configuration() {
        let d = doc(r##"{
            "settings":{"color":{"palette":[{"slug":"accent","color":"var(--a)"}]}},
            "styles":{"css":"--a: var(--b); --b: var(--c); --c: var(--d); --d: #abcdef;"}
        }"##);
        assert_eq!(resolve(&d, false).unresolved_entry_count, 1);

        let deep = Resolver::with_config(EngineConfig {
            max_var_depth: 4,
            ..EngineConfig::default()
        })
        .unwrap();
        let out = deep.resolve(&d, false);
        assert_eq!(out.unresolved_entry_count, 0);
        assert_eq!(out.role(Role::AccentLight), "#abcdef");
    }

    #[test]
    fn test_keywords_need_a_host() {
        let d = doc(r#"{"settings":{"color":{"palette":[{"slug":"accent","color":"rebeccapurple"}]}}}"#);
        assert_eq!(resolve(&d, false).role(Role::AccentLight), "rebeccapurple");

        let bare = Resolver::new().with_host(NoHost).resolve(&d, false);
        assert_eq!(bare.unresolved_entry_count, 1);
        assert_eq!(bare.role(Role::AccentLight), PLACEHOLDER);
    }
}

mod palette_shapes {
    use super::*;

    #[test]
    fn test_origin_wrapped_palette() {
        let d = doc(r##"{"settings":{"color":{"palette":{
            "default":[{"slug":"black","color":"#000000"}],
            "theme":[{"slug":"base","color":"#fefefe"},{"slug":"contrast","color":"#202020"}]
        }}}}"##);
        let out = resolve(&d, false);
        assert_eq!(out.role(Role::BaseLight), "#fefefe");
        assert_eq!(out.role(Role::TextOnLight), "#202020");
        // Core presets come last, so they end up in the pool.
        assert_eq!(out.role(Role::BaseDark), "#000000");
        assert_eq!(out.palette_color_count, 3);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let d = doc(r##"{"settings":{"color":{"palette":[
            null,
            {"slug":"base","color":"#ffffff"},
            {"name":"No slug","color":"#000000"},
            42
        ]}}}"##);
        let out = resolve(&d, false);
        assert_eq!(out.malformed_entry_count, 3);
        assert_eq!(out.palette_color_count, 1);
    }

    #[test]
    fn test_translucent_palette_colors_become_opaque() {
        let d = doc(r##"{"settings":{"color":{"palette":[
            {"slug":"accent","color":"#ff000080"}
        ]}}}"##);
        let out = resolve(&d, false);
        // 50% red over the neutral gray.
        assert_eq!(out.role(Role::AccentLight), "rgb(192,64,64)");
    }
}

mod variations {
    use super::*;

    #[test]
    fn test_variation_list_previews() {
        let list: VariationList = serde_json::from_str(
            r##"{"variations":[
                {"slug":"dusk","title":"Dusk","config":{
                    "settings":{
                        "color":{"palette":[
                            {"slug":"base","color":"#1e1e2e"},
                            {"slug":"contrast","color":"#cdd6f4"}
                        ]},
                        "typography":{"fontFamilies":[{"name":"Inter","slug":"inter","fontFamily":"Inter"}]}
                    },
                    "styles":{"css":":root, .editor-styles-wrapper { --glow: #f5c2e7; }","typography":{"fontFamily":"var(--wp--preset--font-family--inter)"}}
                }},
                {"slug":"blank","config":{}}
            ]}"##,
        )
        .unwrap();
        let resolver = Resolver::new();
        let previews: Vec<_> = list
            .variations
            .iter()
            .map(|v| resolver.preview(v, false))
            .collect();

        assert_eq!(previews[0].title, "Dusk");
        assert_eq!(previews[0].scoped_css, ".rolecolor-card--dusk { --glow: #f5c2e7; }");
        assert_eq!(previews[0].fonts.len(), 2);
        assert_eq!(previews[0].fonts[1].family, "Inter");
        assert_eq!(previews[0].swatches.len(), 2);
        assert_eq!(previews[1].colors.placeholder_count, Role::COUNT);
        assert!(previews[1].swatches.is_empty());
    }

    #[test]
    fn test_best_foreground_from_rendered_background() {
        // The rendering layer hands over computed styles as strings.
        assert_eq!(best_foreground("rgb(30, 30, 46)", &["#cdd6f4", "#1e1e2e"]), Some("#cdd6f4"));
    }

    #[test]
    fn test_role_sources_are_reported() {
        let d = doc(r##"{"settings":{"color":{"palette":[
            {"slug":"base","color":"#ffffff"},
            {"slug":"contrast","color":"#000000"}
        ]}}}"##);
        let resolver = Resolver::new();
        let ctx = resolver.context(&d, None, false);
        let assignment = rolecolor::assign_roles(&ctx.palette, None, PLACEHOLDER);
        assert_eq!(assignment.source(Role::BaseLight), &RoleSource::Slug("base".into()));
        assert!(matches!(assignment.source(Role::AccentLight), RoleSource::Cycled(_)));
    }
}
