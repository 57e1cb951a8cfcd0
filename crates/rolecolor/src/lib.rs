#![forbid(unsafe_code)]
// Allow these clippy lints for API ergonomics and color math
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::use_self)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::unreadable_literal)]

//! # Rolecolor
//!
//! Resolves loosely structured theme configurations (`theme.json` files and
//! style variations) into a fixed set of semantic color roles, with text
//! colors picked by WCAG contrast.
//!
//! The pipeline:
//! - **Color model** ([`color`], [`named`]): hex, `rgb()`/`rgba()`, `oklch()`,
//!   keywords; relative luminance, contrast ratio, compositing
//! - **Symbol resolution** ([`css`], [`resolve`]): custom properties,
//!   `var()` with fallbacks, `var:preset|color|slug` tokens, `color-mix()`
//! - **Palette normalization** ([`palette`]): every usable color made concrete
//!   and opaque
//! - **Role assignment** ([`roles`]): 26 roles filled by slug, derivation,
//!   seeding and cycling
//! - **Contrast selection** ([`contrast`]): paired foregrounds for body text,
//!   headings, calls to action, list items, status messages and swatches
//!
//! ## Quick Start
//!
//! ```rust
//! use rolecolor::{Role, ThemeDocument, resolve};
//!
//! let doc = ThemeDocument::from_json(r##"{
//!     "settings": { "color": { "palette": [
//!         { "slug": "base", "color": "#ffffff" },
//!         { "slug": "contrast", "color": "#1b1b1b" },
//!         { "slug": "accent", "color": "oklch(0.55 0.2 260)" }
//!     ] } }
//! }"##).unwrap();
//!
//! let light = resolve(&doc, false);
//! assert_eq!(light.role(Role::BaseLight), "#ffffff");
//! assert_eq!(light.role(Role::TextOnLight), "#1b1b1b");
//! assert_eq!(light.placeholder_count, 0);
//!
//! let json = serde_json::to_string(&light).unwrap();
//! assert!(json.contains(r#""accentLight":"oklch(0.55 0.2 260)""#));
//! ```
//!
//! ## Failure model
//!
//! Resolution never fails. Unparseable colors, dangling references and empty
//! palettes degrade to documented defaults and show up in the diagnostic
//! counts of [`ResolvedPalette`]. Only loading a document or an engine
//! configuration returns errors.
//!
//! ## Logging
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod color;
pub mod config;
pub mod contrast;
pub mod css;
pub mod document;
pub mod engine;
pub mod error;
pub mod named;
pub mod palette;
pub mod resolve;
pub mod roles;
pub mod typography;

/// The sentinel color for anything that could not be resolved.
pub const PLACEHOLDER: &str = "#cccccc";

pub use color::{ColorHost, NoHost, Rgba, contrast_ratio, relative_luminance, to_rgba, to_rgba_with};
pub use config::EngineConfig;
pub use contrast::{ContrastSelector, ForegroundPairs, SwatchLabel, best_foreground};
pub use css::{CssVariableTable, scope_css};
pub use document::{ThemeDocument, Variation, VariationList};
pub use engine::{CardPreview, ResolutionContext, ResolvedPalette, Resolver, resolve};
pub use error::{ColorError, ConfigError, DocumentError};
pub use named::NamedColors;
pub use palette::{NormalizedPalette, normalize_slug};
pub use resolve::SymbolResolver;
pub use roles::{Role, RoleMap, assign_roles};
pub use typography::FontSample;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::color::{ColorHost, Rgba, contrast_ratio, to_rgba};
    pub use crate::config::EngineConfig;
    pub use crate::document::{ThemeDocument, Variation};
    pub use crate::engine::{ResolvedPalette, Resolver, resolve};
    pub use crate::roles::Role;
}
