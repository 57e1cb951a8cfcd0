//! Semantic color roles.
//!
//! [`assign_roles`] maps a normalized palette onto the closed set of
//! [`Role`]s. Precedence, highest first:
//!
//! 1. a slug naming the role (`primary-light`, `accent`, `base`, ...);
//! 2. for base and text roles, derivation from the pool by luminance and
//!    contrast;
//! 3. one seed per role family from the queue of unconsumed colors (the theme's
//!    button background seeds the accent family first);
//! 4. cycling through the seeds already handed out;
//! 5. the placeholder, only when nothing usable exists.
//!
//! The function never fails. How each role was filled is kept in
//! [`RoleSource`] for diagnostics.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, trace, warn};

use crate::color::{Rgba, contrast_ratio};
use crate::error::ColorError;
use crate::palette::{NormalizedPalette, UsableColor};
use crate::resolve::ResolvedColor;

/// A named semantic color slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    BaseLight,
    BaseDark,
    TextOnLight,
    TextOnDark,
    PrimaryLight,
    PrimaryDark,
    PrimaryLighter,
    PrimaryDarker,
    SecondaryLight,
    SecondaryDark,
    SecondaryLighter,
    SecondaryDarker,
    TertiaryLight,
    TertiaryDark,
    TertiaryLighter,
    TertiaryDarker,
    AccentLight,
    AccentDark,
    AccentLighter,
    AccentDarker,
    ErrorLight,
    ErrorDark,
    NoticeLight,
    NoticeDark,
    SuccessLight,
    SuccessDark,
}

impl Role {
    pub const COUNT: usize = 26;

    /// Every role, in output order.
    pub const ALL: [Role; Role::COUNT] = [
        Role::BaseLight,
        Role::BaseDark,
        Role::TextOnLight,
        Role::TextOnDark,
        Role::PrimaryLight,
        Role::PrimaryDark,
        Role::PrimaryLighter,
        Role::PrimaryDarker,
        Role::SecondaryLight,
        Role::SecondaryDark,
        Role::SecondaryLighter,
        Role::SecondaryDarker,
        Role::TertiaryLight,
        Role::TertiaryDark,
        Role::TertiaryLighter,
        Role::TertiaryDarker,
        Role::AccentLight,
        Role::AccentDark,
        Role::AccentLighter,
        Role::AccentDarker,
        Role::ErrorLight,
        Role::ErrorDark,
        Role::NoticeLight,
        Role::NoticeDark,
        Role::SuccessLight,
        Role::SuccessDark,
    ];

    /// The camelCase output key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::BaseLight => "baseLight",
            Role::BaseDark => "baseDark",
            Role::TextOnLight => "textOnLight",
            Role::TextOnDark => "textOnDark",
            Role::PrimaryLight => "primaryLight",
            Role::PrimaryDark => "primaryDark",
            Role::PrimaryLighter => "primaryLighter",
            Role::PrimaryDarker => "primaryDarker",
            Role::SecondaryLight => "secondaryLight",
            Role::SecondaryDark => "secondaryDark",
            Role::SecondaryLighter => "secondaryLighter",
            Role::SecondaryDarker => "secondaryDarker",
            Role::TertiaryLight => "tertiaryLight",
            Role::TertiaryDark => "tertiaryDark",
            Role::TertiaryLighter => "tertiaryLighter",
            Role::TertiaryDarker => "tertiaryDarker",
            Role::AccentLight => "accentLight",
            Role::AccentDark => "accentDark",
            Role::AccentLighter => "accentLighter",
            Role::AccentDarker => "accentDarker",
            Role::ErrorLight => "errorLight",
            Role::ErrorDark => "errorDark",
            Role::NoticeLight => "noticeLight",
            Role::NoticeDark => "noticeDark",
            Role::SuccessLight => "successLight",
            Role::SuccessDark => "successDark",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }

    /// The family a variant role belongs to; `None` for base and text roles.
    pub fn family(self) -> Option<Family> {
        Family::ALL
            .into_iter()
            .find(|family| family.roles().any(|(role, _)| role == self))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone variants a family role can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Light,
    Dark,
    Lighter,
    Darker,
}

/// A group of roles that share one seed color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Accent,
    Primary,
    Secondary,
    Tertiary,
    Error,
    Notice,
    Success,
}

impl Family {
    /// Families in seeding order.
    pub const ALL: [Family; 7] = [
        Family::Accent,
        Family::Primary,
        Family::Secondary,
        Family::Tertiary,
        Family::Error,
        Family::Notice,
        Family::Success,
    ];

    /// Slug fragments naming the family, most common first.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Family::Accent => &["accent"],
            Family::Primary => &["primary"],
            Family::Secondary => &["secondary"],
            Family::Tertiary => &["tertiary"],
            Family::Error => &["error", "danger"],
            Family::Notice => &["notice", "warning", "info"],
            Family::Success => &["success"],
        }
    }

    /// The roles of the family with their variants.
    pub fn roles(self) -> impl Iterator<Item = (Role, Variant)> {
        let roles: &'static [(Role, Variant)] = match self {
            Family::Primary => &[
                (Role::PrimaryLight, Variant::Light),
                (Role::PrimaryDark, Variant::Dark),
                (Role::PrimaryLighter, Variant::Lighter),
                (Role::PrimaryDarker, Variant::Darker),
            ],
            Family::Secondary => &[
                (Role::SecondaryLight, Variant::Light),
                (Role::SecondaryDark, Variant::Dark),
                (Role::SecondaryLighter, Variant::Lighter),
                (Role::SecondaryDarker, Variant::Darker),
            ],
            Family::Tertiary => &[
                (Role::TertiaryLight, Variant::Light),
                (Role::TertiaryDark, Variant::Dark),
                (Role::TertiaryLighter, Variant::Lighter),
                (Role::TertiaryDarker, Variant::Darker),
            ],
            Family::Accent => &[
                (Role::AccentLight, Variant::Light),
                (Role::AccentDark, Variant::Dark),
                (Role::AccentLighter, Variant::Lighter),
                (Role::AccentDarker, Variant::Darker),
            ],
            Family::Error => &[
                (Role::ErrorLight, Variant::Light),
                (Role::ErrorDark, Variant::Dark),
            ],
            Family::Notice => &[
                (Role::NoticeLight, Variant::Light),
                (Role::NoticeDark, Variant::Dark),
            ],
            Family::Success => &[
                (Role::SuccessLight, Variant::Light),
                (Role::SuccessDark, Variant::Dark),
            ],
        };
        roles.iter().copied()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Family::Accent => "accent",
            Family::Primary => "primary",
            Family::Secondary => "secondary",
            Family::Tertiary => "tertiary",
            Family::Error => "error",
            Family::Notice => "notice",
            Family::Success => "success",
        }
    }
}

/// A test against a normalized slug.
#[derive(Debug, Clone, Copy)]
enum SlugPattern {
    /// Contains the fragment.
    Contains(&'static str),
    /// Contains `<alias><suffix>`.
    Suffixed(&'static str, &'static str),
    /// Contains `<alias><suffix>` but not `<alias><excluded>`.
    SuffixedExcept(&'static str, &'static str, &'static str),
    /// Contains the fragment and neither `light` nor `dark`.
    Bare(&'static str),
}

impl SlugPattern {
    fn matches(self, slug: &str) -> bool {
        match self {
            SlugPattern::Contains(fragment) => slug.contains(fragment),
            SlugPattern::Suffixed(alias, suffix) => contains_joined(slug, alias, suffix),
            SlugPattern::SuffixedExcept(alias, suffix, excluded) => {
                contains_joined(slug, alias, suffix) && !contains_joined(slug, alias, excluded)
            }
            SlugPattern::Bare(fragment) => {
                slug.contains(fragment) && !slug.contains("light") && !slug.contains("dark")
            }
        }
    }
}

fn contains_joined(slug: &str, alias: &str, suffix: &str) -> bool {
    slug.match_indices(alias)
        .any(|(i, _)| slug[i + alias.len()..].starts_with(suffix))
}

/// Patterns for a role, most specific first.
fn patterns(role: Role) -> Vec<SlugPattern> {
    use SlugPattern::{Bare, Contains, Suffixed, SuffixedExcept};
    match role {
        Role::BaseLight => vec![Contains("base-light"), Bare("base"), Bare("background")],
        Role::BaseDark => vec![Contains("base-dark"), Contains("background-dark")],
        Role::TextOnLight => vec![Contains("text-on-light"), Bare("contrast"), Bare("foreground")],
        Role::TextOnDark => vec![
            Contains("text-on-dark"),
            Contains("contrast-light"),
            Contains("foreground-light"),
        ],
        _ => {
            let Some(family) = role.family() else {
                return Vec::new();
            };
            let Some(variant) = family
                .roles()
                .find_map(|(r, v)| (r == role).then_some(v))
            else {
                return Vec::new();
            };
            let mut out = Vec::new();
            for &alias in family.aliases() {
                match variant {
                    Variant::Lighter => out.push(Suffixed(alias, "-lighter")),
                    Variant::Light => out.push(SuffixedExcept(alias, "-light", "-lighter")),
                    Variant::Dark => out.push(SuffixedExcept(alias, "-dark", "-darker")),
                    Variant::Darker => out.push(Suffixed(alias, "-darker")),
                }
            }
            if matches!(variant, Variant::Lighter) {
                out.extend(family.aliases().iter().map(|&a| Suffixed(a, "-light")));
            }
            if matches!(variant, Variant::Darker) {
                out.extend(family.aliases().iter().map(|&a| Suffixed(a, "-dark")));
            }
            out.extend(family.aliases().iter().map(|&a| Bare(a)));
            out
        }
    }
}

/// How a role got its color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSource {
    /// A palette slug named the role.
    Slug(String),
    /// Derived by luminance (base roles) or contrast (text roles).
    Derived(String),
    /// The theme's button background.
    Button,
    /// Taken from the queue of unconsumed palette colors.
    Pool(String),
    /// Reused after the queue ran dry.
    Cycled(String),
    Placeholder,
}

/// The resolved color of every role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMap {
    colors: [String; Role::COUNT],
}

impl RoleMap {
    /// A map with every role set to `color`.
    pub fn filled(color: &str) -> Self {
        Self {
            colors: std::array::from_fn(|_| color.to_string()),
        }
    }

    pub fn get(&self, role: Role) -> &str {
        &self.colors[role.index()]
    }

    pub fn set(&mut self, role: Role, color: impl Into<String>) {
        self.colors[role.index()] = color.into();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &str)> {
        Role::ALL.into_iter().map(|role| (role, self.get(role)))
    }
}

impl std::ops::Index<Role> for RoleMap {
    type Output = str;

    fn index(&self, role: Role) -> &str {
        self.get(role)
    }
}

impl Serialize for RoleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Role::COUNT))?;
        for (role, color) in self.iter() {
            map.serialize_entry(role.as_str(), color)?;
        }
        map.end()
    }
}

/// The result of [`assign_roles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub roles: RoleMap,
    sources: Vec<RoleSource>,
}

impl RoleAssignment {
    pub fn source(&self, role: Role) -> &RoleSource {
        &self.sources[role.index()]
    }

    /// Roles that hold the placeholder.
    pub fn placeholder_count(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s, RoleSource::Placeholder))
            .count()
    }
}

/// A color chosen for a role, before it is written to the map.
#[derive(Debug, Clone)]
struct Pick {
    color: String,
    rgba: Rgba,
    source: RoleSource,
}

impl Pick {
    fn from_entry(c: &UsableColor<'_>, source: RoleSource) -> Self {
        Self {
            color: c.color.to_string(),
            rgba: c.rgba,
            source,
        }
    }
}

/// Fills every role from `palette`.
///
/// `button` is the theme's resolved button background; it seeds the accent
/// family when it is opaque. `placeholder` fills roles when the palette has no
/// usable colors.
pub fn assign_roles(
    palette: &NormalizedPalette,
    button: Option<&ResolvedColor>,
    placeholder: &str,
) -> RoleAssignment {
    let pool: Vec<UsableColor<'_>> = palette.usable().collect();
    if pool.is_empty() {
        warn!(error = %ColorError::EmptyPalette, "Falling back to placeholders");
    }

    let mut picks: Vec<Option<Pick>> = vec![None; Role::COUNT];
    let mut consumed: HashSet<usize> = HashSet::new();

    // 1. Slug matches.
    for role in Role::ALL {
        let found = patterns(role).into_iter().find_map(|pattern| {
            pool.iter()
                .find(|c| pattern.matches(&c.entry.normalized_slug))
        });
        if let Some(c) = found {
            trace!(role = %role, palette.slug = %c.entry.slug, "Role matched by slug");
            consumed.insert(c.entry.index);
            picks[role.index()] = Some(Pick::from_entry(c, RoleSource::Slug(c.entry.slug.clone())));
        }
    }

    // 2. Base and text roles.
    derive_base_and_text(&pool, &mut picks, &mut consumed);

    // 3. One seed per family from the queue.
    let mut queue: VecDeque<&UsableColor<'_>> = pool
        .iter()
        .filter(|c| !consumed.contains(&c.entry.index))
        .collect();
    // The button only counts when it will actually seed an open accent role.
    let button = button.filter(|b| {
        b.rgba.is_opaque()
            && Family::Accent
                .roles()
                .any(|(role, _)| picks[role.index()].is_none())
    });
    if let Some(button) = button {
        queue.retain(|c| c.rgba != button.rgba);
    }

    let mut handed_out: Vec<Pick> = Vec::new();
    let mut starved: Vec<Family> = Vec::new();
    for family in Family::ALL {
        let open: Vec<Role> = family
            .roles()
            .map(|(role, _)| role)
            .filter(|role| picks[role.index()].is_none())
            .collect();
        if open.is_empty() {
            continue;
        }
        let seed = match (family, button) {
            (Family::Accent, Some(button)) => Some(Pick {
                color: button.value.clone(),
                rgba: button.rgba,
                source: RoleSource::Button,
            }),
            _ => queue
                .pop_front()
                .map(|c| Pick::from_entry(c, RoleSource::Pool(c.entry.slug.clone()))),
        };
        match seed {
            Some(seed) => {
                trace!(family = family.as_str(), color = %seed.color, "Family seeded");
                for role in open {
                    picks[role.index()] = Some(seed.clone());
                }
                handed_out.push(seed);
            }
            None => starved.push(family),
        }
    }

    // 4. Cycle through what was handed out, or the whole pool if nothing was.
    let cycle: Vec<(String, Rgba, String)> = if handed_out.is_empty() {
        pool.iter()
            .map(|c| (c.color.to_string(), c.rgba, c.entry.slug.clone()))
            .collect()
    } else {
        handed_out
            .iter()
            .map(|p| {
                let origin = match &p.source {
                    RoleSource::Pool(slug) => slug.clone(),
                    _ => "button".to_string(),
                };
                (p.color.clone(), p.rgba, origin)
            })
            .collect()
    };
    let mut next = 0usize;
    for family in starved {
        let Some((color, rgba, origin)) = cycle.get(next % cycle.len().max(1)) else {
            break;
        };
        next += 1;
        debug!(family = family.as_str(), color = %color, "Reusing color for family");
        let pick = Pick {
            color: color.clone(),
            rgba: *rgba,
            source: RoleSource::Cycled(origin.clone()),
        };
        for (role, _) in family.roles() {
            if picks[role.index()].is_none() {
                picks[role.index()] = Some(pick.clone());
            }
        }
    }

    // 5. Placeholder.
    let mut roles = RoleMap::filled(placeholder);
    let mut sources = vec![RoleSource::Placeholder; Role::COUNT];
    for role in Role::ALL {
        match picks[role.index()].take() {
            Some(pick) => {
                roles.set(role, pick.color);
                sources[role.index()] = pick.source;
            }
            None => debug!(role = %role, "Role filled with placeholder"),
        }
    }
    RoleAssignment { roles, sources }
}

/// Derives unmatched base roles by luminance and unmatched text roles by
/// contrast against their base.
fn derive_base_and_text(
    pool: &[UsableColor<'_>],
    picks: &mut [Option<Pick>],
    consumed: &mut HashSet<usize>,
) {
    if pool.is_empty() {
        return;
    }

    if picks[Role::BaseLight.index()].is_none() {
        // Among equally bright colors the last one wins, as at the top of a
        // stable ascending sort.
        let brightest = pool.iter().fold(&pool[0], |best, c| {
            if c.rgba.luminance() >= best.rgba.luminance() { c } else { best }
        });
        consumed.insert(brightest.entry.index);
        trace!(palette.slug = %brightest.entry.slug, "Derived baseLight");
        picks[Role::BaseLight.index()] = Some(Pick::from_entry(
            brightest,
            RoleSource::Derived(brightest.entry.slug.clone()),
        ));
    }
    if picks[Role::BaseDark.index()].is_none() {
        let darkest = pool.iter().fold(&pool[0], |best, c| {
            if c.rgba.luminance() < best.rgba.luminance() { c } else { best }
        });
        consumed.insert(darkest.entry.index);
        trace!(palette.slug = %darkest.entry.slug, "Derived baseDark");
        picks[Role::BaseDark.index()] = Some(Pick::from_entry(
            darkest,
            RoleSource::Derived(darkest.entry.slug.clone()),
        ));
    }

    for (text, base) in [
        (Role::TextOnLight, Role::BaseLight),
        (Role::TextOnDark, Role::BaseDark),
    ] {
        if picks[text.index()].is_some() {
            continue;
        }
        let Some(base_rgba) = picks[base.index()].as_ref().map(|p| p.rgba) else {
            continue;
        };
        let remaining: Vec<&UsableColor<'_>> = pool
            .iter()
            .filter(|c| !consumed.contains(&c.entry.index))
            .collect();
        let candidates: Vec<&UsableColor<'_>> = if remaining.is_empty() {
            pool.iter().collect()
        } else {
            remaining
        };
        let mut best: Option<(&UsableColor<'_>, f64)> = None;
        for c in candidates {
            let ratio = contrast_ratio(base_rgba, c.rgba);
            if best.is_none_or(|(_, r)| ratio > r) {
                best = Some((c, ratio));
            }
        }
        if let Some((c, ratio)) = best {
            consumed.insert(c.entry.index);
            trace!(role = %text, palette.slug = %c.entry.slug, contrast = ratio, "Derived text role");
            picks[text.index()] = Some(Pick::from_entry(c, RoleSource::Derived(c.entry.slug.clone())));
        }
    }
}
