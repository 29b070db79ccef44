//! Window palettes.
//!
//! A palette is a flat table of colors indexed by color group (whether the
//! window is active) and role (what the color is for). Palettes are created
//! once per window class name and shared: the first window of a class
//! resolves its palette through [`PaletteCache::palette_for_class`], and
//! later windows of the same class reuse the cached instance.
//!
//! Resolution layers, in order: the shared default palette, an inherited
//! palette handed down by the caller, and the class's entry in the loaded
//! color [`Scheme`]. Unrecognized color names in a scheme leave the prior
//! value untouched.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::color::TermColor;
use crate::scheme::Scheme;

/// Whether colors are resolved for a focused or unfocused window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorGroup {
    /// The window (or its top-level ancestor) has focus.
    Active,
    /// It does not.
    Inactive,
}

impl ColorGroup {
    const ALL: [ColorGroup; 2] = [ColorGroup::Active, ColorGroup::Inactive];

    fn index(self) -> usize {
        match self {
            Self::Active => 0,
            Self::Inactive => 1,
        }
    }
}

/// Semantic color slots every widget understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    /// Ordinary foreground text.
    Text,
    /// Window background.
    Background,
    /// Selected items.
    Selection,
    /// The current/highlighted item's background.
    Highlight,
    /// Text on top of the highlight.
    HighlightedText,
}

impl ColorRole {
    /// The standard role set, in scheme order.
    pub const STANDARD: [ColorRole; 5] = [
        ColorRole::Text,
        ColorRole::Background,
        ColorRole::Selection,
        ColorRole::Highlight,
        ColorRole::HighlightedText,
    ];

    fn index(self) -> usize {
        match self {
            Self::Text => 0,
            Self::Background => 1,
            Self::Selection => 2,
            Self::Highlight => 3,
            Self::HighlightedText => 4,
        }
    }

    /// Look up a standard role by its scheme-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "background" => Some(Self::Background),
            "selection" => Some(Self::Selection),
            "highlight" => Some(Self::Highlight),
            "highlighted-text" => Some(Self::HighlightedText),
            _ => None,
        }
    }
}

/// A color table for one window class.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    /// Standard roles, `[group][role]`.
    standard: [[Option<TermColor>; 5]; 2],
    /// Caller-defined extra roles, keyed by role name.
    extra: HashMap<(ColorGroup, String), TermColor>,
}

impl Palette {
    /// An empty palette: every lookup falls through to the caller's default.
    pub fn new() -> Self {
        Self::default()
    }

    /// The color for `(group, role)`, if one is set.
    pub fn color(&self, group: ColorGroup, role: ColorRole) -> Option<TermColor> {
        self.standard[group.index()][role.index()]
    }

    /// The color for `(group, role)`, or `default` when unset.
    pub fn color_or(&self, group: ColorGroup, role: ColorRole, default: TermColor) -> TermColor {
        self.color(group, role).unwrap_or(default)
    }

    /// Set the color for a standard role.
    pub fn set_color(&mut self, group: ColorGroup, role: ColorRole, color: TermColor) {
        self.standard[group.index()][role.index()] = Some(color);
    }

    /// The color of a caller-defined extra role, if set.
    pub fn extra_color(&self, group: ColorGroup, role: &str) -> Option<TermColor> {
        self.extra.get(&(group, role.to_string())).copied()
    }

    /// Set the color of a caller-defined extra role.
    pub fn set_extra_color(&mut self, group: ColorGroup, role: &str, color: TermColor) {
        self.extra.insert((group, role.to_string()), color);
    }

    /// Apply a class's scheme overrides on top of this palette.
    ///
    /// Standard roles are matched by name; names listed in `extra_roles` go
    /// to the extra table; anything else is ignored. Color names not in the
    /// eight-color table leave the prior value untouched.
    fn apply_scheme(&mut self, class: &crate::scheme::ClassScheme, extra_roles: &[&str]) {
        for group in ColorGroup::ALL {
            let table = match group {
                ColorGroup::Active => &class.active,
                ColorGroup::Inactive => &class.inactive,
            };
            for (role_name, color_name) in table {
                let Some(color) = TermColor::from_name(color_name) else {
                    continue;
                };
                if let Some(role) = ColorRole::from_name(role_name) {
                    self.set_color(group, role, color);
                } else if extra_roles.contains(&role_name.as_str()) {
                    self.set_extra_color(group, role_name, color);
                }
            }
        }
    }
}

/// Per-class palette resolution and caching.
///
/// Owned by the application context and consulted by every window on
/// construction.
pub struct PaletteCache {
    scheme: Scheme,
    by_class: Mutex<HashMap<String, Arc<Palette>>>,
    shared_default: Arc<Palette>,
}

impl PaletteCache {
    /// Create a cache over a loaded scheme.
    pub fn new(scheme: Scheme) -> Self {
        Self {
            scheme,
            by_class: Mutex::new(HashMap::new()),
            shared_default: Arc::new(Palette::new()),
        }
    }

    /// Resolve the palette for a window class.
    ///
    /// - Class already resolved: the cached instance is returned.
    /// - No scheme entry for the class: the `inherited` palette is returned
    ///   unchanged, or the shared default when none was supplied.
    /// - Scheme entry present: the inherited palette (or a fresh default) is
    ///   cloned, the class's overrides are applied for both color groups and
    ///   for both the standard and `extra_roles` slots, and the result is
    ///   cached under the class name.
    pub fn palette_for_class(
        &self,
        class: &str,
        inherited: Option<&Arc<Palette>>,
        extra_roles: &[&str],
    ) -> Arc<Palette> {
        if let Some(cached) = self.by_class.lock().get(class) {
            return cached.clone();
        }

        let Some(class_scheme) = self.scheme.class(class) else {
            return inherited.cloned().unwrap_or_else(|| self.shared_default.clone());
        };

        let mut palette = inherited
            .map(|p| Palette::clone(p))
            .unwrap_or_default();
        palette.apply_scheme(class_scheme, extra_roles);

        let palette = Arc::new(palette);
        self.by_class
            .lock()
            .insert(class.to_string(), palette.clone());
        palette
    }
}
