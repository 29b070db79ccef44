//! Color-scheme files.
//!
//! A scheme is a JSON tree keyed by window class name. Each class carries an
//! `active` and an `inactive` table mapping role names to color names from
//! the fixed eight-color table:
//!
//! ```json
//! {
//!     "PlaylistView": {
//!         "active":   { "text": "white", "selection": "cyan" },
//!         "inactive": { "text": "blue" }
//!     }
//! }
//! ```
//!
//! A malformed scheme is a fatal startup error and is never partially
//! applied.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::SchemeError;

/// Per-class color overrides, one table per color group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassScheme {
    /// Role name → color name while the window has focus.
    #[serde(default)]
    pub active: HashMap<String, String>,
    /// Role name → color name while it does not.
    #[serde(default)]
    pub inactive: HashMap<String, String>,
}

/// A parsed color scheme: class name → overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Scheme {
    classes: HashMap<String, ClassScheme>,
}

impl Scheme {
    /// An empty scheme: every class keeps its defaults.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load and parse a scheme file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SchemeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|err| SchemeError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Parse a scheme from a JSON string (used by tests and embedded
    /// defaults).
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The overrides for `class`, if the scheme mentions it.
    pub fn class(&self, class: &str) -> Option<&ClassScheme> {
        self.classes.get(class)
    }
}
