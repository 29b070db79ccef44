//! Error types for the toolkit.
//!
//! Two tiers, per the toolkit's error model: configuration errors
//! ([`SchemeError`], [`FormatError`]) are fatal at startup and carry
//! descriptive, position-annotated messages; interactive errors
//! ([`ResizeError`], [`PaintError`]) are raised at the point of violation
//! and either guarded against by callers or propagated up as fatal.

use std::path::PathBuf;

use crate::geometry::Size;

/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, TuiError>;

/// Aggregate error type for toolkit operations.
#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    /// Window geometry violation.
    #[error(transparent)]
    Resize(#[from] ResizeError),

    /// Painting/surface violation.
    #[error(transparent)]
    Paint(#[from] PaintError),

    /// Color-scheme loading failure.
    #[error(transparent)]
    Scheme(#[from] SchemeError),

    /// Display-format string failure.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Errors raised by `resize` when the requested size violates the window's
/// bounds. The window's size is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResizeError {
    /// Requested size is below the window's minimum.
    #[error("requested size {requested:?} is below the minimum {min:?}")]
    TooSmall {
        /// The rejected size.
        requested: Size,
        /// The window's minimum size.
        min: Size,
    },

    /// Requested size exceeds the window's maximum.
    #[error("requested size {requested:?} exceeds the maximum {max:?}")]
    TooBig {
        /// The rejected size.
        requested: Size,
        /// The window's maximum size.
        max: Size,
    },
}

/// Errors raised by the painter and surface layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaintError {
    /// A painter is already live against this surface.
    #[error("a painter is already active on this surface")]
    PainterActive,

    /// The finite pool of distinct foreground/background combinations
    /// is used up.
    #[error("color pair pool exhausted ({capacity} pairs)")]
    ColorPairsExhausted {
        /// The pool's fixed capacity.
        capacity: usize,
    },
}

/// Errors raised while loading a color-scheme file. Always fatal at
/// startup; a malformed scheme is never partially applied.
#[derive(Debug, thiserror::Error)]
pub enum SchemeError {
    /// The scheme file could not be read.
    #[error("failed to read color scheme '{path}': {source}")]
    Io {
        /// Path of the scheme file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The scheme file is not valid JSON or has the wrong shape.
    #[error("malformed color scheme '{path}': {message}")]
    Parse {
        /// Path of the scheme file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

/// Error raised when a display-format string fails to parse.
///
/// `position` is the byte offset of the offending character; it is part of
/// the message surfaced to the user as a configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("format string error at position {position}: {message}")]
pub struct FormatError {
    /// Byte offset into the format string.
    pub position: usize,
    /// What went wrong.
    pub message: String,
}

impl FormatError {
    /// Create a format error at the given offset.
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}
