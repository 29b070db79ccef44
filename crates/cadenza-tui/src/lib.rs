//! Cadenza widget toolkit.
//!
//! A small retained-mode UI layer for terminal applications, built for the
//! Cadenza music-daemon client:
//!
//! - **Window layer**: a widget tree with geometry, visibility, focus
//!   delegation and repaint scheduling ([`window`])
//! - **List stack**: a virtualized, viewport-scrolled list view with
//!   current-item tracking and multi-selection ([`model`], [`item_view`],
//!   [`list_view`])
//! - **Rich text**: an HTML-subset tokenizer and a word-wrapping compiler
//!   behind a scrollable text view ([`html`], [`text_view`])
//! - **Painting**: an offscreen cell surface per window with a painter
//!   facade and a finite color-pair pool ([`surface`], [`painter`])
//! - **Theming**: per-class palettes resolved from JSON color schemes
//!   ([`palette`], [`scheme`])
//! - **Formats**: the display-format mini-language for song lines
//!   ([`format`])
//!
//! The toolkit is single-threaded and event-loop driven; all blocking I/O
//! lives outside. See the `cadenza` binary crate for the dispatcher loop.

pub mod color;
pub mod error;
pub mod event;
pub mod format;
pub mod geometry;
pub mod html;
pub mod item_view;
pub mod list_view;
pub mod model;
pub mod painter;
pub mod palette;
pub mod scheme;
pub mod surface;
pub mod text_view;
pub mod window;

pub use color::{Attributes, TermColor};
pub use error::{FormatError, PaintError, ResizeError, Result, SchemeError, TuiError};
pub use event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
pub use format::{parse_format, FormatSpec};
pub use geometry::{Point, Rect, Size};
pub use item_view::{ItemView, Repaint};
pub use list_view::ListView;
pub use model::{ListModel, VecModel};
pub use painter::Painter;
pub use palette::{ColorGroup, ColorRole, Palette, PaletteCache};
pub use scheme::Scheme;
pub use surface::{ColorPairPool, Surface};
pub use text_view::{TextMode, TextView};
pub use window::{flush_tree, paint_tree, Panel, StackPanel, Widget, WindowBase};
