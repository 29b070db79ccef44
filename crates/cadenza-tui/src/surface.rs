//! Offscreen cell surfaces and the color-pair pool.
//!
//! Every window paints into its own [`Surface`]: a rectangular buffer of
//! cells positioned somewhere on the terminal screen. Flushing a surface
//! writes its cells to the backend with the minimum of cursor movement;
//! nothing touches the terminal until then.
//!
//! Colors are applied as (foreground, background) pairs drawn from a shared
//! [`ColorPairPool`]. The pool allocates pairs lazily and caches them; it is
//! finite, and exhaustion is an error the caller must treat as fatal.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{
        Attribute as CtAttribute, Print, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor,
    },
};
use parking_lot::Mutex;

use crate::color::{Attributes, TermColor};
use crate::error::PaintError;
use crate::geometry::{Point, Rect, Size};

/// Identifier of an allocated color pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairId(pub(crate) u16);

/// Lazily allocated, cached (foreground, background) combinations.
///
/// Mirrors the finite pair table of a curses backend: the first request for
/// a combination allocates a slot, later requests reuse it, and a full pool
/// reports [`PaintError::ColorPairsExhausted`].
pub struct ColorPairPool {
    inner: Mutex<PoolInner>,
    capacity: usize,
}

struct PoolInner {
    pairs: Vec<(TermColor, TermColor)>,
    index: HashMap<(TermColor, TermColor), PairId>,
}

impl ColorPairPool {
    /// Default pool capacity, matching a conventional curses pair table.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Create a pool with the default capacity. Pair 0 is always the
    /// terminal default-on-default combination.
    pub fn new() -> Arc<Self> {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a pool with an explicit capacity (minimum 1 for the default
    /// pair).
    pub fn with_capacity(capacity: usize) -> Arc<Self> {
        let mut index = HashMap::new();
        index.insert((TermColor::Default, TermColor::Default), PairId(0));
        Arc::new(Self {
            inner: Mutex::new(PoolInner {
                pairs: vec![(TermColor::Default, TermColor::Default)],
                index,
            }),
            capacity: capacity.max(1),
        })
    }

    /// Get or allocate the pair for `(fg, bg)`.
    pub fn pair(&self, fg: TermColor, bg: TermColor) -> Result<PairId, PaintError> {
        let mut inner = self.inner.lock();
        if let Some(&id) = inner.index.get(&(fg, bg)) {
            return Ok(id);
        }
        if inner.pairs.len() >= self.capacity {
            return Err(PaintError::ColorPairsExhausted {
                capacity: self.capacity,
            });
        }
        let id = PairId(inner.pairs.len() as u16);
        inner.pairs.push((fg, bg));
        inner.index.insert((fg, bg), id);
        Ok(id)
    }

    /// The colors of an allocated pair.
    pub fn colors(&self, id: PairId) -> (TermColor, TermColor) {
        let inner = self.inner.lock();
        inner
            .pairs
            .get(id.0 as usize)
            .copied()
            .unwrap_or((TermColor::Default, TermColor::Default))
    }

    /// Number of pairs allocated so far.
    pub fn allocated(&self) -> usize {
        self.inner.lock().pairs.len()
    }
}

/// One screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cell {
    /// The character occupying the cell. `'\0'` marks the continuation
    /// cell of a preceding double-width character.
    pub symbol: char,
    pub pair: PairId,
    pub attrs: Attributes,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: ' ',
            pair: PairId(0),
            attrs: Attributes::empty(),
        }
    }
}

/// A window's offscreen buffer of cells at an absolute screen position.
pub struct Surface {
    inner: Mutex<SurfaceInner>,
    pool: Arc<ColorPairPool>,
    /// Guard enforcing a single live painter per surface.
    painter_active: AtomicBool,
}

pub(crate) struct SurfaceInner {
    pub origin: Point,
    pub size: Size,
    pub cells: Vec<Cell>,
}

impl SurfaceInner {
    pub fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.size.cols as usize + x as usize
    }
}

impl Surface {
    /// Create a surface covering `rect` on the screen, sharing `pool`.
    pub fn new(rect: Rect, pool: Arc<ColorPairPool>) -> Self {
        let cell_count = rect.size.cols as usize * rect.size.lines as usize;
        Self {
            inner: Mutex::new(SurfaceInner {
                origin: rect.origin,
                size: rect.size,
                cells: vec![Cell::default(); cell_count],
            }),
            pool,
            painter_active: AtomicBool::new(false),
        }
    }

    /// The shared color-pair pool.
    pub fn pool(&self) -> &Arc<ColorPairPool> {
        &self.pool
    }

    /// The surface's size in cells.
    pub fn size(&self) -> Size {
        self.inner.lock().size
    }

    /// The surface's absolute screen origin.
    pub fn origin(&self) -> Point {
        self.inner.lock().origin
    }

    /// Recreate the buffer at a new position and size, clearing content.
    ///
    /// Called on window resize and move; the window repaints afterwards.
    pub fn recreate(&self, rect: Rect) {
        let mut inner = self.inner.lock();
        inner.origin = rect.origin;
        inner.size = rect.size;
        let cell_count = rect.size.cols as usize * rect.size.lines as usize;
        inner.cells = vec![Cell::default(); cell_count];
    }

    pub(crate) fn lock(&self) -> parking_lot::MutexGuard<'_, SurfaceInner> {
        self.inner.lock()
    }

    pub(crate) fn acquire_painter(&self) -> Result<(), PaintError> {
        if self.painter_active.swap(true, Ordering::SeqCst) {
            return Err(PaintError::PainterActive);
        }
        Ok(())
    }

    pub(crate) fn release_painter(&self) {
        self.painter_active.store(false, Ordering::SeqCst);
    }

    /// The visible text of row `y`, continuation cells elided and trailing
    /// blanks trimmed. Test and debugging aid.
    pub fn row_text(&self, y: u16) -> String {
        let inner = self.inner.lock();
        if y >= inner.size.lines {
            return String::new();
        }
        let mut text: String = (0..inner.size.cols)
            .map(|x| inner.cells[inner.index(x, y)].symbol)
            .filter(|&symbol| symbol != '\0')
            .collect();
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
        text
    }

    /// Write the surface's cells to `out` as terminal commands.
    ///
    /// Attributes and colors are re-emitted only when they change between
    /// consecutive cells.
    pub fn flush_to(&self, out: &mut impl Write) -> std::io::Result<()> {
        let inner = self.inner.lock();
        let mut current_pair: Option<PairId> = None;
        let mut current_attrs = Attributes::empty();

        for y in 0..inner.size.lines {
            let screen_x = inner.origin.x.max(0) as u16;
            let screen_y = (inner.origin.y + y as i32).max(0) as u16;
            queue!(out, MoveTo(screen_x, screen_y))?;

            for x in 0..inner.size.cols {
                let cell = inner.cells[inner.index(x, y)];
                if cell.symbol == '\0' {
                    continue; // covered by the preceding wide character
                }
                if current_pair != Some(cell.pair) {
                    let (fg, bg) = self.pool.colors(cell.pair);
                    queue!(out, ResetColor)?;
                    if fg != TermColor::Default {
                        queue!(out, SetForegroundColor(fg.to_crossterm()))?;
                    }
                    if bg != TermColor::Default {
                        queue!(out, SetBackgroundColor(bg.to_crossterm()))?;
                    }
                    current_pair = Some(cell.pair);
                }
                if current_attrs != cell.attrs {
                    queue!(out, SetAttribute(CtAttribute::Reset))?;
                    if cell.attrs.contains(Attributes::BOLD) {
                        queue!(out, SetAttribute(CtAttribute::Bold))?;
                    }
                    if cell.attrs.contains(Attributes::UNDERLINE) {
                        queue!(out, SetAttribute(CtAttribute::Underlined))?;
                    }
                    if cell.attrs.contains(Attributes::BLINK) {
                        queue!(out, SetAttribute(CtAttribute::SlowBlink))?;
                    }
                    if cell.attrs.contains(Attributes::REVERSE) {
                        queue!(out, SetAttribute(CtAttribute::Reverse))?;
                    }
                    // Attribute reset also clears colors.
                    current_pair = None;
                    current_attrs = cell.attrs;
                }
                queue!(out, Print(cell.symbol))?;
            }
        }
        queue!(out, SetAttribute(CtAttribute::Reset), ResetColor)?;
        out.flush()
    }
}

static_assertions::assert_impl_all!(Surface: Send, Sync);
