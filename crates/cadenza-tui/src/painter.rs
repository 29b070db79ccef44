//! The painting facade widgets draw through.
//!
//! A [`Painter`] borrows a window's [`Surface`] for the duration of one
//! paint pass: move the cursor, set colors and attributes, print bounded
//! text. Exactly one painter may be live against a surface at a time;
//! constructing a second is a programming error and is rejected.
//!
//! All output is clipped to the surface. Printing is budgeted in display
//! columns and never splits a double-width character in half: a character
//! that does not fit within the remaining budget ends the print.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::color::{Attributes, TermColor};
use crate::error::PaintError;
use crate::surface::{PairId, Surface};

/// Ellipsis symbol appended by [`Painter::squeezed_print`].
const ELLIPSIS: char = '…';

/// Paints into one window surface.
///
/// Created per paint pass via [`Painter::new`]; dropping it releases the
/// surface for the next pass.
pub struct Painter<'a> {
    surface: &'a Surface,
    x: u16,
    y: u16,
    fg: TermColor,
    bg: TermColor,
    pair: PairId,
    attrs: Attributes,
}

impl<'a> Painter<'a> {
    /// Begin painting `surface`.
    ///
    /// Fails with [`PaintError::PainterActive`] if another painter is
    /// currently live against the same surface.
    pub fn new(surface: &'a Surface) -> Result<Self, PaintError> {
        surface.acquire_painter()?;
        Ok(Self {
            surface,
            x: 0,
            y: 0,
            fg: TermColor::Default,
            bg: TermColor::Default,
            pair: PairId::default(),
            attrs: Attributes::empty(),
        })
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    /// Move the cursor to `(x, y)` in surface-local cells.
    pub fn move_to(&mut self, x: u16, y: u16) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    /// The cursor's current column.
    pub fn x(&self) -> u16 {
        self.x
    }

    /// The cursor's current line.
    pub fn y(&self) -> u16 {
        self.y
    }

    // =========================================================================
    // Attributes and colors
    // =========================================================================

    /// Enable or disable bold.
    pub fn set_bold(&mut self, on: bool) -> &mut Self {
        self.attrs.set(Attributes::BOLD, on);
        self
    }

    /// Enable or disable underline.
    pub fn set_underline(&mut self, on: bool) -> &mut Self {
        self.attrs.set(Attributes::UNDERLINE, on);
        self
    }

    /// Enable or disable blink.
    pub fn set_blink(&mut self, on: bool) -> &mut Self {
        self.attrs.set(Attributes::BLINK, on);
        self
    }

    /// Enable or disable reverse video.
    pub fn set_reverse(&mut self, on: bool) -> &mut Self {
        self.attrs.set(Attributes::REVERSE, on);
        self
    }

    /// Replace the whole attribute mask.
    pub fn set_attributes(&mut self, attrs: Attributes) -> &mut Self {
        self.attrs = attrs;
        self
    }

    /// Set the foreground color, keeping the background.
    pub fn set_foreground(&mut self, fg: TermColor) -> Result<&mut Self, PaintError> {
        self.set_colors(fg, self.bg)
    }

    /// Set the background color, keeping the foreground.
    pub fn set_background(&mut self, bg: TermColor) -> Result<&mut Self, PaintError> {
        self.set_colors(self.fg, bg)
    }

    /// Set both colors at once.
    ///
    /// Pairs are allocated lazily from the surface's shared pool; a full
    /// pool surfaces [`PaintError::ColorPairsExhausted`].
    pub fn set_colors(&mut self, fg: TermColor, bg: TermColor) -> Result<&mut Self, PaintError> {
        self.pair = self.surface.pool().pair(fg, bg)?;
        self.fg = fg;
        self.bg = bg;
        Ok(self)
    }

    // =========================================================================
    // Clearing
    // =========================================================================

    /// Clear the whole surface to blanks with the current colors.
    pub fn clear(&mut self) -> &mut Self {
        let size = self.surface.size();
        for y in 0..size.lines {
            self.clear_line(y);
        }
        self
    }

    /// Clear line `y` to blanks with the current colors.
    pub fn clear_line(&mut self, y: u16) -> &mut Self {
        let mut inner = self.surface.lock();
        if y >= inner.size.lines {
            return self;
        }
        for x in 0..inner.size.cols {
            let idx = inner.index(x, y);
            inner.cells[idx] = crate::surface::Cell {
                symbol: ' ',
                pair: self.pair,
                attrs: Attributes::empty(),
            };
        }
        self
    }

    // =========================================================================
    // Printing
    // =========================================================================

    /// Print a single character at the cursor, advancing it.
    pub fn print_char(&mut self, symbol: char) -> &mut Self {
        self.put(symbol);
        self
    }

    /// Print `text` at the cursor, clipped to the surface's right edge.
    pub fn print(&mut self, text: &str) -> &mut Self {
        let cols = self.surface.size().cols;
        let budget = cols.saturating_sub(self.x.min(cols));
        self.print_bounded(text, budget)
    }

    /// Print `text` bounded by `budget` display columns.
    ///
    /// A character whose width exceeds the remaining budget ends the print;
    /// double-width characters are never cut in half.
    pub fn print_bounded(&mut self, text: &str, budget: u16) -> &mut Self {
        let mut remaining = budget as usize;
        for grapheme in text.graphemes(true) {
            let width = grapheme.width();
            if width > remaining {
                break;
            }
            if let Some(symbol) = grapheme.chars().next() {
                self.put(symbol);
            }
            remaining -= width;
        }
        self
    }

    /// Print `text` within `budget` columns, truncating with a trailing
    /// ellipsis when it does not fit.
    pub fn squeezed_print(&mut self, text: &str, budget: u16) -> &mut Self {
        if text.width() <= budget as usize {
            return self.print_bounded(text, budget);
        }
        if budget == 0 {
            return self;
        }
        self.print_bounded(text, budget - 1);
        self.put(ELLIPSIS);
        self
    }

    /// Draw a horizontal run of `symbol`, `len` cells long, from the cursor.
    pub fn hline(&mut self, symbol: char, len: u16) -> &mut Self {
        let (x, y) = (self.x, self.y);
        for i in 0..len {
            self.move_to(x + i, y);
            self.put(symbol);
        }
        self.move_to(x, y);
        self
    }

    /// Draw a vertical run of `symbol`, `len` cells long, from the cursor.
    pub fn vline(&mut self, symbol: char, len: u16) -> &mut Self {
        let (x, y) = (self.x, self.y);
        for i in 0..len {
            self.move_to(x, y + i);
            self.put(symbol);
        }
        self.move_to(x, y);
        self
    }

    /// Write the surface to `out` as terminal commands.
    pub fn flush_to(&self, out: &mut impl std::io::Write) -> std::io::Result<()> {
        self.surface.flush_to(out)
    }

    /// Write `symbol` at the cursor and advance by its display width.
    fn put(&mut self, symbol: char) {
        let width = symbol.width().unwrap_or(0).max(1) as u16;
        let mut inner = self.surface.lock();
        if self.y >= inner.size.lines || self.x.saturating_add(width) > inner.size.cols {
            return;
        }
        let idx = inner.index(self.x, self.y);
        inner.cells[idx] = crate::surface::Cell {
            symbol,
            pair: self.pair,
            attrs: self.attrs,
        };
        // Mark the shadow cell of a double-width character.
        for extra in 1..width {
            let idx = inner.index(self.x + extra, self.y);
            inner.cells[idx] = crate::surface::Cell {
                symbol: '\0',
                pair: self.pair,
                attrs: self.attrs,
            };
        }
        self.x += width;
    }
}

impl Drop for Painter<'_> {
    fn drop(&mut self) {
        self.surface.release_painter();
    }
}
