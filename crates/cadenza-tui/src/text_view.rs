//! TextView: rich-text compilation and a scrollable text widget.
//!
//! The compiler consumes the [`crate::html`] token stream and produces
//! word-wrapped display [`Line`]s sized to a fixed column width. Each line
//! is a run of [`Chunk`]s carrying a color and an attribute mask. The whole
//! line list is rebuilt from scratch on every [`TextView::set_text`] and,
//! in rich-text mode, on every resize — wrapping is column-width dependent.
//!
//! Wrap distance is counted in codepoints, not bytes: an entity or a
//! multi-byte character consumes exactly its rendered glyph count.
//!
//! Scrolling is viewport-based over *logical* lines, but a logical line
//! whose content exceeds the column width (preformatted text, plain-text
//! mode) renders across several physical rows; [`TextView::can_scroll_down`]
//! simulates that consumption row by row before letting the viewport
//! advance.

use crate::color::{Attributes, TermColor};
use crate::error::PaintError;
use crate::event::{KeyCode, KeyEvent};
use crate::geometry::Rect;
use crate::html::{self, TagKind, Token};
use crate::painter::Painter;
use crate::palette::{ColorGroup, ColorRole};
use crate::surface::ColorPairPool;
use crate::window::{Widget, WindowBase};

use std::sync::Arc;

/// A styled run of text within one display line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Foreground color (resolved through the `<font>` stack).
    pub color: TermColor,
    /// Attribute mask in effect for this run.
    pub attrs: Attributes,
    /// The text itself.
    pub text: String,
}

/// One compiled display line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// The styled runs making up the line, in order.
    pub chunks: Vec<Chunk>,
}

impl Line {
    /// Total glyph (codepoint) count of the line.
    pub fn glyphs(&self) -> usize {
        self.chunks
            .iter()
            .map(|chunk| chunk.text.chars().count())
            .sum()
    }

    /// Whether the line holds no text at all.
    pub fn is_blank(&self) -> bool {
        self.chunks.iter().all(|chunk| chunk.text.is_empty())
    }

    /// The line's text with styling stripped.
    pub fn text(&self) -> String {
        self.chunks.iter().map(|chunk| chunk.text.as_str()).collect()
    }

    /// Physical rows this line occupies at `width` columns. Compiled
    /// rich-text lines fit in one; preformatted or plain lines may not.
    pub fn physical_rows(&self, width: usize) -> usize {
        if width == 0 {
            return 1;
        }
        self.glyphs().div_ceil(width).max(1)
    }
}

/// How [`TextView::set_text`] interprets its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// Input is shown verbatim, split on newlines, never re-wrapped.
    #[default]
    Plain,
    /// Input is HTML-subset markup, tokenized and word-wrapped.
    Rich,
}

// =============================================================================
// Compiler
// =============================================================================

/// HTML color names resolve through the same fixed eight-color table as
/// everything else; unknown names keep the top of the stack.
fn resolve_font_color(name: &str, stack: &[TermColor]) -> TermColor {
    TermColor::from_name(name).unwrap_or_else(|| *stack.last().unwrap_or(&TermColor::Default))
}

struct Compiler {
    width: usize,
    lines: Vec<Line>,
    /// Glyphs used on the open line.
    used: usize,
    /// Whether the last line may still be appended to. Block-level tags
    /// clear this, forcing the next text onto a fresh line.
    line_open: bool,
    /// Whitespace was seen; a single space goes before the next word.
    pending_space: bool,
    bold: bool,
    underline: bool,
    blink: bool,
    color_stack: Vec<TermColor>,
    /// Nesting depth of `<title>`; content is suppressed while inside.
    title_depth: usize,
    /// Inside `<pre>`: content is emitted per source line, unwrapped.
    preformatted: bool,
}

impl Compiler {
    fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            lines: Vec::new(),
            used: 0,
            line_open: false,
            pending_space: false,
            bold: false,
            underline: false,
            blink: false,
            color_stack: vec![TermColor::Default],
            title_depth: 0,
            preformatted: false,
        }
    }

    fn attrs(&self) -> Attributes {
        let mut attrs = Attributes::empty();
        attrs.set(Attributes::BOLD, self.bold);
        attrs.set(Attributes::UNDERLINE, self.underline);
        attrs.set(Attributes::BLINK, self.blink);
        attrs
    }

    fn color(&self) -> TermColor {
        *self.color_stack.last().unwrap_or(&TermColor::Default)
    }

    /// Append `text` to the open line, assuming the caller already did the
    /// wrap arithmetic.
    fn emit(&mut self, text: &str) {
        if self.lines.is_empty() || !self.line_open {
            self.lines.push(Line::default());
            self.line_open = true;
            self.used = 0;
        }
        self.used += text.chars().count();
        let color = self.color();
        let attrs = self.attrs();
        let line = self.lines.last_mut().unwrap();
        match line.chunks.last_mut() {
            Some(chunk) if chunk.color == color && chunk.attrs == attrs => {
                chunk.text.push_str(text);
            }
            _ => line.chunks.push(Chunk {
                color,
                attrs,
                text: text.to_string(),
            }),
        }
    }

    /// Close the open line; the next emit starts a new one. Breaking an
    /// already-closed line inserts a blank line (`<br><br>` leaves a gap),
    /// except before any content at all.
    fn break_line(&mut self) {
        if self.line_open {
            self.line_open = false;
        } else if !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.used = 0;
        self.pending_space = false;
    }

    /// Force a blank line before the next content, unless the previous
    /// line is already blank.
    fn blank_line(&mut self) {
        if self.line_open {
            self.break_line();
        }
        if self.lines.last().is_some_and(|line| !line.is_blank()) {
            self.lines.push(Line::default());
        }
        self.line_open = false;
    }

    /// Place one whitespace-free word, wrapping as needed. Entity glyphs
    /// adjacent to text arrive as their own word with no pending space and
    /// glue onto the line.
    fn place_word(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        let mut word = word;
        loop {
            let len = word.chars().count();
            let space = usize::from(self.pending_space && self.line_open && self.used > 0);
            if self.line_open && self.used > 0 && self.used + space + len > self.width {
                // Doesn't fit after what's already there: the word starts a
                // new line and the pending space dies with the break.
                self.break_line();
                continue;
            }
            self.pending_space = false;
            if space > 0 {
                self.emit(" ");
            }
            if self.used + len <= self.width {
                self.emit(word);
                return;
            }
            // A single word wider than the whole window is hard-broken at
            // the column boundary.
            let take = self.width - self.used;
            let split = word
                .char_indices()
                .nth(take)
                .map(|(at, _)| at)
                .unwrap_or(word.len());
            let (head, tail) = word.split_at(split);
            self.emit(head);
            self.break_line();
            word = tail;
        }
    }

    fn text(&mut self, text: &str) {
        if self.title_depth > 0 {
            return;
        }
        if self.preformatted {
            // Byte-for-byte per source line, no wrapping.
            let mut first = true;
            for source_line in text.split('\n') {
                if !first {
                    self.break_line();
                }
                if !source_line.is_empty() {
                    self.emit(source_line);
                }
                first = false;
            }
            return;
        }
        for (index, word) in text.split(' ').enumerate() {
            if index > 0 {
                self.pending_space = true;
            }
            self.place_word(word);
        }
    }

    fn entity(&mut self, ch: char) {
        if self.title_depth > 0 {
            return;
        }
        let mut buffer = [0u8; 4];
        let text = ch.encode_utf8(&mut buffer);
        if self.preformatted {
            self.emit(text);
        } else {
            self.place_word(text);
        }
    }

    fn tag(&mut self, kind: TagKind, start: bool, attrs: &std::collections::HashMap<String, String>) {
        match kind {
            TagKind::Bold => self.bold = start,
            TagKind::Underline => self.underline = start,
            TagKind::Blink => self.blink = start,
            TagKind::Font => {
                if start {
                    let color = attrs
                        .get("color")
                        .map(|name| resolve_font_color(name, &self.color_stack))
                        .unwrap_or_else(|| self.color());
                    self.color_stack.push(color);
                } else if self.color_stack.len() > 1 {
                    // The base color never pops.
                    self.color_stack.pop();
                }
            }
            TagKind::Heading(_) => {
                if start {
                    self.blank_line();
                    self.bold = true;
                } else {
                    self.bold = false;
                    self.break_line();
                }
            }
            TagKind::LineBreak => {
                if start {
                    self.break_line();
                }
            }
            TagKind::Paragraph | TagKind::Block => {
                if start {
                    self.blank_line();
                } else {
                    self.break_line();
                }
            }
            TagKind::ListItem => {
                if start {
                    self.break_line();
                    self.emit(" * ");
                }
            }
            TagKind::Preformatted => {
                if start {
                    self.break_line();
                    self.preformatted = true;
                } else {
                    self.preformatted = false;
                    self.break_line();
                }
            }
            TagKind::Quotation => {
                if self.title_depth == 0 {
                    self.place_word("\"");
                }
            }
            TagKind::Title => {
                if start {
                    self.title_depth += 1;
                } else {
                    self.title_depth = self.title_depth.saturating_sub(1);
                }
            }
            TagKind::Script | TagKind::Style | TagKind::Unknown => {}
        }
    }

    fn run(mut self, tokens: &[Token]) -> Vec<Line> {
        for token in tokens {
            match token {
                Token::Text(text) => self.text(text),
                Token::Entity(ch) => self.entity(*ch),
                Token::UnknownEntity(_) => {}
                Token::Tag { kind, start, attrs } => self.tag(*kind, *start, attrs),
            }
        }
        self.lines
    }
}

/// Compile HTML-subset markup into display lines at `width` columns.
pub fn compile(markup: &str, width: usize) -> Vec<Line> {
    Compiler::new(width).run(&html::parse(markup))
}

/// Split plain text into display lines (one per source line, unwrapped).
pub fn compile_plain(text: &str) -> Vec<Line> {
    text.split('\n')
        .map(|source_line| Line {
            chunks: if source_line.is_empty() {
                Vec::new()
            } else {
                vec![Chunk {
                    color: TermColor::Default,
                    attrs: Attributes::empty(),
                    text: source_line.to_string(),
                }]
            },
        })
        .collect()
}

// =============================================================================
// Widget
// =============================================================================

/// A scrollable text window with plain and rich-text modes.
pub struct TextView {
    base: WindowBase,
    mode: TextMode,
    text: String,
    compiled: Vec<Line>,
    /// Index of the first visible logical line.
    top_line: usize,
}

impl TextView {
    /// Create an empty text view covering `rect`.
    pub fn new(rect: Rect, pool: Arc<ColorPairPool>) -> Self {
        Self {
            base: WindowBase::new("TextView", rect, pool),
            mode: TextMode::Plain,
            text: String::new(),
            compiled: Vec::new(),
            top_line: 0,
        }
    }

    /// Select plain or rich-text interpretation; recompiles current text.
    pub fn set_mode(&mut self, mode: TextMode) {
        if self.mode != mode {
            self.mode = mode;
            self.recompile();
        }
    }

    /// Replace the content. The compiled line list is rebuilt from scratch
    /// and the viewport returns to the top.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.top_line = 0;
        self.recompile();
    }

    /// The raw (uncompiled) content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The compiled display lines.
    pub fn lines(&self) -> &[Line] {
        &self.compiled
    }

    /// Index of the first visible logical line.
    pub fn top_line(&self) -> usize {
        self.top_line
    }

    fn recompile(&mut self) {
        self.compiled = match self.mode {
            TextMode::Plain => compile_plain(&self.text),
            TextMode::Rich => compile(&self.text, self.base.size().cols as usize),
        };
        self.base.update();
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    /// Whether the viewport can move one more logical line down.
    ///
    /// Simulates the physical-row consumption of the remaining lines —
    /// a logical line wider than the window takes several rows — and
    /// answers whether anything would still be cut off after advancing.
    pub fn can_scroll_down(&self) -> bool {
        let width = self.base.size().cols as usize;
        let window_rows = self.base.size().lines as usize;
        let mut rows = 0usize;
        for line in &self.compiled[self.top_line.min(self.compiled.len())..] {
            rows += line.physical_rows(width);
            if rows > window_rows {
                return true;
            }
        }
        false
    }

    /// Scroll one logical line toward the end.
    pub fn scroll_down(&mut self) {
        if self.can_scroll_down() {
            self.top_line += 1;
            self.base.update();
        }
    }

    /// Scroll one logical line toward the start.
    pub fn scroll_up(&mut self) {
        if self.top_line > 0 {
            self.top_line -= 1;
            self.base.update();
        }
    }

    /// Jump to the top.
    pub fn scroll_home(&mut self) {
        if self.top_line != 0 {
            self.top_line = 0;
            self.base.update();
        }
    }

    /// Scroll so the last content is visible.
    pub fn scroll_end(&mut self) {
        while self.can_scroll_down() {
            self.top_line += 1;
        }
        self.base.update();
    }

    /// Scroll a window's worth toward the end.
    pub fn page_down(&mut self) {
        for _ in 0..self.base.size().lines {
            if !self.can_scroll_down() {
                break;
            }
            self.top_line += 1;
        }
        self.base.update();
    }

    /// Scroll a window's worth toward the start.
    pub fn page_up(&mut self) {
        let lines = self.base.size().lines as usize;
        self.top_line = self.top_line.saturating_sub(lines);
        self.base.update();
    }
}

impl Widget for TextView {
    fn window_base(&self) -> &WindowBase {
        &self.base
    }

    fn window_base_mut(&mut self) -> &mut WindowBase {
        &mut self.base
    }

    fn paint(&mut self, painter: &mut Painter<'_>) -> Result<(), PaintError> {
        let group = if self.base.has_focus() {
            ColorGroup::Active
        } else {
            ColorGroup::Inactive
        };
        let palette = self.base.palette();
        let bg = palette.color_or(group, ColorRole::Background, TermColor::Default);
        let base_fg = palette.color_or(group, ColorRole::Text, TermColor::Default);

        painter.set_colors(base_fg, bg)?;
        painter.set_attributes(Attributes::empty());
        painter.clear();

        let width = self.base.size().cols;
        let window_rows = self.base.size().lines;
        let mut y: u16 = 0;

        'lines: for line in &self.compiled[self.top_line.min(self.compiled.len())..] {
            let mut x: u16 = 0;
            for chunk in &line.chunks {
                let fg = match chunk.color {
                    TermColor::Default => base_fg,
                    color => color,
                };
                painter.set_colors(fg, bg)?;
                painter.set_attributes(chunk.attrs);
                for ch in chunk.text.chars() {
                    if x >= width {
                        x = 0;
                        y += 1;
                        if y >= window_rows {
                            break 'lines;
                        }
                    }
                    painter.move_to(x, y);
                    painter.print_char(ch);
                    x = painter.x();
                }
            }
            y += 1;
            if y >= window_rows {
                break;
            }
        }
        Ok(())
    }

    fn resize_children(&mut self) {
        // Wrapping is width-dependent in rich mode only.
        if self.mode == TextMode::Rich {
            self.recompile();
        }
        self.top_line = 0;
    }

    fn key_press_event(&mut self, event: &KeyEvent) -> bool {
        match event.code {
            KeyCode::ArrowUp => self.scroll_up(),
            KeyCode::ArrowDown => self.scroll_down(),
            KeyCode::Home => self.scroll_home(),
            KeyCode::End => self.scroll_end(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::PageDown => self.page_down(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(Line::text).collect()
    }

    #[test]
    fn test_basic_word_wrap() {
        let lines = compile("one two three four", 9);
        assert_eq!(texts(&lines), vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_wrap_never_exceeds_width() {
        // Long unbroken words interspersed with spaces; no
        // compiled line may exceed the column width.
        let width = 7;
        let lines = compile(
            "short incomprehensibilities a bb supercalifragilisticexpialidocious x",
            width,
        );
        for line in &lines {
            assert!(
                line.glyphs() <= width,
                "line '{}' exceeds {} columns",
                line.text(),
                width
            );
        }
        // Nothing was dropped either.
        let total: String = texts(&lines).concat();
        assert_eq!(
            total.replace(' ', ""),
            "shortincomprehensibilitiesabbsupercalifragilisticexpialidociousx"
        );
    }

    #[test]
    fn test_leading_space_trimmed_at_wrap() {
        let lines = compile("aaaa bbbb", 4);
        assert_eq!(texts(&lines), vec!["aaaa", "bbbb"]);
    }

    #[test]
    fn test_attribute_toggles() {
        let lines = compile("<b>Hi</b> there <u>you</u>", 40);
        assert_eq!(lines.len(), 1);
        let chunks = &lines[0].chunks;
        assert_eq!(chunks[0].text, "Hi");
        assert!(chunks[0].attrs.contains(Attributes::BOLD));
        assert_eq!(chunks[1].text, " there ");
        assert!(chunks[1].attrs.is_empty());
        assert_eq!(chunks[2].text, "you");
        assert!(chunks[2].attrs.contains(Attributes::UNDERLINE));
    }

    #[test]
    fn test_font_color_stack() {
        let lines = compile(
            "<font color=red>r<font color=blue>b</font>r2</font>n",
            40,
        );
        let chunks = &lines[0].chunks;
        assert_eq!(chunks[0].color, TermColor::Red);
        assert_eq!(chunks[1].color, TermColor::Blue);
        assert_eq!(chunks[2].color, TermColor::Red);
        assert_eq!(chunks[2].text, "r2");
        assert_eq!(chunks[3].color, TermColor::Default);
    }

    #[test]
    fn test_unknown_font_color_keeps_current() {
        let lines = compile("<font color=red>a<font color=mauve>b</font></font>", 40);
        let chunks = &lines[0].chunks;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "ab");
        assert_eq!(chunks[0].color, TermColor::Red);
    }

    #[test]
    fn test_stray_font_close_keeps_base_color() {
        let lines = compile("</font></font>x", 40);
        assert_eq!(lines[0].chunks[0].color, TermColor::Default);
    }

    #[test]
    fn test_heading_forces_blank_line_and_bold() {
        let lines = compile("intro<h1>Title</h1>body", 40);
        assert_eq!(texts(&lines), vec!["intro", "", "Title", "body"]);
        assert!(lines[2].chunks[0].attrs.contains(Attributes::BOLD));
        assert!(!lines[3].chunks[0].attrs.contains(Attributes::BOLD));

        // No doubled blank when one is already there.
        let lines = compile("<h1>A</h1><h2>B</h2>", 40);
        assert_eq!(texts(&lines), vec!["A", "", "B"]);
    }

    #[test]
    fn test_block_tags_break_continuation() {
        let lines = compile("a<div>b</div>c", 40);
        assert_eq!(texts(&lines), vec!["a", "", "b", "c"]);
    }

    #[test]
    fn test_list_item_marker() {
        let lines = compile("<li>first</li><li>second</li>", 40);
        assert_eq!(texts(&lines), vec![" * first", " * second"]);
    }

    #[test]
    fn test_title_suppressed() {
        let lines = compile("<title>hidden</title>visible", 40);
        assert_eq!(texts(&lines), vec!["visible"]);
    }

    #[test]
    fn test_pre_verbatim() {
        let lines = compile("<pre>a  b\n   indented\nlonger than width</pre>", 8);
        assert_eq!(
            texts(&lines),
            vec!["a  b", "   indented", "longer than width"]
        );
        // Preformatted lines may exceed the width; physical row accounting
        // copes with that.
        assert_eq!(lines[2].physical_rows(8), 3);
    }

    #[test]
    fn test_br_breaks_line() {
        let lines = compile("a<br>b<br/>c", 40);
        assert_eq!(texts(&lines), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_entity_counts_one_glyph() {
        // "&amp;" is one glyph for wrap purposes.
        let lines = compile("aaa &amp; bbb", 5);
        assert_eq!(texts(&lines), vec!["aaa &", "bbb"]);
    }

    #[test]
    fn test_compile_plain_keeps_source_lines() {
        let lines = compile_plain("one\n\ntwo three four");
        assert_eq!(texts(&lines), vec!["one", "", "two three four"]);
    }

    fn view(text: &str, mode: TextMode, cols: u16, rows: u16) -> TextView {
        let mut view = TextView::new(Rect::new(0, 0, cols, rows), ColorPairPool::new());
        view.set_mode(mode);
        view.set_text(text);
        view
    }

    #[test]
    fn test_scrolling_counts_physical_rows() {
        // Three logical lines at 4 columns: "aaaaaaaa" takes two physical
        // rows, so a 3-row window still has content cut off at top_line 0.
        let mut view = view("aaaaaaaa\nbb\ncc", TextMode::Plain, 4, 3);
        assert!(view.can_scroll_down());
        view.scroll_down();
        assert_eq!(view.top_line(), 1);
        assert!(!view.can_scroll_down());
        view.scroll_down(); // refuses
        assert_eq!(view.top_line(), 1);
        view.scroll_up();
        assert_eq!(view.top_line(), 0);
    }

    #[test]
    fn test_home_end_paging() {
        let text = (0..10).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
        let mut view = view(&text, TextMode::Plain, 10, 3);
        view.scroll_end();
        assert_eq!(view.top_line(), 7);
        view.scroll_home();
        assert_eq!(view.top_line(), 0);
        view.page_down();
        assert_eq!(view.top_line(), 3);
        view.page_up();
        assert_eq!(view.top_line(), 0);
    }

    #[test]
    fn test_rich_resize_recompiles() {
        let mut view = view("one two three four", TextMode::Rich, 18, 4);
        assert_eq!(view.lines().len(), 1);
        view.resize(crate::geometry::Size::new(9, 4)).unwrap();
        assert_eq!(texts(view.lines()), vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_paint_renders_wrapped_rows() {
        let mut view = view("<b>Hi</b> &amp; bye", TextMode::Rich, 12, 2);
        let surface = view.window_base().surface();
        {
            let mut painter = Painter::new(&surface).unwrap();
            view.paint(&mut painter).unwrap();
        }
        assert_eq!(surface.row_text(0), "Hi & bye");
    }

    #[test]
    fn test_paint_overflowing_line_uses_extra_rows() {
        let mut view = view("abcdefgh", TextMode::Plain, 4, 3);
        let surface = view.window_base().surface();
        {
            let mut painter = Painter::new(&surface).unwrap();
            view.paint(&mut painter).unwrap();
        }
        assert_eq!(surface.row_text(0), "abcd");
        assert_eq!(surface.row_text(1), "efgh");
    }
}
