//! ListView widget: a viewport-scrolled list over a [`ListModel`].
//!
//! The widget couples three collaborators:
//!
//! - its [`ItemView`] runs the viewport/current/selection state machine,
//! - its model supplies the item count and display text,
//! - its [`WindowBase`] carries geometry, palette and repaint scheduling.
//!
//! Structural model changes are pushed in through the `item_*` notification
//! methods; the widget merges the resulting repaint bands and emits its
//! outward signals (`current_changed`, `activated`, `clicked`).
//!
//! # Highlight auto-hide
//!
//! An optional one-shot timer suppresses the current-item highlight after a
//! period of inactivity (used so a "now playing" marker fades). While the
//! highlight is hidden, the first Up/Down key only restores it; navigation
//! resumes on the next press.

use std::sync::Arc;
use std::time::Duration;

use cadenza_core::{Signal, TimerId, TimerManager};
use parking_lot::Mutex;

use crate::color::TermColor;
use crate::error::PaintError;
use crate::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use crate::geometry::Rect;
use crate::item_view::{ItemView, Repaint};
use crate::model::ListModel;
use crate::painter::Painter;
use crate::palette::{ColorGroup, ColorRole};
use crate::surface::ColorPairPool;
use crate::window::{Widget, WindowBase};

/// A scrollable, selectable list widget.
pub struct ListView<M: ListModel> {
    base: WindowBase,
    view: ItemView,
    model: M,

    /// Accumulated repaint band since the last paint.
    dirty: Repaint,

    /// Whether the current-item highlight is suppressed.
    current_hidden: bool,

    /// Auto-hide delay; `None` disables the timer.
    highlight_timeout: Option<Duration>,

    /// Timer source shared with the application loop.
    timers: Option<Arc<Mutex<TimerManager>>>,

    /// The pending auto-hide timer, if armed.
    highlight_timer: Option<TimerId>,

    /// Emitted when the current item changes, with the new index.
    pub current_changed: Signal<Option<usize>>,

    /// Emitted when an item is activated (Enter or double-click).
    pub activated: Signal<usize>,

    /// Emitted when an item is clicked.
    pub clicked: Signal<usize>,
}

impl<M: ListModel> ListView<M> {
    /// Create a list view over `model`, covering `rect`.
    pub fn new(rect: Rect, pool: Arc<ColorPairPool>, model: M) -> Self {
        let mut list = Self {
            base: WindowBase::new("ListView", rect, pool),
            view: ItemView::new(rect.size.lines as usize),
            model,
            dirty: Repaint::None,
            current_hidden: false,
            highlight_timeout: None,
            timers: None,
            highlight_timer: None,
            current_changed: Signal::new(),
            activated: Signal::new(),
            clicked: Signal::new(),
        };
        list.reset();
        list
    }

    /// The model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the model. Pair every structural mutation with the
    /// matching notification method.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// The current item index.
    pub fn current_item(&self) -> Option<usize> {
        self.view.current_item()
    }

    /// The visible item range.
    pub fn viewport(&self) -> std::ops::Range<usize> {
        self.view.viewport()
    }

    /// The selected indices, sorted and duplicate-free.
    pub fn selection(&self) -> &[usize] {
        self.view.selection()
    }

    // =========================================================================
    // Structural notifications
    // =========================================================================

    /// The model was replaced or reloaded.
    pub fn reset(&mut self) {
        let old = self.view.current_item();
        let repaint = self.view.reset(self.model.len());
        self.absorb(repaint, old);
        self.show_current_item();
        self.rearm_highlight_timer();
    }

    /// An item was appended.
    pub fn item_added(&mut self) {
        let old = self.view.current_item();
        let repaint = self.view.item_added();
        self.absorb(repaint, old);
    }

    /// An item was inserted at `at`.
    pub fn item_inserted(&mut self, at: usize) {
        let old = self.view.current_item();
        let repaint = self.view.item_inserted(at);
        self.absorb(repaint, old);
    }

    /// The item at `at` was removed.
    pub fn item_removed(&mut self, at: usize) {
        let old = self.view.current_item();
        let repaint = self.view.item_removed(at);
        self.absorb(repaint, old);
    }

    /// The item at `from` now lives at `to`.
    pub fn item_moved(&mut self, from: usize, to: usize) {
        let old = self.view.current_item();
        let repaint = self.view.item_moved(from, to);
        self.absorb(repaint, old);
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Make `item` current, scrolling it into view.
    pub fn set_current_item(&mut self, item: usize) {
        let old = self.view.current_item();
        let repaint = self.view.set_current_item(item);
        if !matches!(repaint, Repaint::None) {
            self.show_current_item();
            self.rearm_highlight_timer();
        }
        self.absorb(repaint, old);
    }

    /// Scroll `item` into view without moving the current item (beyond
    /// snapping it to the viewport edge when it would fall outside).
    pub fn scroll_to_item(&mut self, item: usize) {
        let old = self.view.current_item();
        let repaint = self.view.scroll_to_item(item);
        self.absorb(repaint, old);
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select `item`.
    pub fn select_item(&mut self, item: usize) {
        self.view.select_item(item);
        self.base.update();
    }

    /// Unselect `item`.
    pub fn unselect_item(&mut self, item: usize) {
        self.view.unselect_item(item);
        self.base.update();
    }

    /// Replace the selection with its complement.
    pub fn invert_selection(&mut self) {
        self.view.invert_selection();
        self.dirty = Repaint::Full;
        self.base.update();
    }

    /// Select every item whose display text matches `pattern`.
    pub fn select_items_by_regexp(&mut self, pattern: &str) -> Result<(), regex::Error> {
        let re = regex::Regex::new(pattern)?;
        for index in 0..self.model.len() {
            if re.is_match(&self.model.display_text(index)) {
                self.view.select_item(index);
            }
        }
        self.dirty = Repaint::Full;
        self.base.update();
        Ok(())
    }

    /// Unselect every item whose display text matches `pattern`.
    pub fn unselect_items_by_regexp(&mut self, pattern: &str) -> Result<(), regex::Error> {
        let re = regex::Regex::new(pattern)?;
        for index in 0..self.model.len() {
            if re.is_match(&self.model.display_text(index)) {
                self.view.unselect_item(index);
            }
        }
        self.dirty = Repaint::Full;
        self.base.update();
        Ok(())
    }

    // =========================================================================
    // Highlight auto-hide
    // =========================================================================

    /// Enable or disable the highlight auto-hide timer.
    pub fn set_highlight_timeout(&mut self, timeout: Option<Duration>) {
        self.highlight_timeout = timeout;
        self.rearm_highlight_timer();
    }

    /// Attach the application's timer manager so the auto-hide timer can be
    /// scheduled.
    pub fn attach_timers(&mut self, timers: Arc<Mutex<TimerManager>>) {
        self.timers = Some(timers);
        self.rearm_highlight_timer();
    }

    /// Whether the current-item highlight is currently suppressed.
    pub fn is_current_hidden(&self) -> bool {
        self.current_hidden
    }

    /// Restore the current-item highlight.
    pub fn show_current_item(&mut self) {
        if self.current_hidden {
            self.current_hidden = false;
            self.dirty = Repaint::Full;
            self.base.update();
        }
    }

    /// Suppress the current-item highlight until the next navigation.
    pub fn hide_current_item(&mut self) {
        if !self.current_hidden {
            self.current_hidden = true;
            self.dirty = Repaint::Full;
            self.base.update();
        }
    }

    fn rearm_highlight_timer(&mut self) {
        let Some(timers) = &self.timers else {
            return;
        };
        let mut timers = timers.lock();
        if let Some(id) = self.highlight_timer.take() {
            timers.stop(id);
        }
        if let Some(timeout) = self.highlight_timeout {
            self.highlight_timer = Some(timers.start_one_shot(timeout));
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Merge a repaint band, schedule the window repaint and emit
    /// `current_changed` when the current item moved.
    fn absorb(&mut self, repaint: Repaint, old_current: Option<usize>) {
        self.dirty = merge_repaint(std::mem::replace(&mut self.dirty, Repaint::None), repaint);
        if !matches!(self.dirty, Repaint::None) {
            self.base.update();
        }
        if self.view.current_item() != old_current {
            self.current_changed.emit(self.view.current_item());
        }
    }

    fn navigate(&mut self, key: &KeyEvent) -> bool {
        // While the highlight is hidden, the first navigation key only
        // restores it.
        if self.current_hidden && matches!(key.code, KeyCode::ArrowUp | KeyCode::ArrowDown) {
            self.show_current_item();
            self.rearm_highlight_timer();
            return true;
        }

        let old = self.view.current_item();
        let repaint = match key.code {
            KeyCode::ArrowUp => self.view.step_up(),
            KeyCode::ArrowDown => self.view.step_down(),
            KeyCode::Home => self.view.set_current_item(0),
            KeyCode::End => match self.view.count() {
                0 => Repaint::None,
                count => self.view.set_current_item(count - 1),
            },
            KeyCode::PageUp => match self.view.current_item() {
                Some(current) => {
                    let target = current.saturating_sub(self.view.lines());
                    self.view.set_current_item(target)
                }
                None => Repaint::None,
            },
            KeyCode::PageDown => match self.view.current_item() {
                Some(current) => {
                    let count = self.view.count();
                    let target = (current + self.view.lines()).min(count.saturating_sub(1));
                    self.view.set_current_item(target)
                }
                None => Repaint::None,
            },
            KeyCode::Enter => {
                if let Some(current) = self.view.current_item() {
                    self.activated.emit(current);
                    return true;
                }
                return false;
            }
            _ => return false,
        };

        self.show_current_item();
        self.rearm_highlight_timer();
        self.absorb(repaint, old);
        true
    }

    fn item_at(&self, line: i32) -> Option<usize> {
        if line < 0 {
            return None;
        }
        let index = self.view.viewport().start + line as usize;
        (index < self.view.viewport().end).then_some(index)
    }

    fn paint_row(&self, painter: &mut Painter<'_>, index: usize) -> Result<(), PaintError> {
        let y = (index - self.view.viewport().start) as u16;
        let group = if self.base.has_focus() {
            ColorGroup::Active
        } else {
            ColorGroup::Inactive
        };
        let palette = self.base.palette();
        let is_current =
            self.view.current_item() == Some(index) && !self.current_hidden;
        let is_selected = self.view.is_selected(index);

        let (fg, bg) = if is_current {
            (
                palette.color_or(group, ColorRole::HighlightedText, TermColor::Default),
                palette.color_or(group, ColorRole::Highlight, TermColor::Default),
            )
        } else if is_selected {
            (
                palette.color_or(group, ColorRole::Selection, TermColor::Yellow),
                palette.color_or(group, ColorRole::Background, TermColor::Default),
            )
        } else {
            (
                palette.color_or(group, ColorRole::Text, TermColor::Default),
                palette.color_or(group, ColorRole::Background, TermColor::Default),
            )
        };

        painter.set_colors(fg, bg)?;
        painter.set_reverse(is_current);
        painter.set_bold(is_selected);
        painter.clear_line(y);
        painter.move_to(0, y);
        painter.squeezed_print(&self.model.display_text(index), self.base.size().cols);
        Ok(())
    }
}

impl<M: ListModel> Widget for ListView<M> {
    fn window_base(&self) -> &WindowBase {
        &self.base
    }

    fn window_base_mut(&mut self) -> &mut WindowBase {
        &mut self.base
    }

    fn paint(&mut self, painter: &mut Painter<'_>) -> Result<(), PaintError> {
        let band = std::mem::replace(&mut self.dirty, Repaint::None);
        let viewport = self.view.viewport();
        let rows: Vec<usize> = match band {
            // A band repaint touches only its intersection with the viewport.
            Repaint::Lines(range) => viewport
                .clone()
                .filter(|index| range.contains(index))
                .collect(),
            _ => {
                painter.set_colors(TermColor::Default, TermColor::Default)?;
                painter.set_attributes(crate::color::Attributes::empty());
                painter.clear();
                viewport.clone().collect()
            }
        };
        for index in rows {
            self.paint_row(painter, index)?;
        }
        Ok(())
    }

    fn resize_children(&mut self) {
        self.view.set_lines(self.base.size().lines as usize);
        self.dirty = Repaint::Full;
    }

    fn key_press_event(&mut self, event: &KeyEvent) -> bool {
        self.navigate(event)
    }

    fn mouse_event(&mut self, event: &MouseEvent) {
        match (event.kind, event.button) {
            (MouseEventKind::Press, MouseButton::WheelUp) => {
                self.navigate(&KeyEvent::plain(KeyCode::ArrowUp));
            }
            (MouseEventKind::Press, MouseButton::WheelDown) => {
                self.navigate(&KeyEvent::plain(KeyCode::ArrowDown));
            }
            (MouseEventKind::Press, MouseButton::Left) => {
                if let Some(index) = self.item_at(event.pos.y) {
                    self.set_current_item(index);
                    self.clicked.emit(index);
                }
            }
            (MouseEventKind::DoubleClick, MouseButton::Left) => {
                if let Some(index) = self.item_at(event.pos.y) {
                    self.set_current_item(index);
                    self.activated.emit(index);
                }
            }
            _ => {}
        }
    }

    fn timer_event(&mut self, id: TimerId) -> bool {
        if self.highlight_timer == Some(id) {
            self.highlight_timer = None;
            self.hide_current_item();
            return true;
        }
        false
    }
}

fn merge_repaint(a: Repaint, b: Repaint) -> Repaint {
    match (a, b) {
        (Repaint::None, other) | (other, Repaint::None) => other,
        (Repaint::Full, _) | (_, Repaint::Full) => Repaint::Full,
        (Repaint::Lines(a), Repaint::Lines(b)) => {
            Repaint::Lines(a.start.min(b.start)..a.end.max(b.end))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VecModel;
    use crate::surface::ColorPairPool;

    fn strings(items: &[&str]) -> VecModel<String> {
        VecModel::new(items.iter().map(|s| s.to_string()).collect())
    }

    fn list(items: &[&str], lines: u16) -> ListView<VecModel<String>> {
        ListView::new(
            Rect::new(0, 0, 12, lines),
            ColorPairPool::new(),
            strings(items),
        )
    }

    #[test]
    fn test_reset_on_construction() {
        let list = list(&["a", "b", "c", "d"], 2);
        assert_eq!(list.current_item(), Some(0));
        assert_eq!(list.viewport(), 0..2);
    }

    #[test]
    fn test_insert_scenario_keeps_viewport() {
        // ["a","b","c","d"], height 2, insert "x" at 1: the tail was not
        // visible, so the viewport and current item stay put.
        let mut list = list(&["a", "b", "c", "d"], 2);
        list.model_mut().insert(1, "x".to_string());
        list.item_inserted(1);
        assert_eq!(list.model().items(), &["a", "x", "b", "c", "d"]);
        assert_eq!(list.viewport(), 0..2);
        assert_eq!(list.current_item(), Some(0));
    }

    #[test]
    fn test_key_navigation_and_activation() {
        let mut list = list(&["a", "b", "c"], 2);
        let activated = Arc::new(Mutex::new(Vec::new()));
        let activated_clone = activated.clone();
        list.activated
            .connect(move |&index| activated_clone.lock().push(index))
            .detach();

        assert!(list.key_press_event(&KeyEvent::plain(KeyCode::ArrowDown)));
        assert_eq!(list.current_item(), Some(1));
        assert!(list.key_press_event(&KeyEvent::plain(KeyCode::Enter)));
        assert_eq!(*activated.lock(), vec![1]);

        assert!(list.key_press_event(&KeyEvent::plain(KeyCode::End)));
        assert_eq!(list.current_item(), Some(2));
        assert!(list.key_press_event(&KeyEvent::plain(KeyCode::Home)));
        assert_eq!(list.current_item(), Some(0));
        assert!(!list.key_press_event(&KeyEvent::char('z')));
    }

    #[test]
    fn test_hidden_highlight_restored_by_first_key() {
        let mut list = list(&["a", "b", "c"], 3);
        list.hide_current_item();
        assert!(list.is_current_hidden());

        // The first Down only restores the highlight.
        list.key_press_event(&KeyEvent::plain(KeyCode::ArrowDown));
        assert!(!list.is_current_hidden());
        assert_eq!(list.current_item(), Some(0));

        // The second one moves.
        list.key_press_event(&KeyEvent::plain(KeyCode::ArrowDown));
        assert_eq!(list.current_item(), Some(1));
    }

    #[test]
    fn test_highlight_timer_hides_current() {
        let timers = Arc::new(Mutex::new(TimerManager::new()));
        let mut list = list(&["a", "b"], 2);
        list.set_highlight_timeout(Some(Duration::from_millis(5)));
        list.attach_timers(timers.clone());

        let fired = {
            let mut timers = timers.lock();
            timers.poll(std::time::Instant::now() + Duration::from_millis(50))
        };
        assert_eq!(fired.len(), 1);
        assert!(list.timer_event(fired[0]));
        assert!(list.is_current_hidden());

        // Navigation restores and re-arms.
        list.key_press_event(&KeyEvent::plain(KeyCode::ArrowDown));
        assert!(!list.is_current_hidden());
        assert!(timers.lock().next_deadline().is_some());
    }

    #[test]
    fn test_regexp_selection() {
        let mut list = list(&["track 01", "intro", "track 02", "outro"], 4);
        list.select_items_by_regexp("^track").unwrap();
        assert_eq!(list.selection(), &[0, 2]);

        list.select_items_by_regexp("o$").unwrap();
        assert_eq!(list.selection(), &[0, 1, 2, 3]);

        list.unselect_items_by_regexp("track").unwrap();
        assert_eq!(list.selection(), &[1, 3]);

        assert!(list.select_items_by_regexp("(unclosed").is_err());
    }

    #[test]
    fn test_current_changed_signal() {
        let mut list = list(&["a", "b", "c"], 3);
        let changes = Arc::new(Mutex::new(Vec::new()));
        let changes_clone = changes.clone();
        list.current_changed
            .connect(move |&current| changes_clone.lock().push(current))
            .detach();

        list.set_current_item(2);
        list.set_current_item(2); // unchanged, no signal
        list.item_removed(2); // clamps current to 1
        assert_eq!(*changes.lock(), vec![Some(2), Some(1)]);
    }

    #[test]
    fn test_mouse_click_sets_current() {
        let mut list = list(&["a", "b", "c", "d", "e"], 3);
        list.scroll_to_item(4); // viewport 2..5

        let clicked = Arc::new(Mutex::new(Vec::new()));
        let clicked_clone = clicked.clone();
        list.clicked
            .connect(move |&index| clicked_clone.lock().push(index))
            .detach();

        list.mouse_event(&MouseEvent {
            kind: MouseEventKind::Press,
            button: MouseButton::Left,
            pos: crate::geometry::Point::new(1, 1),
        });
        assert_eq!(list.current_item(), Some(3));
        assert_eq!(*clicked.lock(), vec![3]);

        // A click below the last item does nothing.
        list.mouse_event(&MouseEvent {
            kind: MouseEventKind::Press,
            button: MouseButton::Left,
            pos: crate::geometry::Point::new(1, 20),
        });
        assert_eq!(*clicked.lock(), vec![3]);
    }

    #[test]
    fn test_paint_renders_viewport_rows() {
        let mut list = list(&["alpha", "beta", "gamma"], 2);
        let surface = list.window_base().surface();
        {
            let mut painter = Painter::new(&surface).unwrap();
            list.paint(&mut painter).unwrap();
        }
        assert_eq!(surface.row_text(0), "alpha");
        assert_eq!(surface.row_text(1), "beta");

        list.set_current_item(2); // scrolls viewport to 1..3
        {
            let mut painter = Painter::new(&surface).unwrap();
            list.paint(&mut painter).unwrap();
        }
        assert_eq!(surface.row_text(0), "beta");
        assert_eq!(surface.row_text(1), "gamma");
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut list = list(&["a", "b", "c", "d", "e"], 2);
        list.resize(crate::geometry::Size::new(12, 4)).unwrap();
        assert_eq!(list.viewport(), 0..4);
    }
}
