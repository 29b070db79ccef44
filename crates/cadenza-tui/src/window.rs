//! The window layer: screen-rectangle nodes with geometry, visibility,
//! focus delegation and paint scheduling.
//!
//! # Key Types
//!
//! - [`WindowBase`] - Common state every widget embeds (geometry, palette,
//!   visibility, repaint flag)
//! - [`Widget`] - The capability trait with the overridable hooks
//! - [`Panel`] - A plain container that owns child widgets
//! - [`StackPanel`] - A container that shows only its active child
//!
//! # Ownership and focus
//!
//! Containers own their children by value (`Vec<Box<dyn Widget>>`) and hold
//! the focused child as an index — a weak reference into their own list.
//! Focus changes notify the previous holder (`focus_out_event`) and the new
//! one (`focus_in_event`), both of which schedule a repaint.
//!
//! # Resize cascades
//!
//! [`Widget::resize`] validates against the window's minimum and maximum
//! size and fails without mutating anything when out of bounds. A
//! successful resize recreates the render surface, runs the widget's
//! `resize_children` hook, and schedules a repaint — unless the resize was
//! itself triggered from an ancestor's `resize_children` pass, in which
//! case the ancestor's repaint already covers it. The cascade is tracked by
//! calling [`Widget::resize_cascaded`] for inner resizes; no process-wide
//! flag is involved.

use std::sync::Arc;

use cadenza_core::ObjectBase;

use crate::error::{PaintError, ResizeError};
use crate::event::{KeyEvent, MouseEvent};
use crate::geometry::{Point, Rect, Size};
use crate::painter::Painter;
use crate::surface::{ColorPairPool, Surface};
use crate::palette::Palette;

/// Common state for every window in the tree.
///
/// Widgets embed this as a field and hand it out through
/// [`Widget::window_base`].
pub struct WindowBase {
    /// Lifecycle node: name, retained connections.
    object: ObjectBase,

    /// Class name used for palette resolution and debugging.
    class_name: &'static str,

    /// Position relative to the parent window.
    pos: Point,

    /// Absolute screen position, maintained by [`Widget::reposition`].
    screen_pos: Point,

    /// Current size in cells.
    size: Size,

    /// Smallest allowed size.
    min_size: Size,

    /// Largest allowed size.
    max_size: Size,

    /// Whether the window is visible.
    visible: bool,

    /// Whether the window needs repainting.
    needs_repaint: bool,

    /// Whether this window currently holds focus (maintained by the focus
    /// events; a top-level window is focused by construction).
    focused: bool,

    /// The window's color palette, shared across the class.
    palette: Arc<Palette>,

    /// The offscreen render surface.
    surface: Arc<Surface>,
}

impl WindowBase {
    /// Create a window base covering `rect` (parent-relative origin, which
    /// for a top-level window is also the screen origin).
    pub fn new(class_name: &'static str, rect: Rect, pool: Arc<ColorPairPool>) -> Self {
        Self {
            object: ObjectBase::with_name(class_name),
            class_name,
            pos: rect.origin,
            screen_pos: rect.origin,
            size: rect.size,
            min_size: Size::MIN,
            max_size: Size::MAX,
            visible: true,
            needs_repaint: true,
            focused: false,
            palette: Arc::new(Palette::new()),
            surface: Arc::new(Surface::new(rect, pool)),
        }
    }

    /// The embedded lifecycle node.
    pub fn object(&self) -> &ObjectBase {
        &self.object
    }

    /// Mutable access to the lifecycle node.
    pub fn object_mut(&mut self) -> &mut ObjectBase {
        &mut self.object
    }

    /// The class name this window resolves its palette under.
    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Position relative to the parent window.
    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Absolute position on the screen.
    #[inline]
    pub fn screen_pos(&self) -> Point {
        self.screen_pos
    }

    /// Current size.
    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// The window's local rectangle in parent coordinates.
    pub fn rect(&self) -> Rect {
        Rect {
            origin: self.pos,
            size: self.size,
        }
    }

    /// The window's minimum size (default 1×1).
    pub fn min_size(&self) -> Size {
        self.min_size
    }

    /// The window's maximum size (default unbounded).
    pub fn max_size(&self) -> Size {
        self.max_size
    }

    /// Set the minimum size. Existing geometry is not revalidated; the next
    /// resize is checked against the new bound.
    pub fn set_min_size(&mut self, size: Size) {
        self.min_size = size;
    }

    /// Set the maximum size.
    pub fn set_max_size(&mut self, size: Size) {
        self.max_size = size;
    }

    /// Validate `size` against the bounds and apply it, recreating the
    /// render surface. The size field is untouched on error.
    pub(crate) fn apply_size(&mut self, size: Size) -> Result<(), ResizeError> {
        if size.cols < self.min_size.cols || size.lines < self.min_size.lines {
            return Err(ResizeError::TooSmall {
                requested: size,
                min: self.min_size,
            });
        }
        if size.cols > self.max_size.cols || size.lines > self.max_size.lines {
            return Err(ResizeError::TooBig {
                requested: size,
                max: self.max_size,
            });
        }
        self.size = size;
        self.surface.recreate(Rect {
            origin: self.screen_pos,
            size,
        });
        tracing::trace!(
            target: "cadenza_tui::window",
            class = self.class_name,
            ?size,
            "resized window"
        );
        Ok(())
    }

    /// Update the parent-relative position without touching the surface;
    /// [`Widget::reposition`] follows up with the absolute recomputation.
    pub(crate) fn set_pos(&mut self, pos: Point) {
        self.pos = pos;
    }

    /// Recompute the absolute screen position below `parent_screen` and
    /// recreate the surface there.
    pub(crate) fn apply_screen_pos(&mut self, parent_screen: Point) {
        self.screen_pos = parent_screen.translated(self.pos);
        self.surface.recreate(Rect {
            origin: self.screen_pos,
            size: self.size,
        });
    }

    // =========================================================================
    // Visibility and repaint
    // =========================================================================

    /// Whether the window is visible.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Schedule a repaint. Hidden windows accumulate nothing; showing a
    /// window schedules a fresh repaint anyway.
    pub fn update(&mut self) {
        if self.visible {
            self.needs_repaint = true;
        }
    }

    /// Whether a repaint is pending.
    #[inline]
    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    /// Clear the repaint flag (called by the paint pass).
    pub fn clear_repaint_flag(&mut self) {
        self.needs_repaint = false;
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Whether this window currently holds focus.
    #[inline]
    pub fn has_focus(&self) -> bool {
        self.focused
    }

    /// Set the focus flag. Containers call this through the focus events;
    /// the application marks its top-level window focused at startup.
    pub fn set_focused(&mut self, focused: bool) {
        if self.focused != focused {
            self.focused = focused;
            self.update();
        }
    }

    // =========================================================================
    // Palette and surface
    // =========================================================================

    /// The window's palette.
    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    /// Assign a palette (normally the one resolved for this class by
    /// [`crate::palette::PaletteCache::palette_for_class`]).
    pub fn set_palette(&mut self, palette: Arc<Palette>) {
        self.palette = palette;
    }

    /// Resolve this window's palette through the per-class cache, using the
    /// currently assigned palette as the inherited base.
    pub fn load_palette(&mut self, cache: &crate::palette::PaletteCache, extra_roles: &[&str]) {
        let inherited = self.palette.clone();
        self.palette = cache.palette_for_class(self.class_name, Some(&inherited), extra_roles);
    }

    /// The window's render surface.
    pub fn surface(&self) -> Arc<Surface> {
        self.surface.clone()
    }
}

/// The capability trait every widget implements.
///
/// Leaf widgets override the event hooks they care about; containers
/// additionally expose their children. Implementation inheritance is kept
/// to one level: widgets embed [`WindowBase`] (and containers a child list)
/// rather than deriving from each other.
pub trait Widget: Send {
    /// Access the embedded [`WindowBase`].
    fn window_base(&self) -> &WindowBase;

    /// Mutable access to the embedded [`WindowBase`].
    fn window_base_mut(&mut self) -> &mut WindowBase;

    // =========================================================================
    // Children (containers override)
    // =========================================================================

    /// Number of child windows.
    fn child_count(&self) -> usize {
        0
    }

    /// The child at `index`.
    fn child(&self, _index: usize) -> Option<&dyn Widget> {
        None
    }

    /// Mutable access to the child at `index`.
    fn child_mut(&mut self, _index: usize) -> Option<&mut dyn Widget> {
        None
    }

    /// The index of the focused child, if any.
    fn focused_child_index(&self) -> Option<usize> {
        None
    }

    /// Record the focused child (containers store the index).
    fn set_focused_child_index(&mut self, _index: Option<usize>) {}

    // =========================================================================
    // Hooks
    // =========================================================================

    /// Paint the window's content into its surface.
    fn paint(&mut self, _painter: &mut Painter<'_>) -> Result<(), PaintError> {
        Ok(())
    }

    /// Reposition and resize children after this window's size changed.
    /// Containers resize children with [`Widget::resize_cascaded`] so the
    /// children skip their own repaint trigger.
    fn resize_children(&mut self) {}

    /// Called after the window became visible.
    fn show_event(&mut self) {}

    /// Called when the window gains focus.
    fn focus_in_event(&mut self) {
        self.window_base_mut().set_focused(true);
    }

    /// Called when the window loses focus.
    fn focus_out_event(&mut self) {
        self.window_base_mut().set_focused(false);
    }

    /// Handle a key event. The default forwards to the focused child;
    /// leaf widgets override to handle keys. Returns whether the event
    /// was consumed.
    fn key_press_event(&mut self, event: &KeyEvent) -> bool {
        if let Some(index) = self.focused_child_index() {
            if let Some(child) = self.child_mut(index) {
                return child.key_press_event(event);
            }
        }
        false
    }

    /// Handle a fired timer. The default forwards through the subtree until
    /// some widget claims the timer as its own. Returns whether it was
    /// claimed.
    fn timer_event(&mut self, id: cadenza_core::TimerId) -> bool {
        for index in 0..self.child_count() {
            if let Some(child) = self.child_mut(index) {
                if child.timer_event(id) {
                    return true;
                }
            }
        }
        false
    }

    /// Handle a mouse event in this window's local coordinates.
    ///
    /// The default finds the visible child whose rectangle contains the
    /// position, focuses it if necessary, and forwards the event translated
    /// into that child's space.
    fn mouse_event(&mut self, event: &MouseEvent) {
        let mut target = None;
        for index in 0..self.child_count() {
            if let Some(child) = self.child(index) {
                let base = child.window_base();
                if base.is_visible() && base.rect().contains(event.pos) {
                    target = Some(index);
                }
            }
        }
        let Some(index) = target else {
            return;
        };
        if self.focused_child_index() != Some(index) {
            self.focus_child(index);
        }
        let origin = match self.child(index) {
            Some(child) => child.window_base().pos(),
            None => return,
        };
        let translated = event.translated_by(origin);
        if let Some(child) = self.child_mut(index) {
            child.mouse_event(&translated);
        }
    }

    // =========================================================================
    // Provided operations
    // =========================================================================

    /// Resize this window.
    ///
    /// Fails without mutating state if `size` is outside the window's
    /// [min, max] bounds. On success the surface is recreated, children are
    /// re-laid-out, and a repaint is scheduled if the window is visible.
    fn resize(&mut self, size: Size) -> Result<(), ResizeError> {
        self.window_base_mut().apply_size(size)?;
        self.resize_children();
        if self.window_base().is_visible() {
            self.window_base_mut().update();
        }
        Ok(())
    }

    /// Resize as part of an ancestor's resize cascade: identical to
    /// [`resize`](Widget::resize) except that no repaint is scheduled —
    /// the ancestor repaints the whole subtree once.
    fn resize_cascaded(&mut self, size: Size) -> Result<(), ResizeError> {
        self.window_base_mut().apply_size(size)?;
        self.resize_children();
        Ok(())
    }

    /// Move this window to a new parent-relative position and propagate the
    /// absolute-position recomputation through the subtree.
    fn move_to(&mut self, pos: Point) {
        let parent_screen = {
            let base = self.window_base();
            // screen = parent_screen + old pos, so parent_screen = screen - old pos.
            Point::new(base.screen_pos().x - base.pos().x, base.screen_pos().y - base.pos().y)
        };
        self.window_base_mut().set_pos(pos);
        self.reposition(parent_screen);
        self.window_base_mut().update();
    }

    /// Recompute this window's absolute position below `parent_screen` and
    /// recurse into children.
    fn reposition(&mut self, parent_screen: Point) {
        self.window_base_mut().apply_screen_pos(parent_screen);
        let my_screen = self.window_base().screen_pos();
        for index in 0..self.child_count() {
            if let Some(child) = self.child_mut(index) {
                child.reposition(my_screen);
            }
        }
    }

    /// Hide this window and, recursively, its children.
    fn hide(&mut self) {
        self.window_base_mut().set_visible(false);
        for index in 0..self.child_count() {
            if let Some(child) = self.child_mut(index) {
                child.hide();
            }
        }
    }

    /// Show this window, schedule a repaint and fire `show_event`.
    /// Children are shown recursively by default; containers that manage an
    /// active child (see [`StackPanel`]) override this.
    fn show(&mut self) {
        self.window_base_mut().set_visible(true);
        for index in 0..self.child_count() {
            if let Some(child) = self.child_mut(index) {
                child.show();
            }
        }
        self.window_base_mut().update();
        self.show_event();
    }

    /// Give focus to the child at `index`, notifying the previous holder
    /// and the new one. Out-of-range indices are ignored.
    fn focus_child(&mut self, index: usize) {
        if index >= self.child_count() {
            return;
        }
        let previous = self.focused_child_index();
        if previous == Some(index) {
            return;
        }
        self.set_focused_child_index(Some(index));
        if let Some(prev) = previous {
            if let Some(child) = self.child_mut(prev) {
                child.focus_out_event();
            }
        }
        if let Some(child) = self.child_mut(index) {
            child.focus_in_event();
        }
    }
}

/// Paint every window in the subtree that has a pending repaint.
///
/// Hidden subtrees are skipped entirely.
pub fn paint_tree(widget: &mut dyn Widget) -> Result<(), PaintError> {
    if !widget.window_base().is_visible() {
        return Ok(());
    }
    if widget.window_base().needs_repaint() {
        let surface = widget.window_base().surface();
        let mut painter = Painter::new(&surface)?;
        widget.paint(&mut painter)?;
        drop(painter);
        widget.window_base_mut().clear_repaint_flag();
    }
    for index in 0..widget.child_count() {
        if let Some(child) = widget.child_mut(index) {
            paint_tree(child)?;
        }
    }
    Ok(())
}

/// Flush every visible surface in the subtree to `out`, parents before
/// children so children overdraw.
pub fn flush_tree(widget: &dyn Widget, out: &mut impl std::io::Write) -> std::io::Result<()> {
    if !widget.window_base().is_visible() {
        return Ok(());
    }
    widget.window_base().surface().flush_to(out)?;
    for index in 0..widget.child_count() {
        if let Some(child) = widget.child(index) {
            flush_tree(child, out)?;
        }
    }
    Ok(())
}

// =============================================================================
// Containers
// =============================================================================

/// A plain container window owning a list of children.
pub struct Panel {
    base: WindowBase,
    children: Vec<Box<dyn Widget>>,
    focus: Option<usize>,
}

impl Panel {
    /// Create an empty panel covering `rect`.
    pub fn new(rect: Rect, pool: Arc<ColorPairPool>) -> Self {
        Self {
            base: WindowBase::new("Panel", rect, pool),
            children: Vec::new(),
            focus: None,
        }
    }

    /// Append a child. The first child added receives focus.
    ///
    /// The child's absolute position is recomputed below this panel.
    pub fn add_child(&mut self, mut child: Box<dyn Widget>) -> usize {
        child.reposition(self.base.screen_pos());
        self.children.push(child);
        let index = self.children.len() - 1;
        if self.focus.is_none() {
            self.focus_child(index);
        }
        index
    }
}

impl Widget for Panel {
    fn window_base(&self) -> &WindowBase {
        &self.base
    }

    fn window_base_mut(&mut self) -> &mut WindowBase {
        &mut self.base
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<&dyn Widget> {
        self.children.get(index).map(|child| child.as_ref() as &dyn Widget)
    }

    fn child_mut(&mut self, index: usize) -> Option<&mut dyn Widget> {
        self.children
            .get_mut(index)
            .map(|child| child.as_mut() as &mut dyn Widget)
    }

    fn focused_child_index(&self) -> Option<usize> {
        self.focus
    }

    fn set_focused_child_index(&mut self, index: Option<usize>) {
        self.focus = index;
    }
}

/// A container that keeps exactly one child visible: the active one.
///
/// Used for tabbed screens; switching the active child hides the previous
/// screen and shows the new one.
pub struct StackPanel {
    base: WindowBase,
    children: Vec<Box<dyn Widget>>,
    active: Option<usize>,
}

impl StackPanel {
    /// Create an empty stack covering `rect`.
    pub fn new(rect: Rect, pool: Arc<ColorPairPool>) -> Self {
        Self {
            base: WindowBase::new("StackPanel", rect, pool),
            children: Vec::new(),
            active: None,
        }
    }

    /// Append a child. The first child becomes active; later children
    /// start hidden.
    pub fn add_child(&mut self, mut child: Box<dyn Widget>) -> usize {
        child.reposition(self.base.screen_pos());
        if self.active.is_some() {
            child.hide();
        }
        self.children.push(child);
        let index = self.children.len() - 1;
        if self.active.is_none() {
            self.focus_child(index);
        }
        index
    }

    /// The active child's index.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Switch to the child at `index`, hiding the previous one.
    pub fn set_active(&mut self, index: usize) {
        if index >= self.children.len() || self.active == Some(index) {
            return;
        }
        if let Some(previous) = self.active {
            self.children[previous].hide();
        }
        // focus_child records the new index and fires both focus events.
        self.focus_child(index);
        self.children[index].show();
        self.window_base_mut().update();
    }
}

impl Widget for StackPanel {
    fn window_base(&self) -> &WindowBase {
        &self.base
    }

    fn window_base_mut(&mut self) -> &mut WindowBase {
        &mut self.base
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<&dyn Widget> {
        self.children.get(index).map(|child| child.as_ref() as &dyn Widget)
    }

    fn child_mut(&mut self, index: usize) -> Option<&mut dyn Widget> {
        self.children
            .get_mut(index)
            .map(|child| child.as_mut() as &mut dyn Widget)
    }

    fn focused_child_index(&self) -> Option<usize> {
        self.active
    }

    fn set_focused_child_index(&mut self, index: Option<usize>) {
        self.active = index;
    }

    /// Showing a stack shows only the active child.
    fn show(&mut self) {
        self.window_base_mut().set_visible(true);
        if let Some(active) = self.active {
            if let Some(child) = self.child_mut(active) {
                child.show();
            }
        }
        self.window_base_mut().update();
        self.show_event();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyCode;

    use parking_lot::Mutex;

    #[derive(Default)]
    struct ProbeLog {
        keys: Vec<KeyEvent>,
        mouse: Vec<MouseEvent>,
        shown: usize,
    }

    struct Probe {
        base: WindowBase,
        log: Arc<Mutex<ProbeLog>>,
    }

    impl Probe {
        fn boxed(rect: Rect, pool: &Arc<ColorPairPool>) -> (Box<Self>, Arc<Mutex<ProbeLog>>) {
            let log = Arc::new(Mutex::new(ProbeLog::default()));
            let probe = Box::new(Self {
                base: WindowBase::new("Probe", rect, pool.clone()),
                log: log.clone(),
            });
            (probe, log)
        }
    }

    impl Widget for Probe {
        fn window_base(&self) -> &WindowBase {
            &self.base
        }

        fn window_base_mut(&mut self) -> &mut WindowBase {
            &mut self.base
        }

        fn key_press_event(&mut self, event: &KeyEvent) -> bool {
            self.log.lock().keys.push(*event);
            true
        }

        fn mouse_event(&mut self, event: &MouseEvent) {
            self.log.lock().mouse.push(*event);
        }

        fn show_event(&mut self) {
            self.log.lock().shown += 1;
        }
    }

    fn pool() -> Arc<ColorPairPool> {
        ColorPairPool::new()
    }

    #[test]
    fn test_resize_bounds_checked() {
        let pool = pool();
        let mut panel = Panel::new(Rect::new(0, 0, 20, 10), pool);
        panel.window_base_mut().set_min_size(Size::new(5, 3));
        panel.window_base_mut().set_max_size(Size::new(40, 20));

        let err = panel.resize(Size::new(4, 3)).unwrap_err();
        assert!(matches!(err, ResizeError::TooSmall { .. }));
        assert_eq!(panel.window_base().size(), Size::new(20, 10));

        let err = panel.resize(Size::new(41, 10)).unwrap_err();
        assert!(matches!(err, ResizeError::TooBig { .. }));
        assert_eq!(panel.window_base().size(), Size::new(20, 10));

        panel.resize(Size::new(30, 15)).unwrap();
        assert_eq!(panel.window_base().size(), Size::new(30, 15));
        assert_eq!(panel.window_base().surface().size(), Size::new(30, 15));
    }

    #[test]
    fn test_key_forwarding_to_focused_child() {
        let pool = pool();
        let mut panel = Panel::new(Rect::new(0, 0, 20, 10), pool.clone());
        let (first, _) = Probe::boxed(Rect::new(0, 0, 20, 5), &pool);
        let (second, second_log) = Probe::boxed(Rect::new(0, 5, 20, 5), &pool);
        panel.add_child(first);
        panel.add_child(second);
        panel.focus_child(1);

        assert!(panel.key_press_event(&KeyEvent::char('x')));

        let log = second_log.lock();
        assert_eq!(log.keys.len(), 1);
        assert_eq!(log.keys[0].code, KeyCode::Char('x'));
    }

    #[test]
    fn test_mouse_routing_translates_and_refocuses() {
        let pool = pool();
        let mut panel = Panel::new(Rect::new(0, 0, 20, 10), pool.clone());
        let (first, _) = Probe::boxed(Rect::new(0, 0, 20, 5), &pool);
        let (second, second_log) = Probe::boxed(Rect::new(0, 5, 20, 5), &pool);
        panel.add_child(first);
        panel.add_child(second);
        assert_eq!(panel.focused_child_index(), Some(0));

        let event = MouseEvent {
            kind: crate::event::MouseEventKind::Press,
            button: crate::event::MouseButton::Left,
            pos: Point::new(3, 7),
        };
        panel.mouse_event(&event);

        // The press landed in the second child, which took focus and saw
        // local coordinates.
        assert_eq!(panel.focused_child_index(), Some(1));
        let log = second_log.lock();
        assert_eq!(log.mouse.len(), 1);
        assert_eq!(log.mouse[0].pos, Point::new(3, 2));
        assert!(panel.child(1).unwrap().window_base().has_focus());
    }

    #[test]
    fn test_focus_change_notifies_both_sides() {
        let pool = pool();
        let mut panel = Panel::new(Rect::new(0, 0, 20, 10), pool.clone());
        let (first, _) = Probe::boxed(Rect::new(0, 0, 20, 5), &pool);
        let (second, _) = Probe::boxed(Rect::new(0, 5, 20, 5), &pool);
        panel.add_child(first);
        panel.add_child(second);

        assert!(panel.child(0).unwrap().window_base().has_focus());
        panel.focus_child(1);
        assert!(!panel.child(0).unwrap().window_base().has_focus());
        assert!(panel.child(1).unwrap().window_base().has_focus());

        // Refocusing the same child is a no-op.
        panel.focus_child(1);
        assert!(panel.child(1).unwrap().window_base().has_focus());
    }

    #[test]
    fn test_hide_is_recursive_show_fires_event() {
        let pool = pool();
        let mut panel = Panel::new(Rect::new(0, 0, 20, 10), pool.clone());
        let (probe, probe_log) = Probe::boxed(Rect::new(0, 0, 20, 5), &pool);
        panel.add_child(probe);

        panel.hide();
        assert!(!panel.window_base().is_visible());
        assert!(!panel.child(0).unwrap().window_base().is_visible());

        panel.show();
        assert!(panel.window_base().is_visible());
        assert!(panel.child(0).unwrap().window_base().is_visible());
        assert_eq!(probe_log.lock().shown, 1);
    }

    #[test]
    fn test_stack_panel_shows_only_active_child() {
        let pool = pool();
        let mut stack = StackPanel::new(Rect::new(0, 0, 20, 10), pool.clone());
        let (first, _) = Probe::boxed(Rect::new(0, 0, 20, 10), &pool);
        let (second, _) = Probe::boxed(Rect::new(0, 0, 20, 10), &pool);
        stack.add_child(first);
        stack.add_child(second);

        assert!(stack.child(0).unwrap().window_base().is_visible());
        assert!(!stack.child(1).unwrap().window_base().is_visible());

        stack.set_active(1);
        assert!(!stack.child(0).unwrap().window_base().is_visible());
        assert!(stack.child(1).unwrap().window_base().is_visible());

        // Hiding and showing the stack keeps only the active child visible.
        stack.hide();
        stack.show();
        assert!(!stack.child(0).unwrap().window_base().is_visible());
        assert!(stack.child(1).unwrap().window_base().is_visible());
    }

    #[test]
    fn test_move_propagates_absolute_positions() {
        let pool = pool();
        let mut panel = Panel::new(Rect::new(2, 2, 20, 10), pool.clone());
        let (probe, _) = Probe::boxed(Rect::new(1, 1, 5, 3), &pool);
        panel.add_child(probe);

        assert_eq!(
            panel.child(0).unwrap().window_base().screen_pos(),
            Point::new(3, 3)
        );

        panel.move_to(Point::new(10, 4));
        assert_eq!(panel.window_base().screen_pos(), Point::new(10, 4));
        assert_eq!(
            panel.child(0).unwrap().window_base().screen_pos(),
            Point::new(11, 5)
        );
    }

    #[test]
    fn test_hidden_window_accumulates_no_repaint() {
        let pool = pool();
        let mut panel = Panel::new(Rect::new(0, 0, 20, 10), pool);
        panel.hide();
        panel.window_base_mut().clear_repaint_flag();
        panel.window_base_mut().update();
        assert!(!panel.window_base().needs_repaint());

        panel.show();
        assert!(panel.window_base().needs_repaint());
    }
}
