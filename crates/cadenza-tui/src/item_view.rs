//! The item-view state machine: viewport, current item and selection.
//!
//! [`ItemView`] is the model-facing half of every list widget. It tracks
//! three pieces of state over an item count it is kept informed about:
//!
//! - the **current item** (`None` while empty),
//! - the **viewport**, a half-open, contiguous range of visible indices,
//! - the **selection**, a sorted, duplicate-free set of indices.
//!
//! Two invariants hold after every single mutation:
//!
//! 1. The viewport spans exactly the window's line count whenever the model
//!    holds more items than fit, and spans the whole model otherwise.
//! 2. The current item is inside the viewport, or `None`.
//!
//! Every structural notification returns the [`Repaint`] band the owning
//! widget must redraw. Index-based operations silently ignore out-of-range
//! input: these are interactive operations, not a checked API.

/// What a mutation requires the widget to redraw, in item indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repaint {
    /// Nothing visible changed.
    None,
    /// Redraw everything.
    Full,
    /// Redraw the items in the given index range (intersected with the
    /// viewport by the caller).
    Lines(std::ops::Range<usize>),
}

/// Viewport, current item and selection over an externally owned list.
#[derive(Debug)]
pub struct ItemView {
    /// Item count as of the last notification.
    count: usize,
    /// Visible lines available to the widget.
    lines: usize,
    /// The current (keyboard-focused) item.
    current: Option<usize>,
    /// Half-open range of visible items.
    begin: usize,
    end: usize,
    /// Selected indices, sorted and duplicate-free.
    selection: Vec<usize>,
}

impl ItemView {
    /// Create a view over an empty model with the given window height.
    pub fn new(lines: usize) -> Self {
        Self {
            count: 0,
            lines,
            current: None,
            begin: 0,
            end: 0,
            selection: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The item count this view believes the model has.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The current item, `None` while the model is empty.
    pub fn current_item(&self) -> Option<usize> {
        self.current
    }

    /// The visible range of items.
    pub fn viewport(&self) -> std::ops::Range<usize> {
        self.begin..self.end
    }

    /// The selected indices, sorted and duplicate-free.
    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    /// Whether `index` is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.binary_search(&index).is_ok()
    }

    /// The window height the viewport is sized against.
    pub fn lines(&self) -> usize {
        self.lines
    }

    // =========================================================================
    // Structural notifications
    // =========================================================================

    /// The model was replaced or reloaded; `count` is its new length.
    ///
    /// A non-empty model starts with the first item current and the viewport
    /// anchored at the top.
    pub fn reset(&mut self, count: usize) -> Repaint {
        self.count = count;
        self.selection.clear();
        if count > 0 {
            self.current = Some(0);
            self.begin = 0;
            self.end = count.min(self.lines);
        } else {
            self.current = None;
            self.begin = 0;
            self.end = 0;
        }
        tracing::trace!(target: "cadenza_tui::item_view", count, "reset");
        Repaint::Full
    }

    /// An item was appended at the end.
    pub fn item_added(&mut self) -> Repaint {
        let old_count = self.count;
        if old_count == 0 {
            return self.reset(1);
        }
        self.count += 1;
        // The tail was visible and the window has room: the new item
        // scrolls into view.
        if self.end == old_count && self.end - self.begin < self.lines {
            self.end += 1;
            return Repaint::Lines(old_count..self.count);
        }
        Repaint::None
    }

    /// An item was inserted at `at`, shifting `at..` up by one.
    pub fn item_inserted(&mut self, at: usize) -> Repaint {
        let old_count = self.count;
        if at > old_count {
            return Repaint::None;
        }
        if old_count == 0 {
            return self.reset(1);
        }
        self.count += 1;
        if self.end == old_count && self.end - self.begin < self.lines {
            self.end += 1;
        }
        for index in &mut self.selection {
            if *index >= at {
                *index += 1;
            }
        }
        Repaint::Lines(at..self.count)
    }

    /// The item at `at` was removed, shifting `at+1..` down by one.
    pub fn item_removed(&mut self, at: usize) -> Repaint {
        let old_count = self.count;
        if at >= old_count {
            return Repaint::None;
        }
        self.count -= 1;

        // Selection: `at` itself is dropped, later indices slide down.
        if let Ok(pos) = self.selection.binary_search(&at) {
            self.selection.remove(pos);
        }
        for index in &mut self.selection {
            if *index > at {
                *index -= 1;
            }
        }

        // Current: shifts down when after the removal point; when equal it
        // keeps its index and shows the successor ("refreshed in place"),
        // clamped when the removed item was the last.
        if let Some(current) = self.current {
            self.current = if self.count == 0 {
                None
            } else if current > at {
                Some(current - 1)
            } else {
                Some(current.min(self.count - 1))
            };
        }

        if self.count <= self.lines {
            // Everything fits now; the viewport collapses onto the model.
            self.begin = 0;
            self.end = self.count;
            return Repaint::Full;
        }

        if at < self.begin {
            // Content before the viewport shrank: indices slide, the
            // visible items are unchanged.
            self.begin -= 1;
            self.end -= 1;
            Repaint::None
        } else if at < self.end {
            if self.end > self.count {
                // The viewport overhangs the shortened tail: slide up.
                self.end = self.count;
                self.begin = self.end - self.lines;
                Repaint::Full
            } else {
                // The band from the removal point on shows new content.
                Repaint::Lines(at..self.end)
            }
        } else {
            Repaint::None
        }
    }

    /// The item at `from` was moved so it now lives at `to`.
    ///
    /// The selected-status of `from` is carried to `to`; indices between
    /// the two shift by one toward the vacated slot. The repaint band is
    /// the union of both positions.
    pub fn item_moved(&mut self, from: usize, to: usize) -> Repaint {
        if from >= self.count || to >= self.count || from == to {
            return Repaint::None;
        }
        let remap = |index: usize| -> usize {
            if index == from {
                to
            } else if from < to && index > from && index <= to {
                index - 1
            } else if to < from && index >= to && index < from {
                index + 1
            } else {
                index
            }
        };
        for index in &mut self.selection {
            *index = remap(*index);
        }
        self.selection.sort_unstable();
        self.current = self.current.map(remap);
        self.snap_current_into_viewport();
        Repaint::Lines(from.min(to)..from.max(to) + 1)
    }

    /// The window height changed.
    pub fn set_lines(&mut self, lines: usize) -> Repaint {
        self.lines = lines;
        if self.count <= self.lines {
            self.begin = 0;
            self.end = self.count;
        } else {
            self.begin = self.begin.min(self.count - self.lines);
            self.end = self.begin + self.lines;
        }
        self.snap_current_into_viewport();
        Repaint::Full
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Make `item` current, relocating the viewport if it is not visible.
    ///
    /// Jumping backward past the viewport start puts the item on the last
    /// visible line; jumping forward past the viewport end puts it on the
    /// first. Out-of-range indices are ignored.
    pub fn set_current_item(&mut self, item: usize) -> Repaint {
        if item >= self.count {
            return Repaint::None;
        }
        self.current = Some(item);
        self.scroll_viewport_to(item);
        Repaint::Full
    }

    /// Relocate the viewport so `item` is visible without changing the
    /// current item; if the current item leaves the viewport it snaps to
    /// the nearest edge.
    pub fn scroll_to_item(&mut self, item: usize) -> Repaint {
        if item >= self.count {
            return Repaint::None;
        }
        self.scroll_viewport_to(item);
        self.snap_current_into_viewport();
        Repaint::Full
    }

    /// Move the current item one step toward the start, scrolling the
    /// viewport by one line when it walks off the top.
    pub fn step_up(&mut self) -> Repaint {
        let Some(current) = self.current else {
            return Repaint::None;
        };
        if current == 0 {
            return Repaint::None;
        }
        let next = current - 1;
        self.current = Some(next);
        if next < self.begin {
            self.begin -= 1;
            self.end -= 1;
            return Repaint::Full;
        }
        Repaint::Lines(next..current + 1)
    }

    /// Move the current item one step toward the end, scrolling the
    /// viewport by one line when it walks off the bottom.
    pub fn step_down(&mut self) -> Repaint {
        let Some(current) = self.current else {
            if self.count > 0 {
                self.current = Some(self.begin);
                return Repaint::Lines(self.begin..self.begin + 1);
            }
            return Repaint::None;
        };
        if current + 1 >= self.count {
            return Repaint::None;
        }
        let next = current + 1;
        self.current = Some(next);
        if next >= self.end {
            self.begin += 1;
            self.end += 1;
            return Repaint::Full;
        }
        Repaint::Lines(current..next + 1)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Add `item` to the selection. Out-of-range or already-selected input
    /// is ignored.
    pub fn select_item(&mut self, item: usize) {
        if item >= self.count {
            return;
        }
        if let Err(pos) = self.selection.binary_search(&item) {
            self.selection.insert(pos, item);
        }
    }

    /// Remove `item` from the selection if present.
    pub fn unselect_item(&mut self, item: usize) {
        if let Ok(pos) = self.selection.binary_search(&item) {
            self.selection.remove(pos);
        }
    }

    /// Replace the selection with its complement over the full index range.
    pub fn invert_selection(&mut self) {
        let mut inverted = Vec::with_capacity(self.count - self.selection.len().min(self.count));
        let mut selected = self.selection.iter().copied().peekable();
        for index in 0..self.count {
            if selected.peek() == Some(&index) {
                selected.next();
            } else {
                inverted.push(index);
            }
        }
        self.selection = inverted;
    }

    /// Drop the whole selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn scroll_viewport_to(&mut self, item: usize) {
        if self.count <= self.lines {
            self.begin = 0;
            self.end = self.count;
            return;
        }
        if item < self.begin {
            // Backward jump: the item lands on the last visible line.
            self.end = (item + 1).max(self.lines);
            self.begin = self.end - self.lines;
        } else if item >= self.end {
            // Forward jump: the item lands on the first visible line.
            self.begin = item.min(self.count - self.lines);
            self.end = self.begin + self.lines;
        }
    }

    fn snap_current_into_viewport(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        if self.begin == self.end {
            return;
        }
        if current < self.begin {
            self.current = Some(self.begin);
        } else if current >= self.end {
            self.current = Some(self.end - 1);
        }
    }

    /// Verify both structural invariants; used by the property tests.
    #[cfg(test)]
    fn assert_invariants(&self) {
        // Viewport shape.
        if self.count <= self.lines {
            assert_eq!(self.begin, 0, "viewport must anchor at 0 when all fits");
            assert_eq!(self.end, self.count, "viewport must span a fitting model");
        } else {
            assert_eq!(
                self.end - self.begin,
                self.lines,
                "viewport must span the window when the model overflows it"
            );
            assert!(self.end <= self.count, "viewport must not overhang the model");
        }
        // Current item.
        match self.current {
            None => assert_eq!(self.count, 0, "only an empty model has no current item"),
            Some(current) => {
                assert!(
                    current >= self.begin && current < self.end,
                    "current item {current} outside viewport {}..{}",
                    self.begin,
                    self.end
                );
            }
        }
        // Selection.
        for pair in self.selection.windows(2) {
            assert!(pair[0] < pair[1], "selection must be sorted and unique");
        }
        if let Some(&last) = self.selection.last() {
            assert!(last < self.count, "selection must stay within the model");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn view(count: usize, lines: usize) -> ItemView {
        let mut view = ItemView::new(lines);
        view.reset(count);
        view
    }

    #[test]
    fn test_reset_non_empty() {
        let view = view(4, 2);
        assert_eq!(view.current_item(), Some(0));
        assert_eq!(view.viewport(), 0..2);
    }

    #[test]
    fn test_reset_empty() {
        let view = view(0, 2);
        assert_eq!(view.current_item(), None);
        assert_eq!(view.viewport(), 0..0);
    }

    #[test]
    fn test_insert_with_full_window_keeps_viewport() {
        // Four items, window height 2. reset() gives
        // current 0, viewport [0,2). Inserting "x" at 1 leaves the viewport
        // untouched because the tail was not visible.
        let mut view = view(4, 2);
        let repaint = view.item_inserted(1);
        assert_eq!(view.count(), 5);
        assert_eq!(view.viewport(), 0..2);
        assert_eq!(view.current_item(), Some(0));
        assert_eq!(repaint, Repaint::Lines(1..5));
        view.assert_invariants();
    }

    #[test]
    fn test_append_grows_visible_tail() {
        let mut view = view(2, 4);
        assert_eq!(view.viewport(), 0..2);
        let repaint = view.item_added();
        assert_eq!(view.viewport(), 0..3);
        assert_eq!(repaint, Repaint::Lines(2..3));
        view.assert_invariants();
    }

    #[test]
    fn test_append_beyond_window_is_silent() {
        let mut view = view(4, 2);
        let repaint = view.item_added();
        assert_eq!(view.viewport(), 0..2);
        assert_eq!(repaint, Repaint::None);
        view.assert_invariants();
    }

    #[test]
    fn test_append_to_empty_resets() {
        let mut view = view(0, 2);
        view.item_added();
        assert_eq!(view.current_item(), Some(0));
        assert_eq!(view.viewport(), 0..1);
        view.assert_invariants();
    }

    #[test]
    fn test_insert_shifts_selection() {
        let mut view = view(5, 10);
        view.select_item(1);
        view.select_item(3);
        view.item_inserted(2);
        assert_eq!(view.selection(), &[1, 4]);
        // Insertion exactly at a selected index shifts it too.
        view.item_inserted(1);
        assert_eq!(view.selection(), &[2, 5]);
        view.assert_invariants();
    }

    #[test]
    fn test_remove_adjusts_selection_and_current() {
        let mut view = view(6, 10);
        view.set_current_item(4);
        view.select_item(2);
        view.select_item(4);
        view.select_item(5);

        // Removing a selected index drops it; later ones slide down.
        view.item_removed(4);
        assert_eq!(view.selection(), &[2, 4]);
        // Current equalled the removal point: refreshed in place.
        assert_eq!(view.current_item(), Some(4));

        // Removing before the current item shifts it down.
        view.item_removed(0);
        assert_eq!(view.current_item(), Some(3));
        assert_eq!(view.selection(), &[1, 3]);
        view.assert_invariants();
    }

    #[test]
    fn test_remove_boundary_at_equals_selection_min() {
        // Boundary case pinned deliberately: removing the smallest selected
        // index drops exactly that entry.
        let mut view = view(4, 10);
        view.select_item(0);
        view.select_item(2);
        view.item_removed(0);
        assert_eq!(view.selection(), &[1]);
        view.assert_invariants();
    }

    #[test]
    fn test_remove_last_item_clamps_current() {
        let mut view = view(3, 10);
        view.set_current_item(2);
        view.item_removed(2);
        assert_eq!(view.current_item(), Some(1));
        view.item_removed(1);
        view.item_removed(0);
        assert_eq!(view.current_item(), None);
        assert_eq!(view.viewport(), 0..0);
        view.assert_invariants();
    }

    #[test]
    fn test_remove_before_viewport_slides_indices() {
        let mut view = view(10, 3);
        view.set_current_item(6); // viewport becomes 6..9
        assert_eq!(view.viewport(), 6..9);
        let repaint = view.item_removed(1);
        // Same items visible under new indices; nothing repaints.
        assert_eq!(view.viewport(), 5..8);
        assert_eq!(view.current_item(), Some(5));
        assert_eq!(repaint, Repaint::None);
        view.assert_invariants();
    }

    #[test]
    fn test_remove_in_last_page_slides_viewport_up() {
        let mut view = view(5, 3);
        view.set_current_item(4); // viewport 2..5
        assert_eq!(view.viewport(), 2..5);
        let repaint = view.item_removed(3);
        assert_eq!(view.viewport(), 1..4);
        assert_eq!(repaint, Repaint::Full);
        assert_eq!(view.current_item(), Some(3));
        view.assert_invariants();
    }

    #[test]
    fn test_remove_shrinks_to_fit() {
        let mut view = view(4, 3);
        view.set_current_item(3); // viewport 1..4
        let repaint = view.item_removed(0);
        assert_eq!(view.viewport(), 0..3);
        assert_eq!(repaint, Repaint::Full);
        view.assert_invariants();
    }

    #[test]
    fn test_move_carries_selected_status() {
        let mut forward = view(6, 10);
        forward.select_item(1);
        forward.select_item(2);
        let repaint = forward.item_moved(1, 4);
        // 1 travels to 4; 2 slides down into the vacated slot.
        assert_eq!(forward.selection(), &[1, 4]);
        assert_eq!(repaint, Repaint::Lines(1..5));

        let mut backward = view(6, 10);
        backward.select_item(4);
        backward.item_moved(4, 1);
        assert_eq!(backward.selection(), &[1]);
        backward.assert_invariants();
    }

    #[test]
    fn test_move_adjacent_indices() {
        // Boundary case: swapping neighbours.
        let mut view = view(4, 10);
        view.select_item(2);
        view.item_moved(2, 3);
        assert_eq!(view.selection(), &[3]);
        view.item_moved(3, 2);
        assert_eq!(view.selection(), &[2]);
        view.assert_invariants();
    }

    #[test]
    fn test_set_current_backward_lands_on_last_line() {
        let mut view = view(20, 5);
        view.set_current_item(15); // forward: first visible line
        assert_eq!(view.viewport(), 15..20);
        view.set_current_item(3); // backward: last visible line
        assert_eq!(view.viewport(), 0..5);
        assert_eq!(view.current_item(), Some(3));

        view.set_current_item(10);
        assert_eq!(view.viewport(), 10..15);
        view.set_current_item(7);
        assert_eq!(view.viewport(), 3..8);
        view.assert_invariants();
    }

    #[test]
    fn test_set_current_out_of_range_is_ignored() {
        let mut view = view(4, 2);
        assert_eq!(view.set_current_item(9), Repaint::None);
        assert_eq!(view.current_item(), Some(0));
    }

    #[test]
    fn test_scroll_to_item_snaps_current_to_edge() {
        let mut view = view(20, 5);
        assert_eq!(view.current_item(), Some(0));
        view.scroll_to_item(12); // viewport 12..17, current snaps to 12
        assert_eq!(view.viewport(), 12..17);
        assert_eq!(view.current_item(), Some(12));

        view.set_current_item(16);
        view.scroll_to_item(2); // viewport 0..5, current snaps to 4
        assert_eq!(view.viewport(), 0..5);
        assert_eq!(view.current_item(), Some(4));
        view.assert_invariants();
    }

    #[test]
    fn test_step_scrolls_by_one() {
        let mut view = view(5, 2);
        assert_eq!(view.step_down(), Repaint::Lines(0..2));
        assert_eq!(view.current_item(), Some(1));
        assert_eq!(view.viewport(), 0..2);

        assert_eq!(view.step_down(), Repaint::Full);
        assert_eq!(view.viewport(), 1..3);

        view.step_up();
        assert_eq!(view.current_item(), Some(1));
        assert_eq!(view.viewport(), 1..3);
        assert_eq!(view.step_up(), Repaint::Full);
        assert_eq!(view.viewport(), 0..2);

        // At the ends the cursor stays put.
        assert_eq!(view.step_up(), Repaint::None);
        view.set_current_item(4);
        assert_eq!(view.step_down(), Repaint::None);
        view.assert_invariants();
    }

    #[test]
    fn test_selection_stays_sorted_unique() {
        let mut view = view(6, 10);
        view.select_item(4);
        view.select_item(1);
        view.select_item(4);
        view.select_item(3);
        assert_eq!(view.selection(), &[1, 3, 4]);
        view.unselect_item(3);
        view.unselect_item(3);
        assert_eq!(view.selection(), &[1, 4]);
        view.select_item(17); // out of range, ignored
        assert_eq!(view.selection(), &[1, 4]);
    }

    #[test]
    fn test_invert_selection_is_involution() {
        let mut view = view(7, 10);
        view.select_item(0);
        view.select_item(3);
        view.select_item(6);
        let original = view.selection().to_vec();

        view.invert_selection();
        assert_eq!(view.selection(), &[1, 2, 4, 5]);
        view.invert_selection();
        assert_eq!(view.selection(), original);

        // Holds for the empty selection too.
        view.clear_selection();
        view.invert_selection();
        assert_eq!(view.selection(), &[0, 1, 2, 3, 4, 5, 6]);
        view.invert_selection();
        assert!(view.selection().is_empty());
    }

    #[test]
    fn test_set_lines_reanchors_viewport() {
        let mut view = view(10, 4);
        view.set_current_item(9); // viewport 6..10
        view.set_lines(8);
        assert_eq!(view.viewport(), 2..10);
        view.set_lines(12);
        assert_eq!(view.viewport(), 0..10);
        view.assert_invariants();
    }

    #[test]
    fn test_random_mutations_preserve_invariants() {
        // Drive random add/insert/remove/move/
        // navigation/selection sequences and check both invariants after
        // every single mutation.
        let mut rng = StdRng::seed_from_u64(0xCADE);
        for _ in 0..200 {
            let lines = rng.gen_range(1..8);
            let mut view = ItemView::new(lines);
            view.reset(rng.gen_range(0..12));
            view.assert_invariants();

            for _ in 0..120 {
                let count = view.count();
                match rng.gen_range(0..10) {
                    0 => {
                        view.item_added();
                    }
                    1 => {
                        view.item_inserted(rng.gen_range(0..count + 2));
                    }
                    2 => {
                        if count > 0 {
                            view.item_removed(rng.gen_range(0..count + 1));
                        }
                    }
                    3 => {
                        if count > 1 {
                            view.item_moved(rng.gen_range(0..count), rng.gen_range(0..count));
                        }
                    }
                    4 => {
                        view.set_current_item(rng.gen_range(0..count + 2));
                    }
                    5 => {
                        view.scroll_to_item(rng.gen_range(0..count + 2));
                    }
                    6 => {
                        view.step_up();
                    }
                    7 => {
                        view.step_down();
                    }
                    8 => {
                        view.select_item(rng.gen_range(0..count + 2));
                    }
                    _ => {
                        if rng.gen_bool(0.3) {
                            view.invert_selection();
                        } else {
                            view.unselect_item(rng.gen_range(0..count + 2));
                        }
                    }
                }
                view.assert_invariants();
            }
        }
    }
}
