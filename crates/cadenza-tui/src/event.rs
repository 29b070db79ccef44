//! Input events and conversion from the terminal backend.
//!
//! Key events carry either a printable character or a symbolic key, plus
//! Ctrl/Alt modifier bits. Mouse events carry a kind, a button or wheel
//! direction, and a position in the coordinate space of whichever window
//! last received them — the window tree translates coordinates as it
//! forwards events downward.

use crate::geometry::Point;

/// A printable character or a symbolic key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A printable Unicode codepoint.
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Insert,
    Tab,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    /// Function keys F1–F12.
    F(u8),
}

/// A keyboard event as routed through the focus chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key itself.
    pub code: KeyCode,
    /// Control was held.
    pub ctrl: bool,
    /// Alt/Meta was held.
    pub alt: bool,
}

impl KeyEvent {
    /// A bare key press with no modifiers.
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            ctrl: false,
            alt: false,
        }
    }

    /// A printable character with no modifiers.
    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }
}

/// Convert a crossterm key event. Returns `None` for key releases, repeats
/// delivered as such, and keys the toolkit does not route.
pub fn key_event_from_backend(event: &crossterm::event::KeyEvent) -> Option<KeyEvent> {
    use crossterm::event::{KeyCode as Ct, KeyEventKind, KeyModifiers};

    if event.kind == KeyEventKind::Release {
        return None;
    }

    let code = match event.code {
        Ct::Char(c) => KeyCode::Char(c),
        Ct::Enter => KeyCode::Enter,
        Ct::Esc => KeyCode::Escape,
        Ct::Backspace => KeyCode::Backspace,
        Ct::Delete => KeyCode::Delete,
        Ct::Insert => KeyCode::Insert,
        Ct::Tab | Ct::BackTab => KeyCode::Tab,
        Ct::Up => KeyCode::ArrowUp,
        Ct::Down => KeyCode::ArrowDown,
        Ct::Left => KeyCode::ArrowLeft,
        Ct::Right => KeyCode::ArrowRight,
        Ct::Home => KeyCode::Home,
        Ct::End => KeyCode::End,
        Ct::PageUp => KeyCode::PageUp,
        Ct::PageDown => KeyCode::PageDown,
        Ct::F(n @ 1..=12) => KeyCode::F(n),
        _ => return None,
    };

    Some(KeyEvent {
        code,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
    })
}

/// Mouse buttons and wheel directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    /// Button pressed (wheel events are delivered as presses).
    Press,
    /// Second press on the same spot within the double-click interval;
    /// synthesized by the dispatcher.
    DoubleClick,
    /// Button released.
    Release,
}

/// A mouse event in the receiving window's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// What happened.
    pub kind: MouseEventKind,
    /// Which button or wheel direction.
    pub button: MouseButton,
    /// Position, local to the window handling the event.
    pub pos: Point,
}

impl MouseEvent {
    /// This event translated into a child's coordinate space.
    pub fn translated_by(&self, delta: Point) -> Self {
        Self {
            pos: Point::new(self.pos.x - delta.x, self.pos.y - delta.y),
            ..*self
        }
    }
}

/// Convert a crossterm mouse event. Moves and drags are not routed.
pub fn mouse_event_from_backend(event: &crossterm::event::MouseEvent) -> Option<MouseEvent> {
    use crossterm::event::{MouseButton as CtButton, MouseEventKind as CtKind};

    let (kind, button) = match event.kind {
        CtKind::Down(button) => (MouseEventKind::Press, convert_button(button)),
        CtKind::Up(button) => (MouseEventKind::Release, convert_button(button)),
        CtKind::ScrollUp => (MouseEventKind::Press, MouseButton::WheelUp),
        CtKind::ScrollDown => (MouseEventKind::Press, MouseButton::WheelDown),
        _ => return None,
    };

    Some(MouseEvent {
        kind,
        button,
        pos: Point::new(event.column as i32, event.row as i32),
    })
}

fn convert_button(button: crossterm::event::MouseButton) -> MouseButton {
    match button {
        crossterm::event::MouseButton::Left => MouseButton::Left,
        crossterm::event::MouseButton::Middle => MouseButton::Middle,
        crossterm::event::MouseButton::Right => MouseButton::Right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_conversion() {
        use crossterm::event::{KeyCode as Ct, KeyEvent as CtEvent, KeyModifiers};

        let event = CtEvent::new(Ct::Char('q'), KeyModifiers::CONTROL);
        let key = key_event_from_backend(&event).unwrap();
        assert_eq!(key.code, KeyCode::Char('q'));
        assert!(key.ctrl);
        assert!(!key.alt);

        let event = CtEvent::new(Ct::F(5), KeyModifiers::NONE);
        assert_eq!(key_event_from_backend(&event).unwrap().code, KeyCode::F(5));

        // F13+ is outside the routed range.
        let event = CtEvent::new(Ct::F(13), KeyModifiers::NONE);
        assert!(key_event_from_backend(&event).is_none());
    }

    #[test]
    fn test_mouse_translation() {
        let event = MouseEvent {
            kind: MouseEventKind::Press,
            button: MouseButton::Left,
            pos: Point::new(10, 5),
        };
        let local = event.translated_by(Point::new(4, 2));
        assert_eq!(local.pos, Point::new(6, 3));
        assert_eq!(local.button, MouseButton::Left);
    }
}
