//! Terminal colors and text attributes.
//!
//! The toolkit works with the classic eight-color terminal table plus a
//! "default" pseudo-color that leaves the terminal's own choice in place.
//! Color-scheme files and `<font color=...>` tags address colors by name
//! from this table only.

use std::fmt;

use bitflags::bitflags;

/// The eight standard terminal colors plus the terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TermColor {
    /// Use whatever the terminal already has configured.
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl TermColor {
    /// All nameable colors, in table order.
    pub const NAMED: [TermColor; 8] = [
        TermColor::Black,
        TermColor::Red,
        TermColor::Green,
        TermColor::Yellow,
        TermColor::Blue,
        TermColor::Magenta,
        TermColor::Cyan,
        TermColor::White,
    ];

    /// Look up a color by its scheme-file name (case-insensitive).
    ///
    /// Returns `None` for unknown names; callers keep their previous color
    /// in that case rather than failing.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "black" => Some(Self::Black),
            "red" => Some(Self::Red),
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            "blue" => Some(Self::Blue),
            "magenta" => Some(Self::Magenta),
            "cyan" => Some(Self::Cyan),
            "white" => Some(Self::White),
            "default" => Some(Self::Default),
            _ => None,
        }
    }

    /// The scheme-file name of this color.
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
        }
    }

    /// Numeric index used by `%Nc` color references in display-format
    /// strings: 1-based into [`TermColor::NAMED`].
    pub fn from_format_index(index: u8) -> Option<Self> {
        match index {
            1..=8 => Some(Self::NAMED[index as usize - 1]),
            _ => None,
        }
    }

    /// Conversion to the backend color type.
    pub fn to_crossterm(self) -> crossterm::style::Color {
        use crossterm::style::Color as C;
        match self {
            Self::Default => C::Reset,
            Self::Black => C::Black,
            Self::Red => C::DarkRed,
            Self::Green => C::DarkGreen,
            Self::Yellow => C::DarkYellow,
            Self::Blue => C::DarkBlue,
            Self::Magenta => C::DarkMagenta,
            Self::Cyan => C::DarkCyan,
            Self::White => C::Grey,
        }
    }
}

impl fmt::Display for TermColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Text attribute mask applied to a painted chunk.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attributes: u8 {
        const BOLD      = 1 << 0;
        const UNDERLINE = 1 << 1;
        const BLINK     = 1 << 2;
        const REVERSE   = 1 << 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trips() {
        for color in TermColor::NAMED {
            assert_eq!(TermColor::from_name(color.name()), Some(color));
        }
        assert_eq!(TermColor::from_name("Magenta"), Some(TermColor::Magenta));
        assert_eq!(TermColor::from_name("chartreuse"), None);
    }

    #[test]
    fn test_format_index_is_one_based() {
        assert_eq!(TermColor::from_format_index(1), Some(TermColor::Black));
        assert_eq!(TermColor::from_format_index(8), Some(TermColor::White));
        assert_eq!(TermColor::from_format_index(0), None);
        assert_eq!(TermColor::from_format_index(9), None);
    }
}
