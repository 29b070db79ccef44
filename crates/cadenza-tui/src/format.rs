//! The display-format mini-language.
//!
//! Song-list lines are described by compact format strings:
//!
//! ```text
//! [right:0:4]$n {%2c$a - $t}|{$f} $d
//! ```
//!
//! - `[align:factor:size]` — a column specification (alignment, stretch
//!   factor, fixed size)
//! - `$x` — a single-letter variable reference (`$$` is a literal dollar)
//! - `%Nc` — switch to color `N` from the eight-color table (`%%` is a
//!   literal percent)
//! - `{...}` — an optional section, suppressed entirely when any variable
//!   inside it is empty; `{...}|{...}` chains fallbacks
//! - anything else — literal text
//!
//! Parsing is strict: a malformed string fails with a position-annotated
//! [`FormatError`] surfaced to the user as a configuration error. Rendering
//! never fails; it substitutes variables through a caller-supplied lookup.

use crate::color::TermColor;
use crate::error::FormatError;

/// Column alignment inside a `[...]` spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn parse(name: &str, at: usize) -> Result<Self, FormatError> {
        match name {
            "left" | "l" => Ok(Self::Left),
            "center" | "centre" | "c" => Ok(Self::Center),
            "right" | "r" => Ok(Self::Right),
            other => Err(FormatError::new(at, format!("unknown alignment '{other}'"))),
        }
    }
}

/// One parsed element of a format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatToken {
    /// Literal text, emitted as-is.
    Literal(String),
    /// `$x` — a variable reference.
    Variable(char),
    /// `%Nc` — switch the current color.
    Color(TermColor),
    /// `[align:factor:size]` — a column boundary.
    Column {
        align: Align,
        factor: u16,
        size: u16,
    },
    /// `{...}|{...}` — fallback alternatives; the first whose variables are
    /// all non-empty is rendered.
    Section(Vec<Vec<FormatToken>>),
}

/// A parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    tokens: Vec<FormatToken>,
}

/// One renderable piece of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    /// Text in the color active at that point (`None` = window default).
    Text {
        text: String,
        color: Option<TermColor>,
    },
    /// A column boundary the painter lays out around.
    Column {
        align: Align,
        factor: u16,
        size: u16,
    },
}

impl FormatSpec {
    /// The parsed token list.
    pub fn tokens(&self) -> &[FormatToken] {
        &self.tokens
    }

    /// Substitute variables and resolve sections into paintable runs.
    ///
    /// `lookup` maps a variable letter to its value; `None` and `Some("")`
    /// both count as empty for section suppression.
    pub fn render(&self, lookup: &dyn Fn(char) -> Option<String>) -> Vec<Run> {
        let mut runs = Vec::new();
        render_tokens(&self.tokens, lookup, &mut None, &mut runs, false);
        runs
    }
}

/// Render `tokens`, appending to `runs`. With `strict` set, the first empty
/// variable aborts and reports failure (section semantics).
fn render_tokens(
    tokens: &[FormatToken],
    lookup: &dyn Fn(char) -> Option<String>,
    color: &mut Option<TermColor>,
    runs: &mut Vec<Run>,
    strict: bool,
) -> bool {
    for token in tokens {
        match token {
            FormatToken::Literal(text) => push_text(runs, text.clone(), *color),
            FormatToken::Variable(name) => {
                let value = lookup(*name).unwrap_or_default();
                if value.is_empty() {
                    if strict {
                        return false;
                    }
                } else {
                    push_text(runs, value, *color);
                }
            }
            FormatToken::Color(term_color) => *color = Some(*term_color),
            FormatToken::Column {
                align,
                factor,
                size,
            } => runs.push(Run::Column {
                align: *align,
                factor: *factor,
                size: *size,
            }),
            FormatToken::Section(alternatives) => {
                for alternative in alternatives {
                    let mut attempt = Vec::new();
                    let mut attempt_color = *color;
                    if render_tokens(alternative, lookup, &mut attempt_color, &mut attempt, true) {
                        runs.extend(attempt);
                        *color = attempt_color;
                        break;
                    }
                }
            }
        }
    }
    true
}

fn push_text(runs: &mut Vec<Run>, text: String, color: Option<TermColor>) {
    if text.is_empty() {
        return;
    }
    if let Some(Run::Text {
        text: last,
        color: last_color,
    }) = runs.last_mut()
    {
        if *last_color == color {
            last.push_str(&text);
            return;
        }
    }
    runs.push(Run::Text { text, color });
}

/// Parse a format string.
pub fn parse_format(input: &str) -> Result<FormatSpec, FormatError> {
    let mut parser = Parser {
        input,
        chars: input.char_indices().peekable(),
    };
    let tokens = parser.parse_tokens(false)?;
    Ok(FormatSpec { tokens })
}

struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Parser<'_> {
    /// Parse tokens until end of input or, inside a section, until a
    /// terminator (`}` or `|`) which is left unconsumed.
    fn parse_tokens(&mut self, in_section: bool) -> Result<Vec<FormatToken>, FormatError> {
        let mut tokens = Vec::new();
        let mut literal = String::new();

        macro_rules! flush {
            () => {
                if !literal.is_empty() {
                    tokens.push(FormatToken::Literal(std::mem::take(&mut literal)));
                }
            };
        }

        while let Some(&(at, ch)) = self.chars.peek() {
            match ch {
                '}' | '|' if in_section => break,
                '}' => {
                    return Err(FormatError::new(at, "unmatched '}'"));
                }
                '{' => {
                    flush!();
                    tokens.push(self.parse_section()?);
                }
                '$' => {
                    self.chars.next();
                    match self.chars.next() {
                        Some((_, '$')) => literal.push('$'),
                        Some((_, name)) if name.is_ascii_alphanumeric() => {
                            flush!();
                            tokens.push(FormatToken::Variable(name));
                        }
                        Some((bad_at, bad)) => {
                            return Err(FormatError::new(
                                bad_at,
                                format!("invalid variable reference '${bad}'"),
                            ));
                        }
                        None => {
                            return Err(FormatError::new(at, "dangling '$' at end of format"));
                        }
                    }
                }
                '%' => {
                    self.chars.next();
                    match self.chars.next() {
                        Some((_, '%')) => literal.push('%'),
                        Some((digit_at, digit)) if digit.is_ascii_digit() => {
                            match self.chars.next() {
                                Some((_, 'c')) => {
                                    let index = digit as u8 - b'0';
                                    let color = TermColor::from_format_index(index).ok_or_else(
                                        || {
                                            FormatError::new(
                                                digit_at,
                                                format!("color index {index} out of range 1-8"),
                                            )
                                        },
                                    )?;
                                    flush!();
                                    tokens.push(FormatToken::Color(color));
                                }
                                other => {
                                    let bad_at =
                                        other.map(|(bad_at, _)| bad_at).unwrap_or(self.input.len());
                                    return Err(FormatError::new(
                                        bad_at,
                                        "expected 'c' after color index",
                                    ));
                                }
                            }
                        }
                        Some((bad_at, bad)) => {
                            return Err(FormatError::new(
                                bad_at,
                                format!("invalid color reference '%{bad}'"),
                            ));
                        }
                        None => {
                            return Err(FormatError::new(at, "dangling '%' at end of format"));
                        }
                    }
                }
                '[' => {
                    flush!();
                    tokens.push(self.parse_column(at)?);
                }
                _ => {
                    self.chars.next();
                    literal.push(ch);
                }
            }
        }
        flush!();
        Ok(tokens)
    }

    /// Parse `{...}` with optional `|{...}` fallbacks; the opening brace is
    /// still pending.
    fn parse_section(&mut self) -> Result<FormatToken, FormatError> {
        let mut alternatives = Vec::new();
        loop {
            let open_at = match self.chars.next() {
                Some((at, '{')) => at,
                other => {
                    let at = other.map(|(at, _)| at).unwrap_or(self.input.len());
                    return Err(FormatError::new(at, "expected '{'"));
                }
            };
            let tokens = self.parse_tokens(true)?;
            match self.chars.next() {
                Some((_, '}')) => alternatives.push(tokens),
                Some((at, '|')) => {
                    return Err(FormatError::new(at, "'|' inside section must follow '}'"));
                }
                _ => {
                    return Err(FormatError::new(open_at, "unterminated section"));
                }
            }
            // A '|' immediately after '}' chains another alternative.
            match self.chars.peek() {
                Some(&(pipe_at, '|')) => {
                    self.chars.next();
                    match self.chars.peek() {
                        Some(&(_, '{')) => continue,
                        _ => {
                            return Err(FormatError::new(
                                pipe_at,
                                "expected '{' after section fallback '|'",
                            ));
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(FormatToken::Section(alternatives))
    }

    /// Parse `[align:factor:size]`; the opening bracket is still pending.
    fn parse_column(&mut self, open_at: usize) -> Result<FormatToken, FormatError> {
        self.chars.next(); // consume '['
        let mut body = String::new();
        let mut closed = false;
        for (_, ch) in self.chars.by_ref() {
            if ch == ']' {
                closed = true;
                break;
            }
            body.push(ch);
        }
        if !closed {
            return Err(FormatError::new(open_at, "unterminated column spec"));
        }

        let mut parts = body.split(':');
        let (Some(align), Some(factor), Some(size), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(FormatError::new(
                open_at,
                "column spec must be [align:factor:size]",
            ));
        };
        let align = Align::parse(align, open_at)?;
        let factor = factor
            .parse::<u16>()
            .map_err(|_| FormatError::new(open_at, format!("invalid column factor '{factor}'")))?;
        let size = size
            .parse::<u16>()
            .map_err(|_| FormatError::new(open_at, format!("invalid column size '{size}'")))?;
        Ok(FormatToken::Column {
            align,
            factor,
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(char, &'a str)]) -> impl Fn(char) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_parse_literal_and_variable() {
        let spec = parse_format("by $a!").unwrap();
        assert_eq!(
            spec.tokens(),
            &[
                FormatToken::Literal("by ".to_string()),
                FormatToken::Variable('a'),
                FormatToken::Literal("!".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_color_and_column() {
        let spec = parse_format("[right:0:4]%2c$n").unwrap();
        assert_eq!(
            spec.tokens(),
            &[
                FormatToken::Column {
                    align: Align::Right,
                    factor: 0,
                    size: 4,
                },
                FormatToken::Color(TermColor::Red),
                FormatToken::Variable('n'),
            ]
        );
    }

    #[test]
    fn test_escapes() {
        let spec = parse_format("100$$ %%done").unwrap();
        assert_eq!(
            spec.tokens(),
            &[FormatToken::Literal("100$ %done".to_string())]
        );
    }

    #[test]
    fn test_section_with_fallback() {
        let spec = parse_format("{$a - $t}|{$f}").unwrap();
        let FormatToken::Section(alternatives) = &spec.tokens()[0] else {
            panic!("expected a section");
        };
        assert_eq!(alternatives.len(), 2);

        // All variables present: the first alternative wins.
        let runs = spec.render(&lookup(&[('a', "Artist"), ('t', "Title"), ('f', "file.ogg")]));
        assert_eq!(
            runs,
            vec![Run::Text {
                text: "Artist - Title".to_string(),
                color: None,
            }]
        );

        // Artist missing: fall back to the filename.
        let runs = spec.render(&lookup(&[('a', ""), ('t', "Title"), ('f', "file.ogg")]));
        assert_eq!(
            runs,
            vec![Run::Text {
                text: "file.ogg".to_string(),
                color: None,
            }]
        );

        // Nothing available: the whole section vanishes.
        let runs = spec.render(&lookup(&[]));
        assert!(runs.is_empty());
    }

    #[test]
    fn test_empty_variable_outside_section_renders_nothing() {
        let spec = parse_format("a$xb").unwrap();
        let runs = spec.render(&lookup(&[]));
        assert_eq!(
            runs,
            vec![Run::Text {
                text: "ab".to_string(),
                color: None,
            }]
        );
    }

    #[test]
    fn test_color_scopes_into_runs() {
        let spec = parse_format("%1cx%3cy").unwrap();
        let runs = spec.render(&lookup(&[]));
        assert_eq!(
            runs,
            vec![
                Run::Text {
                    text: "x".to_string(),
                    color: Some(TermColor::Black),
                },
                Run::Text {
                    text: "y".to_string(),
                    color: Some(TermColor::Green),
                },
            ]
        );
    }

    #[test]
    fn test_errors_carry_positions() {
        let err = parse_format("abc$").unwrap_err();
        assert_eq!(err.position, 3);

        let err = parse_format("x%9c").unwrap_err();
        assert_eq!(err.position, 2);

        let err = parse_format("{$a").unwrap_err();
        assert_eq!(err.position, 0);

        let err = parse_format("[left:0]").unwrap_err();
        assert_eq!(err.position, 0);

        let err = parse_format("[sideways:0:4]").unwrap_err();
        assert!(err.message.contains("sideways"));

        let err = parse_format("}").unwrap_err();
        assert_eq!(err.position, 0);

        let err = parse_format("{$a}|x").unwrap_err();
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_nested_sections() {
        let spec = parse_format("{$a{ ($d)}|{}}").unwrap();
        // Outer section with a nested fallback group inside.
        let runs = spec.render(&lookup(&[('a', "Artist"), ('d', "3:45")]));
        assert_eq!(
            runs,
            vec![Run::Text {
                text: "Artist (3:45)".to_string(),
                color: None,
            }]
        );
        let runs = spec.render(&lookup(&[('a', "Artist")]));
        assert_eq!(
            runs,
            vec![Run::Text {
                text: "Artist".to_string(),
                color: None,
            }]
        );
    }
}
