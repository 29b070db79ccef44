//! Streaming HTML-subset tokenizer.
//!
//! [`parse`] scans a UTF-8 string once and produces a flat stream of
//! [`Token`]s — no DOM is built; the text-view compiler consumes the stream
//! in order. The recognized vocabulary is the small fixed set of
//! [`TagKind`]; anything else becomes [`TagKind::Unknown`] and is ignored
//! downstream.
//!
//! Outside `<pre>`, runs of whitespace collapse to a single space.
//! `<script>` and `<style>` content is skipped up to the matching close
//! tag. Tokenization never fails: malformed input (an unterminated tag or
//! entity) truncates the stream at the point of damage.

use std::collections::HashMap;

/// The recognized tag vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Bold,
    Underline,
    Blink,
    Font,
    /// Headings `<h1>`–`<h6>`; the level is 1-based.
    Heading(u8),
    LineBreak,
    Paragraph,
    /// Block-level grouping: `<div>`, `<article>`, `<blockquote>`.
    Block,
    ListItem,
    Preformatted,
    Quotation,
    Script,
    Style,
    Title,
    /// Anything the toolkit does not know; skipped by the compiler.
    Unknown,
}

impl TagKind {
    fn from_name(name: &str) -> Self {
        match name {
            "b" => Self::Bold,
            "u" => Self::Underline,
            "blink" => Self::Blink,
            "font" => Self::Font,
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "br" => Self::LineBreak,
            "p" => Self::Paragraph,
            "div" | "article" | "blockquote" => Self::Block,
            "li" => Self::ListItem,
            "pre" => Self::Preformatted,
            "q" => Self::Quotation,
            "script" => Self::Script,
            "style" => Self::Style,
            "title" => Self::Title,
            _ => Self::Unknown,
        }
    }
}

/// One element of the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of text (whitespace-collapsed outside `<pre>`).
    Text(String),
    /// A start or end tag with its attributes (lowercased keys).
    Tag {
        kind: TagKind,
        start: bool,
        attrs: HashMap<String, String>,
    },
    /// A decoded character entity.
    Entity(char),
    /// An entity name the decoder does not know; skipped downstream.
    UnknownEntity(String),
}

impl Token {
    fn start_tag(kind: TagKind) -> Self {
        Self::Tag {
            kind,
            start: true,
            attrs: HashMap::new(),
        }
    }

    fn end_tag(kind: TagKind) -> Self {
        Self::Tag {
            kind,
            start: false,
            attrs: HashMap::new(),
        }
    }
}

/// Named entities the decoder understands.
static ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("copy", '©'),
    ("reg", '®'),
    ("trade", '™'),
    ("hellip", '…'),
    ("mdash", '—'),
    ("ndash", '–'),
    ("laquo", '«'),
    ("raquo", '»'),
    ("ldquo", '“'),
    ("rdquo", '”'),
    ("lsquo", '‘'),
    ("rsquo", '’'),
    ("bull", '•'),
    ("middot", '·'),
    ("deg", '°'),
    ("plusmn", '±'),
    ("times", '×'),
    ("divide", '÷'),
    ("frac12", '½'),
    ("frac14", '¼'),
    ("sup2", '²'),
    ("sup3", '³'),
    ("szlig", 'ß'),
    ("auml", 'ä'),
    ("ouml", 'ö'),
    ("uuml", 'ü'),
    ("Auml", 'Ä'),
    ("Ouml", 'Ö'),
    ("Uuml", 'Ü'),
    ("eacute", 'é'),
    ("egrave", 'è'),
    ("agrave", 'à'),
    ("ccedil", 'ç'),
    ("ntilde", 'ñ'),
];

fn decode_named_entity(name: &str) -> Option<char> {
    ENTITIES
        .iter()
        .find(|(entity, _)| *entity == name)
        .map(|&(_, ch)| ch)
}

fn decode_numeric_entity(body: &str) -> Option<char> {
    let code = if let Some(hex) = body.strip_prefix('x').or_else(|| body.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        body.parse::<u32>().ok()?
    };
    char::from_u32(code)
}

/// Escape the characters that would be misread as markup: `<`, `>`, `&`.
///
/// Not a full inverse of decoding — the decoder accepts a much larger
/// entity set — but `parse(encode_entities(s))` reproduces `s` as text.
pub fn encode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadingText,
    /// Inside `<pre>`: whitespace passes through untouched.
    ReadingTextVerbatim,
    /// Inside `<script>`: discard until the matching close tag.
    ReadingScript,
    /// Inside `<style>`: likewise.
    ReadingStyle,
}

/// Tokenize an HTML-subset string.
pub fn parse(input: &str) -> Vec<Token> {
    Tokenizer::new(input).run()
}

struct Tokenizer<'a> {
    rest: &'a str,
    state: State,
    tokens: Vec<Token>,
    text: String,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            state: State::ReadingText,
            tokens: Vec::new(),
            text: String::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(ch) = self.rest.chars().next() {
            match self.state {
                State::ReadingScript => {
                    if !self.skip_to_close("script") {
                        return self.tokens; // truncated
                    }
                    self.state = State::ReadingText;
                    self.tokens.push(Token::end_tag(TagKind::Script));
                    continue;
                }
                State::ReadingStyle => {
                    if !self.skip_to_close("style") {
                        return self.tokens;
                    }
                    self.state = State::ReadingText;
                    self.tokens.push(Token::end_tag(TagKind::Style));
                    continue;
                }
                _ => {}
            }

            match ch {
                '<' => {
                    self.flush_text();
                    if !self.read_tag() {
                        return self.tokens; // unterminated tag truncates
                    }
                }
                '&' => {
                    self.flush_text();
                    if !self.read_entity() {
                        return self.tokens; // unterminated entity truncates
                    }
                }
                _ => {
                    self.advance(ch.len_utf8());
                    self.push_text_char(ch);
                }
            }
        }
        self.flush_text();
        self.tokens
    }

    fn advance(&mut self, bytes: usize) {
        self.rest = &self.rest[bytes..];
    }

    fn push_text_char(&mut self, ch: char) {
        if self.state == State::ReadingTextVerbatim {
            self.text.push(ch);
            return;
        }
        // Collapse any whitespace run to a single space.
        if ch.is_whitespace() {
            if !self.text.ends_with(' ') {
                self.text.push(' ');
            }
        } else {
            self.text.push(ch);
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.tokens.push(Token::Text(std::mem::take(&mut self.text)));
        }
    }

    /// Parse a `<...>` construct. Returns `false` when the input ends
    /// before the closing `>`.
    fn read_tag(&mut self) -> bool {
        debug_assert!(self.rest.starts_with('<'));
        let Some(close) = self.rest.find('>') else {
            return false;
        };
        let body = &self.rest[1..close];
        self.advance(close + 1);

        let body = body.trim();
        let (is_start, body) = match body.strip_prefix('/') {
            Some(stripped) => (false, stripped.trim_start()),
            None => (true, body),
        };
        // Self-closing syntax like <br/> is treated as a start tag.
        let body = body.strip_suffix('/').unwrap_or(body).trim_end();

        let name_end = body
            .find(|c: char| c.is_whitespace())
            .unwrap_or(body.len());
        let name = body[..name_end].to_ascii_lowercase();
        let kind = TagKind::from_name(&name);
        let attrs = parse_attrs(&body[name_end..]);

        self.tokens.push(Token::Tag {
            kind,
            start: is_start,
            attrs,
        });

        if is_start {
            match kind {
                TagKind::Preformatted => self.state = State::ReadingTextVerbatim,
                TagKind::Script => self.state = State::ReadingScript,
                TagKind::Style => self.state = State::ReadingStyle,
                _ => {}
            }
        } else if kind == TagKind::Preformatted {
            self.state = State::ReadingText;
        }
        true
    }

    /// Parse an `&...;` entity. Returns `false` when the input ends before
    /// the semicolon.
    fn read_entity(&mut self) -> bool {
        debug_assert!(self.rest.starts_with('&'));
        let Some(close) = self.rest.find(';') else {
            return false;
        };
        let name = &self.rest[1..close];
        self.advance(close + 1);

        let token = if let Some(body) = name.strip_prefix('#') {
            match decode_numeric_entity(body) {
                Some(ch) => Token::Entity(ch),
                None => Token::UnknownEntity(name.to_string()),
            }
        } else {
            match decode_named_entity(name) {
                Some(ch) => Token::Entity(ch),
                None => Token::UnknownEntity(name.to_string()),
            }
        };
        self.tokens.push(token);
        true
    }

    /// In script/style state: discard input up to `</name`, leaving the
    /// stream positioned after its `>`. Returns `false` when no close tag
    /// exists.
    fn skip_to_close(&mut self, name: &str) -> bool {
        let lower = self.rest.to_ascii_lowercase();
        let needle = format!("</{name}");
        let Some(at) = lower.find(&needle) else {
            return false;
        };
        let Some(end) = lower[at..].find('>') else {
            return false;
        };
        self.advance(at + end + 1);
        true
    }
}

fn parse_attrs(input: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for piece in input.split_whitespace() {
        match piece.split_once('=') {
            Some((key, value)) => {
                let value = value.trim_matches(|c| c == '"' || c == '\'');
                attrs.insert(key.to_ascii_lowercase(), value.to_string());
            }
            None => {
                attrs.insert(piece.to_ascii_lowercase(), String::new());
            }
        }
    }
    attrs
}
