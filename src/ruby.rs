//! Inline ruby (furigana) annotations.
//!
//! Annotated runs use the Unicode interlinear annotation characters:
//! `ANCHOR base SEPARATOR reading TERMINATOR`. Text outside a run belongs to
//! both the displayed text and the reading.

use crate::kana::katakana_to_hiragana;

/// INTERLINEAR ANNOTATION ANCHOR
pub const ANCHOR: char = '\u{FFF9}';
/// INTERLINEAR ANNOTATION SEPARATOR
pub const SEPARATOR: char = '\u{FFFA}';
/// INTERLINEAR ANNOTATION TERMINATOR
pub const TERMINATOR: char = '\u{FFFB}';

const KBD_OPEN: &str = r##"<span background="#00cc99" foreground="#FFFFFF">"##;
const SPAN_CLOSE: &str = "</span>";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Plain(String),
    Annotated { base: String, reading: String },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Plain,
    Base,
    Reading,
}

/// Splits `text` into plain and annotated segments in one pass. A run that
/// is never terminated (or closed before its separator) is emitted as plain
/// text, markers included.
fn segments(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut plain = String::new();
    let mut raw = String::new();
    let mut base = String::new();
    let mut reading = String::new();
    let mut state = ScanState::Plain;

    for c in text.chars() {
        match (state, c) {
            (_, ANCHOR) => {
                if state != ScanState::Plain {
                    plain.push_str(&raw);
                }
                raw.clear();
                raw.push(c);
                base.clear();
                reading.clear();
                state = ScanState::Base;
            }
            (ScanState::Base, SEPARATOR) => {
                raw.push(c);
                state = ScanState::Reading;
            }
            (ScanState::Base, TERMINATOR) => {
                plain.push_str(&raw);
                plain.push(c);
                raw.clear();
                state = ScanState::Plain;
            }
            (ScanState::Reading, TERMINATOR) => {
                if !plain.is_empty() {
                    out.push(Segment::Plain(std::mem::take(&mut plain)));
                }
                out.push(Segment::Annotated {
                    base: std::mem::take(&mut base),
                    reading: std::mem::take(&mut reading),
                });
                raw.clear();
                state = ScanState::Plain;
            }
            (ScanState::Plain, _) => plain.push(c),
            (ScanState::Base, _) => {
                raw.push(c);
                base.push(c);
            }
            (ScanState::Reading, _) => {
                raw.push(c);
                reading.push(c);
            }
        }
    }
    if state != ScanState::Plain {
        plain.push_str(&raw);
    }
    if !plain.is_empty() {
        out.push(Segment::Plain(plain));
    }
    out
}

/// Separates annotated text into the text to type and its kana reading.
/// The reading is normalized to hiragana.
pub fn parse_plain(text: &str) -> (String, String) {
    let mut plain = String::new();
    let mut reading = String::new();
    for segment in segments(text) {
        match segment {
            Segment::Plain(s) => {
                plain.push_str(&s);
                reading.push_str(&s);
            }
            Segment::Annotated { base, reading: r } => {
                plain.push_str(&base);
                reading.push_str(&r);
            }
        }
    }
    (plain, katakana_to_hiragana(&reading))
}

/// A reading floated over `len` plain characters starting at `pos`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ruby {
    pub pos: usize,
    pub len: usize,
    pub reading: String,
    /// Opening style tag in effect for the base text, if any.
    pub tag: String,
}

impl Ruby {
    /// The reading wrapped in the base text's style.
    pub fn decorated(&self) -> String {
        if self.tag.is_empty() {
            self.reading.clone()
        } else {
            format!("{}{}{}", self.tag, self.reading, SPAN_CLOSE)
        }
    }
}

/// Text laid out for display: the base text (with or without markup) and
/// the readings to draw above it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RubyText {
    pub plain: String,
    /// The input with readings removed and tags kept. Empty for
    /// [`RubyText::from_text`].
    pub markup: String,
    pub rubies: Vec<Ruby>,
}

#[derive(Default)]
struct TagTracker {
    tag: String,
    in_open_tag: bool,
    in_close_tag: bool,
}

impl TagTracker {
    /// Feeds one markup char; returns true when it is visible text.
    fn feed(&mut self, c: char) -> bool {
        if self.in_open_tag {
            self.tag.push(c);
            if c == '>' {
                self.in_open_tag = false;
            }
            false
        } else if self.in_close_tag {
            if c == '>' {
                self.in_close_tag = false;
            }
            false
        } else if c == '<' {
            if self.tag.is_empty() {
                self.in_open_tag = true;
                self.tag.push(c);
            } else {
                self.in_close_tag = true;
                self.tag.clear();
            }
            false
        } else {
            true
        }
    }
}

impl RubyText {
    pub fn from_text(text: &str) -> Self {
        let mut layout = RubyText::default();
        let mut pos = 0;
        for segment in segments(text) {
            match segment {
                Segment::Plain(s) => {
                    pos += s.chars().count();
                    layout.plain.push_str(&s);
                }
                Segment::Annotated { base, reading } => {
                    let len = base.chars().count();
                    layout.plain.push_str(&base);
                    layout.rubies.push(Ruby {
                        pos,
                        len,
                        reading,
                        tag: String::new(),
                    });
                    pos += len;
                }
            }
        }
        layout
    }

    /// Like [`RubyText::from_text`] for text carrying inline style tags.
    /// A single open tag around an annotated run is carried over to its
    /// reading so both are drawn alike.
    pub fn from_markup(text: &str) -> Self {
        let mut layout = RubyText::default();
        let mut tags = TagTracker::default();
        let mut pos = 0;
        for segment in segments(text) {
            match segment {
                Segment::Plain(s) => {
                    for c in s.chars() {
                        layout.markup.push(c);
                        if tags.feed(c) {
                            layout.plain.push(c);
                            pos += 1;
                        }
                    }
                }
                Segment::Annotated { base, reading } => {
                    let start = pos;
                    for c in base.chars() {
                        layout.markup.push(c);
                        if tags.feed(c) {
                            layout.plain.push(c);
                            pos += 1;
                        }
                    }
                    layout.rubies.push(Ruby {
                        pos: start,
                        len: pos - start,
                        reading,
                        tag: tags.tag.clone(),
                    });
                }
            }
        }
        layout
    }
}

/// Rewrites `<kbd>` key markers in hint text into highlighted spans.
pub fn kbd_markup(s: &str) -> String {
    s.replace("<kbd>", KBD_OPEN).replace("</kbd>", SPAN_CLOSE)
}

/// Expands the `{base|reading}` shorthand into annotation characters.
/// Braces without a `|` are left as they are.
pub fn expand_braces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if after[..close].contains('|') => {
                let (base, reading) = after[..close].split_once('|').unwrap_or_default();
                out.push(ANCHOR);
                out.push_str(base);
                out.push(SEPARATOR);
                out.push_str(reading);
                out.push(TERMINATOR);
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
