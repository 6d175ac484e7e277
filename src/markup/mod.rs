//! Jira wiki markup to a presentation-neutral document tree.
//!
//! Supported: `h1.`..`h6.` headings, `* ` bullets, `1. ` numbered items, blank
//! lines, and the inline spans `*bold*` and `_italic_`. Spans never nest and
//! escapes are not recognised; an unmatched delimiter is plain text.
//!
//! A heading marker anywhere in a line turns the line into a heading holding the
//! text after the marker, and heading detection runs before list detection.

pub mod render;

use regex::Regex;
use std::sync::LazyLock;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"h([1-6])\. (.+)").unwrap());

static ORDERED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+\. (.+)$").unwrap());

static INLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*|_([^_]+)_").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    BulletList(Vec<Vec<Inline>>),
    OrderedList(Vec<Vec<Inline>>),
    LineBreak,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Ordered,
}

/// Collects list items until a non-list line closes the list
#[derive(Default)]
struct ListBuffer {
    kind: Option<ListKind>,
    items: Vec<Vec<Inline>>,
}

impl ListBuffer {
    fn push(&mut self, kind: ListKind, item: Vec<Inline>, blocks: &mut Vec<Block>) {
        if self.kind.is_some_and(|open| open != kind) {
            self.flush(blocks);
        }
        self.kind = Some(kind);
        self.items.push(item);
    }

    fn flush(&mut self, blocks: &mut Vec<Block>) {
        let items = std::mem::take(&mut self.items);
        match self.kind.take() {
            Some(ListKind::Bullet) if !items.is_empty() => blocks.push(Block::BulletList(items)),
            Some(ListKind::Ordered) if !items.is_empty() => blocks.push(Block::OrderedList(items)),
            _ => {}
        }
    }
}

/// Parse a description line by line
pub fn parse_markup(text: &str) -> Document {
    let normalized = text.replace("\r\n", "\n");
    let mut blocks = Vec::new();
    let mut list = ListBuffer::default();

    for line in normalized.split('\n') {
        if let Some(caps) = HEADING_RE.captures(line) {
            list.flush(&mut blocks);
            let level = caps[1].parse().unwrap_or(1);
            blocks.push(Block::Heading {
                level,
                content: parse_inline(&caps[2]),
            });
            continue;
        }

        if let Some(item) = line.strip_prefix("* ") {
            list.push(ListKind::Bullet, parse_inline(item), &mut blocks);
            continue;
        }

        if let Some(caps) = ORDERED_RE.captures(line) {
            list.push(ListKind::Ordered, parse_inline(&caps[1]), &mut blocks);
            continue;
        }

        list.flush(&mut blocks);
        if line.trim().is_empty() {
            blocks.push(Block::LineBreak);
        } else {
            blocks.push(Block::Paragraph(parse_inline(line)));
        }
    }

    list.flush(&mut blocks);
    Document { blocks }
}

/// Split a line into text, bold and italic spans, left to right
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in INLINE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            spans.push(Inline::Text(text[last..whole.start()].to_string()));
        }
        if let Some(bold) = caps.get(1) {
            spans.push(Inline::Bold(bold.as_str().to_string()));
        } else if let Some(italic) = caps.get(2) {
            spans.push(Inline::Italic(italic.as_str().to_string()));
        }
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Inline::Text(text[last..].to_string()));
    }
    spans
}
