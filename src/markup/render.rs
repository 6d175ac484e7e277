use crate::markup::{Block, Document, Inline};

fn inline_markdown(spans: &[Inline]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Inline::Text(s) => s.clone(),
            Inline::Bold(s) => format!("**{s}**"),
            Inline::Italic(s) => format!("_{s}_"),
        })
        .collect()
}

/// Render to markdown, one output line per logical line
pub fn to_markdown(doc: &Document) -> String {
    markdown_lines(doc).join("\n")
}

/// Markdown with long lines wrapped at `width`; list continuations are indented
pub fn to_markdown_wrapped(doc: &Document, width: usize) -> String {
    let mut out = Vec::new();
    for line in markdown_lines(doc) {
        if line.is_empty() {
            out.push(String::new());
            continue;
        }
        let indent = " ".repeat(list_marker_width(&line));
        let options = textwrap::Options::new(width.max(10))
            .wrap_algorithm(textwrap::WrapAlgorithm::FirstFit)
            .subsequent_indent(&indent);
        out.extend(textwrap::wrap(&line, options).into_iter().map(|l| l.into_owned()));
    }
    out.join("\n")
}

fn list_marker_width(line: &str) -> usize {
    if line.starts_with("- ") {
        return 2;
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && line[digits..].starts_with(". ") {
        digits + 2
    } else {
        0
    }
}

fn markdown_lines(doc: &Document) -> Vec<String> {
    let mut lines = Vec::new();
    for block in &doc.blocks {
        match block {
            Block::Heading { level, content } => {
                lines.push(format!(
                    "{} {}",
                    "#".repeat(*level as usize),
                    inline_markdown(content)
                ));
            }
            Block::Paragraph(content) => lines.push(inline_markdown(content)),
            Block::BulletList(items) => {
                for item in items {
                    lines.push(format!("- {}", inline_markdown(item)));
                }
            }
            Block::OrderedList(items) => {
                for (n, item) in items.iter().enumerate() {
                    lines.push(format!("{}. {}", n + 1, inline_markdown(item)));
                }
            }
            Block::LineBreak => lines.push(String::new()),
        }
    }
    lines
}
