//! Markup to plain text

use scraper::{ElementRef, Html, Node};

/// Elements whose content is never visible text
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "svg", "iframe", "object", "canvas",
];

/// Elements that start and end a paragraph
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "td", "th",
    "tr", "ul",
];

/// Strip markup and return the visible text
///
/// Paragraphs are separated by a blank line and whitespace inside a paragraph
/// collapses to single spaces. Input without any tags is treated as plain
/// text, keeping its blank-line paragraph breaks.
pub fn clean_markup(markup: &str) -> String {
    if !markup.contains('<') {
        return normalize_plain_text(markup);
    }

    let fragment = Html::parse_fragment(markup);
    let mut collector = TextCollector::default();
    collect_text(fragment.root_element(), &mut collector);
    collector.finish()
}

fn collect_text(element: ElementRef<'_>, out: &mut TextCollector) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_text(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                let is_block = BLOCK_ELEMENTS.contains(&name);
                if is_block {
                    out.break_paragraph();
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if is_block {
                    out.break_paragraph();
                }
            }
            _ => {}
        }
    }
}

fn normalize_plain_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let mut collector = TextCollector::default();
    for block in text.split("\n\n") {
        collector.push_text(block);
        collector.break_paragraph();
    }
    collector.finish()
}

#[derive(Default)]
struct TextCollector {
    paragraphs: Vec<String>,
    current: String,
}

impl TextCollector {
    fn push_text(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn break_paragraph(&mut self) {
        let paragraph = self.current.split_whitespace().collect::<Vec<_>>().join(" ");
        if !paragraph.is_empty() {
            self.paragraphs.push(paragraph);
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.break_paragraph();
        self.paragraphs.join("\n\n")
    }
}
