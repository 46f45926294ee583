use super::elements_named;
use crate::core::patterns::PatternLibrary;
use crate::domain::model::{ContentKind, HallRecord};
use crate::domain::ports::ExtractionStrategy;
use scraper::{ElementRef, Html, Node};

/// Main content containers, tried before falling back to the whole page.
const CONTENT_TAGS: &[&str] = &["article", "main"];
const CONTENT_CLASSES: &[&str] = &["entry-content", "post-content", "content"];

/// Text inside different block elements ends up in different paragraphs.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6", "section", "article",
    "main", "blockquote", "pre", "dd", "dt", "body",
];
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Reads halls from blank-line separated paragraphs of the page text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl ExtractionStrategy for TextExtractor {
    fn kind(&self) -> ContentKind {
        ContentKind::Text
    }

    fn extract(&self, document: &Html, patterns: &PatternLibrary) -> Vec<HallRecord> {
        extract_text(&document_text(document), patterns)
    }
}

pub fn extract_text(text: &str, patterns: &PatternLibrary) -> Vec<HallRecord> {
    let blocks = split_blocks(text);
    let records: Vec<HallRecord> = blocks
        .iter()
        .filter_map(|lines| parse_block(lines, patterns))
        .collect();
    tracing::debug!("{} of {} text blocks held a hall", records.len(), blocks.len());
    records
}

/// Groups trimmed lines into blocks; one or more blank lines end a block.
pub fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// A block without a leading code is not venue data and is dropped whole.
pub fn parse_block(lines: &[&str], patterns: &PatternLibrary) -> Option<HallRecord> {
    let (first, rest) = lines.split_first()?;
    let (code, name) = patterns.text_header(first)?;

    let address_idx = rest
        .iter()
        .position(|line| patterns.has_postal_code(line) && line.contains(','))
        .or(if rest.is_empty() { None } else { Some(0) });

    let mut record = HallRecord {
        code,
        name,
        ..HallRecord::default()
    };

    if let Some(idx) = address_idx {
        record.address = rest[idx].to_string();
        record.extra = rest[idx + 1..].join(" ");
        if let Some(parts) = patterns.address_tail(&record.address) {
            record.postal_code = parts.postal_code;
            record.city = parts.city;
        }
    }

    Some(record)
}

/// Flattened text of the page's content area, one paragraph per block element.
pub fn document_text(document: &Html) -> String {
    let candidates: Vec<ElementRef<'_>> = elements_named(document.root_element(), ALL_TAGS)
        .filter(|el| is_content_root(*el))
        .collect();
    let ids: Vec<_> = candidates.iter().map(|el| el.id()).collect();

    // A container nested in another container is already covered by it.
    let roots: Vec<ElementRef<'_>> = candidates
        .into_iter()
        .filter(|el| !el.ancestors().any(|a| ids.contains(&a.id())))
        .collect();

    if roots.is_empty() {
        return block_text(document.root_element());
    }
    roots
        .into_iter()
        .map(block_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Tags that can carry a content class; checked together with [`CONTENT_TAGS`].
const ALL_TAGS: &[&str] = &["article", "main", "div", "section"];

fn is_content_root(el: ElementRef<'_>) -> bool {
    let element = el.value();
    CONTENT_TAGS.contains(&element.name())
        || element.classes().any(|class| CONTENT_CLASSES.contains(&class))
}

/// Lines break only at `<br>`, at block edges and inside `<pre>` at source
/// newlines; inline markup such as `<strong>` or `<a>` stays on its line.
fn block_text(root: ElementRef<'_>) -> String {
    let mut flattener = Flattener::default();
    flattener.walk(root, false);
    flattener.finish()
}

#[derive(Debug, Default)]
struct Flattener {
    paragraphs: Vec<Vec<String>>,
    line: String,
}

impl Flattener {
    fn walk(&mut self, el: ElementRef<'_>, preformatted: bool) {
        for child in el.children() {
            match child.value() {
                Node::Text(text) if preformatted => {
                    let mut parts = text.split('\n');
                    if let Some(first) = parts.next() {
                        self.line.push_str(first);
                    }
                    for part in parts {
                        self.break_line();
                        self.line.push_str(part);
                    }
                }
                Node::Text(text) => self.line.push_str(text),
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let name = child.value().name();
                    if SKIPPED_TAGS.contains(&name) {
                        continue;
                    }
                    if name == "br" {
                        self.break_line();
                    } else if BLOCK_TAGS.contains(&name) {
                        self.break_paragraph();
                        self.walk(child, preformatted || name == "pre");
                        self.break_paragraph();
                    } else {
                        self.walk(child, preformatted);
                    }
                }
                _ => {}
            }
        }
    }

    fn break_line(&mut self) {
        let line = self.line.split_whitespace().collect::<Vec<_>>().join(" ");
        self.line.clear();
        if line.is_empty() {
            return;
        }
        match self.paragraphs.last_mut() {
            Some(paragraph) => paragraph.push(line),
            None => self.paragraphs.push(vec![line]),
        }
    }

    fn break_paragraph(&mut self) {
        self.break_line();
        if self.paragraphs.last().is_some_and(|p| !p.is_empty()) {
            self.paragraphs.push(Vec::new());
        }
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.paragraphs
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
