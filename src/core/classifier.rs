//! Decides which extraction strategy fits a page by sampling it for hall codes.
//!
//! The verdict is advisory: a page that matches nothing is `Unknown`, never an
//! error, and callers fall back to the table strategy.

use crate::core::extract::text::document_text;
use crate::core::extract::{children_named, element_lines, element_text, elements_named};
use crate::core::patterns::PatternLibrary;
use crate::domain::model::ContentKind;
use scraper::{ElementRef, Html};

const SAMPLED_ROWS: usize = 10;
const SAMPLED_ITEMS: usize = 10;
const SAMPLED_LINES: usize = 50;
const LIST_THRESHOLD: usize = 2;
// free text throws up more false positives
const TEXT_THRESHOLD: usize = 3;

pub fn classify(document: &Html, patterns: &PatternLibrary) -> ContentKind {
    let root = document.root_element();

    let tables: Vec<ElementRef<'_>> = elements_named(root, &["table"]).collect();
    let table_threshold = if tables.len() == 1 { 1 } else { 2 };
    for (idx, table) in tables.iter().enumerate() {
        let hits = table_hits(*table, patterns);
        tracing::debug!("Table {}: {} code matches in sampled rows", idx + 1, hits);
        if hits >= table_threshold {
            return ContentKind::Table;
        }
    }

    for list in elements_named(root, &["ul", "ol"]) {
        let hits = list_hits(list, patterns);
        if hits >= LIST_THRESHOLD {
            tracing::debug!("List with {} code matches in sampled items", hits);
            return ContentKind::List;
        }
    }

    let hits = text_hits(&document_text(document), patterns);
    tracing::debug!("{} code matches in sampled text lines", hits);
    if hits >= TEXT_THRESHOLD {
        return ContentKind::Text;
    }

    ContentKind::Unknown
}

fn table_hits(table: ElementRef<'_>, patterns: &PatternLibrary) -> usize {
    elements_named(table, &["tr"])
        .take(SAMPLED_ROWS)
        .map(|row| {
            children_named(row, &["td", "th"])
                .filter(|cell| patterns.is_classifiable_code(&element_text(*cell)))
                .count()
        })
        .sum()
}

fn list_hits(list: ElementRef<'_>, patterns: &PatternLibrary) -> usize {
    children_named(list, &["li"])
        .take(SAMPLED_ITEMS)
        .filter(|item| {
            element_lines(*item)
                .first()
                .is_some_and(|line| patterns.is_classifiable_code(line))
        })
        .count()
}

pub fn text_hits(text: &str, patterns: &PatternLibrary) -> usize {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(SAMPLED_LINES)
        .filter(|line| {
            patterns
                .text_header(line)
                .is_some_and(|(code, _)| patterns.is_classifiable_code(&code))
        })
        .count()
}
