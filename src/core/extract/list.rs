use super::{children_named, element_lines, elements_named, Accumulator};
use crate::core::patterns::PatternLibrary;
use crate::domain::model::{ContentKind, HallRecord};
use crate::domain::ports::ExtractionStrategy;
use scraper::{ElementRef, Html};

/// Reads halls from `<ul>`/`<ol>` items whose first line is a hall code.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListExtractor;

impl ExtractionStrategy for ListExtractor {
    fn kind(&self) -> ContentKind {
        ContentKind::List
    }

    fn extract(&self, document: &Html, patterns: &PatternLibrary) -> Vec<HallRecord> {
        let records: Vec<HallRecord> = elements_named(document.root_element(), &["ul", "ol"])
            .flat_map(|list| extract_list(list, patterns))
            .collect();

        if records.is_empty() {
            tracing::warn!("No list item started with a hall code");
        }
        records
    }
}

pub fn extract_list(list: ElementRef<'_>, patterns: &PatternLibrary) -> Vec<HallRecord> {
    let items: Vec<Vec<String>> = children_named(list, &["li"]).map(element_lines).collect();
    extract_items(&items, patterns)
}

/// Each item is self-contained: its lines after the code only describe that hall.
pub fn extract_items(items: &[Vec<String>], patterns: &PatternLibrary) -> Vec<HallRecord> {
    let mut records = Vec::new();
    let mut current = Accumulator::default();

    for lines in items {
        let Some((first, rest)) = lines.split_first() else {
            continue;
        };
        if !patterns.is_code_cell(first.trim()) {
            continue;
        }

        current.start(HallRecord::new(first.trim()));
        for line in rest {
            current.supplement(line, patterns);
        }
        records.extend(current.take());
    }

    records
}
