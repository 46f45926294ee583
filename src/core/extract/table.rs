use super::{children_named, element_text, elements_named, set_address, Accumulator};
use crate::core::patterns::PatternLibrary;
use crate::domain::model::{ContentKind, HallRecord};
use crate::domain::ports::ExtractionStrategy;
use scraper::{ElementRef, Html};

/// Reads halls from `<table>` rows: a code row opens a record, the rows
/// below it add address and notes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableExtractor;

impl ExtractionStrategy for TableExtractor {
    fn kind(&self) -> ContentKind {
        ContentKind::Table
    }

    fn extract(&self, document: &Html, patterns: &PatternLibrary) -> Vec<HallRecord> {
        let mut tables = 0usize;
        for table in elements_named(document.root_element(), &["table"]) {
            tables += 1;
            let records = extract_rows(&table_rows(table), patterns);
            if !records.is_empty() {
                tracing::debug!("Table {} yielded {} halls", tables, records.len());
                return records;
            }
        }

        if tables == 0 {
            tracing::warn!("No table found on the page");
        } else {
            tracing::warn!("None of {} tables contained hall rows", tables);
        }
        Vec::new()
    }
}

/// Cell texts of every row of `table`.
pub fn table_rows(table: ElementRef<'_>) -> Vec<Vec<String>> {
    elements_named(table, &["tr"])
        .map(|row| children_named(row, &["td", "th"]).map(element_text).collect())
        .collect()
}

pub fn extract_rows(rows: &[Vec<String>], patterns: &PatternLibrary) -> Vec<HallRecord> {
    let mut records = Vec::new();
    let mut current = Accumulator::default();

    for cells in rows {
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let first = cells[0].trim();
        let is_note = first.starts_with('(') && first.ends_with(')');

        if !is_note && patterns.is_code_cell(first) {
            if let Some(previous) = current.start(code_row(first, &cells[1..], patterns)) {
                records.push(previous);
            }
            continue;
        }

        let info = joined(cells);
        if !current.supplement(&info, patterns) {
            tracing::debug!("Skipping row before the first hall: {}", info);
        }
    }

    records.extend(current.finish());
    records
}

fn code_row(code: &str, rest: &[String], patterns: &PatternLibrary) -> HallRecord {
    let mut record = HallRecord::new(code);
    let Some((second, tail)) = rest.split_first() else {
        return record;
    };

    if patterns.has_postal_code(second) {
        set_address(&mut record, second, patterns);
    } else {
        record.name = second.trim().to_string();
    }
    record.extra = joined(tail);
    record
}

fn joined(cells: &[String]) -> String {
    cells
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
