//! Hall extraction: one strategy per page layout, one record shape out.

pub mod accumulator;
pub mod list;
pub mod table;
pub mod text;

pub use accumulator::Accumulator;
pub use list::ListExtractor;
pub use table::TableExtractor;
pub use text::TextExtractor;

use crate::core::classifier::classify;
use crate::core::patterns::PatternLibrary;
use crate::domain::model::{ContentKind, HallRecord};
use crate::domain::ports::ExtractionStrategy;
use scraper::{ElementRef, Html};

/// The strategy that handles `kind`. Unclassified pages go to the table
/// strategy, the layout most hall pages use.
pub fn strategy_for(kind: ContentKind) -> Box<dyn ExtractionStrategy> {
    match kind {
        ContentKind::List => Box::new(ListExtractor),
        ContentKind::Text => Box::new(TextExtractor),
        ContentKind::Table | ContentKind::Unknown => Box::new(TableExtractor),
    }
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub classified: ContentKind,
    pub used: ContentKind,
    pub records: Vec<HallRecord>,
}

/// Classify, run exactly one strategy, and normalize its output.
pub fn extract_halls(document: &Html, patterns: &PatternLibrary) -> Extraction {
    let classified = classify(document, patterns);
    let strategy = strategy_for(classified);
    let used = strategy.kind();
    tracing::info!("Page classified as {}, extracting with the {} strategy", classified, used);

    let records = finalize(strategy.extract(document, patterns), patterns);
    if records.is_empty() {
        tracing::warn!("No halls found on the page");
    } else {
        tracing::info!("Extracted {} halls", records.len());
    }

    Extraction {
        classified,
        used,
        records,
    }
}

/// Clean-up applied to the output of every strategy.
pub fn finalize(records: Vec<HallRecord>, patterns: &PatternLibrary) -> Vec<HallRecord> {
    records
        .into_iter()
        .map(|mut record| {
            record.code = record.code.trim().to_string();
            record.name = record.name.trim().to_string();
            record.address = normalize_address(&record.address);
            record.city = patterns.normalize_city(record.city.trim());
            record.extra = record.extra.trim().to_string();
            record
        })
        .collect()
}

/// Strips surrounding spaces and commas and tightens `" ,"` to `","`.
pub fn normalize_address(address: &str) -> String {
    address
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .replace(" ,", ",")
}

/// Stores `line` as the record's address together with its postal code and city.
pub fn set_address(record: &mut HallRecord, line: &str, patterns: &PatternLibrary) {
    let parts = patterns.parse_address(line);
    record.address = line.trim().to_string();
    record.postal_code = parts.postal_code;
    record.city = parts.city;
}

/// The supplementary-line rule: the first address-like line becomes the
/// address, everything else is kept in `extra`.
pub fn fold_info(record: &mut HallRecord, line: &str, patterns: &PatternLibrary) {
    if record.address.is_empty() && patterns.looks_like_address(line) {
        set_address(record, line, patterns);
    } else {
        record.push_extra(line);
    }
}

/// `root` and all elements below it whose tag is one of `names`, in document order.
pub(crate) fn elements_named<'a>(
    root: ElementRef<'a>,
    names: &'static [&'static str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |el| names.contains(&el.value().name()))
}

/// Direct children of `parent` whose tag is one of `names`.
pub(crate) fn children_named<'a>(
    parent: ElementRef<'a>,
    names: &'static [&'static str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| names.contains(&el.value().name()))
}

/// The element's text on one line with whitespace collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

const LIST_TAGS: &[&str] = &["ul", "ol"];

/// The element's text nodes as trimmed, non-empty lines. Text of a list
/// nested inside `el` belongs to that list's own items and is left out.
pub(crate) fn element_lines(el: ElementRef<'_>) -> Vec<String> {
    el.descendants()
        .filter(|node| {
            !node
                .ancestors()
                .take_while(|a| a.id() != el.id())
                .any(|a| a.value().as_element().is_some_and(|e| LIST_TAGS.contains(&e.name())))
        })
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .flat_map(str::lines)
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address(" , Hauptstr. 1 , 22359 HH, "), "Hauptstr. 1, 22359 HH");
        assert_eq!(normalize_address(""), "");
    }

    #[test]
    fn test_fold_info_first_address_wins() {
        let patterns = PatternLibrary::default();
        let mut record = HallRecord::new("ADWG");

        fold_info(&mut record, "Hauptstr. 1, 22359 HH", &patterns);
        fold_info(&mut record, "Eingang Schulhof, 22359 HH", &patterns);
        fold_info(&mut record, "(eh. BÖTT)", &patterns);

        assert_eq!(record.address, "Hauptstr. 1, 22359 HH");
        assert_eq!(record.postal_code, "22359");
        assert_eq!(record.city, "Hamburg");
        assert_eq!(record.extra, "Eingang Schulhof, 22359 HH | (eh. BÖTT)");
    }

    #[test]
    fn test_finalize_normalizes_city_abbreviation() {
        let patterns = PatternLibrary::default();
        let record = HallRecord {
            code: " OHK ".to_string(),
            city: "HH".to_string(),
            address: "Ohlendieck 5 ,22399 HH ,".to_string(),
            ..HallRecord::default()
        };

        let out = finalize(vec![record], &patterns);
        assert_eq!(out[0].code, "OHK");
        assert_eq!(out[0].city, "Hamburg");
        assert_eq!(out[0].address, "Ohlendieck 5,22399 HH");
    }

    #[test]
    fn test_unknown_falls_back_to_table() {
        assert_eq!(strategy_for(ContentKind::Unknown).kind(), ContentKind::Table);
        assert_eq!(strategy_for(ContentKind::List).kind(), ContentKind::List);
        assert_eq!(strategy_for(ContentKind::Text).kind(), ContentKind::Text);
    }

    #[test]
    fn test_element_lines_and_text() {
        let html = Html::parse_fragment("<li>ADWG<br>\n  Hauptstr. 1,\n 22359 HH  </li>");
        let li = elements_named(html.root_element(), &["li"]).next().unwrap();
        assert_eq!(element_lines(li), vec!["ADWG", "Hauptstr. 1,", "22359 HH"]);
        assert_eq!(element_text(li), "ADWG Hauptstr. 1, 22359 HH");
    }
}
