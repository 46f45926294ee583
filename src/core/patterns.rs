//! The pattern table the engine runs on.
//!
//! Everything that describes what the halls page looks like lives in
//! [`PatternConfig`] as plain strings, so format drift on the site is absorbed
//! by editing configuration. [`PatternLibrary::compile`] turns it into regexes
//! once per run.

use crate::utils::error::{HallError, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// A token is a hall code if any of these matches it completely.
    pub hall_codes: Vec<String>,
    /// Alias phrases; group 1 captures the target code. Matched case-insensitively.
    pub references: Vec<String>,
    /// A line looks like an address if any of these matches somewhere in it.
    pub addresses: Vec<String>,
    /// Strict address test for the cell right after a code.
    pub postal_code: String,
    /// Four-digit postal codes; group 1 captures the digits.
    pub postal_code_exception: String,
    /// Place name after the postal code; group 1 captures it.
    pub city_after_postal: String,
    /// First line of a free-text block: group 1 code, group 2 provisional name.
    pub text_header: String,
    /// End of a free-text address line: group 1 postal code, group 2 place.
    pub address_tail: String,
    /// Code token anywhere in a schedule hall label; group 1 captures it.
    pub bare_code: String,
    /// Marker in schedule hall labels, as in `HBV-BREH2`.
    pub label_prefix: String,
    /// Codes whose trailing digit numbers a sub-venue (`PEPE2` is `PEPE 2`).
    pub numbered_sub_venues: Vec<String>,
    pub home_city: String,
    pub home_city_abbreviation: String,
    pub max_code_len: usize,
    pub max_classify_cell_len: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            hall_codes: vec![
                r"^[A-ZÄÖÜ]{2,}\s?[0-9]?$".to_string(),
                r"^[A-Z]{2,}[0-9]?$".to_string(),
                r"^[A-ZÄÖÜ]{2,}$".to_string(),
                r"^[A-Z]{2,}$".to_string(),
            ],
            references: vec![
                r"^Siehe\s+([A-ZÄÖÜ0-9]+)\s*$".to_string(),
                r"^Vgl\.\s+([A-ZÄÖÜ0-9]+)\s*$".to_string(),
                r"^See\s+([A-ZÄÖÜ0-9]+)\s*$".to_string(),
            ],
            addresses: vec![
                r"\b\d{5}\b".to_string(),
                r"\bHH\b".to_string(),
                r"Hamburg".to_string(),
                r"\d{4}\s+[A-Za-z]".to_string(),
            ],
            postal_code: r"\b(\d{5})\b".to_string(),
            postal_code_exception: r"\b(\d{4})\s+[A-Za-zÄÖÜäöüß]".to_string(),
            city_after_postal: r"\d{4,5}\s+([A-Za-zÄÖÜäöüß\s]+)".to_string(),
            text_header: r"^([A-ZÄÖÜ]{2,}[0-9]?)\b\s*(.*)$".to_string(),
            address_tail: r"(\d{5})\s*([A-Za-zÄÖÜäöüß\-\.\(\)/ ]+)?$".to_string(),
            bare_code: r"\b([A-ZÄÖÜ]{2,}[0-9]?)\b".to_string(),
            label_prefix: "HBV".to_string(),
            numbered_sub_venues: vec!["PEPE".to_string()],
            home_city: "Hamburg".to_string(),
            home_city_abbreviation: "HH".to_string(),
            max_code_len: 6,
            max_classify_cell_len: 10,
        }
    }
}

/// Postal code and place read from an address line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub postal_code: String,
    pub city: String,
}

#[derive(Debug, Clone)]
pub struct PatternLibrary {
    hall_codes: Vec<Regex>,
    references: Vec<Regex>,
    addresses: Vec<Regex>,
    postal_code: Regex,
    postal_code_exception: Regex,
    city_after_postal: Regex,
    text_header: Regex,
    address_tail: Regex,
    bare_code: Regex,
    labeled_code: Regex,
    abbreviation: Regex,
    home_city: String,
    home_city_abbreviation: String,
    numbered_sub_venues: Vec<String>,
    max_code_len: usize,
    max_classify_cell_len: usize,
}

impl PatternLibrary {
    pub fn compile(config: &PatternConfig) -> Result<Self> {
        if config.hall_codes.is_empty() {
            return Err(HallError::ConfigValidationError {
                field: "patterns.hall_codes".to_string(),
                message: "at least one hall code pattern is required".to_string(),
            });
        }

        let hall_codes = config
            .hall_codes
            .iter()
            .map(|p| Regex::new(&format!("^(?:{})$", p)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let references = config
            .references
            .iter()
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let addresses = config
            .addresses
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let labeled_code = Regex::new(&format!(
            r"{}-([A-ZÄÖÜ]{{2,}}[0-9]?)",
            regex::escape(&config.label_prefix)
        ))?;
        let abbreviation = Regex::new(&format!(
            r"\b{}\b",
            regex::escape(&config.home_city_abbreviation)
        ))?;

        Ok(Self {
            hall_codes,
            references,
            addresses,
            postal_code: Regex::new(&config.postal_code)?,
            postal_code_exception: Regex::new(&config.postal_code_exception)?,
            city_after_postal: Regex::new(&config.city_after_postal)?,
            text_header: Regex::new(&config.text_header)?,
            address_tail: Regex::new(&config.address_tail)?,
            bare_code: Regex::new(&config.bare_code)?,
            labeled_code,
            abbreviation,
            home_city: config.home_city.clone(),
            home_city_abbreviation: config.home_city_abbreviation.clone(),
            numbered_sub_venues: config.numbered_sub_venues.clone(),
            max_code_len: config.max_code_len,
            max_classify_cell_len: config.max_classify_cell_len,
        })
    }

    pub fn is_hall_code(&self, token: &str) -> bool {
        self.hall_codes.iter().any(|re| re.is_match(token))
    }

    /// A code cell that may open a new record: a code no longer than `max_code_len`.
    pub fn is_code_cell(&self, cell: &str) -> bool {
        cell.chars().count() <= self.max_code_len && self.is_hall_code(cell)
    }

    /// The sampling test used by the classifier.
    pub fn is_classifiable_code(&self, text: &str) -> bool {
        text.chars().count() <= self.max_classify_cell_len && self.is_hall_code(text)
    }

    /// Target of an alias phrase such as `Siehe KGSE1`, upper-cased.
    pub fn reference_target(&self, name: &str) -> Option<String> {
        let name = name.trim();
        self.references.iter().find_map(|re| {
            re.captures(name)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_uppercase())
        })
    }

    pub fn looks_like_address(&self, line: &str) -> bool {
        self.addresses.iter().any(|re| re.is_match(line))
    }

    pub fn has_postal_code(&self, text: &str) -> bool {
        self.postal_code.is_match(text)
    }

    pub fn parse_address(&self, line: &str) -> AddressParts {
        let postal_code = self
            .postal_code
            .captures(line)
            .or_else(|| self.postal_code_exception.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let city = if self.abbreviation.is_match(line) || line.contains(&self.home_city) {
            self.home_city.clone()
        } else {
            self.city_after_postal
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default()
        };

        AddressParts { postal_code, city }
    }

    /// Splits the first line of a free-text block into code and provisional name.
    pub fn text_header(&self, line: &str) -> Option<(String, String)> {
        let caps = self.text_header.captures(line)?;
        let code = caps.get(1)?.as_str().trim().to_string();
        let name = caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        Some((code, name))
    }

    pub fn address_tail(&self, line: &str) -> Option<AddressParts> {
        let caps = self.address_tail.captures(line)?;
        let postal_code = caps.get(1)?.as_str().to_string();
        let place = caps
            .get(2)
            .map(|m| m.as_str().trim_matches(|c| c == ' ' || c == ','))
            .unwrap_or_default();
        Some(AddressParts {
            postal_code,
            city: self.normalize_city(place),
        })
    }

    /// Replaces the city abbreviation with the full name.
    pub fn normalize_city(&self, city: &str) -> String {
        if self.home_city_abbreviation.is_empty() {
            return city.to_string();
        }
        self.abbreviation
            .replace_all(city, self.home_city.as_str())
            .into_owned()
    }

    pub fn labeled_code<'a>(&self, label: &'a str) -> Option<&'a str> {
        self.labeled_code
            .captures(label)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn bare_code<'a>(&self, label: &'a str) -> Option<&'a str> {
        self.bare_code
            .captures(label)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn numbered_sub_venues(&self) -> &[String] {
        &self.numbered_sub_venues
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        // The built-in pattern table is covered by tests and always compiles.
        match Self::compile(&PatternConfig::default()) {
            Ok(library) => library,
            Err(e) => unreachable!("default patterns failed to compile: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns_compile() {
        assert!(PatternLibrary::compile(&PatternConfig::default()).is_ok());
    }

    #[test]
    fn test_hall_codes() {
        let lib = PatternLibrary::default();
        assert!(lib.is_hall_code("ADWG"));
        assert!(lib.is_hall_code("BREH2"));
        assert!(lib.is_hall_code("BÖTT"));
        assert!(lib.is_hall_code("PEPE 2"));
        assert!(!lib.is_hall_code("Adwg"));
        assert!(!lib.is_hall_code("A"));
        assert!(!lib.is_hall_code("ADWG Verbandshalle"));
    }

    #[test]
    fn test_code_cell_respects_length_limit() {
        let lib = PatternLibrary::default();
        assert!(lib.is_code_cell("KGSE1"));
        assert!(!lib.is_code_cell("ABCDEFG"));
        assert!(lib.is_classifiable_code("ABCDEFG"));
    }

    #[test]
    fn test_anchoring_is_enforced() {
        let config = PatternConfig {
            hall_codes: vec![r"[A-Z]{2,}".to_string()],
            ..PatternConfig::default()
        };
        let lib = PatternLibrary::compile(&config).unwrap();
        assert!(lib.is_hall_code("ADWG"));
        assert!(!lib.is_hall_code("ADWG halle"));
    }

    #[test]
    fn test_reference_target() {
        let lib = PatternLibrary::default();
        assert_eq!(lib.reference_target("Siehe KGSE1"), Some("KGSE1".to_string()));
        assert_eq!(lib.reference_target("  siehe kgse1 "), Some("KGSE1".to_string()));
        assert_eq!(lib.reference_target("Vgl. ADWG"), Some("ADWG".to_string()));
        assert_eq!(lib.reference_target("Verbandshalle"), None);
        assert_eq!(lib.reference_target("Siehe unten links"), None);
    }

    #[test]
    fn test_parse_address() {
        let lib = PatternLibrary::default();
        let parts = lib.parse_address("Hauptstr. 1, 22359 HH");
        assert_eq!(parts.postal_code, "22359");
        assert_eq!(parts.city, "Hamburg");

        let parts = lib.parse_address("Schulweg 3, 21465 Reinbek");
        assert_eq!(parts.postal_code, "21465");
        assert_eq!(parts.city, "Reinbek");

        let parts = lib.parse_address("Am Markt 2, 2345 Neustadt");
        assert_eq!(parts.postal_code, "2345");
        assert_eq!(parts.city, "Neustadt");
    }

    #[test]
    fn test_text_header() {
        let lib = PatternLibrary::default();
        assert_eq!(
            lib.text_header("OHK Sporthalle Ohlendieck"),
            Some(("OHK".to_string(), "Sporthalle Ohlendieck".to_string()))
        );
        assert_eq!(lib.text_header("BREH2"), Some(("BREH2".to_string(), String::new())));
        assert_eq!(lib.text_header("Hallenverzeichnis"), None);
    }

    #[test]
    fn test_address_tail_normalizes_abbreviation() {
        let lib = PatternLibrary::default();
        let parts = lib.address_tail("Bramfelder Weg 2, 22159 HH").unwrap();
        assert_eq!(parts.postal_code, "22159");
        assert_eq!(parts.city, "Hamburg");
        assert!(lib.address_tail("keine Adresse").is_none());
    }

    #[test]
    fn test_labeled_and_bare_codes() {
        let lib = PatternLibrary::default();
        assert_eq!(lib.labeled_code("HBV-BREH2"), Some("BREH2"));
        assert_eq!(lib.labeled_code("BREH2"), None);
        assert_eq!(lib.bare_code("Halle ADWG (neu)"), Some("ADWG"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let config = PatternConfig {
            addresses: vec!["(".to_string()],
            ..PatternConfig::default()
        };
        assert!(matches!(
            PatternLibrary::compile(&config),
            Err(HallError::RegexError(_))
        ));
    }
}
