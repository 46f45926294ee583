//! Manual corrections layered over the scraped directory.
//!
//! The override file looks like
//!
//! ```json
//! { "overrides": [ { "kürzel": "NEU1", "adresse": "Teststr. 2, 20000 Hamburg" } ] }
//! ```
//!
//! Keys are mapped explicitly (German and English spellings); anything else is
//! ignored. An entry without a code is skipped, the rest still applies.

use crate::core::patterns::PatternLibrary;
use crate::domain::model::{HallRecord, OverrideEntry};
use crate::utils::error::{HallError, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

const CODE_KEYS: &[&str] = &["kürzel", "kuerzel", "code"];
const NAME_KEYS: &[&str] = &["name_bezeichnung", "name"];
const ADDRESS_KEYS: &[&str] = &["adresse", "address"];
const POSTAL_CODE_KEYS: &[&str] = &["plz", "postal_code"];
const CITY_KEYS: &[&str] = &["ort", "city"];
const EXTRA_KEYS: &[&str] = &["zusatzinfo", "extra"];

#[derive(Debug, Deserialize)]
struct OverrideFile {
    #[serde(default)]
    overrides: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedOverride {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct OverrideSet {
    pub entries: Vec<OverrideEntry>,
    pub skipped: Vec<SkippedOverride>,
}

/// Parses an override file. Invalid JSON is an error; a bad entry is not.
pub fn parse_overrides(content: &str, path: &str) -> Result<OverrideSet> {
    let file: OverrideFile =
        serde_json::from_str(content).map_err(|e| HallError::OverrideFileError {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    let mut set = OverrideSet::default();
    for (index, value) in file.overrides.iter().enumerate() {
        match entry_from_json(value) {
            Ok(entry) => set.entries.push(entry),
            Err(reason) => {
                tracing::warn!("Override entry {} skipped: {}", index, reason);
                set.skipped.push(SkippedOverride { index, reason });
            }
        }
    }

    if set.entries.is_empty() {
        tracing::info!("No usable overrides in {}", path);
    } else {
        tracing::info!("Loaded {} manual hall overrides from {}", set.entries.len(), path);
    }
    Ok(set)
}

fn entry_from_json(value: &Value) -> std::result::Result<OverrideEntry, String> {
    let Value::Object(fields) = value else {
        return Err("entry is not an object".to_string());
    };

    let code = field(fields, CODE_KEYS).ok_or_else(|| "missing hall code".to_string())?;

    Ok(OverrideEntry {
        code,
        name: field(fields, NAME_KEYS),
        address: field(fields, ADDRESS_KEYS),
        postal_code: field(fields, POSTAL_CODE_KEYS),
        city: field(fields, CITY_KEYS),
        extra: field(fields, EXTRA_KEYS),
    })
}

/// First non-empty value under any of `keys`. Numbers are taken as text so
/// `"plz": 22359` works.
fn field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Applies `overrides` in order: known codes get their provided fields
/// replaced, unknown codes are appended as new halls. Applying the same list
/// twice gives the same directory as applying it once.
pub fn apply_overrides(
    records: Vec<HallRecord>,
    overrides: &[OverrideEntry],
    patterns: &PatternLibrary,
) -> Vec<HallRecord> {
    let mut directory: IndexMap<String, HallRecord> = IndexMap::with_capacity(records.len());
    for record in records {
        let code = record.code.clone();
        if directory.insert(code.clone(), record).is_some() {
            tracing::warn!("Hall {} listed more than once, keeping the later entry", code);
        }
    }

    let (mut updated, mut inserted) = (0usize, 0usize);
    for entry in overrides {
        match directory.get_mut(&entry.code) {
            Some(record) => {
                tracing::debug!("Updating existing hall: {}", entry.code);
                update_record(record, entry, patterns);
                updated += 1;
            }
            None => {
                tracing::debug!("Adding new hall: {}", entry.code);
                let mut record = HallRecord::new(entry.code.clone());
                update_record(&mut record, entry, patterns);
                directory.insert(entry.code.clone(), record);
                inserted += 1;
            }
        }
    }

    if !overrides.is_empty() {
        tracing::info!("Overrides applied: {} updated, {} added", updated, inserted);
    }
    directory.into_values().collect()
}

fn update_record(record: &mut HallRecord, entry: &OverrideEntry, patterns: &PatternLibrary) {
    let city = entry.city.as_deref().map(|c| patterns.normalize_city(c));
    let updates = [
        (&mut record.name, entry.name.as_deref()),
        (&mut record.address, entry.address.as_deref()),
        (&mut record.postal_code, entry.postal_code.as_deref()),
        (&mut record.city, city.as_deref()),
        (&mut record.extra, entry.extra.as_deref()),
    ];
    for (slot, value) in updates {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            *slot = value.to_string();
        }
    }
}
