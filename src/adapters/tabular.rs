//! Schedule input and directory/schedule output files.

use crate::domain::model::{ScheduleEntry, TransformResult};
use crate::utils::error::{HallError, Result};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const DIRECTORY_FILE_STEM: &str = "hall_directory";
pub const SCHEDULE_FILE_STEM: &str = "schedule_with_halls";

pub const DIRECTORY_COLUMNS: &[&str] = &["code", "name", "address", "postal_code", "city", "extra"];
pub const SCHEDULE_COLUMNS: &[&str] = &[
    "date",
    "time",
    "raw_hall_label",
    "code",
    "city",
    "postal_code",
    "address",
    "home",
    "away",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// `.tsv` sources are always tab separated; anything else uses `configured`.
pub fn delimiter_for(source: &str, configured: u8) -> u8 {
    let is_tsv = Path::new(source)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
    if is_tsv {
        b'\t'
    } else {
        configured
    }
}

/// Reads schedule rows. Rows that cannot be read are skipped with a warning.
pub fn read_schedule(data: &[u8], delimiter: u8) -> Result<Vec<ScheduleEntry>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    tracing::debug!("Schedule columns: {:?}", headers);

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for (index, row) in reader.deserialize::<ScheduleEntry>().enumerate() {
        match row {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                skipped += 1;
                tracing::warn!("Schedule row {} skipped: {}", index + 1, e);
            }
        }
    }

    tracing::info!("Read {} schedule rows ({} skipped)", entries.len(), skipped);
    Ok(entries)
}

/// Writes a header line followed by one line per row. The header is written
/// even when there are no rows.
pub fn write_delimited<T: Serialize>(columns: &[&str], rows: &[T], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| HallError::IoError(e.into_error()))
}

fn render<T: Serialize>(columns: &[&str], rows: &[T], format: &str) -> Result<Vec<u8>> {
    match format {
        "csv" => write_delimited(columns, rows, b','),
        "tsv" => write_delimited(columns, rows, b'\t'),
        "json" => Ok(serde_json::to_vec_pretty(rows)?),
        other => Err(HallError::InvalidConfigValueError {
            field: "load.output_formats".to_string(),
            value: other.to_string(),
            reason: "Unsupported format. Valid formats: csv, tsv, json".to_string(),
        }),
    }
}

/// Renders the directory, and the merged schedule when `include_schedule`
/// is set, once per requested format.
pub fn render_outputs(
    result: &TransformResult,
    formats: &[String],
    include_schedule: bool,
) -> Result<Vec<OutputFile>> {
    let mut files = Vec::new();
    for format in formats {
        files.push(OutputFile {
            name: format!("{}.{}", DIRECTORY_FILE_STEM, format),
            data: render(DIRECTORY_COLUMNS, &result.directory, format)?,
        });
        if include_schedule {
            files.push(OutputFile {
                name: format!("{}.{}", SCHEDULE_FILE_STEM, format),
                data: render(SCHEDULE_COLUMNS, &result.merged_schedule, format)?,
            });
        }
    }
    Ok(files)
}

pub fn bundle_zip(files: &[OutputFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for file in files {
        zip.start_file(file.name.as_str(), SimpleFileOptions::default())?;
        zip.write_all(&file.data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{HallRecord, MergedScheduleRow};
    use std::io::Read;

    #[test]
    fn test_read_schedule_with_german_headers() {
        let data = "DATUM;ZEIT;HALLE;HEIM;GAST;LIGA\n27.09.2025;14:00;HBV-BREH2;BSV;ETV;M10C\n";

        let entries = read_schedule(data.as_bytes(), b';').unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].raw_hall_label, "HBV-BREH2");
        assert_eq!(entries[0].home_team, "BSV");
        assert_eq!(entries[0].league, "M10C");
    }

    #[test]
    fn test_read_schedule_tolerates_missing_columns() {
        let data = "DATE,HALL_LABEL\n2025-09-27,HBV-ADWG\n";

        let entries = read_schedule(data.as_bytes(), b',').unwrap();

        assert_eq!(entries[0].raw_hall_label, "HBV-ADWG");
        assert_eq!(entries[0].home_team, "");
    }

    #[test]
    fn test_tsv_extension_forces_tab() {
        assert_eq!(delimiter_for("spielplan.tsv", b','), b'\t');
        assert_eq!(delimiter_for("spielplan.TSV", b';'), b'\t');
        assert_eq!(delimiter_for("spielplan.csv", b';'), b';');
        assert_eq!(delimiter_for("https://example.com/plan", b','), b',');
    }

    #[test]
    fn test_empty_directory_still_has_header() {
        let rows: Vec<HallRecord> = Vec::new();
        let data = write_delimited(DIRECTORY_COLUMNS, &rows, b',').unwrap();
        assert_eq!(String::from_utf8(data).unwrap(), "code,name,address,postal_code,city,extra\n");
    }

    #[test]
    fn test_addresses_with_commas_are_quoted() {
        let rows = vec![HallRecord {
            code: "ADWG".to_string(),
            address: "Hauptstr. 1, 22359 HH".to_string(),
            postal_code: "22359".to_string(),
            city: "Hamburg".to_string(),
            ..HallRecord::default()
        }];

        let data = String::from_utf8(write_delimited(DIRECTORY_COLUMNS, &rows, b',').unwrap()).unwrap();

        assert_eq!(data.lines().nth(1), Some("ADWG,,\"Hauptstr. 1, 22359 HH\",22359,Hamburg,"));
    }

    #[test]
    fn test_render_outputs_per_format() {
        let result = TransformResult {
            directory: vec![HallRecord::new("OHK")],
            merged_schedule: vec![MergedScheduleRow::default()],
            diagnostics: Vec::new(),
        };
        let formats = vec!["csv".to_string(), "json".to_string()];

        let files = render_outputs(&result, &formats, true).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "hall_directory.csv",
                "schedule_with_halls.csv",
                "hall_directory.json",
                "schedule_with_halls.json"
            ]
        );

        let json: serde_json::Value = serde_json::from_slice(&files[2].data).unwrap();
        assert_eq!(json[0]["code"], "OHK");

        let without_schedule = render_outputs(&result, &formats, false).unwrap();
        assert_eq!(without_schedule.len(), 2);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let result = TransformResult::default();
        let err = render_outputs(&result, &["xlsx".to_string()], false).unwrap_err();
        assert!(matches!(err, HallError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_zip_bundle_contains_every_file() {
        let files = vec![
            OutputFile {
                name: "hall_directory.csv".to_string(),
                data: b"code\nADWG\n".to_vec(),
            },
            OutputFile {
                name: "hall_directory.json".to_string(),
                data: b"[]".to_vec(),
            },
        ];

        let data = bundle_zip(&files).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();

        assert_eq!(archive.len(), 2);
        let mut content = String::new();
        archive
            .by_name("hall_directory.csv")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "code\nADWG\n");
    }
}
