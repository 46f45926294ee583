//! scrape → alias-resolve → override, as one synchronous step.

use crate::core::extract::extract_halls;
use crate::core::overrides::{apply_overrides, parse_overrides};
use crate::core::patterns::PatternLibrary;
use crate::core::reference::resolve_references;
use crate::domain::model::{Diagnostic, HallRecord, OverrideSource};
use crate::utils::error::HallError;
use scraper::Html;

#[derive(Debug, Clone, Default)]
pub struct DirectoryBuild {
    pub records: Vec<HallRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the finished hall directory from the halls page.
///
/// Never fails: an empty page gives an empty directory and a broken
/// override file leaves the scraped data as it is. Both show up in
/// `diagnostics`.
pub fn build_directory(
    html: &str,
    overrides: &OverrideSource,
    patterns: &PatternLibrary,
) -> DirectoryBuild {
    let mut diagnostics = Vec::new();

    let extraction = {
        let document = Html::parse_document(html);
        extract_halls(&document, patterns)
    };
    diagnostics.push(Diagnostic::StrategyChosen {
        classified: extraction.classified,
        used: extraction.used,
    });
    if extraction.records.is_empty() {
        diagnostics.push(Diagnostic::NoRecordsExtracted);
    }

    let resolution = resolve_references(extraction.records, patterns);
    diagnostics.extend(
        resolution
            .duplicates
            .into_iter()
            .map(|code| Diagnostic::DuplicateCode { code }),
    );
    diagnostics.extend(resolution.unresolved.into_iter().map(|u| {
        Diagnostic::UnresolvedAlias {
            code: u.code,
            target: u.target,
            reason: u.reason,
        }
    }));

    let records = match overrides {
        OverrideSource::NotConfigured => resolution.records,
        OverrideSource::Missing { path } => {
            tracing::info!("Override file {} not found. Skipping manual overrides.", path);
            diagnostics.push(Diagnostic::OverrideFileMissing { path: path.clone() });
            resolution.records
        }
        OverrideSource::Unreadable { path, message } => {
            tracing::error!("Override file {} could not be read: {}", path, message);
            diagnostics.push(Diagnostic::OverrideFileRejected {
                path: path.clone(),
                message: message.clone(),
            });
            resolution.records
        }
        OverrideSource::Loaded { path, content } => match parse_overrides(content, path) {
            Ok(set) => {
                diagnostics.extend(set.skipped.into_iter().map(|s| Diagnostic::OverrideSkipped {
                    index: s.index,
                    reason: s.reason,
                }));
                apply_overrides(resolution.records, &set.entries, patterns)
            }
            Err(e) => {
                tracing::error!("{}; continuing without overrides", e);
                let message = match e {
                    HallError::OverrideFileError { message, .. } => message,
                    other => other.to_string(),
                };
                diagnostics.push(Diagnostic::OverrideFileRejected {
                    path: path.clone(),
                    message,
                });
                resolution.records
            }
        },
    };

    DirectoryBuild {
        records,
        diagnostics,
    }
}
