//! Joins league schedule rows with the hall directory.

use crate::core::patterns::PatternLibrary;
use crate::domain::model::{HallRecord, MergedScheduleRow, ScheduleEntry};
use std::collections::HashMap;

/// Derives a hall code from a schedule label such as `HBV-BREH2`.
///
/// Labels without the prefix fall back to the first bare code token; labels
/// with no code at all give an empty code.
pub fn hall_code_from_label(label: &str, patterns: &PatternLibrary) -> String {
    if let Some(code) = patterns.labeled_code(label) {
        return renormalize(code, patterns.numbered_sub_venues());
    }
    patterns
        .bare_code(label)
        .map(str::to_string)
        .unwrap_or_default()
}

/// `PEPE2` is listed in the directory as `PEPE 2`.
fn renormalize(code: &str, numbered_sub_venues: &[String]) -> String {
    for stem in numbered_sub_venues {
        if let Some(digit) = code.strip_prefix(stem.as_str()) {
            if digit.len() == 1 && digit.chars().all(|c| c.is_ascii_digit()) {
                return format!("{} {}", stem, digit);
            }
        }
    }
    code.to_string()
}

/// Narrows the schedule to one league and one team; unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleFilter {
    pub league: Option<String>,
    pub team: Option<String>,
}

impl ScheduleFilter {
    pub fn matches(&self, entry: &ScheduleEntry) -> bool {
        let league_ok = self
            .league
            .as_deref()
            .map_or(true, |league| entry.league.trim() == league);
        let team_ok = self.team.as_deref().map_or(true, |team| {
            entry.home_team.trim() == team || entry.away_team.trim() == team
        });
        league_ok && team_ok
    }

    pub fn apply(&self, entries: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
        let before = entries.len();
        let kept: Vec<ScheduleEntry> = entries.into_iter().filter(|e| self.matches(e)).collect();
        if kept.len() != before {
            tracing::info!("Schedule filter kept {} of {} games", kept.len(), before);
        }
        kept
    }
}

/// Left join: one output row per schedule row, matched or not.
pub fn join_schedule(
    schedule: &[ScheduleEntry],
    directory: &[HallRecord],
    patterns: &PatternLibrary,
) -> Vec<MergedScheduleRow> {
    let by_code: HashMap<&str, &HallRecord> =
        directory.iter().map(|h| (h.code.as_str(), h)).collect();

    let mut unmatched = 0usize;
    let rows: Vec<MergedScheduleRow> = schedule
        .iter()
        .map(|entry| {
            let code = hall_code_from_label(&entry.raw_hall_label, patterns);
            let hall = by_code.get(code.as_str()).copied();
            if hall.is_none() {
                unmatched += 1;
                tracing::debug!("No hall found for label '{}'", entry.raw_hall_label);
            }

            MergedScheduleRow {
                date: entry.date.clone(),
                time: entry.time.clone(),
                raw_hall_label: entry.raw_hall_label.clone(),
                city: hall.map(|h| h.city.clone()).unwrap_or_default(),
                postal_code: hall.map(|h| h.postal_code.clone()).unwrap_or_default(),
                address: hall.map(|h| h.address.clone()).unwrap_or_default(),
                code,
                home: entry.home_team.clone(),
                away: entry.away_team.clone(),
            }
        })
        .collect();

    tracing::info!(
        "Joined {} games with the hall directory ({} without a hall)",
        rows.len(),
        unmatched
    );
    rows
}
