use serde::{Deserialize, Serialize};

/// One venue of the directory, keyed by `code`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallRecord {
    pub code: String,
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub extra: String,
}

impl HallRecord {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    /// Appends a note to `extra`, separated by `" | "`.
    pub fn push_extra(&mut self, note: &str) {
        let note = note.trim();
        if note.is_empty() {
            return;
        }
        if !self.extra.is_empty() {
            self.extra.push_str(" | ");
        }
        self.extra.push_str(note);
    }
}

/// A curated correction. `None` and empty fields leave existing data untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideEntry {
    pub code: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub extra: Option<String>,
}

/// One row of the league schedule, never mutated by the join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScheduleEntry {
    #[serde(rename = "DATE", alias = "DATUM", default)]
    pub date: String,
    #[serde(rename = "TIME", alias = "ZEIT", default)]
    pub time: String,
    #[serde(rename = "HALL_LABEL", alias = "HALLE", default)]
    pub raw_hall_label: String,
    #[serde(rename = "HOME", alias = "HEIM", default)]
    pub home_team: String,
    #[serde(rename = "AWAY", alias = "GAST", default)]
    pub away_team: String,
    #[serde(rename = "LEAGUE", alias = "LIGA", default)]
    pub league: String,
}

/// Field order is the output column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergedScheduleRow {
    pub date: String,
    pub time: String,
    pub raw_hall_label: String,
    pub code: String,
    pub city: String,
    pub postal_code: String,
    pub address: String,
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Table,
    List,
    Text,
    Unknown,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ContentKind::Table => "table",
            ContentKind::List => "list",
            ContentKind::Text => "text",
            ContentKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    TargetMissing,
    SelfReference,
    TargetIsAlias,
}

/// Something a run noticed and carried on past.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    StrategyChosen {
        classified: ContentKind,
        used: ContentKind,
    },
    NoRecordsExtracted,
    DuplicateCode {
        code: String,
    },
    UnresolvedAlias {
        code: String,
        target: String,
        reason: UnresolvedReason,
    },
    OverrideSkipped {
        index: usize,
        reason: String,
    },
    OverrideFileMissing {
        path: String,
    },
    OverrideFileRejected {
        path: String,
        message: String,
    },
}

/// State of the override file at the time of reading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverrideSource {
    #[default]
    NotConfigured,
    Missing {
        path: String,
    },
    Loaded {
        path: String,
        content: String,
    },
    Unreadable {
        path: String,
        message: String,
    },
}

/// Everything the extract step hands to the transform step, already materialized.
#[derive(Debug, Clone, Default)]
pub struct SourceBundle {
    pub halls_html: String,
    pub schedule: Vec<ScheduleEntry>,
    pub overrides: OverrideSource,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub directory: Vec<HallRecord>,
    pub merged_schedule: Vec<MergedScheduleRow>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TransformResult {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| {
            !matches!(
                d,
                Diagnostic::StrategyChosen { .. } | Diagnostic::OverrideFileMissing { .. }
            )
        })
    }
}
