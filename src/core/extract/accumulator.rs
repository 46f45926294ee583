use crate::core::extract::fold_info;
use crate::core::patterns::PatternLibrary;
use crate::domain::model::HallRecord;

/// The record being built while rows or lines are scanned.
///
/// A new code flushes whatever was accumulating; supplementary lines only
/// ever attach to the current record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Accumulator {
    #[default]
    NoCurrent,
    Accumulating(HallRecord),
}

impl Accumulator {
    /// Begins `record`, handing back the record it replaces.
    pub fn start(&mut self, record: HallRecord) -> Option<HallRecord> {
        std::mem::replace(self, Accumulator::Accumulating(record)).into_record()
    }

    /// Folds a supplementary line into the current record. Returns `false`
    /// when there is no record to attach it to.
    pub fn supplement(&mut self, line: &str, patterns: &PatternLibrary) -> bool {
        match self {
            Accumulator::Accumulating(record) => {
                fold_info(record, line, patterns);
                true
            }
            Accumulator::NoCurrent => false,
        }
    }

    /// Ends the current record, leaving the accumulator empty.
    pub fn take(&mut self) -> Option<HallRecord> {
        std::mem::take(self).into_record()
    }

    pub fn finish(self) -> Option<HallRecord> {
        self.into_record()
    }

    fn into_record(self) -> Option<HallRecord> {
        match self {
            Accumulator::Accumulating(record) => Some(record),
            Accumulator::NoCurrent => None,
        }
    }
}
