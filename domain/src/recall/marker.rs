//! Novelty marker value object

use crate::recall::record::{RecallRecord, RecordId, ReportDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Cursor of the most recently announced recall (Value Object)
///
/// Persisted between runs through the marker store. Ordering is by
/// report date first, record id second, so records sharing a report
/// date still have a total order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoveltyMarker {
    pub record_id: RecordId,
    pub report_date: ReportDate,
}

impl NoveltyMarker {
    pub fn new(record_id: RecordId, report_date: ReportDate) -> Self {
        Self {
            record_id,
            report_date,
        }
    }

    /// The marker a record advances the cursor to once announced
    pub fn for_record(record: &RecallRecord) -> Self {
        Self {
            record_id: record.id.clone(),
            report_date: record.report_date,
        }
    }

    /// Whether `record` is strictly newer than this marker
    ///
    /// Strictly newer means a later report date, or the same date with a
    /// greater id. A record at or before the marker was already announced.
    pub fn precedes(&self, record: &RecallRecord) -> bool {
        match record.report_date.cmp(&self.report_date) {
            Ordering::Greater => true,
            Ordering::Equal => record.id > self.record_id,
            Ordering::Less => false,
        }
    }
}

impl std::fmt::Display for NoveltyMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.record_id, self.report_date)
    }
}
