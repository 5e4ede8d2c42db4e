//! Recall record entity and its value objects

use crate::error::DomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable identifier of a recall report (Value Object)
///
/// Backed by the upstream recall number (e.g. `F-1234-2026`). Ids are
/// unique per record and stable across repeated fetches, which is what
/// makes them usable as the novelty cursor's tie-breaker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Try to create a record id, returning an error for empty input
    pub fn try_new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::EmptyRecordId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Date a recall was reported to the upstream provider (Value Object)
///
/// The upstream wire form is the compact `YYYYMMDD` string; that form is
/// also used when the date is persisted inside a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportDate(NaiveDate);

/// Wire and persistence form of a report date
const COMPACT_FORMAT: &str = "%Y%m%d";

impl ReportDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse the upstream `YYYYMMDD` form
    pub fn parse_compact(value: &str) -> Result<Self, DomainError> {
        NaiveDate::parse_from_str(value.trim(), COMPACT_FORMAT)
            .map(Self)
            .map_err(|_| DomainError::InvalidReportDate(value.to_string()))
    }

    /// Render back to the compact `YYYYMMDD` form
    pub fn compact(&self) -> String {
        self.0.format(COMPACT_FORMAT).to_string()
    }

    /// Render the human form used in alert messages, e.g. "March 5, 2026"
    pub fn human(&self) -> String {
        self.0.format("%B %-d, %Y").to_string()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for ReportDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.compact())
    }
}

impl Serialize for ReportDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.compact())
    }
}

impl<'de> Deserialize<'de> for ReportDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ReportDate::parse_compact(&raw).map_err(serde::de::Error::custom)
    }
}

/// A single recall report from the upstream provider (Entity)
///
/// Immutable once constructed; rebuilt fresh from every fetch. Optional
/// text fields that older records lack are `None`, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecallRecord {
    pub id: RecordId,
    pub report_date: ReportDate,
    pub product_description: String,
    pub reason_for_recall: String,
    pub recalling_firm: String,
    pub distribution_pattern: Option<String>,
}

impl RecallRecord {
    pub fn new(
        id: RecordId,
        report_date: ReportDate,
        product_description: impl Into<String>,
        reason_for_recall: impl Into<String>,
        recalling_firm: impl Into<String>,
    ) -> Self {
        Self {
            id,
            report_date,
            product_description: product_description.into(),
            reason_for_recall: reason_for_recall.into(),
            recalling_firm: recalling_firm.into(),
            distribution_pattern: None,
        }
    }

    pub fn with_distribution(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.distribution_pattern = if pattern.trim().is_empty() {
            None
        } else {
            Some(pattern)
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_rejects_empty() {
        assert_eq!(RecordId::try_new(""), Err(DomainError::EmptyRecordId));
        assert_eq!(RecordId::try_new("   "), Err(DomainError::EmptyRecordId));
    }

    #[test]
    fn test_record_id_roundtrip() {
        let id = RecordId::try_new("F-1234-2026").unwrap();
        assert_eq!(id.as_str(), "F-1234-2026");
        assert_eq!(id.to_string(), "F-1234-2026");
    }

    #[test]
    fn test_report_date_parse_compact() {
        let date = ReportDate::parse_compact("20260305").unwrap();
        assert_eq!(date.compact(), "20260305");
    }

    #[test]
    fn test_report_date_rejects_garbage() {
        assert!(ReportDate::parse_compact("2026-03-05").is_err());
        assert!(ReportDate::parse_compact("not a date").is_err());
        assert!(ReportDate::parse_compact("20261332").is_err());
        assert!(ReportDate::parse_compact("").is_err());
    }

    #[test]
    fn test_report_date_human_form() {
        let date = ReportDate::parse_compact("20260305").unwrap();
        assert_eq!(date.human(), "March 5, 2026");
    }

    #[test]
    fn test_report_date_ordering() {
        let older = ReportDate::parse_compact("20260101").unwrap();
        let newer = ReportDate::parse_compact("20260102").unwrap();
        assert!(older < newer);
    }

    #[test]
    fn test_report_date_serde_uses_compact_form() {
        let date = ReportDate::parse_compact("20260305").unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"20260305\"");
        let back: ReportDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }

    #[test]
    fn test_with_distribution_drops_blank_pattern() {
        let record = RecallRecord::new(
            RecordId::try_new("F-1-2026").unwrap(),
            ReportDate::parse_compact("20260305").unwrap(),
            "Peanut butter",
            "Undeclared allergen",
            "Acme Foods",
        )
        .with_distribution("  ");
        assert_eq!(record.distribution_pattern, None);

        let record = record.with_distribution("Nationwide");
        assert_eq!(record.distribution_pattern.as_deref(), Some("Nationwide"));
    }
}
