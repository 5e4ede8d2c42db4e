//! Wire types for the openFDA enforcement endpoint

use herald_application::SourceError;
use herald_domain::{RecallRecord, RecordId, ReportDate};
use serde::Deserialize;

/// One page of the enforcement feed
#[derive(Debug, Deserialize)]
pub(crate) struct EnforcementPage {
    #[serde(default)]
    pub results: Vec<EnforcementReport>,
}

/// One enforcement report as served on the wire
///
/// Text fields default to empty when absent; older records routinely
/// lack `distribution_pattern`. Identity and date are required: without
/// them a record cannot be tracked by the novelty filter.
#[derive(Debug, Deserialize)]
pub(crate) struct EnforcementReport {
    #[serde(default)]
    pub recall_number: String,
    #[serde(default)]
    pub report_date: String,
    #[serde(default)]
    pub product_description: String,
    #[serde(default)]
    pub reason_for_recall: String,
    #[serde(default)]
    pub recalling_firm: String,
    #[serde(default)]
    pub distribution_pattern: Option<String>,
}

impl EnforcementReport {
    pub(crate) fn into_record(self) -> Result<RecallRecord, SourceError> {
        let id = RecordId::try_new(self.recall_number.as_str()).map_err(|_| {
            SourceError::malformed("enforcement report without a recall_number")
        })?;
        let report_date = ReportDate::parse_compact(&self.report_date).map_err(|_| {
            SourceError::malformed(format!(
                "recall {}: unparseable report_date '{}'",
                self.recall_number, self.report_date
            ))
        })?;

        let mut record = RecallRecord::new(
            id,
            report_date,
            self.product_description,
            self.reason_for_recall,
            self.recalling_firm,
        );
        if let Some(pattern) = self.distribution_pattern {
            record = record.with_distribution(pattern);
        }
        Ok(record)
    }
}

/// Error body openFDA serves alongside non-success statuses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: String,
}

/// openFDA signals an empty result window as a 404 with a NOT_FOUND body
pub(crate) fn is_empty_window(body: &str) -> bool {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.code == "NOT_FOUND")
        .unwrap_or(false)
}
