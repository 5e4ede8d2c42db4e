//! Formatted alert text for one recall record

use crate::recall::RecallRecord;

/// Public FDA page linked from every alert
const RECALLS_PAGE_URL: &str =
    "https://www.fda.gov/safety/recalls-market-withdrawals-safety-alerts";

/// Chat-ready alert text for a single recall (Value Object)
///
/// Carries product, reason, firm, distribution pattern (when the record
/// has one) and the formatted report date, in Slack's mrkdwn dialect.
/// Built per record, discarded after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    text: String,
}

impl NotificationMessage {
    pub fn from_record(record: &RecallRecord) -> Self {
        let mut text = String::new();
        text.push_str(":rotating_light: *FDA Recall Alert* :rotating_light:\n");
        text.push_str(&format!(
            ":warning: *Product:* {}\n",
            record.product_description
        ));
        text.push_str(&format!(
            ":exclamation: *Reason:* {}\n",
            record.reason_for_recall
        ));
        text.push_str(&format!(":factory: *Company:* {}\n", record.recalling_firm));
        if let Some(pattern) = &record.distribution_pattern {
            text.push_str(&format!(":earth_americas: *Distribution:* {}\n", pattern));
        }
        text.push_str(&format!(
            ":calendar: *Recall Date:* {}\n",
            record.report_date.human()
        ));
        text.push_str(&format!(":link: <{}|More info>", RECALLS_PAGE_URL));

        Self { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recall::{RecordId, ReportDate};

    fn sample_record() -> RecallRecord {
        RecallRecord::new(
            RecordId::try_new("F-1234-2026").unwrap(),
            ReportDate::parse_compact("20260305").unwrap(),
            "Crunchy Peanut Butter 16oz",
            "Undeclared tree nuts",
            "Acme Foods LLC",
        )
    }

    #[test]
    fn test_message_carries_all_required_fields() {
        let message = NotificationMessage::from_record(
            &sample_record().with_distribution("Nationwide via retail stores"),
        );
        let text = message.text();
        assert!(text.contains("Crunchy Peanut Butter 16oz"));
        assert!(text.contains("Undeclared tree nuts"));
        assert!(text.contains("Acme Foods LLC"));
        assert!(text.contains("Nationwide via retail stores"));
        assert!(text.contains("March 5, 2026"));
        assert!(text.contains(RECALLS_PAGE_URL));
    }

    #[test]
    fn test_message_omits_distribution_line_when_absent() {
        let message = NotificationMessage::from_record(&sample_record());
        assert!(!message.text().contains("*Distribution:*"));
        assert!(message.text().contains("*Product:*"));
    }

    #[test]
    fn test_messages_for_same_record_are_identical() {
        let record = sample_record();
        assert_eq!(
            NotificationMessage::from_record(&record),
            NotificationMessage::from_record(&record)
        );
    }
}
