//! Novelty filter: which fetched records have not been announced yet

use crate::error::DomainError;
use crate::recall::marker::NoveltyMarker;
use crate::recall::record::RecallRecord;
use std::str::FromStr;

/// What to do on the very first run, before any marker exists
///
/// The upstream feed serves up to a hundred historical records, so the
/// choice between announcing all of them and silently establishing a
/// baseline must be made explicitly by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstRunPolicy {
    /// Announce nothing; record the newest fetched record as the baseline
    #[default]
    BaselineOnly,
    /// Treat every fetched record as new and announce all of them
    NotifyAll,
}

impl FirstRunPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirstRunPolicy::BaselineOnly => "baseline-only",
            FirstRunPolicy::NotifyAll => "notify-all",
        }
    }
}

impl FromStr for FirstRunPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baseline-only" | "baseline_only" => Ok(FirstRunPolicy::BaselineOnly),
            "notify-all" | "notify_all" => Ok(FirstRunPolicy::NotifyAll),
            other => Err(DomainError::UnknownFirstRunPolicy(other.to_string())),
        }
    }
}

impl std::fmt::Display for FirstRunPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of the novelty filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Records to announce, oldest first
    pub to_notify: Vec<RecallRecord>,
    /// Baseline to establish instead of announcing (first run under
    /// [`FirstRunPolicy::BaselineOnly`] only)
    pub baseline: Option<NoveltyMarker>,
}

impl Selection {
    fn empty() -> Self {
        Self {
            to_notify: Vec::new(),
            baseline: None,
        }
    }
}

/// Select the records strictly newer than `marker`, oldest first
///
/// Pure function of its inputs. Fetch order does not matter; the result
/// is sorted into chronological order (report date, then id) so alerts
/// go out in the order the recalls were reported. With no marker the
/// `policy` decides between announcing everything and establishing a
/// baseline at the newest fetched record.
pub fn select_new(
    records: Vec<RecallRecord>,
    marker: Option<&NoveltyMarker>,
    policy: FirstRunPolicy,
) -> Selection {
    if records.is_empty() {
        return Selection::empty();
    }

    let mut fresh: Vec<RecallRecord> = match marker {
        Some(marker) => records.into_iter().filter(|r| marker.precedes(r)).collect(),
        None => match policy {
            FirstRunPolicy::NotifyAll => records,
            FirstRunPolicy::BaselineOnly => {
                let newest = records
                    .iter()
                    .max_by(|a, b| (a.report_date, &a.id).cmp(&(b.report_date, &b.id)))
                    .map(NoveltyMarker::for_record);
                return Selection {
                    to_notify: Vec::new(),
                    baseline: newest,
                };
            }
        },
    };

    fresh.sort_by(|a, b| (a.report_date, &a.id).cmp(&(b.report_date, &b.id)));

    Selection {
        to_notify: fresh,
        baseline: None,
    }
}
