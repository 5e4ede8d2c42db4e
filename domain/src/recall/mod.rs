//! Recall records and novelty tracking

mod marker;
mod novelty;
mod record;

pub use marker::NoveltyMarker;
pub use novelty::{FirstRunPolicy, Selection, select_new};
pub use record::{RecallRecord, RecordId, ReportDate};
