//! Domain layer for recall-herald
//!
//! This crate contains the core business logic: recall records, the
//! novelty filter that decides which records have not been announced
//! yet, and the alert message built for each new record.
//! It has no dependencies on infrastructure or delivery concerns.
//!
//! # Core Concepts
//!
//! ## Novelty
//!
//! Each run compares fetched records against a persisted [`NoveltyMarker`],
//! the cursor of the most recently announced record. Records strictly
//! newer than the marker (by report date, tie-broken by id) are selected
//! for notification, oldest first, so alerts arrive in the order the
//! recalls were reported.
//!
//! ## First run
//!
//! With no marker yet, behavior is an explicit policy choice
//! ([`FirstRunPolicy`]): announce everything fetched, or silently
//! establish a baseline and only announce from the next run on.

pub mod error;
pub mod notify;
pub mod recall;

// Re-export commonly used types
pub use error::DomainError;
pub use notify::NotificationMessage;
pub use recall::{
    FirstRunPolicy, NoveltyMarker, RecallRecord, RecordId, ReportDate, Selection, select_new,
};
