//! Typed run configuration
//!
//! The validated slice of configuration the `RunOnce` use case needs.
//! File parsing and environment merging live in the infrastructure
//! layer; by the time a [`RunConfig`] exists, every field is well-formed.

use crate::retry::RetryPolicy;
use herald_domain::FirstRunPolicy;

/// Configuration for a single run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum records to request from the source per fetch
    pub source_limit: usize,
    /// What to do when no marker exists yet
    pub first_run_policy: FirstRunPolicy,
    /// Retry budget for transient fetch and delivery failures
    pub retry: RetryPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source_limit: 20,
            first_run_policy: FirstRunPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl RunConfig {
    pub fn new(source_limit: usize, first_run_policy: FirstRunPolicy, retry: RetryPolicy) -> Self {
        Self {
            source_limit,
            first_run_policy,
            retry,
        }
    }
}
