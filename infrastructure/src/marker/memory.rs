//! In-memory marker store

use async_trait::async_trait;
use herald_application::{MarkerStore, MarkerStoreError};
use herald_domain::NoveltyMarker;
use std::sync::Mutex;

/// Marker store that lives and dies with the process
///
/// Same compare-and-set semantics as the file store, no persistence.
/// Useful for tests and throwaway runs that should not touch disk.
#[derive(Default)]
pub struct InMemoryMarkerStore {
    value: Mutex<Option<NoveltyMarker>>,
}

impl InMemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarkerStore for InMemoryMarkerStore {
    async fn get(&self) -> Result<Option<NoveltyMarker>, MarkerStoreError> {
        Ok(self.value.lock().expect("marker lock poisoned").clone())
    }

    async fn compare_and_set(
        &self,
        expected: Option<&NoveltyMarker>,
        new: &NoveltyMarker,
    ) -> Result<(), MarkerStoreError> {
        let mut value = self.value.lock().expect("marker lock poisoned");
        if value.as_ref() != expected {
            return Err(MarkerStoreError::conflict(expected, value.as_ref()));
        }
        *value = Some(new.clone());
        Ok(())
    }
}
