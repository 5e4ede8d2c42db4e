//! File-backed marker store

use async_trait::async_trait;
use herald_application::{MarkerStore, MarkerStoreError};
use herald_domain::NoveltyMarker;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Persists the novelty marker as one small JSON file
///
/// Writes go to a sibling temp file and land via `rename`, so a crash
/// mid-write never leaves a torn marker behind. `compare_and_set`
/// re-reads the file before renaming; a stale expectation surfaces as
/// [`MarkerStoreError::Conflict`] instead of overwriting another run's
/// progress.
pub struct FileMarkerStore {
    path: PathBuf,
}

impl FileMarkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(path: &Path) -> Result<Option<NoveltyMarker>, MarkerStoreError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MarkerStoreError::io(format!(
                    "reading {}: {e}",
                    path.display()
                )));
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| MarkerStoreError::corrupt(format!("{}: {e}", path.display())))
    }

    fn write(&self, marker: &NoveltyMarker) -> Result<(), MarkerStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    MarkerStoreError::io(format!("creating {}: {e}", parent.display()))
                })?;
            }
        }

        let json = serde_json::to_vec_pretty(marker)
            .map_err(|e| MarkerStoreError::io(format!("encoding marker: {e}")))?;

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| MarkerStoreError::io(format!("writing {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            MarkerStoreError::io(format!(
                "renaming {} to {}: {e}",
                tmp.display(),
                self.path.display()
            ))
        })
    }
}

#[async_trait]
impl MarkerStore for FileMarkerStore {
    async fn get(&self) -> Result<Option<NoveltyMarker>, MarkerStoreError> {
        Self::read(&self.path)
    }

    async fn compare_and_set(
        &self,
        expected: Option<&NoveltyMarker>,
        new: &NoveltyMarker,
    ) -> Result<(), MarkerStoreError> {
        let current = Self::read(&self.path)?;
        if current.as_ref() != expected {
            return Err(MarkerStoreError::conflict(expected, current.as_ref()));
        }
        self.write(new)
    }
}
