//! ProgressStore trait — pluggable scenario progress persistence
//!
//! Abstracts the per-scenario progress map (best score, attempts,
//! completion) so backends can be swapped without touching the scenario
//! engine:
//! - `InMemoryProgress`: volatile store for tests and ephemeral runs
//! - `FileProgress`: JSON file with atomic tmp+rename writes

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::types::ProgressMap;

/// Trait for pluggable progress backends.
///
/// Implementations must be thread-safe (Send + Sync) so the store can be
/// handed to the engine task.
pub trait ProgressStore: Send + Sync {
    /// Load the full progress map. An absent backing file is an empty map.
    fn load(&self) -> Result<ProgressMap, ProgressError>;

    /// Persist the full progress map.
    fn save(&self, progress: &ProgressMap) -> Result<(), ProgressError>;

    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;
}

/// Progress persistence errors
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage error: {0}")]
    Storage(String),
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// Volatile progress store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct InMemoryProgress {
    map: std::sync::RwLock<ProgressMap>,
}

impl InMemoryProgress {
    pub fn new() -> Self {
        Self {
            map: std::sync::RwLock::new(HashMap::new()),
        }
    }
}

impl ProgressStore for InMemoryProgress {
    fn load(&self) -> Result<ProgressMap, ProgressError> {
        let map = self
            .map
            .read()
            .map_err(|e| ProgressError::Storage(e.to_string()))?;
        Ok(map.clone())
    }

    fn save(&self, progress: &ProgressMap) -> Result<(), ProgressError> {
        let mut map = self
            .map
            .write()
            .map_err(|e| ProgressError::Storage(e.to_string()))?;
        *map = progress.clone();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}

// ============================================================================
// File Store
// ============================================================================

/// JSON-file progress store.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place so a
/// crash mid-write cannot corrupt existing progress.
#[derive(Debug)]
pub struct FileProgress {
    path: PathBuf,
}

impl FileProgress {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for FileProgress {
    fn load(&self) -> Result<ProgressMap, ProgressError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| ProgressError::Storage(format!("{}: {e}", self.path.display())))?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, progress: &ProgressMap) -> Result<(), ProgressError> {
        let json = serde_json::to_string_pretty(progress)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| ProgressError::Storage(format!("{}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| ProgressError::Storage(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "File"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScenarioProgress;
    use chrono::Utc;

    fn sample_map() -> ProgressMap {
        let mut map = HashMap::new();
        map.insert(
            "tutorial".to_string(),
            ScenarioProgress {
                completed: true,
                best_score: 85.0,
                attempts: 3,
                last_played: Some(Utc::now()),
            },
        );
        map
    }

    #[test]
    fn test_in_memory_roundtrip() {
        let store = InMemoryProgress::new();
        assert!(store.load().unwrap().is_empty());

        store.save(&sample_map()).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!((loaded["tutorial"].best_score - 85.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProgress::new(dir.path().join("progress.json"));

        // Missing file loads as empty
        assert!(store.load().unwrap().is_empty());

        store.save(&sample_map()).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded["tutorial"].attempts, 3);
        assert!(loaded["tutorial"].completed);
    }

    #[test]
    fn test_file_overwrite_keeps_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProgress::new(dir.path().join("progress.json"));

        store.save(&sample_map()).unwrap();
        let mut updated = sample_map();
        if let Some(p) = updated.get_mut("tutorial") {
            p.best_score = 100.0;
        }
        store.save(&updated).unwrap();

        let loaded = store.load().unwrap();
        assert!((loaded["tutorial"].best_score - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trait_object() {
        let store: Box<dyn ProgressStore> = Box::new(InMemoryProgress::new());
        assert_eq!(store.backend_name(), "InMemory");
        store.save(&sample_map()).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
