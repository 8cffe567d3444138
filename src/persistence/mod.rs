//! Best distance persistence
//!
//! The core reads the best distance once per crash and writes it only when
//! beaten. The stored value is a single integer.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Host-provided best score storage
pub trait BestScoreStore {
    fn read_best(&self) -> u32;
    fn write_best(&mut self, distance: u32) -> Result<(), StoreError>;
}

/// Volatile store, lost when the process exits
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(best: u32) -> Self {
        Self { best }
    }
}

impl BestScoreStore for MemoryStore {
    fn read_best(&self) -> u32 {
        self.best
    }

    fn write_best(&mut self, distance: u32) -> Result<(), StoreError> {
        self.best = distance;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BestScoreFile {
    best_distance: u32,
}

/// JSON file store: `{ "best_distance": n }`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    best: u32,
}

impl JsonFileStore {
    /// Open the store, treating a missing file as no best score yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let best = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str::<BestScoreFile>(&json)?.best_distance,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::info!("No best score at {}, starting fresh", path.display());
                0
            }
            Err(err) => return Err(err.into()),
        };
        log::info!("Loaded best distance {best}");
        Ok(Self { path, best })
    }
}

impl BestScoreStore for JsonFileStore {
    fn read_best(&self) -> u32 {
        self.best
    }

    fn write_best(&mut self, distance: u32) -> Result<(), StoreError> {
        let json = serde_json::to_string(&BestScoreFile {
            best_distance: distance,
        })?;
        fs::write(&self.path, json)?;
        self.best = distance;
        log::info!("Best distance saved ({distance})");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dino-runner-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read_best(), 0);
        store.write_best(420).unwrap();
        assert_eq!(store.read_best(), 420);
    }

    #[test]
    fn test_file_store_missing_file() {
        let path = temp_path("missing");
        let _ = fs::remove_file(&path);
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.read_best(), 0);
    }

    #[test]
    fn test_file_store_persists() {
        let path = temp_path("persist");
        let mut store = JsonFileStore::open(&path).unwrap();
        store.write_best(1234).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.read_best(), 1234);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_malformed() {
        let path = temp_path("malformed");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Json(_))));
        let _ = fs::remove_file(&path);
    }
}
