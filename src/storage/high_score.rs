use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name under which the score is stored
pub const HIGH_SCORE_KEY: &str = "snake_high_score";

/// Get/set access to the persisted high score. A missing value reads as 0.
pub trait HighScoreStore {
    fn load(&self) -> Result<u32>;
    fn save(&mut self, score: u32) -> Result<()>;
}

/// On-disk layout of the high-score file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct HighScoreRecord {
    #[serde(rename = "snake_high_score", default)]
    high_score: u32,
}

/// Stores the high score as a small JSON document
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> Result<u32> {
        if !self.path.exists() {
            return Ok(0);
        }
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read high score from {:?}", self.path))?;
        if json.trim().is_empty() {
            return Ok(0);
        }
        let record: HighScoreRecord =
            serde_json::from_str(&json).context("Failed to deserialize high score")?;
        Ok(record.high_score)
    }

    fn save(&mut self, score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }
        let record = HighScoreRecord { high_score: score };
        let json =
            serde_json::to_string_pretty(&record).context("Failed to serialize high score")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write high score to {:?}", self.path))?;
        Ok(())
    }
}

/// Keeps the high score for the lifetime of the process only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: u32) -> Self {
        Self { value: Some(value) }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u32> {
        Ok(self.value.unwrap_or(0))
    }

    fn save(&mut self, score: u32) -> Result<()> {
        self.value = Some(score);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_zero() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("score.json");
        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.path(), path.as_path());

        store.save(42).unwrap();
        assert_eq!(store.load().unwrap(), 42);

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains(HIGH_SCORE_KEY));

        // A second handle on the same file sees the value
        assert_eq!(JsonFileStore::new(&path).load().unwrap(), 42);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("score.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().is_err());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), 0);
        store.save(7).unwrap();
        assert_eq!(store.load().unwrap(), 7);
        assert_eq!(MemoryStore::with_value(3).load().unwrap(), 3);
    }
}
