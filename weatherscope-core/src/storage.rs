//! String key-value persistence, the local-storage stand-in.

use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub trait KeyValueStore: Send + Debug {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A single JSON object file, rewritten on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "storage.json";

    /// Open `<dir>/storage.json`. A missing or corrupt file starts empty.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(Self::FILE_NAME);
        let entries = Self::read_entries(&path);
        Self { path, entries }
    }

    fn read_entries(path: &Path) -> BTreeMap<String, String> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read storage file {} - {e}", path.display());
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("Ignoring unparseable storage file {} - {e}", path.display());
            BTreeMap::new()
        })
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create storage directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize stored values")?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write storage file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace storage file: {}", self.path.display()))?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let mut store = MemoryStore::default();
        assert_eq!(store.get("k"), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));

        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = FileStore::open(dir.path());
        store.set("weather-theme", "ocean").unwrap();
        store.set("weather-favorites", r#"["Tokyo"]"#).unwrap();

        let reopened = FileStore::open(dir.path());
        assert_eq!(reopened.get("weather-theme").as_deref(), Some("ocean"));
        assert_eq!(reopened.get("weather-favorites").as_deref(), Some(r#"["Tokyo"]"#));
    }

    #[test]
    fn file_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let mut store = FileStore::open(&nested);
        store.set("k", "v").unwrap();

        assert!(nested.join(FileStore::FILE_NAME).exists());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(FileStore::FILE_NAME), "{not json").unwrap();

        let store = FileStore::open(dir.path());
        assert_eq!(store.get("anything"), None);
    }
}
