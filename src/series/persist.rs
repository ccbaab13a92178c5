use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;

use super::error::PersistError;

/// Durable blob storage the series is mirrored into.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn put(&self, key: &str, blob: Vec<u8>) -> Result<(), PersistError>;
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError>;
}

/// One JSON file per key inside `folder`.
pub struct FileStore {
    folder: PathBuf,
}

impl FileStore {
    pub fn new(folder: PathBuf) -> Self {
        FileStore { folder }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, PersistError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.folder.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn put(&self, key: &str, blob: Vec<u8>) -> Result<(), PersistError> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.folder).await?;

        // Readers only ever see a complete blob.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, blob).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        let path = self.key_path(key)?;
        match fs::read(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store, used when persistence is disabled.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn put(&self, key: &str, blob: Vec<u8>) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), blob);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }
}
