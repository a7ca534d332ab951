use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use browser_logging::browser_debug;
use thiserror::Error;

use crate::filename::key_filename;
use crate::persist::{ensure_data_dir, AtomicFileWriter};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Asynchronous string key-value storage.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One atomically replaced file per key inside a data directory.
///
/// The directory is created and checked on the first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    writer: AtomicFileWriter,
    dir_ready: Arc<AtomicBool>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.into()),
            dir_ready: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.writer.dir().join(key_filename(key))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        let read = tokio::task::spawn_blocking(move || fs::read_to_string(path))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        match read {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let writer = self.writer.clone();
        let dir_ready = self.dir_ready.clone();
        let filename = key_filename(key);
        let value = value.to_string();
        let path = tokio::task::spawn_blocking(move || {
            if !dir_ready.load(Ordering::Acquire) {
                ensure_data_dir(writer.dir())?;
                dir_ready.store(true, Ordering::Release);
            }
            writer.write(&filename, &value)
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))??;
        browser_debug!("store: wrote {} to {:?}", key, path);
        Ok(())
    }
}

/// In-process store, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous read for inspection outside the runtime.
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
