//! JSON-file key-value store.
//!
//! Keeps the working set in memory and rewrites the whole file after every
//! mutation, so cached OMDb responses survive between CLI runs the way they
//! survive page reloads in a browser.

use super::{check_quota, scan_map, stats_of, KeyValueStore, StoreStats};
use crate::error::{Error, Result};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct FileStore {
    path: Arc<PathBuf>,
    entries: Arc<DashMap<String, String>>,
    quota_bytes: Option<usize>,
    flush_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries if the file exists.
    ///
    /// # Errors
    /// Returns `Error::StoreError` if the file exists but cannot be read, or
    /// `Error::DeserializationError` if it is not a JSON object of strings.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = DashMap::new();

        match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => {
                let map: BTreeMap<String, String> = serde_json::from_slice(&bytes)?;
                for (k, v) in map {
                    entries.insert(k, v);
                }
                debug!("Loaded {} entries from {}", entries.len(), path.display());
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No store file at {}, starting empty", path.display());
            }
            Err(e) => {
                return Err(Error::StoreError(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        Ok(FileStore {
            path: Arc::new(path),
            entries: Arc::new(entries),
            quota_bytes: None,
            flush_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Reject writes that would grow the store beyond `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stats(&self) -> StoreStats {
        stats_of(&self.entries)
    }

    async fn flush(&self) -> Result<()> {
        let _guard = self.flush_lock.lock().await;

        let snapshot: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let bytes = serde_json::to_vec(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write-then-rename so a crash never leaves a truncated file.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, self.path.as_path()).await?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        check_quota(&self.entries, self.quota_bytes, key, &value)?;
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(e) = self.flush().await {
            match previous {
                Some(old) => {
                    self.entries.insert(key.to_string(), old);
                }
                None => {
                    self.entries.remove(key);
                }
            }
            warn!("File SET {} rolled back: {}", key, e);
            return Err(e);
        }
        debug!("✓ File SET {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if let Some((key, old)) = self.entries.remove(key) {
            if let Err(e) = self.flush().await {
                warn!("File DELETE {} rolled back: {}", key, e);
                self.entries.insert(key, old);
                return Err(e);
            }
            debug!("✓ File DELETE {}", key);
        }
        Ok(())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(scan_map(&self.entries, prefix))
    }

    async fn mdelete(&self, keys: &[String]) -> Result<()> {
        let removed: Vec<(String, String)> = keys
            .iter()
            .filter_map(|key| self.entries.remove(key))
            .collect();
        if !removed.is_empty() {
            if let Err(e) = self.flush().await {
                warn!("File MDELETE of {} keys rolled back: {}", removed.len(), e);
                for (key, old) in removed {
                    self.entries.insert(key, old);
                }
                return Err(e);
            }
        }
        debug!("✓ File MDELETE {} keys ({} present)", keys.len(), removed.len());
        Ok(())
    }
}
