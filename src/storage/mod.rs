//! Single-slot persistence for the last notified fingerprint.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write state {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One named durable slot. No history is kept.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// `None` when nothing has been stored yet.
    async fn load_fingerprint(&self) -> Result<Option<String>, StateError>;
    async fn save_fingerprint(&self, fingerprint: &str) -> Result<(), StateError>;
    async fn clear(&self) -> Result<(), StateError>;
}

// ── File slot ─────────────────────────────────────────────────────────────────

pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_err(&self, source: std::io::Error) -> StateError {
        StateError::Write { path: self.path.clone(), source }
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load_fingerprint(&self) -> Result<Option<String>, StateError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => {
                let s = s.trim();
                Ok(if s.is_empty() { None } else { Some(s.to_string()) })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state at {:?}", self.path);
                Ok(None)
            }
            Err(source) => Err(StateError::Read { path: self.path.clone(), source }),
        }
    }

    /// Write to a sibling temp file, then rename over the slot.
    async fn save_fingerprint(&self, fingerprint: &str) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_err(e))?;
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, fingerprint)
            .await
            .map_err(|e| self.write_err(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.write_err(e))?;

        debug!("Stored fingerprint {} at {:?}", fingerprint, self.path);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StateError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.write_err(e)),
        }
    }
}

// ── In-memory slot ────────────────────────────────────────────────────────────

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStateStore {
    slot: std::sync::Mutex<Option<String>>,
    reads: std::sync::atomic::AtomicUsize,
    writes: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryStateStore {
    pub fn with_fingerprint(fingerprint: &str) -> Self {
        Self {
            slot: std::sync::Mutex::new(Some(fingerprint.to_string())),
            ..Default::default()
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn current(&self) -> Option<String> {
        self.slot.lock().map(|s| s.clone()).unwrap_or(None)
    }
}

#[cfg(test)]
#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load_fingerprint(&self) -> Result<Option<String>, StateError> {
        self.reads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.current())
    }

    async fn save_fingerprint(&self, fingerprint: &str) -> Result<(), StateError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(fingerprint.to_string());
        }
        self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StateError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join(".state/last_notified.hash"));
        assert_eq!(store.load_fingerprint().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_creates_dirs_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/.state/last_notified.hash");
        let store = FileStateStore::new(&path);

        store.save_fingerprint("abc123").await.unwrap();
        assert_eq!(store.load_fingerprint().await.unwrap().as_deref(), Some("abc123"));

        store.save_fingerprint("def456").await.unwrap();
        assert_eq!(store.load_fingerprint().await.unwrap().as_deref(), Some("def456"));
        assert!(!path.with_file_name("last_notified.hash.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_trims_and_treats_blank_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h");
        std::fs::write(&path, "  abc\n").unwrap();
        let store = FileStateStore::new(&path);
        assert_eq!(store.load_fingerprint().await.unwrap().as_deref(), Some("abc"));

        std::fs::write(&path, "\n").unwrap();
        assert_eq!(store.load_fingerprint().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("h"));
        store.save_fingerprint("x").await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load_fingerprint().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_error_when_slot_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path());
        assert!(matches!(
            store.load_fingerprint().await,
            Err(StateError::Read { .. })
        ));
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let store = MemoryStateStore::default();
        tokio_test::block_on(async {
            store.save_fingerprint("a").await.unwrap();
            store.save_fingerprint("b").await.unwrap();
        });
        assert_eq!(store.writes(), 2);
        assert_eq!(store.current().as_deref(), Some("b"));
    }
}
