//! Media store capability.
//!
//! Uploaded payloads are written through a [`MediaStore`] rather than a
//! process-wide path so handlers and workflows can be handed a scratch store,
//! a durable store, or a test double. Keys are flat generated names; the
//! store never creates nested paths.
//!
//! [`LocalMediaStore`] is the filesystem implementation. Writes are
//! write-once (`create_new`), so two requests that somehow generate the same
//! key fail loudly instead of overwriting each other.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::Rng;
use tokio::io::AsyncWriteExt;

use crate::upload::file_extension;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from a media store.
#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    /// The key contains path separators, `..`, or is empty.
    #[error("Invalid media key '{0}'")]
    InvalidKey(String),

    /// A payload already exists under the key.
    #[error("Media key '{0}' already exists")]
    AlreadyExists(String),

    /// No payload exists under the key.
    #[error("Media key '{0}' not found")]
    NotFound(String),

    /// Underlying I/O failure.
    #[error("Media store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Create / read / remove binary payloads by generated key.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Write `data` under `key`. Fails with [`MediaStoreError::AlreadyExists`]
    /// if the key is taken. Returns the opaque location of the payload.
    async fn create(&self, key: &str, data: &[u8]) -> Result<String, MediaStoreError>;

    /// Read the payload stored under `key`.
    async fn read(&self, key: &str) -> Result<Vec<u8>, MediaStoreError>;

    /// Remove the payload under `key`. Returns `false` if nothing was there.
    async fn remove(&self, key: &str) -> Result<bool, MediaStoreError>;

    /// Whether a payload exists under `key`.
    async fn exists(&self, key: &str) -> Result<bool, MediaStoreError>;
}

// ---------------------------------------------------------------------------
// Key generation
// ---------------------------------------------------------------------------

/// Generate a collision-resistant key: `{prefix}-{unix_millis}-{random}{.ext}`.
///
/// The extension is taken from `original_filename` when it is purely
/// alphanumeric, so the key stays a safe flat filename.
pub fn generate_key(prefix: &str, original_filename: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);

    match file_extension(original_filename)
        .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    {
        Some(ext) => format!("{prefix}-{millis}-{suffix}.{ext}"),
        None => format!("{prefix}-{millis}-{suffix}"),
    }
}

fn validate_key(key: &str) -> Result<(), MediaStoreError> {
    if key.is_empty()
        || key.contains('/')
        || key.contains('\\')
        || key.contains("..")
        || key.starts_with('.')
    {
        return Err(MediaStoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Local filesystem implementation
// ---------------------------------------------------------------------------

/// Filesystem-backed store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory if needed and return the store.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, MediaStoreError> {
        let store = Self::new(root);
        tokio::fs::create_dir_all(&store.root).await?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, MediaStoreError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn create(&self, key: &str, data: &[u8]) -> Result<String, MediaStoreError> {
        let path = self.path_for(key)?;

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(MediaStoreError::AlreadyExists(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = write_all_synced(&mut file, data).await {
            // Do not leave a truncated payload behind.
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }

        tracing::debug!(key, bytes = data.len(), root = %self.root.display(), "Media payload written");
        Ok(path.to_string_lossy().into_owned())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, MediaStoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MediaStoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, key: &str) -> Result<bool, MediaStoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, MediaStoreError> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

async fn write_all_synced(file: &mut tokio::fs::File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data).await?;
    file.flush().await?;
    file.sync_all().await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_keep_safe_extension() {
        let key = generate_key("frame", "Selfie.JPG");
        assert!(key.starts_with("frame-"));
        assert!(key.ends_with(".jpg"));
        assert!(validate_key(&key).is_ok());
    }

    #[test]
    fn generated_keys_drop_odd_extensions() {
        let key = generate_key("video", "clip.m p4");
        assert!(!key.contains(' '));
        let key = generate_key("video", "noext");
        assert!(!key.contains('.'));
    }

    #[test]
    fn generated_keys_differ() {
        let a = generate_key("frame", "a.png");
        let b = generate_key("frame", "a.png");
        assert_ne!(a, b);
    }

    #[test]
    fn traversal_keys_are_rejected() {
        for key in ["", "../etc/passwd", "a/b", "a\\b", ".env"] {
            assert!(
                matches!(validate_key(key), Err(MediaStoreError::InvalidKey(_))),
                "{key:?}"
            );
        }
    }

    #[tokio::test]
    async fn create_read_remove_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::open(dir.path()).await.unwrap();

        let location = store.create("frame-1.jpg", b"jpeg-bytes").await.unwrap();
        assert!(location.ends_with("frame-1.jpg"));
        assert!(store.exists("frame-1.jpg").await.unwrap());
        assert_eq!(store.read("frame-1.jpg").await.unwrap(), b"jpeg-bytes");

        assert!(store.remove("frame-1.jpg").await.unwrap());
        assert!(!store.exists("frame-1.jpg").await.unwrap());
        // Removing again is not an error.
        assert!(!store.remove("frame-1.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn create_is_write_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::open(dir.path()).await.unwrap();

        store.create("k", b"first").await.unwrap();
        let err = store.create("k", b"second").await.unwrap_err();
        assert!(matches!(err, MediaStoreError::AlreadyExists(_)));
        assert_eq!(store.read("k").await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::open(dir.path()).await.unwrap();
        assert!(matches!(
            store.read("missing").await,
            Err(MediaStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn open_creates_nested_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("scratch").join("frames");
        let store = LocalMediaStore::open(&root).await.unwrap();
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn concurrent_distinct_writes_do_not_interfere() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(LocalMediaStore::open(dir.path()).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..16u8 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let key = generate_key("frame", "f.jpg");
                store.create(&key, &[i; 32]).await.unwrap();
                (key, i)
            }));
        }
        for handle in handles {
            let (key, i) = handle.await.unwrap();
            assert_eq!(store.read(&key).await.unwrap(), vec![i; 32]);
        }
    }
}
