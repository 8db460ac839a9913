//! Image storage: where uploaded garment and outfit photos live.
//!
//! `AppState` holds an `Arc<dyn ImageStore>`. `LocalImageStore` writes to the
//! upload directory; `MemoryImageStore` keeps bytes in memory for tests.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::sync::RwLock;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("invalid image name '{0}'")]
    InvalidName(String),

    #[error("image storage I/O error: {0}")]
    Io(#[from] io::Error),
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores `bytes` under `name`, replacing anything already there.
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), ImageStoreError>;

    /// Returns the stored bytes, or `None` if nothing is stored under `name`.
    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, ImageStoreError>;

    /// Deletes `name`; a missing image is not an error.
    async fn remove(&self, name: &str) -> Result<(), ImageStoreError>;

    /// Reference recorded alongside the item (a path for on-disk storage).
    fn path_for(&self, name: &str) -> String;
}

pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, ImageStoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), ImageStoreError> {
        check_name(name)?;
        tokio::fs::write(self.root.join(name), bytes).await?;
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, ImageStoreError> {
        check_name(name)?;
        match tokio::fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, name: &str) -> Result<(), ImageStoreError> {
        check_name(name)?;
        match tokio::fs::remove_file(self.root.join(name)).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn path_for(&self, name: &str) -> String {
        self.root.join(name).to_string_lossy().into_owned()
    }
}

#[derive(Default)]
#[cfg_attr(not(test), allow(dead_code))]
pub struct MemoryImageStore {
    images: RwLock<HashMap<String, Vec<u8>>>,
}

#[cfg_attr(not(test), allow(dead_code))]
impl MemoryImageStore {
    pub async fn stored_count(&self) -> usize {
        self.images.read().await.len()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), ImageStoreError> {
        check_name(name)?;
        self.images
            .write()
            .await
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, ImageStoreError> {
        check_name(name)?;
        Ok(self.images.read().await.get(name).cloned())
    }

    async fn remove(&self, name: &str) -> Result<(), ImageStoreError> {
        check_name(name)?;
        self.images.write().await.remove(name);
        Ok(())
    }

    fn path_for(&self, name: &str) -> String {
        format!("memory/{name}")
    }
}

/// Rejects anything that could escape the storage root.
fn check_name(name: &str) -> Result<(), ImageStoreError> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(ImageStoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Reduces a client-supplied filename to `[A-Za-z0-9._-]`, dropping any
/// directory part and leading dots.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let mut cleaned = cleaned.trim_start_matches('.').to_string();
    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }
    cleaned
}

pub fn has_allowed_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Name under which an upload is stored: `<prefix><YYYYmmdd_HHMMSS>_<name>`.
pub fn stored_name(prefix: &str, at: DateTime<Local>, client_name: &str) -> String {
    format!("{prefix}{}_{client_name}", at.format("%Y%m%d_%H%M%S"))
}

pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
