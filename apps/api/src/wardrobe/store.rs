//! Flat-file wardrobe and rating history.
//!
//! Both collections are JSON documents that are read in full on every
//! operation and rewritten in full on every append. Appends are serialised by
//! a single writer lock, and each rewrite goes to a temp file in the same
//! directory before being renamed over the target, so a failed write leaves
//! the previous document intact.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::wardrobe::models::{NewItem, NewRating, OutfitRating, WardrobeItem};

pub const WARDROBE_FILE: &str = "wardrobe.json";
pub const RATINGS_FILE: &str = "ratings.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("stored data at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialise collection: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("store write task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WardrobeDocument {
    pub items: Vec<WardrobeItem>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RatingsDocument {
    pub ratings: Vec<OutfitRating>,
}

/// Single owner of the two persisted collections.
pub struct WardrobeStore {
    wardrobe_path: PathBuf,
    ratings_path: PathBuf,
    write_lock: Mutex<()>,
}

impl WardrobeStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            wardrobe_path: data_dir.join(WARDROBE_FILE),
            ratings_path: data_dir.join(RATINGS_FILE),
            write_lock: Mutex::new(()),
        }
    }

    /// All items in stored order. Missing storage is an empty wardrobe.
    pub async fn load(&self) -> Result<Vec<WardrobeItem>, StoreError> {
        let doc: WardrobeDocument = read_document(&self.wardrobe_path).await?;
        Ok(doc.items)
    }

    /// All ratings in stored order. Missing storage is an empty history.
    pub async fn load_ratings(&self) -> Result<Vec<OutfitRating>, StoreError> {
        let doc: RatingsDocument = read_document(&self.ratings_path).await?;
        Ok(doc.ratings)
    }

    pub async fn append(&self, new: NewItem) -> Result<WardrobeItem, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut doc: WardrobeDocument = read_document(&self.wardrobe_path).await?;
        let item = WardrobeItem {
            id: doc.items.len() as u64 + 1,
            filename: new.filename,
            filepath: new.filepath,
            item_type: new.item_type,
            color: new.color,
            style: new.style,
            description: new.description,
            uploaded_at: Utc::now(),
        };
        doc.items.push(item.clone());
        write_document(&self.wardrobe_path, &doc).await?;

        info!(
            "Added wardrobe item {} ({} {})",
            item.id, item.color, item.item_type
        );
        Ok(item)
    }

    pub async fn append_rating(&self, new: NewRating) -> Result<OutfitRating, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut doc: RatingsDocument = read_document(&self.ratings_path).await?;
        let rating = OutfitRating {
            filename: new.filename,
            theme: new.theme,
            occasion: new.occasion,
            description: new.description,
            rating: new.rating,
            rated_at: Utc::now(),
        };
        doc.ratings.push(rating.clone());
        write_document(&self.ratings_path, &doc).await?;

        info!(
            "Recorded rating #{} for {} ({} / {})",
            doc.ratings.len(),
            rating.filename,
            rating.theme,
            rating.occasion
        );
        Ok(rating)
    }
}

async fn read_document<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

async fn write_document<T: Serialize>(path: &Path, doc: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(doc)?;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || persist_atomically(&path, &bytes)).await?
}

fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let io_err = |source: io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
