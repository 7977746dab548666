//! JSON-file-backed document collections
//!
//! Each collection keeps its documents in memory behind an `RwLock` and
//! persists the whole map to one pretty-printed JSON file under the data
//! directory. Writers hold the lock across the disk write, so readers always
//! observe a state that is at least as new as the last completed mutation
//! (read-your-writes).

pub mod index;
pub mod videos;
pub mod vocabulary;
pub mod watch_history;

pub use index::{IndexStats, IndexStore};
pub use videos::VideoStore;
pub use vocabulary::VocabularyStore;
pub use watch_history::WatchHistoryStore;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

/// Errors from collection operations
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("duplicate document id: {0}")]
    DuplicateId(String),
}

/// One persisted collection of documents keyed by id
pub struct JsonCollection<T> {
    name: &'static str,
    path: PathBuf,
    docs: RwLock<HashMap<String, T>>,
}

impl<T> JsonCollection<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    /// Open a collection, loading any existing file under `data_dir`
    pub async fn open(data_dir: &Path, name: &'static str) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(data_dir).await?;
        let path = data_dir.join(format!("{}.json", name));

        let docs: HashMap<String, T> = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!("📦 Collection '{}' loaded with {} documents", name, docs.len());

        Ok(Self { name, path, docs: RwLock::new(docs) })
    }

    /// Fetch one document. `None` is the explicit not-found signal; an `Err`
    /// always means the store itself failed.
    pub async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.docs.read().await.get(id).cloned())
    }

    /// All documents, in unspecified order
    pub async fn all(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.docs.read().await.values().cloned().collect())
    }

    /// Documents matching a predicate
    pub async fn find<F>(&self, pred: F) -> Result<Vec<T>, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.docs.read().await.values().filter(|doc| pred(doc)).cloned().collect())
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Transactional single-document write (insert or replace)
    pub async fn put(&self, id: &str, doc: T) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        docs.insert(id.to_string(), doc);
        self.persist(&docs).await
    }

    /// Remove one document, returning it when present
    pub async fn remove(&self, id: &str) -> Result<Option<T>, StoreError> {
        let mut docs = self.docs.write().await;
        let removed = docs.remove(id);
        if removed.is_some() {
            self.persist(&docs).await?;
        }
        Ok(removed)
    }

    /// Unordered bulk insert. A duplicate id is reported via the first error
    /// encountered, but the remaining documents are still inserted; the
    /// return value is the number actually added.
    pub async fn insert_many(&self, batch: Vec<(String, T)>) -> Result<usize, StoreError> {
        let mut docs = self.docs.write().await;
        let mut inserted = 0;
        let mut first_error = None;

        for (id, doc) in batch {
            if docs.contains_key(&id) {
                if first_error.is_none() {
                    first_error = Some(StoreError::DuplicateId(id));
                }
                continue;
            }
            docs.insert(id, doc);
            inserted += 1;
        }

        self.persist(&docs).await?;

        match first_error {
            Some(err) => Err(err),
            None => Ok(inserted),
        }
    }

    /// Remove every document. Completes in memory and on disk before
    /// returning, so no later insert can be observed ahead of it.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        docs.clear();
        self.persist(&docs).await
    }

    /// Replace the whole collection in one pass under a single write lock
    pub async fn replace_all(&self, batch: Vec<(String, T)>) -> Result<usize, StoreError> {
        let mut docs = self.docs.write().await;
        docs.clear();
        for (id, doc) in batch {
            docs.insert(id, doc);
        }
        let count = docs.len();
        self.persist(&docs).await?;
        Ok(count)
    }

    /// Write the current map to disk; callers hold the write lock
    async fn persist(&self, docs: &HashMap<String, T>) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(docs)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
