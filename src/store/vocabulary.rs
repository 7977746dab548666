//! Vocabulary corpus store
//!
//! The corpus is only ever mutated by full replacement from a validated CSV
//! batch; there is no per-entry write path.

use std::path::Path;

use crate::models::Vocabulary;

use super::{JsonCollection, StoreError};

/// Persisted head-word corpus
pub struct VocabularyStore {
    col: JsonCollection<Vocabulary>,
}

impl VocabularyStore {
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self { col: JsonCollection::open(data_dir, "vocabulary").await? })
    }

    pub async fn all(&self) -> Result<Vec<Vocabulary>, StoreError> {
        let mut corpus = self.col.all().await?;
        corpus.sort_by(|a, b| a.maori.cmp(&b.maori));
        Ok(corpus)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Vocabulary>, StoreError> {
        self.col.get(id).await
    }

    /// Replace the whole corpus: delete all, then bulk-insert the new batch.
    /// This is the only supported mutation.
    pub async fn replace_all(&self, corpus: Vec<Vocabulary>) -> Result<usize, StoreError> {
        let batch = corpus.into_iter().map(|v| (v.id.clone(), v)).collect();
        self.col.replace_all(batch).await
    }

    pub async fn len(&self) -> usize {
        self.col.len().await
    }
}
