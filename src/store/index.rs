//! Vocabulary occurrence index store
//!
//! The central persisted artifact of the search subsystem. Only the reindex
//! coordinator mutates it (`insert_many` / `truncate`); search reads run
//! concurrently at all times.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::models::VocabularyIndex;

use super::{JsonCollection, StoreError};

/// Aggregate counts over the index collection
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub total_entries: usize,
    pub distinct_vocabulary: usize,
    pub distinct_videos: usize,
}

/// Persisted head-word occurrence index
pub struct IndexStore {
    col: JsonCollection<VocabularyIndex>,
}

impl IndexStore {
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self { col: JsonCollection::open(data_dir, "vocabulary_index").await? })
    }

    /// Unordered bulk insert; a partial failure reports the first error while
    /// the rest of the batch still lands
    pub async fn insert_many(&self, entries: Vec<VocabularyIndex>) -> Result<usize, StoreError> {
        let batch = entries.into_iter().map(|e| (e.id.clone(), e)).collect();
        self.col.insert_many(batch).await
    }

    /// Remove every entry; completes before any subsequent insert is visible
    pub async fn truncate(&self) -> Result<(), StoreError> {
        self.col.clear().await
    }

    /// Case-insensitive substring match on the head-word field
    pub async fn find_by_vocabulary(&self, query: &str) -> Result<Vec<VocabularyIndex>, StoreError> {
        let needle = query.to_lowercase();
        let mut entries = self.col.find(|e| e.vocabulary.to_lowercase().contains(&needle)).await?;
        sort_entries(&mut entries);
        Ok(entries)
    }

    /// Case-insensitive substring match on the English gloss
    pub async fn find_by_english(&self, query: &str) -> Result<Vec<VocabularyIndex>, StoreError> {
        let needle = query.to_lowercase();
        let mut entries = self.col.find(|e| e.english.to_lowercase().contains(&needle)).await?;
        sort_entries(&mut entries);
        Ok(entries)
    }

    /// All entries for one video
    pub async fn find_by_video(&self, video_id: &str) -> Result<Vec<VocabularyIndex>, StoreError> {
        let mut entries = self.col.find(|e| e.video_id == video_id).await?;
        sort_entries(&mut entries);
        Ok(entries)
    }

    pub async fn stats(&self) -> Result<IndexStats, StoreError> {
        let entries = self.col.all().await?;
        let distinct_vocabulary: HashSet<&str> = entries.iter().map(|e| e.vocabulary.as_str()).collect();
        let distinct_videos: HashSet<&str> = entries.iter().map(|e| e.video_id.as_str()).collect();

        Ok(IndexStats {
            total_entries: entries.len(),
            distinct_vocabulary: distinct_vocabulary.len(),
            distinct_videos: distinct_videos.len(),
        })
    }

    pub async fn len(&self) -> usize {
        self.col.len().await
    }
}

/// Deterministic ordering for query results
fn sort_entries(entries: &mut [VocabularyIndex]) {
    entries.sort_by(|a, b| {
        a.video_id
            .cmp(&b.video_id)
            .then_with(|| a.line_number.cmp(&b.line_number))
            .then_with(|| a.vocabulary.cmp(&b.vocabulary))
    });
}
