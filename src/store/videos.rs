//! Video catalogue store

use std::path::Path;

use crate::models::Video;

use super::{JsonCollection, StoreError};

/// Persisted video catalogue
pub struct VideoStore {
    col: JsonCollection<Video>,
}

impl VideoStore {
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self { col: JsonCollection::open(data_dir, "videos").await? })
    }

    pub async fn all(&self) -> Result<Vec<Video>, StoreError> {
        let mut videos = self.col.all().await?;
        videos.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        Ok(videos)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Video>, StoreError> {
        self.col.get(id).await
    }

    pub async fn create(&self, video: Video) -> Result<Video, StoreError> {
        self.col.put(&video.id, video.clone()).await?;
        Ok(video)
    }

    pub async fn delete(&self, id: &str) -> Result<Option<Video>, StoreError> {
        self.col.remove(id).await
    }

    pub async fn len(&self) -> usize {
        self.col.len().await
    }
}
