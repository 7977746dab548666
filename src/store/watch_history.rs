//! Watch-history store
//!
//! Rows are keyed on (user, video), one row per pairing. Reads return an
//! explicit `Option` so callers can tell "no row" apart from a store failure;
//! the upsert path depends on that distinction.

use std::path::Path;

use crate::models::{WatchHistory, WatchHistoryRequest};

use super::{JsonCollection, StoreError};

/// Persisted per-user playback progress
pub struct WatchHistoryStore {
    col: JsonCollection<WatchHistory>,
}

impl WatchHistoryStore {
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self { col: JsonCollection::open(data_dir, "watch_history").await? })
    }

    fn key(user_id: &str, video_id: &str) -> String {
        format!("{}:{}", user_id, video_id)
    }

    /// All rows for one user
    pub async fn get_by_user(&self, user_id: &str) -> Result<Vec<WatchHistory>, StoreError> {
        let mut rows = self.col.find(|row| row.user_id == user_id).await?;
        rows.sort_by(|a, b| b.last_watched.cmp(&a.last_watched));
        Ok(rows)
    }

    /// One user's row for one video; `None` means no row exists
    pub async fn get(&self, user_id: &str, video_id: &str) -> Result<Option<WatchHistory>, StoreError> {
        self.col.get(&Self::key(user_id, video_id)).await
    }

    /// Create or update the row for (user, video). The not-found signal from
    /// `get` decides which branch runs, so a store failure can never be
    /// mistaken for a missing row and create a duplicate.
    pub async fn upsert(
        &self,
        user_id: &str,
        request: WatchHistoryRequest,
    ) -> Result<WatchHistory, StoreError> {
        let key = Self::key(user_id, &request.video_id);

        let row = match self.col.get(&key).await? {
            Some(mut existing) => {
                request.apply_to(&mut existing);
                existing
            }
            None => request.into_watch_history(user_id),
        };

        self.col.put(&key, row.clone()).await?;
        Ok(row)
    }
}
