//! Full vocabulary reindex coordination
//!
//! Orchestrates a total rebuild of the occurrence index from the current
//! corpus and video catalogue. Writes to the index collection happen only
//! here, under a process-wide exclusive lock; a second concurrent rebuild
//! fails fast instead of queueing behind the first.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::models::{Video, Vocabulary};
use crate::store::{IndexStore, VideoStore, VocabularyStore};
use crate::vocabulary::VocabularyIndexer;

/// Result of one completed rebuild
#[derive(Debug, Clone, Serialize)]
pub struct ReindexSummary {
    /// Videos whose transcript pass completed and whose entries were stored
    pub processed_videos: usize,
    /// Index entries inserted across the whole rebuild
    pub total_indexed: usize,
    /// Videos in the catalogue at rebuild time
    pub total_videos: usize,
    /// Head-words in the corpus at rebuild time
    pub total_vocabulary: usize,
}

/// Outcome of one video's indexing pass
struct VideoOutcome {
    indexed: usize,
    processed: bool,
}

/// Coordinates total rebuilds of the vocabulary occurrence index
pub struct ReindexCoordinator {
    vocabulary: Arc<VocabularyStore>,
    videos: Arc<VideoStore>,
    index: Arc<IndexStore>,
    vtt_root: PathBuf,
    workers: usize,
    lock_wait: Duration,
    rebuild_lock: Mutex<()>,
}

impl ReindexCoordinator {
    pub fn new(
        vocabulary: Arc<VocabularyStore>,
        videos: Arc<VideoStore>,
        index: Arc<IndexStore>,
        vtt_root: PathBuf,
        workers: usize,
        lock_wait: Duration,
    ) -> Self {
        Self {
            vocabulary,
            videos,
            index,
            vtt_root,
            workers: workers.max(1),
            lock_wait,
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Rebuild the index from the current corpus and catalogue
    pub async fn reindex(&self) -> Result<ReindexSummary, ApiError> {
        let _guard = self.acquire_lock().await?;
        self.rebuild_locked().await
    }

    /// CSV path: replace the whole corpus, then rebuild. Corpus replacement
    /// and rebuild run under one acquisition of the lock.
    pub async fn replace_corpus_and_reindex(
        &self,
        corpus: Vec<Vocabulary>,
    ) -> Result<ReindexSummary, ApiError> {
        let _guard = self.acquire_lock().await?;
        let replaced = self.vocabulary.replace_all(corpus).await?;
        info!("📚 Vocabulary corpus replaced with {} head-words", replaced);
        self.rebuild_locked().await
    }

    /// Acquire the named rebuild lock, waiting at most `lock_wait` so two
    /// admins triggering a rebuild cannot deadlock the second caller
    async fn acquire_lock(&self) -> Result<MutexGuard<'_, ()>, ApiError> {
        tokio::time::timeout(self.lock_wait, self.rebuild_lock.lock())
            .await
            .map_err(|_| ApiError::ReindexInProgress)
    }

    /// The rebuild body; callers hold the rebuild lock.
    ///
    /// Truncation completes before any insert; per-video failures are logged
    /// and skipped, never fatal to the batch. A crash mid-way leaves a
    /// partially rebuilt index whose recovery is re-invocation.
    async fn rebuild_locked(&self) -> Result<ReindexSummary, ApiError> {
        let corpus = self.vocabulary.all().await?;
        let videos = self.videos.all().await?;
        let total_videos = videos.len();

        info!(
            "🔁 Reindexing {} videos against {} head-words",
            total_videos,
            corpus.len()
        );

        self.index.truncate().await?;

        let indexer = Arc::new(VocabularyIndexer::new(&corpus, self.vtt_root.clone()));

        let with_subtitles: Vec<Video> =
            videos.into_iter().filter(|v| !v.subtitle.trim().is_empty()).collect();

        let outcomes: Vec<VideoOutcome> = stream::iter(with_subtitles)
            .map(|video| {
                let indexer = Arc::clone(&indexer);
                let index = Arc::clone(&self.index);
                async move { index_one_video(indexer, index, video).await }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let summary = ReindexSummary {
            processed_videos: outcomes.iter().filter(|o| o.processed).count(),
            total_indexed: outcomes.iter().map(|o| o.indexed).sum(),
            total_videos,
            total_vocabulary: corpus.len(),
        };

        info!(
            "✅ Reindex complete: {} entries from {}/{} videos",
            summary.total_indexed, summary.processed_videos, summary.total_videos
        );

        Ok(summary)
    }
}

/// Index one video and store its entries. Every failure mode is isolated to
/// the video: absent file, unparseable subtitle, and store refusal all skip
/// it and leave the batch running.
async fn index_one_video(
    indexer: Arc<VocabularyIndexer>,
    index: Arc<IndexStore>,
    video: Video,
) -> VideoOutcome {
    let skipped = VideoOutcome { indexed: 0, processed: false };

    let Some(path) = indexer.resolve_subtitle_path(&video.subtitle) else {
        return skipped;
    };
    // A video only counts as processed when its VTT file actually exists
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        warn!("VTT file not found for video {}: {}", video.id, path.display());
        return skipped;
    }

    let entries = match indexer.index_video(&video.id, &video.subtitle).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("failed to index video {}: {}", video.id, e);
            return skipped;
        }
    };

    if entries.is_empty() {
        return VideoOutcome { indexed: 0, processed: true };
    }

    let count = entries.len();
    match index.insert_many(entries).await {
        Ok(_) => VideoOutcome { indexed: count, processed: true },
        Err(e) => {
            warn!("failed to store index entries for video {}: {}", video.id, e);
            skipped
        }
    }
}
