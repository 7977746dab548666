//! API response envelopes

use serde::Serialize;

use crate::models::{Video, VocabularyIndex};
use crate::reindex::ReindexSummary;
use crate::search::SearchOutcome;
use crate::store::IndexStats;

/// Envelope for both search variants
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub outcome: SearchOutcome,
}

/// Envelope for per-video vocabulary listings
#[derive(Debug, Serialize)]
pub struct VideoVocabularyResponse {
    pub message: &'static str,
    pub video_id: String,
    pub video: Option<Video>,
    pub vocabulary: Vec<VocabularyIndex>,
    pub total: usize,
}

/// Envelope for index statistics
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub message: &'static str,
    pub stats: IndexStats,
}

/// Envelope for an explicit reindex call
#[derive(Debug, Serialize)]
pub struct ReindexResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub summary: ReindexSummary,
}

/// Envelope for a CSV batch upload with integrated rebuild
#[derive(Debug, Serialize)]
pub struct BatchUploadResponse {
    pub message: String,
    pub created: usize,
    pub reindexing: ReindexSummary,
}
