//! Search façade
//!
//! Public entry point for vocabulary search: fans out to the index store,
//! groups occurrences by head-word, joins video snapshots through a
//! per-request cache, and annotates exposure when the caller is known.
//! Stateless per request.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::exposure::annotate_exposure;
use crate::models::{Video, VocabularyIndex};
use crate::store::{IndexStore, VideoStore, WatchHistoryStore};
use crate::vocabulary::headword_in_text;

/// Minimum length of a trimmed query
const MIN_QUERY_LEN: usize = 2;

/// One occurrence in a response: the index entry plus its video snapshot,
/// joined at read time
#[derive(Debug, Clone, Serialize)]
pub struct Occurrence {
    #[serde(flatten)]
    pub entry: VocabularyIndex,
    pub video: Option<Video>,
}

/// All occurrences of one head-word across the catalogue
#[derive(Debug, Clone, Serialize)]
pub struct VocabularySearchResult {
    pub vocabulary: String,
    pub english: String,
    pub description: String,
    pub occurrences: Vec<Occurrence>,
    pub total_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_count: Option<usize>,
}

/// A completed search, ready for the response envelope
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub results: Vec<VocabularySearchResult>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_exposures: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_exposures: Option<usize>,
}

/// Stateless search service over the index, catalogue, and watch history
pub struct SearchService {
    index: Arc<IndexStore>,
    videos: Arc<VideoStore>,
    watch_history: Arc<WatchHistoryStore>,
}

impl SearchService {
    pub fn new(
        index: Arc<IndexStore>,
        videos: Arc<VideoStore>,
        watch_history: Arc<WatchHistoryStore>,
    ) -> Self {
        Self { index, videos, watch_history }
    }

    /// Search by head-word and English gloss concurrently, merge, group, and
    /// annotate exposure when a user identity is supplied.
    pub async fn search(&self, query: &str, user_id: Option<&str>) -> Result<SearchOutcome, ApiError> {
        let query = validate_query(query)?;

        let (by_vocabulary, by_english) = tokio::join!(
            self.index.find_by_vocabulary(query),
            self.index.find_by_english(query),
        );

        let mut entries = by_vocabulary?;
        let mut seen: HashSet<String> = entries.iter().map(|e| e.id.clone()).collect();
        for entry in by_english? {
            if seen.insert(entry.id.clone()) {
                entries.push(entry);
            }
        }

        self.build_outcome(query, entries, user_id).await
    }

    /// The English-gloss variant: same shape, sourced from the English lookup
    pub async fn search_english(
        &self,
        query: &str,
        user_id: Option<&str>,
    ) -> Result<SearchOutcome, ApiError> {
        let query = validate_query(query)?;
        let entries = self.index.find_by_english(query).await?;
        self.build_outcome(query, entries, user_id).await
    }

    async fn build_outcome(
        &self,
        query: &str,
        entries: Vec<VocabularyIndex>,
        user_id: Option<&str>,
    ) -> Result<SearchOutcome, ApiError> {
        let mut results = self.group_entries(entries).await;

        let (mut total_exposures, mut recent_exposures) = (None, None);
        if let Some(user_id) = user_id {
            // Exposure must never fail the search; degrade without annotations
            match self.watch_history.get_by_user(user_id).await {
                Ok(rows) => {
                    let totals = annotate_exposure(&rows, &mut results, Utc::now());
                    total_exposures = Some(totals.total_exposures);
                    recent_exposures = Some(totals.recent_exposures);
                }
                Err(e) => {
                    warn!("watch history unavailable for user {}, returning results without exposure: {}", user_id, e);
                }
            }
        }

        Ok(SearchOutcome {
            query: query.to_string(),
            total: results.len(),
            results,
            total_exposures,
            recent_exposures,
        })
    }

    /// Group entries by head-word, preserving first-seen order, enriching
    /// each occurrence with a cached video snapshot. Entries that violate the
    /// matcher invariant or whose video is gone are dropped, not returned.
    async fn group_entries(&self, entries: Vec<VocabularyIndex>) -> Vec<VocabularySearchResult> {
        let mut results: Vec<VocabularySearchResult> = Vec::new();
        let mut group_of: HashMap<String, usize> = HashMap::new();
        // Per-request cache so each video is fetched at most once
        let mut video_cache: HashMap<String, Option<Video>> = HashMap::new();

        for entry in entries {
            if !headword_in_text(&entry.vocabulary, &entry.transcript) {
                warn!(
                    "dropping corrupt index entry {}: '{}' does not occur in its transcript",
                    entry.id, entry.vocabulary
                );
                continue;
            }

            let video = match video_cache.get(&entry.video_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = match self.videos.get(&entry.video_id).await {
                        Ok(video) => video,
                        Err(e) => {
                            warn!("video lookup failed for {}: {}", entry.video_id, e);
                            None
                        }
                    };
                    video_cache.insert(entry.video_id.clone(), fetched.clone());
                    fetched
                }
            };
            let Some(video) = video else {
                debug!("dropping occurrence for vanished video {}", entry.video_id);
                continue;
            };

            let occurrence = Occurrence { entry, video: Some(video) };
            match group_of.get(&occurrence.entry.vocabulary) {
                Some(&i) => {
                    results[i].occurrences.push(occurrence);
                    results[i].total_count += 1;
                }
                None => {
                    group_of.insert(occurrence.entry.vocabulary.clone(), results.len());
                    results.push(VocabularySearchResult {
                        vocabulary: occurrence.entry.vocabulary.clone(),
                        english: occurrence.entry.english.clone(),
                        description: occurrence.entry.description.clone(),
                        occurrences: vec![occurrence],
                        total_count: 1,
                        exposure_count: None,
                    });
                }
            }
        }

        results
    }
}

/// Trimmed queries shorter than two characters are rejected
fn validate_query(query: &str) -> Result<&str, ApiError> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Err(ApiError::InvalidRequest(
            "query must be at least 2 characters".to_string(),
        ));
    }
    Ok(query)
}
