/// Kotahi Server
///
/// Backend for an interactive Māori-language video learning platform. The
/// core is the vocabulary indexing and exposure-aware search subsystem:
/// timed transcripts are scanned against a head-word corpus to build a
/// searchable occurrence index, and searches join that index with the video
/// catalogue and the caller's watch history.

pub mod api;
pub mod config;
pub mod error;
pub mod exposure;
pub mod models;
pub mod reindex;
pub mod search;
pub mod store;
pub mod vocabulary;
pub mod vtt;

// Re-export main types for easy access
pub use crate::api::{build_router, start_http_server, AppState, TokenVerifier};
pub use crate::config::Config;
pub use crate::error::ApiError;
pub use crate::exposure::{annotate_exposure, ExposureTotals};
pub use crate::models::{Video, Vocabulary, VocabularyIndex, WatchHistory};
pub use crate::reindex::{ReindexCoordinator, ReindexSummary};
pub use crate::search::{SearchOutcome, SearchService, VocabularySearchResult};
pub use crate::store::{IndexStats, IndexStore, VideoStore, VocabularyStore, WatchHistoryStore};
pub use crate::vocabulary::{HeadwordMatcher, VocabularyIndexer};
pub use crate::vtt::{parse_vtt, TranscriptLine};
