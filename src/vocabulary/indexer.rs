//! Per-video vocabulary indexing
//!
//! Resolves a video's subtitle pointer to a file in the VTT store, parses it,
//! and runs every head-word matcher over every transcript line.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, warn};

use crate::models::{Vocabulary, VocabularyIndex};
use crate::vtt::{parse_vtt, TranscriptLine};

use super::matcher::HeadwordMatcher;

/// Upload-URL prefix a subtitle pointer may carry
const VTT_UPLOAD_PREFIX: &str = "/api/v1/uploads/vtt/";

/// Scans video transcripts for head-word occurrences.
///
/// Matchers are compiled once per corpus; head-words that are empty after
/// trimming are dropped at construction.
pub struct VocabularyIndexer {
    corpus: Vec<(Vocabulary, HeadwordMatcher)>,
    vtt_root: PathBuf,
}

impl VocabularyIndexer {
    /// Compile matchers for the whole corpus
    pub fn new(corpus: &[Vocabulary], vtt_root: PathBuf) -> Self {
        let compiled: Vec<(Vocabulary, HeadwordMatcher)> = corpus
            .iter()
            .filter_map(|vocab| match HeadwordMatcher::new(&vocab.maori) {
                Some(matcher) => Some((vocab.clone(), matcher)),
                None => {
                    warn!("skipping unmatchable head-word with empty Māori form (id {})", vocab.id);
                    None
                }
            })
            .collect();

        Self { corpus: compiled, vtt_root }
    }

    /// Number of head-words with a usable matcher
    pub fn corpus_len(&self) -> usize {
        self.corpus.len()
    }

    /// Resolve a subtitle pointer to a path in the VTT store.
    ///
    /// Upload URLs have their prefix stripped, slash paths reduce to their
    /// basename, anything else is taken as a bare filename. Returns `None`
    /// for pointers that are empty or resolve to no filename.
    pub fn resolve_subtitle_path(&self, pointer: &str) -> Option<PathBuf> {
        let pointer = pointer.trim();
        if pointer.is_empty() {
            return None;
        }

        let filename = if let Some(rest) = pointer.strip_prefix(VTT_UPLOAD_PREFIX) {
            rest
        } else if pointer.contains('/') {
            Path::new(pointer).file_name()?.to_str()?
        } else {
            pointer
        };
        if filename.is_empty() {
            return None;
        }

        Some(self.vtt_root.join(filename))
    }

    /// Index one video: resolve, read, parse, and match.
    ///
    /// A missing or unreadable subtitle file yields zero entries rather than
    /// an error; a subtitle that fails to parse is an error for the caller to
    /// isolate.
    pub async fn index_video(&self, video_id: &str, subtitle_pointer: &str) -> Result<Vec<VocabularyIndex>> {
        let Some(path) = self.resolve_subtitle_path(subtitle_pointer) else {
            return Ok(Vec::new());
        };

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("VTT file unavailable for video {}: {} ({})", video_id, path.display(), e);
                return Ok(Vec::new());
            }
        };

        let lines = parse_vtt(&content)?;
        Ok(self.index_lines(video_id, &lines))
    }

    /// Match every head-word against every transcript line.
    ///
    /// A line may contribute entries for several head-words, and one
    /// head-word may recur across lines; each pairing is a distinct entry.
    /// Lines whose timing violates `0 ≤ start ≤ end` produce nothing.
    pub fn index_lines(&self, video_id: &str, lines: &[TranscriptLine]) -> Vec<VocabularyIndex> {
        let mut entries = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            if line.start_time < 0.0 || line.start_time > line.end_time {
                debug!(
                    "dropping line {} of video {}: invalid timing {}..{}",
                    i + 1,
                    video_id,
                    line.start_time,
                    line.end_time
                );
                continue;
            }

            for (vocab, matcher) in &self.corpus {
                if matcher.is_match(&line.text) {
                    let now = Utc::now();
                    entries.push(VocabularyIndex {
                        id: uuid::Uuid::new_v4().to_string(),
                        video_id: video_id.to_string(),
                        vocabulary: vocab.maori.clone(),
                        english: vocab.english.clone(),
                        description: vocab.description.clone(),
                        start_time: line.start_time,
                        end_time: line.end_time,
                        transcript: line.text.clone(),
                        line_number: i + 1,
                        created_at: now,
                        updated_at: now,
                    });
                }
            }
        }

        entries
    }
}
