//! Persisted document types and their request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A video in the catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    /// Source URL or path of the video itself
    pub video: String,
    /// Subtitle pointer: an upload URL, a slash path, or a bare filename
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub duration: String,
}

/// Request payload for creating a video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    pub video: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub duration: String,
}

impl VideoRequest {
    /// Convert into a catalogue document with a fresh id
    pub fn into_video(self) -> Video {
        Video {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title,
            description: self.description,
            thumbnail: self.thumbnail,
            video: self.video,
            subtitle: self.subtitle,
            duration: self.duration,
        }
    }
}

/// A head-word in the vocabulary corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    pub id: String,
    /// The Māori word or phrase; unique within the corpus
    pub maori: String,
    pub english: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vocabulary {
    pub fn new(maori: String, english: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            maori,
            english,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One occurrence of a head-word at a specific transcript line of a video.
///
/// The entry stays lean on disk: the video snapshot is joined at read time
/// rather than denormalised into the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyIndex {
    pub id: String,
    pub video_id: String,
    /// The matched head-word, denormalised for direct substring search
    pub vocabulary: String,
    pub english: String,
    pub description: String,
    /// Start of the transcript line, fractional seconds
    pub start_time: f64,
    /// End of the transcript line, fractional seconds
    pub end_time: f64,
    /// The full transcript line the head-word occurred in
    pub transcript: String,
    /// 1-based line number within the transcript
    pub line_number: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's watch-history row for one video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchHistory {
    pub id: String,
    pub user_id: String,
    pub video_id: String,
    /// Fraction of the video reached, in [0, 1]
    pub progress: f64,
    /// Current playback position in seconds
    pub current_time: f64,
    /// Total video duration in seconds
    pub duration: f64,
    pub completed: bool,
    pub last_watched: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for upserting watch history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchHistoryRequest {
    pub video_id: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub current_time: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub completed: bool,
}

/// Progress at or above this fraction marks a video as completed
const COMPLETION_THRESHOLD: f64 = 0.9;

impl WatchHistoryRequest {
    /// Convert into a fresh watch-history row for the given user
    pub fn into_watch_history(self, user_id: &str) -> WatchHistory {
        let now = Utc::now();
        let completed = self.completed || self.progress >= COMPLETION_THRESHOLD;
        WatchHistory {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            video_id: self.video_id,
            progress: self.progress,
            current_time: self.current_time,
            duration: self.duration,
            completed,
            last_watched: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply onto an existing row, refreshing timestamps
    pub fn apply_to(self, row: &mut WatchHistory) {
        let now = Utc::now();
        row.progress = self.progress;
        row.current_time = self.current_time;
        row.duration = self.duration;
        row.completed = self.completed || self.progress >= COMPLETION_THRESHOLD;
        row.last_watched = now;
        row.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_request_generates_id() {
        let video = VideoRequest {
            title: "Kupu o te wiki".to_string(),
            description: String::new(),
            thumbnail: String::new(),
            video: "/media/kupu.mp4".to_string(),
            subtitle: "kupu.vtt".to_string(),
            duration: "04:12".to_string(),
        }
        .into_video();

        assert!(!video.id.is_empty());
        assert_eq!(video.subtitle, "kupu.vtt");
    }

    #[test]
    fn test_watch_history_completion_threshold() {
        let req = WatchHistoryRequest {
            video_id: "v1".to_string(),
            progress: 0.95,
            current_time: 570.0,
            duration: 600.0,
            completed: false,
        };
        let row = req.into_watch_history("u1");
        assert!(row.completed);

        let req = WatchHistoryRequest {
            video_id: "v1".to_string(),
            progress: 0.5,
            current_time: 300.0,
            duration: 600.0,
            completed: false,
        };
        let row = req.into_watch_history("u1");
        assert!(!row.completed);
    }

    #[test]
    fn test_watch_history_apply_refreshes_last_watched() {
        let req = WatchHistoryRequest {
            video_id: "v1".to_string(),
            progress: 0.2,
            current_time: 120.0,
            duration: 600.0,
            completed: false,
        };
        let mut row = req.clone().into_watch_history("u1");
        let before = row.last_watched;

        let update = WatchHistoryRequest { progress: 0.4, current_time: 240.0, ..req };
        update.apply_to(&mut row);

        assert_eq!(row.progress, 0.4);
        assert!(row.last_watched >= before);
    }
}
