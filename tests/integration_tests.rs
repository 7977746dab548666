//! End-to-end scenarios: CSV ingest, full reindex, search, and exposure

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::fs;

use kotahi_server::models::{Video, VideoRequest, WatchHistoryRequest};
use kotahi_server::vocabulary::parse_vocabulary_csv;
use kotahi_server::{
    IndexStore, ReindexCoordinator, SearchService, VideoStore, VocabularyStore, WatchHistoryStore,
};

struct Fixture {
    _dir: TempDir,
    vtt_dir: std::path::PathBuf,
    vocabulary: Arc<VocabularyStore>,
    videos: Arc<VideoStore>,
    index: Arc<IndexStore>,
    watch_history: Arc<WatchHistoryStore>,
    coordinator: ReindexCoordinator,
    search: SearchService,
}

impl Fixture {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        let vtt_dir = dir.path().join("vtt");
        fs::create_dir_all(&vtt_dir).await.unwrap();

        let vocabulary = Arc::new(VocabularyStore::open(&data_dir).await.unwrap());
        let videos = Arc::new(VideoStore::open(&data_dir).await.unwrap());
        let index = Arc::new(IndexStore::open(&data_dir).await.unwrap());
        let watch_history = Arc::new(WatchHistoryStore::open(&data_dir).await.unwrap());

        let coordinator = ReindexCoordinator::new(
            vocabulary.clone(),
            videos.clone(),
            index.clone(),
            vtt_dir.clone(),
            2,
            Duration::from_millis(200),
        );
        let search =
            SearchService::new(index.clone(), videos.clone(), watch_history.clone());

        Self { _dir: dir, vtt_dir, vocabulary, videos, index, watch_history, coordinator, search }
    }

    async fn add_video(&self, id: &str, subtitle: &str) -> Video {
        let mut video = VideoRequest {
            title: format!("Video {}", id),
            description: String::new(),
            thumbnail: format!("/thumbs/{}.jpg", id),
            video: format!("/media/{}.mp4", id),
            subtitle: subtitle.to_string(),
            duration: "10:00".to_string(),
        }
        .into_video();
        video.id = id.to_string();
        self.videos.create(video).await.unwrap()
    }

    async fn write_vtt(&self, name: &str, body: &str) {
        fs::write(self.vtt_dir.join(name), body).await.unwrap();
    }

    async fn load_corpus(&self, csv: &str) {
        let corpus = parse_vocabulary_csv(csv).unwrap();
        self.vocabulary.replace_all(corpus).await.unwrap();
    }
}

fn vtt_path(dir: &Path, name: &str) -> std::path::PathBuf {
    dir.join(name)
}

#[tokio::test]
async fn test_reindex_produces_exact_entry() {
    let fx = Fixture::new().await;
    fx.load_corpus("aroha,love,n.\n").await;
    fx.add_video("v1", "v1.vtt").await;
    fx.write_vtt("v1.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:03.500\nKo te aroha.\n").await;

    let summary = fx.coordinator.reindex().await.unwrap();
    assert_eq!(summary.processed_videos, 1);
    assert_eq!(summary.total_indexed, 1);

    let entries = fx.index.find_by_video("v1").await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.video_id, "v1");
    assert_eq!(entry.vocabulary, "aroha");
    assert_eq!(entry.start_time, 1.0);
    assert_eq!(entry.end_time, 3.5);
    assert_eq!(entry.transcript, "Ko te aroha.");
    assert_eq!(entry.line_number, 1);
}

#[tokio::test]
async fn test_unauthenticated_search_has_no_exposure_fields() {
    let fx = Fixture::new().await;
    fx.load_corpus("aroha,love,n.\n").await;
    fx.add_video("v1", "v1.vtt").await;
    fx.write_vtt("v1.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:03.500\nKo te aroha.\n").await;
    fx.coordinator.reindex().await.unwrap();

    let outcome = fx.search.search("aroha", None).await.unwrap();

    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.results[0].vocabulary, "aroha");
    assert_eq!(outcome.results[0].total_count, 1);
    assert!(outcome.results[0].exposure_count.is_none());
    assert!(outcome.total_exposures.is_none());
    assert!(outcome.recent_exposures.is_none());

    // The serialized envelope must omit the exposure fields entirely
    let body = serde_json::to_value(&outcome).unwrap();
    assert!(body.get("total_exposures").is_none());
    assert!(body.get("recent_exposures").is_none());
}

#[tokio::test]
async fn test_authenticated_search_counts_exposure_by_progress() {
    let fx = Fixture::new().await;
    fx.load_corpus("aroha,love,n.\n").await;
    fx.add_video("v1", "v1.vtt").await;
    fx.write_vtt("v1.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:03.500\nKo te aroha.\n").await;
    fx.coordinator.reindex().await.unwrap();

    // progress 0.5 of 4 s reaches 2 s, past the occurrence at 1 s
    fx.watch_history
        .upsert(
            "u1",
            WatchHistoryRequest {
                video_id: "v1".to_string(),
                progress: 0.5,
                current_time: 2.0,
                duration: 4.0,
                completed: false,
            },
        )
        .await
        .unwrap();

    let outcome = fx.search.search("aroha", Some("u1")).await.unwrap();
    assert_eq!(outcome.results[0].exposure_count, Some(1));
    assert_eq!(outcome.total_exposures, Some(1));
    assert_eq!(outcome.recent_exposures, Some(1));

    // progress 0.1 of 4 s reaches only 0.4 s, short of the occurrence
    fx.watch_history
        .upsert(
            "u2",
            WatchHistoryRequest {
                video_id: "v1".to_string(),
                progress: 0.1,
                current_time: 0.4,
                duration: 4.0,
                completed: false,
            },
        )
        .await
        .unwrap();

    let outcome = fx.search.search("aroha", Some("u2")).await.unwrap();
    assert_eq!(outcome.results[0].exposure_count, Some(0));
    assert_eq!(outcome.total_exposures, Some(0));
}

#[tokio::test]
async fn test_short_query_is_rejected() {
    let fx = Fixture::new().await;
    let err = fx.search.search("x", None).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_REQUEST");
    assert!(err.to_string().contains("at least 2 characters"));
}

#[tokio::test]
async fn test_csv_with_duplicate_rejects_without_mutation() {
    let fx = Fixture::new().await;
    fx.load_corpus("kai,food,n.\n").await;

    let bad_csv = "aroha,love,n.\naroha,affection,n.\n";
    assert!(parse_vocabulary_csv(bad_csv).is_err());

    // The previously loaded corpus is untouched
    let corpus = fx.vocabulary.all().await.unwrap();
    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus[0].maori, "kai");
}

#[tokio::test]
async fn test_missing_vtt_is_skipped_not_fatal() {
    let fx = Fixture::new().await;
    fx.load_corpus("aroha,love,n.\n").await;
    fx.add_video("v1", "present.vtt").await;
    fx.add_video("v2", "missing.vtt").await;
    fx.write_vtt("present.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nKia ora.\n").await;

    assert!(!vtt_path(&fx.vtt_dir, "missing.vtt").exists());

    let summary = fx.coordinator.reindex().await.unwrap();
    assert_eq!(summary.processed_videos, 1);
    assert_eq!(summary.total_videos, 2);
    assert_eq!(fx.index.find_by_video("v2").await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_index_entries_always_satisfy_matcher_invariant() {
    let fx = Fixture::new().await;
    fx.load_corpus("aroha,love,n.\nte reo,the language,n. phrase\nkai,food,n.\n").await;
    fx.add_video("v1", "v1.vtt").await;
    fx.write_vtt(
        "v1.vtt",
        "WEBVTT\n\n\
         00:00:01.000 --> 00:00:03.000\nKo te aroha o te reo Māori.\n\n\
         00:00:04.000 --> 00:00:06.000\nHe kai reka tēnei.\n\n\
         00:00:07.000 --> 00:00:09.000\nKāore he kupu i konei.\n",
    )
    .await;

    fx.coordinator.reindex().await.unwrap();

    let entries = fx.index.find_by_video("v1").await.unwrap();
    assert!(!entries.is_empty());
    for entry in &entries {
        assert!(
            kotahi_server::vocabulary::headword_in_text(&entry.vocabulary, &entry.transcript),
            "entry for '{}' fails the matcher invariant against '{}'",
            entry.vocabulary,
            entry.transcript
        );
        assert!(entry.start_time >= 0.0 && entry.start_time <= entry.end_time);
    }
}

#[tokio::test]
async fn test_grouping_spans_videos_and_counts_match() {
    let fx = Fixture::new().await;
    fx.load_corpus("aroha,love,n.\n").await;
    fx.add_video("v1", "v1.vtt").await;
    fx.add_video("v2", "v2.vtt").await;
    fx.write_vtt(
        "v1.vtt",
        "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nKo te aroha.\n\n00:00:05.000 --> 00:00:06.000\nAroha mai.\n",
    )
    .await;
    fx.write_vtt("v2.vtt", "WEBVTT\n\n00:00:09.000 --> 00:00:10.000\nHe aroha nui.\n").await;

    fx.coordinator.reindex().await.unwrap();
    let outcome = fx.search.search("aroha", None).await.unwrap();

    assert_eq!(outcome.total, 1);
    let group = &outcome.results[0];
    assert_eq!(group.total_count, 3);
    assert_eq!(group.total_count, group.occurrences.len());
    assert!(group.occurrences.iter().all(|o| o.entry.vocabulary == group.vocabulary));
    // Every occurrence carries its video snapshot
    assert!(group.occurrences.iter().all(|o| o.video.is_some()));
}

#[tokio::test]
async fn test_reindexed_videos_are_subset_of_catalogue() {
    let fx = Fixture::new().await;
    fx.load_corpus("aroha,love,n.\n").await;
    fx.add_video("v1", "v1.vtt").await;
    fx.write_vtt("v1.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nAroha.\n").await;
    // A stale VTT file with no catalogue entry must not surface
    fx.write_vtt("orphan.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nAroha.\n").await;

    fx.coordinator.reindex().await.unwrap();

    let stats = fx.index.stats().await.unwrap();
    assert_eq!(stats.distinct_videos, 1);
    assert_eq!(fx.index.find_by_video("orphan").await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_csv_upload_with_integrated_rebuild() {
    let fx = Fixture::new().await;
    fx.add_video("v1", "v1.vtt").await;
    fx.write_vtt("v1.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHe kai reka.\n").await;

    let corpus = parse_vocabulary_csv("maori,english,description\nkai,food,n.\n").unwrap();
    let summary = fx.coordinator.replace_corpus_and_reindex(corpus).await.unwrap();

    assert_eq!(summary.total_vocabulary, 1);
    assert_eq!(summary.total_indexed, 1);
    assert_eq!(fx.vocabulary.len().await, 1);

    let outcome = fx.search.search("kai", None).await.unwrap();
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.results[0].english, "food");
}

#[tokio::test]
async fn test_corpus_replacement_drops_old_index_on_rebuild() {
    let fx = Fixture::new().await;
    fx.add_video("v1", "v1.vtt").await;
    fx.write_vtt(
        "v1.vtt",
        "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nKo te aroha me te kai.\n",
    )
    .await;

    let first = parse_vocabulary_csv("aroha,love,n.\n").unwrap();
    fx.coordinator.replace_corpus_and_reindex(first).await.unwrap();
    assert_eq!(fx.search.search("aroha", None).await.unwrap().total, 1);

    let second = parse_vocabulary_csv("kai,food,n.\n").unwrap();
    fx.coordinator.replace_corpus_and_reindex(second).await.unwrap();

    // Old head-word is gone from the index wholesale, the new one is present
    assert_eq!(fx.search.search("aroha", None).await.unwrap().total, 0);
    assert_eq!(fx.search.search("kai", None).await.unwrap().total, 1);
}

#[tokio::test]
async fn test_search_by_english_gloss() {
    let fx = Fixture::new().await;
    fx.load_corpus("aroha,love,n.\nkai,food,n.\n").await;
    fx.add_video("v1", "v1.vtt").await;
    fx.write_vtt(
        "v1.vtt",
        "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nKo te aroha me te kai.\n",
    )
    .await;
    fx.coordinator.reindex().await.unwrap();

    let outcome = fx.search.search_english("food", None).await.unwrap();
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.results[0].vocabulary, "kai");
}

#[tokio::test]
async fn test_multi_word_headword_across_reindex_and_search() {
    let fx = Fixture::new().await;
    fx.load_corpus("te ao,the world,n. phrase\n").await;
    fx.add_video("v1", "v1.vtt").await;
    fx.write_vtt(
        "v1.vtt",
        "WEBVTT\n\n\
         00:00:01.000 --> 00:00:02.000\nKi te ao mārama.\n\n\
         00:00:03.000 --> 00:00:04.000\nate aorta anatomy\n",
    )
    .await;

    let summary = fx.coordinator.reindex().await.unwrap();
    assert_eq!(summary.total_indexed, 1);

    let outcome = fx.search.search("te ao", None).await.unwrap();
    assert_eq!(outcome.results[0].total_count, 1);
    assert_eq!(outcome.results[0].occurrences[0].entry.line_number, 1);
}
