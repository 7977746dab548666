//! HTTP server implementation for the API

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::Config;
use crate::reindex::ReindexCoordinator;
use crate::search::SearchService;
use crate::store::{IndexStore, VideoStore, VocabularyStore, WatchHistoryStore};

use super::auth::TokenVerifier;
use super::handlers::{self, MAX_CSV_BYTES};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub videos: Arc<VideoStore>,
    pub vocabulary: Arc<VocabularyStore>,
    pub index: Arc<IndexStore>,
    pub watch_history: Arc<WatchHistoryStore>,
    pub search: Arc<SearchService>,
    pub reindex: Arc<ReindexCoordinator>,
    pub auth: Arc<TokenVerifier>,
}

impl AppState {
    /// Open every collection and wire the services together
    pub async fn init(config: Config) -> Result<Self> {
        let data_dir = config.storage.data_dir.clone();

        let videos = Arc::new(VideoStore::open(&data_dir).await?);
        let vocabulary = Arc::new(VocabularyStore::open(&data_dir).await?);
        let index = Arc::new(IndexStore::open(&data_dir).await?);
        let watch_history = Arc::new(WatchHistoryStore::open(&data_dir).await?);

        let search = Arc::new(SearchService::new(
            Arc::clone(&index),
            Arc::clone(&videos),
            Arc::clone(&watch_history),
        ));
        let reindex = Arc::new(ReindexCoordinator::new(
            Arc::clone(&vocabulary),
            Arc::clone(&videos),
            Arc::clone(&index),
            config.storage.vtt_dir.clone(),
            config.reindex.workers,
            Duration::from_millis(config.reindex.lock_wait_ms),
        ));
        let auth = Arc::new(TokenVerifier::new(&config.auth.token_secret));

        Ok(Self {
            config: Arc::new(config),
            videos,
            vocabulary,
            index,
            watch_history,
            search,
            reindex,
            auth,
        })
    }
}

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/health", get(handlers::health))
        // Vocabulary search and index
        .route("/api/v1/vocabulary/search", get(handlers::search_vocabulary))
        .route("/api/v1/vocabulary/search/english", get(handlers::search_by_english))
        .route("/api/v1/vocabulary/video", get(handlers::video_vocabulary))
        .route("/api/v1/vocabulary/stats", get(handlers::vocabulary_stats))
        .route("/api/v1/vocabulary/reindex", post(handlers::reindex_vocabulary))
        .route("/api/v1/vocabulary/batch-upload", post(handlers::batch_upload_vocabulary))
        // Vocabulary corpus
        .route("/api/v1/vocabulary", get(handlers::list_vocabulary))
        .route("/api/v1/vocabulary/:id", get(handlers::get_vocabulary))
        // Video catalogue
        .route("/api/v1/videos", get(handlers::list_videos).post(handlers::create_video))
        .route("/api/v1/videos/:id", get(handlers::get_video).delete(handlers::delete_video))
        // Watch history
        .route(
            "/api/v1/watch-history",
            get(handlers::get_watch_history).put(handlers::upsert_watch_history),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::new(request_timeout))
                .layer(DefaultBodyLimit::max(MAX_CSV_BYTES)),
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
