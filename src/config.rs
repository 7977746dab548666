use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the Kotahi server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Data and VTT storage locations
    pub storage: StorageConfig,

    /// Bearer-token verification settings
    pub auth: AuthConfig,

    /// Reindex coordination settings
    pub reindex: ReindexConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Per-request deadline in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON collection files
    pub data_dir: PathBuf,

    /// Root directory of the VTT subtitle store
    pub vtt_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for HMAC token verification
    pub token_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReindexConfig {
    /// Maximum concurrent per-video indexing tasks
    pub workers: usize,

    /// How long a reindex call waits on the rebuild lock before failing fast
    pub lock_wait_ms: u64,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "kotahi.toml",
            "config/kotahi.toml",
            "/etc/kotahi/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        config.apply_env();
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Override settings from `KOTAHI_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("KOTAHI_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(data_dir) = std::env::var("KOTAHI_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(vtt_dir) = std::env::var("KOTAHI_VTT_DIR") {
            self.storage.vtt_dir = PathBuf::from(vtt_dir);
        }

        if let Ok(secret) = std::env::var("KOTAHI_TOKEN_SECRET") {
            self.auth.token_secret = secret;
        }

        if let Ok(workers) = std::env::var("KOTAHI_REINDEX_WORKERS") {
            if let Ok(workers) = workers.parse() {
                self.reindex.workers = workers;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be greater than 0"));
        }

        if self.reindex.workers == 0 {
            return Err(anyhow!("reindex workers must be greater than 0"));
        }

        if self.auth.token_secret.trim().is_empty() {
            return Err(anyhow!("auth token_secret must not be empty"));
        }

        if !self.storage.data_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&self.storage.data_dir) {
                return Err(anyhow!("cannot create data directory: {}", e));
            }
        }

        if !self.storage.vtt_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&self.storage.vtt_dir) {
                return Err(anyhow!("cannot create VTT directory: {}", e));
            }
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Kotahi Server Configuration:\n\
            - Listen: {}:{}\n\
            - Request timeout: {}s\n\
            - Data directory: {}\n\
            - VTT store: {}\n\
            - Reindex workers: {}",
            self.server.host,
            self.server.port,
            self.server.request_timeout_secs,
            self.storage.data_dir.display(),
            self.storage.vtt_dir.display(),
            self.reindex.workers,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                request_timeout_secs: 10,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("./data"),
                vtt_dir: PathBuf::from("./uploads/vtt"),
            },
            auth: AuthConfig {
                token_secret: "kotahi-dev-secret".to_string(),
            },
            reindex: ReindexConfig {
                workers: num_cpus::get().min(8),
                lock_wait_ms: 500,
            },
        }
    }
}
