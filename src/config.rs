use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Metadata provider API key
    pub tmdb_api_key: String,

    /// Metadata provider base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Image CDN base URL (size segment and path are appended per asset)
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Per-request timeout for provider calls, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Bounded worker pool size for per-movie and per-actor fan-out
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    /// Overall deadline for one recommendation computation, in seconds
    #[serde(default = "default_recommend_deadline_secs")]
    pub recommend_deadline_secs: u64,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_fetch_concurrency() -> usize {
    6
}

fn default_recommend_deadline_secs() -> u64 {
    25
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
