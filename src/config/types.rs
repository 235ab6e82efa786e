use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite catalog file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// TMDB v3 API key. Empty disables enrichment and the TMDB source.
    #[serde(default)]
    pub api_key: String,

    /// Language tag sent with every TMDB request.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
            base_url: default_tmdb_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default = "default_true")]
    pub tmdb_enabled: bool,

    #[serde(default = "default_true")]
    pub yts_enabled: bool,

    #[serde(default = "default_true")]
    pub eztv_enabled: bool,

    #[serde(default = "default_true")]
    pub curated_enabled: bool,

    #[serde(default = "default_yts_base_url")]
    pub yts_base_url: String,

    #[serde(default = "default_eztv_base_url")]
    pub eztv_base_url: String,

    /// Page size requested from the YTS feed.
    #[serde(default = "default_yts_limit")]
    pub yts_limit: u32,

    /// Page size requested from the EZTV feed.
    #[serde(default = "default_eztv_limit")]
    pub eztv_limit: u32,

    /// Cap on discovered movies kept per run.
    #[serde(default = "default_tmdb_movie_limit")]
    pub tmdb_movie_limit: usize,

    /// Cap on discovered series kept per run.
    #[serde(default = "default_tmdb_tv_limit")]
    pub tmdb_tv_limit: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            tmdb_enabled: true,
            yts_enabled: true,
            eztv_enabled: true,
            curated_enabled: true,
            yts_base_url: default_yts_base_url(),
            eztv_base_url: default_eztv_base_url(),
            yts_limit: default_yts_limit(),
            eztv_limit: default_eztv_limit(),
            tmdb_movie_limit: default_tmdb_movie_limit(),
            tmdb_tv_limit: default_tmdb_tv_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// How many records are enriched concurrently.
    #[serde(default = "default_enrich_concurrency")]
    pub enrich_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enrich_concurrency: default_enrich_concurrency(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./filmradar.db")
}

fn default_language() -> String {
    "ru-RU".to_string()
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_yts_base_url() -> String {
    "https://yts.mx/api/v2".to_string()
}

fn default_eztv_base_url() -> String {
    "https://eztv.re/api".to_string()
}

fn default_true() -> bool {
    true
}

fn default_yts_limit() -> u32 {
    30
}

fn default_eztv_limit() -> u32 {
    100
}

fn default_tmdb_movie_limit() -> usize {
    20
}

fn default_tmdb_tv_limit() -> usize {
    15
}

fn default_enrich_concurrency() -> usize {
    4
}
