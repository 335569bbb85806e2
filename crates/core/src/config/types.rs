use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::matching::CategoryAllowlists;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub tracker_api: TrackerApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub matching: MatchingConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notifier: Option<TelegramConfig>,
    #[serde(default)]
    pub server: Option<ServerConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts (not retries after the first).
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    2000
}

/// Upstream film catalog (the site films are uploaded to).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Base URL, e.g. "https://kinotam.example".
    pub url: String,
    /// Login credential sent as the `tm` form field.
    pub token: String,
    /// Catalog section: 91 for films, 104 for cartoons.
    pub category_id: u32,
    /// Total number of films requested per run.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Page size accepted by the listing endpoint.
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_limit() -> u32 {
    100
}

fn default_max_limit() -> u32 {
    50
}

fn default_timeout() -> u64 {
    20
}

/// Torrent search API fronting the trackers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerApiConfig {
    pub url: String,
    /// Search scope path segment ("all" searches every tracker).
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub magnet_retry: RetryConfig,
}

fn default_scope() -> String {
    "all".to_string()
}

/// Dedup database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    #[serde(default = "default_good_table")]
    pub good_quality_table: String,
    #[serde(default = "default_bad_table")]
    pub bad_quality_table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            good_quality_table: default_good_table(),
            bad_quality_table: default_bad_table(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("kinoscout.db")
}

fn default_good_table() -> String {
    "films_good_quality".to_string()
}

fn default_bad_table() -> String {
    "films_bad_quality".to_string()
}

/// Release matching and quality ranking.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchingConfig {
    /// Releases must be strictly smaller than this (gigabytes).
    pub max_size_gb: f64,
    /// Fresh films with fewer catalog views are skipped.
    #[serde(default)]
    pub min_views: i64,
    /// Acceptable quality tags, best first.
    pub good_quality: Vec<String>,
    /// Fallback quality tags, best first.
    #[serde(default)]
    pub bad_quality: Vec<String>,
    /// Keys are `CATEGORIES_<tracker>` and `RUSSIAN_CATEGORIES_<tracker>`.
    #[serde(default)]
    pub categories: CategoryAllowlists,
}

/// Scheduler loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_restart_interval")]
    pub restart_interval_secs: u64,
    /// Pause between consecutive uploads.
    #[serde(default = "default_upload_interval")]
    pub upload_interval_secs: u64,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_films: usize,
    /// Write results to `result_path` instead of uploading.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    #[serde(default = "default_result_path")]
    pub result_path: PathBuf,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            restart_interval_secs: default_restart_interval(),
            upload_interval_secs: default_upload_interval(),
            max_concurrent_films: default_max_concurrent(),
            dry_run: default_dry_run(),
            result_path: default_result_path(),
        }
    }
}

fn default_restart_interval() -> u64 {
    3600
}

fn default_upload_interval() -> u64 {
    60
}

fn default_max_concurrent() -> usize {
    10
}

fn default_dry_run() -> bool {
    true
}

fn default_result_path() -> PathBuf {
    PathBuf::from("result.json")
}

/// Telegram notification channel
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    /// Override for the Bot API base URL (default: https://api.telegram.org).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

/// Health/metrics HTTP endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
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

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    9090
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Directory for the daily rolling log file. Stdout only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub catalog_url: String,
    pub catalog_token_configured: bool,
    pub category_id: u32,
    pub tracker_api_url: String,
    pub database: DatabaseConfig,
    pub max_size_gb: f64,
    pub min_views: i64,
    pub good_quality: Vec<String>,
    pub bad_quality: Vec<String>,
    pub scheduler: SchedulerConfig,
    pub notifier_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            catalog_url: config.catalog.url.clone(),
            catalog_token_configured: !config.catalog.token.is_empty(),
            category_id: config.catalog.category_id,
            tracker_api_url: config.tracker_api.url.clone(),
            database: config.database.clone(),
            max_size_gb: config.matching.max_size_gb,
            min_views: config.matching.min_views,
            good_quality: config.matching.good_quality.clone(),
            bad_quality: config.matching.bad_quality.clone(),
            scheduler: config.scheduler.clone(),
            notifier_configured: config.notifier.is_some(),
            server: config.server.clone(),
        }
    }
}
