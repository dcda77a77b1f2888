//! Application configuration. Server credentials, schedule, region list.

use crate::domain::BotError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default maximum message length, in characters (Mastodon's stock limit).
pub const DEFAULT_MAX_LEN: usize = 500;

/// Default display timezone for the intro post.
pub const DEFAULT_TIMEZONE: &str = "Australia/Sydney";

/// Default region configuration document.
pub const DEFAULT_AREA_FILE: &str = "areas.json";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Mastodon instance URL. Read from SERVER.
    pub server: Option<String>,

    /// Mastodon access token. When unset, statuses are only logged.
    /// Read from TOKEN.
    pub token: Option<String>,

    /// Maximum message length in characters. Read from MAXLEN.
    #[serde(default)]
    pub maxlen: Option<usize>,

    /// IANA timezone name for the intro post's as-of display.
    /// Read from TIMEZONE.
    #[serde(default)]
    pub timezone: Option<String>,

    /// Daily run times, "HH:MM,HH:MM" in the display timezone. Empty or
    /// unset = run once and exit. Read from RUNTIMES.
    #[serde(default)]
    pub runtimes: Option<String>,

    /// Path to the region configuration document. Read from AREA_FILE.
    #[serde(default)]
    pub area_file: Option<String>,

    /// Forecast feed URL override. Read from BEACHBOT_FEED_URL.
    #[serde(default)]
    pub feed_url: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("BEACHBOT"));
        if let Ok(path) = std::env::var("BEACHBOT_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // Bare names are read directly so the original deployment's .env
        // (SERVER=..., TOKEN=...) keeps working unchanged.
        if cfg.server.is_none() {
            cfg.server = std::env::var("SERVER").ok();
        }
        if cfg.token.is_none() {
            cfg.token = std::env::var("TOKEN").ok();
        }
        if cfg.maxlen.is_none() {
            if let Ok(s) = std::env::var("MAXLEN") {
                if let Ok(n) = s.parse::<usize>() {
                    cfg.maxlen = Some(n);
                }
            }
        }
        if cfg.timezone.is_none() {
            cfg.timezone = std::env::var("TIMEZONE").ok();
        }
        if cfg.runtimes.is_none() {
            cfg.runtimes = std::env::var("RUNTIMES").ok();
        }
        if cfg.area_file.is_none() {
            cfg.area_file = std::env::var("AREA_FILE").ok();
        }
        Ok(cfg)
    }

    /// Returns the instance URL. Defaults to localhost (useful only with
    /// the logging publisher).
    pub fn server_or_default(&self) -> String {
        self.server
            .clone()
            .unwrap_or_else(|| "https://localhost".to_string())
    }

    /// Returns the message length limit. Defaults to 500 characters.
    pub fn maxlen_or_default(&self) -> usize {
        self.maxlen.unwrap_or(DEFAULT_MAX_LEN)
    }

    /// Returns the display timezone name. Defaults to Australia/Sydney.
    pub fn timezone_or_default(&self) -> String {
        self.timezone
            .clone()
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string())
    }

    /// Returns the region config path. Defaults to areas.json.
    pub fn area_file_or_default(&self) -> String {
        self.area_file
            .clone()
            .unwrap_or_else(|| DEFAULT_AREA_FILE.to_string())
    }
}

/// One region entry from the area configuration document. List order
/// determines publish order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Area {
    pub name: String,
    pub file: PathBuf,
}

/// Load the ordered region list from a JSON document:
/// `[{"name": "Eastern Suburbs", "file": "eastern.json"}, ...]`.
pub async fn load_areas(path: &Path) -> Result<Vec<Area>, BotError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| BotError::Config(format!("read area config {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| BotError::Config(format!("parse area config {}: {e}", path.display())))
}
