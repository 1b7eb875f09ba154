//! Configuration management for Spotiply.
//!
//! All paths and tunables live in a single [`Config`] value that is built
//! once in `main` and handed to every component at construction time. The
//! values are resolved in this order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;

use crate::warning;

pub const DEFAULT_FUZZY_MATCH_THRESHOLD: u8 = 87;
pub const DEFAULT_ARTIST_MATCH_THRESHOLD: u8 = 91;
pub const DEFAULT_PLAYLIST_BATCH_SIZE: usize = 10;
pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080";
pub const DEFAULT_SCOPE: &str = "playlist-read-private playlist-modify-private user-library-read";

const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const SPOTIFY_API_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const SPOTIFY_API_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{key} must be a non-negative integer, got '{value}'")]
    InvalidNumber { key: String, value: String },
    #[error("{key} must be between 0 and 100, got {value}")]
    ThresholdOutOfRange { key: String, value: u64 },
    #[error("{key} must be greater than zero")]
    Zero { key: String },
}

/// Runtime configuration shared by all components.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding track lists, exports and the token cache.
    pub data_dir: PathBuf,
    pub credentials_path: PathBuf,
    pub genre_taxonomy_path: PathBuf,
    pub artist_genre_table_path: PathBuf,
    /// Minimum similarity (0-100) for a fuzzy genre match.
    pub fuzzy_match_threshold: u8,
    /// Minimum similarity (0-100) for a fuzzy artist match in the side table.
    pub artist_match_threshold: u8,
    pub playlist_batch_size: usize,
    /// Pause between remote batches, for rate-limit courtesy only.
    pub rate_limit_delay: Duration,
    /// Persist the track list every N matched items; 0 writes once at the end.
    pub checkpoint_every: usize,
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub scope: String,
}

impl Config {
    /// Builds a configuration rooted at `data_dir` with default settings.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            credentials_path: data_dir.join("credentials.json"),
            genre_taxonomy_path: data_dir.join("genres.json"),
            artist_genre_table_path: data_dir.join("artist_genres.csv"),
            data_dir,
            fuzzy_match_threshold: DEFAULT_FUZZY_MATCH_THRESHOLD,
            artist_match_threshold: DEFAULT_ARTIST_MATCH_THRESHOLD,
            playlist_batch_size: DEFAULT_PLAYLIST_BATCH_SIZE,
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
            checkpoint_every: 0,
            api_url: SPOTIFY_API_URL.to_string(),
            auth_url: SPOTIFY_API_AUTH_URL.to_string(),
            token_url: SPOTIFY_API_TOKEN_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }

    /// Loads the configuration from the `.env` file and the process environment.
    ///
    /// The `.env` file is looked up in the platform-specific local data
    /// directory:
    /// - Linux: `~/.local/share/spotiply/.env`
    /// - macOS: `~/Library/Application Support/spotiply/.env`
    /// - Windows: `%LOCALAPPDATA%/spotiply/.env`
    ///
    /// A missing `.env` file is not an error. The resolved data directory is
    /// created if it does not exist yet.
    pub async fn load() -> Result<Self, ConfigError> {
        load_env_file(&default_data_dir().join(".env"));

        let config = Self::from_lookup(|key| env::var(key).ok())?;
        async_fs::create_dir_all(&config.data_dir)
            .await
            .map_err(|source| ConfigError::DataDir {
                path: config.data_dir.clone(),
                source,
            })?;
        Ok(config)
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a numeric setting cannot be parsed, a
    /// threshold is above 100 or the playlist batch size is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("SPOTIPLY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let mut config = Self::with_data_dir(data_dir);

        if let Some(path) = lookup("SPOTIPLY_CREDENTIALS") {
            config.credentials_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("SPOTIPLY_GENRES") {
            config.genre_taxonomy_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("SPOTIPLY_ARTIST_GENRES") {
            config.artist_genre_table_path = PathBuf::from(path);
        }

        if let Some(value) = parse_number(&lookup, "SPOTIPLY_FUZZY_THRESHOLD")? {
            config.fuzzy_match_threshold = threshold("SPOTIPLY_FUZZY_THRESHOLD", value)?;
        }
        if let Some(value) = parse_number(&lookup, "SPOTIPLY_ARTIST_THRESHOLD")? {
            config.artist_match_threshold = threshold("SPOTIPLY_ARTIST_THRESHOLD", value)?;
        }
        if let Some(value) = parse_number(&lookup, "SPOTIPLY_PLAYLIST_BATCH_SIZE")? {
            if value == 0 {
                return Err(ConfigError::Zero {
                    key: "SPOTIPLY_PLAYLIST_BATCH_SIZE".to_string(),
                });
            }
            config.playlist_batch_size = value as usize;
        }
        if let Some(value) = parse_number(&lookup, "SPOTIPLY_RATE_LIMIT_MS")? {
            config.rate_limit_delay = Duration::from_millis(value);
        }
        if let Some(value) = parse_number(&lookup, "SPOTIPLY_CHECKPOINT_EVERY")? {
            config.checkpoint_every = value as usize;
        }

        if let Some(url) = lookup("SPOTIFY_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("SPOTIFY_API_AUTH_URL") {
            config.auth_url = url;
        }
        if let Some(url) = lookup("SPOTIFY_API_TOKEN_URL") {
            config.token_url = url;
        }
        if let Some(scope) = lookup("SPOTIFY_API_AUTH_SCOPE") {
            config.scope = scope;
        }

        Ok(config)
    }

    /// Location of the cached OAuth token.
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join("token.json")
    }

    /// Location of the track list for a playlist name.
    pub fn track_list_path(&self, playlist_name: &str) -> PathBuf {
        self.data_dir.join(format!("{playlist_name}.json"))
    }
}

/// Loads a `.env` file into the process environment. Returns whether it was loaded.
///
/// A missing file is skipped silently, a malformed one with a warning.
pub fn load_env_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    match dotenv::from_path(path) {
        Ok(()) => true,
        Err(e) => {
            warning!("Ignoring {}: {}", path.display(), e);
            false
        }
    }
}

/// Returns `<data_local_dir>/spotiply`, falling back to `./spotiply`.
pub fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotiply");
    path
}

fn parse_number<F>(lookup: &F, key: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber {
                key: key.to_string(),
                value: raw,
            }),
    }
}

fn threshold(key: &str, value: u64) -> Result<u8, ConfigError> {
    if value > 100 {
        return Err(ConfigError::ThresholdOutOfRange {
            key: key.to_string(),
            value,
        });
    }
    Ok(value as u8)
}
