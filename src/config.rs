//! Configuration management for the playlist bot.
//!
//! Configuration comes from environment variables, optionally seeded from
//! `.env` files. Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults for the optional keys
//!
//! The four secrets (`TELEGRAM_TOKEN`, `SPOTIFY_CLIENT_ID`,
//! `SPOTIFY_CLIENT_SECRET`, `SPOTIFY_REDIRECT_URI`) have no default; the
//! process refuses to start without them.

use std::{fmt, net::SocketAddr, path::PathBuf, time::Duration};

use crate::error::ConfigError;

pub const APP_DIR: &str = "playlistbot";

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Permissions needed to create and fill playlists, nothing more.
pub const SPOTIFY_SCOPE: &str = "playlist-modify-public playlist-modify-private";

const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Loads environment variables from `.env` files.
///
/// Looks in the platform-specific local data directory first and then in the
/// working directory. Variables that are already set in the process
/// environment always win; the files only fill gaps.
///
/// # File Locations
///
/// - **Linux**: `~/.local/share/playlistbot/.env`
/// - **macOS**: `~/Library/Application Support/playlistbot/.env`
/// - **Windows**: `%LOCALAPPDATA%\playlistbot\.env`
/// - Fallback: `./.env` in the working directory
///
/// The data directory is created when missing so the user can see where the
/// file belongs. A missing `.env` file is not an error, since deployments
/// usually pass the variables through the real environment.
///
/// # Errors
///
/// Returns an error string if:
/// - The data directory cannot be created
/// - The `.env` file in the data directory exists but cannot be parsed
///
/// # Example
///
/// ```
/// use playlistbot::config;
///
/// if let Err(e) = config::load_env().await {
///     eprintln!("Could not load .env: {}", e);
/// }
/// let config = config::Config::from_env()?;
/// ```
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    async_fs::create_dir_all(&path)
        .await
        .map_err(|e| e.to_string())?;
    path.push(".env");

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    // variables already set are never overridden, so this only fills gaps
    let _ = dotenv::dotenv();
    Ok(())
}

/// Spotify application credentials and endpoints.
///
/// The client secret never shows up in `Debug` output.
#[derive(Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
}

impl fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Everything the bot needs at startup.
///
/// Built once by [`Config::from_env`] and then shared read-only. Secrets are
/// redacted from `Debug` output so the struct can be logged.
#[derive(Clone)]
pub struct Config {
    pub telegram_token: String,
    pub telegram_api_url: String,
    pub poll_timeout: Duration,
    pub spotify: SpotifyConfig,
    pub server_address: SocketAddr,
    /// Delay applied inside each message task before it is handled.
    pub request_delay: Duration,
    pub playlist_public: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &"[REDACTED]")
            .field("telegram_api_url", &self.telegram_api_url)
            .field("poll_timeout", &self.poll_timeout)
            .field("spotify", &self.spotify)
            .field("server_address", &self.server_address)
            .field("request_delay", &self.request_delay)
            .field("playlist_public", &self.playlist_public)
            .finish()
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Call [`load_env`] first if `.env` files should be taken into account.
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty or whitespace-only values count as missing, so `TELEGRAM_TOKEN=`
    /// in a `.env` file behaves like an absent key.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the raw value of a key, or `None` when unset
    ///
    /// # Keys
    ///
    /// Required: `TELEGRAM_TOKEN`, `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`,
    /// `SPOTIFY_REDIRECT_URI`.
    ///
    /// Optional, with defaults:
    /// - `SERVER_ADDRESS` (`0.0.0.0:8080`)
    /// - `REQUEST_DELAY_MS` (`0`)
    /// - `POLL_TIMEOUT_SECS` (`30`)
    /// - `PLAYLIST_PUBLIC` (`true`; accepts `1/0`, `true/false`, `yes/no`, `on/off`)
    /// - `TELEGRAM_API_URL`, `SPOTIFY_API_URL`, `SPOTIFY_API_AUTH_URL`,
    ///   `SPOTIFY_API_TOKEN_URL` (the public endpoints)
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Missing`] naming the first required key that is unset
    /// - [`ConfigError::Invalid`] when an optional key holds a value that does
    ///   not parse
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use playlistbot::config::Config;
    ///
    /// let vars: HashMap<&str, &str> = HashMap::from([
    ///     ("TELEGRAM_TOKEN", "123:abc"),
    ///     ("SPOTIFY_CLIENT_ID", "id"),
    ///     ("SPOTIFY_CLIENT_SECRET", "secret"),
    ///     ("SPOTIFY_REDIRECT_URI", "https://bot.example.com/callback"),
    /// ]);
    /// let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))?;
    /// assert_eq!(config.server_address.port(), 8080);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let optional = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let telegram_token = required("TELEGRAM_TOKEN")?;
        let spotify = SpotifyConfig {
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_REDIRECT_URI")?,
            auth_url: optional("SPOTIFY_API_AUTH_URL", DEFAULT_SPOTIFY_AUTH_URL),
            token_url: optional("SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_TOKEN_URL),
            api_url: optional("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL),
        };

        let server_address = parse_value(
            "SERVER_ADDRESS",
            optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
        )?;
        let request_delay_ms: u64 = parse_value("REQUEST_DELAY_MS", optional("REQUEST_DELAY_MS", "0"))?;
        let poll_timeout_secs: u64 = parse_value(
            "POLL_TIMEOUT_SECS",
            optional("POLL_TIMEOUT_SECS", &DEFAULT_POLL_TIMEOUT_SECS.to_string()),
        )?;
        let playlist_public = parse_bool("PLAYLIST_PUBLIC", optional("PLAYLIST_PUBLIC", "true"))?;

        Ok(Self {
            telegram_token,
            telegram_api_url: optional("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL),
            poll_timeout: Duration::from_secs(poll_timeout_secs),
            spotify,
            server_address,
            request_delay: Duration::from_millis(request_delay_ms),
            playlist_public,
        })
    }
}

/// Parses an optional value, keeping the raw text for the error message.
fn parse_value<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}
