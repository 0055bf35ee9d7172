//! # Spotify Integration Module
//!
//! This module implements the parts of the Spotify Web API the bot needs:
//! the OAuth 2.0 authorization-code flow, catalog search and playlist
//! creation. It is the integration layer between the management logic and
//! Spotify's HTTP endpoints.
//!
//! ## Architecture
//!
//! ```text
//! Management Layer (AuthorizationBroker, PlaylistAssembler)
//!          ↓
//! MusicService trait
//!          ↓
//! SpotifyClient
//!     ├── Authentication (authorize URL, code exchange, refresh)
//!     ├── Search (track search)
//!     └── Playlist Operations (current user, create, add items)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! The management layer only sees [`MusicService`], so tests drive it with
//! an in-process fake instead of a network.
//!
//! ## Authentication
//!
//! The bot is a confidential client: the code exchange and refresh calls
//! authenticate with the client id and secret through HTTP basic auth. Each
//! authorization link carries a per-chat `state` value which the callback
//! uses to find the chat that asked for it.
//!
//! ## Error Handling
//!
//! Every call returns [`SpotifyResult`]. A 401 becomes
//! [`SpotifyError::Unauthorized`] so callers can ask the user to log in
//! again; other non-success statuses become [`SpotifyError::Api`] with the
//! message Spotify sent. Calls are never retried: a failure is reported to
//! the chat right away.
//!
//! ## API Coverage
//!
//! - `GET /authorize` - user consent page (URL only)
//! - `POST /api/token` - code exchange and refresh
//! - `GET /search` - track search
//! - `GET /me` - current user
//! - `POST /users/{user_id}/playlists` - create playlist
//! - `POST /playlists/{playlist_id}/tracks` - add tracks

pub mod auth;
pub mod playlist;
pub mod search;

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;

use crate::{
    config::SpotifyConfig,
    error::{SpotifyError, SpotifyResult},
    types::{CreatedPlaylist, Credential, CurrentUser, Track},
};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Remote music service used by the broker and the assembler.
#[async_trait]
pub trait MusicService: Send + Sync {
    /// Consent page URL for `scope`, echoing `state` back on redirect.
    fn authorization_url(&self, scope: &str, state: &str) -> String;

    async fn exchange_code(&self, code: &str) -> SpotifyResult<Credential>;

    async fn refresh(&self, refresh_token: &str) -> SpotifyResult<Credential>;

    async fn search(&self, access_token: &str, query: &str, limit: u32) -> SpotifyResult<Vec<Track>>;

    async fn who_am_i(&self, access_token: &str) -> SpotifyResult<CurrentUser>;

    async fn create_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> SpotifyResult<CreatedPlaylist>;

    async fn add_items(&self, access_token: &str, playlist_id: &str, uris: &[String]) -> SpotifyResult<()>;
}

/// Spotify Web API client
#[derive(Clone)]
pub struct SpotifyClient {
    http_client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: Url,
    token_url: Url,
    api_url: String,
}

impl fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl SpotifyClient {
    /// Creates a client for the configured endpoints.
    ///
    /// # Errors
    /// Returns `SpotifyError::InvalidUrl` if an endpoint cannot be parsed and
    /// `SpotifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: &SpotifyConfig) -> SpotifyResult<Self> {
        let parse = |url: &str| Url::parse(url).map_err(|e| SpotifyError::InvalidUrl(format!("{url}: {e}")));

        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("playlistbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_url: parse(&config.auth_url)?,
            token_url: parse(&config.token_url)?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl MusicService for SpotifyClient {
    fn authorization_url(&self, scope: &str, state: &str) -> String {
        self.build_authorization_url(scope, state)
    }

    async fn exchange_code(&self, code: &str) -> SpotifyResult<Credential> {
        self.exchange_authorization_code(code).await
    }

    async fn refresh(&self, refresh_token: &str) -> SpotifyResult<Credential> {
        self.refresh_credential(refresh_token).await
    }

    async fn search(&self, access_token: &str, query: &str, limit: u32) -> SpotifyResult<Vec<Track>> {
        self.search_tracks(access_token, query, limit).await
    }

    async fn who_am_i(&self, access_token: &str) -> SpotifyResult<CurrentUser> {
        self.current_user(access_token).await
    }

    async fn create_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> SpotifyResult<CreatedPlaylist> {
        self.create_user_playlist(access_token, owner_id, name, description, public)
            .await
    }

    async fn add_items(&self, access_token: &str, playlist_id: &str, uris: &[String]) -> SpotifyResult<()> {
        self.add_tracks(access_token, playlist_id, uris).await
    }
}

/// Passes successful responses through and turns the rest into errors.
///
/// Web API errors look like `{"error": {"status": 401, "message": ".."}}`,
/// accounts errors like `{"error": "invalid_grant", "error_description": ".."}`.
async fn check(res: Response) -> SpotifyResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| {
            json["error"]["message"]
                .as_str()
                .or_else(|| json["error_description"].as_str())
                .or_else(|| json["error"].as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    if status == StatusCode::UNAUTHORIZED {
        Err(SpotifyError::Unauthorized(message))
    } else {
        Err(SpotifyError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
