//! Error types
//!
//! One enum per concern. Remote clients return [`SpotifyError`] and
//! [`ChatError`]; the management layer folds them into [`AuthError`] and
//! [`AssemblyError`], which the message handler turns into chat replies.

use thiserror::Error;

/// Spotify Web API and accounts service errors
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Transport failure, timeout or undecodable body
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The access token was rejected
    #[error("Spotify rejected the access token: {0}")]
    Unauthorized(String),

    /// Spotify answered with a non-success status
    #[error("Spotify API error {status}: {message}")]
    Api { status: u16, message: String },

    /// A configured endpoint is not a valid URL
    #[error("Invalid Spotify URL: {0}")]
    InvalidUrl(String),
}

impl SpotifyError {
    /// True when the user has to authorize again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SpotifyError::Unauthorized(_))
    }
}

/// Result type for Spotify operations
pub type SpotifyResult<T> = Result<T, SpotifyError>;

/// Telegram Bot API errors
#[derive(Error, Debug)]
pub enum ChatError {
    /// Transport failure; the request URL is stripped since it carries the bot token
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered with `ok: false`
    #[error("Telegram API error: {0}")]
    Api(String),
}

/// Result type for chat transport operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Startup configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Command parsing errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing left to search for once the numbers are removed
    #[error("request contains no search text")]
    Empty,
}

/// OAuth callback errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown, consumed, superseded or expired correlation token
    #[error("authorization session expired or unknown")]
    SessionExpired,

    /// The authorization code could not be exchanged for tokens
    #[error("token exchange failed: {0}")]
    Exchange(#[source] SpotifyError),
}

/// Playlist assembly errors
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// The credential could not be refreshed or was rejected
    #[error("authorization expired")]
    AuthExpired,

    /// Network failure, timeout or error status before the playlist existed
    #[error("music service unavailable: {0}")]
    RemoteUnavailable(#[source] SpotifyError),

    /// The playlist exists but not every track could be added
    #[error("playlist {url} created but only {added} of {expected} tracks were added: {source}")]
    PartialPlaylistFailure {
        url: String,
        added: usize,
        expected: usize,
        #[source]
        source: SpotifyError,
    },
}

impl From<SpotifyError> for AssemblyError {
    fn from(err: SpotifyError) -> Self {
        if err.is_unauthorized() {
            AssemblyError::AuthExpired
        } else {
            AssemblyError::RemoteUnavailable(err)
        }
    }
}
