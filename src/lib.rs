//! Telegram Playlist Bot Library
//!
//! This library turns free-text chat requests such as "25 songs of 80s rock"
//! into Spotify playlists. Every chat user authorizes the bot through a
//! per-session OAuth link; the redirect lands on a small HTTP server which
//! stores the resulting credential for that chat.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the OAuth callback server
//! - `cli` - Command implementations and the chat message handler
//! - `config` - Configuration management and environment variables
//! - `error` - Error types for parsing, authorization and playlist assembly
//! - `management` - Session directory, authorization broker and playlist assembler
//! - `server` - HTTP server receiving OAuth redirects
//! - `spotify` - Spotify Web API client implementation
//! - `telegram` - Telegram Bot API chat transport
//! - `types` - Data structures and type definitions
//! - `utils` - Command parsing and small helpers
//!
//! # Example
//!
//! ```
//! use playlistbot::{cli, config};
//!
//! #[tokio::main]
//! async fn main() -> playlistbot::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     cli::serve(config).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod telegram;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the binary glue where errors of different concerns meet. The
/// library modules return their own typed errors from [`error`].
///
/// # Example
///
/// ```
/// use playlistbot::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Every line is prefixed with the local wall-clock time so the output of
/// the long-running `serve` command can be followed as a log.
///
/// # Example
///
/// ```
/// info!("Callback server listening on {}", addr);
/// info!("Chat {} requested {} tracks", chat, count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!(
      "{} [{}] {}",
      chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
      "o".blue().bold(),
      std::format_args!($($arg)*)
    );
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Chat {} authorized", chat);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!(
      "{} [{}] {}",
      chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
      "✓".green().bold(),
      std::format_args!($($arg)*)
    );
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for fatal startup failures such as a missing secret or an
/// unbindable server address. Errors that happen while serving a chat are
/// reported with [`warning!`] and answered in the chat instead.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!(
      "{} [{}] {}",
      chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
      "!".red().bold(),
      std::format_args!($($arg)*)
    );
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable failures: a failed remote call, an undeliverable
/// chat message, a rejected OAuth callback.
///
/// # Example
///
/// ```
/// warning!("Failed to poll updates: {}", e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!(
      "{} [{}] {}",
      chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
      "!".yellow().bold(),
      std::format_args!($($arg)*)
    );
  })
}
