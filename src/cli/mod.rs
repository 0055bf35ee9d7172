//! # CLI Module
//!
//! Command implementations for the `playlistbot` binary and the chat-facing
//! layer that sits on top of the management logic.
//!
//! ## Overview
//!
//! - [`serve`] - Connects to Telegram and Spotify, starts the OAuth callback
//!   server and runs the chat loop until Ctrl-C.
//! - [`dispatch`] / [`schedule`] - The polling loop; every inbound message
//!   is handled on its own task, after the optional per-request delay.
//! - [`MessageHandler`] - Turns one chat message into replies: commands,
//!   login links, progress and the finished playlist link.
//!
//! ## Architecture Design
//!
//! ```text
//! Chat Layer (dispatch loop, MessageHandler)
//!     ↓
//! Management Layer (SessionDirectory, AuthorizationBroker, PlaylistAssembler)
//!     ↓
//! API Layer (MusicService, ChatTransport)
//!     ↓
//! Network Layer (HTTP Requests)
//! ```
//!
//! ## Chat Commands
//!
//! - `/start`, `/help` - Usage and an example request
//! - `/login` - A fresh Spotify login link
//! - `/logout` - Forget the stored credential
//! - anything else - A playlist request such as `25 songs of 80s rock`
//!
//! ## Error Handling
//!
//! Errors never escape a message task. Parse failures get an example,
//! expired authorization gets a new login link, Spotify failures get a
//! "try again" reply, and a playlist that could only be partly filled is
//! reported as such together with its link.

mod handler;
mod serve;

pub use handler::MessageHandler;
pub use serve::dispatch;
pub use serve::run;
pub use serve::schedule;
pub use serve::serve;
