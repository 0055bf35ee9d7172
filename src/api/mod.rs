//! # API Module
//!
//! HTTP endpoints served next to the chat loop.
//!
//! ## Endpoints
//!
//! - [`callback`] - Spotify redirects the user's browser here after consent.
//!   The `state` parameter identifies the chat the login link was issued
//!   for; the handler completes the authorization and answers with a short
//!   HTML page.
//! - [`health`] - Status, version and the number of known chat sessions.
//!
//! Both handlers share an [`AppState`] injected through an `Extension`
//! layer. A failed callback never affects other chats: every outcome is
//! turned into a page with a matching status code.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! let app = playlistbot::api::router(AppState { broker, sessions });
//! axum::serve(listener, app).await?;
//! ```

mod callback;
mod health;

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use crate::management::{AuthorizationBroker, SessionDirectory};

pub use callback::callback;
pub use health::health;

#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<AuthorizationBroker>,
    pub sessions: Arc<SessionDirectory>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/callback", get(callback))
        .layer(Extension(state))
}
