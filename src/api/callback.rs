use std::collections::HashMap;

use axum::{Extension, extract::Query, http::StatusCode, response::Html};

use crate::{error::AuthError, warning};

use super::AppState;

const SUCCESS_PAGE: &str =
    "<h2>Spotify account connected.</h2><p>You can close this window and go back to the chat.</p>";
const DENIED_PAGE: &str = "<h4>Authorization was cancelled.</h4><p>Send /login in the chat to try again.</p>";
const MISSING_PAGE: &str = "<h4>Missing authorization code or state.</h4>";
const EXPIRED_PAGE: &str =
    "<h4>This login link has expired or was already used.</h4><p>Send /login in the chat for a new one.</p>";
const FAILED_PAGE: &str = "<h4>Login failed.</h4><p>Send /login in the chat to try again.</p>";

/// Receives the OAuth redirect: `GET /callback?code=...&state=...`.
///
/// `state` is the correlation token from the login link; the broker maps it
/// back to the chat and stores the credential there.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<AppState>,
) -> (StatusCode, Html<&'static str>) {
    if let Some(error) = params.get("error") {
        warning!("Authorization denied: {}", error);
        return (StatusCode::BAD_REQUEST, Html(DENIED_PAGE));
    }

    let (Some(code), Some(token)) = (params.get("code"), params.get("state")) else {
        return (StatusCode::BAD_REQUEST, Html(MISSING_PAGE));
    };

    match state.broker.complete_authorization(token, code).await {
        Ok(_) => (StatusCode::OK, Html(SUCCESS_PAGE)),
        Err(AuthError::SessionExpired) => (StatusCode::GONE, Html(EXPIRED_PAGE)),
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            (StatusCode::BAD_GATEWAY, Html(FAILED_PAGE))
        }
    }
}
