use chrono::Utc;

use crate::{
    error::SpotifyResult,
    types::{Credential, TokenResponse},
};

use super::{SpotifyClient, check};

impl SpotifyClient {
    /// Builds the consent URL the user opens to authorize the bot.
    ///
    /// The URL carries the client id, the registered redirect URI, the
    /// requested scope and the `state` value. Spotify sends `state` back
    /// unchanged on the redirect, which is how the callback finds the chat
    /// the login belongs to.
    ///
    /// # Arguments
    ///
    /// * `scope` - Space separated permissions to request
    /// * `state` - Correlation token echoed back on the redirect
    ///
    /// # Returns
    ///
    /// The full authorize URL with form-encoded query parameters.
    ///
    /// # Example
    ///
    /// ```
    /// let url = client.build_authorization_url(SPOTIFY_SCOPE, &token);
    /// // https://accounts.spotify.com/authorize?client_id=..&response_type=code&..&state=<token>
    /// ```
    pub(crate) fn build_authorization_url(&self, scope: &str, state: &str) -> String {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", scope)
            .append_pair("state", state);
        url.into()
    }

    /// Exchanges an authorization code for a credential.
    ///
    /// Completes the authorization-code flow; the code is single-use and
    /// expires after a few minutes, so this runs as soon as the redirect
    /// arrives.
    ///
    /// # Arguments
    ///
    /// * `code` - The `code` query parameter from the redirect
    ///
    /// # Request Details
    ///
    /// - **Method**: POST to the accounts token endpoint
    /// - **Authentication**: HTTP basic auth with client id and secret
    /// - **Body**: form-encoded `grant_type=authorization_code`, `code` and
    ///   the same `redirect_uri` used to build the consent URL
    ///
    /// # Returns
    ///
    /// A [`Credential`] stamped with the current time, so its expiry can be
    /// checked later without another request.
    ///
    /// # Errors
    ///
    /// - `SpotifyError::Http` when the token endpoint cannot be reached
    /// - `SpotifyError::Api` when the code is rejected, already used or
    ///   expired (Spotify answers 400 `invalid_grant`)
    /// - `SpotifyError::Unauthorized` when the client credentials are wrong
    ///
    /// # Example
    ///
    /// ```
    /// let credential = client.exchange_authorization_code(&code).await?;
    /// sessions.upsert_credential(session_id, credential).await;
    /// ```
    pub(crate) async fn exchange_authorization_code(&self, code: &str) -> SpotifyResult<Credential> {
        let res = self
            .http_client
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let token: TokenResponse = check(res).await?.json().await?;
        Ok(credential_from(token, None))
    }

    /// Refreshes an expired access token.
    ///
    /// Spotify may or may not rotate the refresh token; when the response
    /// omits it the old one stays valid and is carried over.
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - The refresh token of the expiring credential
    ///
    /// # Returns
    ///
    /// A fresh [`Credential`] that replaces the old one in the session.
    ///
    /// # Errors
    ///
    /// - `SpotifyError::Http` when the token endpoint cannot be reached
    /// - `SpotifyError::Api` when the refresh token was revoked, typically
    ///   because the user removed the app from their Spotify account
    ///
    /// Callers treat every error here as "authorize again".
    ///
    /// # Example
    ///
    /// ```
    /// if credential.is_expired() {
    ///     *credential = client.refresh_credential(&credential.refresh_token).await?;
    /// }
    /// ```
    pub(crate) async fn refresh_credential(&self, refresh_token: &str) -> SpotifyResult<Credential> {
        let res = self
            .http_client
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let token: TokenResponse = check(res).await?.json().await?;
        Ok(credential_from(token, Some(refresh_token)))
    }
}

/// Converts a token endpoint response into a stored credential.
///
/// `previous_refresh` is kept when the response does not rotate the refresh
/// token.
fn credential_from(token: TokenResponse, previous_refresh: Option<&str>) -> Credential {
    let refresh_token = token
        .refresh_token
        .or_else(|| previous_refresh.map(str::to_string))
        .unwrap_or_default();

    Credential {
        access_token: token.access_token,
        refresh_token,
        scope: token.scope,
        expires_in: token.expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    }
}
