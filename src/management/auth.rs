use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::Instant};

use crate::{
    config::SPOTIFY_SCOPE,
    error::AuthError,
    spotify::MusicService,
    success,
    telegram::ChatTransport,
    types::{Credential, Reply, SessionId},
    utils, warning,
};

/// How long a login link stays valid.
pub const AUTHORIZATION_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
struct PendingAuthorization {
    session_id: SessionId,
    issued_at: Instant,
}

/// Issues login links and completes them when Spotify redirects back.
///
/// Each link carries a random correlation token as the OAuth `state`. The
/// token maps back to the chat that asked for it, can be used once, and
/// expires after [`AUTHORIZATION_TTL`].
pub struct AuthorizationBroker {
    music: Arc<dyn MusicService>,
    chat: Arc<dyn ChatTransport>,
    sessions: Arc<super::SessionDirectory>,
    pending: Mutex<HashMap<String, PendingAuthorization>>,
    ttl: Duration,
}

impl AuthorizationBroker {
    pub fn new(
        music: Arc<dyn MusicService>,
        chat: Arc<dyn ChatTransport>,
        sessions: Arc<super::SessionDirectory>,
    ) -> Self {
        Self {
            music,
            chat,
            sessions,
            pending: Mutex::new(HashMap::new()),
            ttl: AUTHORIZATION_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns a fresh login link for `session_id`.
    ///
    /// Any link issued earlier for the same chat stops working.
    pub async fn begin_authorization(&self, session_id: SessionId) -> String {
        let token = utils::generate_correlation_token();

        {
            let mut pending = self.pending.lock().await;
            let ttl = self.ttl;
            pending.retain(|_, p| p.issued_at.elapsed() < ttl);
            pending.insert(
                token.clone(),
                PendingAuthorization {
                    session_id,
                    issued_at: Instant::now(),
                },
            );
        }
        self.sessions.set_pending(session_id, &token).await;

        self.music.authorization_url(SPOTIFY_SCOPE, &token)
    }

    /// Resolves the callback for `token` and stores the exchanged credential.
    ///
    /// The token is consumed before the code exchange, so a second call with
    /// the same token fails with `SessionExpired` whatever the first outcome.
    pub async fn complete_authorization(&self, token: &str, code: &str) -> Result<Credential, AuthError> {
        let entry = self.pending.lock().await.remove(token);
        let session_id = match entry {
            Some(p) if p.issued_at.elapsed() < self.ttl => p.session_id,
            _ => return Err(AuthError::SessionExpired),
        };

        if !self.sessions.take_pending_if(session_id, token).await {
            return Err(AuthError::SessionExpired);
        }

        let credential = self.music.exchange_code(code).await.map_err(AuthError::Exchange)?;
        self.sessions.upsert_credential(session_id, credential.clone()).await;
        success!("Chat {} authorized", session_id);

        let chat = Arc::clone(&self.chat);
        tokio::spawn(async move {
            let reply = Reply::plain(
                "Spotify account connected! Now send me what you want to hear, e.g. \"50 songs of kpop\".",
            );
            if let Err(e) = chat.send(session_id, &reply).await {
                warning!("Failed to notify chat {}: {}", session_id, e);
            }
        });

        Ok(credential)
    }

    /// Number of login links still waiting for their redirect.
    pub async fn pending_count(&self) -> usize {
        let ttl = self.ttl;
        self.pending
            .lock()
            .await
            .values()
            .filter(|p| p.issued_at.elapsed() < ttl)
            .count()
    }
}
