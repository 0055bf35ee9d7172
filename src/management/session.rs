use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::types::{Credential, Session, SessionId};

/// In-memory record of every chat's authorization state.
///
/// The outer lock is only held to find or create a session. Each session has
/// its own lock, which the message handler keeps for the whole playlist
/// build so a refreshed credential is stored before anyone else for that
/// chat can read it. Sessions are never evicted.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    sessions: Mutex<HashMap<SessionId, Arc<Mutex<Session>>>>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lockable session for `id`, creating it on first use.
    pub async fn session(&self, id: SessionId) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.lock().await;
        Arc::clone(sessions.entry(id).or_default())
    }

    /// Snapshot of a session, if the chat has been seen.
    pub async fn get(&self, id: SessionId) -> Option<Session> {
        let handle = self.sessions.lock().await.get(&id).cloned()?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    /// Stores `credential` for `id`, replacing any previous one.
    pub async fn upsert_credential(&self, id: SessionId, credential: Credential) {
        let handle = self.session(id).await;
        handle.lock().await.credential = Some(credential);
    }

    pub async fn clear_credential(&self, id: SessionId) {
        let handle = self.session(id).await;
        handle.lock().await.credential = None;
    }

    pub async fn is_authorized(&self, id: SessionId) -> bool {
        self.get(id)
            .await
            .is_some_and(|session| session.credential.is_some())
    }

    /// Marks `token` as the only login link `id` may complete.
    pub async fn set_pending(&self, id: SessionId, token: &str) {
        let handle = self.session(id).await;
        handle.lock().await.pending = Some(token.to_string());
    }

    /// Clears the pending marker if it still equals `token`.
    ///
    /// Returns false when the chat has since asked for a newer link.
    pub async fn take_pending_if(&self, id: SessionId, token: &str) -> bool {
        let handle = self.session(id).await;
        let mut session = handle.lock().await;
        if session.pending.as_deref() == Some(token) {
            session.pending = None;
            true
        } else {
            false
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
