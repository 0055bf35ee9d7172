#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use playlistbot::{
    error::{ChatError, ChatResult, SpotifyError, SpotifyResult},
    spotify::MusicService,
    telegram::ChatTransport,
    types::{CreatedPlaylist, Credential, CurrentUser, InboundMessage, Reply, SessionId, Track},
};

pub fn fresh_credential(access_token: &str) -> Credential {
    Credential {
        access_token: access_token.to_string(),
        refresh_token: format!("refresh-{access_token}"),
        scope: "playlist-modify-public playlist-modify-private".to_string(),
        expires_in: 3600,
        obtained_at: Utc::now().timestamp() as u64,
    }
}

pub fn expired_credential(access_token: &str) -> Credential {
    Credential {
        obtained_at: 0,
        ..fresh_credential(access_token)
    }
}

pub fn track(n: usize) -> Track {
    Track {
        id: format!("track{n}"),
        name: format!("Song {n}"),
        uri: format!("spotify:track:track{n}"),
        artists: vec![],
    }
}

fn unavailable() -> SpotifyError {
    SpotifyError::Api {
        status: 503,
        message: "Service unavailable".to_string(),
    }
}

/// Music service double recording every call as `"<op>:<args>"`.
#[derive(Default)]
pub struct FakeMusic {
    pub tracks: Mutex<Vec<Track>>,
    pub refresh_fails: AtomicBool,
    pub exchange_fails: AtomicBool,
    pub search_fails: AtomicBool,
    pub search_unauthorized: AtomicBool,
    pub create_fails: AtomicBool,
    pub add_fails: AtomicBool,
    pub search_delay: Mutex<Option<Duration>>,
    pub calls: Mutex<Vec<String>>,
    pub descriptions: Mutex<Vec<String>>,
}

impl FakeMusic {
    pub fn with_tracks(n: usize) -> Self {
        let fake = Self::default();
        *fake.tracks.lock().unwrap() = (1..=n).map(track).collect();
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, op: &str) -> bool {
        self.calls()
            .iter()
            .any(|c| c.split(':').next() == Some(op))
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MusicService for FakeMusic {
    fn authorization_url(&self, scope: &str, state: &str) -> String {
        format!(
            "https://accounts.example.com/authorize?scope={}&state={}",
            scope.replace(' ', "+"),
            state
        )
    }

    async fn exchange_code(&self, code: &str) -> SpotifyResult<Credential> {
        self.record(format!("exchange:{code}"));
        if self.exchange_fails.load(Ordering::SeqCst) {
            return Err(SpotifyError::Api {
                status: 400,
                message: "invalid_grant".to_string(),
            });
        }
        Ok(fresh_credential(&format!("access-{code}")))
    }

    async fn refresh(&self, refresh_token: &str) -> SpotifyResult<Credential> {
        self.record(format!("refresh:{refresh_token}"));
        if self.refresh_fails.load(Ordering::SeqCst) {
            return Err(SpotifyError::Api {
                status: 400,
                message: "invalid_grant".to_string(),
            });
        }
        Ok(fresh_credential("refreshed"))
    }

    async fn search(&self, access_token: &str, query: &str, limit: u32) -> SpotifyResult<Vec<Track>> {
        self.record(format!("search:{access_token}:{query}:{limit}"));
        let delay = *self.search_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.search_unauthorized.load(Ordering::SeqCst) {
            return Err(SpotifyError::Unauthorized("The access token expired".to_string()));
        }
        if self.search_fails.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let tracks = self.tracks.lock().unwrap().clone();
        Ok(tracks.into_iter().take(limit as usize).collect())
    }

    async fn who_am_i(&self, access_token: &str) -> SpotifyResult<CurrentUser> {
        self.record(format!("who_am_i:{access_token}"));
        Ok(CurrentUser {
            id: format!("user-{access_token}"),
            display_name: None,
        })
    }

    async fn create_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> SpotifyResult<CreatedPlaylist> {
        self.record(format!("create:{access_token}:{owner_id}:{name}:{public}"));
        self.descriptions.lock().unwrap().push(description.to_string());
        if self.create_fails.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(CreatedPlaylist {
            id: format!("pl-{owner_id}"),
            name: name.to_string(),
            url: format!("https://open.spotify.com/playlist/pl-{owner_id}"),
        })
    }

    async fn add_items(&self, access_token: &str, playlist_id: &str, uris: &[String]) -> SpotifyResult<()> {
        self.record(format!("add:{access_token}:{playlist_id}:{}", uris.len()));
        if self.add_fails.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

/// Chat transport double: queued inbound batches, recorded outbound replies.
#[derive(Default)]
pub struct FakeChat {
    pub inbox: Mutex<VecDeque<Vec<InboundMessage>>>,
    pub sent: Mutex<Vec<(SessionId, Reply)>>,
    pub send_fails: AtomicBool,
}

impl FakeChat {
    pub fn push_batch(&self, batch: Vec<InboundMessage>) {
        self.inbox.lock().unwrap().push_back(batch);
    }

    pub fn sent(&self) -> Vec<(SessionId, Reply)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, id: SessionId) -> Vec<Reply> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| *to == id)
            .map(|(_, reply)| reply)
            .collect()
    }

    /// Waits until at least `n` replies were sent, giving spawned tasks a chance to run.
    pub async fn wait_for_sent(&self, n: usize) -> Vec<(SessionId, Reply)> {
        for _ in 0..200 {
            if self.sent.lock().unwrap().len() >= n {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl ChatTransport for FakeChat {
    async fn poll(&self) -> ChatResult<Vec<InboundMessage>> {
        let next = self.inbox.lock().unwrap().pop_front();
        match next {
            Some(batch) => Ok(batch),
            None => std::future::pending().await,
        }
    }

    async fn send(&self, session_id: SessionId, reply: &Reply) -> ChatResult<()> {
        if self.send_fails.load(Ordering::SeqCst) {
            return Err(ChatError::Api("Forbidden: bot was blocked by the user".to_string()));
        }
        self.sent.lock().unwrap().push((session_id, reply.clone()));
        Ok(())
    }
}

pub fn message(id: i64, text: &str) -> InboundMessage {
    InboundMessage {
        session_id: SessionId(id),
        text: text.to_string(),
    }
}

/// Pulls the `state` parameter out of an authorization URL.
pub fn state_of(url: &str) -> String {
    url.split("state=")
        .nth(1)
        .and_then(|rest| rest.split('&').next())
        .expect("authorization url carries a state")
        .to_string()
}
