//! # Telegram Chat Transport
//!
//! Receives chat messages through Bot API long polling (`getUpdates`) and
//! answers through `sendMessage`. The rest of the crate talks to the chat
//! platform only through [`ChatTransport`].
//!
//! The bot token is part of every request URL, so transport errors are
//! stripped of their URL before they are returned or logged.

use std::{
    fmt,
    sync::atomic::{AtomicI64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    error::{ChatError, ChatResult},
    types::{
        InboundMessage, Message, Reply, ReplyFormat, SendMessageRequest, SessionId,
        TelegramResponse, Update,
    },
};

/// Headroom on top of the long-poll timeout for the HTTP request itself.
const POLL_GRACE_SECS: u64 = 10;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Chat platform the bot talks through.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Waits for the next batch of inbound text messages.
    async fn poll(&self) -> ChatResult<Vec<InboundMessage>>;

    async fn send(&self, session_id: SessionId, reply: &Reply) -> ChatResult<()>;
}

pub struct TelegramClient {
    http_client: Client,
    base_url: String,
    poll_timeout: Duration,
    offset: AtomicI64,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("token", &"[REDACTED]")
            .field("poll_timeout", &self.poll_timeout)
            .field("offset", &self.offset.load(Ordering::Relaxed))
            .finish()
    }
}

impl TelegramClient {
    /// Creates a client for the bot identified by `token`.
    ///
    /// `api_url` is the Bot API root (`https://api.telegram.org`).
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> ChatResult<Self> {
        let http_client = Client::builder()
            .timeout(poll_timeout + Duration::from_secs(POLL_GRACE_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ChatError::Http(e.without_url()))?;

        Ok(Self {
            http_client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout,
            offset: AtomicI64::new(0),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ChatResult<T> {
        let res = request.send().await.map_err(|e| ChatError::Http(e.without_url()))?;
        let body: TelegramResponse<T> = res.json().await.map_err(|e| ChatError::Http(e.without_url()))?;

        match body {
            TelegramResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            TelegramResponse { description, .. } => Err(ChatError::Api(
                description.unwrap_or_else(|| "request failed".to_string()),
            )),
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn poll(&self) -> ChatResult<Vec<InboundMessage>> {
        let offset = self.offset.load(Ordering::SeqCst).to_string();
        let timeout = self.poll_timeout.as_secs().to_string();
        let request = self.http_client.get(self.method_url("getUpdates")).query(&[
            ("offset", offset.as_str()),
            ("timeout", timeout.as_str()),
            ("allowed_updates", "[\"message\"]"),
        ]);

        let updates: Vec<Update> = self.call(request).await?;
        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            // acknowledges everything up to `last`, text or not
            self.offset.store(last + 1, Ordering::SeqCst);
        }

        Ok(updates
            .into_iter()
            .filter_map(|update| match update.message {
                Some(Message {
                    chat,
                    text: Some(text),
                    ..
                }) => Some(InboundMessage {
                    session_id: SessionId(chat.id),
                    text,
                }),
                _ => None,
            })
            .collect())
    }

    async fn send(&self, session_id: SessionId, reply: &Reply) -> ChatResult<()> {
        let body = SendMessageRequest {
            chat_id: session_id.0,
            text: &reply.text,
            parse_mode: match reply.format {
                ReplyFormat::Plain => None,
                ReplyFormat::Html => Some("HTML"),
            },
            disable_web_page_preview: true,
        };

        let request = self.http_client.post(self.method_url("sendMessage")).json(&body);
        let _: Message = self.call(request).await?;
        Ok(())
    }
}
