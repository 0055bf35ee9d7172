use std::sync::Arc;

use crate::{
    error::{AssemblyError, ParseError},
    info,
    management::{AuthorizationBroker, PlaylistAssembler, SessionDirectory},
    success,
    telegram::ChatTransport,
    types::{InboundMessage, PlaylistOutcome, PlaylistRequest, Reply, SessionId},
    utils::{self, escape_html},
    warning,
};

const WELCOME: &str = "Send me a description of the playlist you want and, optionally, how many songs \
(e.g. \"50 songs of kpop\"). Up to 50 songs per playlist.\n\n\
/login connects your Spotify account, /logout forgets it.";

const EMPTY_REQUEST: &str =
    "Tell me what the playlist should contain, not just a number. For example: \"50 songs of kpop\".";

/// Longest slice of the user's query repeated back in a reply.
const MAX_ECHOED_QUERY_CHARS: usize = 200;

const REMOTE_UNAVAILABLE: &str = "Spotify is not responding right now. Please try again in a moment.";

/// Answers one chat message.
///
/// Every outcome, including every error, ends as a reply in the chat; a
/// failing message never takes the dispatch loop down.
pub struct MessageHandler {
    chat: Arc<dyn ChatTransport>,
    sessions: Arc<SessionDirectory>,
    broker: Arc<AuthorizationBroker>,
    assembler: Arc<PlaylistAssembler>,
}

impl MessageHandler {
    pub fn new(
        chat: Arc<dyn ChatTransport>,
        sessions: Arc<SessionDirectory>,
        broker: Arc<AuthorizationBroker>,
        assembler: Arc<PlaylistAssembler>,
    ) -> Self {
        Self {
            chat,
            sessions,
            broker,
            assembler,
        }
    }

    pub async fn handle(&self, message: InboundMessage) {
        let text = message.text.trim();
        if let Some(command) = text.strip_prefix('/') {
            self.handle_command(message.session_id, command).await;
        } else {
            self.handle_request(message.session_id, text).await;
        }
    }

    async fn handle_command(&self, id: SessionId, command: &str) {
        // "/start@SomeBot args" -> "start"
        let name = command
            .split_whitespace()
            .next()
            .and_then(|c| c.split('@').next())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match name.as_str() {
            "login" => {
                self.send_login_link(id, "Open this link to connect your Spotify account:")
                    .await
            }
            "logout" => {
                self.sessions.clear_credential(id).await;
                self.reply(id, Reply::plain("Your Spotify account was disconnected."))
                    .await;
            }
            _ => self.reply(id, Reply::plain(WELCOME)).await,
        }
    }

    async fn handle_request(&self, id: SessionId, text: &str) {
        let request = match utils::parse_request(text) {
            Ok(request) => request,
            Err(ParseError::Empty) => {
                self.reply(id, Reply::plain(EMPTY_REQUEST)).await;
                return;
            }
        };

        let handle = self.sessions.session(id).await;
        let mut session = handle.lock().await;
        let Some(credential) = session.credential.as_mut() else {
            drop(session);
            self.send_login_link(id, "First connect your Spotify account, then send your request again:")
                .await;
            return;
        };

        info!("Chat {} requested {} tracks for '{}'", id, request.limit(), request.query);
        self.reply(id, progress_reply(&request)).await;

        match self.assembler.build_playlist(credential, &request).await {
            Ok(PlaylistOutcome::Created { playlist, tracks }) => {
                drop(session);
                success!("Playlist {} created for chat {}", playlist.id, id);
                let text = format!(
                    "Here is your playlist: <a href=\"{}\">{}</a> ({} songs)",
                    escape_html(&playlist.url),
                    escape_html(&playlist.name),
                    tracks
                );
                self.reply(id, Reply::html(text)).await;
            }
            Ok(PlaylistOutcome::NoResults) => {
                drop(session);
                let text = format!(
                    "I couldn't find any songs for '{}'. Try different words.",
                    utils::excerpt(&request.query, MAX_ECHOED_QUERY_CHARS)
                );
                self.reply(id, Reply::plain(text)).await;
            }
            Err(AssemblyError::AuthExpired) => {
                session.credential = None;
                drop(session);
                self.send_login_link(id, "Your Spotify authorization expired. Please connect again:")
                    .await;
            }
            Err(AssemblyError::RemoteUnavailable(e)) => {
                drop(session);
                warning!("Playlist for chat {} failed: {}", id, e);
                self.reply(id, Reply::plain(REMOTE_UNAVAILABLE)).await;
            }
            Err(AssemblyError::PartialPlaylistFailure {
                url,
                added,
                expected,
                source,
            }) => {
                drop(session);
                warning!("Playlist for chat {} only partially filled: {}", id, source);
                let text = format!(
                    "The playlist was created but only {} of {} songs could be added: <a href=\"{}\">open playlist</a>",
                    added,
                    expected,
                    escape_html(&url)
                );
                self.reply(id, Reply::html(text)).await;
            }
        }
    }

    async fn send_login_link(&self, id: SessionId, intro: &str) {
        let url = self.broker.begin_authorization(id).await;
        info!("Issued login link for chat {}", id);
        let text = format!(
            "{}\n<a href=\"{}\">Connect Spotify</a>",
            escape_html(intro),
            escape_html(&url)
        );
        self.reply(id, Reply::html(text)).await;
    }

    async fn reply(&self, id: SessionId, reply: Reply) {
        if let Err(e) = self.chat.send(id, &reply).await {
            warning!("Failed to send reply to chat {}: {}", id, e);
        }
    }
}

fn progress_reply(request: &PlaylistRequest) -> Reply {
    let limit = request.limit();
    let query = utils::excerpt(&request.query, MAX_ECHOED_QUERY_CHARS);
    let text = if limit < request.count {
        format!(
            "Searching {} songs (the most I can add at once) for '{}'...",
            limit, query
        )
    } else {
        format!("Searching {} songs for '{}'...", limit, query)
    };
    Reply::plain(text)
}
