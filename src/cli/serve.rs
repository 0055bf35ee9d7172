use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle, time::sleep};

use crate::{
    Res,
    api::AppState,
    config::Config,
    info,
    management::{AuthorizationBroker, PlaylistAssembler, SessionDirectory},
    server::start_api_server,
    spotify::{MusicService, SpotifyClient},
    success,
    telegram::{ChatTransport, TelegramClient},
    types::InboundMessage,
    warning,
};

use super::MessageHandler;

/// Pause after a failed poll before asking Telegram again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Runs the bot against the real Telegram and Spotify APIs.
pub async fn serve(config: Config) -> Res<()> {
    let music: Arc<dyn MusicService> = Arc::new(SpotifyClient::new(&config.spotify)?);
    let chat: Arc<dyn ChatTransport> = Arc::new(TelegramClient::new(
        &config.telegram_api_url,
        &config.telegram_token,
        config.poll_timeout,
    )?);

    run(&config, music, chat).await
}

/// Wires the session directory into the chat loop and the callback server
/// and runs both until Ctrl-C.
pub async fn run(config: &Config, music: Arc<dyn MusicService>, chat: Arc<dyn ChatTransport>) -> Res<()> {
    let sessions = Arc::new(SessionDirectory::new());
    let broker = Arc::new(AuthorizationBroker::new(
        Arc::clone(&music),
        Arc::clone(&chat),
        Arc::clone(&sessions),
    ));
    let assembler = Arc::new(PlaylistAssembler::new(music, config.playlist_public));
    let handler = Arc::new(MessageHandler::new(
        Arc::clone(&chat),
        Arc::clone(&sessions),
        Arc::clone(&broker),
        assembler,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut server_shutdown = shutdown_rx.clone();
    let mut server = tokio::spawn(start_api_server(
        config.server_address,
        AppState { broker, sessions },
        async move {
            let _ = server_shutdown.changed().await;
        },
    ));

    let dispatcher = tokio::spawn(dispatch(chat, handler, config.request_delay, shutdown_rx));
    success!("Bot started, waiting for messages");

    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        res = &mut server => {
            let _ = shutdown_tx.send(true);
            dispatcher.await?;
            res??;
            return Err("callback server stopped unexpectedly".into());
        }
    }
    info!("Shutting down");
    let _ = shutdown_tx.send(true);

    dispatcher.await?;
    server.await??;
    Ok(())
}

/// Polls the chat transport and hands every message to its own task.
///
/// The loop never waits on a message being handled, so a slow playlist or
/// the per-request `delay` of one chat never holds up another.
pub async fn dispatch(
    chat: Arc<dyn ChatTransport>,
    handler: Arc<MessageHandler>,
    delay: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let batch = tokio::select! {
            _ = shutdown.changed() => break,
            batch = chat.poll() => batch,
        };

        match batch {
            Ok(messages) => {
                for message in messages {
                    schedule(Arc::clone(&handler), message, delay);
                }
            }
            Err(e) => {
                warning!("Failed to poll chat updates: {}", e);
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = sleep(POLL_RETRY_DELAY) => {}
                }
            }
        }
    }
}

/// Handles `message` on a new task after `delay`.
pub fn schedule(handler: Arc<MessageHandler>, message: InboundMessage, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            sleep(delay).await;
        }
        handler.handle(message).await;
    })
}
