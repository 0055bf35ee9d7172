use std::net::SocketAddr;

use crate::{
    Res,
    api::{self, AppState},
    info,
};

/// Serves the OAuth callback and health endpoints until `shutdown` resolves.
pub async fn start_api_server(
    addr: SocketAddr,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Res<()> {
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Callback server listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
