use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{Instrument, info, warn};

use crate::config::Config;
use crate::http::connection::Connection;

/// Binds the configured address and serves forever. Failing to bind is the
/// only error this returns.
pub async fn run(cfg: Arc<Config>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("can't announce on {}", cfg.listen_addr))?;
    info!("Listening on {}", cfg.listen_addr);

    serve(listener, cfg).await
}

/// Accept loop over an already-bound listener.
pub async fn serve(listener: TcpListener, cfg: Arc<Config>) -> anyhow::Result<()> {
    info!(root = %cfg.root.display(), "Serving files");

    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                info!("Accepted connection from {}", peer);
                spawn_connection(socket, peer, Arc::clone(&cfg));
            }
            Err(e) => {
                warn!(error = %e, "accept failed");
            }
        }
    }
}

/// Starts one task that owns `socket` until its connection closes.
pub fn spawn_connection(socket: TcpStream, peer: SocketAddr, cfg: Arc<Config>) -> JoinHandle<()> {
    let span = tracing::info_span!("conn", %peer);

    tokio::spawn(
        async move {
            let mut conn = Connection::new(socket, cfg);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        }
        .instrument(span),
    )
}
