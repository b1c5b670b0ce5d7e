use std::io;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::server::worker_pool::WorkerPool;

/// Accepts connections forever, queueing each one for the workers.
///
/// Blocks on `submit` while the queue is full. Returns only when `accept`
/// fails with an error that is not tied to a single connection, or when the
/// pool can no longer take work.
pub async fn run(listener: TcpListener, pool: &WorkerPool<TcpStream>) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on {}", addr);
    }

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) if is_transient(&e) => {
                warn!(error = %e, "Accept failed for one connection");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        debug!(%peer, "Accepted connection");

        pool.submit(socket).await?;
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
    )
}
