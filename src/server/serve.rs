// Server loop module
// Accepts connections until the shutdown future resolves, then drains

use hyper_util::server::graceful::GracefulShutdown;
use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop on `listener`.
///
/// Once `shutdown` resolves the listener is closed, in-flight connections
/// are given `performance.shutdown_timeout` seconds to finish, and the
/// function returns.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections, &graceful);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => break,
        }
    }

    // Stop accepting before waiting on the stragglers
    drop(listener);

    let grace = Duration::from_secs(state.config.performance.shutdown_timeout);
    let drained = tokio::time::timeout(grace, graceful.shutdown()).await.is_ok();
    logger::log_shutdown_complete(drained);
}
