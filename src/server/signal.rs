// Signal handling module
//
// SIGTERM and SIGINT trigger a graceful shutdown; elsewhere only Ctrl+C.

use crate::logger;

/// Resolve once the process is asked to stop
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => logger::log_shutdown_requested("SIGTERM"),
                    _ = sigint.recv() => logger::log_shutdown_requested("SIGINT"),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => logger::log_warning(&format!(
                "Failed to register signal handlers: {e}; falling back to Ctrl+C"
            )),
        }
    }

    wait_ctrl_c().await;
}

async fn wait_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logger::log_shutdown_requested("Ctrl+C"),
        Err(e) => {
            logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
            std::future::pending::<()>().await;
        }
    }
}
