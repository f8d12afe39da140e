// Server module
// Listener setup, the accept loop and shutdown signalling

pub mod connection;
pub mod listener;
pub mod serve;
pub mod signal;

pub use listener::create_reusable_listener;
pub use serve::serve;
pub use signal::shutdown_signal;

use std::sync::Arc;

use crate::config::{AppState, Config};
use crate::dispatch::ProcessRunner;
use crate::logger;

/// Bind, serve until SIGINT/SIGTERM, then drain.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = config.get_socket_addr()?;
    let listener = create_reusable_listener(addr)?;

    let runner = ProcessRunner::from_config(&config.compression);
    runner.check_scripts();

    let state = Arc::new(AppState::new(config, Arc::new(runner)));
    logger::log_server_start(&addr, &state.config);

    serve(listener, state, shutdown_signal()).await;
    Ok(())
}
