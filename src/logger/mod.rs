//! Logger module
//!
//! Thin facade over `tracing` so call sites stay one line:
//! - Server lifecycle logging
//! - Access logging with multiple formats (target `access`)
//! - Handler process logging
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use crate::dispatch::HandlerKind;
use std::ffi::OsString;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`. Should be called once at
/// application startup.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    tracing::info!(
        interpreter = %config.compression.interpreter,
        image_script = %config.compression.image_script,
        pdf_script = %config.compression.pdf_script,
        "Compression handlers"
    );
    tracing::info!(
        "Upload dir: {} (keep uploads: {})",
        config.compression.upload_dir,
        config.compression.keep_uploads
    );
    if config.compression.handler_timeout_secs == 0 {
        log_warning("Handler timeout disabled; a hung handler blocks its request forever");
    } else {
        tracing::info!("Handler timeout: {}s", config.compression.handler_timeout_secs);
    }
    tracing::info!("Frontend dir: {}", config.frontend.dir);
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_handler_started(kind: HandlerKind, pid: Option<u32>, args: &[OsString]) {
    tracing::info!(handler = %kind, pid = ?pid, args = ?args, "Handler started");
}

pub fn log_handler_finished(kind: HandlerKind, exit_code: Option<i32>, elapsed: Duration) {
    tracing::info!(
        handler = %kind,
        exit_code = ?exit_code,
        elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        "Handler finished"
    );
}

/// One line of handler standard error; diagnostic only
pub fn log_handler_stderr(kind: HandlerKind, line: &str) {
    tracing::warn!(handler = %kind, "stderr: {line}");
}

pub fn log_shutdown_requested(signal: &str) {
    tracing::info!("{signal} received, shutting down gracefully");
}

pub fn log_shutdown_complete(drained: bool) {
    if drained {
        tracing::info!("All connections closed, bye");
    } else {
        log_warning("Shutdown timeout reached with connections still open");
    }
}
