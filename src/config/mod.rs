// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::{
    CompressionConfig, Config, FrontendConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    ServerConfig,
};

/// Prefix for environment overrides, e.g. `SQUEEZE_COMPRESSION__INTERPRETER=python3`
const ENV_PREFIX: &str = "SQUEEZE";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    ///
    /// The `PORT` environment variable, when set, wins over every other source.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::build(config_path, std::env::var("PORT").ok())
    }

    fn build(config_path: &str, port: Option<String>) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", port)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Upper bound on a single request: one handler run plus the socket
    /// timeouts around it. `None` when handlers are unbounded.
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.compression.handler_timeout_secs == 0 {
            return None;
        }
        let io = std::cmp::max(self.performance.read_timeout, self.performance.write_timeout);
        Some(Duration::from_secs(
            io.saturating_add(self.compression.handler_timeout_secs),
        ))
    }
}
