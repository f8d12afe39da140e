// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub compression: CompressionConfig,
    pub frontend: FrontendConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            workers: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive handed to `tracing-subscriber` (overridden by `RUST_LOG`)
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: "combined".to_string(),
        }
    }
}

/// Performance configuration (all timeouts in seconds)
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// How long in-flight connections may run after a shutdown signal
    pub shutdown_timeout: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
            shutdown_timeout: 30,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: concat!("squeeze/", env!("CARGO_PKG_VERSION")).to_string(),
            enable_cors: true,
            max_body_size: 52_428_800, // 50MB
        }
    }
}

/// External compression handler configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CompressionConfig {
    /// Program used to run the handler scripts
    pub interpreter: String,
    pub image_script: String,
    pub pdf_script: String,
    /// Target size passed to the handler when the form leaves it out
    pub default_target_size_kb: String,
    /// Upper bound on a single handler run; 0 waits forever
    pub handler_timeout_secs: u64,
    /// Directory receiving uploaded files before they are handed over
    pub upload_dir: String,
    /// Leave uploaded files on disk after the request completes
    pub keep_uploads: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
            image_script: "python/compress_img.py".to_string(),
            pdf_script: "python/compress_pdf.py".to_string(),
            default_target_size_kb: "500".to_string(),
            handler_timeout_secs: 300,
            upload_dir: "uploads".to_string(),
            keep_uploads: false,
        }
    }
}

/// Static frontend configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FrontendConfig {
    pub dir: String,
    pub index_file: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            dir: "frontend".to_string(),
            index_file: "index.html".to_string(),
        }
    }
}
