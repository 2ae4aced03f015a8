// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub static_files: StaticConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Static serving configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StaticConfig {
    /// Directory the server is confined to
    #[serde(default = "default_root")]
    pub root: String,
    /// Index files tried, in order, when a directory is requested
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
    /// Redirect directory requests without a trailing slash to the
    /// slash-terminated form instead of serving the index directly
    #[serde(default)]
    pub redirect_to_slash: bool,
    /// File (relative to root) served as the body of 404 responses
    #[serde(default = "default_not_found_page")]
    pub not_found_page: Option<String>,
}

fn default_root() -> String {
    ".".to_string()
}

fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

fn default_not_found_page() -> Option<String> {
    Some("404.html".to_string())
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            index_files: default_index_files(),
            redirect_to_slash: false,
            not_found_page: default_not_found_page(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}
