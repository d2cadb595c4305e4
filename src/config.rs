//! Environment configuration.
//!
//! - `CADLINK_HOST` - bind host (default: `localhost`)
//! - `CADLINK_PORT` - bind port (default: `8009`)
//! - `CADLINK_EXPORT_DIR` - directory STL filenames resolve under (default: `.`)
//! - `CADLINK_UNDO_DEPTH` - undo steps kept per document (default: `50`)
//! - `CADLINK_URL` - endpoint the MCP façade relays to (default: built from host and port)

use std::path::PathBuf;

use crate::kernel::DEFAULT_UNDO_DEPTH;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8009;

/// Settings for `cadlink serve`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub export_dir: PathBuf,
    pub undo_depth: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            export_dir: PathBuf::from("."),
            undo_depth: DEFAULT_UNDO_DEPTH,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparsable numbers fall back
    /// to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("CADLINK_HOST")
                .filter(|h| !h.is_empty())
                .unwrap_or(defaults.host),
            port: parse_port(lookup("CADLINK_PORT")).unwrap_or(defaults.port),
            export_dir: lookup("CADLINK_EXPORT_DIR")
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            undo_depth: lookup("CADLINK_UNDO_DEPTH")
                .and_then(|d| d.trim().parse().ok())
                .unwrap_or(defaults.undo_depth),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// URL of the command endpoint for clients.
pub fn endpoint_url_from_env() -> String {
    endpoint_url(|key| std::env::var(key).ok())
}

pub fn endpoint_url(lookup: impl Fn(&str) -> Option<String>) -> String {
    if let Some(url) = lookup("CADLINK_URL").filter(|u| !u.is_empty()) {
        return url;
    }
    let host = lookup("CADLINK_HOST")
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = parse_port(lookup("CADLINK_PORT")).unwrap_or(DEFAULT_PORT);
    format!("http://{}:{}/", host, port)
}

fn parse_port(value: Option<String>) -> Option<u16> {
    value.and_then(|p| p.trim().parse().ok())
}
