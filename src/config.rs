use std::path::{Path, PathBuf};

/// Address the server listens on: all interfaces, port 8080.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Immutable server configuration, built once at startup and shared
/// read-only by every connection.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// Directory tree exposed by the server.
    pub root: PathBuf,
}

impl Config {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            root: root.into(),
        }
    }

    pub fn with_listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
