//! Configuration types.

use std::path::PathBuf;

/// Server configuration, read from the environment with defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: u16,
    /// Path to the libSQL database file.
    pub db_path: PathBuf,
    /// Root directory for static assets.
    pub static_dir: PathBuf,
    /// Document served for "/" (relative to `static_dir`).
    pub index_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            db_path: PathBuf::from("./data/taskdesk.db"),
            static_dir: PathBuf::from("./static"),
            index_file: "index.html".to_string(),
        }
    }
}

impl ServerConfig {
    /// Build a config from `TASKDESK_*` environment variables, falling back
    /// to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("TASKDESK_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            db_path: std::env::var("TASKDESK_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            static_dir: std::env::var("TASKDESK_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            index_file: std::env::var("TASKDESK_INDEX_FILE").unwrap_or(defaults.index_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, PathBuf::from("./data/taskdesk.db"));
        assert_eq!(config.static_dir, PathBuf::from("./static"));
        assert_eq!(config.index_file, "index.html");
    }
}
