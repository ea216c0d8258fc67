//! Server configuration.
//!
//! Read from `config.toml` next to the binary when present; every field
//! has a sensible default so the file is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Path to the quest catalog JSON file.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/quests.json")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            catalog_path: default_catalog_path(),
        }
    }
}

impl ServerConfig {
    /// Load configuration, falling back to defaults if the file is absent
    /// or unparseable.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {:?}, using defaults: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
