// src/config.rs
// =============================================================================
// Runtime settings.
//
// Layers, lowest precedence first:
// 1. Built-in defaults
// 2. JSON config file (--config, else <config dir>/repo-browser/config.json)
// 3. Environment: REPO_BROWSER_URL, REPO_BROWSER_DOWNLOAD_DIR
// 4. Command-line flags (applied in main.rs)
//
// A missing config file is not an error; a malformed one is.
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "repo-browser";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the hub's /api lives
    pub base_url: String,
    /// Where downloads land unless --out is given
    pub download_dir: PathBuf,
    /// How many file previews may be in flight at once
    pub preview_concurrency: usize,
    /// Overrides the stored-credential location
    pub credential_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            download_dir: PathBuf::from("."),
            preview_concurrency: 8,
            credential_file: None,
        }
    }
}

impl Settings {
    // Loads the config file (if any) on top of the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => config_dir().join("config.json"),
        };

        let mut settings = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<Settings>(&content)
                .with_context(|| format!("invalid config file {}", path.display()))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Settings::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("could not read {}", path.display()))
            }
        };

        settings.preview_concurrency = settings.preview_concurrency.max(1);
        Ok(settings)
    }

    // Applies environment overrides; `lookup` is std::env::var in production
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("REPO_BROWSER_URL").filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(dir) = lookup("REPO_BROWSER_DOWNLOAD_DIR").filter(|v| !v.is_empty()) {
            self.download_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn credential_path(&self) -> PathBuf {
        self.credential_file
            .clone()
            .unwrap_or_else(|| config_dir().join("credential.json"))
    }
}

// Per-user config directory, e.g. ~/.config/repo-browser on Linux
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR}")))
}
