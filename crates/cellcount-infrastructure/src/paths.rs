//! Unified path management for cellcount files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/cellcount/                 # Config directory
//! ├── config.toml                      # LabSettings
//! └── identity                         # Anonymous identity
//!
//! ~/.local/share/cellcount/            # Data directory (or `dataDir`)
//! └── environments/<namespace>/users/<identity>/
//!     ├── sessions/current-session.json
//!     └── history/<id>.json
//! ```

use std::path::{Path, PathBuf};

use cellcount_core::error::{LabError, Result};
use cellcount_core::identity::Identity;

use crate::environment::AppEnvironment;

const APP_DIR: &str = "cellcount";
const CURRENT_SESSION_FILE: &str = "current-session.json";

/// Platform directories for the application.
pub struct LabPaths;

impl LabPaths {
    /// Returns the configuration directory (e.g., `~/.config/cellcount/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| LabError::config("Cannot find config directory"))
    }

    /// Returns the data directory (e.g., `~/.local/share/cellcount/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| LabError::config("Cannot find data directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn identity_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("identity"))
    }
}

/// Document layout below one namespace.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    /// Layout rooted at `<base>/environments/<namespace>`.
    pub fn new(base: impl AsRef<Path>, namespace: AppEnvironment) -> Self {
        Self {
            root: base
                .as_ref()
                .join("environments")
                .join(namespace.as_str()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn user_dir(&self, owner: &Identity) -> PathBuf {
        self.root.join("users").join(owner.as_str())
    }

    pub fn session_file(&self, owner: &Identity) -> PathBuf {
        self.user_dir(owner).join("sessions").join(CURRENT_SESSION_FILE)
    }

    pub fn history_dir(&self, owner: &Identity) -> PathBuf {
        self.user_dir(owner).join("history")
    }

    pub fn history_file(&self, owner: &Identity, id: &str) -> PathBuf {
        self.history_dir(owner).join(format!("{}.json", id))
    }
}
