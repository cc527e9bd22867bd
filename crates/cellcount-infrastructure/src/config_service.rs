//! Configuration service implementation.
//!
//! Loads [`LabSettings`] from `~/.config/cellcount/config.toml`, applies
//! `CELLCOUNT_*` environment overrides and resolves where data goes.

use std::path::{Path, PathBuf};

use cellcount_core::config::LabSettings;
use cellcount_core::error::Result;

use crate::environment::{EnvironmentMeta, parse_hostnames};
use crate::paths::{LabPaths, StorageLayout};

pub const ENV_APP_ENV: &str = "CELLCOUNT_APP_ENV";
pub const ENV_NAMESPACE: &str = "CELLCOUNT_NAMESPACE";
pub const ENV_STAGING_HOSTNAMES: &str = "CELLCOUNT_STAGING_HOSTNAMES";
pub const ENV_HOSTNAME: &str = "CELLCOUNT_HOSTNAME";
pub const ENV_DATA_DIR: &str = "CELLCOUNT_DATA_DIR";

/// Settings plus everything resolved from them.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub settings: LabSettings,
    pub environment: EnvironmentMeta,
    pub data_dir: PathBuf,
}

impl ResolvedConfig {
    pub fn layout(&self) -> StorageLayout {
        StorageLayout::new(&self.data_dir, self.environment.namespace)
    }
}

pub struct ConfigService;

impl ConfigService {
    /// Loads settings from the default config file and the process environment.
    pub fn load() -> Result<ResolvedConfig> {
        let settings = Self::load_file(&LabPaths::config_file()?)?;
        let settings = Self::apply_overrides(settings, |key| std::env::var(key).ok());
        Self::resolve(settings)
    }

    /// Reads a settings file; a missing file yields defaults.
    pub fn load_file(path: &Path) -> Result<LabSettings> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let settings = toml::from_str(&content)?;
                tracing::debug!("[ConfigService] Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "[ConfigService] No config at {}, using defaults",
                    path.display()
                );
                Ok(LabSettings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Applies `CELLCOUNT_*` overrides read through `lookup`.
    pub fn apply_overrides(
        mut settings: LabSettings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> LabSettings {
        if let Some(value) = lookup(ENV_APP_ENV) {
            settings.app_env = Some(value);
        }
        if let Some(value) = lookup(ENV_NAMESPACE) {
            settings.namespace = Some(value);
        }
        if let Some(value) = lookup(ENV_STAGING_HOSTNAMES) {
            settings.staging_hostnames = parse_hostnames(&value);
        }
        if let Some(value) = lookup(ENV_HOSTNAME) {
            settings.hostname = Some(value);
        }
        if let Some(value) = lookup(ENV_DATA_DIR) {
            settings.data_dir = Some(value);
        }
        settings
    }

    /// Resolves tier, namespace and data directory.
    pub fn resolve(settings: LabSettings) -> Result<ResolvedConfig> {
        let hostname = settings.hostname.clone().unwrap_or_else(machine_hostname);
        let staging_hostnames: Vec<String> = settings
            .staging_hostnames
            .iter()
            .flat_map(|host| parse_hostnames(host))
            .collect();
        let environment = EnvironmentMeta::resolve(
            settings.app_env.as_deref(),
            settings.namespace.as_deref(),
            &hostname,
            &staging_hostnames,
        );
        let data_dir = match settings.data_dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => LabPaths::data_dir()?,
        };

        tracing::info!(
            "[ConfigService] env={} namespace={} host={} ({})",
            environment.app_environment,
            environment.namespace,
            environment.hostname,
            environment.host_environment
        );

        Ok(ResolvedConfig {
            settings,
            environment,
            data_dir,
        })
    }
}

fn machine_hostname() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok())
        .unwrap_or_default()
}
