//! Deployment tier and storage namespace resolution.
//!
//! Every document lives under `environments/<namespace>/…`, so a local or
//! staging install can never write into production data. A local or staging
//! host always overrides whatever was configured.

use std::fmt;

/// Deployment tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppEnvironment {
    Production,
    Staging,
    Local,
}

impl AppEnvironment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Local => "local",
        }
    }

    fn is_guarded(self) -> bool {
        matches!(self, Self::Local | Self::Staging)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `production`, `staging` or `local` in any case; anything else is `None`.
pub fn normalize_environment(value: &str) -> Option<AppEnvironment> {
    match value.trim().to_lowercase().as_str() {
        "production" => Some(AppEnvironment::Production),
        "staging" => Some(AppEnvironment::Staging),
        "local" => Some(AppEnvironment::Local),
        _ => None,
    }
}

/// Splits a comma-separated host list, lowercased, empties dropped.
pub fn parse_hostnames(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|host| host.trim().to_lowercase())
        .filter(|host| !host.is_empty())
        .collect()
}

fn is_local_hostname(hostname: &str) -> bool {
    matches!(hostname, "localhost" | "127.0.0.1" | "0.0.0.0") || hostname.ends_with(".local")
}

fn is_staging_hostname(hostname: &str, staging_hostnames: &[String]) -> bool {
    if hostname.is_empty() {
        return false;
    }
    staging_hostnames.iter().any(|host| host == hostname) || hostname.contains("staging")
}

/// Tier implied by the host name alone.
pub fn detect_host_environment(hostname: &str, staging_hostnames: &[String]) -> AppEnvironment {
    let hostname = hostname.trim().to_lowercase();
    if is_local_hostname(&hostname) {
        AppEnvironment::Local
    } else if is_staging_hostname(&hostname, staging_hostnames) {
        AppEnvironment::Staging
    } else {
        AppEnvironment::Production
    }
}

/// Tier the app runs as.
pub fn resolve_runtime_environment(
    configured: Option<&str>,
    hostname: &str,
    staging_hostnames: &[String],
) -> AppEnvironment {
    let host_environment = detect_host_environment(hostname, staging_hostnames);
    if host_environment.is_guarded() {
        return host_environment;
    }
    configured
        .and_then(normalize_environment)
        .unwrap_or(host_environment)
}

/// Namespace data is stored under.
pub fn resolve_namespace(
    configured: Option<&str>,
    runtime: Option<AppEnvironment>,
    host_environment: AppEnvironment,
) -> AppEnvironment {
    if host_environment.is_guarded() {
        return host_environment;
    }
    configured
        .and_then(normalize_environment)
        .or(runtime)
        .unwrap_or(AppEnvironment::Production)
}

/// Everything resolved at startup, for logging and path building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentMeta {
    pub app_environment: AppEnvironment,
    pub namespace: AppEnvironment,
    pub host_environment: AppEnvironment,
    pub hostname: String,
}

impl EnvironmentMeta {
    pub fn resolve(
        configured_environment: Option<&str>,
        configured_namespace: Option<&str>,
        hostname: &str,
        staging_hostnames: &[String],
    ) -> Self {
        let host_environment = detect_host_environment(hostname, staging_hostnames);
        let app_environment =
            resolve_runtime_environment(configured_environment, hostname, staging_hostnames);
        let namespace = resolve_namespace(configured_namespace, Some(app_environment), host_environment);
        Self {
            app_environment,
            namespace,
            host_environment,
            hostname: hostname.trim().to_lowercase(),
        }
    }
}
