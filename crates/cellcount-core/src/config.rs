use serde::{Deserialize, Serialize};

pub const DEFAULT_DEBOUNCE_MS: u64 = 1_000;
pub const DEFAULT_NOTICE_CLEAR_MS: u64 = 3_000;

/// Settings read from `config.toml` and the environment.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LabSettings {
    /// Quiet period before a changed session is written.
    pub debounce_ms: u64,
    /// How long a validation or storage error stays visible.
    pub notice_clear_ms: u64,
    /// Overrides the platform data directory.
    pub data_dir: Option<String>,
    /// Configured deployment tier (`production`, `staging`, `local`).
    pub app_env: Option<String>,
    /// Configured storage namespace.
    pub namespace: Option<String>,
    pub staging_hostnames: Vec<String>,
    /// Host name used for tier detection; the machine's own when unset.
    pub hostname: Option<String>,
}

impl Default for LabSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            notice_clear_ms: DEFAULT_NOTICE_CLEAR_MS,
            data_dir: None,
            app_env: None,
            namespace: None,
            staging_hostnames: Vec::new(),
            hostname: None,
        }
    }
}
