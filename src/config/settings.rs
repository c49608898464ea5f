use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::HKDF_MAX_OUTPUTS;
use crate::errors::{Result, VaultError};

/// Vault limits and logging, loaded from `.sealvault.toml`.
///
/// Every field has a sensible default so SealVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSettings {
    /// Largest buffer-type secret accepted by generate/import, in bytes.
    #[serde(default = "default_max_buffer_len")]
    pub max_buffer_len: usize,

    /// Largest output count accepted by HKDF (at most 255).
    #[serde(default = "default_max_derived_outputs")]
    pub max_derived_outputs: usize,

    /// Live-secret capacity of the store.
    #[serde(default = "default_max_secrets")]
    pub max_secrets: usize,

    /// `tracing` filter directive used by the CLI (e.g. "sealvault=debug").
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_max_buffer_len() -> usize {
    1024
}

fn default_max_derived_outputs() -> usize {
    8
}

fn default_max_secrets() -> usize {
    4096
}

fn default_log_filter() -> String {
    "warn".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            max_buffer_len: default_max_buffer_len(),
            max_derived_outputs: default_max_derived_outputs(),
            max_secrets: default_max_secrets(),
            log_filter: default_log_filter(),
        }
    }
}

impl VaultSettings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".sealvault.toml";

    /// Load settings from `<project_dir>/.sealvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = Self::path_in(project_dir);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    /// Load settings from an explicit file, which must exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path)?;

        let settings: VaultSettings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Full path of the config file inside `project_dir`.
    pub fn path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(Self::FILE_NAME)
    }

    /// Reject limits the vault cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.max_buffer_len == 0 {
            return Err(VaultError::ConfigError(
                "max_buffer_len must be at least 1".into(),
            ));
        }
        if self.max_secrets == 0 {
            return Err(VaultError::ConfigError(
                "max_secrets must be at least 1".into(),
            ));
        }
        if self.max_derived_outputs == 0 || self.max_derived_outputs > HKDF_MAX_OUTPUTS {
            return Err(VaultError::ConfigError(format!(
                "max_derived_outputs must be 1..={HKDF_MAX_OUTPUTS} (got {})",
                self.max_derived_outputs
            )));
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
