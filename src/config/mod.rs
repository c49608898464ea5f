//! Vault configuration loaded from `.sealvault.toml`.

pub mod settings;

pub use settings::VaultSettings;
