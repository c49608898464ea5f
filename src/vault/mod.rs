//! Vault module: handle-based secret management.
//!
//! This module provides:
//! - Secret attributes, handles and key material (`secret`)
//! - The handle arena that owns and zeroizes secrets (`store`)
//! - The `Vault` facade composing the store with the crypto engines (`facade`)

pub mod facade;
pub mod secret;
pub mod store;

// Re-export the most commonly used items.
pub use facade::Vault;
pub use secret::{SecretAttributes, SecretHandle, SecretPersistence, SecretPurpose, SecretType};
pub use store::SecretStore;
