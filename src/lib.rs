pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod vault;

pub use errors::{ErrorCode, ErrorDomain, Result, VaultError};
pub use vault::{
    SecretAttributes, SecretHandle, SecretPersistence, SecretPurpose, SecretType, Vault,
};
