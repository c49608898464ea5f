use std::fmt;

use thiserror::Error;

use crate::vault::SecretHandle;

/// The layer an error originated in.
///
/// Together with [`ErrorCode`] this forms the (domain, code) pair callers
/// match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorDomain {
    /// Argument validation in the `Vault` facade.
    Interface,
    /// The random source.
    Random,
    /// The SHA-256 engine.
    Hash,
    /// The secret store (handle lookup, allocation, attribute rules).
    Store,
    /// ECDH over Curve25519 / P-256.
    KeyAgreement,
    /// HKDF-SHA256.
    KeyDerivation,
    /// AES-GCM.
    Aead,
    /// Settings file loading.
    Config,
    /// Command-line front end.
    Cli,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Interface => "interface",
            Self::Random => "random",
            Self::Hash => "hash",
            Self::Store => "store",
            Self::KeyAgreement => "key-agreement",
            Self::KeyDerivation => "key-derivation",
            Self::Aead => "aead",
            Self::Config => "config",
            Self::Cli => "cli",
        };
        f.write_str(name)
    }
}

/// Failure kind within a domain. The numeric values are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    InvalidParam = 1,
    BufferTooSmall = 2,
    NotFound = 3,
    CryptoFailure = 4,
    Fatal = 5,
    CapacityExceeded = 6,
    Config = 7,
    Io = 8,
}

/// All errors that can occur in SealVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Argument / attribute errors ---
    #[error("{domain}: invalid parameter: {reason}")]
    InvalidParam { domain: ErrorDomain, reason: String },

    #[error("{domain}: buffer too small: {required} bytes required, {provided} provided")]
    BufferTooSmall {
        domain: ErrorDomain,
        required: usize,
        provided: usize,
    },

    // --- Store errors ---
    #[error("secret {0} not found")]
    NotFound(SecretHandle),

    #[error("secret store is full ({0} live secrets)")]
    CapacityExceeded(usize),

    // --- Crypto errors ---
    #[error("{domain}: cryptographic failure: {reason}")]
    CryptoFailure { domain: ErrorDomain, reason: String },

    #[error("random source unavailable: {0}")]
    Fatal(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    pub(crate) fn invalid(domain: ErrorDomain, reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            domain,
            reason: reason.into(),
        }
    }

    pub(crate) fn crypto(domain: ErrorDomain, reason: impl Into<String>) -> Self {
        Self::CryptoFailure {
            domain,
            reason: reason.into(),
        }
    }

    /// The layer that produced this error.
    pub fn domain(&self) -> ErrorDomain {
        match self {
            Self::InvalidParam { domain, .. }
            | Self::BufferTooSmall { domain, .. }
            | Self::CryptoFailure { domain, .. } => *domain,
            Self::NotFound(_) | Self::CapacityExceeded(_) => ErrorDomain::Store,
            Self::Fatal(_) => ErrorDomain::Random,
            Self::ConfigError(_) => ErrorDomain::Config,
            Self::Io(_) => ErrorDomain::Cli,
        }
    }

    /// The failure kind.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidParam { .. } => ErrorCode::InvalidParam,
            Self::BufferTooSmall { .. } => ErrorCode::BufferTooSmall,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::CapacityExceeded(_) => ErrorCode::CapacityExceeded,
            Self::CryptoFailure { .. } => ErrorCode::CryptoFailure,
            Self::Fatal(_) => ErrorCode::Fatal,
            Self::ConfigError(_) => ErrorCode::Config,
            Self::Io(_) => ErrorCode::Io,
        }
    }

    /// Size the caller must provide to retry a `BufferTooSmall` failure.
    pub fn required_len(&self) -> Option<usize> {
        match self {
            Self::BufferTooSmall { required, .. } => Some(*required),
            _ => None,
        }
    }
}

/// Convenience type alias for SealVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
