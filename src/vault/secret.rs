//! Secret attributes, handles, and the key material held by the store.
//!
//! A secret's content is a [`SecretMaterial`] variant keyed by its
//! [`SecretType`].  Every variant wipes its bytes on drop, so removing the
//! material from the store is enough to zeroize it.

use std::fmt;

use p256::elliptic_curve::sec1::ToEncodedPoint;
use x25519_dalek::StaticSecret;
use zeroize::Zeroizing;

use crate::crypto::{
    AES128_KEY_LEN, AES256_KEY_LEN, CHAIN_KEY_LEN, CURVE25519_PRIVATE_KEY_LEN,
    CURVE25519_PUBLIC_KEY_LEN, P256_PRIVATE_KEY_LEN, P256_PUBLIC_KEY_LEN,
};
use crate::errors::{ErrorDomain, Result, VaultError};

/// Kind of key material a secret holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretType {
    /// Opaque bytes of caller-chosen length.
    Buffer,
    Aes128Key,
    Aes256Key,
    Curve25519PrivateKey,
    P256PrivateKey,
    /// 32-byte symmetric chaining key (HKDF output).
    ChainKey,
}

impl SecretType {
    /// Canonical length for fixed-size types; `None` for buffers.
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            Self::Buffer => None,
            Self::Aes128Key => Some(AES128_KEY_LEN),
            Self::Aes256Key => Some(AES256_KEY_LEN),
            Self::Curve25519PrivateKey => Some(CURVE25519_PRIVATE_KEY_LEN),
            Self::P256PrivateKey => Some(P256_PRIVATE_KEY_LEN),
            Self::ChainKey => Some(CHAIN_KEY_LEN),
        }
    }

    /// Elliptic-curve private keys; their type can never change.
    pub fn is_private_key(self) -> bool {
        matches!(self, Self::Curve25519PrivateKey | Self::P256PrivateKey)
    }

    pub fn is_aes_key(self) -> bool {
        matches!(self, Self::Aes128Key | Self::Aes256Key)
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Buffer => "buffer",
            Self::Aes128Key => "aes128",
            Self::Aes256Key => "aes256",
            Self::Curve25519PrivateKey => "curve25519",
            Self::P256PrivateKey => "p256",
            Self::ChainKey => "chain-key",
        };
        f.write_str(name)
    }
}

/// What a secret is meant to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretPurpose {
    KeyAgreement,
    Epilogue,
}

/// Intended durability.  The vault keeps everything in memory; this is
/// metadata only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretPersistence {
    Ephemeral,
    Persistent,
}

/// Attributes describing a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretAttributes {
    /// Length in bytes.  Ignored by `generate` for fixed-size types.
    pub length: usize,
    pub secret_type: SecretType,
    pub purpose: SecretPurpose,
    pub persistence: SecretPersistence,
}

impl SecretAttributes {
    pub fn new(
        secret_type: SecretType,
        purpose: SecretPurpose,
        persistence: SecretPersistence,
    ) -> Self {
        Self {
            length: secret_type.fixed_len().unwrap_or(0),
            secret_type,
            purpose,
            persistence,
        }
    }

    /// Ephemeral key-agreement attributes with the canonical length.
    pub fn ephemeral(secret_type: SecretType) -> Self {
        Self::new(
            secret_type,
            SecretPurpose::KeyAgreement,
            SecretPersistence::Ephemeral,
        )
    }

    /// Ephemeral buffer attributes of `length` bytes.
    pub fn buffer(length: usize) -> Self {
        Self {
            length,
            ..Self::ephemeral(SecretType::Buffer)
        }
    }

    /// Reject type/purpose/persistence combinations the vault does not model.
    ///
    /// Persistence is only meaningful for long-term EC identity keys, and EC
    /// keys exist solely for key agreement.
    pub(crate) fn check_supported(&self) -> Result<()> {
        let is_private_key = self.secret_type.is_private_key();

        if self.persistence == SecretPersistence::Persistent && !is_private_key {
            return Err(VaultError::invalid(
                ErrorDomain::Store,
                format!("{} secrets cannot be persistent", self.secret_type),
            ));
        }
        if is_private_key && self.purpose != SecretPurpose::KeyAgreement {
            return Err(VaultError::invalid(
                ErrorDomain::Store,
                format!("{} keys must have key-agreement purpose", self.secret_type),
            ));
        }
        Ok(())
    }
}

/// Opaque reference to a store-owned secret.
///
/// The slot index is reused after destruction, but the generation is bumped
/// so stale handles never resolve to a newer secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SecretHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for SecretHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// Key material, one variant per [`SecretType`].
pub(crate) enum SecretMaterial {
    Buffer(Zeroizing<Vec<u8>>),
    Aes128(Zeroizing<[u8; AES128_KEY_LEN]>),
    Aes256(Zeroizing<[u8; AES256_KEY_LEN]>),
    Curve25519(StaticSecret),
    P256(p256::SecretKey),
    ChainKey(Zeroizing<[u8; CHAIN_KEY_LEN]>),
}

impl fmt::Debug for SecretMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretMaterial")
            .field("type", &self.secret_type())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl SecretMaterial {
    /// Build material of type `secret_type` from raw bytes.
    ///
    /// Fixed-size types require the exact canonical length; buffers accept
    /// `1..=max_buffer_len` bytes.  P-256 scalars must lie in `[1, n)`.
    pub fn from_bytes(
        secret_type: SecretType,
        bytes: &[u8],
        max_buffer_len: usize,
    ) -> Result<Self> {
        match secret_type.fixed_len() {
            Some(expected) if bytes.len() != expected => {
                return Err(VaultError::invalid(
                    ErrorDomain::Store,
                    format!(
                        "{secret_type} secrets must be {expected} bytes, got {}",
                        bytes.len()
                    ),
                ));
            }
            None if bytes.is_empty() || bytes.len() > max_buffer_len => {
                return Err(VaultError::invalid(
                    ErrorDomain::Store,
                    format!(
                        "buffer secrets must be 1..={max_buffer_len} bytes, got {}",
                        bytes.len()
                    ),
                ));
            }
            _ => {}
        }

        let material = match secret_type {
            SecretType::Buffer => Self::Buffer(Zeroizing::new(bytes.to_vec())),
            SecretType::Aes128Key => Self::Aes128(Zeroizing::new(fixed(bytes)?)),
            SecretType::Aes256Key => Self::Aes256(Zeroizing::new(fixed(bytes)?)),
            SecretType::ChainKey => Self::ChainKey(Zeroizing::new(fixed(bytes)?)),
            SecretType::Curve25519PrivateKey => {
                let scalar: Zeroizing<[u8; CURVE25519_PRIVATE_KEY_LEN]> =
                    Zeroizing::new(fixed(bytes)?);
                Self::Curve25519(StaticSecret::from(*scalar))
            }
            SecretType::P256PrivateKey => {
                let key = p256::SecretKey::from_slice(bytes).map_err(|_| {
                    VaultError::invalid(ErrorDomain::Store, "P-256 scalar is out of range")
                })?;
                Self::P256(key)
            }
        };
        Ok(material)
    }

    pub fn secret_type(&self) -> SecretType {
        match self {
            Self::Buffer(_) => SecretType::Buffer,
            Self::Aes128(_) => SecretType::Aes128Key,
            Self::Aes256(_) => SecretType::Aes256Key,
            Self::Curve25519(_) => SecretType::Curve25519PrivateKey,
            Self::P256(_) => SecretType::P256PrivateKey,
            Self::ChainKey(_) => SecretType::ChainKey,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Buffer(bytes) => bytes.len(),
            other => other.secret_type().fixed_len().unwrap_or(0),
        }
    }

    /// Copy of the raw content, wiped when the returned value drops.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        match self {
            Self::Buffer(bytes) => Zeroizing::new(bytes.to_vec()),
            Self::Aes128(key) => Zeroizing::new(key.to_vec()),
            Self::Aes256(key) | Self::ChainKey(key) => Zeroizing::new(key.to_vec()),
            Self::Curve25519(key) => Zeroizing::new(key.as_bytes().to_vec()),
            Self::P256(key) => Zeroizing::new(key.to_bytes().to_vec()),
        }
    }

    /// Public key for EC private keys: 32 bytes for Curve25519, 65-byte
    /// uncompressed SEC1 point for P-256.
    pub fn public_key(&self) -> Result<Vec<u8>> {
        match self {
            Self::Curve25519(key) => {
                let public = x25519_dalek::PublicKey::from(key);
                debug_assert_eq!(public.as_bytes().len(), CURVE25519_PUBLIC_KEY_LEN);
                Ok(public.as_bytes().to_vec())
            }
            Self::P256(key) => {
                let point = key.public_key().to_encoded_point(false);
                debug_assert_eq!(point.as_bytes().len(), P256_PUBLIC_KEY_LEN);
                Ok(point.as_bytes().to_vec())
            }
            other => Err(VaultError::invalid(
                ErrorDomain::Store,
                format!("{} secrets have no public key", other.secret_type()),
            )),
        }
    }

    /// Reinterpret this material as `target`.
    ///
    /// EC private keys are fixed for life, and nothing may become one here
    /// because curve validation only runs on generate/import.
    pub fn retype(&self, target: SecretType, max_buffer_len: usize) -> Result<Self> {
        let current = self.secret_type();
        if current.is_private_key() {
            return Err(VaultError::invalid(
                ErrorDomain::Store,
                format!("{current} secrets cannot change type"),
            ));
        }
        if target.is_private_key() {
            return Err(VaultError::invalid(
                ErrorDomain::Store,
                format!("cannot convert a {current} secret into a {target} key"),
            ));
        }
        let bytes = self.to_bytes();
        Self::from_bytes(target, &bytes, max_buffer_len.max(bytes.len()))
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        VaultError::invalid(
            ErrorDomain::Store,
            format!("expected {N} bytes, got {}", bytes.len()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn fixed_lengths_match_constants() {
        assert_eq!(SecretType::Aes128Key.fixed_len(), Some(16));
        assert_eq!(SecretType::Aes256Key.fixed_len(), Some(32));
        assert_eq!(SecretType::Curve25519PrivateKey.fixed_len(), Some(32));
        assert_eq!(SecretType::P256PrivateKey.fixed_len(), Some(32));
        assert_eq!(SecretType::ChainKey.fixed_len(), Some(32));
        assert_eq!(SecretType::Buffer.fixed_len(), None);
    }

    #[test]
    fn persistent_buffer_is_unsupported() {
        let attrs = SecretAttributes {
            persistence: SecretPersistence::Persistent,
            ..SecretAttributes::buffer(8)
        };
        assert_eq!(attrs.check_supported().unwrap_err().code(), ErrorCode::InvalidParam);
    }

    #[test]
    fn persistent_ec_key_is_supported() {
        let attrs = SecretAttributes::new(
            SecretType::P256PrivateKey,
            SecretPurpose::KeyAgreement,
            SecretPersistence::Persistent,
        );
        assert!(attrs.check_supported().is_ok());
    }

    #[test]
    fn ec_key_with_epilogue_purpose_is_unsupported() {
        let attrs = SecretAttributes::new(
            SecretType::Curve25519PrivateKey,
            SecretPurpose::Epilogue,
            SecretPersistence::Ephemeral,
        );
        assert!(attrs.check_supported().is_err());
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        let err = SecretMaterial::from_bytes(SecretType::Aes128Key, &[0u8; 15], 64).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParam);
        assert!(SecretMaterial::from_bytes(SecretType::Buffer, &[], 64).is_err());
        assert!(SecretMaterial::from_bytes(SecretType::Buffer, &[1u8; 65], 64).is_err());
    }

    #[test]
    fn from_bytes_rejects_zero_p256_scalar() {
        let err =
            SecretMaterial::from_bytes(SecretType::P256PrivateKey, &[0u8; 32], 64).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParam);
    }

    #[test]
    fn retype_buffer_to_aes_key() {
        let buffer = SecretMaterial::from_bytes(SecretType::Buffer, &[7u8; 16], 64).unwrap();
        let key = buffer.retype(SecretType::Aes128Key, 64).unwrap();
        assert_eq!(key.secret_type(), SecretType::Aes128Key);
        assert_eq!(key.to_bytes().as_slice(), &[7u8; 16]);
    }

    #[test]
    fn retype_never_produces_or_changes_ec_keys() {
        let buffer = SecretMaterial::from_bytes(SecretType::Buffer, &[7u8; 32], 64).unwrap();
        assert!(buffer.retype(SecretType::Curve25519PrivateKey, 64).is_err());

        let ec =
            SecretMaterial::from_bytes(SecretType::Curve25519PrivateKey, &[9u8; 32], 64).unwrap();
        assert!(ec.retype(SecretType::Buffer, 64).is_err());
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = SecretMaterial::from_bytes(SecretType::Aes256Key, &[0x41u8; 32], 64).unwrap();
        let printed = format!("{key:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("65, 65"));
    }
}
