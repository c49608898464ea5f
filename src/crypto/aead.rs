//! AES-GCM authenticated encryption keyed by a vault secret.
//!
//! The 96-bit IV is built from the caller's 16-bit nonce:
//!   [ 10 zero bytes | nonce (big-endian u16) ]
//!
//! Layout of the ciphertext buffer:
//!   [ ciphertext | 16-byte auth tag ]
//!
//! Callers must never reuse a nonce with the same key.

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use tracing::warn;
use zeroize::Zeroizing;

use super::{AEAD_IV_LEN, AEAD_TAG_LEN};
use crate::errors::{ErrorDomain, Result, VaultError};
use crate::vault::secret::SecretMaterial;

/// Expand a 16-bit nonce into the 96-bit AES-GCM IV.
pub fn nonce_to_iv(nonce: u16) -> [u8; AEAD_IV_LEN] {
    let mut iv = [0u8; AEAD_IV_LEN];
    iv[AEAD_IV_LEN - 2..].copy_from_slice(&nonce.to_be_bytes());
    iv
}

enum Cipher {
    Aes128(Aes128Gcm),
    Aes256(Aes256Gcm),
}

impl Cipher {
    fn for_key(key: &SecretMaterial) -> Result<Self> {
        let cipher = match key {
            SecretMaterial::Aes128(bytes) => {
                Aes128Gcm::new_from_slice(bytes.as_slice()).map(Self::Aes128)
            }
            SecretMaterial::Aes256(bytes) => {
                Aes256Gcm::new_from_slice(bytes.as_slice()).map(Self::Aes256)
            }
            other => {
                return Err(VaultError::invalid(
                    ErrorDomain::Aead,
                    format!("AES-GCM requires an AES key, got {}", other.secret_type()),
                ));
            }
        };
        cipher.map_err(|e| {
            VaultError::invalid(ErrorDomain::Aead, format!("invalid key length: {e}"))
        })
    }

    fn encrypt(&self, iv: &Nonce<U12>, payload: Payload<'_, '_>) -> aes_gcm::aead::Result<Vec<u8>> {
        match self {
            Self::Aes128(cipher) => cipher.encrypt(iv, payload),
            Self::Aes256(cipher) => cipher.encrypt(iv, payload),
        }
    }

    fn decrypt(&self, iv: &Nonce<U12>, payload: Payload<'_, '_>) -> aes_gcm::aead::Result<Vec<u8>> {
        match self {
            Self::Aes128(cipher) => cipher.decrypt(iv, payload),
            Self::Aes256(cipher) => cipher.decrypt(iv, payload),
        }
    }
}

/// Encrypt `plaintext`, returning `ciphertext || tag`.
pub(crate) fn encrypt(
    key: &SecretMaterial,
    nonce: u16,
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Cipher::for_key(key)?;
    let iv = nonce_to_iv(nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), Payload { msg: plaintext, aad })
        .map_err(|e| VaultError::crypto(ErrorDomain::Aead, format!("encryption error: {e}")))?;

    debug_assert_eq!(ciphertext.len(), plaintext.len() + AEAD_TAG_LEN);
    Ok(ciphertext)
}

/// Verify and decrypt `ciphertext || tag`.
///
/// The tag is checked before any keystream is applied, so a forged message
/// never yields plaintext bytes.
pub(crate) fn decrypt(
    key: &SecretMaterial,
    nonce: u16,
    aad: &[u8],
    ciphertext_and_tag: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = Cipher::for_key(key)?;

    if ciphertext_and_tag.len() < AEAD_TAG_LEN {
        return Err(VaultError::invalid(
            ErrorDomain::Aead,
            format!(
                "ciphertext must be at least {AEAD_TAG_LEN} bytes, got {}",
                ciphertext_and_tag.len()
            ),
        ));
    }

    let iv = nonce_to_iv(nonce);
    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: ciphertext_and_tag,
                aad,
            },
        )
        .map_err(|_| {
            warn!(nonce, "AES-GCM authentication failed");
            VaultError::crypto(ErrorDomain::Aead, "authentication tag mismatch")
        })?;

    Ok(Zeroizing::new(plaintext))
}
