//! Diffie-Hellman key agreement over Curve25519 and P-256.
//!
//! The curve is implied by the private key's type.  Peer keys are raw
//! 32-byte Montgomery u-coordinates for Curve25519 and 65-byte uncompressed
//! SEC1 points for P-256.

use tracing::warn;
use zeroize::Zeroizing;

use super::{CURVE25519_PUBLIC_KEY_LEN, P256_PUBLIC_KEY_LEN, SHARED_SECRET_LEN};
use crate::errors::{ErrorDomain, Result, VaultError};
use crate::vault::secret::SecretMaterial;

/// Compute the raw shared secret between `private_key` and `peer_public_key`.
///
/// Fails with `InvalidParam` for non-EC keys or a peer key of the wrong
/// length, and with `CryptoFailure` for a point that is off-curve or of low
/// order.
pub(crate) fn diffie_hellman(
    private_key: &SecretMaterial,
    peer_public_key: &[u8],
) -> Result<Zeroizing<[u8; SHARED_SECRET_LEN]>> {
    let mut shared = Zeroizing::new([0u8; SHARED_SECRET_LEN]);

    match private_key {
        SecretMaterial::Curve25519(secret) => {
            let peer: [u8; CURVE25519_PUBLIC_KEY_LEN] =
                peer_public_key.try_into().map_err(|_| {
                    peer_length_error(CURVE25519_PUBLIC_KEY_LEN, peer_public_key.len())
                })?;
            let output = secret.diffie_hellman(&x25519_dalek::PublicKey::from(peer));
            if !output.was_contributory() {
                warn!("rejected low-order Curve25519 peer key");
                return Err(VaultError::crypto(
                    ErrorDomain::KeyAgreement,
                    "peer public key is a low-order point",
                ));
            }
            shared.copy_from_slice(output.as_bytes());
        }
        SecretMaterial::P256(secret) => {
            if peer_public_key.len() != P256_PUBLIC_KEY_LEN {
                return Err(peer_length_error(P256_PUBLIC_KEY_LEN, peer_public_key.len()));
            }
            let peer = p256::PublicKey::from_sec1_bytes(peer_public_key).map_err(|_| {
                warn!("rejected invalid P-256 peer key");
                VaultError::crypto(
                    ErrorDomain::KeyAgreement,
                    "peer public key is not a valid P-256 point",
                )
            })?;
            let output = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
            shared.copy_from_slice(output.raw_secret_bytes());
        }
        other => {
            return Err(VaultError::invalid(
                ErrorDomain::KeyAgreement,
                format!("ECDH requires an EC private key, got {}", other.secret_type()),
            ));
        }
    }

    Ok(shared)
}

fn peer_length_error(expected: usize, actual: usize) -> VaultError {
    VaultError::invalid(
        ErrorDomain::KeyAgreement,
        format!("peer public key must be {expected} bytes, got {actual}"),
    )
}
