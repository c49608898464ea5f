//! SHA-256 over plain buffers.  No managed secrets are involved.

use sha2::{Digest, Sha256};

use super::SHA256_DIGEST_LEN;

/// Compute the SHA-256 digest of `input`.
pub fn sha256(input: &[u8]) -> [u8; SHA256_DIGEST_LEN] {
    Sha256::digest(input).into()
}
