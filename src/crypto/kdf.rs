//! HKDF-SHA256 (RFC 5869) producing several 32-byte outputs.
//!
//! One extract step, then a single expand with an empty `info` string to
//! `32 * count` bytes.  Output `i` is HKDF block `T(i + 1)`, which is the
//! same construction Noise uses for its two- and three-output HKDF.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{HKDF_MAX_OUTPUTS, HKDF_OUTPUT_LEN};
use crate::errors::{ErrorDomain, Result, VaultError};

/// Derive `count` independent 32-byte outputs from `salt` and `ikm`.
///
/// `None` for `salt` uses the RFC default of 32 zero bytes.
pub(crate) fn hkdf_sha256(
    salt: Option<&[u8]>,
    ikm: &[u8],
    count: usize,
) -> Result<Vec<Zeroizing<[u8; HKDF_OUTPUT_LEN]>>> {
    if count == 0 || count > HKDF_MAX_OUTPUTS {
        return Err(VaultError::invalid(
            ErrorDomain::KeyDerivation,
            format!("output count must be 1..={HKDF_MAX_OUTPUTS}, got {count}"),
        ));
    }

    let hk = Hkdf::<Sha256>::new(salt, ikm);

    let mut okm = Zeroizing::new(vec![0u8; HKDF_OUTPUT_LEN * count]);
    hk.expand(&[], &mut okm).map_err(|e| {
        VaultError::crypto(ErrorDomain::KeyDerivation, format!("HKDF expand failed: {e}"))
    })?;

    let outputs = okm
        .chunks_exact(HKDF_OUTPUT_LEN)
        .map(|chunk| {
            let mut out = Zeroizing::new([0u8; HKDF_OUTPUT_LEN]);
            out.copy_from_slice(chunk);
            out
        })
        .collect();

    Ok(outputs)
}
