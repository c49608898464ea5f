//! `sealvault hash`: SHA-256 of a string or a file.

use std::path::Path;

use crate::cli::{encode_base64, output};
use crate::crypto::SHA256_DIGEST_LEN;
use crate::errors::{ErrorDomain, Result, VaultError};
use crate::vault::Vault;

/// Execute the `hash` command.
pub fn execute(vault: &Vault, text: Option<&str>, file: Option<&str>) -> Result<()> {
    let input = match (text, file) {
        (_, Some(path)) => std::fs::read(Path::new(path))?,
        (Some(text), None) => text.as_bytes().to_vec(),
        (None, None) => {
            return Err(VaultError::invalid(
                ErrorDomain::Cli,
                "nothing to hash: pass TEXT or --file <path>",
            ));
        }
    };

    let mut digest = [0u8; SHA256_DIGEST_LEN];
    let written = vault.sha256(&input, &mut digest)?;
    output::raw(&encode_base64(&digest[..written]));
    Ok(())
}
