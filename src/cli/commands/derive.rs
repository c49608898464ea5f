//! `sealvault derive`: HKDF-SHA256 with several 32-byte outputs.

use crate::cli::{decode_base64, encode_base64, export_secret, output};
use crate::errors::Result;
use crate::vault::{SecretAttributes, Vault};

/// Execute the `derive` command.  Prints one base64 output per line.
pub fn execute(vault: &Vault, ikm: &str, salt: Option<&str>, count: usize) -> Result<()> {
    let ikm = decode_base64("--ikm", ikm)?;
    let ikm = vault.secret_import(&SecretAttributes::buffer(ikm.len()), &ikm)?;

    let salt = match salt {
        Some(salt) => {
            let bytes = decode_base64("--salt", salt)?;
            Some(vault.secret_import(&SecretAttributes::buffer(bytes.len()), &bytes)?)
        }
        None => None,
    };

    for handle in vault.hkdf_sha256(salt, ikm, count)? {
        output::raw(&encode_base64(&export_secret(vault, handle)?));
    }
    Ok(())
}
