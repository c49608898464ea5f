//! `sealvault decrypt`: verify and decrypt AES-GCM output.

use zeroize::Zeroizing;

use crate::cli::{decode_base64, import_aes_key, output};
use crate::crypto::AEAD_TAG_LEN;
use crate::errors::{ErrorDomain, Result, VaultError};
use crate::vault::Vault;

/// Execute the `decrypt` command.  The plaintext must be UTF-8.
pub fn execute(vault: &Vault, key: &str, nonce: u16, aad: &str, ciphertext: &str) -> Result<()> {
    let key = import_aes_key(vault, &decode_base64("--key", key)?)?;
    let ciphertext = decode_base64("ciphertext", ciphertext)?;

    let mut plaintext = Zeroizing::new(vec![0u8; ciphertext.len().saturating_sub(AEAD_TAG_LEN)]);
    let written =
        vault.aead_aes_gcm_decrypt(key, nonce, aad.as_bytes(), &ciphertext, &mut plaintext)?;
    plaintext.truncate(written);

    let text = std::str::from_utf8(&plaintext)
        .map_err(|_| VaultError::invalid(ErrorDomain::Cli, "plaintext is not valid UTF-8"))?;
    output::raw(text);
    Ok(())
}
