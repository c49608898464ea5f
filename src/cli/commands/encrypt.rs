//! `sealvault encrypt`: AES-GCM encrypt a string.

use crate::cli::{decode_base64, encode_base64, import_aes_key, output};
use crate::crypto::AEAD_TAG_LEN;
use crate::errors::Result;
use crate::vault::Vault;

/// Execute the `encrypt` command.  Prints `ciphertext || tag` as base64.
pub fn execute(vault: &Vault, key: &str, nonce: u16, aad: &str, plaintext: &str) -> Result<()> {
    let key = import_aes_key(vault, &decode_base64("--key", key)?)?;

    let mut ciphertext = vec![0u8; plaintext.len() + AEAD_TAG_LEN];
    let written = vault.aead_aes_gcm_encrypt(
        key,
        nonce,
        aad.as_bytes(),
        plaintext.as_bytes(),
        &mut ciphertext,
    )?;

    output::raw(&encode_base64(&ciphertext[..written]));
    Ok(())
}
