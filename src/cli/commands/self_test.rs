//! `sealvault self-test`: run a short end-to-end check of the primitives.
//!
//! 1. AES-256-GCM: 13-byte plaintext, nonce 1, empty AAD.  The ciphertext
//!    must be 29 bytes, decrypting with nonce 2 must fail, and decrypting
//!    with nonce 1 must return the plaintext.
//! 2. ECDH: both sides of a Curve25519 and a P-256 exchange must agree.
//! 3. Destroyed handles must be unusable.

use crate::cli::{export_secret, output};
use crate::crypto::{AEAD_TAG_LEN, P256_PUBLIC_KEY_LEN};
use crate::errors::{ErrorCode, ErrorDomain, Result, VaultError};
use crate::vault::{SecretAttributes, SecretType, Vault};

const MESSAGE: &[u8] = b"hello, vault!";

/// Execute the `self-test` command.
pub fn execute(vault: &Vault) -> Result<()> {
    check_aead(vault)?;
    output::success("AES-256-GCM round trip and nonce binding");

    check_ecdh(vault, SecretType::Curve25519PrivateKey)?;
    check_ecdh(vault, SecretType::P256PrivateKey)?;
    output::success("ECDH agreement on Curve25519 and P-256");

    check_destroy(vault)?;
    output::success("destroyed secrets are unreachable");
    Ok(())
}

fn check_aead(vault: &Vault) -> Result<()> {
    let key = vault.secret_generate(&SecretAttributes::ephemeral(SecretType::Aes256Key))?;

    let mut ciphertext = [0u8; MESSAGE.len() + AEAD_TAG_LEN];
    let written = vault.aead_aes_gcm_encrypt(key, 1, &[], MESSAGE, &mut ciphertext)?;
    ensure(written == MESSAGE.len() + AEAD_TAG_LEN, "ciphertext has the wrong length")?;

    let mut plaintext = [0u8; MESSAGE.len()];
    match vault.aead_aes_gcm_decrypt(key, 2, &[], &ciphertext, &mut plaintext) {
        Err(e) if e.code() == ErrorCode::CryptoFailure => {}
        _ => return Err(failure("decryption with the wrong nonce was accepted")),
    }
    ensure(plaintext == [0u8; MESSAGE.len()], "failed decryption wrote plaintext")?;

    let written = vault.aead_aes_gcm_decrypt(key, 1, &[], &ciphertext, &mut plaintext)?;
    ensure(&plaintext[..written] == MESSAGE, "decryption did not recover the plaintext")?;

    vault.secret_destroy(key)
}

fn check_ecdh(vault: &Vault, secret_type: SecretType) -> Result<()> {
    let attributes = SecretAttributes::ephemeral(secret_type);
    let alice = vault.secret_generate(&attributes)?;
    let bob = vault.secret_generate(&attributes)?;

    let mut alice_public = [0u8; P256_PUBLIC_KEY_LEN];
    let mut bob_public = [0u8; P256_PUBLIC_KEY_LEN];
    let alice_len = vault.secret_public_key_get(alice, &mut alice_public)?;
    let bob_len = vault.secret_public_key_get(bob, &mut bob_public)?;

    let ab = vault.ecdh(alice, &bob_public[..bob_len])?;
    let ba = vault.ecdh(bob, &alice_public[..alice_len])?;
    ensure(
        export_secret(vault, ab)? == export_secret(vault, ba)?,
        "ECDH shared secrets differ",
    )?;

    for handle in [alice, bob, ab, ba] {
        vault.secret_destroy(handle)?;
    }
    Ok(())
}

fn check_destroy(vault: &Vault) -> Result<()> {
    let handle = vault.secret_generate(&SecretAttributes::ephemeral(SecretType::ChainKey))?;
    vault.secret_destroy(handle)?;
    match vault.secret_attributes_get(handle) {
        Err(e) if e.code() == ErrorCode::NotFound => Ok(()),
        _ => Err(failure("destroyed handle still resolves")),
    }
}

fn ensure(condition: bool, reason: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(failure(reason))
    }
}

fn failure(reason: &str) -> VaultError {
    VaultError::crypto(ErrorDomain::Cli, format!("self-test failed: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultSettings;
    use crate::crypto::RandomSource;

    #[test]
    fn self_test_passes_and_cleans_up() {
        let random = RandomSource::from_seed([9u8; 32]);
        let vault = Vault::with_random(VaultSettings::default(), random).unwrap();
        execute(&vault).unwrap();
        assert_eq!(vault.secret_count(), 0);
    }
}
