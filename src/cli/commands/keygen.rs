//! `sealvault keygen`: generate a key inside the vault and export it.

use crate::cli::{encode_base64, export_secret, output, KeyKind};
use crate::crypto::P256_PUBLIC_KEY_LEN;
use crate::errors::Result;
use crate::vault::{SecretAttributes, SecretPersistence, SecretPurpose, Vault};

/// Execute the `keygen` command.
pub fn execute(vault: &Vault, kind: KeyKind, persistent: bool) -> Result<()> {
    let persistence = if persistent {
        SecretPersistence::Persistent
    } else {
        SecretPersistence::Ephemeral
    };
    let secret_type = kind.secret_type();
    let attributes = SecretAttributes::new(secret_type, SecretPurpose::KeyAgreement, persistence);

    let handle = vault.secret_generate(&attributes)?;
    if persistent {
        output::warning("persistence is recorded as metadata only; the key is not stored");
    }
    let private = export_secret(vault, handle)?;
    output::value("private", &encode_base64(&private));

    if secret_type.is_private_key() {
        // Large enough for either curve.
        let mut public = [0u8; P256_PUBLIC_KEY_LEN];
        let written = vault.secret_public_key_get(handle, &mut public)?;
        output::value("public", &encode_base64(&public[..written]));
    }

    vault.secret_destroy(handle)
}
