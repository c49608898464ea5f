//! `sealvault ecdh`: shared secret from a private key and a peer public key.

use crate::cli::{decode_base64, encode_base64, export_secret, output, Curve};
use crate::errors::Result;
use crate::vault::{SecretAttributes, Vault};

/// Execute the `ecdh` command.
pub fn execute(vault: &Vault, curve: Curve, private: &str, peer: &str) -> Result<()> {
    let private = decode_base64("--private", private)?;
    let peer = decode_base64("--peer", peer)?;

    let key = vault.secret_import(&SecretAttributes::ephemeral(curve.secret_type()), &private)?;
    let shared = vault.ecdh(key, &peer)?;

    output::raw(&encode_base64(&export_secret(vault, shared)?));
    Ok(())
}
