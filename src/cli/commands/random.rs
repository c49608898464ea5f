//! `sealvault random`: print random bytes from the vault's CSPRNG.

use zeroize::Zeroizing;

use crate::cli::{encode_base64, output};
use crate::errors::{ErrorDomain, Result, VaultError};
use crate::vault::Vault;

/// Upper bound on a single request, to keep output printable.
const MAX_RANDOM_LEN: usize = 64 * 1024;

/// Execute the `random` command.
pub fn execute(vault: &Vault, len: usize) -> Result<()> {
    if len == 0 || len > MAX_RANDOM_LEN {
        return Err(VaultError::invalid(
            ErrorDomain::Cli,
            format!("--len must be 1..={MAX_RANDOM_LEN}, got {len}"),
        ));
    }

    let mut bytes = Zeroizing::new(vec![0u8; len]);
    vault.random_bytes(&mut bytes)?;
    output::raw(&encode_base64(&bytes));
    Ok(())
}
