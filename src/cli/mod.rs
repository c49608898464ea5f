//! CLI module: Clap argument parser, output helpers, and command implementations.
//!
//! Every command runs against a throwaway in-memory `Vault`: keys come in
//! as base64 arguments, are imported as secrets, used, and wiped when the
//! process exits.

pub mod commands;
pub mod output;

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::Parser;
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use crate::config::VaultSettings;
use crate::errors::{ErrorDomain, Result, VaultError};
use crate::vault::{SecretAttributes, SecretHandle, SecretType, Vault};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "SEALVAULT_LOG";

/// SealVault CLI: exercise the vault primitives from a shell.
#[derive(Parser)]
#[command(
    name = "sealvault",
    about = "Handle-based cryptographic vault: random, hashing, ECDH, HKDF and AES-GCM",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a settings file (default: ./.sealvault.toml if present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log vault operations to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Print random bytes (base64)
    Random {
        /// Number of bytes
        #[arg(short, long, default_value = "32")]
        len: usize,
    },

    /// SHA-256 of a string or file (base64)
    Hash {
        /// Text to hash
        text: Option<String>,
        /// Hash the contents of this file instead
        #[arg(short, long, conflicts_with = "text")]
        file: Option<String>,
    },

    /// Generate a key and print it (and its public key for EC types)
    Keygen {
        /// Key type
        #[arg(short = 't', long = "type", value_enum)]
        key_type: KeyKind,
        /// Mark the key as persistent (EC keys only)
        #[arg(long)]
        persistent: bool,
    },

    /// Compute an ECDH shared secret
    Ecdh {
        /// Curve of the private key
        #[arg(short, long, value_enum)]
        curve: Curve,
        /// Private key (base64)
        #[arg(long)]
        private: String,
        /// Peer public key (base64)
        #[arg(long)]
        peer: String,
    },

    /// Derive 32-byte keys with HKDF-SHA256
    Derive {
        /// Input key material (base64)
        #[arg(long)]
        ikm: String,
        /// Salt (base64, default: zero salt)
        #[arg(long)]
        salt: Option<String>,
        /// Number of outputs
        #[arg(short = 'n', long, default_value = "2")]
        count: usize,
    },

    /// Encrypt text with AES-GCM (key is 16 or 32 bytes, base64)
    Encrypt {
        /// AES key (base64)
        #[arg(short, long)]
        key: String,
        /// 16-bit nonce; never reuse one with the same key
        #[arg(short, long)]
        nonce: u16,
        /// Additional authenticated data
        #[arg(long, default_value = "")]
        aad: String,
        /// Plaintext
        plaintext: String,
    },

    /// Decrypt AES-GCM ciphertext produced by `encrypt`
    Decrypt {
        /// AES key (base64)
        #[arg(short, long)]
        key: String,
        /// 16-bit nonce used for encryption
        #[arg(short, long)]
        nonce: u16,
        /// Additional authenticated data
        #[arg(long, default_value = "")]
        aad: String,
        /// Ciphertext and tag (base64)
        ciphertext: String,
    },

    /// Run a quick end-to-end check of the vault primitives
    SelfTest,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Key types accepted by `keygen`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum KeyKind {
    Aes128,
    Aes256,
    Curve25519,
    P256,
}

impl KeyKind {
    pub fn secret_type(self) -> SecretType {
        match self {
            Self::Aes128 => SecretType::Aes128Key,
            Self::Aes256 => SecretType::Aes256Key,
            Self::Curve25519 => SecretType::Curve25519PrivateKey,
            Self::P256 => SecretType::P256PrivateKey,
        }
    }
}

/// Curves accepted by `ecdh`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Curve {
    Curve25519,
    P256,
}

impl Curve {
    pub fn secret_type(self) -> SecretType {
        match self {
            Self::Curve25519 => SecretType::Curve25519PrivateKey,
            Self::P256 => SecretType::P256PrivateKey,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve settings from `--config`, else `./.sealvault.toml`, else defaults.
pub fn load_settings(cli: &Cli) -> Result<VaultSettings> {
    match &cli.config {
        Some(path) => VaultSettings::load_from(Path::new(path)),
        None => VaultSettings::load(&std::env::current_dir()?),
    }
}

/// Install the stderr `tracing` subscriber.
///
/// Filter precedence: `SEALVAULT_LOG`, then `--verbose`, then the
/// configured `log_filter`.
pub fn init_logging(verbose: bool, settings: &VaultSettings) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let directive = if verbose {
            "sealvault=debug"
        } else {
            settings.log_filter.as_str()
        };
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    // A second install (e.g. in tests) is harmless; keep the first one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Decode a base64 argument.  The decoded bytes are wiped on drop.
pub fn decode_base64(name: &str, value: &str) -> Result<Zeroizing<Vec<u8>>> {
    BASE64
        .decode(value.trim())
        .map(Zeroizing::new)
        .map_err(|e| {
            VaultError::invalid(ErrorDomain::Cli, format!("{name} is not valid base64: {e}"))
        })
}

pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Import a 16- or 32-byte AES key, picking the type from its length.
pub fn import_aes_key(vault: &Vault, key: &[u8]) -> Result<SecretHandle> {
    let secret_type = match key.len() {
        16 => SecretType::Aes128Key,
        32 => SecretType::Aes256Key,
        other => {
            return Err(VaultError::invalid(
                ErrorDomain::Cli,
                format!("AES keys must be 16 or 32 bytes, got {other}"),
            ));
        }
    };
    vault.secret_import(&SecretAttributes::ephemeral(secret_type), key)
}

/// Export a secret into a freshly sized buffer.
pub fn export_secret(vault: &Vault, handle: SecretHandle) -> Result<Zeroizing<Vec<u8>>> {
    let length = vault.secret_attributes_get(handle)?.length;
    let mut buffer = Zeroizing::new(vec![0u8; length]);
    let written = vault.secret_export(handle, &mut buffer)?;
    buffer.truncate(written);
    Ok(buffer)
}
