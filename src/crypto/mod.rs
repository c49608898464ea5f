//! Cryptographic engines used by the vault.
//!
//! This module provides:
//! - A mutex-guarded CSPRNG seeded from the OS (`random`)
//! - SHA-256 hashing (`hash`)
//! - ECDH over Curve25519 and P-256 (`ecdh`)
//! - HKDF-SHA256 with multiple 32-byte outputs (`kdf`)
//! - AES-GCM with a 16-bit nonce counter (`aead`)
//!
//! The engines never look up secrets themselves; the `Vault` facade reads
//! material out of the store and hands it over.

pub mod aead;
pub mod ecdh;
pub mod hash;
pub mod kdf;
pub mod random;

pub use aead::nonce_to_iv;
pub use hash::sha256;
pub use random::RandomSource;

/// Length of an ECDH shared secret.
pub const SHARED_SECRET_LEN: usize = 32;
/// Length of a SHA-256 digest.
pub const SHA256_DIGEST_LEN: usize = 32;
pub const AES128_KEY_LEN: usize = 16;
pub const AES256_KEY_LEN: usize = 32;
/// Length of the AES-GCM authentication tag appended to every ciphertext.
pub const AEAD_TAG_LEN: usize = 16;
/// Length of the 96-bit AES-GCM IV built from the 16-bit nonce.
pub const AEAD_IV_LEN: usize = 12;
pub const CURVE25519_PRIVATE_KEY_LEN: usize = 32;
pub const CURVE25519_PUBLIC_KEY_LEN: usize = 32;
pub const P256_PRIVATE_KEY_LEN: usize = 32;
/// Uncompressed SEC1 point: `0x04 || x || y`.
pub const P256_PUBLIC_KEY_LEN: usize = 65;
pub const CHAIN_KEY_LEN: usize = 32;
/// Length of each HKDF-SHA256 output.
pub const HKDF_OUTPUT_LEN: usize = 32;
/// HKDF-SHA256 can expand to at most 255 hash-length blocks.
pub const HKDF_MAX_OUTPUTS: usize = 255;
