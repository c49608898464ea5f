//! The `Vault`: the single entry point for every vault operation.
//!
//! `Vault` owns the secret store and the random source.  It validates
//! arguments, pulls key material out of the store, hands it to the crypto
//! engines and stores whatever new secrets they produce.
//!
//! Buffer-producing operations write into a caller-supplied slice and
//! return the number of bytes written.  When the slice is too small they
//! fail with `BufferTooSmall`, which carries the size to retry with.

use tracing::{debug, info};

use super::secret::{
    SecretAttributes, SecretHandle, SecretMaterial, SecretPersistence, SecretPurpose, SecretType,
};
use super::store::SecretStore;
use crate::config::VaultSettings;
use crate::crypto::{self, RandomSource, AEAD_TAG_LEN, HKDF_OUTPUT_LEN, SHA256_DIGEST_LEN};
use crate::errors::{ErrorDomain, Result, VaultError};

/// A cryptographic vault.  Share it between threads by reference or `Arc`.
pub struct Vault {
    settings: VaultSettings,
    random: RandomSource,
    store: SecretStore,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("live_secrets", &self.store.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction / teardown
    // ------------------------------------------------------------------

    /// Create a vault with default settings, seeded from the OS.
    pub fn new() -> Result<Self> {
        Self::with_settings(VaultSettings::default())
    }

    /// Create a vault with explicit settings, seeded from the OS.
    pub fn with_settings(settings: VaultSettings) -> Result<Self> {
        Self::with_random(settings, RandomSource::from_os()?)
    }

    /// Create a vault around an existing random source.
    pub fn with_random(settings: VaultSettings, random: RandomSource) -> Result<Self> {
        settings.validate()?;
        let store = SecretStore::new(settings.max_secrets, settings.max_buffer_len);
        info!(
            max_secrets = settings.max_secrets,
            max_buffer_len = settings.max_buffer_len,
            "vault initialized"
        );
        Ok(Self {
            settings,
            random,
            store,
        })
    }

    /// Destroy every live secret and release the vault.
    ///
    /// Returns how many secrets were zeroized.  Consuming `self` rules out
    /// a second deinit; dropping a vault without calling this performs the
    /// same teardown.
    pub fn deinit(self) -> usize {
        let destroyed = self.store.destroy_all();
        info!(destroyed, "vault deinitialized");
        destroyed
    }

    /// Number of live secrets.
    pub fn secret_count(&self) -> usize {
        self.store.len()
    }

    pub fn settings(&self) -> &VaultSettings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Plain-buffer primitives
    // ------------------------------------------------------------------

    /// Fill `buffer` from the CSPRNG, returning the count written.
    pub fn random_bytes(&self, buffer: &mut [u8]) -> Result<usize> {
        self.random.fill(buffer)?;
        Ok(buffer.len())
    }

    /// Write the SHA-256 digest of `input` into `digest`.
    pub fn sha256(&self, input: &[u8], digest: &mut [u8]) -> Result<usize> {
        let hash: [u8; SHA256_DIGEST_LEN] = crypto::sha256(input);
        write_out(ErrorDomain::Hash, &hash, digest)
    }

    // ------------------------------------------------------------------
    // Secret lifecycle
    // ------------------------------------------------------------------

    /// Generate a new random secret.
    pub fn secret_generate(&self, attributes: &SecretAttributes) -> Result<SecretHandle> {
        self.store.generate(attributes, &self.random)
    }

    /// Import caller-supplied bytes as a new secret.
    pub fn secret_import(
        &self,
        attributes: &SecretAttributes,
        input: &[u8],
    ) -> Result<SecretHandle> {
        self.store.import(attributes, input)
    }

    /// Copy a secret's raw content into `output`.
    pub fn secret_export(&self, handle: SecretHandle, output: &mut [u8]) -> Result<usize> {
        let bytes = self.store.export(handle)?;
        write_out(ErrorDomain::Store, &bytes, output)
    }

    /// Write the public key of an EC private key secret into `output`.
    pub fn secret_public_key_get(&self, handle: SecretHandle, output: &mut [u8]) -> Result<usize> {
        let public_key = self.store.public_key(handle)?;
        write_out(ErrorDomain::Store, &public_key, output)
    }

    pub fn secret_attributes_get(&self, handle: SecretHandle) -> Result<SecretAttributes> {
        self.store.attributes(handle)
    }

    /// Change a secret's type.  Always fails for EC private keys.
    pub fn secret_type_set(&self, handle: SecretHandle, secret_type: SecretType) -> Result<()> {
        self.store.set_type(handle, secret_type)
    }

    /// Zeroize a secret and invalidate its handle.
    pub fn secret_destroy(&self, handle: SecretHandle) -> Result<()> {
        self.store.destroy(handle)
    }

    // ------------------------------------------------------------------
    // Key agreement / derivation
    // ------------------------------------------------------------------

    /// ECDH between a stored private key and a peer public key.
    ///
    /// The shared secret becomes a new 32-byte buffer secret with
    /// key-agreement purpose.
    pub fn ecdh(&self, private_key: SecretHandle, peer_public_key: &[u8]) -> Result<SecretHandle> {
        let shared = self
            .store
            .with_secret(private_key, |_, material| {
                crypto::ecdh::diffie_hellman(material, peer_public_key)
            })?;

        let material = SecretMaterial::from_bytes(
            SecretType::Buffer,
            shared.as_slice(),
            self.store.max_buffer_len().max(shared.len()),
        )?;
        let handle = self
            .store
            .insert(SecretAttributes::buffer(shared.len()), material)?;

        debug!(private_key = %private_key, shared = %handle, "ECDH completed");
        Ok(handle)
    }

    /// HKDF-SHA256 producing `output_count` chain keys.
    ///
    /// `salt` of `None` uses the zero-filled default.
    pub fn hkdf_sha256(
        &self,
        salt: Option<SecretHandle>,
        input_key_material: SecretHandle,
        output_count: usize,
    ) -> Result<Vec<SecretHandle>> {
        if output_count == 0 || output_count > self.settings.max_derived_outputs {
            return Err(VaultError::invalid(
                ErrorDomain::Interface,
                format!(
                    "output count must be 1..={}, got {output_count}",
                    self.settings.max_derived_outputs
                ),
            ));
        }
        self.hkdf_sha256_typed(salt, input_key_material, &vec![SecretType::ChainKey; output_count])
    }

    /// HKDF-SHA256 with one output per entry of `output_types`.
    ///
    /// Each output type must be 32 bytes wide: `ChainKey`, `Aes256Key` or
    /// `Buffer`.  Either every output is stored or none is.
    pub fn hkdf_sha256_typed(
        &self,
        salt: Option<SecretHandle>,
        input_key_material: SecretHandle,
        output_types: &[SecretType],
    ) -> Result<Vec<SecretHandle>> {
        let count = output_types.len();
        if count == 0 || count > self.settings.max_derived_outputs {
            return Err(VaultError::invalid(
                ErrorDomain::Interface,
                format!(
                    "output count must be 1..={}, got {count}",
                    self.settings.max_derived_outputs
                ),
            ));
        }
        if let Some(bad) = output_types
            .iter()
            .find(|t| t.is_private_key() || t.fixed_len().is_some_and(|len| len != HKDF_OUTPUT_LEN))
        {
            return Err(VaultError::invalid(
                ErrorDomain::Interface,
                format!("HKDF outputs are {HKDF_OUTPUT_LEN} bytes and cannot be {bad} secrets"),
            ));
        }

        let salt_bytes = salt
            .map(|handle| self.kdf_input(handle))
            .transpose()?;
        let ikm = self.kdf_input(input_key_material)?;

        let outputs = crypto::kdf::hkdf_sha256(
            salt_bytes.as_deref().map(|s| s.as_slice()),
            &ikm,
            count,
        )?;

        let max_buffer_len = self.store.max_buffer_len().max(HKDF_OUTPUT_LEN);
        let secrets = outputs
            .iter()
            .zip(output_types)
            .map(|(bytes, &secret_type)| {
                let material =
                    SecretMaterial::from_bytes(secret_type, bytes.as_slice(), max_buffer_len)?;
                let attributes = SecretAttributes {
                    length: HKDF_OUTPUT_LEN,
                    ..SecretAttributes::new(
                        secret_type,
                        SecretPurpose::KeyAgreement,
                        SecretPersistence::Ephemeral,
                    )
                };
                Ok((attributes, material))
            })
            .collect::<Result<Vec<_>>>()?;

        let handles = self.store.insert_all(secrets)?;
        debug!(ikm = %input_key_material, outputs = handles.len(), "HKDF completed");
        Ok(handles)
    }

    // ------------------------------------------------------------------
    // AEAD
    // ------------------------------------------------------------------

    /// AES-GCM encrypt `plaintext` into `ciphertext_and_tag`.
    ///
    /// Writes `plaintext.len() + 16` bytes.
    pub fn aead_aes_gcm_encrypt(
        &self,
        key: SecretHandle,
        nonce: u16,
        additional_data: &[u8],
        plaintext: &[u8],
        ciphertext_and_tag: &mut [u8],
    ) -> Result<usize> {
        ensure_capacity(
            ErrorDomain::Aead,
            plaintext.len() + AEAD_TAG_LEN,
            ciphertext_and_tag.len(),
        )?;

        let ciphertext = self.store.with_secret(key, |_, material| {
            crypto::aead::encrypt(material, nonce, additional_data, plaintext)
        })?;
        write_out(ErrorDomain::Aead, &ciphertext, ciphertext_and_tag)
    }

    /// AES-GCM decrypt `ciphertext_and_tag` into `plaintext`.
    ///
    /// On authentication failure nothing is written to `plaintext`.
    pub fn aead_aes_gcm_decrypt(
        &self,
        key: SecretHandle,
        nonce: u16,
        additional_data: &[u8],
        ciphertext_and_tag: &[u8],
        plaintext: &mut [u8],
    ) -> Result<usize> {
        if ciphertext_and_tag.len() < AEAD_TAG_LEN {
            return Err(VaultError::invalid(
                ErrorDomain::Interface,
                format!(
                    "ciphertext must be at least {AEAD_TAG_LEN} bytes, got {}",
                    ciphertext_and_tag.len()
                ),
            ));
        }
        ensure_capacity(
            ErrorDomain::Aead,
            ciphertext_and_tag.len() - AEAD_TAG_LEN,
            plaintext.len(),
        )?;

        let decrypted = self.store.with_secret(key, |_, material| {
            crypto::aead::decrypt(material, nonce, additional_data, ciphertext_and_tag)
        })?;
        write_out(ErrorDomain::Aead, &decrypted, plaintext)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Raw bytes of an HKDF salt or IKM.  EC private keys are not accepted.
    fn kdf_input(&self, handle: SecretHandle) -> Result<zeroize::Zeroizing<Vec<u8>>> {
        self.store.with_secret(handle, |attributes, material| {
            if attributes.secret_type.is_private_key() {
                return Err(VaultError::invalid(
                    ErrorDomain::KeyDerivation,
                    format!("{} secrets cannot be HKDF input", attributes.secret_type),
                ));
            }
            Ok(material.to_bytes())
        })
    }
}

impl Drop for Vault {
    fn drop(&mut self) {
        self.store.destroy_all();
    }
}

fn ensure_capacity(domain: ErrorDomain, required: usize, provided: usize) -> Result<()> {
    if provided < required {
        return Err(VaultError::BufferTooSmall {
            domain,
            required,
            provided,
        });
    }
    Ok(())
}

/// Copy `bytes` to the front of `output`, returning the count written.
fn write_out(domain: ErrorDomain, bytes: &[u8], output: &mut [u8]) -> Result<usize> {
    ensure_capacity(domain, bytes.len(), output.len())?;
    output[..bytes.len()].copy_from_slice(bytes);
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn vault() -> Vault {
        Vault::with_random(VaultSettings::default(), RandomSource::from_seed([1u8; 32])).unwrap()
    }

    #[test]
    fn random_bytes_reports_length_written() {
        let vault = vault();
        let mut buffer = [0u8; 48];
        assert_eq!(vault.random_bytes(&mut buffer).unwrap(), 48);
        assert_ne!(buffer, [0u8; 48]);
        assert_eq!(vault.random_bytes(&mut []).unwrap(), 0);
    }

    #[test]
    fn sha256_reports_required_size() {
        let vault = vault();
        let mut small = [0u8; 31];
        let err = vault.sha256(b"abc", &mut small).unwrap_err();
        assert_eq!(err.code(), ErrorCode::BufferTooSmall);
        assert_eq!(err.required_len(), Some(32));

        let mut digest = [0u8; 40];
        assert_eq!(vault.sha256(b"abc", &mut digest).unwrap(), 32);
    }

    #[test]
    fn export_into_small_buffer_reports_required_size() {
        let vault = vault();
        let key = vault
            .secret_generate(&SecretAttributes::ephemeral(SecretType::Aes256Key))
            .unwrap();
        let mut small = [0u8; 16];
        let err = vault.secret_export(key, &mut small).unwrap_err();
        assert_eq!(err.required_len(), Some(32));
        assert_eq!(small, [0u8; 16]);
    }

    #[test]
    fn encrypt_checks_capacity_before_touching_key() {
        let vault = vault();
        let key = vault
            .secret_generate(&SecretAttributes::ephemeral(SecretType::Aes128Key))
            .unwrap();
        let mut out = [0u8; 20];
        let err = vault
            .aead_aes_gcm_encrypt(key, 0, b"", b"12345", &mut out)
            .unwrap_err();
        assert_eq!(err.required_len(), Some(21));
    }

    #[test]
    fn hkdf_rejects_count_above_configured_limit() {
        let vault = vault();
        let ikm = vault.secret_import(&SecretAttributes::buffer(4), b"seed").unwrap();
        let err = vault.hkdf_sha256(None, ikm, 9).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParam);
        assert_eq!(err.domain(), ErrorDomain::Interface);
        assert!(vault.hkdf_sha256(None, ikm, 0).is_err());
        assert_eq!(vault.secret_count(), 1);
    }

    #[test]
    fn hkdf_typed_rejects_narrow_output_types() {
        let vault = vault();
        let ikm = vault.secret_import(&SecretAttributes::buffer(4), b"seed").unwrap();
        assert!(vault
            .hkdf_sha256_typed(None, ikm, &[SecretType::Aes128Key])
            .is_err());
        assert!(vault
            .hkdf_sha256_typed(None, ikm, &[SecretType::P256PrivateKey])
            .is_err());

        let outputs = vault
            .hkdf_sha256_typed(None, ikm, &[SecretType::Aes256Key, SecretType::Buffer])
            .unwrap();
        assert_eq!(
            vault.secret_attributes_get(outputs[0]).unwrap().secret_type,
            SecretType::Aes256Key
        );
        assert_eq!(vault.secret_attributes_get(outputs[1]).unwrap().length, 32);
    }

    #[test]
    fn hkdf_rejects_ec_private_key_input() {
        let vault = vault();
        let ec = vault
            .secret_generate(&SecretAttributes::ephemeral(SecretType::Curve25519PrivateKey))
            .unwrap();
        let err = vault.hkdf_sha256(None, ec, 1).unwrap_err();
        assert_eq!(err.domain(), ErrorDomain::KeyDerivation);
    }

    #[test]
    fn ecdh_output_attributes() {
        let vault = vault();
        let a = vault
            .secret_generate(&SecretAttributes::ephemeral(SecretType::Curve25519PrivateKey))
            .unwrap();
        let b = vault
            .secret_generate(&SecretAttributes::ephemeral(SecretType::Curve25519PrivateKey))
            .unwrap();
        let mut b_pub = [0u8; 32];
        vault.secret_public_key_get(b, &mut b_pub).unwrap();

        let shared = vault.ecdh(a, &b_pub).unwrap();
        let attrs = vault.secret_attributes_get(shared).unwrap();
        assert_eq!(attrs.secret_type, SecretType::Buffer);
        assert_eq!(attrs.length, 32);
        assert_eq!(attrs.purpose, SecretPurpose::KeyAgreement);
        assert_eq!(attrs.persistence, SecretPersistence::Ephemeral);
    }

    #[test]
    fn failed_ecdh_leaves_no_secret_behind() {
        let vault = vault();
        let a = vault
            .secret_generate(&SecretAttributes::ephemeral(SecretType::Curve25519PrivateKey))
            .unwrap();
        assert!(vault.ecdh(a, &[0u8; 32]).is_err());
        assert_eq!(vault.secret_count(), 1);
    }

    #[test]
    fn deinit_reports_destroyed_count() {
        let vault = vault();
        vault.secret_import(&SecretAttributes::buffer(2), b"hi").unwrap();
        vault
            .secret_generate(&SecretAttributes::ephemeral(SecretType::ChainKey))
            .unwrap();
        assert_eq!(vault.deinit(), 2);
    }

    #[test]
    fn with_random_validates_settings() {
        let settings = VaultSettings {
            max_derived_outputs: 0,
            ..VaultSettings::default()
        };
        let err = Vault::with_random(settings, RandomSource::from_seed([0u8; 32])).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Config);
    }
}
