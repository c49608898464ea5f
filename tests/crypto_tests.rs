//! Integration tests for the SealVault crypto engines, checked against
//! published test vectors through the `Vault` interface.

use sealvault::config::VaultSettings;
use sealvault::crypto::{nonce_to_iv, sha256, RandomSource};
use sealvault::{ErrorCode, SecretAttributes, SecretHandle, SecretType, Vault};

fn hex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).expect("valid hex"))
        .collect()
}

fn vault() -> Vault {
    Vault::with_random(VaultSettings::default(), RandomSource::from_seed([0x42; 32]))
        .expect("create vault")
}

fn export(vault: &Vault, handle: SecretHandle) -> Vec<u8> {
    let mut out = [0u8; 64];
    let n = vault.secret_export(handle, &mut out).expect("export");
    out[..n].to_vec()
}

// ---------------------------------------------------------------------------
// SHA-256
// ---------------------------------------------------------------------------

#[test]
fn sha256_abc_vector() {
    let expected = hex("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    assert_eq!(sha256(b"abc").to_vec(), expected);

    let vault = vault();
    let mut digest = [0u8; 32];
    assert_eq!(vault.sha256(b"abc", &mut digest).unwrap(), 32);
    assert_eq!(digest.to_vec(), expected);
}

// ---------------------------------------------------------------------------
// HKDF-SHA256 (RFC 5869, test case 3: empty salt and info)
// ---------------------------------------------------------------------------

#[test]
fn hkdf_rfc5869_case3_prefix() {
    let vault = vault();
    let ikm = vault
        .secret_import(&SecretAttributes::buffer(22), &[0x0b; 22])
        .unwrap();

    let outputs = vault.hkdf_sha256(None, ikm, 2).unwrap();
    assert_eq!(
        export(&vault, outputs[0]),
        hex("8da4e775a563c18f715f802a063c5a31b8a11f5c5ee1879ec3454e5f3c738d2d")
    );
    // The RFC's 42-byte OKM continues into the second block.
    assert_eq!(export(&vault, outputs[1])[..10], hex("9d201395faa4b61a96c8")[..]);
}

#[test]
fn hkdf_outputs_are_chain_keys() {
    let vault = vault();
    let ikm = vault.secret_import(&SecretAttributes::buffer(4), b"seed").unwrap();
    for handle in vault.hkdf_sha256(None, ikm, 3).unwrap() {
        let attrs = vault.secret_attributes_get(handle).unwrap();
        assert_eq!(attrs.secret_type, SecretType::ChainKey);
        assert_eq!(attrs.length, 32);
    }
}

// ---------------------------------------------------------------------------
// X25519 (RFC 7748 section 6.1)
// ---------------------------------------------------------------------------

const ALICE_PRIVATE: &str = "77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a";
const ALICE_PUBLIC: &str = "8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a";
const BOB_PRIVATE: &str = "5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb";
const BOB_PUBLIC: &str = "de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f";
const SHARED: &str = "4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742";

#[test]
fn x25519_rfc7748_vector() {
    let vault = vault();
    let attrs = SecretAttributes::ephemeral(SecretType::Curve25519PrivateKey);
    let alice = vault.secret_import(&attrs, &hex(ALICE_PRIVATE)).unwrap();
    let bob = vault.secret_import(&attrs, &hex(BOB_PRIVATE)).unwrap();

    let mut public = [0u8; 32];
    vault.secret_public_key_get(alice, &mut public).unwrap();
    assert_eq!(public.to_vec(), hex(ALICE_PUBLIC));
    vault.secret_public_key_get(bob, &mut public).unwrap();
    assert_eq!(public.to_vec(), hex(BOB_PUBLIC));

    let ab = vault.ecdh(alice, &hex(BOB_PUBLIC)).unwrap();
    let ba = vault.ecdh(bob, &hex(ALICE_PUBLIC)).unwrap();
    assert_eq!(export(&vault, ab), hex(SHARED));
    assert_eq!(export(&vault, ba), hex(SHARED));
}

#[test]
fn imported_curve25519_key_exports_unchanged() {
    let vault = vault();
    let key = vault
        .secret_import(
            &SecretAttributes::ephemeral(SecretType::Curve25519PrivateKey),
            &hex(ALICE_PRIVATE),
        )
        .unwrap();
    assert_eq!(export(&vault, key), hex(ALICE_PRIVATE));
}

// ---------------------------------------------------------------------------
// P-256
// ---------------------------------------------------------------------------

#[test]
fn p256_scalar_one_has_generator_public_key() {
    let vault = vault();
    let mut one = [0u8; 32];
    one[31] = 1;
    let key = vault
        .secret_import(&SecretAttributes::ephemeral(SecretType::P256PrivateKey), &one)
        .unwrap();

    let mut public = [0u8; 65];
    assert_eq!(vault.secret_public_key_get(key, &mut public).unwrap(), 65);
    assert_eq!(public[0], 0x04);
    assert_eq!(
        public[1..33].to_vec(),
        hex("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296")
    );
    assert_eq!(
        public[33..].to_vec(),
        hex("4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5")
    );
}

#[test]
fn p256_public_key_needs_65_byte_buffer() {
    let vault = vault();
    let key = vault
        .secret_generate(&SecretAttributes::ephemeral(SecretType::P256PrivateKey))
        .unwrap();
    let mut small = [0u8; 64];
    let err = vault.secret_public_key_get(key, &mut small).unwrap_err();
    assert_eq!(err.code(), ErrorCode::BufferTooSmall);
    assert_eq!(err.required_len(), Some(65));
}

// ---------------------------------------------------------------------------
// AES-GCM (NIST GCM test cases with an all-zero IV, i.e. nonce 0)
// ---------------------------------------------------------------------------

fn gcm_case(key: &[u8], plaintext: &[u8], expected: &str) {
    let vault = vault();
    let secret_type = if key.len() == 16 {
        SecretType::Aes128Key
    } else {
        SecretType::Aes256Key
    };
    let handle = vault
        .secret_import(&SecretAttributes::ephemeral(secret_type), key)
        .unwrap();

    let mut out = vec![0u8; plaintext.len() + 16];
    let n = vault
        .aead_aes_gcm_encrypt(handle, 0, &[], plaintext, &mut out)
        .unwrap();
    assert_eq!(out[..n].to_vec(), hex(expected));
}

#[test]
fn nonce_zero_is_all_zero_iv() {
    assert_eq!(nonce_to_iv(0), [0u8; 12]);
}

#[test]
fn aes128_gcm_nist_cases_1_and_2() {
    gcm_case(&[0u8; 16], &[], "58e2fccefa7e3061367f1d57a4e7455a");
    gcm_case(
        &[0u8; 16],
        &[0u8; 16],
        "0388dace60b6a392f328c2b971b2fe78ab6e47d42cec13bdf53a67b21257bddf",
    );
}

#[test]
fn aes256_gcm_nist_cases_13_and_14() {
    gcm_case(&[0u8; 32], &[], "530f8afbc74536b9a963b4f1c4cb738b");
    gcm_case(
        &[0u8; 32],
        &[0u8; 16],
        "cea7403d4d606b6e074ec5d3baf39d18d0d1c8a799996bf0265b98b5d48ab919",
    );
}
