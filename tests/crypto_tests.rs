//! Integration tests for the CredVault crypto module.

use credvault::crypto::{
    decrypt, derive_master_key, derive_owner_key, encrypt, generate_salt, Argon2Params,
    CipherAlgorithm, MasterKey,
};
use credvault::errors::VaultError;
use proptest::prelude::*;

fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Envelope encryption
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = b"Tr0ub4dor&3";

    let envelope = encrypt(&key, plaintext, b"aad").expect("encrypt should succeed");
    assert_eq!(envelope.algorithm, CipherAlgorithm::Aes256Gcm);
    assert_eq!(envelope.nonce.len(), 12);
    // Ciphertext carries the 16-byte tag.
    assert_eq!(envelope.ciphertext.len(), plaintext.len() + 16);

    let recovered = decrypt(&key, &envelope, b"aad").expect("decrypt should succeed");
    assert_eq!(recovered.as_slice(), plaintext);
}

#[test]
fn encrypt_uses_a_fresh_nonce_each_time() {
    let key = [0xCDu8; 32];

    let a = encrypt(&key, b"same", b"").expect("encrypt 1");
    let b = encrypt(&key, b"same", b"").expect("encrypt 2");

    assert_ne!(a.nonce, b.nonce);
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[test]
fn decrypt_with_wrong_key_fails_closed() {
    let envelope = encrypt(&[0x11u8; 32], b"TOP_SECRET", b"").expect("encrypt");
    assert!(matches!(
        decrypt(&[0x22u8; 32], &envelope, b""),
        Err(VaultError::DecryptionFailed)
    ));
}

#[test]
fn decrypt_with_other_aad_fails_closed() {
    let key = [0x33u8; 32];
    let envelope = encrypt(&key, b"secret", b"credvault:v1:one").expect("encrypt");
    assert!(matches!(
        decrypt(&key, &envelope, b"credvault:v1:two"),
        Err(VaultError::DecryptionFailed)
    ));
}

#[test]
fn decrypt_with_corrupted_ciphertext_fails() {
    let key = [0xBBu8; 32];
    let mut envelope = encrypt(&key, b"VALUE=abc", b"").expect("encrypt");
    envelope.ciphertext[0] ^= 0xFF;

    assert!(matches!(
        decrypt(&key, &envelope, b""),
        Err(VaultError::DecryptionFailed)
    ));
}

#[test]
fn decrypt_with_truncated_ciphertext_fails() {
    let key = [0xAAu8; 32];
    let mut envelope = encrypt(&key, b"abc", b"").expect("encrypt");
    envelope.ciphertext.truncate(5);
    assert!(matches!(
        decrypt(&key, &envelope, b""),
        Err(VaultError::DecryptionFailed)
    ));
}

#[test]
fn failure_message_carries_no_detail() {
    let envelope = encrypt(&[1u8; 32], b"hunter2", b"").expect("encrypt");
    let err = decrypt(&[2u8; 32], &envelope, b"").unwrap_err();
    let msg = err.to_string();
    assert!(!msg.contains("hunter2"));
    assert_eq!(err.public_message(), "Failed to decrypt password");
}

proptest! {
    #[test]
    fn roundtrip_for_any_secret(secret in ".{0,200}", key in any::<[u8; 32]>()) {
        let envelope = encrypt(&key, secret.as_bytes(), b"x").unwrap();
        let recovered = decrypt(&key, &envelope, b"x").unwrap();
        prop_assert_eq!(recovered.as_slice(), secret.as_bytes());
    }

    #[test]
    fn any_other_key_fails(
        secret in ".{0,64}",
        key in any::<[u8; 32]>(),
        other in any::<[u8; 32]>(),
    ) {
        prop_assume!(key != other);
        let envelope = encrypt(&key, secret.as_bytes(), b"").unwrap();
        prop_assert!(matches!(
            decrypt(&other, &envelope, b""),
            Err(VaultError::DecryptionFailed)
        ));
    }
}

// ---------------------------------------------------------------------------
// Key derivation (Argon2id)
// ---------------------------------------------------------------------------

#[test]
fn derive_master_key_same_inputs_same_output() {
    let salt = generate_salt();

    let key1 = derive_master_key(b"my-secure-passphrase", &salt, &fast_params()).expect("derive 1");
    let key2 = derive_master_key(b"my-secure-passphrase", &salt, &fast_params()).expect("derive 2");

    assert_eq!(key1.as_bytes(), key2.as_bytes());
}

#[test]
fn derive_master_key_different_passphrases_different_keys() {
    let salt = generate_salt();

    let key1 = derive_master_key(b"passphrase-one", &salt, &fast_params()).expect("derive 1");
    let key2 = derive_master_key(b"passphrase-two", &salt, &fast_params()).expect("derive 2");

    assert_ne!(key1.as_bytes(), key2.as_bytes());
}

// ---------------------------------------------------------------------------
// HKDF per-owner key derivation
// ---------------------------------------------------------------------------

#[test]
fn owners_get_different_keys() {
    let master = [0x99u8; 32];

    let alice = derive_owner_key(&master, "alice").expect("derive alice");
    let bob = derive_owner_key(&master, "bob").expect("derive bob");

    assert_ne!(*alice, *bob);
}

#[test]
fn master_key_wrapper_matches_free_function() {
    let raw = [0x44u8; 32];
    let mk = MasterKey::new(raw);

    let via_wrapper = mk.owner_key("alice").expect("wrapper derive");
    let via_fn = derive_owner_key(&raw, "alice").expect("fn derive");
    assert_eq!(*via_wrapper, *via_fn);
}

// ---------------------------------------------------------------------------
// End-to-end: passphrase -> master key -> owner key -> encrypt/decrypt
// ---------------------------------------------------------------------------

#[test]
fn full_crypto_pipeline() {
    let salt = generate_salt();
    let master = derive_master_key(b"correct horse battery staple", &salt, &fast_params())
        .expect("derive master");

    let owner_key = master.owner_key("alice").expect("derive owner key");
    let envelope = encrypt(&owner_key, b"s3cret!", b"credvault:v1:abc").expect("encrypt");

    let recovered = decrypt(&owner_key, &envelope, b"credvault:v1:abc").expect("decrypt");
    assert_eq!(recovered.as_slice(), b"s3cret!");

    let bob_key = master.owner_key("bob").expect("derive bob");
    assert!(decrypt(&bob_key, &envelope, b"credvault:v1:abc").is_err());
}
