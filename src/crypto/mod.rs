//! Cryptographic primitives for CredVault.
//!
//! This module provides:
//! - AES-256-GCM envelope encryption and decryption (`encryption`)
//! - Argon2id passphrase-based master key derivation (`kdf`)
//! - HKDF-based per-owner key derivation and the `MasterKey` wrapper (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, MasterKey, ...};
pub use encryption::{decrypt, encrypt, CipherAlgorithm, SecretEnvelope};
pub use kdf::{derive_master_key, generate_salt, Argon2Params};
pub use keys::{derive_owner_key, MasterKey, KEY_LEN};
