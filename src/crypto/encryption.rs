//! AES-256-GCM authenticated encryption of a single secret.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! returns it inside a [`SecretEnvelope`] together with the algorithm
//! tag and the ciphertext (which carries the 16-byte auth tag).
//!
//! Associated data is authenticated but not stored: the caller must
//! supply the same bytes to `decrypt` (the vault binds the credential id
//! this way, so an envelope moved to another record fails to open).

use std::fmt;
use std::str::FromStr;

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

use super::keys::KEY_LEN;

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Algorithm tag recorded in every envelope.
///
/// A tag this build does not know is carried through unchanged so the
/// record stays listable; only decrypting it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherAlgorithm {
    Aes256Gcm,
    Unrecognized(String),
}

impl CipherAlgorithm {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Aes256Gcm => "aes-256-gcm",
            Self::Unrecognized(tag) => tag,
        }
    }

    /// Read a stored tag. Never fails.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse()
            .unwrap_or_else(|_| Self::Unrecognized(tag.to_string()))
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CipherAlgorithm {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "aes-256-gcm" => Ok(Self::Aes256Gcm),
            // Unknown tags are an at-rest integrity problem, not a caller error.
            _ => Err(VaultError::DecryptionFailed),
        }
    }
}

/// Ciphertext plus everything needed to decrypt it, except the key.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretEnvelope {
    pub algorithm: CipherAlgorithm,
    pub nonce: Vec<u8>,
    /// Ciphertext with the auth tag appended.
    pub ciphertext: Vec<u8>,
}

impl fmt::Debug for SecretEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretEnvelope")
            .field("algorithm", &self.algorithm)
            .field("nonce", &"[redacted]")
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

/// Encrypt `plaintext` with a 32-byte `key`, authenticating `aad`.
pub fn encrypt(key: &[u8; KEY_LEN], plaintext: &[u8], aad: &[u8]) -> Result<SecretEnvelope> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok(SecretEnvelope {
        algorithm: CipherAlgorithm::Aes256Gcm,
        nonce: nonce.to_vec(),
        ciphertext,
    })
}

/// Decrypt an envelope produced by `encrypt`.
///
/// Fails closed: a wrong key, a flipped bit, a truncated envelope or
/// mismatched associated data all yield `DecryptionFailed` and no
/// plaintext. The result is wiped from memory when dropped.
pub fn decrypt(
    key: &[u8; KEY_LEN],
    envelope: &SecretEnvelope,
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if envelope.algorithm != CipherAlgorithm::Aes256Gcm
        || envelope.nonce.len() != NONCE_LEN
        || envelope.ciphertext.len() < TAG_LEN
    {
        return Err(VaultError::DecryptionFailed);
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| VaultError::DecryptionFailed)?;
    let nonce = Nonce::from_slice(&envelope.nonce);

    let plaintext = cipher
        .decrypt(
            nonce,
            Payload {
                msg: &envelope.ciphertext,
                aad,
            },
        )
        .map_err(|_| VaultError::DecryptionFailed)?;

    Ok(Zeroizing::new(plaintext))
}
