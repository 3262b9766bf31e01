//! Key derivation helpers using HKDF-SHA256.
//!
//! The deployment master key never encrypts anything directly. For each
//! owner we derive a dedicated 256-bit cipher key:
//!
//! - `info = "credvault-owner:<owner_id>"`
//!
//! so a key compromise for one owner's derivation does not hand out the
//! master key, and an envelope cannot be opened under another owner.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Result, VaultError};

/// Length of master and derived keys (256 bits).
pub const KEY_LEN: usize = 32;

/// Derive the cipher key for one owner from the master key.
///
/// The returned buffer is zeroed when it goes out of scope, on every
/// exit path.
pub fn derive_owner_key(master_key: &[u8], owner_id: &str) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let info = format!("credvault-owner:{owner_id}");
    hkdf_derive(master_key, info.as_bytes())
}

/// Run HKDF-SHA256 expand with the given `info`.
///
/// The master key is already uniformly random (or came out of Argon2id),
/// so a zero salt is used.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(info, okm.as_mut_slice())
        .map_err(|e| VaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A 32-byte deployment master key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Generate a fresh random master key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        let key = Self::new(bytes);
        bytes.zeroize();
        key
    }

    /// Parse a standard-base64 encoded 32-byte key.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let mut decoded = BASE64
            .decode(encoded.trim())
            .map_err(|_| VaultError::Config("master key is not valid base64".into()))?;

        if decoded.len() != KEY_LEN {
            let len = decoded.len();
            decoded.zeroize();
            return Err(VaultError::Config(format!(
                "master key must be {KEY_LEN} bytes (got {len})"
            )));
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        let key = Self::new(bytes);
        bytes.zeroize();
        Ok(key)
    }

    /// Encode as standard base64 (used by `credvault keygen`).
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(BASE64.encode(self.bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the cipher key for `owner_id`.
    pub fn owner_key(&self, owner_id: &str) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        derive_owner_key(&self.bytes, owner_id)
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([redacted])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_roundtrip() {
        let key = MasterKey::generate();
        let encoded = key.to_base64();
        let parsed = MasterKey::from_base64(&encoded).unwrap();
        assert_eq!(key.as_bytes(), parsed.as_bytes());
    }

    #[test]
    fn from_base64_rejects_wrong_length() {
        let short = BASE64.encode([1u8; 16]);
        assert!(matches!(
            MasterKey::from_base64(&short),
            Err(VaultError::Config(_))
        ));
        assert!(MasterKey::from_base64("not base64 !!").is_err());
    }

    #[test]
    fn debug_never_prints_key_bytes() {
        let key = MasterKey::new([0xAB; KEY_LEN]);
        let out = format!("{key:?}");
        assert_eq!(out, "MasterKey([redacted])");
    }
}
