//! Passphrase-based master key derivation using Argon2id.
//!
//! Deployments that prefer a passphrase over a raw base64 key set
//! `CREDVAULT_PASSPHRASE` and a `kdf_salt` in `credvault.toml`; the
//! master key is derived once at startup with the configured
//! `Argon2Params`.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

use super::keys::{MasterKey, KEY_LEN};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Minimum accepted salt length (128 bits).
const MIN_SALT_LEN: usize = 16;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Derive the master key from a passphrase and salt using Argon2id.
///
/// The same passphrase + salt + params always produce the same key.
/// Refuses dangerously weak parameters.
pub fn derive_master_key(
    passphrase: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
) -> Result<MasterKey> {
    if passphrase.is_empty() {
        return Err(VaultError::KeyDerivationFailed(
            "passphrase cannot be empty".into(),
        ));
    }
    if salt.len() < MIN_SALT_LEN {
        return Err(VaultError::KeyDerivationFailed(format!(
            "salt must be at least {MIN_SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }
    if argon2_params.memory_kib < MIN_MEMORY_KIB {
        return Err(VaultError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            argon2_params.memory_kib
        )));
    }
    if argon2_params.iterations < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if argon2_params.parallelism < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(passphrase, salt, &mut key)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    let master = MasterKey::new(key);
    key.zeroize();
    Ok(master)
}

/// Generate a cryptographically random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
