use thiserror::Error;

/// All errors that can occur in CredVault.
///
/// None of the variants carry plaintext secrets, key material or
/// envelopes. `NotFound` and `DecryptionFailed` carry nothing at all so
/// they cannot leak which record or which owner was involved.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Caller errors ---
    #[error("{0}")]
    Validation(String),

    #[error("Invalid generation policy: {0}")]
    InvalidPolicy(String),

    #[error("Credential not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Audit error: {0}")]
    Audit(String),

    // --- Config errors ---
    #[error("Config error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Coarse classification used by transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller can fix the request and resubmit.
    BadRequest,
    Unauthorized,
    NotFound,
    /// Server-side fault; details stay in the server log.
    Internal,
}

impl VaultError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidPolicy(_) => ErrorKind::BadRequest,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        }
    }

    /// The message a remote caller is allowed to see.
    ///
    /// Server faults collapse to fixed strings so storage paths, SQL
    /// errors and cipher internals stay in the server log.
    pub fn public_message(&self) -> String {
        match self {
            Self::DecryptionFailed => "Failed to decrypt password".to_string(),
            Self::Validation(_) | Self::InvalidPolicy(_) | Self::NotFound | Self::Unauthorized => {
                self.to_string()
            }
            _ => "Internal server error".to_string(),
        }
    }
}

/// Convenience type alias for CredVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
