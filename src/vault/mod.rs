//! Vault module: credential records, storage backends and the
//! owner-scoped `VaultStore`.

pub mod backend;
pub mod credential;
pub mod store;

pub use backend::{CredentialRepository, MemoryRepository};
#[cfg(feature = "sqlite")]
pub use backend::SqliteRepository;
pub use credential::{
    Credential, CredentialId, CredentialMetadata, CredentialPatch, NewCredential, OwnerId,
};
pub use store::VaultStore;
