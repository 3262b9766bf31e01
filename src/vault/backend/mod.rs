//! Storage port for credential records.
//!
//! The vault never talks to a database directly; it goes through
//! [`CredentialRepository`]. Every method that reads or removes a record
//! is scoped by owner, and each implementation must make `replace` and
//! `remove` atomic per record: two concurrent removals of the same id
//! must report exactly one `true`.

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::errors::Result;

use super::credential::{Credential, CredentialId, OwnerId};

pub use memory::MemoryRepository;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;

pub trait CredentialRepository: Send + Sync {
    /// Persist a new record. Ids are unique; inserting an existing id is
    /// a storage error.
    fn insert(&self, credential: Credential) -> Result<()>;

    /// All records of `owner`, oldest first. Records created in the same
    /// instant keep insertion order.
    fn list(&self, owner: &OwnerId) -> Result<Vec<Credential>>;

    /// The record `id` if it exists and belongs to `owner`.
    fn get(&self, owner: &OwnerId, id: &CredentialId) -> Result<Option<Credential>>;

    /// Overwrite the record with the same id and owner. Returns `false`
    /// when no such record exists (never written, deleted meanwhile, or
    /// owned by someone else).
    fn replace(&self, credential: Credential) -> Result<bool>;

    /// Remove the record `id` if it belongs to `owner`. Returns whether a
    /// record was removed.
    fn remove(&self, owner: &OwnerId, id: &CredentialId) -> Result<bool>;
}
