//! In-process storage backed by a sharded concurrent map.
//!
//! Used when no `database_path` is configured, and in tests. Records on
//! different shards never contend; per-record updates and removals go
//! through the map's entry locks, so they are atomic.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::errors::{Result, VaultError};
use crate::vault::credential::{Credential, CredentialId, OwnerId};

use super::CredentialRepository;

struct StoredCredential {
    /// Insertion counter, breaks ties between equal `created_at`.
    seq: u64,
    credential: Credential,
}

#[derive(Default)]
pub struct MemoryRepository {
    entries: DashMap<CredentialId, StoredCredential>,
    next_seq: AtomicU64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all owners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CredentialRepository for MemoryRepository {
    fn insert(&self, credential: Credential) -> Result<()> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        match self.entries.entry(credential.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(VaultError::Storage(format!(
                "duplicate credential id {}",
                credential.id
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(StoredCredential { seq, credential });
                Ok(())
            }
        }
    }

    fn list(&self, owner: &OwnerId) -> Result<Vec<Credential>> {
        let mut owned: Vec<(u64, Credential)> = self
            .entries
            .iter()
            .filter(|entry| entry.credential.owner_id == *owner)
            .map(|entry| (entry.seq, entry.credential.clone()))
            .collect();

        owned.sort_by(|(seq_a, a), (seq_b, b)| {
            a.created_at.cmp(&b.created_at).then(seq_a.cmp(seq_b))
        });

        Ok(owned.into_iter().map(|(_, c)| c).collect())
    }

    fn get(&self, owner: &OwnerId, id: &CredentialId) -> Result<Option<Credential>> {
        Ok(self
            .entries
            .get(id)
            .filter(|entry| entry.credential.owner_id == *owner)
            .map(|entry| entry.credential.clone()))
    }

    fn replace(&self, credential: Credential) -> Result<bool> {
        match self.entries.get_mut(&credential.id) {
            Some(mut entry) if entry.credential.owner_id == credential.owner_id => {
                entry.credential = credential;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn remove(&self, owner: &OwnerId, id: &CredentialId) -> Result<bool> {
        Ok(self
            .entries
            .remove_if(id, |_, entry| entry.credential.owner_id == *owner)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{CipherAlgorithm, SecretEnvelope};
    use chrono::Utc;

    fn record(owner: &str, service: &str) -> Credential {
        let now = Utc::now();
        Credential {
            id: CredentialId::generate(),
            owner_id: OwnerId::new(owner).unwrap(),
            service_name: service.to_string(),
            username: "user".to_string(),
            url: None,
            notes: None,
            secret_envelope: SecretEnvelope {
                algorithm: CipherAlgorithm::Aes256Gcm,
                nonce: vec![0; 12],
                ciphertext: vec![0; 16],
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn list_is_scoped_and_ordered() {
        let repo = MemoryRepository::new();
        let a1 = record("alice", "one");
        let b1 = record("bob", "other");
        let mut a2 = record("alice", "two");
        // Same timestamp: insertion order decides.
        a2.created_at = a1.created_at;
        repo.insert(a1).unwrap();
        repo.insert(b1).unwrap();
        repo.insert(a2).unwrap();

        let alice = OwnerId::new("alice").unwrap();
        let names: Vec<String> = repo
            .list(&alice)
            .unwrap()
            .into_iter()
            .map(|c| c.service_name)
            .collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let repo = MemoryRepository::new();
        let rec = record("alice", "one");
        repo.insert(rec.clone()).unwrap();
        assert!(matches!(repo.insert(rec), Err(VaultError::Storage(_))));
    }

    #[test]
    fn foreign_owner_cannot_get_replace_or_remove() {
        let repo = MemoryRepository::new();
        let rec = record("alice", "one");
        let id = rec.id.clone();
        repo.insert(rec.clone()).unwrap();

        let bob = OwnerId::new("bob").unwrap();
        assert!(repo.get(&bob, &id).unwrap().is_none());
        assert!(!repo.remove(&bob, &id).unwrap());

        let mut hijack = rec;
        hijack.owner_id = bob;
        hijack.service_name = "stolen".into();
        assert!(!repo.replace(hijack).unwrap());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn remove_twice_reports_once() {
        let repo = MemoryRepository::new();
        let rec = record("alice", "one");
        let id = rec.id.clone();
        let owner = rec.owner_id.clone();
        repo.insert(rec).unwrap();

        assert!(repo.remove(&owner, &id).unwrap());
        assert!(!repo.remove(&owner, &id).unwrap());
        assert!(repo.is_empty());
    }
}
