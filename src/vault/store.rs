//! Owner-scoped credential operations.
//!
//! `VaultStore` glues the storage port to the crypto layer. Plaintext
//! passwords go in through `create`/`update` and come out only through
//! `reveal`; everything persisted is metadata plus a [`SecretEnvelope`]
//! sealed under the owner's derived key, with the credential id bound in
//! as associated data.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use zeroize::Zeroizing;

use crate::crypto::{decrypt, encrypt, MasterKey, SecretEnvelope};
use crate::errors::{Result, VaultError};

use super::backend::CredentialRepository;
use super::credential::{
    Credential, CredentialId, CredentialMetadata, CredentialPatch, NewCredential, OwnerId,
};

/// Associated data for a credential's envelope.
fn envelope_aad(id: &CredentialId) -> Vec<u8> {
    format!("credvault:v1:{id}").into_bytes()
}

/// Storage keeps microseconds, so timestamps are truncated up front and
/// what `create` returns matches what `list` reads back.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub struct VaultStore {
    repo: Arc<dyn CredentialRepository>,
    master_key: MasterKey,
}

impl VaultStore {
    pub fn new(repo: Arc<dyn CredentialRepository>, master_key: MasterKey) -> Self {
        Self { repo, master_key }
    }

    fn seal(&self, owner: &OwnerId, id: &CredentialId, password: &str) -> Result<SecretEnvelope> {
        let key = self.master_key.owner_key(owner.as_str())?;
        encrypt(&key, password.as_bytes(), &envelope_aad(id))
    }

    fn open(&self, credential: &Credential) -> Result<Zeroizing<String>> {
        let key = self.master_key.owner_key(credential.owner_id.as_str())?;
        let bytes = decrypt(
            &key,
            &credential.secret_envelope,
            &envelope_aad(&credential.id),
        )?;
        let text = std::str::from_utf8(&bytes).map_err(|_| VaultError::DecryptionFailed)?;
        Ok(Zeroizing::new(text.to_string()))
    }

    /// Validate, encrypt and persist a new credential.
    pub fn create(&self, owner: &OwnerId, input: NewCredential) -> Result<CredentialMetadata> {
        let input = input.sanitized()?;
        let id = CredentialId::generate();
        let secret_envelope = self.seal(owner, &id, &input.password)?;
        let at = now();

        let credential = Credential {
            id,
            owner_id: owner.clone(),
            service_name: input.service_name,
            username: input.username,
            url: input.url,
            notes: input.notes,
            secret_envelope,
            created_at: at,
            updated_at: at,
        };
        let metadata = credential.metadata();
        self.repo.insert(credential)?;
        Ok(metadata)
    }

    /// Metadata of every credential `owner` holds, oldest first.
    pub fn list(&self, owner: &OwnerId) -> Result<Vec<CredentialMetadata>> {
        Ok(self
            .repo
            .list(owner)?
            .iter()
            .map(Credential::metadata)
            .collect())
    }

    /// Decrypt and return one password.
    ///
    /// `NotFound` covers both "no such id" and "someone else's id".
    pub fn reveal(&self, owner: &OwnerId, id: &CredentialId) -> Result<Zeroizing<String>> {
        let credential = self.repo.get(owner, id)?.ok_or(VaultError::NotFound)?;
        self.open(&credential)
    }

    /// Apply a partial update. A new password is re-sealed with a fresh
    /// nonce; `created_at` never changes.
    pub fn update(
        &self,
        owner: &OwnerId,
        id: &CredentialId,
        patch: CredentialPatch,
    ) -> Result<CredentialMetadata> {
        if patch.is_empty() {
            return Err(VaultError::Validation("No fields to update".into()));
        }
        let patch = patch.sanitized()?;
        let mut credential = self.repo.get(owner, id)?.ok_or(VaultError::NotFound)?;

        if let Some(service_name) = patch.service_name {
            credential.service_name = service_name;
        }
        if let Some(username) = patch.username {
            credential.username = username;
        }
        if let Some(url) = patch.url {
            credential.url = url;
        }
        if let Some(notes) = patch.notes {
            credential.notes = notes;
        }
        if let Some(password) = patch.password {
            credential.secret_envelope = self.seal(owner, id, &password)?;
        }
        credential.updated_at = now().max(credential.created_at);

        let metadata = credential.metadata();
        if !self.repo.replace(credential)? {
            // Deleted between the read and the write.
            return Err(VaultError::NotFound);
        }
        Ok(metadata)
    }

    /// Remove a credential. Returns `false` when nothing was removed, so
    /// repeated deletes are harmless.
    pub fn delete(&self, owner: &OwnerId, id: &CredentialId) -> Result<bool> {
        self.repo.remove(owner, id)
    }
}
