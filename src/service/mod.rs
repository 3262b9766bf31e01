//! Vault Service: the orchestration layer behind the HTTP surface.
//!
//! Every credential operation takes the [`Caller`] produced by the
//! identity collaborator and scopes the store call to that caller's owner
//! id; nothing here accepts an owner id from a request body. Generation,
//! strength and validation are pure and need no caller.

pub mod api;

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::audit::{AuditEvent, AuditOperation, AuditOutcome, AuditSink};
use crate::auth::Caller;
use crate::errors::{ErrorKind, Result, VaultError};
use crate::generator::{self, GenerationPolicy};
use crate::strength::{self, PasswordValidation, StrengthAssessment};
use crate::vault::{CredentialId, CredentialMetadata, VaultStore};

use api::{CreateCredentialRequest, GenerateResponse, UpdateCredentialRequest};

pub struct VaultService {
    store: VaultStore,
    audit: Option<Arc<dyn AuditSink>>,
}

impl VaultService {
    pub fn new(store: VaultStore) -> Self {
        Self { store, audit: None }
    }

    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    fn audit<T>(
        &self,
        operation: AuditOperation,
        caller: &Caller,
        id: Option<&CredentialId>,
        result: &Result<T>,
    ) {
        let outcome = match result {
            Ok(_) => AuditOutcome::Success,
            Err(VaultError::NotFound) => AuditOutcome::NotFound,
            Err(VaultError::DecryptionFailed) => AuditOutcome::DecryptionFailed,
            Err(e) if e.kind() == ErrorKind::BadRequest => AuditOutcome::Rejected,
            Err(_) => AuditOutcome::Error,
        };

        if let Err(e) = result {
            match e {
                VaultError::DecryptionFailed => tracing::error!(
                    operation = operation.as_str(),
                    credential_id = id.map(CredentialId::as_str),
                    "stored envelope failed to decrypt"
                ),
                e if e.kind() == ErrorKind::Internal => tracing::error!(
                    operation = operation.as_str(),
                    owner = %caller.owner.fingerprint(),
                    error = %e,
                    "credential operation failed"
                ),
                e => tracing::debug!(
                    operation = operation.as_str(),
                    owner = %caller.owner.fingerprint(),
                    error = %e,
                    "credential operation refused"
                ),
            }
        }

        if let Some(sink) = &self.audit {
            sink.record(&AuditEvent {
                operation,
                owner: &caller.owner,
                credential_id: id,
                outcome,
            });
        }
    }

    pub fn create(
        &self,
        caller: &Caller,
        request: CreateCredentialRequest,
    ) -> Result<CredentialMetadata> {
        let result = request
            .into_new_credential()
            .and_then(|input| self.store.create(&caller.owner, input));

        let id = result.as_ref().ok().map(|meta| &meta.id);
        self.audit(AuditOperation::Create, caller, id, &result);
        if let Ok(meta) = &result {
            tracing::info!(
                owner = %caller.owner.fingerprint(),
                credential_id = %meta.id,
                "credential created"
            );
        }
        result
    }

    pub fn list(&self, caller: &Caller) -> Result<Vec<CredentialMetadata>> {
        self.store.list(&caller.owner)
    }

    /// Decrypt one credential. Each call is authorized and decrypted
    /// afresh; nothing is cached.
    pub fn reveal(&self, caller: &Caller, id: &CredentialId) -> Result<Zeroizing<String>> {
        let result = self.store.reveal(&caller.owner, id);
        self.audit(AuditOperation::Reveal, caller, Some(id), &result);
        result
    }

    pub fn update(
        &self,
        caller: &Caller,
        id: &CredentialId,
        request: UpdateCredentialRequest,
    ) -> Result<CredentialMetadata> {
        let result = self.store.update(&caller.owner, id, request.into());
        self.audit(AuditOperation::Update, caller, Some(id), &result);
        if result.is_ok() {
            tracing::info!(
                owner = %caller.owner.fingerprint(),
                credential_id = %id,
                "credential updated"
            );
        }
        result
    }

    /// Delete one credential. A second delete of the same id is `NotFound`.
    pub fn delete(&self, caller: &Caller, id: &CredentialId) -> Result<()> {
        let result = self.store.delete(&caller.owner, id).and_then(|removed| {
            if removed {
                Ok(())
            } else {
                Err(VaultError::NotFound)
            }
        });
        self.audit(AuditOperation::Delete, caller, Some(id), &result);
        if result.is_ok() {
            tracing::info!(
                owner = %caller.owner.fingerprint(),
                credential_id = %id,
                "credential deleted"
            );
        }
        result
    }

    pub fn generate(&self, policy: &GenerationPolicy) -> Result<GenerateResponse> {
        let password = generator::generate(policy)?;
        let strength = strength::assess(&password);
        Ok(GenerateResponse { password, strength })
    }

    pub fn check_strength(&self, password: &str) -> StrengthAssessment {
        strength::assess(password)
    }

    pub fn validate(&self, password: &str) -> PasswordValidation {
        strength::validate(password)
    }
}
