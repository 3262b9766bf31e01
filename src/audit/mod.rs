//! Audit trail of credential operations.
//!
//! The service reports every create / reveal / update / delete through an
//! [`AuditSink`]. Events carry the owner fingerprint, the credential id and
//! the outcome; they never carry secrets or raw owner identifiers.
//!
//! Sinks are fire-and-forget: a sink that cannot write must swallow the
//! failure rather than fail the operation being audited.

#[cfg(feature = "sqlite")]
mod log;

#[cfg(feature = "sqlite")]
pub use log::{AuditEntry, AuditLog};

use crate::vault::{CredentialId, OwnerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOperation {
    Create,
    Reveal,
    Update,
    Delete,
}

impl AuditOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Reveal => "reveal",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Success,
    NotFound,
    /// The stored envelope did not open.
    DecryptionFailed,
    /// Input failed validation.
    Rejected,
    Error,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotFound => "not_found",
            Self::DecryptionFailed => "decryption_failed",
            Self::Rejected => "rejected",
            Self::Error => "error",
        }
    }
}

/// One audited operation.
#[derive(Debug, Clone, Copy)]
pub struct AuditEvent<'a> {
    pub operation: AuditOperation,
    pub owner: &'a OwnerId,
    pub credential_id: Option<&'a CredentialId>,
    pub outcome: AuditOutcome,
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent<'_>);
}
