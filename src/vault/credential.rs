//! Credential records and the values used to create or change them.
//!
//! A stored [`Credential`] holds plaintext metadata and a
//! [`SecretEnvelope`]; the plaintext password only ever exists in
//! [`NewCredential`] / [`CredentialPatch`] on the way in and in the
//! result of a reveal on the way out.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::crypto::SecretEnvelope;
use crate::errors::{Result, VaultError};

/// Maximum length of `service_name`, in characters.
pub const MAX_SERVICE_NAME_LEN: usize = 120;
/// Maximum length of `username`, in characters.
pub const MAX_USERNAME_LEN: usize = 120;
/// Maximum length of `url`, in characters.
pub const MAX_URL_LEN: usize = 255;
/// Maximum length of `notes`, in characters.
pub const MAX_NOTES_LEN: usize = 1000;

/// Identifier of the authenticated principal that owns a credential.
///
/// Opaque to the vault; only equality matters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wrap an identity supplied by the auth collaborator.
    ///
    /// An empty identity is never a valid caller.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(VaultError::Unauthorized);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short, stable, non-reversible tag for logs and the audit trail.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        digest[..6].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.fingerprint())
    }
}

/// Opaque, immutable credential identifier (a random UUID v4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(String);

impl CredentialId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CredentialId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CredentialId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored credential, exactly as the storage port persists it.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: CredentialId,
    pub owner_id: OwnerId,
    pub service_name: String,
    pub username: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub secret_envelope: SecretEnvelope,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn metadata(&self) -> CredentialMetadata {
        CredentialMetadata {
            id: self.id.clone(),
            service_name: self.service_name.clone(),
            username: self.username.clone(),
            url: self.url.clone(),
            notes: self.notes.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The list view of a credential. Has no secret field at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialMetadata {
    pub id: CredentialId,
    pub service_name: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a credential.
pub struct NewCredential {
    pub service_name: String,
    pub username: String,
    pub password: Zeroizing<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

impl NewCredential {
    pub fn new(
        service_name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            username: username.into(),
            password: Zeroizing::new(password.into()),
            url: None,
            notes: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Trim metadata and check every field limit.
    ///
    /// The password is never trimmed: surrounding whitespace is part of
    /// the secret.
    pub fn sanitized(self) -> Result<Self> {
        let service_name = required("service_name", &self.service_name, MAX_SERVICE_NAME_LEN)?;
        let username = required("username", &self.username, MAX_USERNAME_LEN)?;
        if self.password.is_empty() {
            return Err(VaultError::Validation(
                "Missing required field: password".into(),
            ));
        }
        let url = optional("URL", self.url.as_deref(), MAX_URL_LEN)?;
        let notes = optional("Notes", self.notes.as_deref(), MAX_NOTES_LEN)?;

        Ok(Self {
            service_name,
            username,
            password: self.password,
            url,
            notes,
        })
    }
}

impl fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCredential")
            .field("service_name", &self.service_name)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("url", &self.url)
            .field("notes", &self.notes)
            .finish()
    }
}

/// Partial update. `None` leaves a field unchanged; an empty `url` or
/// `notes` clears it.
#[derive(Default)]
pub struct CredentialPatch {
    pub service_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

impl CredentialPatch {
    pub fn is_empty(&self) -> bool {
        self.service_name.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.url.is_none()
            && self.notes.is_none()
    }

    /// Validate the fields that are present.
    pub fn sanitized(self) -> Result<SanitizedPatch> {
        let service_name = self
            .service_name
            .map(|v| required("service_name", &v, MAX_SERVICE_NAME_LEN))
            .transpose()?;
        let username = self
            .username
            .map(|v| required("username", &v, MAX_USERNAME_LEN))
            .transpose()?;
        if self.password.as_ref().is_some_and(|p| p.is_empty()) {
            return Err(VaultError::Validation("Password cannot be empty".into()));
        }
        let url = self
            .url
            .map(|v| optional("URL", Some(v.as_str()), MAX_URL_LEN))
            .transpose()?;
        let notes = self
            .notes
            .map(|v| optional("Notes", Some(v.as_str()), MAX_NOTES_LEN))
            .transpose()?;

        Ok(SanitizedPatch {
            service_name,
            username,
            password: self.password,
            url,
            notes,
        })
    }
}

impl fmt::Debug for CredentialPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPatch")
            .field("service_name", &self.service_name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("url", &self.url)
            .field("notes", &self.notes)
            .finish()
    }
}

/// A validated patch. For `url` and `notes`, `Some(None)` means "clear".
pub struct SanitizedPatch {
    pub service_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub url: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

fn field_label(field: &str) -> &str {
    match field {
        "service_name" => "Service name",
        "username" => "Username",
        other => other,
    }
}

fn required(field: &str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(VaultError::Validation(format!(
            "Missing required field: {field}"
        )));
    }
    if value.chars().count() > max {
        return Err(VaultError::Validation(format!(
            "{} too long (max {max} characters)",
            field_label(field)
        )));
    }
    Ok(value.to_string())
}

fn optional(label: &str, value: Option<&str>, max: usize) -> Result<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > max {
        return Err(VaultError::Validation(format!(
            "{label} too long (max {max} characters)"
        )));
    }
    Ok(Some(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_id_rejects_blank() {
        assert!(matches!(OwnerId::new(""), Err(VaultError::Unauthorized)));
        assert!(matches!(OwnerId::new("   "), Err(VaultError::Unauthorized)));
        assert!(OwnerId::new("alice").is_ok());
    }

    #[test]
    fn owner_debug_shows_fingerprint_only() {
        let owner = OwnerId::new("alice@example.com").unwrap();
        let out = format!("{owner:?}");
        assert!(!out.contains("alice"));
        assert_eq!(owner.fingerprint().len(), 12);
    }

    #[test]
    fn sanitized_trims_metadata_but_not_password() {
        let input = NewCredential::new("  GitHub ", " alice ", " pw ")
            .with_url("  ")
            .with_notes(" work account ");
        let clean = input.sanitized().unwrap();
        assert_eq!(clean.service_name, "GitHub");
        assert_eq!(clean.username, "alice");
        assert_eq!(clean.password.as_str(), " pw ");
        assert_eq!(clean.url, None);
        assert_eq!(clean.notes.as_deref(), Some("work account"));
    }

    #[test]
    fn sanitized_reports_missing_fields() {
        let err = NewCredential::new("", "alice", "pw").sanitized().unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: service_name");

        let err = NewCredential::new("GitHub", "  ", "pw")
            .sanitized()
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: username");

        let err = NewCredential::new("GitHub", "alice", "")
            .sanitized()
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: password");
    }

    #[test]
    fn sanitized_enforces_limits() {
        let long = "x".repeat(MAX_SERVICE_NAME_LEN + 1);
        let err = NewCredential::new(long, "alice", "pw").sanitized().unwrap_err();
        assert_eq!(err.to_string(), "Service name too long (max 120 characters)");

        let err = NewCredential::new("GitHub", "alice", "pw")
            .with_notes("n".repeat(MAX_NOTES_LEN + 1))
            .sanitized()
            .unwrap_err();
        assert_eq!(err.to_string(), "Notes too long (max 1000 characters)");
    }

    #[test]
    fn debug_redacts_password() {
        let input = NewCredential::new("GitHub", "alice", "Tr0ub4dor&3");
        assert!(!format!("{input:?}").contains("Tr0ub4dor"));

        let patch = CredentialPatch {
            password: Some(Zeroizing::new("Tr0ub4dor&3".into())),
            ..CredentialPatch::default()
        };
        assert!(!format!("{patch:?}").contains("Tr0ub4dor"));
    }

    #[test]
    fn patch_empty_url_clears() {
        let patch = CredentialPatch {
            url: Some(String::new()),
            ..CredentialPatch::default()
        };
        let clean = patch.sanitized().unwrap();
        assert_eq!(clean.url, Some(None));
        assert!(clean.notes.is_none());
    }
}
