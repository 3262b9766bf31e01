//! Request and response bodies of the service contract.
//!
//! Request fields are all optional at the serde level so that a missing
//! field surfaces as a `Validation` error with a field-specific message
//! instead of a generic deserialization failure.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};
use crate::strength::StrengthAssessment;
use crate::vault::{CredentialMetadata, CredentialPatch, NewCredential};

#[derive(Default, Deserialize)]
pub struct CreateCredentialRequest {
    pub service_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

impl CreateCredentialRequest {
    pub fn into_new_credential(self) -> Result<NewCredential> {
        let service_name = self.service_name.ok_or_else(|| missing("service_name"))?;
        let username = self.username.ok_or_else(|| missing("username"))?;
        let password = Zeroizing::new(self.password.ok_or_else(|| missing("password"))?);

        Ok(NewCredential {
            service_name,
            username,
            password,
            url: self.url,
            notes: self.notes,
        })
    }
}

impl fmt::Debug for CreateCredentialRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateCredentialRequest")
            .field("service_name", &self.service_name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

/// Update body. For `url` and `notes`, an absent key leaves the field
/// alone while `null` or `""` clears it.
#[derive(Default, Deserialize)]
pub struct UpdateCredentialRequest {
    pub service_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
}

/// Marks a key that appeared in the body, even with a `null` value.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<UpdateCredentialRequest> for CredentialPatch {
    fn from(req: UpdateCredentialRequest) -> Self {
        CredentialPatch {
            service_name: req.service_name,
            username: req.username,
            password: req.password.map(Zeroizing::new),
            url: req.url.map(Option::unwrap_or_default),
            notes: req.notes.map(Option::unwrap_or_default),
        }
    }
}

impl fmt::Debug for UpdateCredentialRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateCredentialRequest")
            .field("service_name", &self.service_name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

/// Body of the strength and validate requests.
#[derive(Default, Deserialize)]
pub struct PasswordRequest {
    pub password: Option<String>,
}

impl PasswordRequest {
    pub fn into_password(self) -> Result<Zeroizing<String>> {
        self.password
            .map(Zeroizing::new)
            .ok_or_else(|| missing("password"))
    }
}

impl fmt::Debug for PasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordRequest([redacted])")
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialResponse {
    pub message: String,
    pub credential: CredentialMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{password}` for a reveal. The plaintext is wiped once the response has
/// been serialized and dropped.
pub struct RevealResponse {
    pub password: Zeroizing<String>,
}

impl Serialize for RevealResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RevealResponse", 1)?;
        state.serialize_field("password", self.password.as_str())?;
        state.end()
    }
}

impl fmt::Debug for RevealResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RevealResponse([redacted])")
    }
}

#[derive(Serialize, Deserialize)]
pub struct GenerateResponse {
    pub password: String,
    pub strength: StrengthAssessment,
}

impl fmt::Debug for GenerateResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateResponse")
            .field("password", &"[redacted]")
            .field("strength", &self.strength)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StrengthResponse {
    pub strength: StrengthAssessment,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

fn missing(field: &str) -> VaultError {
    VaultError::Validation(format!("Missing required field: {field}"))
}
