//! HMAC-signed bearer tokens.
//!
//! Format: `base64url(claims_json) "." hex(HMAC-SHA256(secret, base64url(claims_json)))`
//! with claims `{ "sub": <owner id>, "exp": <unix seconds> }`. The tag is
//! compared in constant time.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};
use crate::vault::OwnerId;

use super::{Caller, IdentityProvider};

/// Shortest signing secret accepted, in bytes.
pub const MIN_SECRET_LEN: usize = 16;

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

pub struct TokenAuthority {
    secret: Zeroizing<Vec<u8>>,
}

impl TokenAuthority {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self> {
        let secret = Zeroizing::new(secret.into());
        if secret.len() < MIN_SECRET_LEN {
            return Err(VaultError::Config(format!(
                "token secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        Ok(Self { secret })
    }

    /// A random signing secret; tokens die with the process.
    pub fn generate() -> Self {
        let mut secret = Zeroizing::new(vec![0u8; 32]);
        rand::rng().fill_bytes(&mut secret);
        Self { secret }
    }

    fn tag(&self, payload: &str) -> Result<Vec<u8>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret)
            .map_err(|e| VaultError::Config(format!("HMAC init failed: {e}")))?;
        mac.update(payload.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Mint a token for `owner` valid for `ttl`.
    pub fn issue(&self, owner: &OwnerId, ttl: Duration) -> Result<String> {
        let expires = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| VaultError::Config(format!("token lifetime out of range: {ttl}")))?;
        let claims = Claims {
            sub: owner.as_str().to_string(),
            exp: expires.timestamp(),
        };
        let json = serde_json::to_vec(&claims)
            .map_err(|e| VaultError::Serialization(format!("token claims: {e}")))?;
        let payload = BASE64URL.encode(json);
        let tag = self.tag(&payload)?;
        Ok(format!("{payload}.{}", to_hex(&tag)))
    }

    /// Check signature and expiry and return the owner.
    pub fn verify(&self, token: &str) -> Result<OwnerId> {
        let (payload, tag_hex) = token.split_once('.').ok_or(VaultError::Unauthorized)?;
        let presented = from_hex(tag_hex).ok_or(VaultError::Unauthorized)?;
        let expected = self.tag(payload)?;
        if !bool::from(expected.as_slice().ct_eq(presented.as_slice())) {
            return Err(VaultError::Unauthorized);
        }

        let json = BASE64URL
            .decode(payload)
            .map_err(|_| VaultError::Unauthorized)?;
        let claims: Claims =
            serde_json::from_slice(&json).map_err(|_| VaultError::Unauthorized)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(VaultError::Unauthorized);
        }
        OwnerId::new(claims.sub)
    }
}

impl IdentityProvider for TokenAuthority {
    fn authenticate(&self, bearer: &str) -> Result<Caller> {
        Ok(Caller {
            owner: self.verify(bearer)?,
        })
    }
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenAuthority([redacted])")
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> TokenAuthority {
        TokenAuthority::new(b"0123456789abcdef0123456789abcdef".to_vec()).unwrap()
    }

    #[test]
    fn issue_then_verify() {
        let auth = authority();
        let owner = OwnerId::new("alice").unwrap();
        let token = auth.issue(&owner, Duration::hours(1)).unwrap();
        assert_eq!(auth.verify(&token).unwrap(), owner);
        assert_eq!(auth.authenticate(&token).unwrap().owner, owner);
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = authority();
        let owner = OwnerId::new("alice").unwrap();
        let token = auth.issue(&owner, Duration::seconds(-5)).unwrap();
        assert!(matches!(auth.verify(&token), Err(VaultError::Unauthorized)));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let auth = authority();
        let token = auth
            .issue(&OwnerId::new("alice").unwrap(), Duration::hours(1))
            .unwrap();
        let (_, tag) = token.split_once('.').unwrap();
        let forged_claims = BASE64URL.encode(br#"{"sub":"bob","exp":9999999999}"#);
        let forged = format!("{forged_claims}.{tag}");
        assert!(matches!(auth.verify(&forged), Err(VaultError::Unauthorized)));
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = authority()
            .issue(&OwnerId::new("alice").unwrap(), Duration::hours(1))
            .unwrap();
        let other = TokenAuthority::generate();
        assert!(matches!(other.verify(&token), Err(VaultError::Unauthorized)));
    }

    #[test]
    fn garbage_is_rejected() {
        let auth = authority();
        for token in ["", "abc", "abc.zz", ".", "a.b.c"] {
            assert!(matches!(auth.verify(token), Err(VaultError::Unauthorized)));
        }
    }

    #[test]
    fn lifetime_past_the_calendar_is_config_error() {
        let owner = OwnerId::new("alice").unwrap();
        let result = authority().issue(&owner, Duration::hours(i64::from(u32::MAX)));
        assert!(matches!(result, Err(VaultError::Config(_))));
    }

    #[test]
    fn short_secret_is_config_error() {
        assert!(matches!(
            TokenAuthority::new(b"short".to_vec()),
            Err(VaultError::Config(_))
        ));
    }
}
