//! `credvault token`: mint a bearer token for an owner.
//!
//! Signs with `CREDVAULT_TOKEN_SECRET`, so the running server accepts
//! the token as long as it shares that secret.

use crate::config::{KeySources, Settings};
use crate::errors::{Result, VaultError};
use crate::vault::OwnerId;

/// Execute the `token` command.
pub fn execute(settings: &Settings, owner: &str, ttl_hours: Option<u32>) -> Result<()> {
    let owner = OwnerId::new(owner)
        .map_err(|_| VaultError::CommandFailed("owner must not be empty".into()))?;
    let authority = settings.resolve_token_authority(&KeySources::from_env())?;

    let ttl = ttl_hours
        .map(|h| chrono::Duration::hours(i64::from(h)))
        .unwrap_or_else(|| settings.token_ttl());
    if ttl <= chrono::Duration::zero() {
        return Err(VaultError::CommandFailed("ttl must be positive".into()));
    }

    println!("{}", authority.issue(&owner, ttl)?);
    Ok(())
}
