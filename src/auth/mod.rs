//! Caller identity.
//!
//! Login and registration live outside this crate. The HTTP layer only
//! needs something that turns a bearer credential into a stable owner
//! identifier; that is the [`IdentityProvider`] seam. [`TokenAuthority`]
//! is the provider shipped with the binary.

pub mod token;

use crate::errors::Result;
use crate::vault::OwnerId;

pub use token::TokenAuthority;

/// The authenticated principal behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub owner: OwnerId,
}

pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer credential. Anything that is not a currently valid
    /// credential is `VaultError::Unauthorized`.
    fn authenticate(&self, bearer: &str) -> Result<Caller>;
}
