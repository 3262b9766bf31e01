//! `credvault keygen`: print a fresh master key or KDF salt.
//!
//! Output is a single base64 line on stdout so it can be captured
//! directly into `CREDVAULT_MASTER_KEY` (or `kdf_salt`).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::crypto::{generate_salt, MasterKey};
use crate::errors::Result;

/// Execute the `keygen` command.
pub fn execute(salt: bool) -> Result<()> {
    if salt {
        println!("{}", BASE64.encode(generate_salt()));
    } else {
        let key = MasterKey::generate();
        println!("{}", key.to_base64().as_str());
    }
    Ok(())
}
