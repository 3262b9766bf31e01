//! `credvault strength`: score a password locally.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::errors::{Result, VaultError};
use crate::strength;

/// Execute the `strength` command.
///
/// The password comes from, in order: the argument, piped stdin, or a
/// hidden prompt.
pub fn execute(password: Option<&str>) -> Result<()> {
    let password = match password {
        Some(p) => {
            output::warning("Password provided on command line; it may appear in shell history.");
            Zeroizing::new(p.to_string())
        }
        None if !io::stdin().is_terminal() => {
            let mut buf = Zeroizing::new(String::new());
            io::stdin().read_to_string(&mut buf)?;
            let trimmed = buf.trim_end_matches(['\r', '\n']).len();
            buf.truncate(trimmed);
            buf
        }
        None => Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Password to check")
                .allow_empty_password(true)
                .interact()
                .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?,
        ),
    };

    let assessment = strength::assess(&password);
    output::print_strength(&assessment);

    let validation = strength::validate(&password);
    if validation.is_valid {
        output::success("Meets the minimum password policy.");
    } else {
        for issue in &validation.issues {
            output::warning(issue);
        }
    }
    Ok(())
}
