//! `credvault generate`: print (or copy) a random password and its score.

use crate::cli::output;
use crate::errors::{Result, VaultError};
use crate::generator::{self, GenerationPolicy};
use crate::strength;

/// Class toggles as given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateArgs {
    pub length: usize,
    pub no_uppercase: bool,
    pub no_lowercase: bool,
    pub no_digits: bool,
    pub no_special: bool,
    pub exclude_ambiguous: bool,
    pub copy: bool,
}

impl GenerateArgs {
    pub fn policy(&self) -> GenerationPolicy {
        GenerationPolicy {
            length: self.length,
            use_uppercase: !self.no_uppercase,
            use_lowercase: !self.no_lowercase,
            use_digits: !self.no_digits,
            use_special: !self.no_special,
            exclude_ambiguous: self.exclude_ambiguous,
        }
    }
}

/// Execute the `generate` command.
pub fn execute(args: &GenerateArgs) -> Result<()> {
    let password = generator::generate(&args.policy())?;
    let assessment = strength::assess(&password);

    if args.copy {
        copy_to_clipboard(&password)?;
        output::success("Password copied to clipboard.");
    } else {
        println!("{password}");
    }

    output::print_strength(&assessment);
    Ok(())
}

fn copy_to_clipboard(password: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| VaultError::CommandFailed(format!("clipboard unavailable: {e}")))?;
    clipboard
        .set_text(password.to_owned())
        .map_err(|e| VaultError::CommandFailed(format!("clipboard write failed: {e}")))
}
