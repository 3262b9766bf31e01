//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;
use crate::errors::Result;

/// CredVault CLI: encrypted credential vault service.
#[derive(Parser)]
#[command(
    name = "credvault",
    about = "Encrypted credential vault service",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory containing credvault.toml
    #[arg(long, default_value = ".", global = true, env = "CREDVAULT_CONFIG_DIR")]
    pub config_dir: PathBuf,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Use a random in-memory master key and token secret (development only)
        #[arg(long)]
        ephemeral: bool,
    },

    /// Generate a random password
    Generate {
        /// Password length (8-128)
        #[arg(short, long, default_value = "16")]
        length: usize,
        /// Leave out uppercase letters
        #[arg(long)]
        no_uppercase: bool,
        /// Leave out lowercase letters
        #[arg(long)]
        no_lowercase: bool,
        /// Leave out digits
        #[arg(long)]
        no_digits: bool,
        /// Leave out special characters
        #[arg(long)]
        no_special: bool,
        /// Leave out look-alike characters (i l 1 I L O 0 o)
        #[arg(long)]
        exclude_ambiguous: bool,
        /// Copy the password to the clipboard instead of printing it
        #[arg(long)]
        copy: bool,
    },

    /// Score a password (prompts if omitted)
    Strength {
        /// Password to score; omit for a hidden prompt
        password: Option<String>,
    },

    /// Print a new random base64 master key
    Keygen {
        /// Print a random kdf_salt instead
        #[arg(long)]
        salt: bool,
    },

    /// Mint a bearer token for an owner
    Token {
        /// Owner identifier
        #[arg(long)]
        owner: String,
        /// Lifetime in hours (default: token_ttl_hours from config)
        #[arg(long)]
        ttl_hours: Option<u32>,
    },

    /// View the audit trail of credential operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },
}

/// Load `credvault.toml` from `--config-dir` and apply `CREDVAULT_*`
/// environment overrides.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(&cli.config_dir)?;
    settings.apply_overrides(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))?;
    Ok(settings)
}
