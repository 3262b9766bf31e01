use clap::Parser;
use credvault::cli::commands::generate::GenerateArgs;
use credvault::cli::{load_settings, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { ephemeral } => load_settings(&cli)
            .and_then(|settings| credvault::cli::commands::serve::execute(&settings, ephemeral)),
        Commands::Generate {
            length,
            no_uppercase,
            no_lowercase,
            no_digits,
            no_special,
            exclude_ambiguous,
            copy,
        } => credvault::cli::commands::generate::execute(&GenerateArgs {
            length,
            no_uppercase,
            no_lowercase,
            no_digits,
            no_special,
            exclude_ambiguous,
            copy,
        }),
        Commands::Strength { ref password } => {
            credvault::cli::commands::strength::execute(password.as_deref())
        }
        Commands::Keygen { salt } => credvault::cli::commands::keygen::execute(salt),
        Commands::Token {
            ref owner,
            ttl_hours,
        } => load_settings(&cli).and_then(|settings| {
            credvault::cli::commands::token::execute(&settings, owner, ttl_hours)
        }),
        Commands::Audit { last, ref since } => load_settings(&cli).and_then(|settings| {
            credvault::cli::commands::audit_cmd::execute(&settings, last, since.as_deref())
        }),
    };

    if let Err(e) = result {
        credvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
