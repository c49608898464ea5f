use clap::Parser;
use sealvault::cli::commands;
use sealvault::cli::{init_logging, load_settings, output, Cli, Commands};
use sealvault::Vault;

fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    };
    init_logging(cli.verbose, &settings);

    // Completions need no vault.
    if let Commands::Completions { shell } = cli.command {
        if let Err(e) = commands::completions::execute(shell) {
            output::error(&e.to_string());
            std::process::exit(1);
        }
        return;
    }

    let vault = match Vault::with_settings(settings) {
        Ok(vault) => vault,
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Random { len } => commands::random::execute(&vault, len),
        Commands::Hash { ref text, ref file } => {
            commands::hash::execute(&vault, text.as_deref(), file.as_deref())
        }
        Commands::Keygen {
            key_type,
            persistent,
        } => commands::keygen::execute(&vault, key_type, persistent),
        Commands::Ecdh {
            curve,
            ref private,
            ref peer,
        } => commands::ecdh::execute(&vault, curve, private, peer),
        Commands::Derive {
            ref ikm,
            ref salt,
            count,
        } => commands::derive::execute(&vault, ikm, salt.as_deref(), count),
        Commands::Encrypt {
            ref key,
            nonce,
            ref aad,
            ref plaintext,
        } => commands::encrypt::execute(&vault, key, nonce, aad, plaintext),
        Commands::Decrypt {
            ref key,
            nonce,
            ref aad,
            ref ciphertext,
        } => commands::decrypt::execute(&vault, key, nonce, aad, ciphertext),
        Commands::SelfTest => commands::self_test::execute(&vault),
        Commands::Completions { .. } => Ok(()),
    };

    // Wipe every secret before exiting; process::exit skips destructors.
    vault.deinit();

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
