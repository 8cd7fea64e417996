//! actorkeys CLI application.
//!
//! This binary resolves, creates and prints the signing keys of actors stored
//! in a key directory.

use actorkeys::crypto::keypair::Keypair;
use actorkeys::error::Result;
use actorkeys::storage::config::KeyStoreConfig;
use actorkeys::storage::keystore::{get_or_create, resolve_key, KeyStore};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "actorkeys")]
#[command(about = "actorkeys: per-actor RSA signing keys", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Key storage directory (overrides the configuration file)
    #[arg(long, global = true, env = "ACTORKEYS_KEY_DIR")]
    key_dir: Option<PathBuf>,

    /// Size of newly generated keys in bits (overrides the configuration file)
    #[arg(long, global = true)]
    key_bits: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Key operations
    #[command(subcommand)]
    Key(KeyCommands),
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Load the owner's key, generating and storing it on first use
    Get {
        /// Owner identity (account handle or actor URL)
        #[arg(long)]
        owner: String,
    },

    /// Print the actor document public key descriptor as JSON
    Descriptor {
        #[arg(long)]
        owner: String,
    },

    /// Print the magic public key
    Magic {
        #[arg(long)]
        owner: String,
    },

    /// Print the public key PEM
    Public {
        #[arg(long)]
        owner: String,
    },

    /// Print the key id without touching storage
    Id {
        #[arg(long)]
        owner: String,
    },

    /// Print the storage path without touching storage
    Path {
        #[arg(long)]
        owner: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(cli.config, cli.key_dir, cli.key_bits)?;

    match cli.command {
        Commands::Key(key_cmd) => handle_key_command(key_cmd, config),
    }
}

fn build_config(
    file: Option<PathBuf>,
    key_dir: Option<PathBuf>,
    key_bits: Option<usize>,
) -> Result<KeyStoreConfig> {
    let mut config = match file {
        Some(path) => KeyStoreConfig::from_file(&path)?,
        None => KeyStoreConfig::default(),
    };

    if let Some(key_dir) = key_dir {
        config.key_dir = key_dir;
    }
    if let Some(key_bits) = key_bits {
        config.key_bits = key_bits;
    }

    config.validate()?;
    Ok(config)
}

fn handle_key_command(cmd: KeyCommands, config: KeyStoreConfig) -> Result<()> {
    let keystore = KeyStore::new(config)?;

    match cmd {
        KeyCommands::Get { owner } => {
            let (keypair, created) = resolve_key(&keystore, &owner)?;

            if created {
                println!("Generated key for: {}", owner);
            } else {
                println!("Loaded key for: {}", owner);
            }
            println!("Key id: {}", keypair.key_id());
            println!("Path: {}", keystore.key_path(&owner).display());

            Ok(())
        }

        KeyCommands::Descriptor { owner } => {
            let keypair = get_or_create(&keystore, &owner)?;
            let json = serde_json::to_string_pretty(&keypair.to_descriptor()?)?;
            println!("{}", json);
            Ok(())
        }

        KeyCommands::Magic { owner } => {
            let keypair = get_or_create(&keystore, &owner)?;
            println!("{}", keypair.to_magic_key()?);
            Ok(())
        }

        KeyCommands::Public { owner } => {
            let keypair = get_or_create(&keystore, &owner)?;
            print!("{}", keypair.public_pem()?);
            Ok(())
        }

        KeyCommands::Id { owner } => {
            println!("{}", Keypair::new(owner)?.key_id());
            Ok(())
        }

        KeyCommands::Path { owner } => {
            println!("{}", keystore.key_path(&owner).display());
            Ok(())
        }
    }
}
