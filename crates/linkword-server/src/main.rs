//! Linkword server CLI
//!
//! Serves the game over HTTP and runs maintenance tasks on its database.

use anyhow::Context;
use clap::{Parser, Subcommand};
use linkword_server::{
    config::ServerConfig, import_words, init_database, init_tracing, start_server,
};
use std::path::PathBuf;

/// Linkword - a word connection game server.
#[derive(Debug, Parser)]
#[command(name = "linkword")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "LINKWORD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve,

    /// Add words from a file, one per line
    ImportWords {
        /// Word list file
        file: PathBuf,
    },

    /// Create the database schema and report the pool size
    InitDb,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => start_server(config).await?,
        Command::ImportWords { file } => {
            let added = import_words(&config, &file)
                .with_context(|| format!("importing {}", file.display()))?;
            println!("Added {} words", added);
        }
        Command::InitDb => {
            let size = init_database(&config)?;
            println!(
                "Database ready at {} ({} words)",
                config.database_path.display(),
                size
            );
        }
    }

    Ok(())
}

/// Load the config file, or fall back to defaults plus environment overrides
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => {
            eprintln!("Warning: No config file specified, using defaults");
            eprintln!("Usage: linkword --config <path-to-config.toml>");
            let mut config = ServerConfig::from_toml("")?;
            config.apply_env();
            config
                .validate()
                .context("set LINKWORD_API_KEY or pass --config")?;
            Ok(config)
        }
    }
}
