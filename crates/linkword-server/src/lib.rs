//! Linkword Server
//!
//! HTTP front end for the word connection game. Loads configuration,
//! opens the SQLite store, builds the configured oracle provider and
//! serves the game routes with axum.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState, Game};
use linkword_game::{GameError, GameService};
use linkword_llm::{LlmError, Provider};
use linkword_oracle::PromptOracle;
use linkword_store::{SqliteStore, StoreError};
use std::path::Path;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding or file error
    #[error("I/O error: {0}")]
    Bind(#[from] std::io::Error),

    /// Store could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Oracle provider could not be built
    #[error("Provider error: {0}")]
    Llm(#[from] LlmError),

    /// Game service error
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `default_level`. Calling this twice is
/// harmless; the second call leaves the first subscriber in place.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Open the store, build the oracle and assemble the game
pub fn build_game(config: &ServerConfig) -> Result<Game, ServerError> {
    let store = SqliteStore::new(&config.database_path)?;
    let provider = Provider::from_config(&config.oracle)?;
    info!("Oracle provider: {} ({})", provider.name(), config.oracle.model);

    Ok(GameService::new(
        store,
        PromptOracle::new(provider),
        config.game.clone(),
    )?)
}

/// Build the shared application state
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    Ok(AppState::new(build_game(config)?, config.api_key.as_str()))
}

/// Create the database schema if it does not exist yet
///
/// Returns the current pool size.
pub fn init_database(config: &ServerConfig) -> Result<usize, ServerError> {
    let game = build_game(config)?;
    let size = game.pool().size()?;
    info!(
        "Database ready at {} ({} words)",
        config.database_path.display(),
        size
    );
    Ok(size)
}

/// Import words from a file, one per line
///
/// Blank lines and words already in the pool are skipped. Returns the
/// number of words added.
pub fn import_words<P: AsRef<Path>>(config: &ServerConfig, path: P) -> Result<usize, ServerError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let lines: Vec<&str> = contents.lines().collect();

    let game = build_game(config)?;
    let added = game.pool().add_batch(&lines)?;
    info!(
        "Imported {} new words from {}",
        added,
        path.as_ref().display()
    );
    Ok(added)
}

/// Start the HTTP server
///
/// Opens the store, builds the oracle provider and serves until the
/// process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Linkword server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path.display());
    info!("Connection size: {}", config.game.connection_size);

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkword_llm::ProviderKind;

    fn file_config(dir: &tempfile::TempDir) -> ServerConfig {
        ServerConfig {
            database_path: dir.path().join("linkword.db"),
            ..ServerConfig::default_test_config()
        }
    }

    #[test]
    fn test_import_words_skips_blanks_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(&dir);
        let words = dir.path().join("words.txt");
        std::fs::write(&words, "golf\n\nbudget\n  \ngolf\nGolf\nholiday\n").unwrap();

        assert_eq!(import_words(&config, &words).unwrap(), 3);
        assert_eq!(import_words(&config, &words).unwrap(), 0);
        assert_eq!(init_database(&config).unwrap(), 3);
    }

    #[test]
    fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(&dir);
        let err = import_words(&config, dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, ServerError::Bind(_)));
    }

    #[test]
    fn test_openai_without_key_fails_to_build() {
        let mut config = ServerConfig::default_test_config();
        config.oracle.kind = ProviderKind::OpenAi;
        config.oracle.api_key = None;
        assert!(build_state(&config).is_err());
    }
}
