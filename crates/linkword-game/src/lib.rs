//! Linkword Game Services
//!
//! Application services over a [`PuzzleStore`](linkword_domain::traits::PuzzleStore)
//! and a [`TextOracle`](linkword_domain::traits::TextOracle).
//!
//! # Overview
//!
//! ```text
//! WordPool → ConnectionBuilder → (player selection | oracle + verifier) → ClueValidator → QueryService
//! ```
//!
//! - **WordPool**: add words, sample distinct words
//! - **ConnectionBuilder**: create connections, random selection patterns
//! - **ClueValidator**: attach a clue and its selection as one transaction
//! - **QueryService**: serializable views of connections and clues
//! - **GameService**: all of the above plus the oracle clue and guess flows
//!
//! The oracle is called on a blocking thread under a timeout; a hang or a
//! provider failure surfaces as `OracleUnavailable`. Its output never reaches
//! the store without passing the verifier.
//!
//! # Example Usage
//!
//! ```no_run
//! use linkword_game::{DealPattern, GameConfig, GameService};
//! use linkword_llm::MockProvider;
//! use linkword_oracle::PromptOracle;
//! use linkword_store::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("linkword.db")?;
//! let oracle = PromptOracle::new(MockProvider::default());
//! let game = GameService::new(store, oracle, GameConfig::default())?;
//!
//! let connection = game.deal(DealPattern::Unset)?;
//! let clue = game.generate_ai_clue(connection.id).await?;
//! println!("{} links {} words", clue.clue, clue.number_of_selected_words);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod builder;
mod clues;
mod config;
mod error;
mod pool;
mod query;
mod service;
mod shared;

pub use builder::{random_pattern, random_pattern_with, ConnectionBuilder};
pub use clues::ClueValidator;
pub use config::GameConfig;
pub use error::GameError;
pub use pool::WordPool;
pub use query::{ClueSummary, ClueView, ConnectionView, QueryService, WordView};
pub use service::{DealPattern, GameService, GuessView};
pub use shared::SharedStore;
