//! The game facade: dealing, clue attachment and the oracle flows

use crate::builder::{random_pattern, ConnectionBuilder};
use crate::clues::ClueValidator;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::pool::WordPool;
use crate::query::{ClueView, ConnectionView, QueryService, WordView};
use crate::shared::SharedStore;
use linkword_domain::traits::{PuzzleStore, TextOracle};
use linkword_domain::{
    is_valid_clue_text, ClueId, ClueSubmission, Connection, ConnectionId, PuzzleError, Selection,
    Word, WordId,
};
use linkword_oracle::{
    parse_clue_response, parse_guess_response, parse_linking_word, verify_clue_response,
    verify_guess, verify_linking_word,
};
use std::collections::HashSet;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info};

/// How the flags of a dealt connection start out
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DealPattern {
    /// Every flag unset
    #[default]
    Unset,
    /// A caller-chosen pattern, one entry per word
    Fixed(Vec<Selection>),
    /// This many flags selected at random positions, the rest unselected
    Random(usize),
}

/// The oracle's guess for a clue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessView {
    /// The clue that was guessed
    pub clue: String,
    /// Number of words the oracle was asked to select
    pub number_of_selected_words: usize,
    /// Words with the oracle's flags, ids from the caller's input
    pub words: Vec<WordView>,
}

/// Everything a game needs, over one shared store and one oracle
pub struct GameService<S, O> {
    pool: WordPool<S>,
    builder: ConnectionBuilder<S>,
    validator: ClueValidator<S>,
    query: QueryService<S>,
    store: SharedStore<S>,
    oracle: Arc<O>,
    config: GameConfig,
}

impl<S, O> GameService<S, O>
where
    S: PuzzleStore,
    O: TextOracle + Send + Sync + 'static,
    O::Error: std::fmt::Display,
{
    /// Create a new game service
    pub fn new(store: S, oracle: O, config: GameConfig) -> Result<Self, GameError> {
        config.validate().map_err(GameError::Config)?;

        let store = SharedStore::new(store);
        Ok(Self {
            pool: WordPool::new(store.clone()),
            builder: ConnectionBuilder::new(store.clone()),
            validator: ClueValidator::new(store.clone()),
            query: QueryService::new(store.clone()),
            store,
            oracle: Arc::new(oracle),
            config,
        })
    }

    /// The word pool
    pub fn pool(&self) -> &WordPool<S> {
        &self.pool
    }

    /// The connection builder
    pub fn builder(&self) -> &ConnectionBuilder<S> {
        &self.builder
    }

    /// The read side
    pub fn query(&self) -> &QueryService<S> {
        &self.query
    }

    /// Active configuration
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Sample a fresh hand of words without creating a connection
    pub fn draw(&self) -> Result<Vec<Word>, GameError> {
        self.pool.sample(self.config.connection_size)
    }

    /// Sample a hand and create a connection from it
    pub fn deal(&self, pattern: DealPattern) -> Result<Connection, GameError> {
        let size = self.config.connection_size;
        let initial = match pattern {
            DealPattern::Unset => None,
            DealPattern::Fixed(flags) => {
                if flags.len() != size {
                    return Err(PuzzleError::LengthMismatch {
                        expected: size,
                        actual: flags.len(),
                    }
                    .into());
                }
                Some(flags)
            }
            DealPattern::Random(selected_count) => Some(random_pattern(size, selected_count)?),
        };

        let words = self.pool.sample(size)?;
        self.builder.create(words, initial)
    }

    /// Create a connection from chosen words, in the given order
    pub fn create_connection(
        &self,
        word_ids: &[WordId],
        initial: Option<Vec<Selection>>,
    ) -> Result<Connection, GameError> {
        let words = self.store.with(|s| s.get_words_by_ids(word_ids))?;
        if let Some(missing) = word_ids.iter().find(|id| !words.iter().any(|w| w.id == **id)) {
            return Err(PuzzleError::NotFound(format!("word {}", missing)).into());
        }
        self.builder.create(words, initial)
    }

    /// Attach a player's clue
    pub fn attach_clue(&self, submission: &ClueSubmission) -> Result<ClueView, GameError> {
        let clue = self.validator.attach_clue(submission)?;
        self.query.get_clue(clue.id)
    }

    /// Connections a word has been dealt into
    pub fn connections_for_word(&self, word_id: WordId) -> Result<Vec<ConnectionId>, GameError> {
        self.store.with(|s| s.connections_for_word(word_id))
    }

    /// A connection view
    pub fn get_connection(&self, id: ConnectionId) -> Result<ConnectionView, GameError> {
        self.query.get_connection(id)
    }

    /// A clue view
    pub fn get_clue(&self, id: ClueId) -> Result<ClueView, GameError> {
        self.query.get_clue(id)
    }

    /// Let the oracle invent a clue and selection for a stored connection
    ///
    /// The oracle's output is parsed and verified against the connection's
    /// words before it reaches the clue validator, which re-checks the
    /// selected count against the stored links.
    pub async fn generate_ai_clue(&self, connection_id: ConnectionId) -> Result<ClueView, GameError> {
        let connection = self
            .store
            .with(|s| s.get_connection_by_id(connection_id))?
            .ok_or(PuzzleError::ConnectionNotFound(connection_id))?;
        if connection.is_clued() {
            return Err(PuzzleError::ClueAlreadyExists(connection_id).into());
        }

        let words = connection.words();
        info!(
            "Requesting oracle clue for connection {} ({} words)",
            connection_id,
            words.len()
        );

        let prompt_words = words.clone();
        let raw = self
            .call_oracle(move |oracle| oracle.generate_clue_for_selection(&prompt_words))
            .await?;

        let parsed = parse_clue_response(&raw, words.len())?;
        let verified = verify_clue_response(&words, parsed, self.config.clue_collision)?;
        debug!(
            "Oracle clue {:?} verified with {} selected words",
            verified.clue,
            verified.selected_count()
        );

        self.attach_clue(&verified.into_submission(connection_id))
    }

    /// Let the oracle clue the selection a connection already has
    ///
    /// Flags are left as stored: the oracle only supplies the linking word,
    /// and the clue records the stored selected count. Unset flags count as
    /// not selected. At least one word must be selected.
    pub async fn generate_ai_clue_for_selection(
        &self,
        connection_id: ConnectionId,
    ) -> Result<ClueView, GameError> {
        let connection = self
            .store
            .with(|s| s.get_connection_by_id(connection_id))?
            .ok_or(PuzzleError::ConnectionNotFound(connection_id))?;
        if connection.is_clued() {
            return Err(PuzzleError::ClueAlreadyExists(connection_id).into());
        }

        let selected = connection.selected_count();
        if selected == 0 {
            return Err(PuzzleError::SelectionCountMismatch {
                declared: 1,
                actual: 0,
            }
            .into());
        }

        info!(
            "Requesting oracle linking word for connection {} ({} of {} selected)",
            connection_id,
            selected,
            connection.links.len()
        );

        let links = connection.links.clone();
        let raw = self
            .call_oracle(move |oracle| oracle.generate_linking_word(&links))
            .await?;

        let clue = parse_linking_word(&raw)?;
        let clue = verify_linking_word(&connection.words(), &clue, self.config.clue_collision)?;
        debug!("Oracle linking word {:?} verified", clue);

        self.attach_clue(&ClueSubmission {
            connection_id,
            updates: Vec::new(),
            clue_text: clue,
            declared_count: selected,
        })
    }

    /// Ask the oracle which `count` of the given words the clue points at
    ///
    /// Read-only: nothing is persisted. Input words must be distinct by id
    /// and by text, since the oracle's answer is matched back by text.
    pub async fn ai_guess(
        &self,
        words: Vec<Word>,
        clue: &str,
        count: usize,
    ) -> Result<GuessView, GameError> {
        if !is_valid_clue_text(clue) {
            return Err(PuzzleError::InvalidClueText(clue.to_string()).into());
        }
        {
            let mut ids = HashSet::new();
            let mut texts = HashSet::new();
            for word in &words {
                if !ids.insert(word.id) || !texts.insert(word.text.as_str()) {
                    return Err(PuzzleError::DuplicateWordInConnection(word.id).into());
                }
            }
        }
        if count > words.len() {
            return Err(PuzzleError::SelectionCountMismatch {
                declared: count,
                actual: words.len(),
            }
            .into());
        }

        info!("Requesting oracle guess for {:?} ({} of {})", clue, count, words.len());

        let prompt_words = words.clone();
        let prompt_clue = clue.to_string();
        let raw = self
            .call_oracle(move |oracle| oracle.generate_guess_for_clue(&prompt_words, &prompt_clue, count))
            .await?;

        let entries = parse_guess_response(&raw)?;
        let guessed = verify_guess(&words, entries, count)?;

        Ok(GuessView {
            clue: clue.trim().to_string(),
            number_of_selected_words: count,
            words: guessed
                .iter()
                .map(|g| WordView::flagged(&g.word, g.selected))
                .collect(),
        })
    }

    /// Call the oracle on a blocking thread, bounded by the configured timeout
    async fn call_oracle<F>(&self, call: F) -> Result<String, GameError>
    where
        F: FnOnce(&O) -> Result<String, O::Error> + Send + 'static,
    {
        let oracle = Arc::clone(&self.oracle);
        let task = tokio::task::spawn_blocking(move || call(&oracle).map_err(|e| e.to_string()));

        match timeout(self.config.oracle_timeout(), task).await {
            Ok(Ok(Ok(raw))) => Ok(raw),
            Ok(Ok(Err(e))) => Err(PuzzleError::OracleUnavailable(e).into()),
            Ok(Err(e)) => {
                Err(PuzzleError::OracleUnavailable(format!("Task join error: {}", e)).into())
            }
            Err(_) => Err(PuzzleError::OracleUnavailable(format!(
                "no response within {:?}",
                self.config.oracle_timeout()
            ))
            .into()),
        }
    }
}
