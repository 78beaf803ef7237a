//! Linkword Storage Layer
//!
//! Implements the PuzzleStore trait on SQLite.
//!
//! # Architecture
//!
//! - `words` holds the shared pool, unique on a lowercase key
//! - `connection_words` is the explicit link table between words and
//!   connections; every traversal goes through it
//! - `clues` is unique on `connection_id`, so a connection is clued once
//!
//! Clue attachment runs inside an IMMEDIATE transaction: the write lock is
//! taken before the connection is read, which serializes concurrent attaches
//! across handles and processes sharing the same database file.
//!
//! # Examples
//!
//! ```no_run
//! use linkword_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for puzzle operations
//! ```

#![warn(missing_docs)]

use linkword_domain::traits::{PuzzleStore, StoreFailure};
use linkword_domain::{
    normalize_word_text, word::word_key, Clue, ClueId, ClueSubmission, Connection, ConnectionId,
    NewConnection, PuzzleError, Selection, Word, WordId, WordLink,
};
use rusqlite::{
    params, Connection as SqliteConnection, ErrorCode, OptionalExtension, TransactionBehavior,
};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info};

/// How long a writer waits for the database lock before giving up
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A puzzle rule rejected the operation; nothing was written
    #[error(transparent)]
    Rejected(#[from] PuzzleError),

    /// The database was busy or locked by a concurrent writer
    #[error("Concurrent write conflict: {0}")]
    Conflict(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(failure, _)
                if matches!(
                    failure.code,
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
                ) =>
            {
                StoreError::Conflict(e.to_string())
            }
            _ => StoreError::Database(e),
        }
    }
}

impl StoreFailure for StoreError {
    fn rejection(&self) -> Option<&PuzzleError> {
        match self {
            StoreError::Rejected(e) => Some(e),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

/// SQLite-based implementation of PuzzleStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance, or share one behind a mutex.
pub struct SqliteStore {
    conn: SqliteConnection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use linkword_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("linkword.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = SqliteConnection::open(path)?;
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Delete a connection together with its links and clue
    ///
    /// Words are left in the pool. Returns whether a connection was removed.
    pub fn delete_connection(&mut self, id: ConnectionId) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM connections WHERE id = ?1", params![id.value()])?;
        Ok(removed > 0)
    }

    fn now_secs() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    fn selection_to_sql(selection: Selection) -> Option<bool> {
        selection.as_option()
    }

    fn to_count(value: i64) -> Result<usize, StoreError> {
        usize::try_from(value)
            .map_err(|_| StoreError::InvalidData(format!("Negative count: {}", value)))
    }
}

/// Load a connection, its links in play order, and its clue
///
/// Takes a plain connection so it can run inside a transaction.
fn load_connection(
    conn: &SqliteConnection,
    id: ConnectionId,
) -> Result<Option<Connection>, StoreError> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM connections WHERE id = ?1",
            params![id.value()],
            |_| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !exists {
        return Ok(None);
    }

    let mut stmt = conn.prepare(
        "SELECT w.id, w.word, cw.selected
         FROM connection_words cw
         JOIN words w ON w.id = cw.word_id
         WHERE cw.connection_id = ?1
         ORDER BY cw.position",
    )?;

    let links = stmt
        .query_map(params![id.value()], |row| {
            let selected: Option<bool> = row.get(2)?;
            Ok(WordLink {
                word: Word::new(WordId::from_value(row.get(0)?), row.get::<_, String>(1)?),
                selected: Selection::from(selected),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let clue = load_clue(conn, "connection_id", id.value())?;

    Ok(Some(Connection { id, links, clue }))
}

/// Load a single clue by one of its unique columns
fn load_clue(
    conn: &SqliteConnection,
    column: &'static str,
    value: i64,
) -> Result<Option<Clue>, StoreError> {
    let sql = format!(
        "SELECT id, connection_id, clue, clue_word_count, created_at FROM clues WHERE {} = ?1",
        column
    );

    let row = conn
        .query_row(&sql, params![value], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })
        .optional()?;

    row.map(|(id, connection_id, text, count, created_at)| -> Result<Clue, StoreError> {
        Ok(Clue {
            id: ClueId::from_value(id),
            connection_id: ConnectionId::from_value(connection_id),
            text,
            clue_word_count: SqliteStore::to_count(count)?,
            created_at: created_at.max(0) as u64,
        })
    })
    .transpose()
}

impl PuzzleStore for SqliteStore {
    type Error = StoreError;

    fn get_words_by_ids(&self, ids: &[WordId]) -> Result<Vec<Word>, Self::Error> {
        let mut stmt = self.conn.prepare("SELECT id, word FROM words WHERE id = ?1")?;
        let mut words = Vec::with_capacity(ids.len());

        for id in ids {
            let word = stmt
                .query_row(params![id.value()], |row| {
                    Ok(Word::new(WordId::from_value(row.get(0)?), row.get::<_, String>(1)?))
                })
                .optional()?;
            if let Some(word) = word {
                words.push(word);
            }
        }

        Ok(words)
    }

    fn insert_words<S: AsRef<str>>(&mut self, batch: &[S]) -> Result<usize, Self::Error> {
        let created_at = Self::now_secs();
        let tx = self.conn.transaction()?;
        let mut added = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO words (word, word_key, created_at) VALUES (?1, ?2, ?3)",
            )?;
            for raw in batch {
                let Some(text) = normalize_word_text(raw.as_ref()) else {
                    continue;
                };
                added += stmt.execute(params![&text, word_key(&text), created_at])?;
            }
        }

        tx.commit()?;
        debug!("Inserted {} of {} words", added, batch.len());
        Ok(added)
    }

    fn sample_words(&self, k: usize) -> Result<Vec<Word>, Self::Error> {
        let available = self.word_count()?;
        if available < k {
            return Err(PuzzleError::InsufficientPool {
                requested: k,
                available,
            }
            .into());
        }

        let mut stmt = self
            .conn
            .prepare("SELECT id, word FROM words ORDER BY RANDOM() LIMIT ?1")?;

        let words = stmt
            .query_map(params![k as i64], |row| {
                Ok(Word::new(WordId::from_value(row.get(0)?), row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(words)
    }

    fn word_count(&self) -> Result<usize, Self::Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Self::to_count(count)
    }

    fn create_connection(&mut self, connection: &NewConnection) -> Result<Connection, Self::Error> {
        let tx = self.conn.transaction()?;

        // Links are returned with the stored text, not the caller's copy
        let mut links = Vec::with_capacity(connection.len());
        for link in connection.links() {
            let text: Option<String> = tx
                .query_row(
                    "SELECT word FROM words WHERE id = ?1",
                    params![link.word.id.value()],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(text) = text else {
                return Err(PuzzleError::NotFound(format!("word {}", link.word.id)).into());
            };
            links.push(WordLink {
                word: Word::new(link.word.id, text),
                selected: link.selected,
            });
        }

        tx.execute(
            "INSERT INTO connections (created_at) VALUES (?1)",
            params![Self::now_secs()],
        )?;
        let id = ConnectionId::from_value(tx.last_insert_rowid());

        {
            let mut stmt = tx.prepare(
                "INSERT INTO connection_words (connection_id, word_id, position, selected)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, link) in links.iter().enumerate() {
                stmt.execute(params![
                    id.value(),
                    link.word.id.value(),
                    position as i64,
                    Self::selection_to_sql(link.selected),
                ])?;
            }
        }

        tx.commit()?;
        info!("Created connection {} with {} words", id, connection.len());

        Ok(Connection {
            id,
            links,
            clue: None,
        })
    }

    fn get_connection_by_id(&self, id: ConnectionId) -> Result<Option<Connection>, Self::Error> {
        load_connection(&self.conn, id)
    }

    fn connections_for_word(&self, word_id: WordId) -> Result<Vec<ConnectionId>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT connection_id FROM connection_words WHERE word_id = ?1 ORDER BY connection_id",
        )?;

        let ids = stmt
            .query_map(params![word_id.value()], |row| {
                Ok(ConnectionId::from_value(row.get(0)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    fn attach_clue_atomically(&mut self, submission: &ClueSubmission) -> Result<Clue, Self::Error> {
        // Write lock first, then read: the clue-absence check and the insert
        // see the same state
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = load_connection(&tx, submission.connection_id)?;
        let plan = submission.plan(current.as_ref())?;

        {
            let mut stmt = tx.prepare(
                "UPDATE connection_words SET selected = ?1
                 WHERE connection_id = ?2 AND word_id = ?3",
            )?;
            for (word_id, selected) in &plan.flags {
                stmt.execute(params![
                    Self::selection_to_sql(*selected),
                    plan.connection_id.value(),
                    word_id.value(),
                ])?;
            }
        }

        let created_at = Self::now_secs();
        tx.execute(
            "INSERT INTO clues (connection_id, clue, clue_word_count, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                plan.connection_id.value(),
                &plan.clue_text,
                plan.clue_word_count as i64,
                created_at,
            ],
        )
        .map_err(|e| match &e {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::Rejected(PuzzleError::ClueAlreadyExists(plan.connection_id))
            }
            _ => StoreError::from(e),
        })?;
        let clue_id = ClueId::from_value(tx.last_insert_rowid());

        tx.commit()?;
        info!(
            "Attached clue {} to connection {} ({} selected)",
            clue_id, plan.connection_id, plan.clue_word_count
        );

        Ok(Clue {
            id: clue_id,
            connection_id: plan.connection_id,
            text: plan.clue_text,
            clue_word_count: plan.clue_word_count,
            created_at: created_at.max(0) as u64,
        })
    }

    fn get_clue_by_id(&self, id: ClueId) -> Result<Option<Clue>, Self::Error> {
        load_clue(&self.conn, "id", id.value())
    }
}
