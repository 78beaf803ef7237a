//! HTTP request handlers for the game server.
//!
//! Every route except `/health` requires the static key in the `x-api-key`
//! header. Errors come back as `{error, kind}` with a status derived from
//! the error kind.

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use linkword_domain::{ClueId, ClueSubmission, ConnectionId, PuzzleError, Selection, SelectionUpdate, Word, WordId};
use linkword_game::{ClueView, ConnectionView, DealPattern, GameError, GameService, GuessView};
use linkword_llm::Provider;
use linkword_oracle::PromptOracle;
use linkword_store::SqliteStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// The game as served over HTTP
pub type Game = GameService<SqliteStore, PromptOracle<Provider>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Game services over the store and oracle
    pub game: Arc<Game>,
    /// Expected value of the `x-api-key` header
    pub api_key: Arc<str>,
}

impl AppState {
    /// Create application state
    pub fn new(game: Game, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            game: Arc::new(game),
            api_key: api_key.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Number of words in the pool
    pub word_count: usize,
}

/// One word of a drawn hand
#[derive(Debug, Serialize, Deserialize)]
pub struct DrawnWord {
    /// Word id
    pub id: i64,
    /// Word text
    pub word: String,
}

/// Request to add words to the pool
#[derive(Debug, Deserialize)]
pub struct AddWordsRequest {
    /// Raw words; blanks and duplicates are skipped
    pub words: Vec<String>,
}

/// Result of adding words
#[derive(Debug, Serialize, Deserialize)]
pub struct AddWordsResponse {
    /// Words actually inserted
    pub added: usize,
    /// Pool size afterwards
    pub total: usize,
}

/// Request to create a connection
///
/// With `word_ids` the connection uses exactly those words; otherwise a
/// fresh hand is dealt. `selected` gives an initial pattern, and
/// `random_selected` asks for that many random selections instead.
#[derive(Debug, Default, Deserialize)]
pub struct CreateConnectionRequest {
    /// Chosen words, in play order
    #[serde(default)]
    pub word_ids: Option<Vec<i64>>,
    /// Initial flags, `null` for unset
    #[serde(default)]
    pub selected: Option<Vec<Option<bool>>>,
    /// Number of random selections for a dealt hand
    #[serde(default)]
    pub random_selected: Option<usize>,
}

/// One word's flag in a clue submission
#[derive(Debug, Deserialize)]
pub struct WordSelection {
    /// Word id
    pub id: i64,
    /// New flag; absent or `null` leaves it unset
    #[serde(default)]
    pub selected: Option<bool>,
}

/// Request to attach a player's clue
#[derive(Debug, Deserialize)]
pub struct AttachClueRequest {
    /// One-word clue
    pub clue: String,
    /// Declared number of selected words
    pub number_of_selected_words: usize,
    /// Flag updates
    #[serde(default)]
    pub words: Vec<WordSelection>,
}

/// A word offered to the oracle for guessing
#[derive(Debug, Deserialize)]
pub struct GuessWord {
    /// Word id, echoed back in the guess
    pub id: i64,
    /// Word text
    pub word: String,
    /// Ignored; the oracle decides
    #[serde(default)]
    pub selected: Option<bool>,
}

/// Request for an oracle guess
#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    /// One-word clue
    pub clue: String,
    /// Number of words the oracle must select
    pub number_of_selected_words: usize,
    /// Candidate words
    pub words: Vec<GuessWord>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Machine-readable error kind
    pub kind: String,
    /// Present and true when the request may succeed if retried
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Missing or wrong API key
    Unauthorized,
    /// Error from the game layer
    Game(GameError),
}

impl From<GameError> for AppError {
    fn from(e: GameError) -> Self {
        AppError::Game(e)
    }
}

impl From<PuzzleError> for AppError {
    fn from(e: PuzzleError) -> Self {
        AppError::Game(GameError::Rejected(e))
    }
}

/// HTTP status for a rule rejection
fn rejection_status(err: &PuzzleError) -> StatusCode {
    match err {
        PuzzleError::NotFound(_) | PuzzleError::ConnectionNotFound(_) => StatusCode::NOT_FOUND,
        PuzzleError::ClueAlreadyExists(_) => StatusCode::CONFLICT,
        PuzzleError::SelectionCountMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PuzzleError::OracleUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        e if e.is_oracle_failure() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: "Missing or invalid API key".to_string(),
                    kind: "unauthorized".to_string(),
                    retryable: false,
                },
            ),
            AppError::Game(e) => {
                let status = match &e {
                    GameError::Rejected(rejection) => rejection_status(rejection),
                    GameError::Conflict(_) => StatusCode::CONFLICT,
                    GameError::Store(_) | GameError::Config(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                if status.is_server_error() {
                    error!("Request failed: {}", e);
                } else {
                    warn!("Request rejected: {}", e);
                }
                (
                    status,
                    ErrorResponse {
                        error: e.to_string(),
                        kind: e.kind().to_string(),
                        retryable: e.is_retryable(),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Reject requests without the configured API key
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorized = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == &*state.api_key);

    if !authorized {
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

/// GET /health - Liveness and pool size
async fn health_check(State(state): State<AppState>) -> Result<Json<HealthCheckResponse>, AppError> {
    let word_count = state.game.pool().size()?;
    Ok(Json(HealthCheckResponse {
        status: "healthy".to_string(),
        word_count,
    }))
}

/// GET /getwordselection - A fresh hand, nothing persisted
async fn get_word_selection(State(state): State<AppState>) -> Result<Json<Vec<DrawnWord>>, AppError> {
    let words = state.game.draw()?;
    Ok(Json(
        words
            .into_iter()
            .map(|w| DrawnWord {
                id: w.id.value(),
                word: w.text,
            })
            .collect(),
    ))
}

/// POST /words - Add words to the pool
async fn add_words(
    State(state): State<AppState>,
    Json(request): Json<AddWordsRequest>,
) -> Result<Json<AddWordsResponse>, AppError> {
    let added = state.game.pool().add_batch(&request.words)?;
    let total = state.game.pool().size()?;
    Ok(Json(AddWordsResponse { added, total }))
}

/// POST /connections - Create a connection from chosen words or a dealt hand
async fn create_connection(
    State(state): State<AppState>,
    Json(request): Json<CreateConnectionRequest>,
) -> Result<(StatusCode, Json<ConnectionView>), AppError> {
    let initial: Option<Vec<Selection>> = request
        .selected
        .map(|flags| flags.into_iter().map(Selection::from).collect());

    let connection = match request.word_ids {
        Some(ids) => {
            let ids: Vec<WordId> = ids.into_iter().map(WordId::from_value).collect();
            state.game.create_connection(&ids, initial)?
        }
        None => {
            let pattern = match (initial, request.random_selected) {
                (Some(flags), _) => DealPattern::Fixed(flags),
                (None, Some(k)) => DealPattern::Random(k),
                (None, None) => DealPattern::Unset,
            };
            state.game.deal(pattern)?
        }
    };

    Ok((StatusCode::CREATED, Json(ConnectionView::from(&connection))))
}

/// GET /connections/:id
async fn get_connection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ConnectionView>, AppError> {
    Ok(Json(state.game.get_connection(ConnectionId::from_value(id))?))
}

/// POST /connections/:id/clue - Attach a player's clue
async fn attach_clue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AttachClueRequest>,
) -> Result<(StatusCode, Json<ClueView>), AppError> {
    let submission = ClueSubmission {
        connection_id: ConnectionId::from_value(id),
        updates: request
            .words
            .iter()
            .map(|w| SelectionUpdate::new(WordId::from_value(w.id), w.selected))
            .collect(),
        clue_text: request.clue,
        declared_count: request.number_of_selected_words,
    };
    let view = state.game.attach_clue(&submission)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /connections/:id/ai-clue - Let the oracle clue a connection
async fn generate_ai_clue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ClueView>), AppError> {
    let view = state
        .game
        .generate_ai_clue(ConnectionId::from_value(id))
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /connections/:id/ai-linking-word - Let the oracle clue the stored selection
async fn generate_ai_linking_word(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ClueView>), AppError> {
    let view = state
        .game
        .generate_ai_clue_for_selection(ConnectionId::from_value(id))
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /clues/:id
async fn get_clue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ClueView>, AppError> {
    Ok(Json(state.game.get_clue(ClueId::from_value(id))?))
}

/// POST /guessselection - Ask the oracle to guess a selection
async fn guess_selection(
    State(state): State<AppState>,
    Json(request): Json<GuessRequest>,
) -> Result<Json<GuessView>, AppError> {
    let words: Vec<Word> = request
        .words
        .into_iter()
        .map(|w| Word::new(WordId::from_value(w.id), w.word))
        .collect();
    let guess = state
        .game
        .ai_guess(words, &request.clue, request.number_of_selected_words)
        .await?;
    Ok(Json(guess))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    let protected = AxumRouter::new()
        .route("/getwordselection", get(get_word_selection))
        .route("/words", post(add_words))
        .route("/connections", post(create_connection))
        .route("/connections/:id", get(get_connection))
        .route("/connections/:id/clue", post(attach_clue))
        .route("/connections/:id/ai-clue", post(generate_ai_clue))
        .route("/connections/:id/ai-linking-word", post(generate_ai_linking_word))
        .route("/clues/:id", get(get_clue))
        .route("/guessselection", post(guess_selection))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    AxumRouter::new()
        .route("/health", get(health_check))
        .merge(protected)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use linkword_game::GameConfig;
    use linkword_llm::MockProvider;
    use tower::ServiceExt; // for oneshot

    const KEY: &str = "test-key";

    fn create_test_state() -> AppState {
        let game = GameService::new(
            SqliteStore::new(":memory:").unwrap(),
            PromptOracle::new(Provider::Mock(MockProvider::default())),
            GameConfig::default_test_config(),
        )
        .unwrap();
        game.pool()
            .add_batch(&["golf", "budget", "holiday", "league", "pen"])
            .unwrap();
        AppState::new(game, KEY)
    }

    #[tokio::test]
    async fn test_health_check_is_public() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_key_is_unauthorized() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/getwordselection")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_key_is_unauthorized() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/getwordselection")
            .header(API_KEY_HEADER, "nope")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_word_selection_with_key() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/getwordselection")
            .header(API_KEY_HEADER, KEY)
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_rejection_status_mapping() {
        let id = ConnectionId::from_value(1);
        assert_eq!(rejection_status(&PuzzleError::ConnectionNotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(rejection_status(&PuzzleError::ClueAlreadyExists(id)), StatusCode::CONFLICT);
        assert_eq!(
            rejection_status(&PuzzleError::SelectionCountMismatch {
                declared: 2,
                actual: 1
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            rejection_status(&PuzzleError::InvalidClueText("a b".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            rejection_status(&PuzzleError::OracleFormatError("prose".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            rejection_status(&PuzzleError::OracleUnavailable("down".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_body_omits_retryable_when_false() {
        let body = ErrorResponse {
            error: "x".to_string(),
            kind: "not_found".to_string(),
            retryable: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("retryable").is_none());
    }
}
