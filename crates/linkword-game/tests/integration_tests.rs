//! Integration tests for linkword-game
//!
//! These run the full flows against an in-memory store and a mock LLM.

use linkword_domain::traits::TextOracle;
use linkword_domain::{
    ClueSubmission, Connection, PuzzleError, Selection, SelectionUpdate, Word, WordId, WordLink,
};
use linkword_game::{DealPattern, GameConfig, GameError, GameService};
use linkword_llm::MockProvider;
use linkword_oracle::PromptOracle;
use linkword_store::SqliteStore;
use serde_json::json;
use std::time::Duration;

const WORDS: [&str; 6] = ["golf", "budget", "holiday", "league", "pen", "study"];

type TestGame = GameService<SqliteStore, PromptOracle<MockProvider>>;

fn game() -> (TestGame, MockProvider) {
    let provider = MockProvider::default();
    let oracle = PromptOracle::new(provider.clone());
    let game = GameService::new(
        SqliteStore::new(":memory:").unwrap(),
        oracle,
        GameConfig::default_test_config(),
    )
    .unwrap();
    game.pool().add_batch(&WORDS).unwrap();
    (game, provider)
}

fn rejection(err: GameError) -> PuzzleError {
    err.rejection()
        .cloned()
        .unwrap_or_else(|| panic!("expected a rule rejection, got {:?}", err))
}

/// A clue response that echoes the connection faithfully, selecting the first `k` words
fn clue_reply(connection: &Connection, clue: &str, k: usize) -> String {
    let entries: Vec<_> = connection
        .links
        .iter()
        .enumerate()
        .map(|(i, l)| json!({"id": l.word.id.value(), "word": l.word.text, "selected": i < k}))
        .collect();
    json!({"clue": clue, "selected_words": entries}).to_string()
}

#[test]
fn test_deal_unset() {
    let (game, _) = game();
    let connection = game.deal(DealPattern::Unset).unwrap();
    assert_eq!(connection.links.len(), 4);
    assert!(connection.links.iter().all(|l| l.selected == Selection::Unset));
    assert_eq!(game.draw().unwrap().len(), 4);
}

#[test]
fn test_deal_random_and_fixed() {
    let (game, _) = game();

    let connection = game.deal(DealPattern::Random(3)).unwrap();
    assert_eq!(connection.selected_count(), 3);

    let err = game
        .deal(DealPattern::Fixed(vec![Selection::Selected; 9]))
        .unwrap_err();
    assert_eq!(
        rejection(err),
        PuzzleError::LengthMismatch {
            expected: 4,
            actual: 9
        }
    );
}

#[test]
fn test_create_connection_from_chosen_words() {
    let (game, _) = game();
    let words = game.pool().sample(3).unwrap();
    let ids: Vec<WordId> = words.iter().rev().map(|w| w.id).collect();

    let connection = game.create_connection(&ids, None).unwrap();
    let order: Vec<WordId> = connection.links.iter().map(|l| l.word.id).collect();
    assert_eq!(order, ids);

    let err = game
        .create_connection(&[ids[0], WordId::from_value(31_337)], None)
        .unwrap_err();
    assert!(matches!(rejection(err), PuzzleError::NotFound(_)));

    let err = game.create_connection(&[ids[0], ids[0]], None).unwrap_err();
    assert!(matches!(
        rejection(err),
        PuzzleError::DuplicateWordInConnection(_)
    ));
}

#[test]
fn test_player_clue_and_traversal() {
    let (game, _) = game();
    let connection = game.deal(DealPattern::Unset).unwrap();
    let first = connection.links[0].word.id;

    let submission = ClueSubmission {
        connection_id: connection.id,
        updates: vec![SelectionUpdate::new(first, true)],
        clue_text: "  sport ".to_string(),
        declared_count: 1,
    };
    let view = game.attach_clue(&submission).unwrap();
    assert_eq!(view.clue, "sport");
    assert_eq!(view.words[0].selected, Some(true));

    assert_eq!(game.connections_for_word(first).unwrap(), vec![connection.id]);
}

#[tokio::test]
async fn test_ai_clue_success() {
    let (game, provider) = game();
    let connection = game.deal(DealPattern::Unset).unwrap();
    provider.push_response(format!("```json\n{}\n```", clue_reply(&connection, "vacation", 2)));

    let view = game.generate_ai_clue(connection.id).await.unwrap();
    assert_eq!(view.clue, "vacation");
    assert_eq!(view.number_of_selected_words, 2);
    assert_eq!(view.connection_id, connection.id.value());
    assert_eq!(provider.call_count(), 1);

    let stored = game.get_connection(connection.id).unwrap();
    let selected: Vec<_> = stored.words.iter().map(|w| w.selected).collect();
    assert_eq!(selected, vec![Some(true), Some(true), Some(false), Some(false)]);
}

#[tokio::test]
async fn test_ai_clue_collision_leaves_connection_unclued() {
    let (game, provider) = game();
    let connection = game.deal(DealPattern::Unset).unwrap();
    let colliding = connection.links[2].word.text.to_uppercase();
    provider.push_response(clue_reply(&connection, &colliding, 1));

    let err = game.generate_ai_clue(connection.id).await.unwrap_err();
    assert_eq!(rejection(err), PuzzleError::OracleClueCollision(colliding));

    let stored = game.get_connection(connection.id).unwrap();
    assert!(stored.clue.is_none());
    assert!(stored.words.iter().all(|w| w.selected.is_none()));
}

#[tokio::test]
async fn test_ai_clue_identity_violation() {
    let (game, provider) = game();
    let connection = game.deal(DealPattern::Unset).unwrap();

    let mut entries: Vec<_> = connection
        .links
        .iter()
        .map(|l| json!({"id": l.word.id.value(), "word": l.word.text, "selected": false}))
        .collect();
    entries[0]["id"] = json!(999_999);
    provider.push_response(json!({"clue": "odd", "selected_words": entries}).to_string());

    let err = game.generate_ai_clue(connection.id).await.unwrap_err();
    assert!(matches!(rejection(err), PuzzleError::OracleIdentityViolation(_)));
}

#[tokio::test]
async fn test_ai_clue_format_error() {
    let (game, provider) = game();
    let connection = game.deal(DealPattern::Unset).unwrap();
    provider.push_response("I think the clue is sport.");

    let err = game.generate_ai_clue(connection.id).await.unwrap_err();
    assert!(matches!(rejection(err), PuzzleError::OracleFormatError(_)));
}

#[tokio::test]
async fn test_ai_clue_skips_oracle_for_clued_or_missing_connection() {
    let (game, provider) = game();
    let connection = game.deal(DealPattern::Random(1)).unwrap();
    game.attach_clue(&ClueSubmission {
        connection_id: connection.id,
        updates: Vec::new(),
        clue_text: "mine".to_string(),
        declared_count: 1,
    })
    .unwrap();

    let err = game.generate_ai_clue(connection.id).await.unwrap_err();
    assert_eq!(rejection(err), PuzzleError::ClueAlreadyExists(connection.id));

    let missing = linkword_domain::ConnectionId::from_value(4_040);
    let err = game.generate_ai_clue(missing).await.unwrap_err();
    assert_eq!(rejection(err), PuzzleError::ConnectionNotFound(missing));

    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_ai_clue_with_several_words_is_an_oracle_failure() {
    let (game, provider) = game();
    let connection = game.deal(DealPattern::Unset).unwrap();
    provider.push_response(clue_reply(&connection, "civil rights", 2));

    let err = rejection(game.generate_ai_clue(connection.id).await.unwrap_err());
    assert!(matches!(err, PuzzleError::OracleFormatError(_)));
    assert!(err.is_oracle_failure());
    assert!(game.get_connection(connection.id).unwrap().clue.is_none());
}

#[tokio::test]
async fn test_ai_clue_for_existing_selection() {
    let (game, provider) = game();
    let connection = game.deal(DealPattern::Random(2)).unwrap();
    let before: Vec<_> = connection.links.iter().map(|l| l.selected.as_option()).collect();
    provider.push_response("  \"travel\"\n");

    let view = game
        .generate_ai_clue_for_selection(connection.id)
        .await
        .unwrap();
    assert_eq!(view.clue, "travel");
    assert_eq!(view.number_of_selected_words, 2);
    let after: Vec<_> = view.words.iter().map(|w| w.selected).collect();
    assert_eq!(after, before);

    let prompt = &provider.prompts()[0];
    assert!(prompt.contains(r#""selected":true"#));
    assert!(prompt.contains(r#""selected":false"#));
}

#[tokio::test]
async fn test_ai_clue_for_selection_rejects_bad_words() {
    let (game, provider) = game();

    let connection = game.deal(DealPattern::Random(1)).unwrap();
    provider.push_response("day off");
    let err = rejection(
        game.generate_ai_clue_for_selection(connection.id)
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, PuzzleError::OracleFormatError(_)));

    let colliding = connection.links[0].word.text.to_uppercase();
    provider.push_response(colliding.clone());
    let err = rejection(
        game.generate_ai_clue_for_selection(connection.id)
            .await
            .unwrap_err(),
    );
    assert_eq!(err, PuzzleError::OracleClueCollision(colliding));
    assert!(game.get_connection(connection.id).unwrap().clue.is_none());
}

#[tokio::test]
async fn test_ai_clue_for_selection_needs_a_selection() {
    let (game, provider) = game();
    let connection = game.deal(DealPattern::Unset).unwrap();

    let err = rejection(
        game.generate_ai_clue_for_selection(connection.id)
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, PuzzleError::SelectionCountMismatch { .. }));
    assert_eq!(provider.call_count(), 0);
}

fn guess_words() -> Vec<Word> {
    WORDS
        .iter()
        .enumerate()
        .map(|(i, w)| Word::new(WordId::from_value(100 + i as i64), *w))
        .collect()
}

#[tokio::test]
async fn test_ai_guess_reattaches_ids() {
    let (game, provider) = game();
    provider.push_response(
        json!([
            {"seq": 1, "word": "golf", "selected": true},
            {"seq": 2, "word": "budget", "selected": false},
            {"seq": 4, "word": "league", "selected": true}
        ])
        .to_string(),
    );

    let view = game.ai_guess(guess_words(), "sport", 2).await.unwrap();
    assert_eq!(view.clue, "sport");
    assert_eq!(view.number_of_selected_words, 2);
    assert_eq!(view.words.len(), 3);
    assert_eq!(view.words[2].id, 103);
    assert_eq!(view.words[2].selected, Some(true));
}

#[tokio::test]
async fn test_ai_guess_wrong_count() {
    let (game, provider) = game();
    provider.push_response(
        json!([
            {"word": "golf", "selected": true},
            {"word": "budget", "selected": true},
            {"word": "holiday", "selected": true},
            {"word": "league", "selected": false}
        ])
        .to_string(),
    );

    let err = game.ai_guess(guess_words(), "money", 4).await.unwrap_err();
    assert_eq!(
        rejection(err),
        PuzzleError::OracleSelectionCountMismatch {
            expected: 4,
            actual: 3
        }
    );
}

#[tokio::test]
async fn test_ai_guess_invented_word() {
    let (game, provider) = game();
    provider.push_response(r#"[{"word": "tennis", "selected": true}]"#);

    let err = game.ai_guess(guess_words(), "sport", 1).await.unwrap_err();
    assert!(matches!(rejection(err), PuzzleError::OracleIdentityViolation(_)));
}

#[tokio::test]
async fn test_ai_guess_rejects_bad_input_without_calling_oracle() {
    let (game, provider) = game();

    let err = game.ai_guess(guess_words(), "two words", 1).await.unwrap_err();
    assert!(matches!(rejection(err), PuzzleError::InvalidClueText(_)));

    let err = game.ai_guess(guess_words(), "sport", 7).await.unwrap_err();
    assert!(matches!(rejection(err), PuzzleError::SelectionCountMismatch { .. }));

    let mut repeated = guess_words();
    repeated.push(Word::new(WordId::from_value(200), "golf"));
    let err = game.ai_guess(repeated, "sport", 1).await.unwrap_err();
    assert_eq!(
        rejection(err),
        PuzzleError::DuplicateWordInConnection(WordId::from_value(200))
    );

    assert_eq!(provider.call_count(), 0);
}

/// Oracle that never answers in time or fails outright
struct BrokenOracle {
    delay: Duration,
}

impl TextOracle for BrokenOracle {
    type Error = String;

    fn generate_clue_for_selection(&self, _words: &[Word]) -> Result<String, Self::Error> {
        std::thread::sleep(self.delay);
        Err("connection refused".to_string())
    }

    fn generate_linking_word(&self, _links: &[WordLink]) -> Result<String, Self::Error> {
        std::thread::sleep(self.delay);
        Err("connection refused".to_string())
    }

    fn generate_guess_for_clue(
        &self,
        _words: &[Word],
        _clue: &str,
        _count: usize,
    ) -> Result<String, Self::Error> {
        std::thread::sleep(self.delay);
        Err("connection refused".to_string())
    }
}

fn broken_game(delay: Duration) -> GameService<SqliteStore, BrokenOracle> {
    let config = GameConfig {
        oracle_timeout_secs: 1,
        ..GameConfig::default_test_config()
    };
    let game = GameService::new(
        SqliteStore::new(":memory:").unwrap(),
        BrokenOracle { delay },
        config,
    )
    .unwrap();
    game.pool().add_batch(&WORDS).unwrap();
    game
}

#[tokio::test]
async fn test_oracle_failure_is_unavailable() {
    let game = broken_game(Duration::ZERO);
    let connection = game.deal(DealPattern::Unset).unwrap();

    let err = game.generate_ai_clue(connection.id).await.unwrap_err();
    assert!(matches!(rejection(err), PuzzleError::OracleUnavailable(_)));
}

#[tokio::test]
async fn test_oracle_timeout_is_unavailable() {
    let game = broken_game(Duration::from_secs(3));

    let err = game.ai_guess(guess_words(), "sport", 1).await.unwrap_err();
    let err = rejection(err);
    assert!(matches!(err, PuzzleError::OracleUnavailable(_)));
    assert!(err.is_oracle_failure());
}
