//! Parse LLM output into typed clue and guess responses
//!
//! Parsing is structural only. Whether the content agrees with the words the
//! LLM was shown is decided by the verifier.

use linkword_domain::PuzzleError;
use serde::Deserialize;
use serde_json::Value;

/// One word entry of a generated clue
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClueEntry {
    /// Word id as echoed back
    pub id: i64,
    /// Word text as echoed back
    pub word: String,
    /// Whether the clue links this word
    pub selected: bool,
}

/// A generated clue with the selection it was made for
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClueResponse {
    /// The clue word
    pub clue: String,
    /// Every input word with its flag
    pub selected_words: Vec<ClueEntry>,
}

/// One word entry of a guess
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GuessEntry {
    /// Position in the prompt, when echoed
    #[serde(default)]
    pub seq: Option<i64>,
    /// Word text
    pub word: String,
    /// Whether the word was picked
    pub selected: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GuessPayload {
    List(Vec<GuessEntry>),
    Wrapped { selected_words: Vec<GuessEntry> },
}

/// Parse a clue-generation response
///
/// `expected_len` is the number of words the LLM was shown; any other
/// number of entries is a format error.
pub fn parse_clue_response(response: &str, expected_len: usize) -> Result<ClueResponse, PuzzleError> {
    let json = parse_json(response)?;

    let parsed: ClueResponse = serde_json::from_value(json)
        .map_err(|e| PuzzleError::OracleFormatError(format!("Invalid clue response: {}", e)))?;

    if parsed.selected_words.len() != expected_len {
        return Err(PuzzleError::OracleFormatError(format!(
            "Expected {} word entries, got {}",
            expected_len,
            parsed.selected_words.len()
        )));
    }

    Ok(parsed)
}

/// Parse a guess response
///
/// Accepts a bare JSON array of entries, or an object wrapping them in
/// `selected_words`.
pub fn parse_guess_response(response: &str) -> Result<Vec<GuessEntry>, PuzzleError> {
    let json = parse_json(response)?;

    let payload: GuessPayload = serde_json::from_value(json).map_err(|_| {
        PuzzleError::OracleFormatError(
            "Expected a JSON array of {word, selected} objects".to_string(),
        )
    })?;

    let entries = match payload {
        GuessPayload::List(entries) => entries,
        GuessPayload::Wrapped { selected_words } => selected_words,
    };

    if entries.is_empty() {
        return Err(PuzzleError::OracleFormatError(
            "Guess contained no entries".to_string(),
        ));
    }

    Ok(entries)
}

/// Parse a linking-word response
///
/// The reply should be the bare word. A surrounding code fence or a pair of
/// quotes is removed; whether what remains is a valid clue is decided by the
/// verifier.
pub fn parse_linking_word(response: &str) -> Result<String, PuzzleError> {
    let body = extract_json(response)?;
    let word = body.trim();
    let word = word
        .strip_prefix('"')
        .and_then(|w| w.strip_suffix('"'))
        .unwrap_or(word)
        .trim();

    if word.is_empty() {
        return Err(PuzzleError::OracleFormatError(
            "Linking word response is empty".to_string(),
        ));
    }
    Ok(word.to_string())
}

fn parse_json(response: &str) -> Result<Value, PuzzleError> {
    let json_str = extract_json(response)?;
    serde_json::from_str(&json_str)
        .map_err(|e| PuzzleError::OracleFormatError(format!("JSON parse error: {}", e)))
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, PuzzleError> {
    let trimmed = response.trim();

    if trimmed.is_empty() {
        return Err(PuzzleError::OracleFormatError("Empty response".to_string()));
    }

    // LLMs sometimes wrap JSON in markdown code blocks
    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(PuzzleError::OracleFormatError("Empty code block".to_string()));
        }

        // Skip the opening fence and, if present, the closing one
        let end = if lines[lines.len() - 1].trim() == "```" {
            lines.len() - 1
        } else {
            lines.len()
        };
        let body = lines[1..end].join("\n");
        if body.trim().is_empty() {
            return Err(PuzzleError::OracleFormatError("Empty code block".to_string()));
        }
        Ok(body)
    } else {
        Ok(trimmed.to_string())
    }
}
