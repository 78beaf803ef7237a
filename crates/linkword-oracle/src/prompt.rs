//! LLM prompt engineering for clue generation and guessing

use linkword_domain::{Word, WordLink};
use serde_json::{json, Value};

/// Builds the prompt asking the LLM to invent a clue and pick the words it links
pub struct CluePromptBuilder<'a> {
    words: &'a [Word],
}

impl<'a> CluePromptBuilder<'a> {
    /// Create a new prompt builder over the connection's words
    pub fn new(words: &'a [Word]) -> Self {
        Self { words }
    }

    /// Build the complete clue prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(CLUE_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str("Word objects:\n");
        prompt.push_str(&word_objects(self.words).to_string());
        prompt.push_str("\n\n");

        prompt.push_str(CLUE_OUTPUT_FORMAT);
        prompt.push_str(&format!(
            "\n\nThe selected_words array MUST contain exactly {} objects.",
            self.words.len()
        ));

        prompt
    }
}

/// Builds the prompt asking the LLM to pick the words a clue points at
pub struct GuessPromptBuilder<'a> {
    words: &'a [Word],
    clue: &'a str,
    count_to_select: usize,
}

impl<'a> GuessPromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(words: &'a [Word], clue: &'a str, count_to_select: usize) -> Self {
        Self {
            words,
            clue,
            count_to_select,
        }
    }

    /// Build the complete guess prompt
    ///
    /// Words are numbered by position; ids never reach the LLM on this path.
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(GUESS_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str("Word objects:\n");
        prompt.push_str(&sequenced_words(self.words).to_string());
        prompt.push_str("\n\n");

        prompt.push_str(&format!("Linking word: {}\n", json!(self.clue.trim())));
        prompt.push_str(&format!(
            "EXACT_NUMBER_OF_WORDS_TO_SELECT: {}\n\n",
            self.count_to_select
        ));

        prompt.push_str(GUESS_OUTPUT_FORMAT);

        prompt
    }
}

/// Builds the prompt asking the LLM for one word linking an existing selection
pub struct LinkingPromptBuilder<'a> {
    links: &'a [WordLink],
}

impl<'a> LinkingPromptBuilder<'a> {
    /// Create a new prompt builder over a connection's links
    pub fn new(links: &'a [WordLink]) -> Self {
        Self { links }
    }

    /// Build the complete linking-word prompt
    ///
    /// Unset flags are shown as not selected.
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(LINKING_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str("Word objects:\n");
        prompt.push_str(&flagged_words(self.links).to_string());
        prompt.push_str("\n\n");

        prompt.push_str(LINKING_OUTPUT_FORMAT);

        prompt
    }
}

fn word_objects(words: &[Word]) -> Value {
    Value::Array(
        words
            .iter()
            .map(|w| json!({ "id": w.id.value(), "word": w.text }))
            .collect(),
    )
}

fn flagged_words(links: &[WordLink]) -> Value {
    Value::Array(
        links
            .iter()
            .map(|l| {
                json!({
                    "id": l.word.id.value(),
                    "word": l.word.text,
                    "selected": l.selected.is_selected(),
                })
            })
            .collect(),
    )
}

fn sequenced_words(words: &[Word]) -> Value {
    Value::Array(
        words
            .iter()
            .enumerate()
            .map(|(i, w)| json!({ "seq": i + 1, "word": w.text }))
            .collect(),
    )
}

const CLUE_INSTRUCTIONS: &str = r#"You are generating a clue for a word connection game.

You are given a list of word objects in JSON format. Each object contains:
- "id": integer
- "word": string

Your task:
1. Generate ONE single English word as a clue.
2. The clue must NOT match any word in the list.
3. Select the words that have a strong, clear and guessable association with the clue.
4. You must select at least one word.
5. Aim to select as many words as possible, but never at the expense of a strong association.

Structure rules:
- Return ALL original objects, in the original order.
- Do NOT modify any "id" or "word" value.
- Add a boolean field "selected" to every object."#;

const CLUE_OUTPUT_FORMAT: &str = r#"Output format (JSON only, no markdown, no explanation):
{
  "clue": "<single_word>",
  "selected_words": [
    { "id": <original_id>, "word": "<original_word>", "selected": true }
  ]
}"#;

const LINKING_INSTRUCTIONS: &str = r#"You are generating a clue for a word connection game.

You are given a list of word objects in JSON format. Each object contains:
- "id": integer
- "word": string
- "selected": boolean

Task:
1. Identify ONLY the words where "selected" is true.
2. Ignore all other words completely.
3. Think of ONE English word that clearly links ALL selected words.
4. The clue must not reasonably relate to any unselected words.

Rules:
- The clue must be exactly one English word.
- The word must be different from every word in the list.
- No spaces, no punctuation, no explanation.
- If no strong exclusive link exists, choose the best possible linking word anyway."#;

const LINKING_OUTPUT_FORMAT: &str = "Output ONLY the word.";

const GUESS_INSTRUCTIONS: &str = r#"You are playing a word connection game.

You are given a list of word objects in JSON format. Each object contains:
- "seq": the sequence number
- "word": the word string

You are also given a linking word and an exact number of words to select.

Task:
- Identify exactly that many words that are most clearly connected to the linking word.
- Even if there is no obvious connection, select exactly that many words.
- Set "selected": true for the words you choose and "selected": false for all others.
- Keep "seq" and "word" unchanged and keep the original order."#;

const GUESS_OUTPUT_FORMAT: &str = r#"Output format (JSON array only, no markdown, no explanation):
[
  { "seq": 1, "word": "<original_word>", "selected": true }
]"#;
