//! Prompt templates shared by every generation provider.
//!
//! These templates are the wire contract with the language-model service and
//! must stay stable for behavioral parity: the categorizer's three-line format
//! is what the tag parser downstream expects.

/// Character budget for the summarization prompt's document prefix.
pub const SUMMARIZE_PREFIX_CHARS: usize = 3500;
/// Character budget for the categorization prompt's document prefix.
pub const CATEGORIZE_PREFIX_CHARS: usize = 3000;
/// Character budget for the answer prompt's summary context.
pub const ANSWER_CONTEXT_CHARS: usize = 3000;

/// System role content for the answer prompt.
pub const ANSWER_SYSTEM_PROMPT: &str =
    "You are a chatbot providing answers based on case study summaries.\n\n";

/// Build the summarization prompt over a bounded document prefix.
pub fn summarize_prompt(text: &str) -> String {
    format!(
        "Summarize this technical/business case study in detail:\n\n{}",
        truncate_chars(text, SUMMARIZE_PREFIX_CHARS)
    )
}

/// Build the categorization prompt requesting the three labeled lines.
pub fn categorize_prompt(text: &str) -> String {
    format!(
        "Given the following case study, list:\n\
         1. Category (e.g., case study, research, tutorial)\n\
         2. Domain (business, finance, healthcare, etc.)\n\
         3. Technologies used (comma-separated list):\n\n{}",
        truncate_chars(text, CATEGORIZE_PREFIX_CHARS)
    )
}

/// Build the user turn carrying the retrieved summary context.
pub fn answer_context_prompt(context: &str) -> String {
    format!(
        "Case studies summaries:\n{}",
        truncate_chars(context, ANSWER_CONTEXT_CHARS)
    )
}

/// Build the user turn carrying the question itself.
pub fn answer_question_prompt(question: &str) -> String {
    format!("Question: {question}")
}

/// Truncate to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
