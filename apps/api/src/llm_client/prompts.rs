// Shared prompt fragments and prompt-building utilities.
// Each service that calls the model keeps its own prompts.rs alongside it.

/// Longest resume transcript embedded in a prompt, in characters.
pub const MAX_PROMPT_RESUME_CHARS: usize = 20_000;

/// Truncates text to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
