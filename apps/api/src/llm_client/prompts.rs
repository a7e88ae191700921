// Shared prompt fragments and prompt-building utilities.
// Each feature that needs LLM calls defines its own prompts.rs alongside it.
// This file contains the cross-cutting pieces.

/// Appended to prompts whose answer is parsed as a bare value.
pub const ANSWER_ONLY_INSTRUCTION: &str = "Do NOT add any other words, explanation, quotes, \
    markdown or unnecessary punctuation. Return ONLY the requested value.";

/// Human-readable language name for a language tag, used inside prompts.
/// Unknown tags are passed through so the model can still interpret them.
pub fn language_display_name(language: &str) -> &str {
    let lower = language.trim().to_ascii_lowercase();
    if lower.starts_with("pt") {
        "Brazilian Portuguese"
    } else if lower.starts_with("en") {
        "English"
    } else if lower.starts_with("es") {
        "Spanish"
    } else if lower.starts_with("fr") {
        "French"
    } else {
        language.trim()
    }
}

/// True for Portuguese language tags (`pt`, `pt-BR`, `pt_PT`, ...).
pub fn is_portuguese(language: &str) -> bool {
    language.trim().to_ascii_lowercase().starts_with("pt")
}
