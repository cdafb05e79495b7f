//! Generator choice sanitization.

use std::collections::HashSet;

use crate::text::normalize::{normalize_answer, normalize_question};

/// Choices longer than this many words are treated as descriptions of
/// the answer rather than aliases for it.
const MAX_CHOICE_WORDS: usize = 4;

/// Filter a generated choice list down to plausible answer aliases.
///
/// Drops entries that are blank, longer than [`MAX_CHOICE_WORDS`] words,
/// normalize to nothing, or are multi-word phrases echoed from the
/// question text, then deduplicates by normalized form (first occurrence
/// wins). When nothing survives, the first raw choice (trimmed) is kept
/// as a last resort so a question with choices never loses all of them
/// here.
pub fn sanitize_choices(question_text: &str, choices: &[String]) -> Vec<String> {
    if choices.is_empty() {
        return Vec::new();
    }
    let question_norm = normalize_question(question_text).replace(' ', "");
    let mut seen = HashSet::new();
    let mut filtered = Vec::with_capacity(choices.len());
    for choice in choices {
        let clean = choice.trim();
        if clean.is_empty() {
            continue;
        }
        let words = clean.split_whitespace().count();
        if words > MAX_CHOICE_WORDS {
            continue;
        }
        let norm = normalize_answer(clean);
        if norm.is_empty() {
            continue;
        }
        // A multi-word choice whose normalized form appears verbatim in
        // the question text is a descriptive phrase the model lifted from
        // the question, not an alias.
        if words > 1 && !question_norm.is_empty() && question_norm.contains(&norm) {
            continue;
        }
        if !seen.insert(norm) {
            continue;
        }
        filtered.push(clean.to_string());
    }
    if filtered.is_empty() {
        let primary = choices[0].trim();
        if !primary.is_empty() {
            filtered.push(primary.to_string());
        }
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keeps_short_aliases() {
        let out = sanitize_choices(
            "Which mountain is the tallest on Earth?",
            &strings(&["Mount Everest", "Everest", "Sagarmatha"]),
        );
        assert_eq!(out, strings(&["Mount Everest", "Everest", "Sagarmatha"]));
    }

    #[test]
    fn test_drops_long_descriptions() {
        let out = sanitize_choices(
            "Who was the first female UK prime minister?",
            &strings(&["Margaret Thatcher", "the first female UK PM"]),
        );
        assert_eq!(out, strings(&["Margaret Thatcher"]));
    }

    #[test]
    fn test_drops_phrases_echoed_from_question() {
        // "capital of France" appears verbatim in the question; a single
        // word like "France" is still allowed.
        let out = sanitize_choices(
            "Name the capital of France.",
            &strings(&["capital of France", "Paris"]),
        );
        assert_eq!(out, strings(&["Paris"]));
    }

    #[test]
    fn test_single_word_from_question_survives() {
        let out = sanitize_choices("Name the capital of France.", &strings(&["France"]));
        assert_eq!(out, strings(&["France"]));
    }

    #[test]
    fn test_dedupes_by_normalized_form() {
        let out = sanitize_choices(
            "Which city hosts the Eiffel Tower?",
            &strings(&["Paris", "the Paris", "PARIS"]),
        );
        assert_eq!(out, strings(&["Paris"]));
    }

    #[test]
    fn test_fallback_keeps_first_raw_choice() {
        let out = sanitize_choices(
            "Describe the capital of France in one word.",
            &strings(&["  capital of France in one word  "]),
        );
        assert_eq!(out, strings(&["capital of France in one word"]));
    }

    #[test]
    fn test_all_blank_choices_yield_nothing() {
        assert!(sanitize_choices("Any question text here?", &strings(&["", "   "])).is_empty());
        assert!(sanitize_choices("Any question text here?", &[]).is_empty());
    }
}
