//! Canonical text forms.
//!
//! Question text and answer text are canonicalized differently: question
//! text keeps word boundaries (it feeds a content fingerprint), while
//! answer text collapses to a bare alphanumeric token so that surface
//! variants of the same answer compare equal.

/// Articles stripped from the front of an answer, longest first. At most
/// one is removed.
const LEADING_ARTICLES: [&str; 3] = ["the ", "an ", "a "];

/// Canonical form of question body text.
///
/// Lowercases, replaces every character that is not an ASCII letter,
/// digit, or space with a space, collapses whitespace runs, and trims.
/// Idempotent: normalizing an already-normalized string is a no-op.
pub fn normalize_question(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for c in lowered.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Canonical form of an answer or choice.
///
/// Lowercases and trims, strips at most one leading article ("the ",
/// "an ", "a "), then keeps only letters and digits. No spaces survive:
/// `"The Eiffel Tower"` and `"eiffel tower"` both normalize to
/// `"eiffeltower"`.
pub fn normalize_answer(s: &str) -> String {
    let trimmed = s.trim().to_lowercase();
    let stripped = LEADING_ARTICLES
        .iter()
        .find_map(|article| trimmed.strip_prefix(article))
        .unwrap_or(&trimmed);
    stripped.chars().filter(|c| c.is_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_question_strips_punctuation() {
        assert_eq!(
            normalize_question("What is the capital of France?"),
            "what is the capital of france"
        );
        assert_eq!(normalize_question("  A,  B:C  "), "a b c");
    }

    #[test]
    fn test_normalize_question_idempotent() {
        for s in [
            "What is the capital of France?",
            "  Multi   space\ttabs\n",
            "",
            "already normalized text",
            "Héllo — wörld!",
        ] {
            let once = normalize_question(s);
            assert_eq!(normalize_question(&once), once);
        }
    }

    #[test]
    fn test_normalize_question_empty() {
        assert_eq!(normalize_question(""), "");
        assert_eq!(normalize_question("?!."), "");
    }

    #[test]
    fn test_normalize_answer_article_and_spacing() {
        assert_eq!(normalize_answer("The Eiffel Tower"), "eiffeltower");
        assert_eq!(normalize_answer("eiffel tower"), "eiffeltower");
        assert_eq!(normalize_answer("an apple"), "apple");
        assert_eq!(normalize_answer("a  test"), "test");
    }

    #[test]
    fn test_normalize_answer_strips_one_article_only() {
        // Only the outermost article is removed.
        assert_eq!(normalize_answer("the the hague"), "thehague");
    }

    #[test]
    fn test_normalize_answer_keeps_unicode_letters() {
        assert_eq!(normalize_answer("Zürich"), "zürich");
        assert_eq!(normalize_answer("K2"), "k2");
    }

    #[test]
    fn test_normalize_answer_empty() {
        assert_eq!(normalize_answer(""), "");
        assert_eq!(normalize_answer("  ...  "), "");
    }
}
