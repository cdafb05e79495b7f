//! Deterministic duplicate keys derived from normalized text.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use super::normalize::{normalize_answer, normalize_question};

/// Hex-encoded SHA-256 of a string.
pub fn sha256_hex(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}

/// Duplicate key for a question body: hash of its normalized text.
pub fn content_fingerprint(text: &str) -> String {
    sha256_hex(&normalize_question(text))
}

/// Sorted, deduplicated normalized choices. Choices that normalize to
/// nothing are dropped; an all-empty input yields an empty vec.
pub fn normalized_choices(choices: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(choices.len());
    for choice in choices {
        let norm = normalize_answer(choice);
        if norm.is_empty() || !seen.insert(norm.clone()) {
            continue;
        }
        out.push(norm);
    }
    out.sort();
    out
}

/// Collapse a choice set into a single collision key.
///
/// The normalized set is joined with `|` (a character normalization can
/// never produce) and hashed. `None` when no choice survives
/// normalization — an absent signature is never used as a lookup key.
pub fn choice_signature(choices: &[String]) -> Option<String> {
    let normalized = normalized_choices(choices);
    if normalized.is_empty() {
        return None;
    }
    Some(sha256_hex(&normalized.join("|")))
}
