use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical comparison form of free text: NFKD, accents stripped,
/// lowercased, whitespace collapsed and trimmed.
pub fn normalize_text(s: &str) -> String {
    let folded: String = s
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Coarse topic derived from an intent name.
///
/// `NO_MATCH*` and `CHIT_*` (case-insensitive) collapse to `NO_MATCH` and
/// `CHIT`; otherwise the prefix before the first underscore, or the whole
/// intent when there is none.
pub fn flow_from_intent(intent: &str) -> String {
    let intent = intent.trim();
    if intent.is_empty() {
        return String::new();
    }
    let upper = intent.to_uppercase();
    if upper.starts_with("NO_MATCH") {
        return "NO_MATCH".to_string();
    }
    if upper.starts_with("CHIT_") {
        return "CHIT".to_string();
    }
    match intent.split_once('_') {
        Some((prefix, _)) => prefix.to_string(),
        None => intent.to_string(),
    }
}

/// Whether an intent tag marks a failed classification.
pub fn is_no_match_intent(intent: &str) -> bool {
    intent.trim().to_uppercase().starts_with("NO_MATCH")
}
