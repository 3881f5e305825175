//! Token normalization shared by the verifier and the selector.

/// Characters stripped from both ends of a token before comparison.
const TRIM_CHARS: &[char] = &['?', '.', ',', '!', ' '];

/// Strip surrounding punctuation and lower-case a token.
///
/// Every comparison against a configured word list goes through this
/// function. Lower-casing uses the locale-independent Unicode mapping, so a
/// token matches the same list entries on every deployment.
pub fn normalize_word(token: &str) -> String {
    token.trim_matches(TRIM_CHARS).to_lowercase()
}
