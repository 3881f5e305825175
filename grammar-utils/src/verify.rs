//! Language verification by lexical sampling.

use crate::LanguageProfile;
use crate::normalize::normalize_word;

/// Error returned when the verifier is handed a comment with no tokens.
///
/// Callers filter out short comments before verifying, so hitting this is a
/// caller bug rather than an expected runtime condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot verify the language of an empty word list")]
pub struct EmptyWordList;

/// Decide whether `words` is Papiamento by counting how many of them are
/// known.
///
/// A word is known if its normalized form is a diagnostic word or equals the
/// wrong or right side of any configured correction, both sides normalized.
/// The share of known words must be strictly above the profile threshold; a
/// comment landing exactly on the threshold is rejected.
pub fn verify_language(words: &[&str], profile: &LanguageProfile) -> Result<bool, EmptyWordList> {
    if words.is_empty() {
        return Err(EmptyWordList);
    }

    let known = words
        .iter()
        .filter(|word| {
            let word = normalize_word(word);
            profile.diagnostic_words.contains(&word)
                || profile
                    .corrections
                    .iter()
                    .any(|c| normalize_word(&c.wrong) == word || normalize_word(&c.right) == word)
        })
        .count();

    // The pass/fail decision uses the unrounded share; rounding is display-only.
    let percentage = known as f64 * 100.0 / words.len() as f64;
    if percentage <= profile.detection_threshold_percent {
        return Ok(false);
    }

    log::debug!(
        "language detected with {:.2}% of {} words, checking for grammar mistakes",
        round_half_away(percentage),
        words.len()
    );

    Ok(true)
}

/// Round to two decimals, halves away from zero.
fn round_half_away(percentage: f64) -> f64 {
    (percentage * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Correction;

    fn profile(diagnostic: &[&str], corrections: Vec<Correction>, threshold: f64) -> LanguageProfile {
        LanguageProfile {
            diagnostic_words: diagnostic.iter().map(|w| w.to_string()).collect(),
            corrections,
            detection_threshold_percent: threshold,
        }
    }

    fn correction(wrong: &str, right: &str, gravity: u32) -> Correction {
        Correction {
            wrong: wrong.to_string(),
            right: right.to_string(),
            gravity,
        }
    }

    #[test]
    fn test_empty_word_list_is_an_error() {
        let profile = profile(&["ta"], vec![], 50.0);
        assert_eq!(verify_language(&[], &profile), Err(EmptyWordList));
    }

    #[test]
    fn test_exact_threshold_is_rejected() {
        // 5 of 10 known words is exactly 50%, which must not pass a 50% bar.
        let profile = profile(&["ta"], vec![], 50.0);
        let words = ["ta", "ta", "ta", "ta", "ta", "x", "x", "x", "x", "x"];
        assert_eq!(verify_language(&words, &profile), Ok(false));
    }

    #[test]
    fn test_one_word_above_threshold_is_accepted() {
        let profile = profile(&["ta"], vec![], 50.0);
        let words = ["ta", "ta", "ta", "ta", "ta", "ta", "x", "x", "x", "x"];
        assert_eq!(verify_language(&words, &profile), Ok(true));
    }

    #[test]
    fn test_more_matches_never_turn_a_pass_into_a_fail() {
        let profile = profile(&["ta"], vec![], 40.0);
        let mut previous = false;
        for known in 0..=8 {
            let words: Vec<&str> = (0..8).map(|i| if i < known { "ta" } else { "x" }).collect();
            let verified = verify_language(&words, &profile).unwrap();
            assert!(verified || !previous, "pass turned into fail at {known} matches");
            previous = verified;
        }
    }

    #[test]
    fn test_correction_sides_count_as_known_words() {
        // No diagnostic words at all; both the wrong and the right form of a
        // correction still identify the language.
        let profile = profile(&[], vec![correction("esta", "ta", 1)], 40.0);
        let words = ["esta", "ta", "x"];
        assert_eq!(verify_language(&words, &profile), Ok(true));
    }

    #[test]
    fn test_configured_words_are_normalized_before_comparison() {
        let profile = profile(&[], vec![correction("Esta", "TA!", 1)], 50.0);
        let words = ["esta", "ta", "x"];
        assert_eq!(verify_language(&words, &profile), Ok(true));
    }

    #[test]
    fn test_comment_words_are_normalized_before_comparison() {
        let profile = profile(&["mi", "ta"], vec![], 50.0);
        let words = ["Mi", "TA,", "kana."];
        assert_eq!(verify_language(&words, &profile), Ok(true));
    }

    #[test]
    fn test_fractional_share_is_not_truncated() {
        // 1 of 7 is about 14.3%; integer division would floor it to 0 and
        // wrongly pass a 5% threshold check done on the truncated value.
        let profile = profile(&["ta"], vec![], 14.0);
        let words = ["ta", "a", "b", "c", "d", "e", "f"];
        assert_eq!(verify_language(&words, &profile), Ok(true));
    }

    #[test]
    fn test_round_half_away() {
        assert_eq!(round_half_away(100.0 / 3.0), 33.33);
        assert_eq!(round_half_away(200.0 / 3.0), 66.67);
        assert_eq!(round_half_away(400.0 / 7.0), 57.14);
        assert_eq!(round_half_away(50.0), 50.0);
    }
}
