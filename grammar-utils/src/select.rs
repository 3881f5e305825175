//! Selection of the gravest mistake among all candidate matches.

use crate::Correction;
use crate::normalize::normalize_word;
use rustc_hash::FxHashSet;

/// Find the correction whose wrong form occurs in `words`, preferring the
/// numerically smallest gravity.
///
/// A candidate only replaces the running best on strictly smaller gravity, so
/// of two equally grave corrections the one configured first wins, no matter
/// where their tokens sit in the comment.
pub fn find_gravest_mistake<'a>(
    words: &[&str],
    corrections: &'a [Correction],
) -> Option<&'a Correction> {
    let words: FxHashSet<String> = words.iter().map(|word| normalize_word(word)).collect();

    let mut mistake: Option<&Correction> = None;
    for correction in corrections {
        if !words.contains(&normalize_word(&correction.wrong)) {
            continue;
        }
        match mistake {
            Some(best) if correction.gravity >= best.gravity => {}
            _ => mistake = Some(correction),
        }
    }
    mistake
}
