//! Word-list driven grammar detection for Papiamento comments.
//!
//! The pipeline has three pure stages: verify that a comment is Papiamento at
//! all (by counting how many of its words are known), pick the gravest
//! configured mistake present in it, and render the corrective reply text.
//! There is no morphology or tagging involved, only normalized whole-word
//! matching against configured lists.
//!
//! # Example
//!
//! ```
//! use grammar_utils::{Correction, LanguageProfile, find_gravest_mistake, verify_language};
//!
//! let profile = LanguageProfile {
//!     diagnostic_words: ["mi", "bo", "ta"].iter().map(|w| w.to_string()).collect(),
//!     corrections: vec![Correction {
//!         wrong: "esta".to_string(),
//!         right: "ta".to_string(),
//!         gravity: 1,
//!     }],
//!     detection_threshold_percent: 40.0,
//! };
//!
//! let words: Vec<&str> = "mi ta kana, pero mi esta kansa".split_whitespace().collect();
//! assert_eq!(verify_language(&words, &profile), Ok(true));
//!
//! let mistake = find_gravest_mistake(&words, &profile.corrections).unwrap();
//! assert_eq!(mistake.right, "ta");
//! ```

pub mod compose;
pub mod normalize;
pub mod select;
pub mod verify;

pub use compose::compose_reply;
pub use normalize::normalize_word;
pub use select::find_gravest_mistake;
pub use verify::{EmptyWordList, verify_language};

use rustc_hash::FxHashSet;

/// A known grammar mistake and its correction.
///
/// `gravity` ranks mistakes when a comment contains several: lower gravity
/// means a more severe mistake and wins selection.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Correction {
    pub wrong: String,
    pub right: String,
    pub gravity: u32,
}

/// The vocabulary used to recognize Papiamento plus the corrections to look
/// for once a comment is recognized. Loaded from settings at startup and
/// read-only afterwards.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LanguageProfile {
    /// Words that only signal the language, in normalized form.
    pub diagnostic_words: FxHashSet<String>,
    pub corrections: Vec<Correction>,
    /// Strict lower bound on the share of known words, in percent. A comment
    /// landing exactly on the threshold is rejected.
    pub detection_threshold_percent: f64,
}
