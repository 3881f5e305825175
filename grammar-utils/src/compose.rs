//! Reply text composition.

use crate::Correction;

/// Build the reply by filling the positional placeholders `{0}` (author),
/// `{1}` (wrong form), `{2}` (right form) and appending the footer.
///
/// Placeholders the template does not contain are simply not filled, and
/// unknown placeholders pass through literally. The footer is appended with no
/// separator; it supplies its own leading whitespace if it wants any.
pub fn compose_reply(template: &str, author: &str, correction: &Correction, footer: &str) -> String {
    let mut reply = template
        .replace("{0}", author)
        .replace("{1}", &correction.wrong)
        .replace("{2}", &correction.right);
    reply.push_str(footer);
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    fn esta_ta() -> Correction {
        Correction {
            wrong: "esta".to_string(),
            right: "ta".to_string(),
            gravity: 1,
        }
    }

    #[test]
    fn test_all_placeholders_are_substituted_verbatim() {
        let reply = compose_reply(
            "Bon dia {0}! Bo a skibi {1}, ta {2} bo ke men.",
            "anna",
            &esta_ta(),
            "\n\n^(mi ta un bot)",
        );
        assert_eq!(
            reply,
            "Bon dia anna! Bo a skibi esta, ta ta bo ke men.\n\n^(mi ta un bot)"
        );
    }

    #[test]
    fn test_footer_is_appended_without_separator() {
        let reply = compose_reply("{1} -> {2}", "anna", &esta_ta(), "footer");
        assert_eq!(reply, "esta -> tafooter");
    }

    #[test]
    fn test_missing_placeholders_do_not_fail() {
        let reply = compose_reply("danki {0}", "anna", &esta_ta(), "");
        assert_eq!(reply, "danki anna");
    }

    #[test]
    fn test_unknown_placeholders_pass_through() {
        let reply = compose_reply("{0} wrote {3}", "anna", &esta_ta(), "");
        assert_eq!(reply, "anna wrote {3}");
    }
}
