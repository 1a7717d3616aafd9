//! Property tests for the dialect converter.

use proptest::prelude::*;
use tmpl_babel::dialect::convert;

/// Literal content free of either quote character.
fn literal_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _,:/-]{0,24}"
}

fn quote_strategy() -> impl Strategy<Value = char> {
    prop_oneof![Just('\''), Just('"')]
}

/// Text that cannot contain a `loop.` token or a `|default(` call.
fn plain_text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 {}%|<>=/\n]{0,80}"
}

/// A template-ish fragment mixing plain text with every rewrite pattern.
fn template_strategy() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        plain_text_strategy(),
        Just("{{ loop.index }}".to_string()),
        Just("{{ loop.index0 }}".to_string()),
        Just("{% if loop.first %}".to_string()),
        (literal_strategy(), quote_strategy())
            .prop_map(|(s, q)| format!("{{{{ v|default({q}{s}{q}) }}}}")),
    ];
    prop::collection::vec(piece, 0..12).prop_map(|pieces| pieces.concat())
}

proptest! {
    #[test]
    fn default_filter_preserves_quote_and_literal(s in literal_strategy(), q in quote_strategy()) {
        let input = format!("|default({q}{s}{q})");
        prop_assert_eq!(convert(&input), format!("|default:{q}{s}{q}"));
    }

    #[test]
    fn text_without_patterns_is_unchanged(text in plain_text_strategy()) {
        prop_assert_eq!(convert(&text), text);
    }

    #[test]
    fn conversion_is_idempotent(template in template_strategy()) {
        let once = convert(&template);
        prop_assert_eq!(convert(&once), once);
    }

    #[test]
    fn no_source_spellings_survive(template in template_strategy()) {
        let converted = convert(&template);
        prop_assert!(!converted.contains("|default("));
        prop_assert!(!converted.contains("counter00"));
        prop_assert_eq!(
            converted.matches("loop.").count(),
            converted.matches("forloop.").count()
        );
    }
}
