//! Property-based checks for the filename tag grammar: round-trip encoding,
//! strip idempotence, and sanitization closure (testable properties 1-3).

use proptest::prelude::*;

use tagexplorer_lib::grammar::{decode, encode, sanitize_tag_name, strip};
use tagexplorer_lib::models::{TagFormat, TagGrammar, TagGrouping, TagPosition};

/// Tag names free of bracket/paren/comma/space characters so encoding one or
/// more of them under any built-in grammar can't be ambiguous with the
/// delimiters themselves.
fn plain_tag_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,12}"
}

fn built_in_format() -> impl Strategy<Value = TagFormat> {
    prop_oneof![
        Just(TagFormat::SquareBrackets),
        Just(TagFormat::Brackets),
        Just(TagFormat::Parentheses),
    ]
}

fn grouping() -> impl Strategy<Value = TagGrouping> {
    prop_oneof![Just(TagGrouping::Combined), Just(TagGrouping::Individual)]
}

fn position() -> impl Strategy<Value = TagPosition> {
    prop_oneof![Just(TagPosition::Prefix), Just(TagPosition::Suffix)]
}

proptest! {
    /// Property 1: encoding a tag list into a basename and decoding it back
    /// under the same grammar recovers the original (sanitized) tags, for
    /// any built-in bracket format, grouping, and position.
    #[test]
    fn round_trip_recovers_tags(
        tags in prop::collection::vec(plain_tag_name(), 1..4),
        format in built_in_format(),
        grouping in grouping(),
        position in position(),
        add_spaces in any::<bool>(),
    ) {
        let grammar = TagGrammar {
            format,
            custom_format: None,
            grouping,
            position,
            add_spaces,
        };

        let encoded = encode("document.pdf", &tags, &grammar);
        let decoded = decode(&encoded, &grammar);
        prop_assert_eq!(decoded, tags);
    }

    /// Property 2: stripping an already-stripped stem is a no-op, regardless
    /// of how many tag blocks were embedded in the original.
    #[test]
    fn strip_is_idempotent(
        tags in prop::collection::vec(plain_tag_name(), 0..4),
        format in built_in_format(),
        grouping in grouping(),
        position in position(),
    ) {
        let grammar = TagGrammar {
            format,
            custom_format: None,
            grouping,
            position,
            add_spaces: true,
        };

        let encoded = encode("notes.md", &tags, &grammar);
        let known = vec![
            TagGrammar { format: TagFormat::SquareBrackets, ..grammar.clone() },
            TagGrammar { format: TagFormat::Brackets, ..grammar.clone() },
            TagGrammar { format: TagFormat::Parentheses, ..grammar.clone() },
        ];
        let (stem, _ext) = encoded.rsplit_once('.').unwrap_or((encoded.as_str(), ""));
        let once = strip(stem, &known);
        let twice = strip(&once, &known);
        prop_assert_eq!(once, twice);
    }

    /// Property 3: sanitizing a tag name is a closure under illegal
    /// characters (none remain) and a fixed point once applied.
    #[test]
    fn sanitize_is_closed_and_stable(raw in ".{0,24}") {
        let once = sanitize_tag_name(&raw);
        prop_assert!(!once.contains(['<', '>', ':', '"', '|', '?', '*']));
        prop_assert!(!once.is_empty());
        let twice = sanitize_tag_name(&once);
        prop_assert_eq!(once, twice);
    }
}
