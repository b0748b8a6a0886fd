//! Property-based round-trip tests.
//!
//! Inputs are drawn from a round-trip-safe alphabet: literal prose, line
//! breaks, shortcut sequences, and stray brackets all survive
//! serialize(parse(text)) unchanged, so the property is exact equality.

use proptest::prelude::*;
use textree::{parse_tex, write_tex, SyntaxTable};

const PROSE: &str = "[ \\na-zA-Z0-9.,!?()~=\"\\[\\]-]{0,60}";

fn roundtrip(input: &str) -> Result<String, TestCaseError> {
    let syntax = SyntaxTable::builtin();
    let conversion = parse_tex(input, syntax);
    prop_assert!(
        conversion.failure.is_none(),
        "diagnostic for {:?}: {:?}",
        input,
        conversion.failure
    );
    Ok(write_tex(&conversion.root, syntax))
}

proptest! {
    #[test]
    fn prose_roundtrips(s in PROSE) {
        prop_assert_eq!(roundtrip(&s)?, s);
    }

    #[test]
    fn braced_prose_roundtrips(s in PROSE) {
        let input = format!("{{{}}}", s);
        prop_assert_eq!(roundtrip(&input)?, input);
    }

    #[test]
    fn emph_wrapped_prose_roundtrips(s in PROSE) {
        let input = format!("\\emph{{{}}}", s);
        prop_assert_eq!(roundtrip(&input)?, input);
    }

    #[test]
    fn reparse_is_structurally_stable(s in PROSE) {
        let syntax = SyntaxTable::builtin();
        let first = parse_tex(&s, syntax).root;
        let serialized = write_tex(&first, syntax);
        let second = parse_tex(&serialized, syntax).root;
        prop_assert_eq!(first, second);
    }
}
