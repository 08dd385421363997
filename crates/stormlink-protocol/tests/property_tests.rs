//! Property tests for framing and encoding invariants.

use proptest::prelude::*;
use stormlink_protocol::{Command, LineFramer, SetValue, StateTable};

proptest! {
    /// Framing idempotence: feeding a byte stream split at arbitrary
    /// points yields the same lines, in the same order, as feeding it
    /// whole.
    #[test]
    fn framing_is_split_invariant(
        lines in prop::collection::vec("[a-z.\\[\\]0-9 -]{1,40}", 1..8),
        split_points in prop::collection::vec(0usize..200, 0..6),
    ) {
        let mut stream = Vec::new();
        for line in &lines {
            stream.extend_from_slice(line.as_bytes());
            stream.push(b'\n');
        }

        let mut whole = LineFramer::new();
        let expected = whole.feed(&stream).unwrap();

        let mut cuts: Vec<usize> = split_points
            .into_iter()
            .map(|p| p % (stream.len() + 1))
            .collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut framer = LineFramer::new();
        let mut collected = Vec::new();
        let mut start = 0;
        for cut in cuts {
            collected.extend(framer.feed(&stream[start..cut]).unwrap());
            start = cut;
        }
        collected.extend(framer.feed(&stream[start..]).unwrap());

        prop_assert_eq!(collected, expected);
    }

    /// Keyword classification: exactly the five reserved words encode
    /// unbracketed.
    #[test]
    fn keyword_classification(value in "[a-z]{1,8}") {
        let reserved = ["on", "off", "toggle", "up", "down"];
        match SetValue::classify(&value) {
            SetValue::Keyword(kw) => prop_assert!(reserved.contains(&kw) && kw == value),
            SetValue::Literal(v) => {
                prop_assert!(!reserved.contains(&value.as_str()));
                prop_assert_eq!(v, value);
            }
        }
    }

    /// Echo round-trip: any boolean write, parsed back as a status report,
    /// reads as the written value.
    #[test]
    fn boolean_write_round_trips(value in any::<bool>()) {
        let mut table = StateTable::new();
        let wire = Command::set_mute(value).encode();
        let outcome = table.parse(&wire);
        prop_assert!(outcome.recognized);
        prop_assert_eq!(table.mute(), value);
    }

    /// Change detection: parsing the same line twice never reports a
    /// change the second time.
    #[test]
    fn repeated_value_is_not_a_change(att in -90i32..=0) {
        let mut table = StateTable::new();
        let line = format!("ssp.vol.[{att}]");
        prop_assert!(table.parse(&line).changed);
        prop_assert!(!table.parse(&line).changed);
    }
}
