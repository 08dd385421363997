//! Input directory: the device's configured inputs, learned incrementally.
//!
//! Input inventory replies arrive as `ssp.input.list` reports whose
//! bracketed payload is `number.name`, one input per line:
//!
//! ```text
//! ssp.input.list.[1.CD]
//! ssp.input.list.[3.Apple TV]
//! ```
//!
//! The directory keeps two inverse mappings, number-to-name and
//! name-to-number: empty at construction, growing monotonically as replies
//! resolve, never pruned within a session. Input names are the laggiest
//! attribute after power-on; the first populated entry is what marks the
//! power-on refresh successful.

use std::collections::HashMap;
use stormlink_core::InputNumber;
use tracing::info;

/// Two inverse input mappings, populated as name replies arrive.
#[derive(Debug, Clone, Default)]
pub struct InputDirectory {
    names: HashMap<u8, String>,
    numbers: HashMap<String, u8>,
}

impl InputDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `ssp.input.list` payload of the form `number.name`.
    ///
    /// Returns `None` for payloads that do not carry a valid entry (empty
    /// value, missing delimiter, number outside 1-99, empty name).
    #[must_use]
    pub fn parse_entry(value: &str) -> Option<(InputNumber, String)> {
        let (number, name) = value.split_once('.')?;
        let number: InputNumber = number.trim().parse().ok()?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((number, name.to_string()))
    }

    /// Record one input. Later replies for the same number replace the
    /// stored name; the stale reverse entry is dropped.
    pub fn record(&mut self, number: InputNumber, name: &str) {
        if let Some(old) = self.names.insert(number.as_u8(), name.to_string()) {
            if old != name {
                self.numbers.remove(&old);
            }
        } else {
            info!(%number, name, "learned input name");
        }
        self.numbers.insert(name.to_string(), number.as_u8());
    }

    /// Name of an input number, if learned.
    #[must_use]
    pub fn name_of(&self, number: u8) -> Option<&str> {
        self.names.get(&number).map(String::as_str)
    }

    /// Number of a named input, if learned.
    #[must_use]
    pub fn number_of(&self, name: &str) -> Option<InputNumber> {
        self.numbers
            .get(name)
            .and_then(|&n| InputNumber::new(n).ok())
    }

    /// Known input numbers, ascending.
    #[must_use]
    pub fn numbers(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = self.names.keys().copied().collect();
        numbers.sort_unstable();
        numbers
    }

    /// True when no input has been learned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.CD", 1, "CD")]
    #[case("3.Apple TV", 3, "Apple TV")]
    #[case("12. Blu-ray ", 12, "Blu-ray")]
    fn test_parse_entry(#[case] value: &str, #[case] number: u8, #[case] name: &str) {
        let (parsed_number, parsed_name) = InputDirectory::parse_entry(value).unwrap();
        assert_eq!(parsed_number.as_u8(), number);
        assert_eq!(parsed_name, name);
    }

    #[rstest]
    #[case("")] // empty
    #[case("CD")] // no delimiter
    #[case("0.CD")] // number below range
    #[case("100.CD")] // number above range
    #[case("3.")] // empty name
    fn test_parse_entry_invalid(#[case] value: &str) {
        assert!(InputDirectory::parse_entry(value).is_none());
    }

    #[test]
    fn test_inverse_lookups() {
        let mut dir = InputDirectory::new();
        assert!(dir.is_empty());

        dir.record(InputNumber::new(3).unwrap(), "Apple TV");
        dir.record(InputNumber::new(1).unwrap(), "CD");

        assert_eq!(dir.name_of(3), Some("Apple TV"));
        assert_eq!(dir.number_of("CD").unwrap().as_u8(), 1);
        assert_eq!(dir.numbers(), vec![1, 3]);
        assert!(dir.number_of("VHS").is_none());
    }

    #[test]
    fn test_rename_drops_stale_reverse_entry() {
        let mut dir = InputDirectory::new();
        dir.record(InputNumber::new(3).unwrap(), "Apple TV");
        dir.record(InputNumber::new(3).unwrap(), "Shield");

        assert_eq!(dir.name_of(3), Some("Shield"));
        assert!(dir.number_of("Apple TV").is_none());
        assert_eq!(dir.number_of("Shield").unwrap().as_u8(), 3);
    }
}
