use crate::{
    Result,
    constants::{
        ATTENUATION_MAX, ATTENUATION_MIN, MAX_INPUT_NUMBER, MIN_INPUT_NUMBER, VOLUME_MAX,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Input number (1-99)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputNumber(u8);

impl InputNumber {
    /// Create a new input number with validation.
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` if the number is outside 1-99.
    pub fn new(number: u8) -> Result<Self> {
        if !(MIN_INPUT_NUMBER..=MAX_INPUT_NUMBER).contains(&number) {
            return Err(Error::ValueOutOfRange {
                property: "input number",
                value: i64::from(number),
                min: i64::from(MIN_INPUT_NUMBER),
                max: i64::from(MAX_INPUT_NUMBER),
            });
        }
        Ok(InputNumber(number))
    }

    /// Get the raw input number as u8.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for InputNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for InputNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let number: u8 = s.parse().map_err(|_| Error::InvalidMessageFormat {
            message: format!("Invalid input number: {s}"),
        })?;
        InputNumber::new(number)
    }
}

/// Volume attenuation in dB (-90 silent .. 0 full level).
///
/// The processor tracks volume internally as an attenuation level. Three
/// derived views exist for downstream convenience:
///
/// - attenuation: -90..0 dB (this type)
/// - volume: 0..100, the negated attenuation
/// - volume as percentage: 0..1 float, `(100 - volume) / 100`
///
/// All three setters on the client funnel back into a single attenuation
/// command on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attenuation(i32);

impl Attenuation {
    /// Create an attenuation with validation.
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` if the value is outside -90..=0 dB.
    pub fn new(db: i32) -> Result<Self> {
        if !(ATTENUATION_MIN..=ATTENUATION_MAX).contains(&db) {
            return Err(Error::ValueOutOfRange {
                property: "attenuation",
                value: i64::from(db),
                min: i64::from(ATTENUATION_MIN),
                max: i64::from(ATTENUATION_MAX),
            });
        }
        Ok(Attenuation(db))
    }

    /// Derive the attenuation from a volume on the 0..100 scale.
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` if the volume is outside 0..=100.
    pub fn from_volume(volume: i32) -> Result<Self> {
        if !(0..=VOLUME_MAX).contains(&volume) {
            return Err(Error::ValueOutOfRange {
                property: "volume",
                value: i64::from(volume),
                min: 0,
                max: i64::from(VOLUME_MAX),
            });
        }
        // volume 90..100 maps below -90; clamp to the silent floor
        Ok(Attenuation((-volume).max(ATTENUATION_MIN)))
    }

    /// Derive the attenuation from a 0..1 percentage.
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` if the percentage is outside 0..=1.
    pub fn from_percentage(pct: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&pct) {
            return Err(Error::ValueOutOfRange {
                property: "volume percentage",
                value: pct as i64,
                min: 0,
                max: 1,
            });
        }
        Self::from_volume((100.0 * (1.0 - pct)).round() as i32)
    }

    /// Raw attenuation in dB.
    #[must_use]
    pub fn db(&self) -> i32 {
        self.0
    }

    /// Volume on the 0..100 scale (negated attenuation).
    #[must_use]
    pub fn volume(&self) -> i32 {
        -self.0
    }

    /// Volume as a 0..1 percentage.
    #[must_use]
    pub fn as_percentage(&self) -> f32 {
        (VOLUME_MAX - self.volume()) as f32 / 100.0
    }
}

impl fmt::Display for Attenuation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} dB", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1)]
    #[case("15", 15)]
    #[case("99", 99)]
    fn test_input_number_valid(#[case] input: &str, #[case] expected: u8) {
        let number: InputNumber = input.parse().unwrap();
        assert_eq!(number.as_u8(), expected);
    }

    #[rstest]
    #[case("0")] // below range
    #[case("100")] // above range
    #[case("abc")] // non-numeric
    fn test_input_number_invalid(#[case] input: &str) {
        let result: Result<InputNumber> = input.parse();
        assert!(result.is_err());
    }

    #[rstest]
    #[case(0, 0)]
    #[case(-20, 20)]
    #[case(-90, 90)]
    fn test_attenuation_volume_inverse(#[case] db: i32, #[case] volume: i32) {
        let att = Attenuation::new(db).unwrap();
        assert_eq!(att.volume(), volume);
    }

    #[test]
    fn test_attenuation_out_of_range() {
        assert!(Attenuation::new(1).is_err());
        assert!(Attenuation::new(-91).is_err());
    }

    #[test]
    fn test_volume_20_is_attenuation_minus_20() {
        let att = Attenuation::from_volume(20).unwrap();
        assert_eq!(att.db(), -20);
        assert!((att.as_percentage() - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_percentage_round_trip() {
        let att = Attenuation::from_percentage(0.8).unwrap();
        assert_eq!(att.db(), -20);
    }

    #[test]
    fn test_percentage_out_of_range() {
        assert!(Attenuation::from_percentage(1.5).is_err());
        assert!(Attenuation::from_percentage(-0.1).is_err());
    }
}
