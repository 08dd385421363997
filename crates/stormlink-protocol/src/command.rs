//! Outbound command encoding for the Storm Audio ISP protocol.
//!
//! Queries and commands share one wire form: the raw text terminated by a
//! line feed. Setting a value takes one of two shapes depending on the
//! value's class:
//!
//! - reserved keyword (`on`, `off`, `toggle`, `up`, `down`): `key.value`
//! - anything else (numeric or text payload): `key.[value]`
//!
//! The brackets delimit free-form payloads from keyword payloads, so a
//! value of `"on"` and a literal string `on` stay distinguishable.
//!
//! Typed constructors validate ranges before building a command. An
//! out-of-range request never reaches the wire; it is reported as
//! [`Error::ValueOutOfRange`].

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use std::fmt;
use stormlink_core::constants::{
    DYNAMIC_RANGE_MAX, LINE_TERMINATOR, LISTENING_MODE_MAX, LISTENING_MODE_WIDTH,
    PANEL_BRIGHTNESS_MAX, RESERVED_SET_KEYWORDS,
};
use stormlink_core::{Attenuation, Error, InputNumber, Result};

use crate::schema::AttributeKey;

/// Classified payload of a set operation.
///
/// Serialize-only: the keyword variant borrows from the static keyword
/// table, so these values are built through [`classify`](SetValue::classify)
/// or the typed constructors, never deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SetValue {
    /// One of the reserved keywords, encoded unbracketed.
    Keyword(&'static str),
    /// Free-form payload, encoded bracketed.
    Literal(String),
}

impl SetValue {
    /// Classify a raw value string.
    ///
    /// The keyword comparison is case-sensitive: `"On"` is a literal.
    #[must_use]
    pub fn classify(value: &str) -> SetValue {
        for keyword in RESERVED_SET_KEYWORDS {
            if value == keyword {
                return SetValue::Keyword(keyword);
            }
        }
        SetValue::Literal(value.to_string())
    }
}

/// One outbound protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Command {
    /// Query the current value of a schema attribute.
    Query(AttributeKey),
    /// Raw command text, passed through verbatim. Escape hatch for anything
    /// the typed constructors do not cover.
    Raw(String),
    /// Set an attribute to a value.
    Set { key: AttributeKey, value: SetValue },
}

impl Command {
    /// Set an attribute from a raw value string, classifying keyword vs
    /// bracketed form automatically.
    #[must_use]
    pub fn set(key: AttributeKey, value: &str) -> Command {
        Command::Set {
            key,
            value: SetValue::classify(value),
        }
    }

    /// Boolean write: encodes `1` for true, `0` for false.
    #[must_use]
    pub fn set_boolean(key: AttributeKey, value: bool) -> Command {
        Command::set(key, if value { "1" } else { "0" })
    }

    /// Power on/off.
    #[must_use]
    pub fn set_power(on: bool) -> Command {
        Command::set_boolean(AttributeKey::Power, on)
    }

    /// Mute on/off.
    #[must_use]
    pub fn set_mute(mute: bool) -> Command {
        Command::set_boolean(AttributeKey::Mute, mute)
    }

    /// Dim on/off.
    #[must_use]
    pub fn set_dim(dim: bool) -> Command {
        Command::set_boolean(AttributeKey::Dim, dim)
    }

    /// Master volume as attenuation.
    #[must_use]
    pub fn set_attenuation(att: Attenuation) -> Command {
        Command::set(AttributeKey::Volume, &att.db().to_string())
    }

    /// Master volume on the 0..100 scale; re-derives the attenuation.
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` outside 0..=100.
    pub fn set_volume(volume: i32) -> Result<Command> {
        Ok(Command::set_attenuation(Attenuation::from_volume(volume)?))
    }

    /// Master volume as a 0..1 percentage; re-derives the attenuation.
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` outside 0..=1.
    pub fn set_volume_percentage(pct: f32) -> Result<Command> {
        Ok(Command::set_attenuation(Attenuation::from_percentage(pct)?))
    }

    /// Front panel brightness (0-3).
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` outside 0..=3.
    pub fn set_panel_brightness(level: u8) -> Result<Command> {
        if level > PANEL_BRIGHTNESS_MAX {
            return Err(Error::ValueOutOfRange {
                property: "panel brightness",
                value: i64::from(level),
                min: 0,
                max: i64::from(PANEL_BRIGHTNESS_MAX),
            });
        }
        Ok(Command::set(AttributeKey::Brightness, &level.to_string()))
    }

    /// Listening (surround) mode (0-16), zero-padded to two digits on the
    /// wire.
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` outside 0..=16.
    pub fn set_listening_mode(mode: u8) -> Result<Command> {
        if mode > LISTENING_MODE_MAX {
            return Err(Error::ValueOutOfRange {
                property: "listening mode",
                value: i64::from(mode),
                min: 0,
                max: i64::from(LISTENING_MODE_MAX),
            });
        }
        Ok(Command::set(
            AttributeKey::SurroundMode,
            &format!("{mode:0width$}", width = LISTENING_MODE_WIDTH),
        ))
    }

    /// Dynamic range control setting (0-2).
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` outside 0..=2.
    pub fn set_dynamic_range(setting: u8) -> Result<Command> {
        if setting > DYNAMIC_RANGE_MAX {
            return Err(Error::ValueOutOfRange {
                property: "dynamic range",
                value: i64::from(setting),
                min: 0,
                max: i64::from(DYNAMIC_RANGE_MAX),
            });
        }
        Ok(Command::set(AttributeKey::DynamicRange, &setting.to_string()))
    }

    /// Select an input by number.
    #[must_use]
    pub fn set_input_number(number: InputNumber) -> Command {
        Command::set(AttributeKey::Input, &number.to_string())
    }

    /// The command's textual wire form, without the terminator.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Command::Query(key) => key.key().to_string(),
            Command::Raw(text) => text.clone(),
            Command::Set { key, value } => match value {
                SetValue::Keyword(kw) => format!("{}.{kw}", key.key()),
                SetValue::Literal(v) => format!("{}.[{v}]", key.key()),
            },
        }
    }

    /// The complete outbound bytes, line-feed terminated.
    #[must_use]
    pub fn to_wire(&self) -> Bytes {
        let text = self.encode();
        let mut buf = BytesMut::with_capacity(text.len() + 1);
        buf.put_slice(text.as_bytes());
        buf.put_u8(LINE_TERMINATOR);
        buf.freeze()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_query_and_raw_share_wire_form() {
        let query = Command::Query(AttributeKey::Volume);
        let raw = Command::Raw("ssp.vol".to_string());
        assert_eq!(query.to_wire(), raw.to_wire());
        assert_eq!(&query.to_wire()[..], b"ssp.vol\n");
    }

    #[rstest]
    #[case("on", "ssp.power.on")]
    #[case("toggle", "ssp.power.toggle")]
    #[case("1", "ssp.power.[1]")]
    #[case("On", "ssp.power.[On]")] // keyword match is case-sensitive
    fn test_set_value_classes(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(Command::set(AttributeKey::Power, value).encode(), expected);
    }

    #[test]
    fn test_boolean_write() {
        assert_eq!(Command::set_mute(true).encode(), "ssp.mute.[1]");
        assert_eq!(Command::set_mute(false).encode(), "ssp.mute.[0]");
    }

    #[test]
    fn test_volume_rederives_attenuation() {
        let cmd = Command::set_volume(20).unwrap();
        assert_eq!(cmd.encode(), "ssp.vol.[-20]");

        let cmd = Command::set_volume_percentage(0.8).unwrap();
        assert_eq!(cmd.encode(), "ssp.vol.[-20]");
    }

    #[test]
    fn test_listening_mode_zero_padded() {
        let cmd = Command::set_listening_mode(5).unwrap();
        assert_eq!(cmd.encode(), "ssp.surroundmode.[05]");

        let cmd = Command::set_listening_mode(14).unwrap();
        assert_eq!(cmd.encode(), "ssp.surroundmode.[14]");
    }

    #[rstest]
    #[case(Command::set_listening_mode(17))]
    #[case(Command::set_panel_brightness(4))]
    #[case(Command::set_dynamic_range(3))]
    #[case(Command::set_volume(101))]
    fn test_out_of_range_never_encodes(#[case] result: Result<Command>) {
        assert!(matches!(result, Err(Error::ValueOutOfRange { .. })));
    }

    #[test]
    fn test_wire_is_terminated() {
        let wire = Command::set_dim(true).to_wire();
        assert_eq!(wire.last(), Some(&b'\n'));
    }
}
