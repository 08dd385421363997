//! Attribute state table and message parser.
//!
//! The table is the authoritative in-memory copy of every attribute the
//! device has published. Every schema key has an entry at all times; a key
//! that has never been observed holds the empty string. Emptiness, never
//! absence, signals "unknown".
//!
//! [`StateTable::parse`] classifies one framed message, extracts its value,
//! updates the table unconditionally and reports whether the stored value
//! changed. The caller decides what to do with the outcome: emit a change
//! notification, start the power-on refresh cycle, feed the input
//! directory.
//!
//! # Parsing algorithm
//!
//! 1. Zone-scoped messages (`ssp.zones` prefix) are recognized but never
//!    decoded; no state mutation occurs.
//! 2. The message prefix is matched against the schema (longest key wins,
//!    see [`AttributeKey::match_message`]). No match: unrecognized, no
//!    mutation. The protocol is expected to evolve, so unknown lines are
//!    logged and skipped, never treated as errors.
//! 3. The value is the substring following the matched key's trailing
//!    delimiter, surrounding brackets stripped. A decimal point inside the
//!    value (`ssp.vol.[-32.5]`) survives intact.
//! 4. The table is updated unconditionally; `changed` is set when the new
//!    value differs from the stored one. The first real value over an
//!    always-empty prior counts as a change.
//! 5. A power-status transition from "off" to "on" is reported as
//!    `power_on_edge` so the owner can arm the refresh cycle.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::schema::AttributeKey;

/// Result of classifying one framed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOutcome {
    /// The message matched the schema or was zone-scoped.
    pub recognized: bool,
    /// The stored value changed as a result of this message.
    pub changed: bool,
    /// The matched schema key, when one matched.
    pub key: Option<AttributeKey>,
    /// The extracted value, when a key matched.
    pub value: Option<String>,
    /// The power attribute transitioned off to on with this message.
    pub power_on_edge: bool,
}

impl ParseOutcome {
    fn unrecognized() -> Self {
        ParseOutcome {
            recognized: false,
            changed: false,
            key: None,
            value: None,
            power_on_edge: false,
        }
    }

    fn unsupported() -> Self {
        ParseOutcome {
            recognized: true,
            ..ParseOutcome::unrecognized()
        }
    }
}

/// Whether a raw power value denotes "on".
fn denotes_on(value: &str) -> bool {
    matches!(value, "1" | "on")
}

/// Whether a raw power value denotes "off".
fn denotes_off(value: &str) -> bool {
    matches!(value, "0" | "off")
}

/// Authoritative attribute state with change detection.
///
/// Single writer (the parser), many readers (the typed accessors). The
/// table itself does no locking; exclusive ownership by one reactor task
/// is the concurrency model.
#[derive(Debug, Clone)]
pub struct StateTable {
    values: HashMap<AttributeKey, String>,
}

impl StateTable {
    /// Create a table with every schema key present and empty.
    pub fn new() -> Self {
        let values = AttributeKey::ALL
            .into_iter()
            .map(|key| (key, String::new()))
            .collect();
        StateTable { values }
    }

    /// Parse one framed message and fold it into the table.
    pub fn parse(&mut self, message: &str) -> ParseOutcome {
        if AttributeKey::is_zone_scoped(message) {
            warn!(%message, "zone control unsupported");
            return ParseOutcome::unsupported();
        }

        let Some(key) = AttributeKey::match_message(message) else {
            warn!(%message, "unrecognized response");
            return ParseOutcome::unrecognized();
        };

        let value = Self::extract_value(key, message);

        // invariant: new() seeds every key, so the entry always exists
        let slot = self.values.entry(key).or_default();
        let old_value = std::mem::replace(slot, value.clone());
        let changed = old_value != value;

        if changed {
            match key.value_label(&value) {
                Some(label) => info!(
                    attribute = key.description(),
                    %key, %value, label, "new value"
                ),
                None => info!(attribute = key.description(), %key, %value, "new value"),
            }
        } else {
            debug!(%key, %value, "unchanged");
        }

        let power_on_edge =
            key == AttributeKey::Power && denotes_on(&value) && denotes_off(&old_value);
        if power_on_edge {
            info!("power on detected");
        }

        ParseOutcome {
            recognized: true,
            changed,
            key: Some(key),
            value: Some(value),
            power_on_edge,
        }
    }

    /// Extract the value substring for a matched key.
    fn extract_value(key: AttributeKey, message: &str) -> String {
        let rest = &message[key.key().len()..];
        let rest = rest.strip_prefix('.').unwrap_or(rest);
        rest.trim_matches(['[', ']']).to_string()
    }

    /// Raw stored value for a key; empty means never observed.
    #[must_use]
    pub fn get(&self, key: AttributeKey) -> &str {
        self.values.get(&key).map_or("", String::as_str)
    }

    // ------------------------------------------------------------------
    // Typed read accessors. Each documents its fallback for missing or
    // unparsable data; none of them can fail.
    // ------------------------------------------------------------------

    /// Raw value parsed as integer, non-zero means true. Fallback: false.
    #[must_use]
    pub fn get_boolean(&self, key: AttributeKey) -> bool {
        self.get(key).parse::<i64>().map(|v| v != 0).unwrap_or(false)
    }

    /// Raw value parsed as integer. Fallback: `None`.
    #[must_use]
    pub fn get_integer(&self, key: AttributeKey) -> Option<i64> {
        self.get(key).parse().ok()
    }

    /// Schema label for the current raw value, falling back to the raw
    /// value itself when no label exists.
    #[must_use]
    pub fn get_text(&self, key: AttributeKey) -> String {
        let raw = self.get(key);
        key.value_label(raw).unwrap_or(raw).to_string()
    }

    /// Device power state. Fallback: false.
    #[must_use]
    pub fn power(&self) -> bool {
        let raw = self.get(AttributeKey::Power);
        denotes_on(raw) || self.get_boolean(AttributeKey::Power)
    }

    /// Mute state. Fallback: false.
    #[must_use]
    pub fn mute(&self) -> bool {
        self.get_boolean(AttributeKey::Mute)
    }

    /// Dim state. Fallback: false.
    #[must_use]
    pub fn dim(&self) -> bool {
        self.get_boolean(AttributeKey::Dim)
    }

    /// Volume attenuation in dB (-90..0).
    ///
    /// Fallback: [`ATTENUATION_UNKNOWN`](stormlink_core::constants::ATTENUATION_UNKNOWN),
    /// a sentinel below the valid range. The device may report fractional
    /// attenuation; the fraction is truncated.
    #[must_use]
    pub fn attenuation(&self) -> i32 {
        let raw = self.get(AttributeKey::Volume);
        raw.parse::<f32>()
            .map(|db| db as i32)
            .unwrap_or(stormlink_core::constants::ATTENUATION_UNKNOWN)
    }

    /// Volume on the 0..100 scale, the negated attenuation. Unknown
    /// attenuation reads as full attenuation (volume 100 on this inverted
    /// scale reads as percentage 0.0).
    #[must_use]
    pub fn volume(&self) -> i32 {
        (-self.attenuation()).clamp(0, stormlink_core::constants::VOLUME_MAX)
    }

    /// Volume as a 0..1 percentage: `(100 - volume) / 100`.
    #[must_use]
    pub fn volume_as_percentage(&self) -> f32 {
        (stormlink_core::constants::VOLUME_MAX - self.volume()) as f32 / 100.0
    }

    /// Brand / model identification. Fallback: `"Unknown Brand"`.
    #[must_use]
    pub fn brand(&self) -> String {
        let raw = self.get(AttributeKey::Brand);
        if raw.is_empty() {
            "Unknown Brand".to_string()
        } else {
            raw.to_string()
        }
    }

    /// Firmware version. Fallback: `"Unknown Version"`.
    #[must_use]
    pub fn version(&self) -> String {
        let raw = self.get(AttributeKey::Version);
        if raw.is_empty() {
            "Unknown Version".to_string()
        } else {
            raw.to_string()
        }
    }

    /// Front panel brightness (0-3). Fallback: `None`.
    #[must_use]
    pub fn panel_brightness(&self) -> Option<i64> {
        self.get_integer(AttributeKey::Brightness)
    }

    /// Listening (surround) mode code (0-16). Fallback: `None`.
    #[must_use]
    pub fn listening_mode(&self) -> Option<i64> {
        self.get_integer(AttributeKey::SurroundMode)
    }

    /// Dynamic range control setting (0-2). Fallback: `None`.
    #[must_use]
    pub fn dynamic_range(&self) -> Option<i64> {
        self.get_integer(AttributeKey::DynamicRange)
    }

    /// Currently selected input number. Fallback: `None`.
    #[must_use]
    pub fn input_number(&self) -> Option<i64> {
        self.get_integer(AttributeKey::Input)
    }

    /// Processor state code. Fallback: `None`.
    #[must_use]
    pub fn processor_state(&self) -> Option<i64> {
        self.get_integer(AttributeKey::ProcState)
    }

    /// Processor state label, raw code when unlabeled.
    #[must_use]
    pub fn processor_state_text(&self) -> String {
        self.get_text(AttributeKey::ProcState)
    }

    /// Message status label, raw code when unlabeled.
    #[must_use]
    pub fn message_status_text(&self) -> String {
        self.get_text(AttributeKey::MsgStatus)
    }

    /// Auro preset label, raw code when unlabeled.
    #[must_use]
    pub fn auro_preset_text(&self) -> String {
        self.get_text(AttributeKey::AuroPreset)
    }

    /// SphereAudio effect label, raw code when unlabeled.
    #[must_use]
    pub fn sphere_audio_effect_text(&self) -> String {
        self.get_text(AttributeKey::SphereAudioEffect)
    }

    /// Sample rate of the current stream. Fallback: `None`.
    #[must_use]
    pub fn sample_rate(&self) -> Option<i64> {
        self.get_integer(AttributeKey::SampleRate)
    }

    /// Stream type, raw. Fallback: empty string.
    #[must_use]
    pub fn stream_type(&self) -> &str {
        self.get(AttributeKey::StreamType)
    }

    /// Format code, raw. Fallback: empty string.
    #[must_use]
    pub fn format_code(&self) -> &str {
        self.get(AttributeKey::FormatCode)
    }
}

impl Default for StateTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use stormlink_core::constants::ATTENUATION_UNKNOWN;

    #[test]
    fn test_every_key_present_and_empty() {
        let table = StateTable::new();
        for key in AttributeKey::ALL {
            assert_eq!(table.get(key), "");
        }
    }

    #[rstest]
    #[case("ssp.power.on", AttributeKey::Power, "on")]
    #[case("ssp.vol.[-32.5]", AttributeKey::Volume, "-32.5")]
    #[case("ssp.brightness.[2]", AttributeKey::Brightness, "2")]
    #[case("ssp.input.list.[3.Apple TV]", AttributeKey::InputList, "3.Apple TV")]
    #[case("ssp.frontpanel.color.[1]", AttributeKey::FrontPanelColor, "1")]
    fn test_value_extraction(
        #[case] message: &str,
        #[case] key: AttributeKey,
        #[case] value: &str,
    ) {
        let mut table = StateTable::new();
        let outcome = table.parse(message);
        assert!(outcome.recognized);
        assert_eq!(outcome.key, Some(key));
        assert_eq!(outcome.value.as_deref(), Some(value));
        assert_eq!(table.get(key), value);
    }

    #[test]
    fn test_change_detection() {
        let mut table = StateTable::new();

        // first real value over an empty prior is a change
        assert!(table.parse("ssp.vol.[-40]").changed);
        // same value again is not
        assert!(!table.parse("ssp.vol.[-40]").changed);
        // different value is
        assert!(table.parse("ssp.vol.[-35]").changed);
    }

    #[test]
    fn test_unrecognized_leaves_state_alone() {
        let mut table = StateTable::new();
        table.parse("ssp.vol.[-40]");
        let outcome = table.parse("ssp.nonsense.[1]");
        assert!(!outcome.recognized);
        assert!(!outcome.changed);
        assert_eq!(table.get(AttributeKey::Volume), "-40");
    }

    #[test]
    fn test_zone_scoped_recognized_not_decoded() {
        let mut table = StateTable::new();
        let outcome = table.parse("ssp.zones.list.[2]");
        assert!(outcome.recognized);
        assert!(outcome.key.is_none());
        assert_eq!(table.get(AttributeKey::ZoneList), "");
    }

    #[rstest]
    #[case("off", "on", true)]
    #[case("0", "1", true)]
    #[case("off", "1", true)]
    #[case("", "on", false)] // never-observed prior is not an off state
    #[case("on", "on", false)]
    fn test_power_on_edge(#[case] before: &str, #[case] after: &str, #[case] edge: bool) {
        let mut table = StateTable::new();
        if !before.is_empty() {
            table.parse(&format!("ssp.power.{before}"));
        }
        let outcome = table.parse(&format!("ssp.power.{after}"));
        assert_eq!(outcome.power_on_edge, edge);
    }

    #[test]
    fn test_boolean_round_trip() {
        use crate::command::Command;

        // encode a boolean write, echo it back, read it as true
        let mut table = StateTable::new();
        let wire = Command::set_mute(true).encode();
        table.parse(&wire);
        assert!(table.mute());
    }

    #[test]
    fn test_boolean_fallbacks() {
        let table = StateTable::new();
        assert!(!table.power());
        assert!(!table.mute());

        let mut table = StateTable::new();
        table.parse("ssp.mute.[garbage]");
        assert!(!table.mute());
    }

    #[test]
    fn test_power_accepts_keyword_and_numeric() {
        let mut table = StateTable::new();
        table.parse("ssp.power.on");
        assert!(table.power());
        table.parse("ssp.power.[0]");
        assert!(!table.power());
        table.parse("ssp.power.[1]");
        assert!(table.power());
    }

    #[test]
    fn test_volume_family_derivation() {
        let mut table = StateTable::new();
        table.parse("ssp.vol.[-20]");
        assert_eq!(table.attenuation(), -20);
        assert_eq!(table.volume(), 20);
        assert!((table.volume_as_percentage() - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_fractional_attenuation_truncates() {
        let mut table = StateTable::new();
        table.parse("ssp.vol.[-32.5]");
        assert_eq!(table.attenuation(), -32);
    }

    #[test]
    fn test_attenuation_sentinel_on_missing_or_garbage() {
        let table = StateTable::new();
        assert_eq!(table.attenuation(), ATTENUATION_UNKNOWN);

        let mut table = StateTable::new();
        table.parse("ssp.vol.[loud]");
        assert_eq!(table.attenuation(), ATTENUATION_UNKNOWN);
        assert!((table.volume_as_percentage() - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_text_fallbacks() {
        let table = StateTable::new();
        assert_eq!(table.brand(), "Unknown Brand");
        assert_eq!(table.version(), "Unknown Version");

        let mut table = StateTable::new();
        table.parse("ssp.brand.[ISP Elite 24]");
        assert_eq!(table.brand(), "ISP Elite 24");
    }

    #[test]
    fn test_labeled_accessors() {
        let mut table = StateTable::new();
        table.parse("ssp.procstate.[2]");
        assert_eq!(table.processor_state(), Some(2));
        assert_eq!(table.processor_state_text(), "On");

        // unlabeled code falls back to the raw value
        table.parse("ssp.procstate.[9]");
        assert_eq!(table.processor_state_text(), "9");
    }
}
