//! Static attribute schema for the Storm Audio ISP protocol.
//!
//! Every attribute the device reports is identified by a dotted ASCII key
//! such as `ssp.vol` or `ssp.frontpanel.color`. This module is the single
//! source of truth for the known keys: their wire strings, human-readable
//! descriptions, and, where the protocol defines one, the enumerated
//! value-to-label table.
//!
//! The schema is pure data. Matching a raw message against it lives here
//! too ([`AttributeKey::match_message`]) because the rule is a property of
//! the key set: the longest schema key that prefixes the message wins, so
//! `ssp.input.list.[3.CD]` resolves to [`AttributeKey::InputList`] and not
//! to [`AttributeKey::Input`].
//!
//! Unknown keys are legal wire input; they simply match nothing and are
//! never tracked.

use serde::{Deserialize, Serialize};
use std::fmt;
use stormlink_core::constants::ZONE_PREFIX;

/// One known device attribute.
///
/// The variants mirror the published Storm Audio IP-control vocabulary.
/// Using an enum rather than bare key strings gives exhaustive matches in
/// the state table and makes a typo in an accessor a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKey {
    /// Processor status (0=Off, 1=Starting/Stopping, 2=On).
    ProcState,
    /// Power state.
    Power,
    /// Firmware version number.
    Version,
    /// Brand / model identification.
    Brand,
    /// Message status group.
    MsgStatus,
    /// Currently selected input number.
    Input,
    /// Configured input inventory; replies carry `number.name` payloads.
    InputList,
    /// Active preset.
    Preset,
    /// Surround (listening) mode.
    SurroundMode,
    /// Surround modes applicable to the current stream.
    AllowedMode,
    /// Speaker configuration ID.
    SpeakerConfig,
    /// Mute status.
    Mute,
    /// Dim status.
    Dim,
    /// Master volume, reported as attenuation in dB.
    Volume,
    /// Bass level.
    Bass,
    /// Treble level.
    Treble,
    /// Brightness level.
    Brightness,
    /// Center enhance.
    CenterEnhance,
    /// Surround enhance.
    SurroundEnhance,
    /// Lip sync level.
    LipSync,
    /// Subwoofer enhance.
    SubwooferEnhance,
    /// Auro-3D strength.
    AuroStrength,
    /// Auro-3D preset.
    AuroPreset,
    /// Dynamic range control status.
    DynamicRange,
    /// Center spread.
    CenterSpread,
    /// Dialog control.
    DialogControl,
    /// Dialog normalization.
    DialogNorm,
    /// IMAX mode.
    ImaxMode,
    /// SphereAudio effect.
    SphereAudioEffect,
    /// LFE dim.
    LfeDim,
    /// Zone inventory. Zone-scoped replies are never decoded; the key exists
    /// so the query is still issued during a full refresh.
    ZoneList,
    /// Front panel color.
    FrontPanelColor,
    /// Front panel standby brightness.
    FrontPanelStandbyBrightness,
    /// Front panel active brightness.
    FrontPanelActiveBrightness,
    /// Front panel standby delay.
    FrontPanelStandbyDelay,
    /// Sample rate of the current stream.
    SampleRate,
    /// Stream type.
    StreamType,
    /// Format code of the current stream.
    FormatCode,
    /// Trigger 1 state.
    Trigger1,
}

impl AttributeKey {
    /// Every key in the schema, in wire-documentation order.
    pub const ALL: [AttributeKey; 39] = [
        AttributeKey::ProcState,
        AttributeKey::Power,
        AttributeKey::Version,
        AttributeKey::Brand,
        AttributeKey::MsgStatus,
        AttributeKey::Input,
        AttributeKey::InputList,
        AttributeKey::Preset,
        AttributeKey::SurroundMode,
        AttributeKey::AllowedMode,
        AttributeKey::SpeakerConfig,
        AttributeKey::Mute,
        AttributeKey::Dim,
        AttributeKey::Volume,
        AttributeKey::Bass,
        AttributeKey::Treble,
        AttributeKey::Brightness,
        AttributeKey::CenterEnhance,
        AttributeKey::SurroundEnhance,
        AttributeKey::LipSync,
        AttributeKey::SubwooferEnhance,
        AttributeKey::AuroStrength,
        AttributeKey::AuroPreset,
        AttributeKey::DynamicRange,
        AttributeKey::CenterSpread,
        AttributeKey::DialogControl,
        AttributeKey::DialogNorm,
        AttributeKey::ImaxMode,
        AttributeKey::SphereAudioEffect,
        AttributeKey::LfeDim,
        AttributeKey::ZoneList,
        AttributeKey::FrontPanelColor,
        AttributeKey::FrontPanelStandbyBrightness,
        AttributeKey::FrontPanelActiveBrightness,
        AttributeKey::FrontPanelStandbyDelay,
        AttributeKey::SampleRate,
        AttributeKey::StreamType,
        AttributeKey::FormatCode,
        AttributeKey::Trigger1,
    ];

    /// Attributes that remain queryable while the device is powered off.
    ///
    /// The only safe bootstrap queries when the power state is not yet
    /// known.
    pub const CORE: [AttributeKey; 2] = [AttributeKey::Power, AttributeKey::Brand];

    /// The wire key string.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            AttributeKey::ProcState => "ssp.procstate",
            AttributeKey::Power => "ssp.power",
            AttributeKey::Version => "ssp.version",
            AttributeKey::Brand => "ssp.brand",
            AttributeKey::MsgStatus => "ssp.msgstatus",
            AttributeKey::Input => "ssp.input",
            AttributeKey::InputList => "ssp.input.list",
            AttributeKey::Preset => "ssp.preset",
            AttributeKey::SurroundMode => "ssp.surroundmode",
            AttributeKey::AllowedMode => "ssp.allowedmode",
            AttributeKey::SpeakerConfig => "ssp.speaker",
            AttributeKey::Mute => "ssp.mute",
            AttributeKey::Dim => "ssp.dim",
            AttributeKey::Volume => "ssp.vol",
            AttributeKey::Bass => "ssp.bass",
            AttributeKey::Treble => "ssp.treb",
            AttributeKey::Brightness => "ssp.brightness",
            AttributeKey::CenterEnhance => "ssp.c_en",
            AttributeKey::SurroundEnhance => "ssp.s_en",
            AttributeKey::LipSync => "ssp.lipsync",
            AttributeKey::SubwooferEnhance => "ssp.sub_en",
            AttributeKey::AuroStrength => "ssp.aurostrength",
            AttributeKey::AuroPreset => "ssp.auropreset",
            AttributeKey::DynamicRange => "ssp.drc",
            AttributeKey::CenterSpread => "ssp.cspread",
            AttributeKey::DialogControl => "ssp.dialogcontrol",
            AttributeKey::DialogNorm => "ssp.dialognorm",
            AttributeKey::ImaxMode => "ssp.IMAXMode",
            AttributeKey::SphereAudioEffect => "ssp.spheraudioeffect",
            AttributeKey::LfeDim => "ssp.lfedim",
            AttributeKey::ZoneList => "ssp.zones.list",
            AttributeKey::FrontPanelColor => "ssp.frontpanel.color",
            AttributeKey::FrontPanelStandbyBrightness => "ssp.frontpanel.stbybright",
            AttributeKey::FrontPanelActiveBrightness => "ssp.frontpanel.actbright",
            AttributeKey::FrontPanelStandbyDelay => "ssp.frontpanel.stbydelay",
            AttributeKey::SampleRate => "ssp.fs",
            AttributeKey::StreamType => "ssp.stream",
            AttributeKey::FormatCode => "ssp.format",
            AttributeKey::Trigger1 => "ssp.trig1",
        }
    }

    /// Human-readable description for logging and UIs.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            AttributeKey::ProcState => "Processor Status",
            AttributeKey::Power => "Power",
            AttributeKey::Version => "Version Number",
            AttributeKey::Brand => "Brand",
            AttributeKey::MsgStatus => "Message Status Group",
            AttributeKey::Input => "Input",
            AttributeKey::InputList => "List all configured inputs",
            AttributeKey::Preset => "Preset",
            AttributeKey::SurroundMode => "Surround Mode",
            AttributeKey::AllowedMode => "Active Surround Modes",
            AttributeKey::SpeakerConfig => "Speaker Config ID",
            AttributeKey::Mute => "Mute status",
            AttributeKey::Dim => "Dim status",
            AttributeKey::Volume => "Volume Level",
            AttributeKey::Bass => "Bass Level",
            AttributeKey::Treble => "Treble Level",
            AttributeKey::Brightness => "Brightness Level",
            AttributeKey::CenterEnhance => "Center Enhance",
            AttributeKey::SurroundEnhance => "Surround Enhance",
            AttributeKey::LipSync => "Lip Sync Level",
            AttributeKey::SubwooferEnhance => "Subwoofer Enhance",
            AttributeKey::AuroStrength => "Auro Strength",
            AttributeKey::AuroPreset => "Auro Preset",
            AttributeKey::DynamicRange => "DRC Status",
            AttributeKey::CenterSpread => "Center Spread",
            AttributeKey::DialogControl => "Dialog Control",
            AttributeKey::DialogNorm => "Dialog Norm",
            AttributeKey::ImaxMode => "IMAX Mode",
            AttributeKey::SphereAudioEffect => "SphereAudio Effect",
            AttributeKey::LfeDim => "LFE Dim",
            AttributeKey::ZoneList => "Zone List",
            AttributeKey::FrontPanelColor => "Front Panel Color",
            AttributeKey::FrontPanelStandbyBrightness => "Front Panel Standby Brightness",
            AttributeKey::FrontPanelActiveBrightness => "Front Panel Active Brightness",
            AttributeKey::FrontPanelStandbyDelay => "Front Panel Standby Delay",
            AttributeKey::SampleRate => "Sample Rate",
            AttributeKey::StreamType => "Stream Type",
            AttributeKey::FormatCode => "Format Code",
            AttributeKey::Trigger1 => "Trigger 1",
        }
    }

    /// Look up the label for an enumerated raw value.
    ///
    /// Returns `None` for free-form attributes (numeric levels, version
    /// strings) and for codes outside the documented table.
    #[must_use]
    pub fn value_label(&self, raw: &str) -> Option<&'static str> {
        match self {
            AttributeKey::ProcState => match raw {
                "0" => Some("Off"),
                "1" => Some("Starting / Stopping"),
                "2" => Some("On"),
                _ => None,
            },
            AttributeKey::MsgStatus => match raw {
                "0" => Some(""),
                "1" => Some("Backup parameters in progress"),
                "2" => Some("Restore parameters in progress"),
                "3" => Some("Selective parameters in progress"),
                "4" => Some("Reset parameters in progress"),
                "5" => Some("Firmware upgrade in progress"),
                "6" => Some("Loading Dirac room calibration"),
                "98" => Some("String Message"),
                "99" => Some(""),
                _ => None,
            },
            AttributeKey::AuroPreset => match raw {
                "0" => Some("Small"),
                "1" => Some("Medium"),
                "2" => Some("Large"),
                "3" => Some("Speech"),
                _ => None,
            },
            AttributeKey::SphereAudioEffect => match raw {
                "0" => Some("ByPass"),
                "1" => Some("Lounge"),
                "2" => Some("Home Cinema"),
                "3" => Some("Concert"),
                "4" => Some("Cinema"),
                _ => None,
            },
            _ => None,
        }
    }

    /// Match a raw message line against the schema.
    ///
    /// The longest key that prefixes the message wins, and the match must
    /// end on a segment boundary (end of message or a `.`). Returns `None`
    /// for unknown keys.
    #[must_use]
    pub fn match_message(message: &str) -> Option<AttributeKey> {
        let mut best: Option<AttributeKey> = None;
        for key in AttributeKey::ALL {
            let text = key.key();
            if message.starts_with(text)
                && (message.len() == text.len() || message.as_bytes()[text.len()] == b'.')
                && best.is_none_or(|b| text.len() > b.key().len())
            {
                best = Some(key);
            }
        }
        best
    }

    /// Whether a raw message is zone-scoped (`ssp.zones` prefix).
    ///
    /// Zone-scoped messages are recognized but never decoded.
    #[must_use]
    pub fn is_zone_scoped(message: &str) -> bool {
        message.starts_with(ZONE_PREFIX)
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
