//! Typed property facade over the live protocol state.
//!
//! An [`Isp`] is a cheap clonable handle onto one connection's state.
//! Reads go straight to the attribute state table and never fail; each
//! accessor documents its fallback for data the device has not reported
//! yet. Writes validate locally, encode, and queue the command for the
//! reactor's paced send path.
//!
//! # Write failure semantics
//!
//! Out-of-range or unresolvable writes return an explicit error and send
//! nothing. (The implementation this derives from dropped such writes
//! silently; the explicit error is a deliberate tightening.) A write
//! while the link is down is different: it is logged and dropped without
//! error, because restoring the transport is the caller's supervision
//! concern, not a per-write failure.

use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use stormlink_core::{Attenuation, Error, InputNumber, Result};
use stormlink_protocol::{AttributeKey, Command};

use crate::client::{Shared, lock_read};

/// Handle to a connected Storm Audio ISP.
#[derive(Debug, Clone)]
pub struct Isp {
    shared: Arc<RwLock<Shared>>,
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl Isp {
    pub(crate) fn new(shared: Arc<RwLock<Shared>>, cmd_tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { shared, cmd_tx }
    }

    /// True while the reactor task is alive.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.cmd_tx.is_closed()
    }

    // ------------------------------------------------------------------
    // Raw command surface
    // ------------------------------------------------------------------

    /// Queue a command for the paced send path.
    ///
    /// With the link down the command is logged and dropped: a
    /// recoverable condition, never an error.
    pub fn send(&self, command: Command) {
        if self.cmd_tx.send(command).is_err() {
            warn!("no transport attached, dropping command");
        }
    }

    /// Issue a raw query for one attribute.
    pub fn query(&self, key: AttributeKey) {
        self.send(Command::Query(key));
    }

    /// Issue a raw command string, verbatim. Escape hatch for anything
    /// the typed surface does not cover.
    pub fn command(&self, raw: impl Into<String>) {
        self.send(Command::Raw(raw.into()));
    }

    /// Query the attributes that answer regardless of power state.
    ///
    /// The only safe bootstrap when the device may be in standby.
    pub fn refresh_core(&self) {
        debug!("querying core attribute subset");
        for key in AttributeKey::CORE {
            self.query(key);
        }
    }

    /// Query every known attribute.
    pub fn refresh_all(&self) {
        debug!("querying all attributes");
        for key in AttributeKey::ALL {
            self.query(key);
        }
    }

    // ------------------------------------------------------------------
    // Booleans
    // ------------------------------------------------------------------

    /// Device power state. Fallback: false.
    #[must_use]
    pub fn power(&self) -> bool {
        lock_read(&self.shared).table.power()
    }

    /// Power the device on or off.
    pub fn set_power(&self, on: bool) {
        self.send(Command::set_power(on));
    }

    /// Mute state. Fallback: false.
    #[must_use]
    pub fn mute(&self) -> bool {
        lock_read(&self.shared).table.mute()
    }

    /// Mute or unmute.
    pub fn set_mute(&self, mute: bool) {
        self.send(Command::set_mute(mute));
    }

    /// Dim state. Fallback: false.
    #[must_use]
    pub fn dim(&self) -> bool {
        lock_read(&self.shared).table.dim()
    }

    /// Dim or undim the display.
    pub fn set_dim(&self, dim: bool) {
        self.send(Command::set_dim(dim));
    }

    // ------------------------------------------------------------------
    // Volume family: three views over one underlying attenuation
    // ------------------------------------------------------------------

    /// Volume attenuation in dB (-90..0). Fallback: -100 sentinel.
    #[must_use]
    pub fn attenuation(&self) -> i32 {
        lock_read(&self.shared).table.attenuation()
    }

    /// Set the attenuation in dB.
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` outside -90..=0; nothing is sent.
    pub fn set_attenuation(&self, db: i32) -> Result<()> {
        self.send(Command::set_attenuation(Attenuation::new(db)?));
        Ok(())
    }

    /// Volume on the 0..100 scale. See
    /// [`StateTable::volume`](stormlink_protocol::StateTable::volume).
    #[must_use]
    pub fn volume(&self) -> i32 {
        lock_read(&self.shared).table.volume()
    }

    /// Set the volume (0..100); re-derives the attenuation command.
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` outside 0..=100; nothing is sent.
    pub fn set_volume(&self, volume: i32) -> Result<()> {
        self.send(Command::set_volume(volume)?);
        Ok(())
    }

    /// Volume as a 0..1 percentage.
    #[must_use]
    pub fn volume_as_percentage(&self) -> f32 {
        lock_read(&self.shared).table.volume_as_percentage()
    }

    /// Set the volume as a 0..1 percentage; re-derives the attenuation
    /// command.
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` outside 0..=1; nothing is sent.
    pub fn set_volume_percentage(&self, pct: f32) -> Result<()> {
        self.send(Command::set_volume_percentage(pct)?);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bounded integers
    // ------------------------------------------------------------------

    /// Front panel brightness (0-3). Fallback: `None`.
    #[must_use]
    pub fn panel_brightness(&self) -> Option<i64> {
        lock_read(&self.shared).table.panel_brightness()
    }

    /// Set the front panel brightness (0-3).
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` outside 0..=3; nothing is sent.
    pub fn set_panel_brightness(&self, level: u8) -> Result<()> {
        self.send(Command::set_panel_brightness(level)?);
        Ok(())
    }

    /// Listening (surround) mode code (0-16). Fallback: `None`.
    #[must_use]
    pub fn listening_mode(&self) -> Option<i64> {
        lock_read(&self.shared).table.listening_mode()
    }

    /// Set the listening mode (0-16).
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` outside 0..=16; nothing is sent.
    pub fn set_listening_mode(&self, mode: u8) -> Result<()> {
        self.send(Command::set_listening_mode(mode)?);
        Ok(())
    }

    /// Dynamic range control setting (0-2). Fallback: `None`.
    #[must_use]
    pub fn dynamic_range(&self) -> Option<i64> {
        lock_read(&self.shared).table.dynamic_range()
    }

    /// Set the dynamic range control (0-2).
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` outside 0..=2; nothing is sent.
    pub fn set_dynamic_range(&self, setting: u8) -> Result<()> {
        self.send(Command::set_dynamic_range(setting)?);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Enumerated raw/text pairs (read-only)
    // ------------------------------------------------------------------

    /// Processor state code. Fallback: `None`.
    #[must_use]
    pub fn processor_state(&self) -> Option<i64> {
        lock_read(&self.shared).table.processor_state()
    }

    /// Processor state label, raw code when unlabeled.
    #[must_use]
    pub fn processor_state_text(&self) -> String {
        lock_read(&self.shared).table.processor_state_text()
    }

    /// Message status label, raw code when unlabeled.
    #[must_use]
    pub fn message_status_text(&self) -> String {
        lock_read(&self.shared).table.message_status_text()
    }

    /// Auro preset label, raw code when unlabeled.
    #[must_use]
    pub fn auro_preset_text(&self) -> String {
        lock_read(&self.shared).table.auro_preset_text()
    }

    /// SphereAudio effect label, raw code when unlabeled.
    #[must_use]
    pub fn sphere_audio_effect_text(&self) -> String {
        lock_read(&self.shared).table.sphere_audio_effect_text()
    }

    /// Sample rate of the current stream. Fallback: `None`.
    #[must_use]
    pub fn sample_rate(&self) -> Option<i64> {
        lock_read(&self.shared).table.sample_rate()
    }

    /// Stream type, raw. Fallback: empty string.
    #[must_use]
    pub fn stream_type(&self) -> String {
        lock_read(&self.shared).table.stream_type().to_string()
    }

    /// Format code, raw. Fallback: empty string.
    #[must_use]
    pub fn format_code(&self) -> String {
        lock_read(&self.shared).table.format_code().to_string()
    }

    // ------------------------------------------------------------------
    // Free text (read-only)
    // ------------------------------------------------------------------

    /// Brand / model identification. Fallback: `"Unknown Brand"`.
    #[must_use]
    pub fn brand(&self) -> String {
        lock_read(&self.shared).table.brand()
    }

    /// Firmware version. Fallback: `"Unknown Version"`.
    #[must_use]
    pub fn version(&self) -> String {
        lock_read(&self.shared).table.version()
    }

    // ------------------------------------------------------------------
    // Input directory
    // ------------------------------------------------------------------

    /// Known input numbers, ascending. Empty until name replies resolve.
    #[must_use]
    pub fn input_numbers(&self) -> Vec<u8> {
        lock_read(&self.shared).inputs.numbers()
    }

    /// Name of the currently active input. Fallback: `"Unknown"`.
    #[must_use]
    pub fn input_name(&self) -> String {
        let shared = lock_read(&self.shared);
        shared
            .table
            .input_number()
            .and_then(|n| u8::try_from(n).ok())
            .and_then(|n| shared.inputs.name_of(n))
            .unwrap_or("Unknown")
            .to_string()
    }

    /// Name of a specific input number, if learned.
    #[must_use]
    pub fn input_name_of(&self, number: u8) -> Option<String> {
        lock_read(&self.shared)
            .inputs
            .name_of(number)
            .map(str::to_string)
    }

    /// Currently active input number. Fallback: `None`.
    #[must_use]
    pub fn input_number(&self) -> Option<i64> {
        lock_read(&self.shared).table.input_number()
    }

    /// Select an input by number (1-99).
    ///
    /// # Errors
    /// Returns `Error::ValueOutOfRange` outside 1..=99; nothing is sent.
    pub fn set_input_number(&self, number: u8) -> Result<()> {
        self.send(Command::set_input_number(InputNumber::new(number)?));
        Ok(())
    }

    /// Select an input by name, resolved through the input directory.
    ///
    /// # Errors
    /// Returns `Error::UnknownInputName` when the name has not been
    /// learned; nothing is sent.
    pub fn set_input_by_name(&self, name: &str) -> Result<()> {
        let number = lock_read(&self.shared)
            .inputs
            .number_of(name)
            .ok_or_else(|| Error::UnknownInputName(name.to_string()))?;
        self.send(Command::set_input_number(number));
        Ok(())
    }
}
