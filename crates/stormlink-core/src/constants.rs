//! Protocol-level constants for the Storm Audio ISP IP-control protocol.
//!
//! The protocol is line-oriented ASCII over a persistent TCP socket. Every
//! message (status report, query or command) is a single line terminated
//! by a line feed. Status reports carry a dotted attribute key followed by
//! a value:
//!
//! ```text
//! ssp.power.on
//! ssp.vol.[-32.5]
//! ssp.input.list.[3.Apple TV]
//! ```
//!
//! Queries and commands share the identical textual form: the device reports
//! `ssp.vol.[-32.5]` and you query the same attribute by sending `ssp.vol`.
//!
//! # Value forms
//!
//! Set operations use one of two shapes, chosen by the value's class:
//!
//! | Form | When | Example |
//! |------|------|---------|
//! | `key.value` | value is a reserved keyword | `ssp.power.on` |
//! | `key.[value]` | any other payload | `ssp.vol.[-40]` |
//!
//! The reserved keywords are matched case-sensitively; see
//! [`RESERVED_SET_KEYWORDS`].
//!
//! # Timing
//!
//! The device rate-limits its command input. [`SEND_GAP_MS`] is a protocol
//! requirement, not an optimization: commands written back-to-back without
//! the gap are dropped by the device.

use std::time::Duration;

// ============================================================================
// Wire syntax
// ============================================================================

/// Delimiter between key segments and between key and value.
pub const DELIMITER: char = '.';

/// Line terminator for every inbound and outbound message.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Opening bracket of a free-form value payload.
pub const VALUE_OPEN: char = '[';

/// Closing bracket of a free-form value payload.
pub const VALUE_CLOSE: char = ']';

/// Key prefix of zone-scoped messages.
///
/// Zone-scoped reports are recognized but intentionally not decoded; they
/// never mutate the attribute state table.
pub const ZONE_PREFIX: &str = "ssp.zones";

/// Set-operation values that are sent unbracketed (`key.value`).
///
/// Matched case-sensitively. Everything else is bracketed (`key.[value]`).
pub const RESERVED_SET_KEYWORDS: [&str; 5] = ["on", "off", "toggle", "up", "down"];

// ============================================================================
// Framing limits
// ============================================================================

/// Maximum accepted length of a single unterminated line.
///
/// The framer resets its buffer and reports an error when a line grows past
/// this bound instead of accumulating indefinitely against a malformed or
/// endless stream.
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Initial capacity of the framer's carry-over buffer.
pub const INITIAL_BUFFER_CAPACITY: usize = 1024;

// ============================================================================
// Timing
// ============================================================================

/// Default TCP port the processor listens on.
pub const DEFAULT_PORT: u16 = 14999;

/// Minimum gap between consecutive outbound commands, in milliseconds.
///
/// Protocol requirement: the device drops commands arriving faster than
/// this. Must not be removed or shortened.
pub const SEND_GAP_MS: u64 = 10;

/// Delay between observing a power-on edge and the first refresh attempt.
pub const POWER_ON_REFRESH_DELAY: Duration = Duration::from_secs(1);

/// Period of the power-on refresh retry loop.
pub const REFRESH_PERIOD: Duration = Duration::from_secs(2);

/// Default connect timeout for the TCP client.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);

// ============================================================================
// Property ranges
// ============================================================================

/// Lowest valid attenuation in dB (silent).
pub const ATTENUATION_MIN: i32 = -90;

/// Highest valid attenuation in dB (full level).
pub const ATTENUATION_MAX: i32 = 0;

/// Sentinel returned when the volume attribute is missing or unparsable.
///
/// Deliberately below [`ATTENUATION_MIN`] so it can never collide with a
/// real reading.
pub const ATTENUATION_UNKNOWN: i32 = -100;

/// Maximum volume on the derived 0..100 scale.
pub const VOLUME_MAX: i32 = 100;

/// Valid front panel brightness range.
pub const PANEL_BRIGHTNESS_MAX: u8 = 3;

/// Valid listening mode range.
pub const LISTENING_MODE_MAX: u8 = 16;

/// Valid dynamic range setting range.
pub const DYNAMIC_RANGE_MAX: u8 = 2;

/// Smallest valid input number.
pub const MIN_INPUT_NUMBER: u8 = 1;

/// Largest valid input number.
pub const MAX_INPUT_NUMBER: u8 = 99;

/// Width the listening mode value is zero-padded to on the wire.
pub const LISTENING_MODE_WIDTH: usize = 2;
