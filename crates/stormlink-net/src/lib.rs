//! Framed TCP client for the Storm Audio ISP IP-control protocol.
//!
//! One [`client::connect`] call yields an [`Isp`] handle (the typed
//! property facade) plus an event stream carrying change notifications
//! and the disconnect signal. A single reactor task per connection owns
//! all protocol state; the handle reads through a shared view and writes
//! by queueing commands to the reactor.
//!
//! Reconnection is out of scope: when the device drops the link the
//! reactor emits [`IspEvent::Disconnected`] and terminates. Callers that
//! want auto-reconnect wrap `connect` in their own supervision loop.

pub mod client;
pub mod handle;

pub use client::{ClientConfig, ClientError, IspEvent, connect};
pub use handle::Isp;
