//! TCP client and per-connection reactor.
//!
//! # Architecture
//!
//! ```text
//! caller --> Isp handle --(command queue)--> reactor task --> TCP
//!   ^                                            |
//!   +----------(event channel)-------------------+
//! ```
//!
//! The reactor is the single owner of the protocol state: attribute state
//! table, input directory and refresh cycle. It multiplexes four concerns
//! on one task:
//!
//! - inbound lines from the framed stream, parsed in wire order: the
//!   change notification for message N is queued before message N+1 is
//!   decoded, because the codec surfaces one line per poll
//! - commands queued by the handle
//! - the power-on refresh timer
//! - outbound pacing: consecutive sends are separated by the protocol's
//!   mandatory gap, implemented as an async timer so inbound processing
//!   never stalls behind it
//!
//! The refresh timer lives inside the reactor, so tearing the session
//! down (socket closed, or every handle dropped) cancels it with the
//! task; no recurring work can leak against a dead connection.
//!
//! # Timeout and reconnection
//!
//! Only the initial connect is bounded by a timeout. Once up, the client
//! never times out a quiet link: the device is simply silent when
//! nothing changes. Reconnection belongs to the caller.

use futures::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_util::codec::Framed;
use tracing::{debug, info, trace, warn};

use stormlink_core::constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT, POWER_ON_REFRESH_DELAY, REFRESH_PERIOD, SEND_GAP_MS,
};
use stormlink_protocol::{
    AttributeKey, Command, InputDirectory, IspCodec, RefreshAction, RefreshCycle, StateTable,
};

use crate::handle::Isp;

/// Configuration for the ISP client.
///
/// The timing knobs default to the protocol constants; integration tests
/// compress them to run in milliseconds.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Device address.
    pub addr: SocketAddr,

    /// Timeout for the initial TCP connect.
    pub connect_timeout: Duration,

    /// Minimum gap between consecutive outbound commands.
    pub send_gap: Duration,

    /// Delay between a power-on edge and the first refresh attempt.
    pub refresh_delay: Duration,

    /// Period of the power-on refresh retry loop.
    pub refresh_period: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            send_gap: Duration::from_millis(SEND_GAP_MS),
            refresh_delay: POWER_ON_REFRESH_DELAY,
            refresh_period: REFRESH_PERIOD,
        }
    }
}

/// Errors from establishing a connection.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection attempt timed out.
    #[error("Connection timeout after {0}ms")]
    ConnectionTimeout(u64),

    /// Low-level I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Events delivered to the caller on the event channel.
///
/// Change notifications carry the raw changed message, not a structured
/// diff; callers re-read the typed facade for specifics. Delivery happens
/// on the receiver's task, never inline from the parser, so an observer
/// can call back into the [`Isp`] handle freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IspEvent {
    /// An attribute's stored value changed; payload is the raw message.
    Updated(String),
    /// The connection was lost or closed. Emitted once; the reactor
    /// terminates after sending it.
    Disconnected,
}

/// Protocol state shared between the reactor (writer) and handles
/// (readers).
#[derive(Debug, Default)]
pub(crate) struct Shared {
    pub(crate) table: StateTable,
    pub(crate) inputs: InputDirectory,
}

/// Connect to a device and spawn its reactor.
///
/// Returns the typed handle and the event stream. Dropping every handle
/// tears the session down; the reactor also terminates (after emitting
/// [`IspEvent::Disconnected`]) when the device closes the link.
///
/// # Errors
/// Returns `ClientError` if the TCP connect fails or times out.
pub async fn connect(
    config: ClientConfig,
) -> Result<(Isp, mpsc::UnboundedReceiver<IspEvent>), ClientError> {
    info!("connecting to ISP at {}", config.addr);

    let stream = match tokio::time::timeout(config.connect_timeout, TcpStream::connect(config.addr))
        .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            warn!(
                "connection timeout after {}ms",
                config.connect_timeout.as_millis()
            );
            return Err(ClientError::ConnectionTimeout(
                config.connect_timeout.as_millis() as u64,
            ));
        }
    };

    // The send gap already paces writes; Nagle would only add latency on
    // top of it.
    if let Err(e) = stream.set_nodelay(true) {
        warn!("failed to set TCP_NODELAY: {e}");
    }

    let shared = Arc::new(RwLock::new(Shared::default()));
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let reactor = Reactor {
        framed: Framed::new(stream, IspCodec::new()),
        shared: Arc::clone(&shared),
        refresh: RefreshCycle::new(),
        cmd_rx,
        event_tx,
        outbound: VecDeque::new(),
        send_gap: config.send_gap,
        refresh_delay: config.refresh_delay,
        refresh_period: config.refresh_period,
        next_send: Instant::now(),
        next_refresh: None,
    };
    tokio::spawn(reactor.run());

    let handle = Isp::new(shared, cmd_tx);

    // Bootstrap with the power-safe core subset; the full table fills in
    // once a power-on edge is seen.
    handle.refresh_core();

    info!("connected to ISP at {}", config.addr);
    Ok((handle, event_rx))
}

/// Single-task owner of one connection's protocol state.
struct Reactor {
    framed: Framed<TcpStream, IspCodec>,
    shared: Arc<RwLock<Shared>>,
    refresh: RefreshCycle,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::UnboundedSender<IspEvent>,

    /// Commands accepted but not yet written, oldest first.
    outbound: VecDeque<Command>,
    send_gap: Duration,
    refresh_delay: Duration,
    refresh_period: Duration,

    /// Earliest instant the next outbound command may be written.
    next_send: Instant,
    /// Next refresh tick, while the cycle is retrying.
    next_refresh: Option<Instant>,
}

impl Reactor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                inbound = self.framed.next() => match inbound {
                    Some(Ok(line)) => self.handle_line(&line),
                    Some(Err(e)) => {
                        // the codec absorbs framing errors internally; what
                        // reaches here is an I/O error, fatal to the stream
                        warn!("inbound stream error: {e}");
                        let _ = self.event_tx.send(IspEvent::Disconnected);
                        return;
                    }
                    None => {
                        warn!("connection closed by device");
                        let _ = self.event_tx.send(IspEvent::Disconnected);
                        return;
                    }
                },

                command = self.cmd_rx.recv() => match command {
                    Some(command) => self.outbound.push_back(command),
                    None => {
                        debug!("all handles dropped, tearing down session");
                        return;
                    }
                },

                _ = sleep_until(self.next_refresh.unwrap_or_else(Instant::now)),
                    if self.next_refresh.is_some() =>
                {
                    self.on_refresh_tick();
                }

                _ = sleep_until(self.next_send), if !self.outbound.is_empty() => {
                    if !self.flush_one().await {
                        let _ = self.event_tx.send(IspEvent::Disconnected);
                        return;
                    }
                }
            }
        }
    }

    /// Parse one framed message and act on the outcome.
    fn handle_line(&mut self, line: &str) {
        trace!("< {line}");

        let outcome = {
            let mut shared = lock_write(&self.shared);
            let outcome = shared.table.parse(line);

            if outcome.key == Some(AttributeKey::InputList)
                && let Some(value) = outcome.value.as_deref()
                && let Some((number, name)) = InputDirectory::parse_entry(value)
            {
                shared.inputs.record(number, &name);
                // input names are the laggiest attribute; seeing one
                // proves the device is answering again
                self.refresh.mark_successful();
            }

            outcome
        };

        if outcome.power_on_edge {
            self.refresh.power_on_detected();
            self.next_refresh = Some(Instant::now() + self.refresh_delay);
        }

        if outcome.changed {
            let _ = self.event_tx.send(IspEvent::Updated(line.to_string()));
        }
    }

    /// Advance the refresh cycle by one period.
    fn on_refresh_tick(&mut self) {
        match self.refresh.tick() {
            RefreshAction::RefreshAll => {
                debug!("power-on refresh: querying all attributes");
                for key in AttributeKey::ALL {
                    self.outbound.push_back(Command::Query(key));
                }
                self.next_refresh = Some(Instant::now() + self.refresh_period);
            }
            RefreshAction::Stop => {
                debug!("power-on refresh complete");
                self.next_refresh = None;
            }
        }
    }

    /// Write the oldest queued command and re-arm the send gap.
    ///
    /// Returns false when the link is gone.
    async fn flush_one(&mut self) -> bool {
        let Some(command) = self.outbound.pop_front() else {
            return true;
        };

        trace!("> {command}");
        if let Err(e) = self.framed.send(command).await {
            warn!("failed to send command: {e}");
            return false;
        }

        self.next_send = Instant::now() + self.send_gap;
        true
    }
}

/// Write-lock the shared state, recovering from a poisoned lock.
pub(crate) fn lock_write(shared: &RwLock<Shared>) -> std::sync::RwLockWriteGuard<'_, Shared> {
    shared.write().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Read-lock the shared state, recovering from a poisoned lock.
pub(crate) fn lock_read(shared: &RwLock<Shared>) -> std::sync::RwLockReadGuard<'_, Shared> {
    shared.read().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.addr.port(), DEFAULT_PORT);
        assert_eq!(config.send_gap, Duration::from_millis(SEND_GAP_MS));
        assert_eq!(config.refresh_period, REFRESH_PERIOD);
    }

    #[tokio::test]
    async fn test_connect_timeout() {
        // RFC 5737 TEST-NET-1 usually blackholes, giving the timeout path;
        // some hosts refuse the route outright, giving an immediate I/O
        // error instead. Either way the connect must fail promptly.
        let config = ClientConfig {
            addr: "192.0.2.1:14999".parse().unwrap(),
            connect_timeout: Duration::from_millis(100),
            ..ClientConfig::default()
        };

        let result = connect(config).await;
        assert!(matches!(
            result,
            Err(ClientError::ConnectionTimeout(100)) | Err(ClientError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // bind a listener, take its port, then drop it
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig {
            addr,
            ..ClientConfig::default()
        };
        let result = connect(config).await;
        assert!(matches!(result, Err(ClientError::Io(_))));
    }
}
