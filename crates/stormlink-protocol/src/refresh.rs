//! Power-on refresh cycle state machine.
//!
//! Immediately after a power-on event the device is inconsistent about
//! which attributes can be queried. When a power-on edge is observed, the
//! client repeatedly issues a full attribute refresh on a fixed period
//! until values have been returned for at least one input name (the
//! laggiest of all the attributes), at which point the cycle goes back to
//! idle.
//!
//! # States
//!
//! - `Idle`: no refresh activity.
//! - `Retrying`: a full refresh is re-issued on every tick until the
//!   success flag is set.
//!
//! # Liveness, not boundedness
//!
//! The loop is deliberately unbounded in attempt count. Against a
//! permanently unresponsive device it retries forever; no error is ever
//! surfaced while retrying, because the device is simply non-functional
//! until it returns data. This is a best-effort liveness loop, not a
//! bounded retry-with-backoff, and the tests pin that property down.
//!
//! # Decoupled from the timer
//!
//! The machine is advanced by explicit [`tick`](RefreshCycle::tick) calls;
//! the owning reactor supplies the period. That keeps the transition logic
//! synchronous and independently testable without real delays.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Refresh cycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    /// No refresh activity scheduled.
    Idle,
    /// Re-issuing full refreshes until the device proves responsive.
    Retrying,
}

/// What the owner should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAction {
    /// Re-issue a query for every schema key and schedule another tick.
    RefreshAll,
    /// The device has proven responsive; cancel the recurring timer.
    Stop,
}

/// Idle/Retrying state machine gated by the refresh-successful flag.
#[derive(Debug, Clone)]
pub struct RefreshCycle {
    state: RefreshState,
    successful: bool,
}

impl RefreshCycle {
    /// Create an idle cycle with the success flag unset.
    pub fn new() -> Self {
        RefreshCycle {
            state: RefreshState::Idle,
            successful: false,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Whether the laggy attribute has been observed populated since the
    /// last power-on edge.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.successful
    }

    /// A power-on edge was observed: reset the success flag and arm the
    /// retry loop. Idempotent while already retrying.
    pub fn power_on_detected(&mut self) {
        info!("power on edge, arming refresh cycle");
        self.successful = false;
        self.state = RefreshState::Retrying;
    }

    /// Input-name data was observed populated: the next tick stops the
    /// cycle.
    pub fn mark_successful(&mut self) {
        if !self.successful {
            debug!("refresh marked successful");
        }
        self.successful = true;
    }

    /// Advance the machine by one period.
    ///
    /// While the success flag is unset this always asks for another full
    /// refresh: the loop is unbounded by design. Once the flag is set the
    /// cycle transitions back to idle and asks the owner to cancel the
    /// timer. Ticking an idle cycle is a no-op that reports `Stop`.
    pub fn tick(&mut self) -> RefreshAction {
        match self.state {
            RefreshState::Idle => RefreshAction::Stop,
            RefreshState::Retrying => {
                if self.successful {
                    info!("refresh cycle complete");
                    self.state = RefreshState::Idle;
                    RefreshAction::Stop
                } else {
                    debug!("refresh cycle retrying");
                    RefreshAction::RefreshAll
                }
            }
        }
    }
}

impl Default for RefreshCycle {
    fn default() -> Self {
        Self::new()
    }
}
