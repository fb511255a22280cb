//! Locating an order that the payment webhook creates after checkout.
//!
//! The order usually does not exist yet when the customer lands back on the
//! storefront, so "not found" is retried with exponential backoff up to a
//! fixed budget. `OrderPollingMachine` holds the transitions and nothing
//! else: it never sleeps and never performs I/O. Whoever drives it executes
//! the `PollCommand`s it returns and feeds the outcomes back in, tagged with
//! the epoch they were issued under. Results from an older epoch (a session
//! that has since changed, or a torn-down view) are ignored.

use crate::domain::order::{FetchError, Order, SessionId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

const EXHAUSTED_MESSAGE: &str =
    "Order not found after multiple attempts. Please check your email for confirmation.";

/// Delay before the attempt after `attempt` (1-based): `initial * 2^(attempt - 1)`.
pub fn calculate_retry_delay(attempt: u32, initial_delay: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    initial_delay.saturating_mul(1u32 << exponent)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Total fetch attempts, the first one included.
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    /// No session to look for.
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollErrorKind {
    NotFound,
    ApiError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollError {
    #[serde(rename = "type")]
    pub kind: PollErrorKind,
    pub message: String,
}

/// What a consumer observes.
///
/// Once `status` is `Success` exactly `order` is set; once it is `Error`
/// exactly `error` is set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingState {
    pub status: PollStatus,
    pub order: Option<Order>,
    pub error: Option<PollError>,
    /// Retries scheduled so far.
    pub retry_count: u32,
}

impl PollingState {
    fn loading() -> Self {
        Self {
            status: PollStatus::Loading,
            ..Self::default()
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, PollStatus::Success | PollStatus::Error)
    }
}

/// Work the driver must perform next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollCommand {
    /// Fetch the order once and report back with `on_result`.
    Fetch {
        epoch: u64,
        session_id: SessionId,
        attempt: u32,
    },
    /// Wait `delay`, then call `on_timer`.
    Wait { epoch: u64, delay: Duration },
}

#[derive(Debug)]
pub struct OrderPollingMachine {
    config: PollingConfig,
    session_id: Option<SessionId>,
    epoch: u64,
    attempt: u32,
    state: PollingState,
}

impl OrderPollingMachine {
    pub fn new(config: PollingConfig) -> Self {
        Self {
            config: PollingConfig {
                max_attempts: config.max_attempts.max(1),
                ..config
            },
            session_id: None,
            epoch: 0,
            attempt: 0,
            state: PollingState::default(),
        }
    }

    pub fn state(&self) -> &PollingState {
        &self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Points the machine at a (possibly absent) session.
    ///
    /// Setting the session it already tracks is a no-op. Any other change
    /// starts a new epoch, which invalidates outstanding fetches and timers,
    /// and returns the first fetch for the new session.
    pub fn set_session(&mut self, session_id: Option<SessionId>) -> Option<PollCommand> {
        if session_id == self.session_id {
            return None;
        }
        self.epoch += 1;
        self.session_id = session_id;
        self.attempt = 0;

        match self.session_id.clone() {
            Some(session_id) => {
                self.state = PollingState::loading();
                self.attempt = 1;
                debug!(session = %session_id, epoch = self.epoch, "polling started");
                Some(PollCommand::Fetch {
                    epoch: self.epoch,
                    session_id,
                    attempt: 1,
                })
            }
            None => {
                self.state = PollingState::default();
                None
            }
        }
    }

    /// Abandons the current session; pending work becomes stale.
    pub fn teardown(&mut self) {
        self.epoch += 1;
        self.session_id = None;
        self.attempt = 0;
        self.state = PollingState::default();
    }

    /// Applies the outcome of a fetch issued under `epoch`.
    ///
    /// Returns the follow-up command, if any. Stale outcomes change nothing.
    pub fn on_result(&mut self, epoch: u64, result: Result<Order, FetchError>) -> Option<PollCommand> {
        if !self.is_current(epoch) {
            debug!(epoch, current = self.epoch, "discarding stale fetch result");
            return None;
        }

        match result {
            Ok(order) => {
                debug!(attempt = self.attempt, "order found");
                self.state.status = PollStatus::Success;
                self.state.order = Some(order);
                self.state.error = None;
                None
            }
            Err(FetchError::Api) => {
                debug!(attempt = self.attempt, "order lookup failed");
                self.fail(PollErrorKind::ApiError, FetchError::Api.to_string());
                None
            }
            Err(FetchError::NotFound) if self.attempt >= self.config.max_attempts => {
                debug!(attempt = self.attempt, "retry budget exhausted");
                self.fail(PollErrorKind::NotFound, EXHAUSTED_MESSAGE.to_string());
                None
            }
            Err(FetchError::NotFound) => {
                let delay = calculate_retry_delay(self.attempt, self.config.initial_delay);
                self.state.retry_count += 1;
                debug!(attempt = self.attempt, delay_ms = delay.as_millis() as u64, "order not found yet");
                Some(PollCommand::Wait {
                    epoch: self.epoch,
                    delay,
                })
            }
        }
    }

    /// The wait armed under `epoch` has elapsed.
    pub fn on_timer(&mut self, epoch: u64) -> Option<PollCommand> {
        if !self.is_current(epoch) {
            return None;
        }
        let session_id = self.session_id.clone()?;
        self.attempt += 1;
        Some(PollCommand::Fetch {
            epoch,
            session_id,
            attempt: self.attempt,
        })
    }

    fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch && self.state.status == PollStatus::Loading
    }

    fn fail(&mut self, kind: PollErrorKind, message: String) {
        self.state.status = PollStatus::Error;
        self.state.order = None;
        self.state.error = Some(PollError { kind, message });
    }
}

impl Default for OrderPollingMachine {
    fn default() -> Self {
        Self::new(PollingConfig::default())
    }
}
