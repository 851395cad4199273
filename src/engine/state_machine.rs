use std::time::Duration;
use crate::config::PollerConfig;
use crate::price_infra::outcome::PollOutcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollState {
    Nominal,
    RateLimited,
    BackingOff,
    ShuttingDown,
}

/// Retry pacing after failures.
///
/// Rate limiting and server trouble get different treatment: a 429 buys a
/// fixed cooldown, while server, transport and payload failures share one
/// exponential schedule `min(base * 2^(k-1), cap)` for the k-th consecutive
/// failure. Any success resets the schedule.
#[derive(Clone, Debug)]
pub struct BackoffStateMachine {
    state: PollState,
    consecutive_failures: u32,
    current_delay: Duration,
    base_delay: Duration,
    max_delay: Duration,
    poll_interval: Duration,
    rate_limit_cooldown: Duration,
    diagnostic_every: u32,
}

impl BackoffStateMachine {
    pub fn new(config: &PollerConfig) -> Self {
        BackoffStateMachine {
            state: PollState::Nominal,
            consecutive_failures: 0,
            current_delay: config.backoff_base().min(config.backoff_cap()),
            base_delay: config.backoff_base(),
            max_delay: config.backoff_cap(),
            poll_interval: config.poll_interval(),
            rate_limit_cooldown: config.rate_limit_cooldown(),
            diagnostic_every: config.diagnostic_every.max(1),
        }
    }

    /// Applies one tick's outcome and returns how long to sleep before the
    /// next tick.
    pub fn on_outcome(&mut self, outcome: &PollOutcome) -> Duration {
        if self.state == PollState::ShuttingDown {
            return Duration::ZERO;
        }

        match outcome {
            PollOutcome::Success(_) => {
                if self.state == PollState::BackingOff {
                    tracing::info!(
                        consecutive_failures = self.consecutive_failures,
                        "Upstream recovered, resuming nominal polling"
                    );
                }
                self.state = PollState::Nominal;
                self.consecutive_failures = 0;
                self.current_delay = self.base_delay.min(self.max_delay);
                self.poll_interval
            }
            PollOutcome::RateLimited => {
                self.state = PollState::RateLimited;
                tracing::warn!(
                    cooldown_secs = self.rate_limit_cooldown.as_secs(),
                    "Too many requests, cooling down"
                );
                self.rate_limit_cooldown
            }
            PollOutcome::ServerError { status } => {
                let delay = self.record_failure();
                if self.consecutive_failures % self.diagnostic_every == 0 {
                    tracing::warn!(
                        status,
                        consecutive_failures = self.consecutive_failures,
                        delay_secs = delay.as_secs(),
                        "Server error, trying to reconnect"
                    );
                }
                delay
            }
            PollOutcome::TransportError(reason) => {
                let delay = self.record_failure();
                tracing::debug!(
                    consecutive_failures = self.consecutive_failures,
                    delay_secs = delay.as_secs(),
                    "transport error: {}", reason
                );
                delay
            }
            PollOutcome::MalformedPayload(fault) => {
                let delay = self.record_failure();
                tracing::debug!(
                    consecutive_failures = self.consecutive_failures,
                    delay_secs = delay.as_secs(),
                    "malformed payload: {}", fault
                );
                delay
            }
        }
    }

    /// Counts a backoff-class failure and returns the delay to sleep now.
    /// The stored delay is doubled (capped) for the next failure.
    fn record_failure(&mut self) -> Duration {
        self.state = PollState::BackingOff;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        let delay = self.current_delay;
        self.current_delay = delay.saturating_mul(2).min(self.max_delay);
        delay
    }

    /// Terminal. Every later outcome is ignored.
    pub fn shutdown(&mut self) {
        self.state = PollState::ShuttingDown;
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Delay that the next backoff-class failure will sleep.
    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }
}
