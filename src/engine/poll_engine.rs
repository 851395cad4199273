use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use crate::config::PollerConfig;
use crate::engine::rolling_window::RollingWindow;
use crate::engine::state_machine::BackoffStateMachine;
use crate::error::{Error, Result};
use crate::interfaces::renderer::Renderer;
use crate::observability::metrics::{
    BACKOFF_DELAY_SECONDS, DUPLICATES_DROPPED, FETCH_LATENCY, OBSERVATIONS_ACCEPTED,
    POLL_OUTCOMES, POLLS_TOTAL, RENDERS, WINDOW_LENGTH,
};
use crate::observability::tracing::trace_poll_tick;
use crate::price_infra::connectors::PriceFetcher;
use crate::price_infra::outcome::PollOutcome;

/// Single-instance fetch-then-sleep loop.
///
/// Owns the backoff state and the rolling window outright; nothing else
/// reads or writes them while `run` is active. Cancellation is observed at
/// every suspension point: between ticks, while a request is in flight and
/// while sleeping.
pub struct PollEngine<F: PriceFetcher, R: Renderer> {
    fetcher: F,
    renderer: R,
    backoff: BackoffStateMachine,
    window: RollingWindow,
    shutdown_grace: Duration,
    ticks: u64,
}

impl<F: PriceFetcher, R: Renderer> PollEngine<F, R> {
    pub fn new(config: &PollerConfig, fetcher: F, renderer: R) -> Self {
        PollEngine {
            fetcher,
            renderer,
            backoff: BackoffStateMachine::new(config),
            window: RollingWindow::new(config.window_size),
            shutdown_grace: config.shutdown_grace(),
            ticks: 0,
        }
    }

    /// Polls until `cancel` fires (`Ok`) or the upstream returns a body that
    /// cannot be parsed at all (`Error::UpstreamShapeChanged`). Every other
    /// failure is absorbed by the backoff schedule.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<()> {
        tracing::info!(source = self.fetcher.source_id(), "Poll engine started");

        loop {
            if cancel.is_cancelled() {
                self.stop();
                return Ok(());
            }

            self.ticks += 1;
            let Some(outcome) = self.fetch(cancel).await else {
                self.stop();
                return Ok(());
            };

            if let Some(fault) = outcome.fatal_fault() {
                tracing::error!(tick = self.ticks, "Upstream response unusable, stopping: {}", fault);
                self.backoff.shutdown();
                return Err(Error::UpstreamShapeChanged(fault.to_string()));
            }

            let delay = self.apply(outcome);
            if !sleep_unless_cancelled(delay, cancel).await {
                self.stop();
                return Ok(());
            }
        }
    }

    /// Issues one request. `None` means cancellation arrived first; the
    /// request is then given up to the grace period to finish before being
    /// dropped.
    async fn fetch(&self, cancel: &CancellationToken) -> Option<PollOutcome> {
        POLLS_TOTAL.inc();
        let started = Instant::now();
        let fetch = self.fetcher
            .fetch()
            .instrument(trace_poll_tick(self.ticks, self.fetcher.source_id()));
        tokio::pin!(fetch);

        tokio::select! {
            biased;
            outcome = &mut fetch => {
                FETCH_LATENCY.observe(started.elapsed().as_secs_f64());
                Some(outcome)
            }
            _ = cancel.cancelled() => {
                match tokio::time::timeout(self.shutdown_grace, &mut fetch).await {
                    Ok(_) => tracing::debug!("In-flight request finished during shutdown"),
                    Err(_) => tracing::warn!(
                        grace_secs = self.shutdown_grace.as_secs(),
                        "In-flight request abandoned at shutdown"
                    ),
                }
                None
            }
        }
    }

    /// Feeds one outcome through the backoff machine and the window, redraws
    /// on a new observation, and returns this tick's sleep.
    fn apply(&mut self, outcome: PollOutcome) -> Duration {
        POLL_OUTCOMES.with_label_values(&[outcome.kind().as_str()]).inc();

        let delay = self.backoff.on_outcome(&outcome);
        let backoff = if outcome.is_backoff_class() { delay } else { Duration::ZERO };
        BACKOFF_DELAY_SECONDS.set(backoff.as_secs() as i64);

        if let PollOutcome::Success(observation) = outcome {
            if self.window.offer(observation) {
                OBSERVATIONS_ACCEPTED.inc();
                WINDOW_LENGTH.set(self.window.len() as i64);
                self.render();
            } else {
                DUPLICATES_DROPPED.inc();
                tracing::trace!(timestamp = observation.timestamp.epoch_secs(), "duplicate observation");
            }
        }

        delay
    }

    fn render(&mut self) {
        let rows = self.window.rows();
        match self.renderer.render(&rows) {
            Ok(()) => RENDERS.inc(),
            Err(e) => tracing::warn!("Render failed: {}", e),
        }
    }

    fn stop(&mut self) {
        self.backoff.shutdown();
        tracing::debug!(ticks = self.ticks, "Poll engine stopped");
    }

    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    pub fn backoff(&self) -> &BackoffStateMachine {
        &self.backoff
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// `false` if cancelled before `delay` elapsed.
async fn sleep_unless_cancelled(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
