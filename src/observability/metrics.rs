use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use crate::error::Result;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Poll metrics
    pub static ref POLLS_TOTAL: IntCounter = IntCounter::new(
        "polls_total",
        "Total number of fetch attempts"
    ).unwrap();

    pub static ref POLL_OUTCOMES: IntCounterVec = IntCounterVec::new(
        Opts::new("poll_outcomes_total", "Fetch outcomes by class"),
        &["outcome"]
    ).unwrap();

    // Window metrics
    pub static ref OBSERVATIONS_ACCEPTED: IntCounter = IntCounter::new(
        "observations_accepted_total",
        "Distinct observations added to the rolling window"
    ).unwrap();

    pub static ref DUPLICATES_DROPPED: IntCounter = IntCounter::new(
        "duplicates_dropped_total",
        "Observations dropped as duplicates"
    ).unwrap();

    pub static ref RENDERS: IntCounter = IntCounter::new(
        "renders_total",
        "Window redraws"
    ).unwrap();

    pub static ref WINDOW_LENGTH: IntGauge = IntGauge::new(
        "window_length",
        "Entries currently held in the rolling window"
    ).unwrap();

    // Backoff metrics
    pub static ref BACKOFF_DELAY_SECONDS: IntGauge = IntGauge::new(
        "backoff_delay_seconds",
        "Backoff sleep after the latest failure, zero outside backoff"
    ).unwrap();

    // Latency metrics
    pub static ref FETCH_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "fetch_latency_seconds",
            "Upstream fetch latency"
        ).buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])
    ).unwrap();
}

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(POLLS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(POLL_OUTCOMES.clone()))?;
    REGISTRY.register(Box::new(OBSERVATIONS_ACCEPTED.clone()))?;
    REGISTRY.register(Box::new(DUPLICATES_DROPPED.clone()))?;
    REGISTRY.register(Box::new(RENDERS.clone()))?;
    REGISTRY.register(Box::new(WINDOW_LENGTH.clone()))?;
    REGISTRY.register(Box::new(BACKOFF_DELAY_SECONDS.clone()))?;
    REGISTRY.register(Box::new(FETCH_LATENCY.clone()))?;
    Ok(())
}

/// Registry contents in the Prometheus text exposition format.
pub fn gather_text() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
