use tracing::Span;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Logs go to stderr so stdout carries only
/// rendered frames. When both share a terminal, a log line printed between
/// frames is overwritten by the next in-place redraw; `--no-redraw` keeps
/// every line.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

pub fn trace_poll_tick(tick: u64, source_id: &str) -> Span {
    tracing::info_span!(
        "poll_tick",
        tick,
        source = source_id,
    )
}
