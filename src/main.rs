use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use price_poller::config::PollerConfig;
use price_poller::config::loader::ConfigOverrides;
use price_poller::engine::PollEngine;
use price_poller::error::Error;
use price_poller::observability::metrics::{gather_text, register_metrics};
use price_poller::observability::tracing::init_tracing;
use price_poller::price_infra::CoinGeckoFetcher;
use price_poller::render::TerminalRenderer;
use price_poller::utils::shutdown::spawn_signal_listener;
use price_poller::{EXIT_CONFIG, EXIT_DATAERR};

/// Polls a price endpoint and keeps the latest distinct readings on screen.
#[derive(Parser, Debug)]
#[command(name = "price-poller", version, about)]
struct Cli {
    /// Config file (TOML, YAML or JSON); PRICE_POLLER_* env vars override it
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Price endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Poll interval in seconds
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Number of distinct readings to keep on screen
    #[arg(long)]
    window_size: Option<usize>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Append each frame instead of redrawing in place (implied when stdout is not a terminal)
    #[arg(long)]
    no_redraw: bool,

    /// Dump Prometheus metrics to stderr on exit
    #[arg(long)]
    print_metrics: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = ConfigOverrides {
        endpoint: cli.endpoint,
        poll_interval_secs: cli.interval,
        window_size: cli.window_size,
    };
    let config = PollerConfig::load(cli.config.as_deref(), &overrides)
        .context("loading configuration")?;

    register_metrics().context("registering metrics")?;

    let fetcher = CoinGeckoFetcher::new(&config).context("building HTTP client")?;
    let redraw = !cli.no_redraw && io::stdout().is_terminal();
    let renderer = TerminalRenderer::stdout(&config.asset_label, &config.quote_label, redraw);

    let cancel = CancellationToken::new();
    let signals = spawn_signal_listener(cancel.clone());

    tracing::info!(
        endpoint = %config.endpoint,
        interval_secs = config.poll_interval_secs,
        window_size = config.window_size,
        "Starting price poller"
    );

    let mut engine = PollEngine::new(&config, fetcher, renderer);
    let result = engine.run(&cancel).await;
    signals.abort();

    if cli.print_metrics {
        eprint!("{}", gather_text()?);
    }

    result?;
    Ok(())
}

fn exit_code_for(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<Error>() {
        Some(Error::UpstreamShapeChanged(_)) => EXIT_DATAERR,
        Some(Error::ConfigError(_)) | Some(Error::InvalidEndpoint(_)) => EXIT_CONFIG,
        _ => 1,
    }
}
