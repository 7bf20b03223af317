//! Terminal host for the carousel engine.
//!
//! Reads navigation commands on stdin, prints one JSON snapshot per line on
//! stdout. Logs go to stderr so they never interleave with snapshots.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use slide_carousel::config::Configuration;
use slide_carousel::events::{Snapshot, Stimulus};
use slide_carousel::tasks;
use slide_carousel::Engine;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "slide-carousel",
    version,
    about = "Drive a slideshow carousel from stdin commands"
)]
struct Args {
    /// Path to YAML show file (carousel settings + slides)
    #[arg(short, long, value_name = "FILE", default_value = "carousel.yaml")]
    config: PathBuf,

    /// Override the autoplay interval (ms)
    #[arg(long, value_name = "MILLIS")]
    interval_ms: Option<u64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(
        format!("slide_carousel={level}")
            .parse()
            .context("invalid log directive")?,
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    let result = runtime.block_on(run(args));
    // A stdin read parked on a blocking thread would otherwise hold shutdown.
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}

async fn run(args: Args) -> Result<()> {
    let mut cfg = Configuration::from_yaml_file(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;
    if let Some(ms) = args.interval_ms {
        cfg.carousel.interval_ms = ms;
    }
    let cfg = cfg.validated().context("invalid configuration values")?;
    tracing::info!(
        slides = cfg.slides.len(),
        "loaded show from {}",
        args.config.display()
    );

    let engine = Engine::new(cfg.slides, cfg.carousel, tasks::carousel::now())
        .context("failed to create carousel engine")?;

    let (stimulus_tx, stimulus_rx) = mpsc::channel::<Stimulus>(32); // Input -> Carousel
    let (snapshot_tx, mut snapshot_rx) = mpsc::channel::<Snapshot>(32); // Carousel -> Printer

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let mut tasks = JoinSet::new();

    // Carousel
    tasks.spawn({
        let cancel = cancel.clone();
        async move {
            tasks::carousel::run(engine, stimulus_rx, snapshot_tx, cancel)
                .await
                .context("carousel task failed")
        }
    });

    // Host input; EOF on stdin shuts everything down.
    tasks.spawn({
        let cancel = cancel.clone();
        async move {
            let stdin = BufReader::new(tokio::io::stdin());
            let result = tasks::input::run(stdin, stimulus_tx, cancel.clone())
                .await
                .context("input task failed");
            tracing::info!("stdin closed; initiating shutdown");
            cancel.cancel();
            result
        }
    });

    // Printer
    tasks.spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(snapshot) = snapshot_rx.recv().await {
            let mut line = serde_json::to_string(&snapshot).context("failed to encode snapshot")?;
            line.push('\n');
            stdout
                .write_all(line.as_bytes())
                .await
                .context("failed to write snapshot")?;
            stdout.flush().await.context("failed to flush stdout")?;
        }
        Ok(())
    });

    let mut first_err = None;
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.context("task panicked")?;
        if let Err(err) = outcome {
            tracing::error!("{err:?}");
            cancel.cancel();
            first_err.get_or_insert(err);
        }
    }
    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
