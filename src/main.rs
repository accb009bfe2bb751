//! Terminal host for the slide autoplay timer.
//!
//! Reads host events from stdin (one word per line: enter, leave, focus,
//! blur, play, pause, move) and logs advances and pause/resume transitions.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use slide_autoplay::bindings::AutoplayBindings;
use slide_autoplay::config::Configuration;
use slide_autoplay::tasks::autoplay;
use slide_autoplay::{AutoplayCommand, AutoplayEvent, HostEvent};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, trace, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(
    name = "slide-autoplay",
    version,
    about = "Pausable carousel autoplay driven from the terminal"
)]
struct Args {
    /// Path to YAML config (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the autoplay interval (ms)
    #[arg(long, value_name = "MILLIS")]
    interval_ms: Option<u64>,

    /// Override the number of slides in the carousel
    #[arg(long, value_name = "COUNT")]
    slides: Option<usize>,

    /// Override how many slides are visible at once
    #[arg(long, value_name = "COUNT")]
    per_page: Option<usize>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(
            format!("slide_autoplay={level}")
                .parse()
                .context("invalid log directive")?,
        );
    fmt().with_env_filter(filter).with_target(false).compact().init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let mut cfg = match &args.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(ms) = args.interval_ms {
        cfg.autoplay.interval = Duration::from_millis(ms);
    }
    if let Some(slides) = args.slides {
        cfg.carousel.slides = slides;
    }
    if let Some(per_page) = args.per_page {
        cfg.carousel.per_page = per_page;
    }
    let cfg = cfg.validated().context("invalid configuration values")?;
    tracing::debug!("effective configuration:\n{:#?}", cfg);

    if !AutoplayBindings::should_mount(&cfg.carousel) {
        info!(
            slides = cfg.carousel.slides,
            per_page = cfg.carousel.per_page,
            "every slide fits on one page; autoplay not mounted"
        );
        return Ok(());
    }

    // Channels (small/bounded)
    let (command_tx, command_rx) = mpsc::channel::<AutoplayCommand>(16); // Host -> Autoplay
    let (event_tx, mut event_rx) = mpsc::channel::<AutoplayEvent>(64); // Autoplay -> Host
    let (host_tx, mut host_rx) = mpsc::channel::<HostEvent>(16); // stdin -> Host

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    // Detached thread: a blocking stdin read must not hold up runtime shutdown.
    {
        let cancel = cancel.clone();
        std::thread::spawn(move || {
            read_host_events(host_tx);
            info!("stdin closed; initiating shutdown");
            cancel.cancel();
        });
    }

    let mut tasks = JoinSet::new();
    tasks.spawn({
        let settings = cfg.autoplay.clone();
        let cancel = cancel.clone();
        async move {
            autoplay::run(settings, command_rx, event_tx, cancel)
                .await
                .context("autoplay task failed")
        }
    });

    let bindings = AutoplayBindings::from_settings(&cfg.autoplay);
    let mut deck = Deck::new(cfg.carousel.slides);
    info!(
        slides = cfg.carousel.slides,
        per_page = cfg.carousel.per_page,
        "carousel mounted"
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            maybe_host = host_rx.recv() => {
                let Some(event) = maybe_host else {
                    break;
                };
                if event == HostEvent::SlideMoved {
                    let slide = deck.next();
                    info!(slide, of = deck.len(), "slide moved by host");
                }
                if !send_commands(&command_tx, bindings.map(event)).await {
                    warn!("autoplay command channel closed; shutting down");
                    cancel.cancel();
                }
            }

            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(AutoplayEvent::Advance) => {
                        let slide = deck.next();
                        info!(slide, of = deck.len(), "autoplay advanced");
                    }
                    Some(AutoplayEvent::Progress(fraction)) => {
                        trace!(bar = %progress_bar(fraction, 20), "autoplay progress");
                    }
                    Some(AutoplayEvent::Paused) => info!(button = "play", "autoplay paused"),
                    Some(AutoplayEvent::Resumed) => info!(button = "pause", "autoplay resumed"),
                    None => break,
                }
            }
        }
    }

    let _ = command_tx.send(AutoplayCommand::Destroy).await;
    cancel.cancel();

    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task error: {e:?}"),
            Err(e) => tracing::error!("join error: {e}"),
        }
    }

    Ok(())
}

/// Returns `false` once the autoplay task stopped listening.
async fn send_commands(
    command_tx: &mpsc::Sender<AutoplayCommand>,
    commands: Vec<AutoplayCommand>,
) -> bool {
    for command in commands {
        if command_tx.send(command).await.is_err() {
            return false;
        }
    }
    true
}

fn read_host_events(host_tx: mpsc::Sender<HostEvent>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("stdin read failed: {err}");
                return;
            }
        };
        let word = line.trim();
        if word.is_empty() {
            continue;
        }
        if matches!(word, "quit" | "exit") {
            return;
        }
        match word.parse::<HostEvent>() {
            Ok(event) => {
                if host_tx.blocking_send(event).is_err() {
                    return;
                }
            }
            Err(err) => warn!("{err}"),
        }
    }
}

/// 1-based position in a looping slide deck.
struct Deck {
    current: usize,
    len: usize,
}

impl Deck {
    fn new(len: usize) -> Self {
        Self {
            current: 1,
            len: len.max(1),
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn next(&mut self) -> usize {
        self.current = self.current % self.len + 1;
        self.current
    }
}

fn progress_bar(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32) as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
