//! replica - one-way periodic directory synchronization.
//!
//! Usage:
//!   replica SOURCE REPLICA              Mirror SOURCE onto REPLICA every 30s
//!   replica SOURCE REPLICA -i 10s       Custom interval
//!   replica SOURCE REPLICA -l sync.log  Also append the event log to a file
//!   replica SOURCE REPLICA --once       Run a single cycle and exit
//!   replica --help                      Show help

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use tokio_util::sync::CancellationToken;

use replica_core::{EventSink, SyncConfig, SyncEvent};
use replica_sync::SyncEngine;

#[derive(Parser)]
#[command(
    name = "replica",
    version,
    about = "One-way periodic directory synchronization",
    long_about = "replica keeps a replica directory converged onto a source \
                  directory: new and changed files are copied over, extraneous \
                  files and directories are removed, and the whole tree is \
                  re-checked on a fixed interval."
)]
struct Cli {
    /// Source directory to mirror from
    source: PathBuf,

    /// Replica directory to mirror onto
    replica: PathBuf,

    /// Interval between cycles (e.g., "500ms", "10s", "5m", "1h")
    #[arg(short, long, default_value = "30s")]
    interval: String,

    /// Append the event log to this file as well as stdout
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    /// Run a single synchronization cycle and exit
    #[arg(long)]
    once: bool,
}

/// Timestamped event log writing to stdout and, optionally, a file.
struct EventLog {
    file: Option<Mutex<std::fs::File>>,
}

impl EventLog {
    fn new(log_file: Option<&PathBuf>) -> Result<Self> {
        let file = match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Cannot open log file {}", path.display()))?;
                Some(Mutex::new(file))
            }
            None => None,
        };
        Ok(Self { file })
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: &SyncEvent) {
        let line = format!(
            "[{}] {event}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        println!("{line}");

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                if let Err(err) = writeln!(file, "{line}") {
                    tracing::warn!(error = %err, "failed to append to log file");
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let interval = parse_interval(&cli.interval)?;

    let config = SyncConfig::builder()
        .source(cli.source)
        .replica(cli.replica)
        .interval(interval)
        .build()?;

    let sink = Arc::new(EventLog::new(cli.log_file.as_ref())?);
    let engine = SyncEngine::new(config, sink);

    if cli.once {
        engine.run_cycle().context("Synchronization cycle failed")?;
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    engine.run(cancel).await;

    Ok(())
}

/// Parse a human interval string (e.g., "500ms", "10s", "5m", "1h").
fn parse_interval(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();

    let (num, millis) = if s.ends_with("ms") {
        let num: f64 = s.trim_end_matches("ms").parse()?;
        (num, 1.0)
    } else if s.ends_with('h') {
        let num: f64 = s.trim_end_matches('h').parse()?;
        (num, 60.0 * 60.0 * 1000.0)
    } else if s.ends_with('m') {
        let num: f64 = s.trim_end_matches('m').parse()?;
        (num, 60.0 * 1000.0)
    } else if s.ends_with('s') {
        let num: f64 = s.trim_end_matches('s').parse()?;
        (num, 1000.0)
    } else {
        let num: f64 = s.parse()?;
        (num, 1000.0) // Bare number = seconds
    };

    let duration = Duration::from_secs_f64(num * millis / 1000.0);
    if duration.is_zero() {
        return Err(eyre!("Interval must be greater than zero"));
    }
    Ok(duration)
}
