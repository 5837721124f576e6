use std::{fs::OpenOptions, path::{Path, PathBuf}, sync::Mutex, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use run_tracker::{
    gpx_util,
    location::{pump, GpxReplay},
    Configuration, TrackerService,
};
use run_tracker_lib::{ResumePolicy, SessionSnapshot};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(version, about = "Track a run: path, distance, time and average speed")]
struct Cli {
    /// Configuration file in `key = value` format
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded GPX track as a live run
    Replay {
        file: PathBuf,

        /// Replay timestamped points this many times faster than recorded
        #[arg(long)]
        speedup: Option<f64>,

        /// What the first point after a pause counts as
        #[arg(long)]
        resume_policy: Option<ResumePolicy>,

        /// Print snapshots as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => Configuration::load(path).with_context(|| format!("Failed to load config {:?}", path))?,
        None => Configuration::default(),
    };

    match cli.command {
        Command::Replay { file, speedup, resume_policy, json } => {
            if let Some(speedup) = speedup {
                config.replay_speedup = speedup;
            }
            if let Some(resume_policy) = resume_policy {
                config.tracker.resume_policy = resume_policy;
            }
            config.validate()?;
            replay(&file, &config, json).await
        }
        Command::ShowConfig => {
            print!("{}", config);
            Ok(())
        }
    }
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("{}=trace,run_tracker_lib=debug", env!("CARGO_CRATE_NAME")).into())
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

async fn replay(file: &Path, config: &Configuration, json: bool) -> anyhow::Result<()> {
    let track = gpx_util::read_gpx(file).with_context(|| format!("Failed to read {:?}", file))?;
    tracing::info!("Replaying '{}' with {} points", track.title, track.points.len());

    let (handle, task) = TrackerService::spawn(config.tracker.clone())?;
    let mut provider = GpxReplay::new(track.points, config.replay_interval, config.replay_speedup)?;

    let reporter = tokio::spawn(report(handle.subscribe(), config.report_interval, json));

    handle.start().await?;
    pump(&mut provider, &handle).await?;

    let snapshot = handle.snapshot().await?;
    handle.shutdown().await?;
    reporter.abort();
    task.await.context("Tracker task failed")?;

    print_snapshot(&snapshot, json)?;
    Ok(())
}

async fn report(updates: watch::Receiver<SessionSnapshot>, every: Duration, json: bool) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let snapshot = updates.borrow().clone();
        if let Err(err) = print_snapshot(&snapshot, json) {
            tracing::error!("Failed to print snapshot: {err:?}");
        }
    }
}

fn print_snapshot(snapshot: &SessionSnapshot, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
    } else {
        println!("{}", snapshot);
    }
    Ok(())
}
