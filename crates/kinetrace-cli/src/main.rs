//! Kinetrace CLI - Main entry point
//!
//! Records a run of synthetic motion telemetry through the full pipeline:
//! local CSV backups plus optional upload to a remote collector.

mod config;
mod synthetic;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use kinetrace_core::{SourceAdapter, TelemetryPipeline, Uploader};
use kinetrace_http::HttpUploader;

use crate::synthetic::SyntheticSource;

#[derive(Parser, Debug)]
#[command(name = "kinetrace")]
#[command(about = "Record synthetic motion telemetry to CSV and a remote collector")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "kinetrace.toml")]
    config: PathBuf,

    /// Override the collector base URL
    #[arg(long)]
    collector: Option<String>,

    /// Number of frames to record
    #[arg(short = 'n', long)]
    frames: Option<u64>,

    /// Directory for local backup files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Disable cloud upload for this run
    #[arg(long)]
    local_only: bool,

    /// Write a default configuration file and exit
    #[arg(long)]
    init_config: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Kinetrace v{}", env!("CARGO_PKG_VERSION"));

    if args.init_config {
        config::save_default_config(&args.config)?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    // Load configuration, then apply command-line overrides
    let mut config = config::load_config(&args.config)?;
    if let Some(collector) = args.collector {
        config.session.collector_base_url = collector;
    }
    if let Some(dir) = args.output_dir {
        config.session.output_dir = dir;
    }
    if let Some(frames) = args.frames {
        config.capture.frames = frames;
    }
    if args.local_only {
        config.session.enable_cloud_upload = false;
    }

    let uploader: Option<Box<dyn Uploader>> = match HttpUploader::new() {
        Ok(uploader) => Some(Box::new(uploader)),
        Err(e) => {
            warn!(error = %e, "could not construct HTTP uploader");
            None
        }
    };

    let mut pipeline = TelemetryPipeline::new();
    if !pipeline.initialize(uploader, config.session.clone(), &config.capture.device) {
        anyhow::bail!("telemetry pipeline failed to initialize");
    }

    let mut source = SyntheticSource::new();
    let rate = config.capture.effective_rate_hz();
    if rate != config.capture.rate_hz {
        warn!(
            configured = config.capture.rate_hz,
            rate_hz = rate,
            "invalid capture rate, using default"
        );
    }
    info!(
        frames = config.capture.frames,
        rate_hz = rate,
        source = source.name(),
        "recording"
    );

    for i in 0..config.capture.frames {
        let timestamp = i as f64 / rate;
        source.advance(timestamp);
        pipeline.record(source.sample_at(timestamp));
    }

    let session = pipeline.session_id().to_string();
    let total = pipeline.total_samples();
    pipeline.shutdown();

    println!("Session: {}", session);
    println!(
        "Recorded {} samples into {} backup file(s)",
        total,
        pipeline.current_file_index()
    );

    Ok(())
}
