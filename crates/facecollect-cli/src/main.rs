use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facecollect_client::HttpBackend;
use facecollect_core::{CaptureOrchestrator, Clients, RunOutcome};
use facecollect_hw::{Camera, MediaCapture};
use tracing_subscriber::EnvFilter;

mod config;
mod ui;

use config::Config;
use ui::TerminalUi;

/// Conventional exit status after SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(
    name = "facecollect",
    about = "Collect labeled face images for a recognition backend and trigger training"
)]
struct Cli {
    /// Base URL of the detection/training API (overrides FACECOLLECT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Origin serving /capture_data (overrides FACECOLLECT_CAPTURE_URL)
    #[arg(long, global = true)]
    capture_url: Option<String>,

    /// V4L2 camera device (overrides FACECOLLECT_CAMERA_DEVICE)
    #[arg(long, global = true)]
    device: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture detected face images for one label
    Collect {
        /// Name of the person being enrolled
        #[arg(short, long)]
        label: String,
        /// Number of images to capture (default: FACECOLLECT_IMAGES_PER_RUN or 30)
        #[arg(short = 'n', long)]
        count: Option<u32>,
        /// Train the model once all images are captured
        #[arg(long)]
        train: bool,
    },
    /// Train the recognition model on the collected images
    Train,
    /// List the labels the backend already knows
    Faces,
    /// List V4L2 capture devices
    Devices,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(url) = cli.api_url {
        if cli.capture_url.is_none() && config.capture_url == config.api_url {
            config.capture_url = url.clone();
        }
        config.api_url = url;
    }
    if let Some(url) = cli.capture_url {
        config.capture_url = url;
    }
    if let Some(device) = cli.device {
        config.camera_device = device;
    }
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Devices => Ok(list_devices()),
        Commands::Faces => {
            let orchestrator = build_orchestrator(&config)?;
            Ok(match orchestrator.refresh_registered_faces().await {
                Some(_) => ExitCode::SUCCESS,
                None => ExitCode::FAILURE,
            })
        }
        Commands::Train => {
            let orchestrator = build_orchestrator(&config)?;
            Ok(train(&orchestrator).await)
        }
        Commands::Collect {
            label,
            count,
            train: train_after,
        } => {
            let orchestrator = build_orchestrator(&config)?;
            let count = count.unwrap_or(config.images_per_run);
            collect(&orchestrator, &label, count, train_after).await
        }
    }
}

fn build_orchestrator(config: &Config) -> Result<CaptureOrchestrator> {
    let backend = Arc::new(
        HttpBackend::new(&config.backend_config()).context("failed to configure backend client")?,
    );
    let clients = Clients {
        detector: backend.clone(),
        persister: backend.clone(),
        trainer: backend.clone(),
        registry: backend,
    };
    let media = Arc::new(MediaCapture::new(config.media_config()));
    let ui = Arc::new(TerminalUi::stdout());
    Ok(CaptureOrchestrator::new(media, clients, ui).with_pacing(config.capture_interval))
}

async fn collect(
    orchestrator: &CaptureOrchestrator,
    label: &str,
    count: u32,
    train_after: bool,
) -> Result<ExitCode> {
    orchestrator.refresh_registered_faces().await;

    if orchestrator.start_camera().await.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    let run = tokio::select! {
        run = orchestrator.run_capture(label, count) => run,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("capture interrupted");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
    };

    let summary = match run {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    if summary.outcome == RunOutcome::Stopped {
        return Ok(ExitCode::FAILURE);
    }
    if train_after {
        return Ok(train(orchestrator).await);
    }
    Ok(ExitCode::SUCCESS)
}

async fn train(orchestrator: &CaptureOrchestrator) -> ExitCode {
    match orchestrator.train().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn list_devices() -> ExitCode {
    let devices = Camera::list_devices();
    if devices.is_empty() {
        println!("No V4L2 capture devices found");
        return ExitCode::FAILURE;
    }
    for d in devices {
        println!("{}\t{} ({}, {})", d.path, d.name, d.driver, d.bus);
    }
    ExitCode::SUCCESS
}
