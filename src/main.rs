//! FrameKit - Task-dispatching toolkit over ffmpeg
//!
//! Command-line entry point: runs one task per invocation and prints the
//! produced files.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use framekit::cli::{Args, Commands};
use framekit::config::Config;
use framekit::task::{Task, TaskParams, TaskRequest};
use framekit::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load framekit.toml from current directory first
            if std::path::Path::new("framekit.toml").exists() {
                info!("Found framekit.toml in current directory, loading...");
                Config::from_file("framekit.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Run {
            task,
            input,
            audio,
            fps,
            duration,
            volume_ratio,
            workspace,
            shared,
            json,
        } => {
            let task = parse_task(&task)?;

            if let Some(root) = workspace {
                config.workspace.root = root;
            }
            if shared {
                config.workspace.isolated = false;
            }

            let defaults = config.defaults;
            let params = TaskParams {
                fps: fps.unwrap_or(defaults.fps),
                duration: duration.unwrap_or(defaults.duration),
                volume_ratio: volume_ratio.unwrap_or(defaults.volume_ratio),
            };

            let mut request = TaskRequest::new(task, input).with_params(params);
            if let Some(audio) = audio {
                request = request.with_audio(audio);
            }

            let workflow = Workflow::new(config)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg} [{elapsed}]")
                    .map_err(|e| anyhow::anyhow!("Invalid progress template: {}", e))?,
            );
            spinner.set_message(format!("Running {}", task));
            spinner.enable_steady_tick(Duration::from_millis(120));

            let result = workflow.predict(&request).await;
            spinner.finish_and_clear();
            let output = result?;

            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for artifact in &output.artifacts {
                    println!("{}", artifact.display());
                }
            }
        }
        Commands::Tasks => {
            println!("\nAvailable Tasks:");
            println!("{:<28} {:<8} {:<6} {}", "Task", "Input", "Audio", "Description");
            println!("{}", "-".repeat(95));

            for task in Task::ALL {
                let input = if task == Task::Slideshow {
                    "zip".to_string()
                } else {
                    task.category().to_string()
                };
                let audio = if task.requires_audio() { "yes" } else { "" };
                println!("{:<28} {:<8} {:<6} {}", task.as_str(), input, audio, task.description());
            }
        }
        Commands::Check => {
            let workflow = Workflow::new(config)?;
            let version = workflow.version_info().await?;
            println!("{}", version);
            println!("Probe: {}", workflow.config().media.probe_path);
        }
        Commands::Clean { workspace } => {
            let root = workspace.unwrap_or(config.workspace.root);
            if root.exists() {
                std::fs::remove_dir_all(&root)?;
                println!("Removed {}", root.display());
            } else {
                println!("Nothing to clean at {}", root.display());
            }
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".framekit").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "framekit.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so stdout only carries artifact paths
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("framekit.log").display()
    );

    Ok(())
}

/// Parse task identifier from string
fn parse_task(name: &str) -> Result<Task> {
    Ok(name.trim().to_lowercase().parse::<Task>()?)
}
