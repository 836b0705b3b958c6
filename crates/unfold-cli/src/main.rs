mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod ui;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use crate::ui::{UiEvent, UiManager};
use clap::Parser;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, error, info, warn};

/// Time given to the UI task to flush its last lines before the process exits.
const UI_FLUSH_GRACE: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        tokio::time::sleep(UI_FLUSH_GRACE).await;
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();

    let (ui_manager, ui_sender, shutdown_sender) = UiManager::new();
    let ui_handle = task::spawn(ui_manager.run());

    logging::setup_logging(cli.verbose, cli.quiet, &cli.log_file, ui_sender.clone())?;
    install_panic_reporting()?;

    info!("unfold v{}", env!("CARGO_PKG_VERSION"));
    debug!("Parsed arguments: {:?}", &cli);

    let name = command_name(&cli.command);
    let outcome = match configure_threads(cli.threads) {
        Ok(()) => dispatch(cli.command, ui_sender).await,
        Err(e) => Err(e),
    };

    match &outcome {
        Ok(()) => info!(command = name, "Finished."),
        Err(e) => error!(command = name, "Failed: {}", e),
    }

    if shutdown_sender.send(true).is_err() {
        warn!("UI task exited before the shutdown signal.");
    }
    ui_handle
        .await
        .map_err(|e| CliError::Other(anyhow::anyhow!("UI task failed: {}", e)))?;

    outcome
}

fn install_panic_reporting() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |info| {
        error!("{}", panic_hook.panic_report(info));
    }));
    Ok(())
}

/// Sizes the global rayon pool used by model construction.
fn configure_threads(threads: Option<usize>) -> Result<()> {
    let Some(threads) = threads else {
        return Ok(());
    };
    if threads == 0 {
        return Err(CliError::Argument(
            "--threads must be at least 1".to_string(),
        ));
    }
    debug!(threads, "Configuring the global thread pool.");
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to build thread pool: {}", e)))
}

async fn dispatch(command: Commands, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    match command {
        Commands::Build(args) => commands::build::run(args, ui_sender).await,
        Commands::Reconstruct(args) => commands::reconstruct::run(args, ui_sender).await,
        Commands::Inspect(args) => commands::inspect::run(args).await,
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Build(_) => "build",
        Commands::Reconstruct(_) => "reconstruct",
        Commands::Inspect(_) => "inspect",
    }
}
