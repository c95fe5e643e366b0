// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! receiptwatch: PDF receipt categorizer
//!
//! Watches a folder for PDF receipts and writes an LLM categorization of
//! each one to CSV.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use receiptwatch::config::AppConfig;
use receiptwatch::history::{History, Outcome};
use receiptwatch::openai::OpenAiClient;
use receiptwatch::pipeline::ReceiptPipeline;
use receiptwatch::watcher::{is_receipt, settle, FileWatcher, WatchEvent};
use receiptwatch::{ReceiptError, Result};

/// receiptwatch CLI - PDF receipt categorizer
#[derive(Parser, Debug)]
#[command(name = "receiptwatch")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Watches a folder for PDF receipts and categorizes them into CSV", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (KEY=value lines, or JSON if it ends in .json)
    #[arg(short, long, default_value = "receipts.env", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch the configured folder for new receipts and process them
    Watch,

    /// Process a single receipt and exit
    Process {
        /// PDF receipt to categorize
        path: PathBuf,
    },

    /// Show recent processing outcomes
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        count: usize,

        /// Only show failed receipts
        #[arg(long)]
        failed: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Watch) | None => run_watch(config).await,
        Some(Commands::Process { path }) => run_process(config, path).await,
        Some(Commands::History { count, failed }) => run_history(config, count, failed),
    }
}

/// Run the watch mode (main receipt loop)
async fn run_watch(config: AppConfig) -> Result<()> {
    std::fs::create_dir_all(&config.output_folder)?;
    info!("Output directory: {:?}", config.output_folder);

    let client = OpenAiClient::from_config(&config)?;
    info!("Categorizing with model {}", client.model());
    let pipeline = ReceiptPipeline::new(client, &config);

    let mut watcher = FileWatcher::new()?;
    watcher.watch(&config.watch_folder)?;

    // Setup graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = terminate => info!("Received SIGTERM, shutting down..."),
        }

        let _ = shutdown_tx.send(true);
    });

    info!("Watching {:?} for new receipts. Press Ctrl+C to stop.", config.watch_folder);

    // Main event loop: one receipt at a time, in event order
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        match watcher.next_event(Duration::from_millis(100)) {
            Some(WatchEvent::FileCreated(path)) => {
                if !is_receipt(&path) {
                    debug!("Ignoring non-receipt file: {:?}", path);
                    continue;
                }

                if !settle(&path, config.settle_delay(), config.stability_timeout()).await {
                    continue;
                }

                // Failures are logged and recorded; keep watching
                let _ = pipeline.handle(&path).await;
            }
            Some(WatchEvent::Error(e)) => {
                warn!("Watch error: {}", e);
            }
            Some(WatchEvent::Disconnected) => {
                error!("File watcher disconnected, stopping");
                return Err(ReceiptError::Watch(notify::Error::generic("watcher disconnected")));
            }
            None => {}
        }
    }

    info!("receiptwatch stopped.");
    Ok(())
}

/// Process one receipt from the command line
async fn run_process(config: AppConfig, path: PathBuf) -> Result<()> {
    if !path.is_file() {
        return Err(ReceiptError::NotAReceipt(path));
    }

    let client = OpenAiClient::from_config(&config)?;
    let pipeline = ReceiptPipeline::new(client, &config);

    let output = pipeline.handle(&path).await?;
    println!("{}", output.display());
    Ok(())
}

/// Print recent history entries
fn run_history(config: AppConfig, count: usize, failed_only: bool) -> Result<()> {
    let history = History::new(config.history_file.clone());

    let entries = if failed_only {
        let mut failed = history.get_failed()?;
        failed.reverse();
        failed.truncate(count);
        failed
    } else {
        history.get_recent(count)?
    };

    println!("Recent receipts ({} entries):", entries.len());
    for entry in entries {
        let detail = match &entry.outcome {
            Outcome::Written { output } => format!("-> {}", output.display()),
            Outcome::Failed { stage: Some(stage), error } => {
                format!("[FAILED at {}] {}", stage, error)
            }
            Outcome::Failed { stage: None, error } => format!("[FAILED] {}", error),
        };
        println!(
            "  {} {} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.receipt.display(),
            detail
        );
    }

    Ok(())
}
