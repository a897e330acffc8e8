// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! SuperElite: AI Photo Culling Ledger
//!
//! Scores photos with a local vision model, caches the results per
//! directory, and re-rates or re-lays-out photos from the cache.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use superelite::batch::BatchRunner;
use superelite::config::AppConfig;
use superelite::ledger::{Ledger, LedgerSummary};
use superelite::oracle::OllamaOracle;
use superelite::rating::{quick_rerate, RatingPolicy, ThresholdPreset, Thresholds, Weights};
use superelite::relocate::FileRelocator;
use superelite::scanner::{list_photos, IncrementalScanner};
use superelite::{Result, SuperEliteError};

/// SuperElite CLI - AI Photo Culling Ledger
#[derive(Parser, Debug)]
#[command(name = "superelite")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Resumable AI photo scoring with cached re-rating", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "superelite.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score every photo in a directory that has no valid cached result
    Run {
        /// Directory of photos
        dir: PathBuf,

        /// Skip Ollama health check on startup
        #[arg(long)]
        skip_health_check: bool,

        /// Oracle calls in flight (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// List photos that still need scoring
    Pending {
        dir: PathBuf,
    },

    /// Show ledger status and rating distribution
    Status {
        dir: PathBuf,
    },

    /// Recompute ratings from cached scores without running the model
    Rerate {
        dir: PathBuf,

        /// Named threshold set
        #[arg(long, value_enum, conflicts_with = "thresholds")]
        preset: Option<ThresholdPreset>,

        /// Four descending thresholds for 4, 3, 2 and 1 stars
        #[arg(long, value_delimiter = ',')]
        thresholds: Option<Vec<f64>>,

        /// Quality weight (default: keep the ledger's)
        #[arg(long)]
        quality_weight: Option<f64>,

        /// Aesthetic weight (default: keep the ledger's)
        #[arg(long)]
        aesthetic_weight: Option<f64>,
    },

    /// Move photos into star folders by rating
    Organize {
        dir: PathBuf,
    },

    /// Move photos out of star folders back to the top level
    Restore {
        dir: PathBuf,

        /// Show what would be moved without moving anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete a directory's ledger
    Reset {
        dir: PathBuf,

        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "superelite.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
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

    let config = AppConfig::load(&cli.config)?;
    let json = cli.format == "json";

    match cli.command {
        Commands::Run { dir, skip_health_check, concurrency } => {
            run_batch(config, &dir, skip_health_check, concurrency, json).await
        }
        Commands::Pending { dir } => run_pending(&config, &dir, json),
        Commands::Status { dir } => run_status(&dir, json),
        Commands::Rerate { dir, preset, thresholds, quality_weight, aesthetic_weight } => {
            run_rerate(&dir, preset, thresholds, quality_weight, aesthetic_weight, json)
        }
        Commands::Organize { dir } => run_organize(&config, &dir, json),
        Commands::Restore { dir, dry_run } => run_restore(&config, &dir, dry_run, json),
        Commands::Reset { dir, force } => run_reset(&dir, force),
        Commands::Config { action } => run_config_command(config, action, &cli.config),
    }
}

/// Score a directory, stopping cleanly on Ctrl+C / SIGTERM
async fn run_batch(
    config: AppConfig,
    dir: &Path,
    skip_health_check: bool,
    concurrency: Option<usize>,
    json: bool,
) -> Result<()> {
    config.validate()?;
    let oracle = OllamaOracle::new(&config.oracle)?;

    if !skip_health_check {
        info!("Checking Ollama availability...");
        oracle.health_check().await?;
        if !oracle.model_available().await? {
            warn!("Vision model '{}' not found. Try: ollama pull {}", config.oracle.model, config.oracle.model);
        }
    } else {
        warn!("Skipping Ollama health check");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
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
            _ = ctrl_c => info!("Received Ctrl+C, finishing current photos..."),
            _ = terminate => info!("Received SIGTERM, finishing current photos..."),
        }

        let _ = shutdown_tx.send(true);
    });

    let policy = config.rating.policy()?;
    let runner = BatchRunner::new(&oracle, policy, config.scan.formats.clone())
        .with_concurrency(concurrency.unwrap_or(config.scan.concurrency));
    let report = runner.run(dir, shutdown_rx).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} photos: {} scored, {} cached, {} failed",
            report.total, report.scored, report.skipped, report.failed
        );
        if report.cancelled {
            println!("Interrupted. Run again to resume.");
        } else if report.completed {
            println!("Directory complete.");
        }
    }

    Ok(())
}

fn run_pending(config: &AppConfig, dir: &Path, json: bool) -> Result<()> {
    let ledger = Ledger::open(dir);
    let files = list_photos(dir, &config.scan.formats)?;
    let pending = IncrementalScanner::new(&ledger).pending(&files);

    if json {
        println!("{}", serde_json::to_string_pretty(&pending)?);
    } else {
        for path in &pending {
            println!("{}", path.display());
        }
        println!("\n{} of {} photos pending", pending.len(), files.len());
    }

    Ok(())
}

fn run_status(dir: &Path, json: bool) -> Result<()> {
    let summary = Ledger::exists(dir).then(|| Ledger::open(dir).summary());

    if json {
        println!("{}", status_json(summary.as_ref())?);
    } else if let Some(summary) = summary {
        print_summary(dir, &summary);
    } else {
        println!("No ledger in {:?}", dir);
    }

    Ok(())
}

/// `status` output in JSON: the summary, or `null` without a ledger
fn status_json(summary: Option<&LedgerSummary>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&summary)?)
}

fn print_summary(dir: &Path, summary: &LedgerSummary) {
    println!("Directory: {}", dir.display());
    println!("  Status: {}", summary.status);
    println!("  Created: {}", summary.created_at.format("%Y-%m-%d %H:%M"));
    println!("  Updated: {}", summary.updated_at.format("%Y-%m-%d %H:%M"));
    println!("  Processed: {} / {}", summary.processed_files, summary.total_files);
    println!("  Thresholds: {}", summary.thresholds);
    println!("\nRatings:");
    for rating in (0..summary.by_rating.len()).rev() {
        println!(
            "  {}{}: {}",
            "★".repeat(rating),
            "☆".repeat(summary.by_rating.len() - 1 - rating),
            summary.by_rating[rating]
        );
    }
}

fn run_rerate(
    dir: &Path,
    preset: Option<ThresholdPreset>,
    thresholds: Option<Vec<f64>>,
    quality_weight: Option<f64>,
    aesthetic_weight: Option<f64>,
    json: bool,
) -> Result<()> {
    let mut ledger = Ledger::open(dir);
    let current = ledger.config().clone();

    let thresholds = match (preset, thresholds) {
        (Some(p), _) => p.thresholds(),
        (None, Some(values)) => Thresholds::try_from(values)?,
        (None, None) => current.thresholds,
    };
    let weights = Weights::new(
        quality_weight.unwrap_or(current.quality_weight),
        aesthetic_weight.unwrap_or(current.aesthetic_weight),
    )?;

    let changes = quick_rerate(&mut ledger, &RatingPolicy::new(thresholds, weights))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
    } else {
        for change in changes.iter().filter(|c| c.changed) {
            println!(
                "  {}: {} -> {} ({:.2})",
                change.filename, change.old_rating, change.new_rating, change.total
            );
        }
        println!(
            "\n{} files changed rating (thresholds {})",
            changes.iter().filter(|c| c.changed).count(),
            thresholds
        );
    }

    Ok(())
}

fn run_organize(config: &AppConfig, dir: &Path, json: bool) -> Result<()> {
    let ledger = Ledger::open(dir);
    let report = FileRelocator::new(dir)
        .with_suffix(&config.layout.bucket_suffix)
        .organize(&ledger);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Done. {} moved, {} skipped, {} failed, {} not found.",
            report.moved, report.skipped, report.failed, report.missing
        );
    }

    Ok(())
}

fn run_restore(config: &AppConfig, dir: &Path, dry_run: bool, json: bool) -> Result<()> {
    let relocator = FileRelocator::new(dir).with_suffix(&config.layout.bucket_suffix);

    if dry_run {
        for planned in relocator.plan_restore() {
            let note = if planned.already_in_place { " (already in place, kept)" } else { "" };
            println!("Would move: {} -> {}{}", planned.from.display(), planned.to.display(), note);
        }
        return Ok(());
    }

    let report = relocator.restore_files();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Done. {} moved, {} failed, {} already in place.",
            report.moved, report.failed, report.already_in_place
        );
    }

    Ok(())
}

fn run_reset(dir: &Path, force: bool) -> Result<()> {
    if !force {
        eprintln!("Use --force to confirm deleting the ledger");
        return Ok(());
    }
    Ledger::open(dir).reset()?;
    println!("Ledger reset");
    Ok(())
}

fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Generate { output } => {
            if output.exists() {
                return Err(SuperEliteError::Config(format!(
                    "{:?} already exists",
                    output
                )));
            }
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Vision model: {}", config.oracle.model);
            println!("  Thresholds: {}", config.rating.thresholds);
            println!("  Concurrency: {}", config.scan.concurrency);
        }
    }

    Ok(())
}
