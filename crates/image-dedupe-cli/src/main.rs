use anyhow::{bail, Context};
use chrono::{DateTime, Local};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use image_dedupe_core::action::{move_to_trash, restore, TrashLog};
use image_dedupe_core::{logging, Config, DuplicateGroup, HashMethod, ImageDeduper, ScanReport};

#[derive(Parser)]
#[command(name = "image-dedupe")]
#[command(about = "Find duplicate and near-duplicate images")]
#[command(version)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write a rotating log file to this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SearchArgs {
    /// Directories to scan for duplicate images
    #[arg(required = true)]
    directories: Vec<PathBuf>,

    /// Comparison method: exact, phash or dhash
    #[arg(short, long)]
    method: Option<String>,

    /// Maximum Hamming distance for perceptual matches
    #[arg(short, long, allow_negative_numbers = true)]
    threshold: Option<i64>,

    /// Number of hashing threads (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Maximum directory depth for scanning
    #[arg(long)]
    max_depth: Option<usize>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report duplicate groups and the suggested file to keep
    Scan {
        #[command(flatten)]
        search: SearchArgs,

        /// Print the groups as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move every non-kept file into the trash directory of the first scanned directory
    Resolve {
        #[command(flatten)]
        search: SearchArgs,

        /// Where to write the trash log needed by `undo`
        #[arg(long, default_value = "image-dedupe-trash.json")]
        log: PathBuf,

        /// Show what would be moved without touching any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Move files recorded in a trash log back to where they were
    Undo {
        /// Trash log written by `resolve`
        #[arg(long, default_value = "image-dedupe-trash.json")]
        log: PathBuf,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "image-dedupe.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    match &cli.log_dir {
        Some(dir) => {
            logging::init_logger(dir, level)?;
        }
        None => env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .init(),
    }

    match cli.command {
        Commands::Scan { search, json } => {
            let report = search_duplicates(&search)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report.groups)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }

        Commands::Resolve {
            search,
            log,
            dry_run,
        } => {
            let report = search_duplicates(&search)?;
            let root = &search.directories[0];

            if dry_run {
                for group in &report.groups {
                    for record in group.redundant() {
                        println!("would move {}", record.path.display());
                    }
                }
                println!(
                    "{} files in {} groups would be moved",
                    report.redundant_count(),
                    report.groups.len()
                );
                return Ok(());
            }

            let mut logs = Vec::with_capacity(report.groups.len());
            for group in &report.groups {
                match move_to_trash(group, group.suggested_keep, root) {
                    Ok(trash_log) => logs.push(trash_log),
                    Err(e) => {
                        // Keep what was already moved undoable
                        TrashLog::save_all(&logs, &log)?;
                        return Err(e).with_context(|| format!("resolving group {}", group.id));
                    }
                }
            }
            TrashLog::save_all(&logs, &log)?;

            let moved: usize = logs.iter().map(|l| l.moved.len()).sum();
            println!(
                "Moved {} files from {} groups; undo with `image-dedupe undo --log {}`",
                moved,
                logs.len(),
                log.display()
            );
            Ok(())
        }

        Commands::Undo { log } => {
            let logs = TrashLog::load_all(&log)?;
            let mut restored = 0;
            for trash_log in &logs {
                restored += restore(trash_log)?;
            }
            println!("Restored {} files", restored);
            Ok(())
        }

        Commands::GenerateConfig { path } => {
            generate_config(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}

/// Build the configuration from file and flags, then discover and group
fn search_duplicates(search: &SearchArgs) -> anyhow::Result<ScanReport> {
    let mut config = match &search.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // Override config with command line arguments
    if let Some(method) = &search.method {
        config.method = method.parse::<HashMethod>()?;
    }
    if let Some(threshold) = search.threshold {
        config = config.with_raw_threshold(threshold)?;
    }
    if let Some(threads) = search.threads {
        config.threads = threads;
    }
    if search.max_depth.is_some() {
        config.max_depth = search.max_depth;
    }

    let deduper = ImageDeduper::new(config)?;
    let paths = deduper.discover_images(&search.directories)?;
    if paths.is_empty() {
        bail!("No images found in {}", display_all(&search.directories));
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    spinner.set_message(format!(
        "Comparing {} images ({})...",
        paths.len(),
        deduper.config().method
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    info!("Starting duplicate search over {} files", paths.len());
    let report = deduper.find_duplicates(&paths);
    spinner.finish_and_clear();

    Ok(report)
}

/// Write the default configuration, refusing to overwrite an existing file
fn generate_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    Config::default().save_to_file(path)?;
    Ok(())
}

fn print_report(report: &ScanReport) {
    if report.groups.is_empty() {
        println!(
            "Scanned {} images, no duplicates found.",
            report.compared
        );
    }

    for group in &report.groups {
        print_group(group);
    }

    if !report.groups.is_empty() {
        println!(
            "{} groups, {} redundant files, {} bytes reclaimable",
            report.groups.len(),
            report.redundant_count(),
            report.reclaimable_bytes()
        );
    }
    if !report.skipped.is_empty() {
        println!("{} files could not be read and were skipped", report.skipped.len());
    }
}

fn print_group(group: &DuplicateGroup) {
    println!("[{}] {} ({} images)", group.id, group.method, group.images.len());
    for (index, record) in group.images.iter().enumerate() {
        let marker = if index == group.suggested_keep { '*' } else { ' ' };
        let modified: DateTime<Local> = record.modified.into();
        println!(
            "  {} {:>5}x{:<5} {:>10} B  {}  {}",
            marker,
            record.width,
            record.height,
            record.size,
            modified.format("%Y-%m-%d %H:%M:%S"),
            record.path.display()
        );
    }
}

fn display_all(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
