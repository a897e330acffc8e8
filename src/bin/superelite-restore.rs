// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! SuperElite Restore Utility
//!
//! Moves photos out of star folders back to the top of the directory.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;

use superelite::relocate::{FileRelocator, DEFAULT_BUCKET_SUFFIX};

#[derive(Parser, Debug)]
#[command(name = "superelite-restore")]
#[command(version = "1.0.0")]
#[command(about = "Undo SuperElite star-folder layout")]
struct Args {
    /// Directory that holds the star folders
    dir: PathBuf,

    /// Dry run - show what would be moved without doing it
    #[arg(long)]
    dry_run: bool,

    /// Star folder suffix, as in "4★"
    #[arg(long, default_value = DEFAULT_BUCKET_SUFFIX)]
    suffix: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if !args.dir.is_dir() {
        bail!("Not a directory: {:?}", args.dir);
    }
    let dir = args
        .dir
        .canonicalize()
        .with_context(|| format!("Cannot resolve {:?}", args.dir))?;

    let relocator = FileRelocator::new(&dir).with_suffix(&args.suffix);
    let plan = relocator.plan_restore();

    if plan.is_empty() {
        println!("No photos in star folders.");
        return Ok(());
    }

    if args.dry_run {
        let mut kept = 0;
        for planned in &plan {
            if planned.already_in_place {
                println!("  Skip: {} (name taken at top level)", planned.from.display());
                kept += 1;
            } else {
                println!("  Would move: {} -> {}", planned.from.display(), planned.to.display());
            }
        }
        println!();
        println!("Dry run complete. {} photo(s) would be moved.", plan.len() - kept);
        return Ok(());
    }

    println!("Restoring {} photo(s)...", plan.len());
    let report = relocator.restore_files();

    println!();
    println!(
        "Done. {} moved, {} failed, {} left in place.",
        report.moved, report.failed, report.already_in_place
    );

    if report.failed > 0 {
        bail!("{} photo(s) could not be moved", report.failed);
    }

    Ok(())
}
