// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Star-folder layout: sorting photos into rating buckets and back
//!
//! Bucket folders sit directly under the managed directory and are named by
//! star count plus a suffix, e.g. `0★` … `5★`. Nothing here ever overwrites
//! an existing file. Per-file failures are counted and logged, never fatal.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::ledger::Ledger;
use crate::rating::MAX_RATING;

/// Default bucket folder suffix
pub const DEFAULT_BUCKET_SUFFIX: &str = "★";

/// Outcome of moving photos out of bucket folders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub moved: usize,
    pub failed: usize,
    pub already_in_place: usize,
}

/// Outcome of moving photos into bucket folders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrganizeReport {
    pub moved: usize,
    /// A file of the same name already sits in the bucket
    pub skipped: usize,
    pub failed: usize,
    /// Tracked by the ledger but not at the top level
    pub missing: usize,
}

/// One move `restore_files` would make
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub from: PathBuf,
    pub to: PathBuf,
    /// Destination name is taken; the file would be left where it is
    pub already_in_place: bool,
}

/// Moves photos between the flat layout and rating bucket folders
pub struct FileRelocator {
    dir: PathBuf,
    suffix: String,
}

impl FileRelocator {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            suffix: DEFAULT_BUCKET_SUFFIX.to_string(),
        }
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    /// Folder name for a rating, e.g. `3★`
    pub fn bucket_name(&self, rating: u8) -> String {
        format!("{}{}", rating, self.suffix)
    }

    pub fn bucket_dir(&self, rating: u8) -> PathBuf {
        self.dir.join(self.bucket_name(rating))
    }

    /// Bucket folders that currently exist, lowest rating first
    fn existing_buckets(&self) -> Vec<PathBuf> {
        (0..=MAX_RATING)
            .map(|r| self.bucket_dir(r))
            .filter(|p| p.is_dir())
            .collect()
    }

    fn bucket_files(bucket: &Path) -> Vec<PathBuf> {
        match fs::read_dir(bucket) {
            Ok(entries) => {
                let mut files: Vec<PathBuf> = entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.is_file())
                    .collect();
                files.sort();
                files
            }
            Err(e) => {
                warn!("Failed to read bucket folder {:?}: {}", bucket, e);
                Vec::new()
            }
        }
    }

    /// What `restore_files` would do, without touching anything
    pub fn plan_restore(&self) -> Vec<PlannedMove> {
        let mut plan: Vec<PlannedMove> = Vec::new();
        for bucket in self.existing_buckets() {
            for from in Self::bucket_files(&bucket) {
                let Some(name) = from.file_name() else {
                    continue;
                };
                let to = self.dir.join(name);
                let already_in_place = to.exists() || plan.iter().any(|m| m.to == to);
                plan.push(PlannedMove {
                    from,
                    to,
                    already_in_place,
                });
            }
        }
        plan
    }

    /// Move every photo in a bucket folder back to the top level.
    ///
    /// A photo whose name already exists at the top level is counted as
    /// already in place and both copies are left alone. Only names are
    /// compared, so two different photos sharing a name are treated as
    /// duplicates. Bucket folders left empty are removed.
    pub fn restore_files(&self) -> RestoreReport {
        let mut report = RestoreReport::default();

        for bucket in self.existing_buckets() {
            for from in Self::bucket_files(&bucket) {
                let Some(name) = from.file_name() else {
                    continue;
                };
                let to = self.dir.join(name);

                if to.exists() {
                    debug!("Already at top level, leaving {:?}", from);
                    report.already_in_place += 1;
                    continue;
                }

                match fs::rename(&from, &to) {
                    Ok(()) => report.moved += 1,
                    Err(e) => {
                        error!("Failed to move {:?} to {:?}: {}", from, to, e);
                        report.failed += 1;
                    }
                }
            }
        }

        self.remove_empty_buckets();

        info!(
            "Restore: {} moved, {} failed, {} already in place",
            report.moved, report.failed, report.already_in_place
        );
        report
    }

    /// Move each top-level photo tracked by the ledger into its rating bucket
    pub fn organize(&self, ledger: &Ledger) -> OrganizeReport {
        let mut report = OrganizeReport::default();

        for (name, record) in ledger.files() {
            let from = self.dir.join(name);
            if !from.is_file() {
                debug!("{} is not at the top level, skipping", name);
                report.missing += 1;
                continue;
            }

            let bucket = self.bucket_dir(record.rating.min(MAX_RATING));
            if let Err(e) = fs::create_dir_all(&bucket) {
                error!("Failed to create bucket folder {:?}: {}", bucket, e);
                report.failed += 1;
                continue;
            }

            let to = bucket.join(name);
            if to.exists() {
                warn!("{:?} already exists, leaving {:?} in place", to, from);
                report.skipped += 1;
                continue;
            }

            match fs::rename(&from, &to) {
                Ok(()) => report.moved += 1,
                Err(e) => {
                    error!("Failed to move {:?} to {:?}: {}", from, to, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Organize: {} moved, {} skipped, {} failed, {} missing",
            report.moved, report.skipped, report.failed, report.missing
        );
        report
    }

    fn remove_empty_buckets(&self) {
        for bucket in self.existing_buckets() {
            let is_empty = fs::read_dir(&bucket)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if is_empty {
                match fs::remove_dir(&bucket) {
                    Ok(()) => debug!("Removed empty bucket folder {:?}", bucket),
                    Err(e) => warn!("Failed to remove bucket folder {:?}: {}", bucket, e),
                }
            }
        }
    }
}
