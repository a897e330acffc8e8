// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Incremental scanning: which photos still need the scoring oracle

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::fingerprint::{fingerprint, matches};
use crate::ledger::Ledger;
use crate::Result;

/// Diffs a ledger against the photos currently on disk
pub struct IncrementalScanner<'a> {
    ledger: &'a Ledger,
}

impl<'a> IncrementalScanner<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Files that must be (re-)scored.
    ///
    /// A file is pending when the ledger has no record for its name, the
    /// record has no fingerprint, or the fingerprint no longer matches.
    /// Order follows `files`.
    pub fn pending(&self, files: &[PathBuf]) -> Vec<PathBuf> {
        files
            .iter()
            .filter(|path| self.needs_scoring(path))
            .cloned()
            .collect()
    }

    fn needs_scoring(&self, path: &Path) -> bool {
        let Some(name) = file_name(path) else {
            return true;
        };
        match self.ledger.files().get(name) {
            None => true,
            Some(record) => {
                let stale = !matches(&record.fingerprint, &fingerprint(path));
                if stale {
                    debug!("Cached result for {} is stale", name);
                }
                stale
            }
        }
    }
}

/// Convenience wrapper around [`IncrementalScanner::pending`]
pub fn pending(ledger: &Ledger, files: &[PathBuf]) -> Vec<PathBuf> {
    IncrementalScanner::new(ledger).pending(files)
}

/// File name as the ledger keys it
pub fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// List candidate photos at the top level of a managed directory.
///
/// Only regular files whose extension is in `formats` are returned; hidden,
/// temporary and system files are skipped. Sorted by path.
pub fn list_photos(dir: &Path, formats: &[String]) -> Result<Vec<PathBuf>> {
    let mut photos: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && should_process(p) && has_photo_extension(p, formats))
        .collect();
    photos.sort();
    Ok(photos)
}

/// Check if a file should be considered at all
pub fn should_process(path: &Path) -> bool {
    let filename = match file_name(path) {
        Some(n) => n,
        None => return false,
    };

    // Hidden files, including the ledger itself
    if filename.starts_with('.') {
        return false;
    }

    let temp_extensions = [".tmp", ".part", ".crdownload", ".partial", ".download"];
    if temp_extensions.iter().any(|ext| filename.ends_with(ext)) {
        return false;
    }

    let skip_names = ["desktop.ini", "thumbs.db", ".ds_store"];
    !skip_names.iter().any(|n| filename.eq_ignore_ascii_case(n))
}

fn has_photo_extension(path: &Path, formats: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| formats.iter().any(|f| f.eq_ignore_ascii_case(ext)))
}
