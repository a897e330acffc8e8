// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Per-directory processing ledger
//!
//! The ledger records which photos in a directory have been scored, their
//! cached scores, and where the batch stands. It lives next to the photos as
//! a hidden JSON document and is rewritten atomically on every save.
//!
//! One `Ledger` value owns one directory. Mutations go through `&mut self`,
//! so concurrent scorers must funnel their results through a single owner.

pub mod migrate;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::fingerprint::fingerprint;
use crate::rating::{round_score, RatingPolicy, Thresholds, Weights, MAX_RATING};
use crate::{Result, SuperEliteError};

/// Name of the ledger document inside a managed directory
pub const LEDGER_FILENAME: &str = ".superelite_manifest.json";

/// Where a directory's batch stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerStatus {
    #[default]
    New,
    InProgress,
    Completed,
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Rating configuration the cached results were produced with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerConfig {
    pub thresholds: Thresholds,
    pub quality_weight: f64,
    pub aesthetic_weight: f64,
}

impl LedgerConfig {
    pub fn weights(&self) -> Weights {
        Weights {
            quality: self.quality_weight,
            aesthetic: self.aesthetic_weight,
        }
    }

    pub fn policy(&self) -> RatingPolicy {
        RatingPolicy::new(self.thresholds, self.weights())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        let weights = Weights::default();
        Self {
            thresholds: Thresholds::default(),
            quality_weight: weights.quality,
            aesthetic_weight: weights.aesthetic,
        }
    }
}

/// Cached result for one photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Empty when unknown; an empty fingerprint never counts as verified
    #[serde(default)]
    pub fingerprint: String,
    /// Absolute path at scoring time
    #[serde(default)]
    pub original_path: PathBuf,
    pub quality: f64,
    pub aesthetic: f64,
    pub total: f64,
    pub rating: u8,
    pub processed_at: DateTime<Utc>,
}

impl FileRecord {
    /// Same content and scores, ignoring when it was written
    fn same_result(&self, other: &FileRecord) -> bool {
        self.fingerprint == other.fingerprint
            && self.original_path == other.original_path
            && self.quality == other.quality
            && self.aesthetic == other.aesthetic
            && self.total == other.total
            && self.rating == other.rating
    }
}

/// Cached scores for one photo
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CachedScores {
    pub quality: f64,
    pub aesthetic: f64,
    pub total: f64,
    pub rating: u8,
}

impl From<&FileRecord> for CachedScores {
    fn from(rec: &FileRecord) -> Self {
        Self {
            quality: rec.quality,
            aesthetic: rec.aesthetic,
            total: rec.total,
            rating: rec.rating,
        }
    }
}

/// The persisted ledger document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerDocument {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub config: LedgerConfig,
    pub status: LedgerStatus,
    pub total_files: usize,
    pub processed_files: usize,
    pub files: BTreeMap<String, FileRecord>,
}

impl LedgerDocument {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            version: migrate::CURRENT_VERSION_STR.to_string(),
            created_at: now,
            updated_at: now,
            config: LedgerConfig::default(),
            status: LedgerStatus::New,
            total_files: 0,
            processed_files: 0,
            files: BTreeMap::new(),
        }
    }
}

/// Status, counts and rating histogram for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub status: LedgerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_files: usize,
    pub processed_files: usize,
    pub thresholds: Thresholds,
    /// `by_rating[n]` is the number of photos rated `n` stars
    pub by_rating: [usize; 6],
}

/// Ledger for one managed directory
#[derive(Debug)]
pub struct Ledger {
    dir: PathBuf,
    path: PathBuf,
    doc: LedgerDocument,
}

impl Ledger {
    /// Open the ledger for a directory.
    ///
    /// A missing ledger starts empty. An unreadable or corrupt one is logged
    /// and also starts empty, so a bad file means "start over" rather than a
    /// failed batch.
    pub fn open(dir: &Path) -> Self {
        let mut ledger = Self {
            dir: dir.to_path_buf(),
            path: dir.join(LEDGER_FILENAME),
            doc: LedgerDocument::new(),
        };
        if ledger.path.exists() {
            ledger.load();
        }
        ledger
    }

    /// Whether a directory already has a persisted ledger
    pub fn exists(dir: &Path) -> bool {
        dir.join(LEDGER_FILENAME).is_file()
    }

    /// Reload from disk, migrating older schemas. Returns false (and resets
    /// to an empty ledger) if the document could not be used.
    pub fn load(&mut self) -> bool {
        match self.read_document() {
            Ok((doc, migrated)) => {
                self.doc = doc;
                if migrated {
                    info!(
                        "Migrated ledger {:?} to schema {} ({} files)",
                        self.path,
                        migrate::CURRENT_VERSION_STR,
                        self.doc.files.len()
                    );
                    if let Err(e) = self.save() {
                        warn!("Failed to persist migrated ledger {:?}: {}", self.path, e);
                    }
                }
                true
            }
            Err(e) => {
                warn!("Failed to load ledger {:?}, starting fresh: {}", self.path, e);
                self.doc = LedgerDocument::new();
                false
            }
        }
    }

    fn read_document(&self) -> Result<(LedgerDocument, bool)> {
        let content = fs::read_to_string(&self.path)?;
        let raw: serde_json::Value = serde_json::from_str(&content)?;
        let upgraded = migrate::upgrade(raw, Utc::now())?;
        let migrated = upgraded.migrated();
        let mut doc: LedgerDocument = serde_json::from_value(upgraded.document)?;

        if doc.processed_files != doc.files.len() {
            debug!(
                "Ledger processed count {} disagrees with {} records, correcting",
                doc.processed_files,
                doc.files.len()
            );
            doc.processed_files = doc.files.len();
        }

        Ok((doc, migrated))
    }

    /// Write the ledger atomically: temp file, sync, rename over the old one.
    pub fn save(&mut self) -> Result<()> {
        self.doc.updated_at = Utc::now();

        let serialized = serde_json::to_string_pretty(&self.doc)?;
        let temp_path = self.dir.join(format!(
            "{}.{}.tmp",
            LEDGER_FILENAME,
            uuid::Uuid::new_v4().simple()
        ));

        write_atomic(&self.path, &temp_path, serialized.as_bytes())?;

        debug!("Saved ledger {:?}", self.path);
        Ok(())
    }

    /// Delete the persisted ledger and start over
    pub fn reset(&mut self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!("Deleted ledger {:?}", self.path);
        }
        self.doc = LedgerDocument::new();
        Ok(())
    }

    /// Record a scoring result, overwriting any previous one for `filename`.
    ///
    /// Repeating a call with the same inputs on an unchanged file leaves the
    /// stored record untouched.
    pub fn upsert_result(
        &mut self,
        filename: &str,
        path: &Path,
        quality: f64,
        aesthetic: f64,
        total: f64,
        rating: u8,
    ) {
        let rating = if rating > MAX_RATING {
            warn!("Rating {} for {} out of range, clamping", rating, filename);
            MAX_RATING
        } else {
            rating
        };

        let record = FileRecord {
            fingerprint: fingerprint(path),
            original_path: absolute_path(path),
            quality: round_score(quality),
            aesthetic: round_score(aesthetic),
            total: round_score(total),
            rating,
            processed_at: Utc::now(),
        };

        match self.doc.files.get(filename) {
            Some(existing) if existing.same_result(&record) => {
                debug!("Result for {} unchanged", filename);
            }
            _ => {
                self.doc.files.insert(filename.to_string(), record);
            }
        }
        self.doc.processed_files = self.doc.files.len();
    }

    /// Change only the rating of an existing record
    pub fn update_rating(&mut self, filename: &str, rating: u8) -> Result<()> {
        if rating > MAX_RATING {
            return Err(SuperEliteError::InvalidRating(rating));
        }
        let record = self
            .doc
            .files
            .get_mut(filename)
            .ok_or_else(|| SuperEliteError::UnknownFile(filename.to_string()))?;
        record.rating = rating;
        record.processed_at = Utc::now();
        Ok(())
    }

    /// Replace the cached combined score after a weight change
    pub(crate) fn refresh_total(&mut self, filename: &str, total: f64) {
        if let Some(record) = self.doc.files.get_mut(filename) {
            record.total = round_score(total);
        }
    }

    /// Whether a photo has a verified, unchanged cached result
    pub fn is_processed(&self, filename: &str, path: &Path) -> bool {
        match self.doc.files.get(filename) {
            Some(record) if !record.fingerprint.is_empty() => {
                crate::fingerprint::matches(&record.fingerprint, &fingerprint(path))
            }
            _ => false,
        }
    }

    pub fn cached_scores(&self, filename: &str) -> Option<CachedScores> {
        self.doc.files.get(filename).map(CachedScores::from)
    }

    pub fn all_cached_scores(&self) -> BTreeMap<String, CachedScores> {
        self.doc
            .files
            .iter()
            .map(|(name, rec)| (name.clone(), CachedScores::from(rec)))
            .collect()
    }

    pub fn set_config(&mut self, thresholds: Thresholds, weights: Weights) {
        self.doc.config = LedgerConfig {
            thresholds,
            quality_weight: weights.quality,
            aesthetic_weight: weights.aesthetic,
        };
    }

    pub fn set_total_files(&mut self, count: usize) {
        self.doc.total_files = count;
    }

    /// Mark a batch as started and persist
    pub fn start_processing(&mut self) -> Result<()> {
        self.doc.status = LedgerStatus::InProgress;
        self.save()
    }

    /// Mark the directory as fully scored and persist
    pub fn complete_processing(&mut self) -> Result<()> {
        self.doc.status = LedgerStatus::Completed;
        self.save()
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut by_rating = [0usize; 6];
        for record in self.doc.files.values() {
            by_rating[usize::from(record.rating.min(MAX_RATING))] += 1;
        }

        LedgerSummary {
            status: self.doc.status,
            created_at: self.doc.created_at,
            updated_at: self.doc.updated_at,
            total_files: self.doc.total_files,
            processed_files: self.doc.processed_files,
            thresholds: self.doc.config.thresholds,
            by_rating,
        }
    }

    pub fn status(&self) -> LedgerStatus {
        self.doc.status
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.doc.config
    }

    pub fn files(&self) -> &BTreeMap<String, FileRecord> {
        &self.doc.files
    }

    pub fn processed_count(&self) -> usize {
        self.doc.processed_files
    }

    pub fn total_count(&self) -> usize {
        self.doc.total_files
    }

    pub fn document(&self) -> &LedgerDocument {
        &self.doc
    }

    /// Managed directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the ledger document
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Write `contents` to `target` through `temp`: create, sync, rename.
///
/// On failure `target` is untouched. A temp file this call created is
/// removed; one that already existed is left alone.
fn write_atomic(target: &Path, temp: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(temp)?;
    let synced = file
        .write_all(contents)
        .and_then(|()| file.flush())
        .and_then(|()| file.sync_all());
    drop(file);

    let result = synced.and_then(|()| fs::rename(temp, target));
    if result.is_err() {
        let _ = fs::remove_file(temp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn photo(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_open_without_ledger_is_new() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path());

        assert_eq!(ledger.status(), LedgerStatus::New);
        assert!(ledger.files().is_empty());
        assert!(!Ledger::exists(dir.path()));
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = photo(&dir, "a.jpg", b"pixels");
        let mut ledger = Ledger::open(dir.path());

        ledger.upsert_result("a.jpg", &path, 80.0, 70.0, 74.0, 3);
        let first = ledger.files()["a.jpg"].clone();
        ledger.upsert_result("a.jpg", &path, 80.0, 70.0, 74.0, 3);

        assert_eq!(ledger.processed_count(), 1);
        assert_eq!(ledger.files()["a.jpg"], first);
        assert!(!first.fingerprint.is_empty());
        assert!(first.original_path.is_absolute());
    }

    #[test]
    fn test_upsert_overwrites_changed_result() {
        let dir = TempDir::new().unwrap();
        let path = photo(&dir, "a.jpg", b"pixels");
        let mut ledger = Ledger::open(dir.path());

        ledger.upsert_result("a.jpg", &path, 80.0, 70.0, 74.0, 3);
        ledger.upsert_result("a.jpg", &path, 60.123, 50.0, 54.049, 0);

        let rec = &ledger.files()["a.jpg"];
        assert_eq!(rec.quality, 60.12);
        assert_eq!(rec.total, 54.05);
        assert_eq!(rec.rating, 0);
        assert_eq!(ledger.processed_count(), 1);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let a = photo(&dir, "a.jpg", b"aaa");
        let b = photo(&dir, "b.jpg", b"bbb");

        let mut ledger = Ledger::open(dir.path());
        ledger.set_total_files(2);
        ledger.upsert_result("a.jpg", &a, 80.0, 70.0, 74.0, 3);
        ledger.upsert_result("b.jpg", &b, 90.0, 90.0, 90.0, 4);
        ledger.start_processing().unwrap();

        let reloaded = Ledger::open(dir.path());
        assert_eq!(reloaded.document(), ledger.document());
        assert!(Ledger::exists(dir.path()));
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let mut ledger = Ledger::open(dir.path());
        ledger.save().unwrap();
        ledger.save().unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![LEDGER_FILENAME.to_string()]);
    }

    fn saved_ledger(dir: &TempDir) -> LedgerDocument {
        let a = photo(dir, "a.jpg", b"aaa");
        let mut ledger = Ledger::open(dir.path());
        ledger.upsert_result("a.jpg", &a, 80.0, 70.0, 74.0, 3);
        ledger.complete_processing().unwrap();
        ledger.document().clone()
    }

    #[test]
    fn test_failed_write_keeps_previous_ledger() {
        let dir = TempDir::new().unwrap();
        let before = saved_ledger(&dir);
        let target = dir.path().join(LEDGER_FILENAME);
        let on_disk = std::fs::read(&target).unwrap();

        let unreachable = dir.path().join("missing").join("ledger.tmp");
        assert!(write_atomic(&target, &unreachable, b"{}").is_err());

        // Someone else's temp file is neither overwritten nor removed
        let taken = dir.path().join("taken.tmp");
        std::fs::write(&taken, b"other").unwrap();
        assert!(write_atomic(&target, &taken, b"{}").is_err());
        assert_eq!(std::fs::read(&taken).unwrap(), b"other");

        assert_eq!(std::fs::read(&target).unwrap(), on_disk);
        assert_eq!(Ledger::open(dir.path()).document(), &before);
    }

    #[test]
    fn test_interrupted_save_is_ignored_on_load() {
        let dir = TempDir::new().unwrap();
        let before = saved_ledger(&dir);

        // A crash between write and rename leaves a torn temp file behind
        let torn = dir.path().join(format!("{}.deadbeef.tmp", LEDGER_FILENAME));
        std::fs::write(&torn, r#"{"version": "2.0", "files": {"#).unwrap();

        let mut reloaded = Ledger::open(dir.path());
        assert_eq!(reloaded.document(), &before);
        reloaded.save().unwrap();
        assert_eq!(Ledger::open(dir.path()).files().len(), 1);
    }

    #[test]
    fn test_failed_rename_reports_error_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let mut ledger = Ledger::open(dir.path());
        std::fs::create_dir(dir.path().join(LEDGER_FILENAME)).unwrap();
        std::fs::write(dir.path().join(LEDGER_FILENAME).join("keep"), b"x").unwrap();

        assert!(matches!(ledger.save(), Err(SuperEliteError::FileSystem(_))));
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![LEDGER_FILENAME.to_string()]);
    }

    #[test]
    fn test_corrupt_ledger_starts_fresh() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(LEDGER_FILENAME), "{ not json").unwrap();

        let ledger = Ledger::open(dir.path());
        assert_eq!(ledger.status(), LedgerStatus::New);
        assert!(ledger.files().is_empty());
    }

    #[test]
    fn test_unknown_version_starts_fresh() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(LEDGER_FILENAME),
            json!({"version": "7.0", "files": {}}).to_string(),
        )
        .unwrap();

        assert_eq!(Ledger::open(dir.path()).status(), LedgerStatus::New);
    }

    #[test]
    fn test_legacy_list_ledger_migrates() {
        let dir = TempDir::new().unwrap();
        let legacy = json!({
            "created": "2025-06-01T10:00:00",
            "files": [
                {"filename": "a.jpg", "scores": {"quality": 80, "aesthetic": 70, "total": 74}, "rating": 3},
                {"filename": "b.jpg", "scores": {"quality": 60, "aesthetic": 60, "total": 60}, "rating": 1},
                {"filename": "c.jpg", "scores": {"quality": 90, "aesthetic": 85, "total": 87}, "rating": 4}
            ]
        });
        std::fs::write(dir.path().join(LEDGER_FILENAME), legacy.to_string()).unwrap();

        let ledger = Ledger::open(dir.path());
        assert_eq!(ledger.status(), LedgerStatus::Completed);
        assert_eq!(ledger.processed_count(), 3);
        assert_eq!(ledger.total_count(), 3);
        assert_eq!(ledger.files()["c.jpg"].rating, 4);
        assert_eq!(ledger.files()["a.jpg"].fingerprint, "");

        // Migrated form was persisted
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(ledger.path()).unwrap()).unwrap();
        assert_eq!(raw["version"], migrate::CURRENT_VERSION_STR);
        assert!(raw["files"].is_object());
    }

    #[test]
    fn test_legacy_ledger_with_bad_thresholds_keeps_records() {
        let dir = TempDir::new().unwrap();
        let legacy = json!({
            "created": "2025-06-01T10:00:00",
            "settings": {"thresholds": [80, 70, 60]},
            "files": [
                {"filename": "a.jpg", "scores": {"quality": 80, "aesthetic": 70, "total": 74}, "rating": 3},
                {"filename": "b.jpg", "scores": {"quality": 60, "aesthetic": 60, "total": 60}, "rating": 1},
                {"filename": "c.jpg", "scores": {"quality": 90, "aesthetic": 85, "total": 87}, "rating": 4}
            ]
        });
        std::fs::write(dir.path().join(LEDGER_FILENAME), legacy.to_string()).unwrap();

        let ledger = Ledger::open(dir.path());
        assert_eq!(ledger.status(), LedgerStatus::Completed);
        assert_eq!(ledger.files().len(), 3);
        assert_eq!(ledger.config().thresholds, Thresholds::default());
    }

    #[test]
    fn test_update_rating_unknown_file() {
        let dir = TempDir::new().unwrap();
        let mut ledger = Ledger::open(dir.path());

        let err = ledger.update_rating("ghost.jpg", 2).unwrap_err();
        assert!(matches!(err, SuperEliteError::UnknownFile(name) if name == "ghost.jpg"));
    }

    #[test]
    fn test_update_rating_changes_only_rating() {
        let dir = TempDir::new().unwrap();
        let path = photo(&dir, "a.jpg", b"pixels");
        let mut ledger = Ledger::open(dir.path());
        ledger.upsert_result("a.jpg", &path, 80.0, 70.0, 74.0, 3);
        let before = ledger.files()["a.jpg"].clone();

        ledger.update_rating("a.jpg", 5).unwrap();
        let after = &ledger.files()["a.jpg"];
        assert_eq!(after.rating, 5);
        assert_eq!(after.total, before.total);
        assert_eq!(after.fingerprint, before.fingerprint);

        assert!(matches!(
            ledger.update_rating("a.jpg", 6),
            Err(SuperEliteError::InvalidRating(6))
        ));
    }

    #[test]
    fn test_reset_deletes_document() {
        let dir = TempDir::new().unwrap();
        let path = photo(&dir, "a.jpg", b"pixels");
        let mut ledger = Ledger::open(dir.path());
        ledger.upsert_result("a.jpg", &path, 80.0, 70.0, 74.0, 3);
        ledger.complete_processing().unwrap();

        ledger.reset().unwrap();
        assert!(!Ledger::exists(dir.path()));
        assert_eq!(ledger.status(), LedgerStatus::New);
        assert_eq!(ledger.processed_count(), 0);
    }

    #[test]
    fn test_summary_histogram() {
        let dir = TempDir::new().unwrap();
        let mut ledger = Ledger::open(dir.path());
        for (name, rating) in [("a.jpg", 4), ("b.jpg", 4), ("c.jpg", 0), ("d.jpg", 2)] {
            let path = photo(&dir, name, name.as_bytes());
            ledger.upsert_result(name, &path, 50.0, 50.0, 50.0, rating);
        }
        ledger.update_rating("c.jpg", 5).unwrap();

        let summary = ledger.summary();
        assert_eq!(summary.by_rating, [0, 0, 1, 0, 2, 1]);
        assert_eq!(summary.processed_files, 4);
        assert_eq!(summary.status, LedgerStatus::New);
    }

    #[test]
    fn test_is_processed_requires_matching_fingerprint() {
        let dir = TempDir::new().unwrap();
        let path = photo(&dir, "a.jpg", b"pixels");
        let mut ledger = Ledger::open(dir.path());

        assert!(!ledger.is_processed("a.jpg", &path));
        ledger.upsert_result("a.jpg", &path, 80.0, 70.0, 74.0, 3);
        assert!(ledger.is_processed("a.jpg", &path));

        std::fs::write(&path, b"edited pixels").unwrap();
        assert!(!ledger.is_processed("a.jpg", &path));
    }
}
