// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Batch scoring of a directory, resumable across interruptions
//!
//! Oracle calls run concurrently (up to `concurrency` in flight) while every
//! ledger mutation happens here, in the single loop that owns the ledger.

use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::path::Path;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::ledger::Ledger;
use crate::oracle::ScoringOracle;
use crate::rating::{apply_policy, RatingPolicy};
use crate::scanner::{file_name, list_photos, IncrementalScanner};
use crate::Result;

/// What a batch run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Photos found in the directory
    pub total: usize,
    /// Photos with a verified cached result
    pub skipped: usize,
    pub scored: usize,
    pub failed: usize,
    pub cancelled: bool,
    /// Ledger was marked completed
    pub completed: bool,
}

/// Drives the scoring oracle over a directory's pending photos
pub struct BatchRunner<'a> {
    oracle: &'a dyn ScoringOracle,
    policy: RatingPolicy,
    formats: Vec<String>,
    concurrency: usize,
}

impl<'a> BatchRunner<'a> {
    pub fn new(oracle: &'a dyn ScoringOracle, policy: RatingPolicy, formats: Vec<String>) -> Self {
        Self {
            oracle,
            policy,
            formats,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Score everything pending in `dir`.
    ///
    /// The ledger is only marked completed when nothing is left pending.
    /// Cancellation or a failed photo leaves it in progress for a later run.
    pub async fn run(&self, dir: &Path, mut cancel: watch::Receiver<bool>) -> Result<BatchReport> {
        let mut ledger = Ledger::open(dir);
        let files = list_photos(dir, &self.formats)?;

        if ledger.config().policy() != self.policy && !ledger.files().is_empty() {
            let changes = apply_policy(&mut ledger, &self.policy)?;
            info!(
                "Rating policy changed, re-derived {} cached results ({} changed rating)",
                changes.len(),
                changes.iter().filter(|c| c.changed).count()
            );
        } else {
            ledger.set_config(self.policy.thresholds, self.policy.weights);
        }
        ledger.set_total_files(files.len());
        ledger.start_processing()?;

        let pending = IncrementalScanner::new(&ledger).pending(&files);
        let mut report = BatchReport {
            total: files.len(),
            skipped: files.len() - pending.len(),
            ..Default::default()
        };

        info!(
            "{:?}: {} photos, {} cached, {} to score with {}",
            dir,
            report.total,
            report.skipped,
            pending.len(),
            self.oracle.name()
        );

        let oracle = self.oracle;
        let mut results = stream::iter(pending)
            .map(|path| async move {
                let result = oracle.score(&path).await;
                (path, result)
            })
            .buffer_unordered(self.concurrency);

        let mut watching = true;
        loop {
            if *cancel.borrow() {
                warn!("Batch cancelled, {:?} left in progress", dir);
                report.cancelled = true;
                break;
            }

            let next = if watching {
                tokio::select! {
                    next = results.next() => next,
                    changed = cancel.changed() => {
                        // Sender gone: nobody can cancel any more
                        if changed.is_err() {
                            watching = false;
                        }
                        continue;
                    }
                }
            } else {
                results.next().await
            };

            let Some((path, result)) = next else {
                break;
            };
            let Some(name) = file_name(&path) else {
                warn!("Skipping {:?}: file name is not valid UTF-8", path);
                report.failed += 1;
                continue;
            };

            match result {
                Ok(scores) => {
                    let scores = scores.clamped();
                    let rated = self.policy.rate(scores.quality, scores.aesthetic);
                    ledger.upsert_result(
                        name,
                        &path,
                        scores.quality,
                        scores.aesthetic,
                        rated.total,
                        rated.rating,
                    );
                    ledger.save()?;
                    report.scored += 1;
                    debug!("{}: total {:.2}, {} stars", name, rated.total, rated.rating);
                }
                Err(e) => {
                    error!("Failed to score {:?}: {}", path, e);
                    report.failed += 1;
                }
            }
        }

        if !report.cancelled && IncrementalScanner::new(&ledger).pending(&files).is_empty() {
            ledger.complete_processing()?;
            report.completed = true;
        }

        info!(
            "{:?}: {} scored, {} failed, {} cached{}",
            dir,
            report.scored,
            report.failed,
            report.skipped,
            if report.completed { ", completed" } else { "" }
        );

        Ok(report)
    }
}
