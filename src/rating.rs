// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Rating policy: cached scores to star buckets
//!
//! The combined score is `quality * quality_weight + aesthetic * aesthetic_weight`.
//! A photo gets the highest bucket (4, 3, 2, 1) whose threshold the exact
//! combined score reaches, otherwise 0. Only the stored total is rounded. Five stars are reserved
//! for manual curation and never assigned here.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::ledger::{Ledger, LedgerStatus};
use crate::{Result, SuperEliteError};

/// Highest rating the policy assigns
pub const MAX_POLICY_RATING: u8 = 4;

/// Highest rating a record may hold (manual curation tier)
pub const MAX_RATING: u8 = 5;

/// Round a score to two decimals, the precision scores are stored at
pub fn round_score(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bucket thresholds `[t4, t3, t2, t1]`, strictly descending
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Thresholds([f64; 4]);

impl Thresholds {
    pub fn new(t4: f64, t3: f64, t2: f64, t1: f64) -> Result<Self> {
        let values = [t4, t3, t2, t1];
        if values.iter().any(|t| !t.is_finite()) {
            return Err(SuperEliteError::InvalidThresholds(format!(
                "{:?} contains a non-finite value",
                values
            )));
        }
        if !values.windows(2).all(|w| w[0] > w[1]) {
            return Err(SuperEliteError::InvalidThresholds(format!(
                "{:?} must be strictly descending",
                values
            )));
        }
        Ok(Self(values))
    }

    /// Threshold for a bucket (1..=4)
    pub fn for_rating(&self, rating: u8) -> Option<f64> {
        match rating {
            1..=4 => Some(self.0[(4 - rating) as usize]),
            _ => None,
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        self.0
    }

    /// Map a combined score to a bucket. Ties go to the higher bucket.
    pub fn bucket(&self, total: f64) -> u8 {
        (1..=MAX_POLICY_RATING)
            .rev()
            .find(|&r| self.for_rating(r).is_some_and(|t| total >= t))
            .unwrap_or(0)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        ThresholdPreset::Default.thresholds()
    }
}

impl TryFrom<Vec<f64>> for Thresholds {
    type Error = SuperEliteError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        match values.as_slice() {
            &[t4, t3, t2, t1] => Self::new(t4, t3, t2, t1),
            other => Err(SuperEliteError::InvalidThresholds(format!(
                "expected 4 values, got {}",
                other.len()
            ))),
        }
    }
}

impl From<Thresholds> for Vec<f64> {
    fn from(t: Thresholds) -> Self {
        t.0.to_vec()
    }
}

impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [t4, t3, t2, t1] = self.0;
        write!(f, "{} / {} / {} / {}", t4, t3, t2, t1)
    }
}

/// Named threshold sets offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ThresholdPreset {
    /// 78 / 72 / 66 / 58
    Default,
    /// 85 / 80 / 75 / 70
    Strict,
    /// 70 / 60 / 50 / 40
    Loose,
}

impl ThresholdPreset {
    pub fn thresholds(self) -> Thresholds {
        let values = match self {
            Self::Default => [78.0, 72.0, 66.0, 58.0],
            Self::Strict => [85.0, 80.0, 75.0, 70.0],
            Self::Loose => [70.0, 60.0, 50.0, 40.0],
        };
        Thresholds(values)
    }
}

/// Weights applied to the quality and aesthetic scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub quality: f64,
    pub aesthetic: f64,
}

impl Weights {
    pub fn new(quality: f64, aesthetic: f64) -> Result<Self> {
        for (name, w) in [("quality", quality), ("aesthetic", aesthetic)] {
            if !w.is_finite() || w < 0.0 {
                return Err(SuperEliteError::InvalidWeights(format!(
                    "{} weight {} must be finite and non-negative",
                    name, w
                )));
            }
        }
        Ok(Self { quality, aesthetic })
    }

    /// Exact combined score
    pub fn combine(&self, quality: f64, aesthetic: f64) -> f64 {
        quality * self.quality + aesthetic * self.aesthetic
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            quality: 0.4,
            aesthetic: 0.6,
        }
    }
}

/// Combined score and bucket for one photo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rated {
    pub total: f64,
    pub rating: u8,
}

/// Rate a photo from its raw scores.
///
/// The bucket comes from the exact sum; `total` is rounded for storage.
pub fn rate(quality: f64, aesthetic: f64, weights: &Weights, thresholds: &Thresholds) -> Rated {
    let exact = weights.combine(quality, aesthetic);
    Rated {
        total: round_score(exact),
        rating: thresholds.bucket(exact),
    }
}

/// Thresholds and weights bundled together
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingPolicy {
    pub thresholds: Thresholds,
    pub weights: Weights,
}

impl RatingPolicy {
    pub fn new(thresholds: Thresholds, weights: Weights) -> Self {
        Self { thresholds, weights }
    }

    pub fn rate(&self, quality: f64, aesthetic: f64) -> Rated {
        rate(quality, aesthetic, &self.weights, &self.thresholds)
    }
}

/// One line of a quick re-rate changelist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingChange {
    pub filename: String,
    pub old_rating: u8,
    pub new_rating: u8,
    pub total: f64,
    pub changed: bool,
}

/// Re-derive every cached total and rating under `policy` and make it the
/// ledger's config. Does not persist.
pub fn apply_policy(ledger: &mut Ledger, policy: &RatingPolicy) -> Result<Vec<RatingChange>> {
    let cached: Vec<(String, f64, f64, u8)> = ledger
        .files()
        .iter()
        .map(|(name, rec)| (name.clone(), rec.quality, rec.aesthetic, rec.rating))
        .collect();

    let mut changes = Vec::with_capacity(cached.len());
    for (filename, quality, aesthetic, old_rating) in cached {
        let rated = policy.rate(quality, aesthetic);
        ledger.refresh_total(&filename, rated.total);

        let changed = old_rating != rated.rating;
        if changed {
            ledger.update_rating(&filename, rated.rating)?;
        }

        changes.push(RatingChange {
            filename,
            old_rating,
            new_rating: rated.rating,
            total: rated.total,
            changed,
        });
    }

    ledger.set_config(policy.thresholds, policy.weights);
    Ok(changes)
}

/// Re-rate every cached record under a new policy without calling the oracle.
///
/// Refuses to run unless the ledger is completed: a partial scan would hand
/// out ratings for photos that were never scored. Persists the ledger and
/// returns an entry for every tracked file.
pub fn quick_rerate(ledger: &mut Ledger, policy: &RatingPolicy) -> Result<Vec<RatingChange>> {
    if ledger.status() != LedgerStatus::Completed {
        return Err(SuperEliteError::LedgerNotCompleted(ledger.status()));
    }

    let changes = apply_policy(ledger, policy)?;
    ledger.save()?;

    info!(
        "Re-rated {} files, {} changed",
        changes.len(),
        changes.iter().filter(|c| c.changed).count()
    );

    Ok(changes)
}
