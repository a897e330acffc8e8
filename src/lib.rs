// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! SuperElite: AI Photo Culling Ledger
//!
//! Keeps a per-directory record of which photos a vision model has scored,
//! so interrupted batches resume where they stopped, ratings can be
//! recomputed under new thresholds without re-running the model, and
//! star-folder layouts can be undone.

pub mod batch;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod ledger;
pub mod oracle;
pub mod rating;
pub mod relocate;
pub mod scanner;

pub use config::AppConfig;
pub use error::{Result, SuperEliteError};
pub use ledger::{Ledger, LedgerStatus};
