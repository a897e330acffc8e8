// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for SuperElite

use thiserror::Error;

use crate::ledger::LedgerStatus;

/// Result type alias for SuperElite operations
pub type Result<T> = std::result::Result<T, SuperEliteError>;

/// SuperElite error types
#[derive(Error, Debug)]
pub enum SuperEliteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid rating {0}: must be between 0 and 5")]
    InvalidRating(u8),

    #[error("File not tracked by ledger: {0}")]
    UnknownFile(String),

    #[error("Ledger is {0}, quick re-rate requires a completed scan")]
    LedgerNotCompleted(LedgerStatus),

    #[error("Unsupported ledger schema: {0}")]
    UnsupportedSchema(String),

    #[error("Scoring oracle error: {0}")]
    Oracle(String),
}
