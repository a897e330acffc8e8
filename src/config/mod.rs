// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for SuperElite

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::rating::{RatingPolicy, Thresholds, Weights};
use crate::relocate::DEFAULT_BUCKET_SUFFIX;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Scoring oracle (vision model) settings
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Rating thresholds and weights for new batches
    #[serde(default)]
    pub rating: RatingConfig,

    /// Which files are photos, and how many are scored at once
    #[serde(default)]
    pub scan: ScanConfig,

    /// Star-folder layout
    #[serde(default)]
    pub layout: LayoutConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OracleConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_max_image_side")]
    pub max_image_side: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RatingConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default = "default_quality_weight")]
    pub quality_weight: f64,
    #[serde(default = "default_aesthetic_weight")]
    pub aesthetic_weight: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScanConfig {
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LayoutConfig {
    #[serde(default = "default_bucket_suffix")]
    pub bucket_suffix: String,
}

// Default value functions
fn default_url() -> String { "http://localhost:11434".to_string() }
fn default_model() -> String { "llava".to_string() }
fn default_timeout() -> u64 { 120 }
fn default_retries() -> u32 { 2 }
fn default_max_image_side() -> u32 { 1024 }
fn default_quality_weight() -> f64 { Weights::default().quality }
fn default_aesthetic_weight() -> f64 { Weights::default().aesthetic }
fn default_concurrency() -> usize { 2 }
fn default_bucket_suffix() -> String { DEFAULT_BUCKET_SUFFIX.to_string() }

fn default_prompt() -> String {
    "Rate this photograph. Reply with JSON only: \
     {\"quality\": <0-100 technical quality: focus, exposure, noise>, \
     \"aesthetic\": <0-100 aesthetic appeal: composition, light, subject>}".to_string()
}

fn default_formats() -> Vec<String> {
    vec![
        "jpg", "jpeg", "png", "tif", "tiff", "webp", "heic", "heif",
        "arw", "cr2", "cr3", "nef", "raf", "orf", "rw2", "dng",
    ].into_iter().map(String::from).collect()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            model: default_model(),
            timeout_secs: default_timeout(),
            retries: default_retries(),
            prompt: default_prompt(),
            max_image_side: default_max_image_side(),
        }
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            quality_weight: default_quality_weight(),
            aesthetic_weight: default_aesthetic_weight(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            bucket_suffix: default_bucket_suffix(),
        }
    }
}

impl RatingConfig {
    pub fn policy(&self) -> crate::Result<RatingPolicy> {
        let weights = Weights::new(self.quality_weight, self.aesthetic_weight)?;
        Ok(RatingPolicy::new(self.thresholds, weights))
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::SuperEliteError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values serde cannot
    pub fn validate(&self) -> crate::Result<()> {
        self.rating.policy()?;
        if self.scan.concurrency == 0 {
            return Err(crate::SuperEliteError::Config("scan.concurrency must be at least 1".to_string()));
        }
        if self.scan.formats.is_empty() {
            return Err(crate::SuperEliteError::Config("scan.formats is empty".to_string()));
        }
        if self.layout.bucket_suffix.contains(['/', '\\']) {
            return Err(crate::SuperEliteError::Config(
                "layout.bucket_suffix must not contain path separators".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("superelite.json")).unwrap();
        assert_eq!(config.oracle.model, "llava");
        assert_eq!(config.layout.bucket_suffix, "★");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("superelite.json");
        std::fs::write(&path, r#"{"rating": {"thresholds": [85, 80, 75, 70]}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.rating.thresholds.as_array(), [85.0, 80.0, 75.0, 70.0]);
        assert_eq!(config.rating.quality_weight, 0.4);
        assert_eq!(config.scan.concurrency, 2);
    }

    #[test]
    fn test_bad_thresholds_rejected_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("superelite.json");
        std::fs::write(&path, r#"{"rating": {"thresholds": [50, 60, 70, 80]}}"#).unwrap();

        assert!(matches!(
            AppConfig::load(&path),
            Err(crate::SuperEliteError::Config(_))
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("superelite.json");
        let mut config = AppConfig::default();
        config.scan.concurrency = 4;
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap().scan.concurrency, 4);
    }

    #[test]
    fn test_validate() {
        let mut config = AppConfig::default();
        config.scan.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.rating.aesthetic_weight = -1.0;
        assert!(config.validate().is_err());
    }
}
