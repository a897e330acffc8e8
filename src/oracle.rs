// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Scoring oracles: whatever turns a photo into quality/aesthetic scores
//!
//! The batch loop takes an oracle by reference, so tests can substitute a
//! fake. [`OllamaOracle`] asks a local Ollama vision model.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::OracleConfig;
use crate::{Result, SuperEliteError};

/// Raw scores for one photo, each in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub quality: f64,
    pub aesthetic: f64,
}

impl Scores {
    /// Clamp both scores into `[0, 100]`
    pub fn clamped(self) -> Self {
        Self {
            quality: self.quality.clamp(0.0, 100.0),
            aesthetic: self.aesthetic.clamp(0.0, 100.0),
        }
    }
}

/// Produces scores for a photo. May be slow.
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    async fn score(&self, path: &Path) -> Result<Scores>;
}

/// Oracle backed by an Ollama vision model
pub struct OllamaOracle {
    client: Client,
    base_url: String,
    model: String,
    prompt: String,
    max_image_side: u32,
    retries: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
    images: Vec<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    name: String,
}

impl OllamaOracle {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        // Accept either the server root or a full endpoint URL
        let base_url = config
            .url
            .trim_end_matches('/')
            .replace("/api/generate", "")
            .replace("/api/chat", "");

        Ok(Self {
            client,
            base_url,
            model: config.model.clone(),
            prompt: config.prompt.clone(),
            max_image_side: config.max_image_side,
            retries: config.retries,
        })
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.base_url);

        self.client
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                SuperEliteError::Oracle(format!(
                    "Cannot connect to Ollama at {}: {}",
                    self.base_url, e
                ))
            })?;

        Ok(())
    }

    /// List available models
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let tags: TagsResponse = self.client.get(&url).send().await?.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Check if the configured model is pulled
    pub async fn model_available(&self) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models
            .iter()
            .any(|m| m.starts_with(&self.model) || m == &format!("{}:latest", self.model)))
    }

    async fn generate_with_image(&self, image_base64: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt: &self.prompt,
            stream: false,
            format: "json",
            images: vec![image_base64.to_string()],
        };

        debug!("Sending vision request to Ollama: model={}", self.model);

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(SuperEliteError::Oracle(format!(
                "Ollama returned status {}",
                response.status()
            )));
        }

        let result: GenerateResponse = response.json().await?;
        Ok(result.response)
    }
}

#[async_trait]
impl ScoringOracle for OllamaOracle {
    fn name(&self) -> &str {
        &self.model
    }

    async fn score(&self, path: &Path) -> Result<Scores> {
        let owned: PathBuf = path.to_path_buf();
        let side = self.max_image_side;
        let image_data = tokio::task::spawn_blocking(move || encode_image(&owned, side))
            .await
            .map_err(|e| SuperEliteError::Oracle(format!("Image task failed: {}", e)))??;

        let mut last_error = None;
        for attempt in 0..=self.retries {
            if attempt > 0 {
                let delay = Duration::from_secs(2u64.pow(attempt - 1));
                warn!("Retrying {:?} in {:?} (attempt {})", path, delay, attempt + 1);
                tokio::time::sleep(delay).await;
            }

            match self.generate_with_image(&image_data).await {
                Ok(text) => match parse_scores(&text) {
                    Ok(scores) => return Ok(scores),
                    Err(e) => last_error = Some(e),
                },
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| SuperEliteError::Oracle("Unknown error".to_string())))
    }
}

/// Base64 image for the vision model, downscaled when large.
///
/// Formats the decoder cannot read (most RAW files) are sent as-is.
fn encode_image(path: &Path, max_side: u32) -> Result<String> {
    match prepare_image(path, max_side) {
        Ok(data) => Ok(general_purpose::STANDARD.encode(data)),
        Err(e) => {
            debug!("Sending {:?} undecoded: {}", path, e);
            let data = std::fs::read(path)?;
            Ok(general_purpose::STANDARD.encode(data))
        }
    }
}

fn prepare_image(path: &Path, max_side: u32) -> Result<Vec<u8>> {
    let img = image::open(path)?;

    let img = if img.width() > max_side || img.height() > max_side {
        img.resize(max_side, max_side, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    img.to_rgb8().write_to(&mut cursor, image::ImageFormat::Jpeg)?;

    Ok(buffer)
}

/// Pull `{"quality": .., "aesthetic": ..}` out of a model reply
pub fn parse_scores(text: &str) -> Result<Scores> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => {
            return Err(SuperEliteError::Oracle(format!(
                "No JSON object in model reply: {:?}",
                text
            )))
        }
    };

    let scores: Scores = serde_json::from_str(json)
        .map_err(|e| SuperEliteError::Oracle(format!("Malformed scores {:?}: {}", json, e)))?;

    if !scores.quality.is_finite() || !scores.aesthetic.is_finite() {
        return Err(SuperEliteError::Oracle(format!("Non-finite scores: {:?}", scores)));
    }

    Ok(scores.clamped())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use tempfile::TempDir;

    #[test]
    fn test_parse_scores() {
        let scores = parse_scores(r#"{"quality": 81.5, "aesthetic": 64}"#).unwrap();
        assert_eq!(scores, Scores { quality: 81.5, aesthetic: 64.0 });
    }

    #[test]
    fn test_parse_scores_with_chatter() {
        let scores =
            parse_scores("Sure! Here you go:\n{\"quality\": 120, \"aesthetic\": -3}\nEnjoy").unwrap();
        assert_eq!(scores, Scores { quality: 100.0, aesthetic: 0.0 });
    }

    #[test]
    fn test_parse_scores_rejects_garbage() {
        assert!(parse_scores("a lovely sunset").is_err());
        assert!(parse_scores(r#"{"quality": "high"}"#).is_err());
    }

    #[test]
    fn test_base_url_normalized() {
        let mut config = AppConfig::default().oracle;
        config.url = "http://localhost:11434/api/generate/".to_string();
        let oracle = OllamaOracle::new(&config).unwrap();
        assert_eq!(oracle.base_url, "http://localhost:11434");
        assert_eq!(oracle.name(), config.model);
    }

    #[test]
    fn test_unreachable_server_is_error() {
        let mut config = AppConfig::default().oracle;
        config.url = "http://127.0.0.1:9".to_string();
        config.retries = 0;
        let oracle = OllamaOracle::new(&config).unwrap();

        let result = tokio_test::block_on(oracle.health_check());
        assert!(matches!(result, Err(SuperEliteError::Oracle(_))));
    }

    #[test]
    fn test_encode_image_downscales() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.png");
        image::RgbImage::new(400, 100).save(&path).unwrap();

        let encoded = encode_image(&path, 200).unwrap();
        let bytes = general_purpose::STANDARD.decode(encoded).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (200, 50));
    }

    #[test]
    fn test_encode_undecodable_sends_raw() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.nef");
        std::fs::write(&path, b"raw sensor data").unwrap();

        let encoded = encode_image(&path, 1024).unwrap();
        assert_eq!(general_purpose::STANDARD.decode(encoded).unwrap(), b"raw sensor data");
    }
}
