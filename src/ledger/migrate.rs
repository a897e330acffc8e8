// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Ledger schema versions and the upgrade chain
//!
//! - v0: unversioned, `files` is a list of `{filename, scores, rating}`
//! - v1: `"1.0"`, `files` keyed by filename, snake_case keys, `hash`
//! - v2: `"2.0"`, camelCase keys, `fingerprint`, RFC 3339 UTC timestamps
//!
//! Each step is a pure function over the raw JSON document so it can be
//! tested on its own. [`upgrade`] runs the steps in order.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};

use tracing::warn;

use crate::rating::{Thresholds, Weights};
use crate::{Result, SuperEliteError};

/// Version written by this build
pub const CURRENT_VERSION: u32 = 2;

/// Version string persisted for [`CURRENT_VERSION`]
pub const CURRENT_VERSION_STR: &str = "2.0";

type Step = fn(Value, DateTime<Utc>) -> Value;

/// `STEPS[n]` upgrades version `n` to `n + 1`
const STEPS: [Step; CURRENT_VERSION as usize] = [v0_to_v1, v1_to_v2];

/// Outcome of running the upgrade chain
#[derive(Debug, Clone, PartialEq)]
pub struct Upgraded {
    pub document: Value,
    pub from_version: u32,
}

impl Upgraded {
    /// Whether any step ran
    pub fn migrated(&self) -> bool {
        self.from_version < CURRENT_VERSION
    }
}

/// Detect the schema version of a raw ledger document
pub fn schema_version(doc: &Value) -> Result<u32> {
    let obj = doc
        .as_object()
        .ok_or_else(|| SuperEliteError::UnsupportedSchema("document is not an object".to_string()))?;

    // List-shaped files predate versioning, whatever the version field says
    if obj.get("files").is_some_and(Value::is_array) {
        return Ok(0);
    }

    match obj.get("version") {
        None => Ok(1),
        Some(Value::String(v)) => match v.split('.').next() {
            Some("1") => Ok(1),
            Some("2") => Ok(2),
            _ => Err(SuperEliteError::UnsupportedSchema(format!("version {}", v))),
        },
        Some(other) => Err(SuperEliteError::UnsupportedSchema(format!("version {}", other))),
    }
}

/// Upgrade a raw document to [`CURRENT_VERSION`]
pub fn upgrade(doc: Value, now: DateTime<Utc>) -> Result<Upgraded> {
    let from_version = schema_version(&doc)?;
    let document = STEPS[from_version as usize..]
        .iter()
        .fold(doc, |doc, step| step(doc, now));

    Ok(Upgraded {
        document,
        from_version,
    })
}

/// v0 → v1: list of file entries becomes a mapping keyed by filename
pub fn v0_to_v1(doc: Value, _now: DateTime<Utc>) -> Value {
    let mut obj = into_object(doc);
    let created = obj.get("created").and_then(Value::as_str).unwrap_or("").to_string();

    let mut files = Map::new();
    if let Some(entries) = obj.get("files").and_then(Value::as_array) {
        for entry in entries {
            let filename = entry.get("filename").and_then(Value::as_str).unwrap_or("");
            if filename.is_empty() {
                continue;
            }
            let scores = entry.get("scores");
            let score = |key: &str| {
                scores
                    .and_then(|s| s.get(key))
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0)
            };
            files.insert(
                filename.to_string(),
                json!({
                    "hash": "",
                    "quality": score("quality"),
                    "aesthetic": score("aesthetic"),
                    "total": score("total"),
                    "rating": entry.get("rating").and_then(Value::as_u64).unwrap_or(0),
                    "processed_at": created,
                }),
            );
        }
    }

    let count = files.len();
    obj.insert("files".to_string(), Value::Object(files));
    obj.insert("processed_files".to_string(), json!(count));
    obj.insert("version".to_string(), json!("1.0"));

    // Unversioned ledgers were only ever written at the end of a run
    obj.entry("status").or_insert_with(|| json!("completed"));
    obj.entry("created_at").or_insert_with(|| json!(created));
    obj.entry("updated_at").or_insert_with(|| json!(created));

    if !obj.contains_key("config") {
        let settings = obj.get("settings").cloned().unwrap_or(Value::Null);
        let (thresholds, weights) = checked_config(&settings);
        obj.insert(
            "config".to_string(),
            json!({
                "thresholds": thresholds,
                "quality_weight": weights.quality,
                "aesthetic_weight": weights.aesthetic,
            }),
        );
    }

    if !obj.contains_key("total_files") {
        let total = obj
            .get("statistics")
            .and_then(|s| s.get("total"))
            .and_then(Value::as_u64)
            .unwrap_or(count as u64);
        obj.insert("total_files".to_string(), json!(total));
    }

    Value::Object(obj)
}

/// v1 → v2: camelCase keys, `hash` renamed to `fingerprint`, UTC timestamps
pub fn v1_to_v2(doc: Value, now: DateTime<Utc>) -> Value {
    let obj = into_object(doc);
    let get = |key: &str| obj.get(key).cloned().unwrap_or(Value::Null);

    let created_at = normalize_timestamp(&get("created_at")).unwrap_or(now);
    let updated_at = normalize_timestamp(&get("updated_at")).unwrap_or(created_at);

    let (thresholds, weights) = checked_config(&get("config"));
    let config = json!({
        "thresholds": thresholds,
        "qualityWeight": weights.quality,
        "aestheticWeight": weights.aesthetic,
    });

    let mut files = Map::new();
    if let Some(entries) = obj.get("files").and_then(Value::as_object) {
        for (name, rec) in entries {
            let num = |key: &str| rec.get(key).and_then(Value::as_f64).unwrap_or(0.0);
            let text = |key: &str| rec.get(key).and_then(Value::as_str).unwrap_or("").to_string();
            let processed_at = rec
                .get("processed_at")
                .and_then(normalize_timestamp)
                .unwrap_or(created_at);
            let rating = rec.get("rating").and_then(Value::as_u64).unwrap_or(0).min(5);

            files.insert(
                name.clone(),
                json!({
                    "fingerprint": text("hash"),
                    "originalPath": text("original_path"),
                    "quality": num("quality"),
                    "aesthetic": num("aesthetic"),
                    "total": num("total"),
                    "rating": rating,
                    "processedAt": processed_at,
                }),
            );
        }
    }

    let count = files.len();
    json!({
        "version": CURRENT_VERSION_STR,
        "createdAt": created_at,
        "updatedAt": updated_at,
        "config": config,
        "status": obj.get("status").and_then(Value::as_str).unwrap_or("completed"),
        "totalFiles": obj.get("total_files").and_then(Value::as_u64).unwrap_or(count as u64),
        "processedFiles": count,
        "files": Value::Object(files),
    })
}

/// Thresholds and weights from a legacy config block. Missing or invalid
/// values fall back to the defaults so the file records survive.
fn checked_config(config: &Value) -> (Thresholds, Weights) {
    let thresholds = match config.get("thresholds") {
        None | Some(Value::Null) => Thresholds::default(),
        Some(raw) => serde_json::from_value::<Thresholds>(raw.clone()).unwrap_or_else(|e| {
            warn!("Ignoring legacy thresholds {}: {}", raw, e);
            Thresholds::default()
        }),
    };

    let defaults = Weights::default();
    let weight = |key: &str, default: f64| {
        config.get(key).and_then(Value::as_f64).unwrap_or(default)
    };
    let weights = Weights::new(
        weight("quality_weight", defaults.quality),
        weight("aesthetic_weight", defaults.aesthetic),
    )
    .unwrap_or_else(|e| {
        warn!("Ignoring legacy weights: {}", e);
        defaults
    });

    (thresholds, weights)
}

fn into_object(doc: Value) -> Map<String, Value> {
    match doc {
        Value::Object(obj) => obj,
        _ => Map::new(),
    }
}

/// Parse an RFC 3339 timestamp, or a naive local one as older ledgers wrote
fn normalize_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Some(
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc()),
    )
}
