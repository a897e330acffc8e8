// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Cheap content fingerprints for change detection
//!
//! Photos (especially RAW files) can be hundreds of megabytes, so large files
//! are sampled: only the first and last [`SAMPLE_SIZE`] bytes are digested.
//! A modification confined to the middle of a large file is therefore not
//! detected. This is change detection, not integrity checking.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::warn;

/// Bytes read from each end of a large file
pub const SAMPLE_SIZE: u64 = 64 * 1024;

/// Files up to this size are digested in full
pub const FULL_DIGEST_LIMIT: u64 = 2 * SAMPLE_SIZE;

/// Fingerprint a file, returning an empty string if it cannot be read.
///
/// Callers must treat the empty string as "cannot verify": it never matches
/// a stored fingerprint.
pub fn fingerprint(path: &Path) -> String {
    match try_fingerprint(path) {
        Ok(digest) => digest,
        Err(e) => {
            warn!("Failed to fingerprint {:?}: {}", path, e);
            String::new()
        }
    }
}

/// Fingerprint a file, propagating read errors
pub fn try_fingerprint(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let mut hasher = blake3::Hasher::new();

    if len <= FULL_DIGEST_LIMIT {
        let mut data = Vec::with_capacity(len as usize);
        file.read_to_end(&mut data)?;
        hasher.update(&data);
    } else {
        let mut chunk = vec![0u8; SAMPLE_SIZE as usize];
        file.read_exact(&mut chunk)?;
        hasher.update(&chunk);

        file.seek(SeekFrom::End(-(SAMPLE_SIZE as i64)))?;
        file.read_exact(&mut chunk)?;
        hasher.update(&chunk);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Whether a stored fingerprint still matches a freshly computed one.
///
/// Empty values on either side never match.
pub fn matches(stored: &str, current: &str) -> bool {
    !stored.is_empty() && !current.is_empty() && stored == current
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_stable_for_unmodified_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.jpg", &patterned(300 * 1024));

        let first = fingerprint(&path);
        assert!(!first.is_empty());
        assert_eq!(first, fingerprint(&path));
    }

    #[test]
    fn test_small_file_any_change_detected() {
        let dir = TempDir::new().unwrap();
        let mut data = patterned(100 * 1024);
        let path = write_file(&dir, "small.jpg", &data);
        let before = fingerprint(&path);

        data[50 * 1024] ^= 0xff;
        std::fs::write(&path, &data).unwrap();
        assert_ne!(before, fingerprint(&path));
    }

    #[test]
    fn test_large_file_head_and_tail_changes_detected() {
        let dir = TempDir::new().unwrap();
        let data = patterned(1024 * 1024);
        let path = write_file(&dir, "large.nef", &data);
        let before = fingerprint(&path);

        let mut head = data.clone();
        head[10] ^= 0xff;
        std::fs::write(&path, &head).unwrap();
        assert_ne!(before, fingerprint(&path));

        let mut tail = data.clone();
        let last = tail.len() - 10;
        tail[last] ^= 0xff;
        std::fs::write(&path, &tail).unwrap();
        assert_ne!(before, fingerprint(&path));
    }

    #[test]
    fn test_large_file_middle_change_not_detected() {
        let dir = TempDir::new().unwrap();
        let mut data = patterned(1024 * 1024);
        let path = write_file(&dir, "large.arw", &data);
        let before = fingerprint(&path);

        data[512 * 1024] ^= 0xff;
        std::fs::write(&path, &data).unwrap();
        assert_eq!(before, fingerprint(&path));
    }

    #[test]
    fn test_unreadable_file_yields_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(fingerprint(&dir.path().join("missing.jpg")), "");
    }

    #[test]
    fn test_empty_never_matches() {
        assert!(!matches("", ""));
        assert!(!matches("abc", ""));
        assert!(!matches("", "abc"));
        assert!(matches("abc", "abc"));
    }
}
