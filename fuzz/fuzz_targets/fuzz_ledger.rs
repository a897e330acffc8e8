// SPDX-License-Identifier: MIT
#![no_main]

use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use superelite::ledger::{migrate, LedgerDocument};

// Arbitrary ledger files must migrate or fail cleanly, never panic.
fuzz_target!(|data: &[u8]| {
    let Ok(raw) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    if let Ok(upgraded) = migrate::upgrade(raw, now) {
        let _ = serde_json::from_value::<LedgerDocument>(upgraded.document);
    }
});
