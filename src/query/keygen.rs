//! Post-time key augmentation

use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// Hex digits needed to fill the 8-4-3-12 variable groups of a GUID
const GUID_HEX_DIGITS: usize = 27;

/// Generate a time-based GUID with random tail
///
/// Layout is `xxxxxxxx-xxxx-4000-8xxx-xxxxxxxxxxxx`: the millisecond
/// timestamp in hex leads, random hex digits fill the rest.
pub fn guid() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let mut hex = format!("{:x}", millis);
    let mut rng = rand::thread_rng();
    while hex.len() < GUID_HEX_DIGITS {
        let _ = write!(hex, "{:x}", rng.gen_range(0..16u8));
    }

    format!(
        "{}-{}-4000-8{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..15],
        &hex[15..GUID_HEX_DIGITS]
    )
}

/// Prefix a key with a sequence number and/or a GUID
///
/// An empty key becomes the prefix itself. The GUID always ends up first.
pub fn compose_key(key: &str, sequence: Option<u64>, guid: Option<&str>) -> String {
    let mut key = key.to_string();

    if let Some(n) = sequence {
        key = prefix(&n.to_string(), &key);
    }
    if let Some(guid) = guid {
        key = prefix(guid, &key);
    }

    key
}

fn prefix(prefix: &str, key: &str) -> String {
    if key.is_empty() {
        prefix.to_string()
    } else {
        format!("{}-{}", prefix, key)
    }
}
