//! Name validation
//!
//! Collections and keys become path segments directly below the storage
//! area, so everything that reaches the filesystem passes through here first.

use crate::config::NameCheck;
use crate::sequence::LOCK_DIR;

/// Characters that are dropped from keys outright
const UNSAFE_CHARS: [char; 4] = ['/', '\\', '\0', '~'];

/// Wildcard metacharacters
pub const WILDCARDS: [char; 2] = ['*', '?'];

/// Strip path separators, NUL, `~` and any run of two or more dots
///
/// The result can never name anything outside its parent directory. A lone
/// `.` washes to the empty string.
pub fn wash_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut dots = 0usize;

    for c in name.chars().filter(|c| !UNSAFE_CHARS.contains(c)) {
        if c == '.' {
            dots += 1;
            continue;
        }
        if dots == 1 {
            out.push('.');
        }
        dots = 0;
        out.push(c);
    }
    if dots == 1 {
        out.push('.');
    }

    if out == "." {
        out.clear();
    }
    out
}

/// Key as stored by a post: wildcards removed, then washed
pub fn post_key(key: &str) -> String {
    wash_file_name(&key.replace(WILDCARDS, ""))
}

/// Key as used by a lookup: washed, globstars collapsed to a single `*`
pub fn query_key(key: &str) -> String {
    let washed = wash_file_name(key);
    let mut out = String::with_capacity(washed.len());
    for c in washed.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Sequence names follow the post-key rules; `None` if nothing usable is left
pub fn sequence_name(name: &str) -> Option<String> {
    let name = post_key(name);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Check a non-empty collection name against the configured rule set
///
/// The lock directory name is reserved under both rule sets.
pub fn is_valid_collection(name: &str, check: NameCheck) -> bool {
    if name == LOCK_DIR {
        return false;
    }
    match check {
        NameCheck::Strict => is_identifier(name),
        NameCheck::Relaxed => is_safe_segment(name),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_safe_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name
            .chars()
            .any(|c| UNSAFE_CHARS.contains(&c) || WILDCARDS.contains(&c))
}
