//! Object key generation.

use std::sync::LazyLock;

use regex::Regex;

/// Longest file-name suffix kept in a key.
const MAX_SUFFIX_CHARS: usize = 100;

static UNSAFE_KEY_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid regex"));

/// A fresh, collision-free key ending in a sanitized form of `suggested_name`.
pub fn object_key(suggested_name: &str) -> String {
    format!("{}-{}", uuid::Uuid::new_v4().simple(), sanitize(suggested_name))
}

/// Whether `key` could have been produced by [`object_key`].
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && !UNSAFE_KEY_CHARS.is_match(key)
}

fn sanitize(name: &str) -> String {
    let cleaned = UNSAFE_KEY_CHARS.replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
    if cleaned.is_empty() {
        return "blob".to_string();
    }
    // Keep the tail so the extension survives truncation.
    let skip = cleaned.chars().count().saturating_sub(MAX_SUFFIX_CHARS);
    cleaned.chars().skip(skip).collect()
}
