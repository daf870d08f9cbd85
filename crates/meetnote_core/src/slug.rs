//! Title to filesystem-safe identifier mapping.
//!
//! # Invariants
//! - `slugify` never returns an empty string.
//! - Slugs derived from text only contain `[a-z0-9_]`, without leading/trailing or
//!   repeated `_`. The fallback is `note_<YYYYmmddTHHMMSSZ>`.
//! - Output is deterministic for a given input (the empty-input fallback is
//!   deterministic within the same wall-clock second).

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s/\\]+").expect("valid separator regex"));
static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_]").expect("valid non-word regex"));
static UNDERSCORE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{2,}").expect("valid underscore regex"));

/// Suffix used for note files and the index file.
pub const JSON_EXTENSION: &str = "json";

/// Converts free text into a filesystem-safe slug.
pub fn slugify(text: &str) -> String {
    let ascii: String = text.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_ascii_lowercase();
    let separated = SEPARATOR_RE.replace_all(&lowered, "_");
    let stripped = NON_WORD_RE.replace_all(&separated, "");
    let collapsed = UNDERSCORE_RUN_RE.replace_all(&stripped, "_");
    let slug = collapsed.trim_matches('_');
    if slug.is_empty() {
        return format!("note_{}", compact_timestamp(Utc::now()));
    }
    slug.to_string()
}

/// Compact UTC timestamp used in fallback slugs and backup directory names.
pub fn compact_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Picks `<slug>.json`, then `<slug>_2.json`, `<slug>_3.json`, ... until
/// `is_taken` reports a free name.
pub fn unique_filename(slug: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let first = format!("{slug}.{JSON_EXTENSION}");
    if !is_taken(&first) {
        return first;
    }
    let mut counter = 2u32;
    loop {
        let candidate = format!("{slug}_{counter}.{JSON_EXTENSION}");
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Filename a title maps to before collision handling.
pub fn note_filename(title: &str) -> String {
    format!("{}.{JSON_EXTENSION}", slugify(title))
}
